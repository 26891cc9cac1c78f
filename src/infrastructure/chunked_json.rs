// Chunked JSON streaming utilities
use crate::infrastructure::http_response::brotli_compress;
use axum::body::Body;
use axum::http::{Response, StatusCode, header};
use axum::response::IntoResponse;
use bytes::{BufMut, Bytes, BytesMut};
use futures::StreamExt;
use futures::stream::Stream;
use serde::Serialize;
use tokio::sync::broadcast;

/// Create a chunked streaming response, one length-prefixed JSON document per item
pub async fn chunked_json_stream<S, T>(
    stream: S,
    compress: bool,
) -> Result<Response<Body>, StatusCode>
where
    S: Stream<Item = T> + Send + 'static,
    T: Serialize + Send + 'static,
{
    let byte_stream = stream.then(move |item| serialize_chunk(item, compress));

    let body = Body::from_stream(byte_stream);

    // Chunks are compressed individually, so no Content-Encoding on the response itself
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/octet-stream")
        .header(header::TRANSFER_ENCODING, "chunked")
        .body(body)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

/// Serialize one item: 4-byte big-endian length, then the (optionally Brotli) JSON payload
pub async fn serialize_chunk<T: Serialize>(item: T, compress: bool) -> Result<Bytes, std::io::Error> {
    let json = serde_json::to_vec(&item).map_err(std::io::Error::other)?;

    let payload = if compress {
        brotli_compress(json).await?
    } else {
        json
    };

    let mut chunk = BytesMut::with_capacity(4 + payload.len());
    chunk.put_u32(payload.len() as u32);
    chunk.put_slice(&payload);

    Ok(chunk.freeze())
}

/// Stream every item published on `rx`; items a slow client missed are skipped
pub async fn stream_from_broadcast<T>(mut rx: broadcast::Receiver<T>, compress: bool) -> impl IntoResponse
where
    T: Serialize + Clone + Send + 'static,
{
    let stream = async_stream::stream! {
        loop {
            match rx.recv().await {
                Ok(item) => yield item,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!("Dashboard stream subscriber lagged, skipped {} events", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    };

    match chunked_json_stream(stream, compress).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_chunk_is_length_prefixed() {
        let chunk = serialize_chunk(&json!({"a": 1}), false).await.unwrap();
        let payload = br#"{"a":1}"#;

        assert_eq!(&chunk[..4], &(payload.len() as u32).to_be_bytes());
        assert_eq!(&chunk[4..], payload);
    }

    #[tokio::test]
    async fn test_compressed_chunk_length_matches_payload() {
        let chunk = serialize_chunk(&json!({"series": vec![1.5; 64]}), true).await.unwrap();
        let declared = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]) as usize;
        assert_eq!(declared, chunk.len() - 4);
    }
}
