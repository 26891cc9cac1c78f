// Telemetry ingestor - turns inbound snapshots into view model updates
use crate::domain::chart::{ChartId, DISK_FREE_KEY, DISK_USED_KEY, LegendSelection, StatCardId};
use crate::domain::metric::{MetricSnapshot, ParsedSample, SnapshotError, format_value};
use crate::domain::series::{RollingSeries, SeriesWindow};
use crate::domain::view_model::{ChartUpdate, DiskBreakdown, SeriesPoint, StatCard, ViewModelUpdate};

#[derive(Debug, Clone)]
pub struct TelemetryIngestor {
    charts: Vec<(ChartId, SeriesWindow)>,
    legend: LegendSelection,
    window: usize,
}

impl TelemetryIngestor {
    pub fn new(window: usize) -> Self {
        let charts = ChartId::ALL
            .iter()
            .map(|&chart| (chart, SeriesWindow::new(chart.series().len(), window)))
            .collect();

        Self {
            charts,
            legend: LegendSelection::default(),
            window,
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn legend(&self) -> &LegendSelection {
        &self.legend
    }

    /// Only the viewer changes the legend; snapshots never touch it
    pub fn set_legend(&mut self, legend: LegendSelection) {
        self.legend = legend;
    }

    pub fn chart(&self, chart: ChartId) -> Option<&SeriesWindow> {
        self.charts
            .iter()
            .find(|(id, _)| *id == chart)
            .map(|(_, window)| window)
    }

    pub fn series(&self, chart: ChartId, name: &str) -> Option<&RollingSeries> {
        let index = chart.series().iter().position(|s| s.name == name)?;
        self.chart(chart)?.column(index)
    }

    /// Apply one raw message. Nothing is applied when it does not parse.
    pub fn ingest(&mut self, raw: &str, time_label: &str) -> Result<ViewModelUpdate, SnapshotError> {
        let snapshot = MetricSnapshot::from_json(raw)?;
        Ok(self.apply(&snapshot, time_label))
    }

    /// Fail-soft variant of [`ingest`](Self::ingest): malformed messages are dropped
    pub fn on_message(&mut self, raw: &str, time_label: &str) -> Option<ViewModelUpdate> {
        match self.ingest(raw, time_label) {
            Ok(update) => Some(update),
            Err(err) => {
                tracing::debug!("Dropping telemetry message: {}", err);
                None
            }
        }
    }

    pub fn apply(&mut self, snapshot: &MetricSnapshot, time_label: &str) -> ViewModelUpdate {
        let mut charts = Vec::new();

        for (chart, window) in &mut self.charts {
            let specs = chart.series();
            let row: Vec<Option<ParsedSample>> = specs
                .iter()
                .map(|s| snapshot.present(s.key).map(format_value))
                .collect();

            // the axis only advances when this chart got at least one reading
            if row.iter().all(Option::is_none) {
                continue;
            }

            let fresh: Vec<bool> = row.iter().map(Option::is_some).collect();
            window.push_row(
                time_label,
                row.into_iter()
                    .map(|sample| sample.unwrap_or_else(ParsedSample::gap))
                    .collect(),
            );

            let points = specs
                .iter()
                .zip(window.columns())
                .zip(fresh)
                .map(|((spec, column), fresh)| SeriesPoint {
                    series: spec.name,
                    sample: column.latest().cloned().unwrap_or_else(ParsedSample::gap),
                    fresh,
                    stats: column.stats(),
                })
                .collect();

            charts.push(ChartUpdate {
                chart: *chart,
                time_label: time_label.to_string(),
                points,
            });
        }

        ViewModelUpdate {
            time_label: time_label.to_string(),
            charts,
            disk: disk_breakdown(snapshot),
            stat_cards: stat_cards(snapshot),
            legend: self.legend.clone(),
        }
    }
}

fn disk_breakdown(snapshot: &MetricSnapshot) -> Option<DiskBreakdown> {
    let used = format_value(snapshot.present(DISK_USED_KEY)?);
    let free = format_value(snapshot.present(DISK_FREE_KEY)?);
    let unit = if used.unit.is_empty() {
        free.unit
    } else {
        used.unit
    };

    Some(DiskBreakdown {
        used: used.value,
        free: free.value,
        unit,
    })
}

fn stat_cards(snapshot: &MetricSnapshot) -> Vec<StatCard> {
    StatCardId::ALL
        .iter()
        .filter_map(|&card| {
            let parts = card
                .source_keys()
                .iter()
                .map(|key| snapshot.display(key))
                .collect::<Option<Vec<_>>>()?;
            Some(StatCard {
                card,
                display: parts.join(" | "),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::series::DEFAULT_WINDOW;

    #[test]
    fn test_end_to_end_memory_snapshot() {
        let mut ingestor = TelemetryIngestor::new(DEFAULT_WINDOW);
        let update = ingestor
            .ingest(
                r#"{"cpu_usage":"55%","used_ram":"2048MB","free_ram":"1024MB"}"#,
                "10:00:00",
            )
            .unwrap();

        assert_eq!(update.stat_card(StatCardId::CpuUsage), Some("55%"));

        let storage = update.chart(ChartId::Storage).unwrap();
        let used = storage.point("Used RAM").unwrap();
        assert_eq!(used.sample, ParsedSample::new(2048.0, "MB"));
        assert!(used.fresh);
        assert!(!storage.point("Swap Used").unwrap().fresh);

        assert!(update.disk.is_none());
        assert!(update.chart(ChartId::Network).is_none());
    }

    #[test]
    fn test_zero_readings_are_skipped() {
        // documents current behaviour: a real 0 is indistinguishable from an
        // absent key, so nothing is plotted for it
        let mut ingestor = TelemetryIngestor::new(DEFAULT_WINDOW);
        let update = ingestor
            .ingest(r#"{"packets_sent": 0, "packets_receive": 0, "cpu_usage": 0}"#, "t0")
            .unwrap();

        assert!(update.charts.is_empty());
        assert!(update.stat_card(StatCardId::CpuUsage).is_none());
        assert_eq!(ingestor.chart(ChartId::Network).unwrap().len(), 0);
    }

    #[test]
    fn test_malformed_message_changes_nothing() {
        let mut ingestor = TelemetryIngestor::new(DEFAULT_WINDOW);
        ingestor.ingest(r#"{"cpu_temp":"41.0°C"}"#, "t0").unwrap();

        assert!(matches!(
            ingestor.ingest("{not json", "t1"),
            Err(SnapshotError::Malformed(_))
        ));
        assert!(ingestor.on_message("\"just a string\"", "t2").is_none());

        let performance = ingestor.chart(ChartId::Performance).unwrap();
        assert_eq!(performance.len(), 1);
        assert_eq!(performance.labels().collect::<Vec<_>>(), vec!["t0"]);
    }

    #[test]
    fn test_unparseable_value_plots_as_gap() {
        let mut ingestor = TelemetryIngestor::new(DEFAULT_WINDOW);
        ingestor.ingest(r#"{"cpu_temp":"40°C"}"#, "t0").unwrap();
        let update = ingestor.ingest(r#"{"cpu_temp":"n/a"}"#, "t1").unwrap();

        let point = update
            .chart(ChartId::Performance)
            .unwrap()
            .point("CPU Temp")
            .unwrap();
        assert!(point.fresh);
        assert!(point.sample.value.is_nan());
        assert_eq!(point.stats.map(|s| (s.min, s.max)), Some((40.0, 40.0)));
    }

    #[test]
    fn test_window_caps_at_most_recent_samples() {
        let mut ingestor = TelemetryIngestor::new(DEFAULT_WINDOW);
        for i in 1..=620 {
            let raw = format!(r#"{{"cpu_usage":"{i}%"}}"#);
            ingestor.ingest(&raw, &format!("t{i}")).unwrap();
        }

        let series = ingestor.series(ChartId::Performance, "CPU Usage").unwrap();
        assert_eq!(series.len(), 500);
        let values: Vec<f64> = series.values().collect();
        assert_eq!(values.first(), Some(&121.0));
        assert_eq!(values.last(), Some(&620.0));
        assert!(values.windows(2).all(|pair| pair[0] < pair[1]));

        let performance = ingestor.chart(ChartId::Performance).unwrap();
        assert_eq!(performance.len(), 500);
        assert!(performance.columns().iter().all(|c| c.len() == 500));
    }

    #[test]
    fn test_stats_in_update_track_window() {
        let mut ingestor = TelemetryIngestor::new(3);
        let mut last = None;
        for v in ["-5", "20", "7", "9", "8"] {
            last = Some(ingestor.ingest(&format!(r#"{{"cpu_temp":"{v}°C"}}"#), "t").unwrap());
        }

        let update = last.unwrap();
        let point = update
            .chart(ChartId::Performance)
            .unwrap()
            .point("CPU Temp")
            .unwrap();
        let stats = point.stats.unwrap();
        assert_eq!((stats.min, stats.max), (7.0, 9.0));
        assert_eq!(point.sample.unit, "°C");
    }

    #[test]
    fn test_legend_survives_updates() {
        let mut ingestor = TelemetryIngestor::new(DEFAULT_WINDOW);
        let mut legend = LegendSelection::default();
        legend.set("CPU Temp", false);
        legend.set("Packets Sent", true);
        ingestor.set_legend(legend.clone());

        for i in 0..3 {
            let update = ingestor
                .ingest(r#"{"cpu_temp":"41°C","packets_sent":"12"}"#, &format!("t{i}"))
                .unwrap();
            assert_eq!(update.legend, legend);
        }
        assert_eq!(ingestor.legend(), &legend);
    }

    #[test]
    fn test_disk_breakdown_needs_both_fields() {
        let mut ingestor = TelemetryIngestor::new(DEFAULT_WINDOW);
        let update = ingestor.ingest(r#"{"disk_used":"120GB"}"#, "t0").unwrap();
        assert!(update.disk.is_none());

        let update = ingestor
            .ingest(r#"{"disk_used":"120","disk_free":"80GB"}"#, "t1")
            .unwrap();
        assert_eq!(
            update.disk,
            Some(DiskBreakdown {
                used: 120.0,
                free: 80.0,
                unit: "GB".to_string(),
            })
        );
    }

    #[test]
    fn test_load_average_needs_all_three() {
        let mut ingestor = TelemetryIngestor::new(DEFAULT_WINDOW);
        let update = ingestor
            .ingest(r#"{"load_1":"0.52","load_5":"0.48"}"#, "t0")
            .unwrap();
        assert!(update.stat_card(StatCardId::LoadAverage).is_none());

        let update = ingestor
            .ingest(
                r#"{"load_1":"0.52","load_5":"0.48","load_15":"0.40","process_count":214}"#,
                "t1",
            )
            .unwrap();
        assert_eq!(
            update.stat_card(StatCardId::LoadAverage),
            Some("0.52 | 0.48 | 0.40")
        );
        assert_eq!(update.stat_card(StatCardId::ProcessCount), Some("214"));
    }

    #[test]
    fn test_shared_axis_advances_once_per_message() {
        let mut ingestor = TelemetryIngestor::new(DEFAULT_WINDOW);
        ingestor
            .ingest(r#"{"packets_receive":"10","packets_sent":"4","free_ram":"1GB"}"#, "t0")
            .unwrap();
        ingestor.ingest(r#"{"packets_sent":"5"}"#, "t1").unwrap();

        let network = ingestor.chart(ChartId::Network).unwrap();
        assert_eq!(network.len(), 2);
        assert!(network.column(0).unwrap().latest().unwrap().is_gap());
        assert_eq!(ingestor.chart(ChartId::Storage).unwrap().len(), 1);
        assert_eq!(ingestor.chart(ChartId::Performance).unwrap().len(), 2);
    }
}
