// View model - what one ingested snapshot changes on the dashboard
use super::chart::{ChartId, LegendSelection, StatCardId};
use super::metric::ParsedSample;
use super::series::RollingStats;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub series: &'static str,
    pub sample: ParsedSample,
    /// False when the point is a gap filler for a metric missing this tick
    pub fresh: bool,
    pub stats: Option<RollingStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartUpdate {
    pub chart: ChartId,
    pub time_label: String,
    pub points: Vec<SeriesPoint>,
}

impl ChartUpdate {
    pub fn point(&self, series: &str) -> Option<&SeriesPoint> {
        self.points.iter().find(|p| p.series == series)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiskBreakdown {
    pub used: f64,
    pub free: f64,
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatCard {
    pub card: StatCardId,
    pub display: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewModelUpdate {
    pub time_label: String,
    pub charts: Vec<ChartUpdate>,
    pub disk: Option<DiskBreakdown>,
    pub stat_cards: Vec<StatCard>,
    pub legend: LegendSelection,
}

impl ViewModelUpdate {
    pub fn chart(&self, chart: ChartId) -> Option<&ChartUpdate> {
        self.charts.iter().find(|c| c.chart == chart)
    }

    pub fn stat_card(&self, card: StatCardId) -> Option<&str> {
        self.stat_cards
            .iter()
            .find(|c| c.card == card)
            .map(|c| c.display.as_str())
    }
}
