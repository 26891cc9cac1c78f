// Renderer-side dashboard state, rebuilt from view model updates
use crate::domain::chart::{ChartId, LegendSelection, StatCardId};
use crate::domain::connection::{ConnectionState, ConnectionView};
use crate::domain::metric::ParsedSample;
use crate::domain::series::RollingStats;
use crate::domain::view_model::{DiskBreakdown, ViewModelUpdate};
use serde::Serialize;
use std::collections::{BTreeMap, VecDeque};

#[derive(Debug, Clone, Serialize)]
pub struct SeriesView {
    pub name: &'static str,
    pub samples: VecDeque<ParsedSample>,
    pub stats: Option<RollingStats>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartView {
    pub chart: ChartId,
    pub title: &'static str,
    pub labels: VecDeque<String>,
    pub series: Vec<SeriesView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub charts: Vec<ChartView>,
    pub stat_cards: BTreeMap<StatCardId, String>,
    pub disk: Option<DiskBreakdown>,
    pub legend: LegendSelection,
    pub connection: ConnectionView,
    #[serde(skip)]
    window: usize,
}

impl DashboardView {
    pub fn new(window: usize) -> Self {
        let charts = ChartId::ALL
            .iter()
            .map(|&chart| ChartView {
                chart,
                title: chart.title(),
                labels: VecDeque::new(),
                series: chart
                    .series()
                    .iter()
                    .map(|spec| SeriesView {
                        name: spec.name,
                        samples: VecDeque::new(),
                        stats: None,
                    })
                    .collect(),
            })
            .collect();

        Self {
            charts,
            stat_cards: BTreeMap::new(),
            disk: None,
            legend: LegendSelection::default(),
            connection: ConnectionView::from(ConnectionState::Connecting),
            window: window.max(1),
        }
    }

    pub fn chart(&self, chart: ChartId) -> Option<&ChartView> {
        self.charts.iter().find(|c| c.chart == chart)
    }

    pub fn apply(&mut self, update: &ViewModelUpdate) {
        for chart_update in &update.charts {
            let Some(chart) = self.charts.iter_mut().find(|c| c.chart == chart_update.chart) else {
                continue;
            };

            push_bounded(&mut chart.labels, chart_update.time_label.clone(), self.window);
            for series in &mut chart.series {
                let point = chart_update.point(series.name);
                let sample = point
                    .map(|p| p.sample.clone())
                    .unwrap_or_else(ParsedSample::gap);
                push_bounded(&mut series.samples, sample, self.window);
                if let Some(point) = point {
                    series.stats = point.stats;
                }
            }
        }

        for card in &update.stat_cards {
            self.stat_cards.insert(card.card, card.display.clone());
        }
        if let Some(disk) = &update.disk {
            self.disk = Some(disk.clone());
        }
        self.legend = update.legend.clone();
    }
}

fn push_bounded<T>(buffer: &mut VecDeque<T>, item: T, window: usize) {
    buffer.push_back(item);
    while buffer.len() > window {
        buffer.pop_front();
    }
}
