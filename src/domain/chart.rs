// Chart layout domain model - which metrics feed which widgets
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartId {
    Performance,
    Network,
    Storage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesSpec {
    pub name: &'static str,
    pub key: &'static str,
}

const fn spec(name: &'static str, key: &'static str) -> SeriesSpec {
    SeriesSpec { name, key }
}

const PERFORMANCE_SERIES: &[SeriesSpec] = &[
    spec("Average Chipset Temp", "average_chipset_temp"),
    spec("CPU Temp", "cpu_temp"),
    spec("CPU Usage", "cpu_usage"),
    spec("Free RAM", "free_ram"),
    spec("Used RAM", "used_ram"),
    spec("Used RAM Percentage", "used_ram_percentage"),
    spec("Packets Received", "packets_receive"),
    spec("Packets Sent", "packets_sent"),
];

const NETWORK_SERIES: &[SeriesSpec] = &[
    spec("Packets Received", "packets_receive"),
    spec("Packets Sent", "packets_sent"),
];

const STORAGE_SERIES: &[SeriesSpec] = &[
    spec("Free RAM", "free_ram"),
    spec("Used RAM", "used_ram"),
    spec("Used RAM Percentage", "used_ram_percentage"),
    spec("Swap Used", "swap_used"),
];

impl ChartId {
    pub const ALL: [ChartId; 3] = [ChartId::Performance, ChartId::Network, ChartId::Storage];

    pub fn title(self) -> &'static str {
        match self {
            ChartId::Performance => "Performance",
            ChartId::Network => "Network",
            ChartId::Storage => "Storage",
        }
    }

    pub fn series(self) -> &'static [SeriesSpec] {
        match self {
            ChartId::Performance => PERFORMANCE_SERIES,
            ChartId::Network => NETWORK_SERIES,
            ChartId::Storage => STORAGE_SERIES,
        }
    }
}

pub const DISK_USED_KEY: &str = "disk_used";
pub const DISK_FREE_KEY: &str = "disk_free";

/// Latest-only widgets fed straight from the snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatCardId {
    CpuUsage,
    MemoryUsage,
    DiskUsage,
    Uptime,
    LoadAverage,
    ProcessCount,
    SwapUsage,
    CpuFrequency,
}

impl StatCardId {
    pub const ALL: [StatCardId; 8] = [
        StatCardId::CpuUsage,
        StatCardId::MemoryUsage,
        StatCardId::DiskUsage,
        StatCardId::Uptime,
        StatCardId::LoadAverage,
        StatCardId::ProcessCount,
        StatCardId::SwapUsage,
        StatCardId::CpuFrequency,
    ];

    /// Snapshot keys shown on this card; all of them must be present
    pub fn source_keys(self) -> &'static [&'static str] {
        match self {
            StatCardId::CpuUsage => &["cpu_usage"],
            StatCardId::MemoryUsage => &["used_ram_percentage"],
            StatCardId::DiskUsage => &["disk_usage_percent"],
            StatCardId::Uptime => &["uptime"],
            StatCardId::LoadAverage => &["load_1", "load_5", "load_15"],
            StatCardId::ProcessCount => &["process_count"],
            StatCardId::SwapUsage => &["swap_percent"],
            StatCardId::CpuFrequency => &["cpu_mhz"],
        }
    }
}

/// Series visibility chosen by the viewer. Names not in the map are visible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LegendSelection(BTreeMap<String, bool>);

impl LegendSelection {
    pub fn is_visible(&self, series: &str) -> bool {
        self.0.get(series).copied().unwrap_or(true)
    }

    pub fn set(&mut self, series: impl Into<String>, visible: bool) {
        self.0.insert(series.into(), visible);
    }
}

impl Default for LegendSelection {
    fn default() -> Self {
        let hidden = ["Packets Received", "Packets Sent", "Free RAM"];
        Self(hidden.iter().map(|name| (name.to_string(), false)).collect())
    }
}
