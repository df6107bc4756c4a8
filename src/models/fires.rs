//! Response models for the fires aggregation endpoints.
//!
//! Shapes follow the backend's JSON exactly. Two endpoints answer with one
//! of two payloads depending on whether the filtered range holds any data;
//! those are modeled as untagged enums so the empty case is a value, not a
//! parse failure.

use serde::{Deserialize, Deserializer, Serialize};

/// Accept either a JSON string or a JSON number, normalizing to `String`.
///
/// The backend emits `fires/total` `value` as a number and the worst-day
/// duration as a preformatted string, while consumers treat both as display
/// text.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Int(n) => n.to_string(),
        Raw::Float(n) => n.to_string(),
    })
}

/// Fire count for one calendar month, e.g. `{"month": "2023-07", "count": 12}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyCount {
    pub month: String,
    pub count: u64,
}

/// Total fire count over the selected range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TotalFires {
    #[serde(deserialize_with = "string_or_number")]
    pub value: String,
}

/// The district with the most fires, or the no-data marker `{"value": "None"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MostAffectedDistrict {
    District {
        value: String,
        #[serde(rename = "subValue", deserialize_with = "string_or_number")]
        sub_value: String,
    },
    NoData {
        value: String,
    },
}

impl MostAffectedDistrict {
    pub fn is_no_data(&self) -> bool {
        matches!(self, MostAffectedDistrict::NoData { .. })
    }
}

/// Fire count for one district. `district` is null for unattributed fires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistrictCount {
    pub district: Option<String>,
    pub count: u64,
}

/// One bin of the fire-duration histogram, e.g. `{"label": "0.0-0.5", "count": 3}`.
/// The final bin is open-ended, labeled `"> 14.5"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DurationBin {
    pub label: String,
    pub count: u64,
}

/// Resources deployed on the worst day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceTotals {
    pub man: u64,
    pub terrain: u64,
    pub aerial: u64,
}

/// Aggregate statistics for the single worst day in the selected range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorstDay {
    /// Day with the most fires, formatted `YYYY-MM-DD`.
    pub worst_day: String,
    pub total_fires: u64,
    pub total_resources: ResourceTotals,
    /// Preformatted duration, e.g. `"3h45m"`.
    #[serde(deserialize_with = "string_or_number")]
    pub largest_fire_duration_hours: String,
    pub fire_with_longest_duration: Option<String>,
    pub districts: Vec<String>,
}

/// Worst-day endpoint payload: stats, or a message when the range is empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WorstDayStats {
    Stats(WorstDay),
    NoData { message: String },
}

impl WorstDayStats {
    pub fn stats(&self) -> Option<&WorstDay> {
        match self {
            WorstDayStats::Stats(s) => Some(s),
            WorstDayStats::NoData { .. } => None,
        }
    }
}
