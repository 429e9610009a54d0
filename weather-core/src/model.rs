//! Provider payloads. Every display field is optional: the provider may omit
//! fields or send numbers as strings, and formatting falls back to defaults.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub const UNKNOWN_TEXT: &str = "未知";
pub const UNKNOWN_VALUE: &str = "?";
pub const UNKNOWN_AQI: &str = "N/A";
pub const UNKNOWN_ICON: &str = "999";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NowResponse {
    #[serde(default, deserialize_with = "nullable")]
    pub now: CurrentConditions,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HourlyResponse {
    #[serde(default, deserialize_with = "nullable")]
    pub hourly: Vec<HourlyEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WarningResponse {
    #[serde(default, deserialize_with = "nullable")]
    pub warning: Vec<Alert>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AirResponse {
    #[serde(default, deserialize_with = "nullable")]
    pub now: AirQuality,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CurrentConditions {
    #[serde(default, deserialize_with = "scalar")]
    pub icon: Option<String>,
    #[serde(default, deserialize_with = "scalar")]
    pub text: Option<String>,
    #[serde(default, deserialize_with = "scalar")]
    pub temp: Option<String>,
    #[serde(default, deserialize_with = "scalar")]
    pub humidity: Option<String>,
    #[serde(default, deserialize_with = "scalar")]
    pub dew: Option<String>,
}

impl CurrentConditions {
    pub fn icon(&self) -> &str {
        self.icon.as_deref().unwrap_or(UNKNOWN_ICON)
    }

    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or(UNKNOWN_TEXT)
    }

    pub fn temp(&self) -> &str {
        self.temp.as_deref().unwrap_or(UNKNOWN_VALUE)
    }

    pub fn humidity(&self) -> &str {
        self.humidity.as_deref().unwrap_or(UNKNOWN_VALUE)
    }

    pub fn dew(&self) -> &str {
        self.dew.as_deref().unwrap_or(UNKNOWN_VALUE)
    }
}

/// One hour of the 24h forecast. `fx_time` is ISO-8601 with an offset,
/// e.g. `2024-06-01T14:00+08:00`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct HourlyEntry {
    #[serde(rename = "fxTime", default, deserialize_with = "scalar")]
    pub fx_time: Option<String>,
    #[serde(default, deserialize_with = "scalar")]
    pub text: Option<String>,
    #[serde(default, deserialize_with = "scalar")]
    pub temp: Option<String>,
    #[serde(default, deserialize_with = "scalar")]
    pub humidity: Option<String>,
}

impl HourlyEntry {
    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or(UNKNOWN_TEXT)
    }

    pub fn temp(&self) -> &str {
        self.temp.as_deref().unwrap_or(UNKNOWN_VALUE)
    }

    pub fn humidity(&self) -> &str {
        self.humidity.as_deref().unwrap_or(UNKNOWN_VALUE)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Alert {
    #[serde(default, deserialize_with = "scalar")]
    pub text: Option<String>,
}

impl Alert {
    /// Description with embedded line breaks flattened to spaces.
    pub fn single_line(&self) -> String {
        self.text
            .as_deref()
            .unwrap_or_default()
            .replace("\r\n", " ")
            .replace('\n', " ")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AirQuality {
    #[serde(default, deserialize_with = "scalar")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "scalar")]
    pub aqi: Option<String>,
}

impl AirQuality {
    pub fn category(&self) -> &str {
        self.category.as_deref().unwrap_or(UNKNOWN_TEXT)
    }

    pub fn aqi(&self) -> &str {
        self.aqi.as_deref().unwrap_or(UNKNOWN_AQI)
    }
}

/// Everything one run reads from the provider.
#[derive(Debug, Clone, Default)]
pub struct WeatherSnapshot {
    pub now: CurrentConditions,
    pub hourly: Vec<HourlyEntry>,
    pub alerts: Vec<Alert>,
    pub air: AirQuality,
}

/// Accepts a JSON string or number and keeps its textual form.
fn scalar<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

/// Treats an explicit `null` like a missing field.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
