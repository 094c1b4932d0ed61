//! Wire types for what the bridge reports.
//!
//! The bridge is firmware on a small board, so field presence and types are
//! treated as advisory: numeric fields that arrive as anything other than a
//! JSON number decode as `None` instead of failing the surrounding object.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Value::deserialize(deserializer)?
        .as_f64()
        .filter(|v| !v.is_nan()))
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

fn lenient_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let count = value
        .as_u64()
        .or_else(|| value.as_f64().filter(|v| *v >= 0.0).map(|v| v as u64))
        .unwrap_or(0);
    Ok(count)
}

/// Actuator state as reported by the microcontroller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum SwitchState {
    On,
    Off,
    #[default]
    Unknown,
}

impl SwitchState {
    /// `true`/`1` are on, `false`/`0` are off, any other number is on iff
    /// positive, and every non-numeric, non-boolean value is unknown.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Bool(true) => Self::On,
            Value::Bool(false) => Self::Off,
            Value::Number(n) => match n.as_f64() {
                Some(v) if v > 0.0 => Self::On,
                Some(_) => Self::Off,
                None => Self::Unknown,
            },
            _ => Self::Unknown,
        }
    }
}

impl<'de> Deserialize<'de> for SwitchState {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Self::from_value(&Value::deserialize(deserializer)?))
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WifiStatus {
    pub connected: bool,
    #[serde(deserialize_with = "lenient_text")]
    pub ip: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SensorReading {
    #[serde(deserialize_with = "lenient_number")]
    pub temp: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub humi: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub soil: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub lux: Option<f64>,
    pub water: SwitchState,
    pub light: SwitchState,
    pub fan: SwitchState,
    pub buzzer: SwitchState,
    #[serde(deserialize_with = "lenient_number")]
    pub age_ms: Option<f64>,
}

/// Most recent command outcome. Replaced wholesale on every snapshot.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CommandAck {
    pub target: String,
    pub action: String,
    pub result: String,
    #[serde(deserialize_with = "lenient_number")]
    pub age_ms: Option<f64>,
}

impl CommandAck {
    pub fn is_success(&self) -> bool {
        self.result == "ok"
    }
}

/// Per-channel alarm limits; `None` disables the channel.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdSet {
    #[serde(deserialize_with = "lenient_number")]
    pub temp: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub humi: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub soil: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub lux: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AlarmSummary {
    #[serde(deserialize_with = "lenient_count")]
    pub count: u64,
    #[serde(deserialize_with = "lenient_text")]
    pub reason: Option<String>,
    #[serde(deserialize_with = "lenient_number")]
    pub age_ms: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub cooldown_ms: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub pulse_ms: Option<f64>,
}

/// Acknowledgement body of `POST /api/cmd`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CommandReceipt {
    #[serde(deserialize_with = "lenient_count_opt")]
    pub queued_id: Option<u64>,
}

fn lenient_count_opt<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Value::deserialize(deserializer)?.as_u64())
}
