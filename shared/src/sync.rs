//! Turns a `/api/state` snapshot into the rendered device view.
//!
//! Each top-level section is decoded on its own. A section that fails to
//! decode degrades only its own sub-view and is logged at debug level.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::ClientError;
use crate::format::{
    format_age, format_duration, format_measurement, format_number, format_switch, SENTINEL,
};
use crate::model::{AlarmSummary, CommandAck, SensorReading, ThresholdSet, WifiStatus};

pub const WAITING_HINT: &str = "Waiting for the first reading from the controller...";
pub const NO_RECEIPT: &str = "No receipt yet.";
pub const NO_ALARM: &str = "No alarm recorded.";

/// One snapshot, decoded section by section.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceSnapshot {
    pub wifi: Option<WifiStatus>,
    pub stm32_reported_ip: Option<String>,
    pub uptime_seconds: Option<u64>,
    pub latest_data: Option<SensorReading>,
    pub latest_ack: Option<CommandAck>,
    pub thresholds: Option<ThresholdSet>,
    pub alarm: Option<AlarmSummary>,
}

impl DeviceSnapshot {
    /// Never fails: anything that is not a JSON object yields an empty snapshot.
    pub fn from_json(raw: &Value) -> Self {
        let Some(root) = raw.as_object() else {
            debug!("state body is not a JSON object");
            return Self::default();
        };

        Self {
            wifi: section(root.get("wifi"), "wifi"),
            stm32_reported_ip: root
                .get("stm32ReportedIp")
                .and_then(Value::as_str)
                .filter(|ip| !ip.is_empty())
                .map(str::to_string),
            uptime_seconds: root.get("uptimeSeconds").and_then(uptime_seconds),
            latest_data: section(root.get("latestData"), "latestData"),
            latest_ack: section(root.get("latestAck"), "latestAck"),
            thresholds: section(root.get("thresholds"), "thresholds"),
            alarm: section(root.get("alarm"), "alarm"),
        }
    }
}

fn section<T: DeserializeOwned>(value: Option<&Value>, name: &'static str) -> Option<T> {
    let value = value.filter(|v| !v.is_null())?;
    match serde_json::from_value(value.clone()) {
        Ok(decoded) => Some(decoded),
        Err(e) => {
            let err = ClientError::PartialData {
                section: name,
                reason: e.to_string(),
            };
            debug!(error = %err, "snapshot section degraded");
            None
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn uptime_seconds(value: &Value) -> Option<u64> {
    value
        .as_u64()
        .or_else(|| value.as_f64().filter(|v| v.is_finite() && *v >= 0.0).map(|v| v as u64))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusView {
    pub wifi: String,
    pub bridge_ip: String,
    pub controller_ip: String,
    pub uptime: String,
}

impl Default for StatusView {
    fn default() -> Self {
        Self::from_snapshot(&DeviceSnapshot::default())
    }
}

impl StatusView {
    pub fn from_snapshot(snapshot: &DeviceSnapshot) -> Self {
        let wifi = snapshot.wifi.as_ref();
        Self {
            wifi: if wifi.is_some_and(|w| w.connected) {
                "connected"
            } else {
                "disconnected"
            }
            .to_string(),
            bridge_ip: wifi
                .and_then(|w| w.ip.clone())
                .filter(|ip| !ip.is_empty())
                .unwrap_or_else(|| "unknown".to_string()),
            controller_ip: snapshot
                .stm32_reported_ip
                .clone()
                .unwrap_or_else(|| "not reported".to_string()),
            uptime: format_duration(snapshot.uptime_seconds.unwrap_or(0)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorCells {
    pub temp: String,
    pub humi: String,
    pub soil: String,
    pub lux: String,
    pub water: String,
    pub light: String,
    pub fan: String,
    pub buzzer: String,
    pub age: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SensorView {
    Waiting { hint: String },
    Reading(SensorCells),
}

impl Default for SensorView {
    fn default() -> Self {
        Self::Waiting {
            hint: WAITING_HINT.to_string(),
        }
    }
}

impl SensorView {
    pub fn from_reading(reading: Option<&SensorReading>) -> Self {
        let Some(r) = reading else {
            return Self::default();
        };
        Self::Reading(SensorCells {
            temp: format_measurement(r.temp, Some(1), "°C"),
            humi: format_measurement(r.humi, Some(1), "%"),
            soil: format_measurement(r.soil, None, "%"),
            lux: format_measurement(r.lux, Some(1), "lx"),
            water: format_switch(r.water),
            light: format_switch(r.light),
            fan: format_switch(r.fan),
            buzzer: format_switch(r.buzzer),
            age: format_age(r.age_ms),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AckView {
    None { text: String },
    Receipt {
        target: String,
        action: String,
        result: String,
        age: String,
        success: bool,
    },
}

impl Default for AckView {
    fn default() -> Self {
        Self::None {
            text: NO_RECEIPT.to_string(),
        }
    }
}

impl AckView {
    pub fn from_ack(ack: Option<&CommandAck>) -> Self {
        let Some(ack) = ack else {
            return Self::default();
        };
        let or_sentinel = |s: &str| {
            if s.is_empty() {
                SENTINEL.to_string()
            } else {
                s.to_string()
            }
        };
        Self::Receipt {
            target: or_sentinel(&ack.target),
            action: or_sentinel(&ack.action),
            result: or_sentinel(&ack.result),
            age: format_age(ack.age_ms),
            success: ack.is_success(),
        }
    }
}

/// Multi-line alarm summary, always rendered.
pub fn alarm_text(alarm: Option<&AlarmSummary>) -> String {
    let Some(alarm) = alarm else {
        return NO_ALARM.to_string();
    };

    let mut lines = vec![format!("Alarms triggered: {}", alarm.count)];
    if let Some(reason) = alarm.reason.as_deref().filter(|r| !r.is_empty()) {
        lines.push(format!("Last reason: {reason}"));
    }
    if alarm.age_ms.is_some() {
        lines.push(format!("Last trigger: {}", format_age(alarm.age_ms)));
    }
    if let Some(cooldown) = alarm.cooldown_ms.filter(|ms| *ms != 0.0) {
        lines.push(format!("Cooldown: {} s", format_number((cooldown / 1000.0).round())));
    }
    if let Some(pulse) = alarm.pulse_ms.filter(|ms| *ms != 0.0) {
        lines.push(format!("Buzzer pulse: {} ms", format_number(pulse)));
    }
    lines.join("\n")
}

/// Everything derived from the last applied snapshot, apart from the
/// threshold inputs, which the edit guard owns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceView {
    pub status: StatusView,
    pub sensors: SensorView,
    pub ack: AckView,
    pub alarm: String,
}

impl Default for DeviceView {
    fn default() -> Self {
        Self {
            status: StatusView::default(),
            sensors: SensorView::default(),
            ack: AckView::default(),
            alarm: NO_ALARM.to_string(),
        }
    }
}

impl DeviceView {
    /// Replaces every sub-view from `snapshot`. Pure in the snapshot, so
    /// applying the same one twice changes nothing.
    pub fn apply(&mut self, snapshot: &DeviceSnapshot) {
        self.status = StatusView::from_snapshot(snapshot);
        self.sensors = SensorView::from_reading(snapshot.latest_data.as_ref());
        self.ack = AckView::from_ack(snapshot.latest_ack.as_ref());
        self.apply_alarm(snapshot.alarm.as_ref());
    }

    pub fn apply_alarm(&mut self, alarm: Option<&AlarmSummary>) {
        self.alarm = alarm_text(alarm);
    }
}
