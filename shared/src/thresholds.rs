//! Alarm threshold inputs and the rule that keeps server refreshes from
//! overwriting an edit in progress.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::format::format_number;
use crate::model::ThresholdSet;

pub const DEFAULT_HINT: &str = "Leave a field empty to disable that alarm.";
pub const DIRTY_HINT: &str = "Unsaved changes. Refreshes will not overwrite them while you edit.";
pub const UPDATED_HINT: &str = "Thresholds updated.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{label} must be a number")]
    NotNumeric { label: String },

    #[error("pulse time must be a whole number of milliseconds")]
    PulseTimeNotInteger,

    #[error("pulse time must be between {min} and {max} ms, got {value}")]
    PulseTimeOutOfRange { min: u64, max: u64, value: i64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThresholdChannel {
    Temp,
    Humi,
    Soil,
    Lux,
}

impl ThresholdChannel {
    pub const ALL: [Self; 4] = [Self::Temp, Self::Humi, Self::Soil, Self::Lux];

    pub fn label(self) -> &'static str {
        match self {
            Self::Temp => "Temperature",
            Self::Humi => "Humidity",
            Self::Soil => "Soil moisture",
            Self::Lux => "Light level",
        }
    }

    fn index(self) -> usize {
        match self {
            Self::Temp => 0,
            Self::Humi => 1,
            Self::Soil => 2,
            Self::Lux => 3,
        }
    }

    fn pick(self, set: &ThresholdSet) -> Option<f64> {
        match self {
            Self::Temp => set.temp,
            Self::Humi => set.humi,
            Self::Soil => set.soil,
            Self::Lux => set.lux,
        }
    }
}

/// Server values may replace the inputs unless the user has unsaved edits
/// and is still focused on one of the tracked inputs.
pub fn should_accept_server_thresholds(
    is_dirty: bool,
    focused: Option<ThresholdChannel>,
    tracked: &[ThresholdChannel],
) -> bool {
    !(is_dirty && focused.is_some_and(|f| tracked.contains(&f)))
}

/// Empty input disables the channel; anything else must parse as a number.
pub fn read_threshold_input(raw: &str, label: &str) -> Result<Option<f64>, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(Some(value)),
        _ => Err(ValidationError::NotNumeric {
            label: label.to_string(),
        }),
    }
}

fn server_value_text(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format_number(v),
        _ => String::new(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdGuard {
    dirty: bool,
    focused: Option<ThresholdChannel>,
    inputs: [String; 4],
    hint: String,
}

impl Default for ThresholdGuard {
    fn default() -> Self {
        Self {
            dirty: false,
            focused: None,
            inputs: Default::default(),
            hint: DEFAULT_HINT.to_string(),
        }
    }
}

impl ThresholdGuard {
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn input(&self, channel: ThresholdChannel) -> &str {
        &self.inputs[channel.index()]
    }

    pub fn hint(&self) -> &str {
        &self.hint
    }

    pub fn set_hint(&mut self, hint: impl Into<String>) {
        self.hint = hint.into();
    }

    pub fn reset_hint(&mut self) {
        self.hint = DEFAULT_HINT.to_string();
    }

    pub fn mark_dirty(&mut self, channel: ThresholdChannel, text: impl Into<String>) {
        self.inputs[channel.index()] = text.into();
        self.dirty = true;
        self.hint = DIRTY_HINT.to_string();
    }

    pub fn set_focus(&mut self, focused: Option<ThresholdChannel>) {
        self.focused = focused;
    }

    /// Called once the bridge has accepted a submission.
    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    /// Applies server thresholds if the edit guard allows it.
    pub fn reconcile(&mut self, server: &ThresholdSet) -> bool {
        if !should_accept_server_thresholds(self.dirty, self.focused, &ThresholdChannel::ALL) {
            debug!(focused = ?self.focused, "server thresholds held back by unsaved edit");
            return false;
        }

        for channel in ThresholdChannel::ALL {
            self.inputs[channel.index()] = server_value_text(channel.pick(server));
        }
        self.dirty = false;
        self.reset_hint();
        true
    }

    pub fn build_payload(&self) -> Result<ThresholdSet, ValidationError> {
        let read =
            |channel: ThresholdChannel| read_threshold_input(self.input(channel), channel.label());
        Ok(ThresholdSet {
            temp: read(ThresholdChannel::Temp)?,
            humi: read(ThresholdChannel::Humi)?,
            soil: read(ThresholdChannel::Soil)?,
            lux: read(ThresholdChannel::Lux)?,
        })
    }
}
