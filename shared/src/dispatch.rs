//! Manual actuator commands.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::CommandReceipt;
use crate::thresholds::ValidationError;

pub const MIN_PULSE_MS: u64 = 1;
pub const MAX_PULSE_MS: u64 = 10_000;
pub const DEFAULT_PULSE_TEXT: &str = "1000";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandTarget {
    #[default]
    Water,
    Light,
    Fan,
    Buzzer,
}

impl CommandTarget {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Water => "water",
            Self::Light => "light",
            Self::Fan => "fan",
            Self::Buzzer => "buzzer",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandAction {
    #[default]
    On,
    Off,
    Pulse,
}

impl CommandAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::On => "on",
            Self::Off => "off",
            Self::Pulse => "pulse",
        }
    }
}

impl fmt::Display for CommandTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for CommandAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of `POST /api/cmd`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandPayload {
    pub target: CommandTarget,
    pub action: CommandAction,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub time: Option<u64>,
}

pub fn pulse_time_visible(action: CommandAction) -> bool {
    action == CommandAction::Pulse
}

fn parse_pulse_time(raw: &str) -> Result<u64, ValidationError> {
    let value: i64 = raw
        .trim()
        .parse()
        .map_err(|_| ValidationError::PulseTimeNotInteger)?;
    match u64::try_from(value) {
        Ok(ms) if (MIN_PULSE_MS..=MAX_PULSE_MS).contains(&ms) => Ok(ms),
        _ => Err(ValidationError::PulseTimeOutOfRange {
            min: MIN_PULSE_MS,
            max: MAX_PULSE_MS,
            value,
        }),
    }
}

/// The time field is read only for pulses; whatever it holds otherwise is
/// left out of the payload.
pub fn build_command(
    target: CommandTarget,
    action: CommandAction,
    time_text: &str,
) -> Result<CommandPayload, ValidationError> {
    let time = if pulse_time_visible(action) {
        Some(parse_pulse_time(time_text)?)
    } else {
        None
    };
    Ok(CommandPayload {
        target,
        action,
        time,
    })
}

pub fn receipt_hint(receipt: &CommandReceipt) -> String {
    match receipt.queued_id {
        Some(id) => format!("Command sent, queued message #{id}"),
        None => "Command sent, queued message #unknown".to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandForm {
    pub target: CommandTarget,
    pub action: CommandAction,
    pub time_text: String,
    pub hint: Option<String>,
    pub in_flight: bool,
}

impl Default for CommandForm {
    fn default() -> Self {
        Self {
            target: CommandTarget::default(),
            action: CommandAction::default(),
            time_text: DEFAULT_PULSE_TEXT.to_string(),
            hint: None,
            in_flight: false,
        }
    }
}

impl CommandForm {
    pub fn time_visible(&self) -> bool {
        pulse_time_visible(self.action)
    }

    pub fn build(&self) -> Result<CommandPayload, ValidationError> {
        build_command(self.target, self.action, &self.time_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn time_field_only_for_pulse() {
        assert!(pulse_time_visible(CommandAction::Pulse));
        assert!(!pulse_time_visible(CommandAction::On));
        assert!(!pulse_time_visible(CommandAction::Off));
    }

    #[test]
    fn non_pulse_command_omits_time() {
        let payload = build_command(CommandTarget::Fan, CommandAction::On, "500").unwrap();
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({"target": "fan", "action": "on"})
        );
    }

    #[test]
    fn stale_garbage_time_ignored_when_not_pulsing() {
        let payload = build_command(CommandTarget::Light, CommandAction::Off, "abc").unwrap();
        assert_eq!(payload.time, None);
    }

    #[test]
    fn pulse_command_carries_time() {
        let payload = build_command(CommandTarget::Buzzer, CommandAction::Pulse, " 750 ").unwrap();
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({"target": "buzzer", "action": "pulse", "time": 750})
        );
    }

    #[test]
    fn pulse_time_bounds() {
        assert!(build_command(CommandTarget::Water, CommandAction::Pulse, "1").is_ok());
        assert!(build_command(CommandTarget::Water, CommandAction::Pulse, "10000").is_ok());
        assert_eq!(
            build_command(CommandTarget::Water, CommandAction::Pulse, "0"),
            Err(ValidationError::PulseTimeOutOfRange {
                min: 1,
                max: 10_000,
                value: 0
            })
        );
        assert!(build_command(CommandTarget::Water, CommandAction::Pulse, "10001").is_err());
        assert!(build_command(CommandTarget::Water, CommandAction::Pulse, "-5").is_err());
        assert_eq!(
            build_command(CommandTarget::Water, CommandAction::Pulse, "2.5"),
            Err(ValidationError::PulseTimeNotInteger)
        );
    }

    #[test]
    fn receipt_hints() {
        assert_eq!(
            receipt_hint(&CommandReceipt { queued_id: Some(42) }),
            "Command sent, queued message #42"
        );
        assert_eq!(
            receipt_hint(&CommandReceipt::default()),
            "Command sent, queued message #unknown"
        );
    }

    #[test]
    fn form_defaults() {
        let form = CommandForm::default();
        assert_eq!(form.target, CommandTarget::Water);
        assert!(!form.time_visible());
        assert_eq!(form.time_text, "1000");
    }
}
