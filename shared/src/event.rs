use serde::{Deserialize, Serialize};

use crate::capabilities::{HttpResult, TimerTag};
use crate::config::ClientConfig;
use crate::dispatch::{CommandAction, CommandTarget};
use crate::thresholds::ThresholdChannel;

// --- Event enum: capability results boxed to keep the enum small ---

#[derive(Serialize, Deserialize, Debug)]
pub enum Event {
    // Lifecycle
    Configure(ClientConfig),
    StartPolling,
    StopPolling,
    StartStatePolling,
    StopStatePolling,
    StartMessagePolling,
    StopMessagePolling,

    // Timers
    TimerElapsed(TimerTag),

    // Threshold form
    ThresholdInputChanged {
        channel: ThresholdChannel,
        text: String,
    },
    ThresholdFocusChanged(Option<ThresholdChannel>),
    ThresholdSubmitted,
    RefreshThresholds,

    // Command form
    CommandTargetChanged(CommandTarget),
    CommandActionChanged(CommandAction),
    CommandTimeChanged(String),
    CommandSubmitted,

    DismissBanner,

    // Capability results
    #[serde(skip)]
    StateFetched(Box<HttpResult>),
    #[serde(skip)]
    MessagesFetched(Box<HttpResult>),
    #[serde(skip)]
    CommandSent(Box<HttpResult>),
    #[serde(skip)]
    ThresholdsSaved(Box<HttpResult>),
    #[serde(skip)]
    ThresholdsFetched(Box<HttpResult>),
}

impl Event {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Configure(_) => "configure",
            Self::StartPolling => "start_polling",
            Self::StopPolling => "stop_polling",
            Self::StartStatePolling => "start_state_polling",
            Self::StopStatePolling => "stop_state_polling",
            Self::StartMessagePolling => "start_message_polling",
            Self::StopMessagePolling => "stop_message_polling",
            Self::TimerElapsed(_) => "timer_elapsed",
            Self::ThresholdInputChanged { .. } => "threshold_input_changed",
            Self::ThresholdFocusChanged(_) => "threshold_focus_changed",
            Self::ThresholdSubmitted => "threshold_submitted",
            Self::RefreshThresholds => "refresh_thresholds",
            Self::CommandTargetChanged(_) => "command_target_changed",
            Self::CommandActionChanged(_) => "command_action_changed",
            Self::CommandTimeChanged(_) => "command_time_changed",
            Self::CommandSubmitted => "command_submitted",
            Self::DismissBanner => "dismiss_banner",
            Self::StateFetched(_) => "state_fetched",
            Self::MessagesFetched(_) => "messages_fetched",
            Self::CommandSent(_) => "command_sent",
            Self::ThresholdsSaved(_) => "thresholds_saved",
            Self::ThresholdsFetched(_) => "thresholds_fetched",
        }
    }

    pub const fn is_user_initiated(&self) -> bool {
        matches!(
            self,
            Self::ThresholdInputChanged { .. }
                | Self::ThresholdFocusChanged(_)
                | Self::ThresholdSubmitted
                | Self::RefreshThresholds
                | Self::CommandTargetChanged(_)
                | Self::CommandActionChanged(_)
                | Self::CommandTimeChanged(_)
                | Self::CommandSubmitted
                | Self::DismissBanner
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shell_events_round_trip_through_json() {
        let event = Event::ThresholdInputChanged {
            channel: ThresholdChannel::Soil,
            text: "35".into(),
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: Event = serde_json::from_str(&json).unwrap();
        match back {
            Event::ThresholdInputChanged { channel, text } => {
                assert_eq!(channel, ThresholdChannel::Soil);
                assert_eq!(text, "35");
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn capability_results_are_not_user_initiated() {
        let failure = crate::capabilities::HttpError::Io("reset".into());
        let event = Event::StateFetched(Box::new(Err(failure)));
        assert!(!event.is_user_initiated());
        assert_eq!(event.name(), "state_fetched");
        assert!(Event::CommandSubmitted.is_user_initiated());
    }
}
