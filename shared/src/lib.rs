// lib.rs - shared core for the bridge monitoring console

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::too_many_lines)]

pub mod capabilities;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod format;
pub mod messages;
pub mod model;
pub mod scheduler;
pub mod sync;
pub mod thresholds;

use serde::{Deserialize, Serialize};

pub use app::App;
pub use capabilities::{Capabilities, Effect};
pub use config::ClientConfig;
pub use crux_core::App as CruxApp;
pub use error::ClientError;
pub use event::Event;

use dispatch::{CommandAction, CommandForm, CommandTarget};
use messages::MessageCursorStore;
use scheduler::{PollTask, Scheduler};
use sync::{AckView, DeviceView, SensorView, StatusView};
use thresholds::{ThresholdChannel, ThresholdGuard};

/// All client state. Owned by the core, mutated only in `App::update`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Model {
    pub config: ClientConfig,
    pub scheduler: Scheduler,
    pub messages: MessageCursorStore,
    pub thresholds: ThresholdGuard,
    pub device: DeviceView,
    pub command: CommandForm,
    pub banner: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdFormView {
    pub temp: String,
    pub humi: String,
    pub soil: String,
    pub lux: String,
    pub hint: String,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandFormView {
    pub target: CommandTarget,
    pub action: CommandAction,
    pub time_text: String,
    pub time_visible: bool,
    pub hint: Option<String>,
    pub in_flight: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewModel {
    pub status: StatusView,
    pub sensors: SensorView,
    pub ack: AckView,
    pub alarm: String,
    pub thresholds: ThresholdFormView,
    pub command: CommandFormView,
    pub message_log: String,
    pub message_cursor: u64,
    pub banner: Option<String>,
    pub state_polling: bool,
    pub message_polling: bool,
}

pub mod app {
    use crux_http::Response;
    use serde::Serialize;
    use serde_json::Value;
    use tracing::{debug, info, warn};
    use url::Url;

    use super::*;
    use crate::capabilities::{HttpResult, TimerTag};
    use crate::config::{COMMAND_PATH, MESSAGES_PATH, STATE_PATH, THRESHOLDS_PATH};
    use crate::dispatch::receipt_hint;
    use crate::error::{accepted, Rejection};
    use crate::messages::LAST_MESSAGE_ID_HEADER;
    use crate::model::CommandReceipt;
    use crate::scheduler::Due;
    use crate::sync::DeviceSnapshot;
    use crate::thresholds::UPDATED_HINT;

    const STATE_FAILED: &str = "State refresh failed";
    const MESSAGES_FAILED: &str = "Message refresh failed";
    const COMMAND_FAILED: &str = "Command failed";
    const THRESHOLD_UPDATE_FAILED: &str = "Threshold update failed";
    const THRESHOLD_REFRESH_FAILED: &str = "Threshold refresh failed";

    #[derive(Default)]
    pub struct App;

    fn body_text(response: &Response<String>) -> &str {
        response.body().map_or("", String::as_str)
    }

    /// Resolved URL and JSON body for a POST.
    fn json_post(
        config: &ClientConfig,
        path: &str,
        payload: &impl Serialize,
    ) -> Result<(Url, Vec<u8>), ClientError> {
        let url = config.endpoint(path).map_err(|e| ClientError::transport(path, e))?;
        let body = serde_json::to_vec(payload).map_err(|e| ClientError::transport(path, e))?;
        Ok((url, body))
    }

    /// Decodes a successful JSON reply, or explains why it could not be used.
    fn json_body(
        endpoint: &str,
        result: HttpResult,
        rejection: Rejection,
    ) -> Result<Value, ClientError> {
        let response = accepted(endpoint, result, rejection)?;
        serde_json::from_str(body_text(&response)).map_err(|e| ClientError::transport(endpoint, e))
    }

    impl App {
        /// A newer banner replaces the text and restarts the dismiss timer.
        fn post_banner(model: &mut Model, caps: &Capabilities, text: String) {
            model.banner = Some(text);
            let tag = model.scheduler.next_banner();
            caps.timer.after(tag, model.config.banner_timeout_ms, Event::TimerElapsed(tag));
        }

        fn show_banner(model: &mut Model, caps: &Capabilities, context: &str, error: &ClientError) {
            warn!(%error, context, "request failed");
            Self::post_banner(model, caps, format!("{context}: {error}"));
        }

        fn arm(model: &Model, caps: &Capabilities, task: PollTask, tag: TimerTag) {
            let millis = match task {
                PollTask::State => model.config.state_poll_interval_ms,
                PollTask::Messages => model.config.message_poll_interval_ms,
            };
            caps.timer.after(tag, millis, Event::TimerElapsed(tag));
        }

        fn start_task(model: &mut Model, caps: &Capabilities, task: PollTask) {
            let tag = model.scheduler.start(task);
            info!(?task, ?tag, "polling started");
            Self::poll(model, caps, task);
            Self::arm(model, caps, task, tag);
        }

        fn stop_task(model: &mut Model, task: PollTask) {
            if model.scheduler.is_running(task) {
                info!(?task, "polling stopped");
            }
            model.scheduler.stop(task);
        }

        fn poll(model: &mut Model, caps: &Capabilities, task: PollTask) {
            let (path, context) = match task {
                PollTask::State => (STATE_PATH.to_string(), STATE_FAILED),
                PollTask::Messages => (model.messages.next_query(MESSAGES_PATH), MESSAGES_FAILED),
            };
            let url = match model.config.endpoint(&path) {
                Ok(url) => url,
                Err(e) => {
                    let error = ClientError::transport(path, e);
                    return Self::show_banner(model, caps, context, &error);
                }
            };

            debug!(?task, %url, "poll");
            let request = caps.http.get(url).expect_string();
            match task {
                PollTask::State => request.send(|result| Event::StateFetched(Box::new(result))),
                PollTask::Messages => {
                    request.send(|result| Event::MessagesFetched(Box::new(result)));
                }
            }
        }

        fn send_command(model: &mut Model, caps: &Capabilities) {
            let payload = match model.command.build() {
                Ok(payload) => payload,
                Err(e) => {
                    model.command.hint = Some(ClientError::from(e).to_string());
                    return;
                }
            };

            match json_post(&model.config, COMMAND_PATH, &payload) {
                Ok((url, body)) => {
                    info!(
                        device = %payload.target,
                        action = %payload.action,
                        time = ?payload.time,
                        "sending command"
                    );
                    model.command.in_flight = true;
                    caps.http
                        .post(url)
                        .header("Content-Type", "application/json")
                        .body(body)
                        .expect_string()
                        .send(|result| Event::CommandSent(Box::new(result)));
                }
                Err(e) => Self::show_banner(model, caps, COMMAND_FAILED, &e),
            }
        }

        fn submit_thresholds(model: &mut Model, caps: &Capabilities) {
            let payload = match model.thresholds.build_payload() {
                Ok(payload) => payload,
                Err(e) => {
                    debug!(error = %e, "threshold submission rejected locally");
                    model.thresholds.set_hint(ClientError::from(e).to_string());
                    return;
                }
            };

            match json_post(&model.config, THRESHOLDS_PATH, &payload) {
                Ok((url, body)) => {
                    info!(?payload, "submitting thresholds");
                    caps.http
                        .post(url)
                        .header("Content-Type", "application/json")
                        .body(body)
                        .expect_string()
                        .send(|result| Event::ThresholdsSaved(Box::new(result)));
                }
                Err(e) => Self::show_banner(model, caps, THRESHOLD_UPDATE_FAILED, &e),
            }
        }

        fn refresh_thresholds(model: &mut Model, caps: &Capabilities) {
            match model.config.endpoint(THRESHOLDS_PATH) {
                Ok(url) => caps
                    .http
                    .get(url)
                    .expect_string()
                    .send(|result| Event::ThresholdsFetched(Box::new(result))),
                Err(e) => {
                    let error = ClientError::transport(THRESHOLDS_PATH, e);
                    Self::show_banner(model, caps, THRESHOLD_REFRESH_FAILED, &error);
                }
            }
        }

        /// Threshold values plus alarm summary, from either a snapshot or a
        /// threshold endpoint reply.
        fn apply_threshold_reply(model: &mut Model, snapshot: &DeviceSnapshot) {
            let server = snapshot.thresholds.unwrap_or_default();
            model.thresholds.reconcile(&server);
            model.device.apply_alarm(snapshot.alarm.as_ref());
        }

        fn state_fetched(model: &mut Model, caps: &Capabilities, result: HttpResult) {
            match json_body(STATE_PATH, result, Rejection::Status("STATE")) {
                Ok(body) => {
                    let snapshot = DeviceSnapshot::from_json(&body);
                    model.device.apply(&snapshot);
                    Self::apply_threshold_reply(model, &snapshot);
                }
                Err(e) => Self::show_banner(model, caps, STATE_FAILED, &e),
            }
        }

        fn messages_fetched(model: &mut Model, caps: &Capabilities, result: HttpResult) {
            match accepted(MESSAGES_PATH, result, Rejection::Status("MESSAGES")) {
                Ok(response) => {
                    let cursor = response
                        .header(LAST_MESSAGE_ID_HEADER)
                        .map(|values| values.last().as_str());
                    model.messages.ingest(body_text(&response), cursor);
                }
                Err(e) => Self::show_banner(model, caps, MESSAGES_FAILED, &e),
            }
        }

        fn command_sent(model: &mut Model, caps: &Capabilities, result: HttpResult) {
            model.command.in_flight = false;
            match accepted(COMMAND_PATH, result, Rejection::Body) {
                Ok(response) => {
                    let receipt = serde_json::from_str::<CommandReceipt>(body_text(&response))
                        .unwrap_or_else(|e| {
                            debug!(error = %e, "command receipt unreadable");
                            CommandReceipt::default()
                        });
                    info!(queued_id = ?receipt.queued_id, "command accepted");
                    model.command.hint = Some(receipt_hint(&receipt));
                }
                Err(e) => Self::show_banner(model, caps, COMMAND_FAILED, &e),
            }
        }

        fn thresholds_saved(model: &mut Model, caps: &Capabilities, result: HttpResult) {
            match json_body(THRESHOLDS_PATH, result, Rejection::Body) {
                Ok(body) => {
                    model.thresholds.clear_dirty();
                    Self::apply_threshold_reply(model, &DeviceSnapshot::from_json(&body));
                    model.thresholds.set_hint(UPDATED_HINT);
                    let tag = model.scheduler.next_hint_reset();
                    caps.timer.after(
                        tag,
                        model.config.threshold_hint_reset_ms,
                        Event::TimerElapsed(tag),
                    );
                    info!("thresholds updated");
                }
                Err(e) => Self::show_banner(model, caps, THRESHOLD_UPDATE_FAILED, &e),
            }
        }

        fn thresholds_fetched(model: &mut Model, caps: &Capabilities, result: HttpResult) {
            match json_body(THRESHOLDS_PATH, result, Rejection::Status("THRESHOLDS")) {
                Ok(body) => Self::apply_threshold_reply(model, &DeviceSnapshot::from_json(&body)),
                Err(e) => Self::show_banner(model, caps, THRESHOLD_REFRESH_FAILED, &e),
            }
        }

        fn configure(model: &mut Model, caps: &Capabilities, config: ClientConfig) {
            if let Err(e) = config.validate() {
                warn!(error = %e, "configuration rejected");
                Self::post_banner(model, caps, format!("Configuration rejected: {e}"));
                return;
            }

            info!(base_url = %config.base_url, "configuration applied");
            model.messages.set_capacity(config.message_buffer_capacity);
            model.config = config;

            for task in PollTask::ALL {
                if model.scheduler.is_running(task) {
                    Self::start_task(model, caps, task);
                }
            }
        }

        fn timer_elapsed(model: &mut Model, caps: &Capabilities, tag: TimerTag) -> bool {
            match model.scheduler.classify(tag) {
                Due::Poll(task) => {
                    Self::poll(model, caps, task);
                    if let Some(next) = model.scheduler.rearm(task) {
                        Self::arm(model, caps, task, next);
                    }
                    false
                }
                Due::DismissBanner => {
                    model.banner = None;
                    true
                }
                Due::ResetThresholdHint => {
                    model.thresholds.reset_hint();
                    true
                }
                Due::Stale => {
                    debug!(?tag, "ignoring stale timer");
                    false
                }
            }
        }
    }

    impl crux_core::App for App {
        type Event = Event;
        type Model = Model;
        type ViewModel = ViewModel;
        type Capabilities = Capabilities;

        fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
            debug!(event = event.name(), user = event.is_user_initiated(), "update");

            let render = match event {
                Event::Configure(config) => {
                    Self::configure(model, caps, config);
                    true
                }
                Event::StartPolling => {
                    for task in PollTask::ALL {
                        Self::start_task(model, caps, task);
                    }
                    true
                }
                Event::StopPolling => {
                    for task in PollTask::ALL {
                        Self::stop_task(model, task);
                    }
                    true
                }
                Event::StartStatePolling => {
                    Self::start_task(model, caps, PollTask::State);
                    true
                }
                Event::StopStatePolling => {
                    Self::stop_task(model, PollTask::State);
                    true
                }
                Event::StartMessagePolling => {
                    Self::start_task(model, caps, PollTask::Messages);
                    true
                }
                Event::StopMessagePolling => {
                    Self::stop_task(model, PollTask::Messages);
                    true
                }

                Event::TimerElapsed(tag) => Self::timer_elapsed(model, caps, tag),

                Event::ThresholdInputChanged { channel, text } => {
                    model.scheduler.cancel_hint_reset();
                    model.thresholds.mark_dirty(channel, text);
                    true
                }
                Event::ThresholdFocusChanged(focused) => {
                    model.thresholds.set_focus(focused);
                    false
                }
                Event::ThresholdSubmitted => {
                    Self::submit_thresholds(model, caps);
                    true
                }
                Event::RefreshThresholds => {
                    Self::refresh_thresholds(model, caps);
                    false
                }

                Event::CommandTargetChanged(target) => {
                    model.command.target = target;
                    true
                }
                Event::CommandActionChanged(action) => {
                    model.command.action = action;
                    true
                }
                Event::CommandTimeChanged(text) => {
                    model.command.time_text = text;
                    true
                }
                Event::CommandSubmitted => {
                    Self::send_command(model, caps);
                    true
                }

                Event::DismissBanner => {
                    model.banner = None;
                    true
                }

                Event::StateFetched(result) => {
                    Self::state_fetched(model, caps, *result);
                    true
                }
                Event::MessagesFetched(result) => {
                    Self::messages_fetched(model, caps, *result);
                    true
                }
                Event::CommandSent(result) => {
                    Self::command_sent(model, caps, *result);
                    true
                }
                Event::ThresholdsSaved(result) => {
                    Self::thresholds_saved(model, caps, *result);
                    true
                }
                Event::ThresholdsFetched(result) => {
                    Self::thresholds_fetched(model, caps, *result);
                    true
                }
            };

            if render {
                caps.render.render();
            }
        }

        fn view(&self, model: &Model) -> ViewModel {
            let guard = &model.thresholds;
            ViewModel {
                status: model.device.status.clone(),
                sensors: model.device.sensors.clone(),
                ack: model.device.ack.clone(),
                alarm: model.device.alarm.clone(),
                thresholds: ThresholdFormView {
                    temp: guard.input(ThresholdChannel::Temp).to_string(),
                    humi: guard.input(ThresholdChannel::Humi).to_string(),
                    soil: guard.input(ThresholdChannel::Soil).to_string(),
                    lux: guard.input(ThresholdChannel::Lux).to_string(),
                    hint: guard.hint().to_string(),
                    dirty: guard.is_dirty(),
                },
                command: CommandFormView {
                    target: model.command.target,
                    action: model.command.action,
                    time_text: model.command.time_text.clone(),
                    time_visible: model.command.time_visible(),
                    hint: model.command.hint.clone(),
                    in_flight: model.command.in_flight,
                },
                message_log: model.messages.render(),
                message_cursor: model.messages.cursor(),
                banner: model.banner.clone(),
                state_polling: model.scheduler.is_running(PollTask::State),
                message_polling: model.scheduler.is_running(PollTask::Messages),
            }
        }
    }
}
