use bridge_console::capabilities::{HttpError, HttpResult, TimerTag};
use bridge_console::dispatch::{CommandAction, CommandTarget};
use bridge_console::thresholds::{ThresholdChannel, DEFAULT_HINT, DIRTY_HINT, UPDATED_HINT};
use bridge_console::{App, Effect, Event, Model};
use crux_core::testing::AppTester;
use crux_http::http::StatusCode;
use crux_http::protocol::HttpRequest;
use crux_http::testing::ResponseBuilder;
use serde_json::{json, Value};

fn http_requests(effects: &[Effect]) -> Vec<HttpRequest> {
    effects
        .iter()
        .filter_map(|e| match e {
            Effect::Http(req) => Some(req.operation.clone()),
            _ => None,
        })
        .collect()
}

fn body_json(request: &HttpRequest) -> Value {
    serde_json::from_slice(&request.body).unwrap()
}

fn ok(body: impl Into<String>) -> Box<HttpResult> {
    Box::new(Ok(ResponseBuilder::ok().body(body.into()).build()))
}

fn snapshot_with_thresholds(temp: f64) -> Event {
    let body = json!({"thresholds": {"temp": temp, "humi": 70, "soil": null, "lux": null}});
    Event::StateFetched(ok(body.to_string()))
}

#[test]
fn non_pulse_command_has_no_time_field() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    app.update(Event::CommandTargetChanged(CommandTarget::Fan), &mut model);
    app.update(Event::CommandActionChanged(CommandAction::On), &mut model);
    app.update(Event::CommandTimeChanged("250".into()), &mut model);
    let update = app.update(Event::CommandSubmitted, &mut model);

    let requests = http_requests(&update.effects);
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "POST");
    assert_eq!(requests[0].url, "http://192.168.4.1/api/cmd");
    assert!(requests[0]
        .headers
        .iter()
        .any(|h| h.name.eq_ignore_ascii_case("content-type") && h.value == "application/json"));
    assert_eq!(body_json(&requests[0]), json!({"target": "fan", "action": "on"}));
    assert!(app.view(&model).command.in_flight);
}

#[test]
fn pulse_command_carries_time_and_shows_field() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    assert!(!app.view(&model).command.time_visible);
    app.update(Event::CommandTargetChanged(CommandTarget::Buzzer), &mut model);
    app.update(Event::CommandActionChanged(CommandAction::Pulse), &mut model);
    assert!(app.view(&model).command.time_visible);

    app.update(Event::CommandTimeChanged("300".into()), &mut model);
    let update = app.update(Event::CommandSubmitted, &mut model);
    assert_eq!(
        body_json(&http_requests(&update.effects)[0]),
        json!({"target": "buzzer", "action": "pulse", "time": 300})
    );
}

#[test]
fn invalid_pulse_time_is_not_sent() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    app.update(Event::CommandActionChanged(CommandAction::Pulse), &mut model);
    app.update(Event::CommandTimeChanged("0".into()), &mut model);
    let update = app.update(Event::CommandSubmitted, &mut model);

    assert!(http_requests(&update.effects).is_empty());
    assert!(app.view(&model).command.hint.is_some());
}

#[test]
fn command_receipt_hint() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    app.update(Event::CommandSent(ok(r#"{"queuedId": 12}"#)), &mut model);
    assert_eq!(
        app.view(&model).command.hint.as_deref(),
        Some("Command sent, queued message #12")
    );

    app.update(Event::CommandSent(ok("{}")), &mut model);
    assert_eq!(
        app.view(&model).command.hint.as_deref(),
        Some("Command sent, queued message #unknown")
    );
}

#[test]
fn rejected_command_surfaces_body() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    let rejected = ResponseBuilder::with_status(StatusCode::BadRequest)
        .body("unsupported target".to_string())
        .build();
    app.update(Event::CommandSent(Box::new(Ok(rejected))), &mut model);
    assert_eq!(
        app.view(&model).banner.as_deref(),
        Some("Command failed: unsupported target")
    );

    let empty = ResponseBuilder::with_status(StatusCode::BadGateway).body(String::new()).build();
    app.update(Event::CommandSent(Box::new(Ok(empty))), &mut model);
    assert_eq!(app.view(&model).banner.as_deref(), Some("Command failed: HTTP 502"));
    assert!(!app.view(&model).command.in_flight);
}

#[test]
fn command_rejection_reported_as_http_error_surfaces_body() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    app.update(Event::CommandSubmitted, &mut model);
    assert!(app.view(&model).command.in_flight);

    let error = HttpError::Http {
        code: StatusCode::BadRequest,
        message: "Bad Request".into(),
        body: Some(b"missing action".to_vec()),
    };
    app.update(Event::CommandSent(Box::new(Err(error))), &mut model);

    let view = app.view(&model);
    assert_eq!(view.banner.as_deref(), Some("Command failed: missing action"));
    assert!(!view.command.in_flight);
}

#[test]
fn focused_edit_survives_state_refresh() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    app.update(Event::ThresholdFocusChanged(Some(ThresholdChannel::Temp)), &mut model);
    app.update(
        Event::ThresholdInputChanged {
            channel: ThresholdChannel::Temp,
            text: "28".into(),
        },
        &mut model,
    );
    app.update(snapshot_with_thresholds(35.0), &mut model);

    let view = app.view(&model);
    assert_eq!(view.thresholds.temp, "28");
    assert_eq!(view.thresholds.hint, DIRTY_HINT);
    assert!(view.thresholds.dirty);

    app.update(Event::ThresholdFocusChanged(None), &mut model);
    app.update(snapshot_with_thresholds(35.0), &mut model);

    let view = app.view(&model);
    assert_eq!(view.thresholds.temp, "35");
    assert_eq!(view.thresholds.humi, "70");
    assert_eq!(view.thresholds.soil, "");
    assert!(!view.thresholds.dirty);
    assert_eq!(view.thresholds.hint, DEFAULT_HINT);
}

#[test]
fn invalid_threshold_input_shown_inline() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    app.update(
        Event::ThresholdInputChanged {
            channel: ThresholdChannel::Humi,
            text: "wet".into(),
        },
        &mut model,
    );
    let update = app.update(Event::ThresholdSubmitted, &mut model);

    assert!(http_requests(&update.effects).is_empty());
    assert!(app.view(&model).thresholds.hint.contains("Humidity"));
}

#[test]
fn threshold_submit_applies_server_reply() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    app.update(Event::ThresholdFocusChanged(Some(ThresholdChannel::Temp)), &mut model);
    app.update(
        Event::ThresholdInputChanged {
            channel: ThresholdChannel::Temp,
            text: "31.5".into(),
        },
        &mut model,
    );
    let update = app.update(Event::ThresholdSubmitted, &mut model);

    let requests = http_requests(&update.effects);
    assert_eq!(requests[0].url, "http://192.168.4.1/api/thresholds");
    assert_eq!(
        body_json(&requests[0]),
        json!({"temp": 31.5, "humi": null, "soil": null, "lux": null})
    );

    let reply = json!({
        "ok": true,
        "thresholds": {"temp": 31.5, "humi": null, "soil": null, "lux": null},
        "alarm": {"count": 0}
    });
    let update = app.update(Event::ThresholdsSaved(ok(reply.to_string())), &mut model);

    let view = app.view(&model);
    assert!(!view.thresholds.dirty);
    assert_eq!(view.thresholds.temp, "31.5");
    assert_eq!(view.thresholds.hint, UPDATED_HINT);
    assert_eq!(view.alarm, "Alarms triggered: 0");

    let reset = update
        .effects
        .iter()
        .find_map(|e| match e {
            Effect::Timer(req) => Some(req.operation.clone()),
            _ => None,
        })
        .unwrap();
    assert!(matches!(reset.tag, TimerTag::ThresholdHintReset { .. }));
    assert_eq!(reset.millis, 4_000);

    app.update(Event::TimerElapsed(reset.tag), &mut model);
    assert_eq!(app.view(&model).thresholds.hint, DEFAULT_HINT);
}

#[test]
fn editing_cancels_pending_hint_reset() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    let reply = json!({"thresholds": {"temp": 20}});
    let update = app.update(Event::ThresholdsSaved(ok(reply.to_string())), &mut model);
    let reset = update
        .effects
        .iter()
        .find_map(|e| match e {
            Effect::Timer(req) => Some(req.operation.tag),
            _ => None,
        })
        .unwrap();

    app.update(
        Event::ThresholdInputChanged {
            channel: ThresholdChannel::Lux,
            text: "900".into(),
        },
        &mut model,
    );
    app.update(Event::TimerElapsed(reset), &mut model);
    assert_eq!(app.view(&model).thresholds.hint, DIRTY_HINT);
}

#[test]
fn refresh_thresholds_fetches_and_applies() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    let update = app.update(Event::RefreshThresholds, &mut model);
    let requests = http_requests(&update.effects);
    assert_eq!(requests[0].method, "GET");
    assert_eq!(requests[0].url, "http://192.168.4.1/api/thresholds");

    let reply = json!({"thresholds": {"soil": 25}, "alarm": {"count": 2, "reason": "soil"}});
    app.update(Event::ThresholdsFetched(ok(reply.to_string())), &mut model);
    let view = app.view(&model);
    assert_eq!(view.thresholds.soil, "25");
    assert_eq!(view.alarm, "Alarms triggered: 2\nLast reason: soil");
}
