//! Display strings for raw bridge fields. Everything here is total.

use crate::model::SwitchState;

/// Shown wherever a value is missing or has the wrong type.
pub const SENTINEL: &str = "--";

#[must_use]
pub fn format_duration(seconds: u64) -> String {
    if seconds < 60 {
        return format!("{seconds} s");
    }

    let minutes = seconds / 60;
    if minutes < 60 {
        return format!("{minutes} min {} s", seconds % 60);
    }

    let hours = minutes / 60;
    if hours < 24 {
        return format!("{hours} h {} min", minutes % 60);
    }

    format!("{} d {} h", hours / 24, hours % 24)
}

#[must_use]
pub fn format_age(ms: Option<f64>) -> String {
    match ms {
        Some(ms) if !ms.is_nan() => {
            if ms < 1000.0 {
                format!("{} ms", format_number(ms))
            } else {
                #[allow(clippy::cast_possible_truncation)]
                let seconds = (ms / 1000.0).floor() as i64;
                format!("{seconds} s ago")
            }
        }
        _ => SENTINEL.to_string(),
    }
}

#[must_use]
pub fn format_switch(state: SwitchState) -> String {
    match state {
        SwitchState::On => "ON",
        SwitchState::Off => "OFF",
        SwitchState::Unknown => SENTINEL,
    }
    .to_string()
}

/// Number text as the bridge's JSON would print it: `12`, not `12.0`.
#[must_use]
pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return SENTINEL.to_string();
    }
    if value.fract() == 0.0 && value.abs() < 1e15 {
        #[allow(clippy::cast_possible_truncation)]
        return format!("{}", value as i64);
    }
    format!("{value}")
}

/// Sensor cell: fixed decimals when present, sentinel otherwise, unit always.
#[must_use]
pub fn format_measurement(value: Option<f64>, decimals: Option<usize>, unit: &str) -> String {
    let text = match (value, decimals) {
        (Some(v), Some(places)) if v.is_finite() => format!("{v:.places$}"),
        (Some(v), None) => format_number(v),
        _ => SENTINEL.to_string(),
    };
    format!("{text} {unit}")
}
