//! Capabilities the core asks the shell to perform.
//!
//! We use Crux's built-in Render capability and crux_http directly because
//! they provide all necessary functionality. Timers are a small custom
//! capability so the shell can see which task a delay belongs to.

mod timer;

pub use self::timer::{Timer, TimerRequest, TimerTag};
pub use crux_core::render::Render;
pub use crux_http::{Http, HttpError};

use crate::event::Event;
use crate::App;

/// What every HTTP capability callback receives. Bodies are read as text and
/// decoded by the handler so a malformed reply degrades instead of failing.
pub type HttpResult = crux_http::Result<crux_http::Response<String>>;

#[derive(crux_core::macros::Effect)]
pub struct Capabilities {
    pub http: Http<Event>,
    pub timer: Timer<Event>,
    pub render: Render<Event>,
}
