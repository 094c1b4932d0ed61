use serde::{Deserialize, Serialize};

use crux_core::capability::{Capability, CapabilityContext, Operation};

/// One-shot delays executed by the shell. Repetition is the core's job: the
/// scheduler re-arms a task each time its timer fires.
pub struct Timer<Ev> {
    context: CapabilityContext<TimerRequest, Ev>,
}

impl<Ev> Capability<Ev> for Timer<Ev> {
    type Operation = TimerRequest;
    type MappedSelf<MappedEv> = Timer<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        Timer::new(self.context.map_event(f))
    }
}

impl<Ev> Timer<Ev>
where
    Ev: Send + 'static,
{
    pub fn new(context: CapabilityContext<TimerRequest, Ev>) -> Self {
        Self { context }
    }

    /// Asks the shell to wait `millis` and then delivers `event`.
    pub fn after(&self, tag: TimerTag, millis: u64, event: Ev) {
        let ctx = self.context.clone();
        self.context.spawn(async move {
            ctx.request_from_shell(TimerRequest { tag, millis }).await;
            ctx.update_app(event);
        });
    }
}

/// What a pending timer is for. Carried to the shell so it can label or
/// cancel its own handles; the core ignores stale tags on its side anyway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimerTag {
    StatePoll { generation: u64 },
    MessagePoll { generation: u64 },
    BannerDismiss { seq: u64 },
    ThresholdHintReset { seq: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerRequest {
    pub tag: TimerTag,
    pub millis: u64,
}

impl Operation for TimerRequest {
    type Output = ();
}
