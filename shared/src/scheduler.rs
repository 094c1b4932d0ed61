//! Bookkeeping for the repeating poll tasks and the one-shot UI timers.
//!
//! Timers themselves live in the shell. Each one is armed with a tag that
//! records the generation or sequence number current at arming time; when it
//! fires, the tag is checked here and anything stale is dropped.

use serde::{Deserialize, Serialize};

use crate::capabilities::TimerTag;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PollTask {
    State,
    Messages,
}

impl PollTask {
    pub const ALL: [Self; 2] = [Self::State, Self::Messages];

    pub fn tag(self, generation: u64) -> TimerTag {
        match self {
            Self::State => TimerTag::StatePoll { generation },
            Self::Messages => TimerTag::MessagePoll { generation },
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
struct TaskSlot {
    running: bool,
    generation: u64,
}

/// What a fired timer means for the app.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Due {
    Poll(PollTask),
    DismissBanner,
    ResetThresholdHint,
    Stale,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scheduler {
    state: TaskSlot,
    messages: TaskSlot,
    banner_seq: u64,
    hint_seq: u64,
}

impl Scheduler {
    fn slot(&self, task: PollTask) -> &TaskSlot {
        match task {
            PollTask::State => &self.state,
            PollTask::Messages => &self.messages,
        }
    }

    fn slot_mut(&mut self, task: PollTask) -> &mut TaskSlot {
        match task {
            PollTask::State => &mut self.state,
            PollTask::Messages => &mut self.messages,
        }
    }

    pub fn is_running(&self, task: PollTask) -> bool {
        self.slot(task).running
    }

    /// Returns the tag for the first timer. Restarting a running task
    /// orphans its pending timer.
    pub fn start(&mut self, task: PollTask) -> TimerTag {
        let slot = self.slot_mut(task);
        slot.generation += 1;
        slot.running = true;
        task.tag(slot.generation)
    }

    pub fn stop(&mut self, task: PollTask) {
        let slot = self.slot_mut(task);
        slot.running = false;
        slot.generation += 1;
    }

    /// Tag for re-arming `task` after a tick, or `None` once stopped.
    pub fn rearm(&self, task: PollTask) -> Option<TimerTag> {
        let slot = self.slot(task);
        slot.running.then(|| task.tag(slot.generation))
    }

    pub fn next_banner(&mut self) -> TimerTag {
        self.banner_seq += 1;
        TimerTag::BannerDismiss {
            seq: self.banner_seq,
        }
    }

    pub fn next_hint_reset(&mut self) -> TimerTag {
        self.hint_seq += 1;
        TimerTag::ThresholdHintReset { seq: self.hint_seq }
    }

    /// Drops any pending hint reset, e.g. when the user starts editing.
    pub fn cancel_hint_reset(&mut self) {
        self.hint_seq += 1;
    }

    pub fn classify(&self, tag: TimerTag) -> Due {
        let current = |task: PollTask, generation: u64| {
            let slot = self.slot(task);
            if slot.running && slot.generation == generation {
                Due::Poll(task)
            } else {
                Due::Stale
            }
        };
        match tag {
            TimerTag::StatePoll { generation } => current(PollTask::State, generation),
            TimerTag::MessagePoll { generation } => current(PollTask::Messages, generation),
            TimerTag::BannerDismiss { seq } if seq == self.banner_seq => Due::DismissBanner,
            TimerTag::ThresholdHintReset { seq } if seq == self.hint_seq => {
                Due::ResetThresholdHint
            }
            TimerTag::BannerDismiss { .. } | TimerTag::ThresholdHintReset { .. } => Due::Stale,
        }
    }
}
