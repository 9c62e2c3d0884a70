use std::time::Duration;

/// Purpose of a pending timer. Each purpose owns exactly one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TimerSlot {
    CollisionPause = 0,
    Phase = 1,
    WalkFrame = 2,
    SleepFrame = 3,
}

impl TimerSlot {
    /// Dispatch order when several timers fire on the same tick.
    pub const ALL: [TimerSlot; 4] = [
        Self::CollisionPause,
        Self::Phase,
        Self::WalkFrame,
        Self::SleepFrame,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::CollisionPause => "collision-pause",
            Self::Phase => "phase",
            Self::WalkFrame => "walk-frame",
            Self::SleepFrame => "sleep-frame",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Timer {
    remaining: Duration,
    /// `Some` for repeating timers.
    period: Option<Duration>,
}

/// Slots that fired during one `advance`, in dispatch order.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Fired {
    slots: [bool; 4],
}

impl Fired {
    pub fn iter(&self) -> impl Iterator<Item = TimerSlot> + '_ {
        TimerSlot::ALL
            .into_iter()
            .filter(move |slot| self.slots[*slot as usize])
    }
}

/// Tick-driven replacement for free-running timers.
///
/// Arming a slot replaces whatever it held, so there is never more than one
/// outstanding timer per purpose.
#[derive(Debug, Default)]
pub struct Scheduler {
    slots: [Option<Timer>; 4],
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arm_once(&mut self, slot: TimerSlot, delay: Duration) {
        self.slots[slot as usize] = Some(Timer {
            remaining: delay,
            period: None,
        });
    }

    /// Zero periods are rejected; they would fire on every tick forever.
    pub fn arm_repeating(&mut self, slot: TimerSlot, period: Duration) {
        if period.is_zero() {
            log::warn!("refusing zero-period {} timer", slot.label());
            self.cancel(slot);
            return;
        }
        self.slots[slot as usize] = Some(Timer {
            remaining: period,
            period: Some(period),
        });
    }

    pub fn cancel(&mut self, slot: TimerSlot) {
        self.slots[slot as usize] = None;
    }

    /// Count every armed timer down by `dt`. A repeating timer fires at most
    /// once per call even if `dt` spans several periods.
    pub fn advance(&mut self, dt: Duration) -> Fired {
        let mut fired = Fired::default();
        for slot in TimerSlot::ALL {
            let entry = &mut self.slots[slot as usize];
            let Some(timer) = entry.as_mut() else {
                continue;
            };
            timer.remaining = timer.remaining.saturating_sub(dt);
            if !timer.remaining.is_zero() {
                continue;
            }
            fired.slots[slot as usize] = true;
            *entry = timer.period.map(|period| Timer {
                remaining: period,
                period: Some(period),
            });
        }
        fired
    }
}

#[cfg(test)]
impl Scheduler {
    pub fn is_armed(&self, slot: TimerSlot) -> bool {
        self.slots[slot as usize].is_some()
    }

    pub fn remaining(&self, slot: TimerSlot) -> Option<Duration> {
        self.slots[slot as usize].map(|t| t.remaining)
    }
}
