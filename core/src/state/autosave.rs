use chrono::{Duration, NaiveDateTime};

/// What a scheduler tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoSaveTick {
    /// Nothing armed and nothing to arm, or the timer has not elapsed yet
    Idle,
    /// Timer armed for the given time
    Armed(NaiveDateTime),
    /// Timer elapsed and was disarmed; a save is due
    Fired,
}

/// One-shot save timer. It must be re-armed by a later tick after each fire.
#[derive(Debug, Default)]
pub struct AutoSaveScheduler {
    next_save: Option<NaiveDateTime>,
}

impl AutoSaveScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the timer. Callers only tick while auto save is enabled, so a
    /// timer armed before auto save was switched off stays pending.
    pub fn tick(&mut self, now: NaiveDateTime, interval: Option<Duration>) -> AutoSaveTick {
        match self.next_save {
            None => match interval {
                Some(interval) => {
                    let at = now + interval;
                    self.next_save = Some(at);
                    AutoSaveTick::Armed(at)
                }
                None => AutoSaveTick::Idle,
            },
            Some(at) if now >= at => {
                self.next_save = None;
                AutoSaveTick::Fired
            }
            Some(_) => AutoSaveTick::Idle,
        }
    }

    pub fn next_save_time(&self) -> Option<NaiveDateTime> {
        self.next_save
    }

    /// Disarm without firing
    pub fn clear(&mut self) {
        self.next_save = None;
    }
}
