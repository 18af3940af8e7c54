//! Epoch-scoped timer queue
//!
//! Delayed transitions and periodic ticks are entries in one queue driven by
//! the session clock. Each entry is stamped with the epoch it was scheduled
//! in; a phase change starts a new epoch and drops everything older, so a
//! stale callback can never fire into a state that no longer expects it.

/// Scheduled effect kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// Enemy steering step (periodic while playing)
    EnemyStep,
    /// Enemy spawn (re-armed with a fresh interval after each spawn)
    EnemySpawn,
    /// One-second quiz countdown (periodic until answered)
    QuizCountdown,
    /// Leave the quiz after the result has been shown
    ResolveQuiz,
    /// Delayed game over
    EndGame,
    /// Clear the walking flag
    MovementSettle,
}

#[derive(Debug, Clone)]
struct Scheduled {
    due_ms: u64,
    seq: u64,
    epoch: u64,
    kind: TimerKind,
}

/// Pending timers plus the session clock
#[derive(Debug, Clone, Default)]
pub struct Timers {
    now_ms: u64,
    epoch: u64,
    next_seq: u64,
    pending: Vec<Scheduled>,
}

impl Timers {
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Schedule `kind` to fire `delay_ms` from now in the current epoch
    pub fn schedule(&mut self, delay_ms: u64, kind: TimerKind) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.push(Scheduled {
            due_ms: self.now_ms + delay_ms,
            seq,
            epoch: self.epoch,
            kind,
        });
    }

    /// Cancel every pending entry of a kind
    pub fn cancel_kind(&mut self, kind: TimerKind) {
        self.pending.retain(|t| t.kind != kind);
    }

    pub fn is_scheduled(&self, kind: TimerKind) -> bool {
        self.pending
            .iter()
            .any(|t| t.kind == kind && t.epoch == self.epoch)
    }

    /// Start a new epoch, invalidating everything scheduled before
    pub fn next_epoch(&mut self) -> u64 {
        self.epoch += 1;
        self.pending.clear();
        self.epoch
    }

    /// Pop the earliest entry due at or before `until_ms`.
    ///
    /// The clock moves to the entry's due time so re-armed periodic timers
    /// keep their cadence. Entries from older epochs are discarded.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<TimerKind> {
        loop {
            let idx = self
                .pending
                .iter()
                .enumerate()
                .filter(|(_, t)| t.due_ms <= until_ms)
                .min_by_key(|(_, t)| (t.due_ms, t.seq))
                .map(|(i, _)| i)?;
            let entry = self.pending.swap_remove(idx);
            if entry.epoch != self.epoch {
                log::debug!("Dropping stale {:?} from epoch {}", entry.kind, entry.epoch);
                continue;
            }
            self.now_ms = self.now_ms.max(entry.due_ms);
            return Some(entry.kind);
        }
    }

    /// Move the clock forward once all due entries have fired
    pub fn settle(&mut self, until_ms: u64) {
        self.now_ms = self.now_ms.max(until_ms);
    }
}
