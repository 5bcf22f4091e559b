//! Upload -> discovery -> chat milestone tracking.

/// Milliseconds since the Unix epoch.
pub type Millis = i64;

/// How long the stepper stays visible after the last milestone completes.
pub const AUTO_HIDE_MS: Millis = 10_000;

/// Persisted portion of the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProgressSnapshot {
    pub upload_confirmed: bool,
    pub discovery_confirmed: bool,
    pub chat_confirmed: bool,
    pub completed_at: Option<Millis>,
}

impl ProgressSnapshot {
    pub fn is_complete(&self) -> bool {
        self.upload_confirmed && self.discovery_confirmed && self.chat_confirmed
    }

    fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// What the auto-hide timer should do after a recomputation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HidePlan {
    /// No timer needed; visibility already settled.
    Settled,
    /// Arm a one-shot timer for `delay_ms`, tagged with `generation`.
    HideAfter { generation: u64, delay_ms: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressTracker {
    snapshot: ProgressSnapshot,
    visible: bool,
    hide_generation: u64,
    hide_after_ms: Millis,
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::with_hide_after(AUTO_HIDE_MS)
    }
}

impl ProgressTracker {
    /// Negative windows are treated as zero.
    pub fn with_hide_after(hide_after_ms: Millis) -> Self {
        Self {
            snapshot: ProgressSnapshot::default(),
            visible: true,
            hide_generation: 0,
            hide_after_ms: hide_after_ms.max(0),
        }
    }

    /// Rebuilds the tracker from a persisted record.
    ///
    /// Everything is dropped when there are no files. Flags whose
    /// prerequisite is missing are dropped, and `completed_at` is kept only
    /// for a complete record (falling back to `now` if it was lost, and
    /// never later than `now`).
    pub fn restore(&mut self, persisted: ProgressSnapshot, has_files: bool, now: Millis) {
        let mut snapshot = ProgressSnapshot::default();
        if has_files {
            snapshot.upload_confirmed = persisted.upload_confirmed;
            snapshot.discovery_confirmed =
                snapshot.upload_confirmed && persisted.discovery_confirmed;
            snapshot.chat_confirmed = snapshot.discovery_confirmed && persisted.chat_confirmed;
            if snapshot.is_complete() {
                snapshot.completed_at = Some(persisted.completed_at.unwrap_or(now).min(now));
            }
        }
        self.snapshot = snapshot;
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        self.snapshot
    }

    pub fn upload_confirmed(&self) -> bool {
        self.snapshot.upload_confirmed
    }

    pub fn discovery_confirmed(&self) -> bool {
        self.snapshot.discovery_confirmed
    }

    pub fn chat_confirmed(&self) -> bool {
        self.snapshot.chat_confirmed
    }

    pub fn completed_at(&self) -> Option<Millis> {
        self.snapshot.completed_at
    }

    pub fn is_complete(&self) -> bool {
        self.snapshot.is_complete()
    }

    /// Visibility as last settled by [`Self::sync_visibility`] or the hide timer.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Visibility at an arbitrary instant, absent further mutation.
    pub fn visible_at(&self, now: Millis) -> bool {
        if !self.is_complete() {
            return true;
        }
        match self.snapshot.completed_at {
            Some(completed_at) => now.saturating_sub(completed_at) < self.hide_after_ms,
            None => true,
        }
    }

    /// Number of leading milestones confirmed, `0..=3`.
    pub fn current_step(&self) -> usize {
        [
            self.snapshot.upload_confirmed,
            self.snapshot.discovery_confirmed,
            self.snapshot.chat_confirmed,
        ]
        .iter()
        .take_while(|done| **done)
        .count()
    }

    pub fn hide_generation(&self) -> u64 {
        self.hide_generation
    }

    /// Returns true when the state changed.
    pub fn confirm_upload(&mut self) -> bool {
        if self.snapshot.upload_confirmed {
            return false;
        }
        self.snapshot.upload_confirmed = true;
        true
    }

    /// No-op unless upload is already confirmed.
    pub fn confirm_discovery(&mut self, now: Millis) -> bool {
        if !self.snapshot.upload_confirmed || self.snapshot.discovery_confirmed {
            return false;
        }
        self.snapshot.discovery_confirmed = true;
        self.stamp_completion(now);
        true
    }

    /// No-op unless discovery is already confirmed.
    pub fn confirm_chat(&mut self, now: Millis) -> bool {
        if !self.snapshot.discovery_confirmed || self.snapshot.chat_confirmed {
            return false;
        }
        self.snapshot.chat_confirmed = true;
        self.stamp_completion(now);
        true
    }

    /// Back to defaults; invalidates any armed hide timer and forces visibility.
    pub fn reset(&mut self) {
        self.snapshot = ProgressSnapshot::default();
        self.hide_generation += 1;
        self.visible = true;
    }

    /// Applies the empty-collection rule. Returns true when a reset happened.
    pub fn files_emptied(&mut self) -> bool {
        if self.snapshot.is_default() {
            return false;
        }
        self.reset();
        true
    }

    /// Recomputes visibility from `completed_at` and invalidates the previous
    /// hide timer. Call after every change to the snapshot.
    pub fn sync_visibility(&mut self, now: Millis) -> HidePlan {
        self.hide_generation += 1;
        if !self.is_complete() {
            self.visible = true;
            return HidePlan::Settled;
        }
        let completed_at = self.snapshot.completed_at.unwrap_or(now);
        let elapsed = now.saturating_sub(completed_at).max(0);
        let remaining = self.hide_after_ms.saturating_sub(elapsed);
        if remaining <= 0 {
            self.visible = false;
            return HidePlan::Settled;
        }
        self.visible = true;
        HidePlan::HideAfter {
            generation: self.hide_generation,
            delay_ms: remaining.unsigned_abs(),
        }
    }

    /// Handles an expired hide timer. Stale generations are ignored.
    pub fn hide_elapsed(&mut self, generation: u64) -> bool {
        if generation != self.hide_generation || !self.is_complete() || !self.visible {
            return false;
        }
        self.visible = false;
        true
    }

    fn stamp_completion(&mut self, now: Millis) {
        if self.snapshot.is_complete() && self.snapshot.completed_at.is_none() {
            self.snapshot.completed_at = Some(now);
        }
    }
}
