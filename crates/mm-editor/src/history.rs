//! Undo/redo history of full scene snapshots.
//!
//! Every qualifying edit schedules a snapshot through a debounce, so a drag
//! or a burst of typing becomes one history entry. The log is linear:
//! pushing after an undo prunes the redo branch. The newest snapshot is also
//! written to recovery storage so a reload can pick up where the user was.
//!
//! Restoring a snapshot replaces the scene, which raises the same change
//! notifications as a user edit. The manager moves through an explicit
//! `Idle → Restoring → Idle` transition and ignores snapshot requests while
//! `Restoring`, so a restore never records itself.
//!
//! Persistence is best-effort: serialization and storage failures are logged
//! and skipped, and never interrupt editing.

use crate::schedule::{Debouncer, Interval};
use crate::storage::RecoveryStore;
use mm_core::{Scene, Snapshot};
use std::collections::VecDeque;

// ─── Log ─────────────────────────────────────────────────────────────────

/// Bounded linear log with a cursor.
///
/// Invariant: `index < entries.len()` whenever the log is non-empty.
#[derive(Debug, Clone)]
pub struct HistoryLog {
    entries: VecDeque<Snapshot>,
    index: usize,
    limit: usize,
}

impl HistoryLog {
    pub fn new(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            entries: VecDeque::with_capacity(limit),
            index: 0,
            limit,
        }
    }

    /// Append after the cursor, pruning any redo branch and evicting the
    /// oldest entry past the limit. The cursor moves to the new tail.
    pub fn push(&mut self, snapshot: Snapshot) {
        if !self.entries.is_empty() && self.index + 1 < self.entries.len() {
            self.entries.truncate(self.index + 1);
        }
        self.entries.push_back(snapshot);
        while self.entries.len() > self.limit {
            self.entries.pop_front();
        }
        self.index = self.entries.len() - 1;
    }

    /// Replace the whole log with a single entry.
    pub fn reset(&mut self, snapshot: Snapshot) {
        self.entries.clear();
        self.entries.push_back(snapshot);
        self.index = 0;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Cursor position, `None` while the log is empty.
    pub fn index(&self) -> Option<usize> {
        (!self.entries.is_empty()).then_some(self.index)
    }

    pub fn get(&self, idx: usize) -> Option<&Snapshot> {
        self.entries.get(idx)
    }

    pub fn current(&self) -> Option<&Snapshot> {
        self.entries.get(self.index)
    }

    pub fn can_undo(&self) -> bool {
        !self.entries.is_empty() && self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    fn set_index(&mut self, idx: usize) {
        debug_assert!(idx < self.entries.len());
        self.index = idx;
    }
}

// ─── Manager ─────────────────────────────────────────────────────────────

/// Whether a restore is in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryPhase {
    Idle,
    Restoring,
}

/// How the session started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    /// A persisted snapshot was restored and seeds the log.
    Restored,
    /// Nothing usable was persisted; the log starts from the current scene.
    Fresh,
}

/// What a `poll` did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollOutcome {
    pub pushed: bool,
    pub autosaved: bool,
}

pub struct HistoryManager {
    log: HistoryLog,
    phase: HistoryPhase,
    debounce: Debouncer,
    autosave: Interval,
    recovery_key: String,
}

impl HistoryManager {
    pub fn new(
        limit: usize,
        debounce_ms: f64,
        autosave_interval_ms: f64,
        recovery_key: impl Into<String>,
    ) -> Self {
        Self {
            log: HistoryLog::new(limit),
            phase: HistoryPhase::Idle,
            debounce: Debouncer::new(debounce_ms),
            autosave: Interval::new(autosave_interval_ms),
            recovery_key: recovery_key.into(),
        }
    }

    pub fn log(&self) -> &HistoryLog {
        &self.log
    }

    pub fn phase(&self) -> HistoryPhase {
        self.phase
    }

    pub fn is_restoring(&self) -> bool {
        self.phase == HistoryPhase::Restoring
    }

    pub fn has_pending_snapshot(&self) -> bool {
        self.debounce.is_pending()
    }

    pub fn len(&self) -> usize {
        self.log.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }

    pub fn index(&self) -> Option<usize> {
        self.log.index()
    }

    pub fn can_undo(&self) -> bool {
        self.log.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.log.can_redo()
    }

    pub fn recovery_key(&self) -> &str {
        &self.recovery_key
    }

    // ─── Startup ─────────────────────────────────────────────────────────

    /// Restore the persisted snapshot into `scene` if there is a usable one,
    /// seeding a one-entry log; otherwise push a snapshot of `scene` as it is.
    /// Starts the autosave interval either way.
    pub fn recover(
        &mut self,
        scene: &mut Scene,
        store: &mut dyn RecoveryStore,
        now_ms: f64,
    ) -> Recovery {
        self.autosave.start(now_ms);

        let persisted = match store.load(&self.recovery_key) {
            Ok(found) => found,
            Err(e) => {
                log::warn!("recovery: could not read `{}`: {e}", self.recovery_key);
                None
            }
        };
        if let Some(json) = persisted {
            let snapshot = Snapshot::from_json(json);
            match snapshot.restore() {
                Ok(restored) => {
                    *scene = restored;
                    self.log.reset(snapshot);
                    log::debug!("recovery: restored {} objects", scene.len());
                    return Recovery::Restored;
                }
                Err(e) => log::warn!("recovery: discarding unreadable snapshot: {e}"),
            }
        }

        self.log = HistoryLog::new(self.log.limit());
        self.push_snapshot(scene, store);
        Recovery::Fresh
    }

    /// Replace the log with a single snapshot of `scene` (after loading a
    /// shared or imported design) and persist it.
    pub fn reseed(&mut self, scene: &Scene, store: &mut dyn RecoveryStore) {
        self.debounce.cancel();
        match Snapshot::capture(scene) {
            Ok(snapshot) => {
                self.persist(&snapshot, store);
                self.log.reset(snapshot);
            }
            Err(e) => log::warn!("history: could not snapshot loaded scene: {e}"),
        }
    }

    // ─── Recording ───────────────────────────────────────────────────────

    /// Snapshot the scene now. Returns `true` if an entry was appended.
    ///
    /// No-op while restoring, and at the tail when the scene equals the
    /// last entry. Below the tail a push always prunes the redo branch.
    pub fn push_snapshot(&mut self, scene: &Scene, store: &mut dyn RecoveryStore) -> bool {
        if self.is_restoring() {
            return false;
        }
        let snapshot = match Snapshot::capture(scene) {
            Ok(s) => s,
            Err(e) => {
                log::warn!("history: snapshot failed: {e}");
                return false;
            }
        };
        if !self.log.can_redo() && self.log.current() == Some(&snapshot) {
            return false;
        }
        self.log.push(snapshot.clone());
        log::debug!(
            "history: pushed entry {} of {}",
            self.log.index().unwrap_or(0) + 1,
            self.log.len()
        );
        self.persist(&snapshot, store);
        true
    }

    /// Debounced `push_snapshot`: restart the quiet period. Ignored while
    /// restoring. Returns whether the request was accepted.
    pub fn schedule_snapshot(&mut self, now_ms: f64) -> bool {
        if self.is_restoring() {
            log::trace!("history: snapshot request suppressed during restore");
            return false;
        }
        self.debounce.schedule(now_ms);
        true
    }

    /// Run whatever came due: the debounced snapshot and the autosave.
    pub fn poll(
        &mut self,
        scene: &Scene,
        store: &mut dyn RecoveryStore,
        now_ms: f64,
    ) -> PollOutcome {
        let mut outcome = PollOutcome::default();
        if self.debounce.take_due(now_ms) {
            outcome.pushed = self.push_snapshot(scene, store);
        }
        if self.autosave.take_due(now_ms) && !self.is_restoring() {
            outcome.autosaved = self.autosave_now(scene, store);
        }
        outcome
    }

    /// Persist the live scene without touching the log.
    pub fn autosave_now(&mut self, scene: &Scene, store: &mut dyn RecoveryStore) -> bool {
        match Snapshot::capture(scene) {
            Ok(snapshot) => self.persist(&snapshot, store),
            Err(e) => {
                log::warn!("autosave: snapshot failed: {e}");
                false
            }
        }
    }

    pub fn clear_recovery(&mut self, store: &mut dyn RecoveryStore) {
        if let Err(e) = store.remove(&self.recovery_key) {
            log::warn!("recovery: could not clear `{}`: {e}", self.recovery_key);
        }
    }

    fn persist(&self, snapshot: &Snapshot, store: &mut dyn RecoveryStore) -> bool {
        match store.save(&self.recovery_key, snapshot.as_json()) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("recovery: could not persist snapshot: {e}");
                false
            }
        }
    }

    // ─── Restoring ───────────────────────────────────────────────────────

    /// Target index for undo, if any.
    pub fn undo_target(&self) -> Option<usize> {
        self.log.can_undo().then(|| self.log.index - 1)
    }

    /// Target index for redo, if any.
    pub fn redo_target(&self) -> Option<usize> {
        self.log.can_redo().then(|| self.log.index + 1)
    }

    /// `Idle → Restoring`: cancel the pending debounced snapshot (it is
    /// dropped, not flushed), decode entry `idx` and move the cursor to it.
    ///
    /// Returns the scene to install. The caller installs it, then calls
    /// `end_restore`. Returns `None`, staying `Idle`, if `idx` is out of
    /// range, a restore is already running, or the entry cannot be decoded.
    pub fn begin_restore(&mut self, idx: usize) -> Option<Scene> {
        if self.is_restoring() {
            return None;
        }
        let snapshot = self.log.get(idx)?;
        let scene = match snapshot.restore() {
            Ok(scene) => scene,
            Err(e) => {
                log::error!("history: entry {idx} is unreadable: {e}");
                return None;
            }
        };
        if self.debounce.cancel() {
            log::debug!("history: dropped pending snapshot for restore");
        }
        self.phase = HistoryPhase::Restoring;
        self.log.set_index(idx);
        Some(scene)
    }

    /// `Restoring → Idle`.
    pub fn end_restore(&mut self) {
        self.phase = HistoryPhase::Idle;
    }

    /// Restore entry `idx` straight into `scene`.
    pub fn restore(&mut self, idx: usize, scene: &mut Scene) -> bool {
        let Some(restored) = self.begin_restore(idx) else {
            return false;
        };
        *scene = restored;
        self.end_restore();
        true
    }

    pub fn undo(&mut self, scene: &mut Scene) -> bool {
        match self.undo_target() {
            Some(idx) => self.restore(idx, scene),
            None => false,
        }
    }

    pub fn redo(&mut self, scene: &mut Scene) -> bool {
        match self.redo_target() {
            Some(idx) => self.restore(idx, scene),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, StorageError};
    use mm_core::{ImageProps, ObjectId, ObjectKind, SceneObject};

    const KEY: &str = "test.recovery";

    fn manager(limit: usize) -> HistoryManager {
        HistoryManager::new(limit, 300.0, 5000.0, KEY)
    }

    fn scene_with(n: usize) -> Scene {
        let mut scene = Scene::new();
        for i in 0..n {
            scene.add(SceneObject::new(
                ObjectId::intern(&format!("img_{i}")),
                ObjectKind::Image(ImageProps {
                    src: format!("assets/{i}.png"),
                    width: 64.0,
                    height: 64.0,
                }),
            ));
        }
        scene
    }

    fn snap(n: usize) -> Snapshot {
        Snapshot::capture(&scene_with(n)).unwrap()
    }

    #[test]
    fn log_evicts_oldest_first() {
        let mut log = HistoryLog::new(3);
        for n in 0..5 {
            log.push(snap(n));
        }
        assert_eq!(log.len(), 3);
        assert_eq!(log.index(), Some(2));
        assert_eq!(log.get(0), Some(&snap(2)));
        assert_eq!(log.get(2), Some(&snap(4)));
    }

    #[test]
    fn log_prunes_redo_branch() {
        // [A, B, C, D] at B, push E → [A, B, E] at E
        let mut log = HistoryLog::new(10);
        for n in 0..4 {
            log.push(snap(n));
        }
        log.set_index(1);
        log.push(snap(9));
        assert_eq!(log.len(), 3);
        assert_eq!(log.index(), Some(2));
        assert_eq!(log.get(1), Some(&snap(1)));
        assert_eq!(log.get(2), Some(&snap(9)));
        assert!(!log.can_redo());
    }

    #[test]
    fn empty_log_has_no_cursor() {
        let log = HistoryLog::new(5);
        assert_eq!(log.index(), None);
        assert!(!log.can_undo());
        assert!(!log.can_redo());
    }

    #[test]
    fn undo_redo_round_trip() {
        let mut h = manager(50);
        let mut store = MemoryStore::new();
        let mut scene = Scene::new();
        h.recover(&mut scene, &mut store, 0.0);
        for n in 1..=3 {
            scene = scene_with(n);
            h.push_snapshot(&scene, &mut store);
        }
        let before = Snapshot::capture(&scene).unwrap();
        assert!(h.undo(&mut scene));
        assert_eq!(scene.len(), 2);
        assert!(h.redo(&mut scene));
        assert_eq!(Snapshot::capture(&scene).unwrap(), before);
    }

    #[test]
    fn undo_and_redo_stop_at_ends() {
        let mut h = manager(50);
        let mut store = MemoryStore::new();
        let mut scene = Scene::new();
        h.recover(&mut scene, &mut store, 0.0);
        assert!(!h.undo(&mut scene));
        assert!(!h.redo(&mut scene));
    }

    #[test]
    fn identical_push_at_tail_is_skipped() {
        let mut h = manager(50);
        let mut store = MemoryStore::new();
        let mut scene = scene_with(1);
        h.recover(&mut scene, &mut store, 0.0);
        assert!(!h.push_snapshot(&scene, &mut store));
        assert_eq!(h.log().len(), 1);
    }

    #[test]
    fn unchanged_push_after_undo_prunes_redo() {
        let mut h = manager(50);
        let mut store = MemoryStore::new();
        let mut scene = Scene::new();
        h.recover(&mut scene, &mut store, 0.0);
        for n in 1..=3 {
            scene = scene_with(n);
            assert!(h.push_snapshot(&scene, &mut store));
        }
        assert!(h.undo(&mut scene));
        assert!(h.undo(&mut scene));
        assert_eq!(h.index(), Some(1));

        assert!(h.push_snapshot(&scene, &mut store));
        assert_eq!(h.len(), 3);
        assert_eq!(h.index(), Some(2));
        assert!(!h.can_redo());
    }

    #[test]
    fn push_persists_latest() {
        let mut h = manager(50);
        let mut store = MemoryStore::new();
        let mut scene = Scene::new();
        h.recover(&mut scene, &mut store, 0.0);
        scene = scene_with(2);
        h.push_snapshot(&scene, &mut store);
        assert_eq!(store.get(KEY), Some(snap(2).as_json()));
    }

    #[test]
    fn debounce_coalesces_and_fires_once() {
        let mut h = manager(50);
        let mut store = MemoryStore::new();
        let mut scene = Scene::new();
        h.recover(&mut scene, &mut store, 0.0);

        scene = scene_with(1);
        h.schedule_snapshot(0.0);
        scene = scene_with(2);
        h.schedule_snapshot(100.0);
        assert_eq!(h.poll(&scene, &mut store, 350.0), PollOutcome::default());
        let out = h.poll(&scene, &mut store, 400.0);
        assert!(out.pushed);
        assert_eq!(h.log().len(), 2);
        assert_eq!(h.log().current(), Some(&snap(2)));
    }

    #[test]
    fn restore_cancels_pending_snapshot() {
        let mut h = manager(50);
        let mut store = MemoryStore::new();
        let mut scene = Scene::new();
        h.recover(&mut scene, &mut store, 0.0);
        for n in 1..=3 {
            scene = scene_with(n);
            h.push_snapshot(&scene, &mut store);
        }
        // Edit in flight, then restore entry 2 before the debounce fires.
        scene = scene_with(7);
        h.schedule_snapshot(1000.0);
        assert!(h.restore(2, &mut scene));
        assert!(!h.has_pending_snapshot());
        let out = h.poll(&scene, &mut store, 10_000.0);
        assert!(!out.pushed);
        assert_eq!(h.log().len(), 4);
        assert_eq!(h.log().index(), Some(2));
    }

    #[test]
    fn requests_during_restore_are_ignored() {
        let mut h = manager(50);
        let mut store = MemoryStore::new();
        let mut scene = Scene::new();
        h.recover(&mut scene, &mut store, 0.0);
        scene = scene_with(1);
        h.push_snapshot(&scene, &mut store);

        let restored = h.begin_restore(0).unwrap();
        assert_eq!(h.phase(), HistoryPhase::Restoring);
        assert!(!h.schedule_snapshot(10.0));
        assert!(!h.push_snapshot(&restored, &mut store));
        assert!(h.begin_restore(1).is_none(), "no nested restores");
        h.end_restore();
        assert_eq!(h.phase(), HistoryPhase::Idle);
        assert!(!h.has_pending_snapshot());
        assert_eq!(h.log().len(), 2);
    }

    #[test]
    fn recover_restores_persisted_snapshot() {
        let mut store = MemoryStore::new();
        store.save(KEY, snap(3).as_json()).unwrap();
        let mut h = manager(50);
        let mut scene = Scene::new();
        assert_eq!(h.recover(&mut scene, &mut store, 0.0), Recovery::Restored);
        assert_eq!(scene.len(), 3);
        assert_eq!(h.log().len(), 1);
        assert!(!h.can_undo());
    }

    #[test]
    fn recover_skips_corrupt_snapshot() {
        let mut store = MemoryStore::new();
        store.save(KEY, "{\"objects\": [").unwrap();
        let mut h = manager(50);
        let mut scene = Scene::new();
        assert_eq!(h.recover(&mut scene, &mut store, 0.0), Recovery::Fresh);
        assert!(scene.is_empty());
        assert_eq!(h.log().len(), 1);
        assert_eq!(store.get(KEY), Some(snap(0).as_json()));
    }

    #[test]
    fn storage_failures_do_not_block_history() {
        let mut store = MemoryStore::with_capacity(10);
        let mut h = manager(50);
        let mut scene = Scene::new();
        h.recover(&mut scene, &mut store, 0.0);
        scene = scene_with(2);
        assert!(h.push_snapshot(&scene, &mut store));
        assert_eq!(h.log().len(), 2);
        assert!(matches!(
            store.save(KEY, snap(2).as_json()),
            Err(StorageError::QuotaExceeded { .. })
        ));
    }

    #[test]
    fn autosave_runs_on_interval() {
        let mut h = manager(50);
        let mut store = MemoryStore::new();
        let mut scene = Scene::new();
        h.recover(&mut scene, &mut store, 0.0);
        scene = scene_with(4);
        assert!(!h.poll(&scene, &mut store, 4999.0).autosaved);
        assert!(h.poll(&scene, &mut store, 5000.0).autosaved);
        assert_eq!(store.get(KEY), Some(snap(4).as_json()));
        // Autosave does not add history.
        assert_eq!(h.log().len(), 1);
    }
}
