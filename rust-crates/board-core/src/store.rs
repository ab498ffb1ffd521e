use crate::{
    layout::BoardLayout,
    snapshot::Snapshot,
};
use std::collections::VecDeque;

/// How many log lines the game log panel keeps.
pub const LOG_HISTORY_DEPTH: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplaceOutcome {
    Accepted,
    /// The server numbered this snapshot at or below one already applied.
    Stale { latest: u64, received: u64 },
}

/// Holds the one current authoritative snapshot and the session's board
/// layout.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    current: Option<Snapshot>,
    layout: BoardLayout,
    latest_seq: Option<u64>,
    log: VecDeque<String>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Swaps in `snapshot` wholesale. Nothing from the previous snapshot
    /// survives, including map entries the new one leaves out.
    pub fn replace(&mut self, snapshot: Snapshot) -> ReplaceOutcome {
        if let (Some(latest), Some(received)) = (self.latest_seq, snapshot.seq())
            && received <= latest
        {
            tracing::warn!(latest, received, "discarding out-of-order snapshot");
            return ReplaceOutcome::Stale { latest, received };
        }
        if let Some(seq) = snapshot.seq() {
            self.latest_seq = Some(seq);
        }
        if let Some(line) = snapshot.game_log() {
            self.log.push_front(line.to_string());
            self.log.truncate(LOG_HISTORY_DEPTH);
        }
        self.current = Some(snapshot);
        ReplaceOutcome::Accepted
    }

    /// `None` until the first snapshot arrives.
    pub fn current(&self) -> Option<&Snapshot> {
        self.current.as_ref()
    }

    pub fn set_layout(&mut self, layout: BoardLayout) {
        self.layout = layout;
    }

    pub fn layout(&self) -> &BoardLayout {
        &self.layout
    }

    /// Most recent first.
    pub fn log_history(&self) -> impl Iterator<Item = &str> {
        self.log.iter().map(String::as_str)
    }
}
