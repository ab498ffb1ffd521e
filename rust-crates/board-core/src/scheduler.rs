//! The per-tick drawing pass, expressed as data.
//!
//! A front end calls [`RenderScheduler::tick`] once per display refresh (or
//! timer callback) and draws the returned [`Frame`]. Interpolation step sizes
//! are per tick, so the caller must keep a steady tick cadence.

use crate::{
    PlayerId,
    dice::DiceAnimation,
    interpolation::PositionInterpolator,
    layout::TileKind,
    perimeter::{
        self,
        Point,
        TileRect,
    },
    snapshot::Snapshot,
    store::SnapshotStore,
};
use rand::{
    Rng,
    SeedableRng,
    rngs::StdRng,
};
use std::time::{
    Duration,
    Instant,
};

pub const DEFAULT_TICK_RATE: u32 = 60;
/// Fastest cadence a front end may request.
pub const MAX_TICK_RATE: u32 = 1000;
/// Per-player marker offset so co-located players stay distinguishable.
pub const PLAYER_OFFSET_STEP: f64 = 5.0;

/// Never zero: rates are clamped to `1..=MAX_TICK_RATE`.
pub fn tick_interval(tick_rate: u32) -> Duration {
    Duration::from_secs(1) / tick_rate.clamp(1, MAX_TICK_RATE)
}

#[derive(Debug, Clone, PartialEq)]
pub struct TileView {
    pub slot: u8,
    pub name: String,
    pub kind: TileKind,
    pub color: String,
    pub rect: TileRect,
    pub owner_color: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerMarker {
    pub player_id: PlayerId,
    pub name: String,
    pub color: String,
    pub position: f64,
    pub point: Point,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiceView {
    pub faces: [u8; 2],
    pub spinning: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub tick: u64,
    pub tiles: Vec<TileView>,
    pub players: Vec<PlayerMarker>,
    pub dice: DiceView,
}

impl Frame {
    pub fn is_empty_board(&self) -> bool {
        self.tiles.is_empty() && self.players.is_empty()
    }

    pub fn marker(&self, player_id: &str) -> Option<&PlayerMarker> {
        self.players.iter().find(|m| m.player_id == player_id)
    }
}

pub struct RenderScheduler<R = StdRng> {
    interpolator: PositionInterpolator,
    dice: DiceAnimation,
    rng: R,
    ticks: u64,
}

impl RenderScheduler<StdRng> {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }
}

impl Default for RenderScheduler<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> RenderScheduler<R> {
    pub fn with_rng(rng: R) -> Self {
        Self {
            interpolator: PositionInterpolator::new(),
            dice: DiceAnimation::new(),
            rng,
            ticks: 0,
        }
    }

    /// Called once for every snapshot the store accepts.
    pub fn on_snapshot(&mut self, snapshot: &Snapshot) {
        self.dice.observe(snapshot);
    }

    pub fn on_roll_intent(&mut self, now: Instant) {
        self.dice.start_spin(now);
    }

    pub fn tick(&mut self, now: Instant, store: &SnapshotStore) -> Frame {
        self.ticks += 1;
        let snapshot = store.current();
        if let Some(snapshot) = snapshot {
            self.interpolator.advance(snapshot);
        }
        let faces = self.dice.tick(now, &mut self.rng);

        let tiles = store
            .layout()
            .tiles()
            .iter()
            .map(|tile| TileView {
                slot: tile.id,
                name: tile.name.clone(),
                kind: tile.kind,
                color: tile.color.clone(),
                rect: perimeter::tile_rect(tile.id),
                owner_color: snapshot
                    .and_then(|s| s.owner_of(tile.id))
                    .map(|owner| owner.color.clone()),
            })
            .collect();

        let players = snapshot
            .map(|snapshot| self.player_markers(snapshot))
            .unwrap_or_default();

        Frame {
            tick: self.ticks,
            tiles,
            players,
            dice: DiceView {
                faces,
                spinning: self.dice.is_spinning(),
            },
        }
    }

    fn player_markers(&self, snapshot: &Snapshot) -> Vec<PlayerMarker> {
        snapshot
            .players()
            .values()
            .enumerate()
            .map(|(index, player)| {
                let position = self
                    .interpolator
                    .position(&player.id)
                    .unwrap_or_else(|| f64::from(player.slot));
                let base = perimeter::position_point(position);
                let offset = index as f64 * PLAYER_OFFSET_STEP - PLAYER_OFFSET_STEP;
                PlayerMarker {
                    player_id: player.id.clone(),
                    name: player.name.clone(),
                    color: player.color.clone(),
                    position,
                    point: Point {
                        x: base.x + offset,
                        y: base.y + offset,
                    },
                }
            })
            .collect()
    }
}
