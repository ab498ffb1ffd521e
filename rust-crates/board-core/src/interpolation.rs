use crate::{
    BOARD_SLOTS,
    PlayerId,
    snapshot::Snapshot,
};
use std::collections::HashMap;

/// Beyond half the circumference the shorter path crosses the wrap seam.
pub const WRAP_THRESHOLD: f64 = 20.0;
/// Fixed per-tick step while walking across the seam.
pub const WRAP_STEP: f64 = 0.5;
/// Fraction of the remaining distance covered per tick when easing.
pub const EASING_FACTOR: f64 = 0.1;
/// Below this distance the position snaps onto its target.
pub const SNAP_THRESHOLD: f64 = 0.05;

const CIRCUMFERENCE: f64 = BOARD_SLOTS as f64;

/// Brings any position back into `[0, 40)`.
pub fn normalize(position: f64) -> f64 {
    let wrapped = position.rem_euclid(CIRCUMFERENCE);
    // rem_euclid of a tiny negative value rounds up to the modulus itself
    if wrapped >= CIRCUMFERENCE { 0.0 } else { wrapped }
}

/// One render tick of movement from `current` towards the discrete `target`.
pub fn step(current: f64, target: u8) -> f64 {
    let target = f64::from(target);
    let diff = target - current;
    if diff.abs() > WRAP_THRESHOLD {
        let stepped = if diff > 0.0 {
            current - WRAP_STEP
        } else {
            current + WRAP_STEP
        };
        normalize(stepped)
    } else if diff.abs() < SNAP_THRESHOLD {
        target
    } else {
        current + diff * EASING_FACTOR
    }
}

/// Continuous per-player board positions, eased one tick at a time towards
/// the slots of the latest snapshot.
#[derive(Debug, Default)]
pub struct PositionInterpolator {
    positions: HashMap<PlayerId, f64>,
}

impl PositionInterpolator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances every player in `snapshot` by one tick. Players seen for the
    /// first time start on their current slot; players no longer present are
    /// dropped.
    pub fn advance(&mut self, snapshot: &Snapshot) {
        let players = snapshot.players();
        self.positions.retain(|id, _| players.contains_key(id));
        for (id, player) in players {
            match self.positions.get_mut(id) {
                Some(current) => *current = step(*current, player.slot),
                None => {
                    self.positions.insert(id.clone(), f64::from(player.slot));
                }
            }
        }
    }

    pub fn position(&self, player_id: &str) -> Option<f64> {
        self.positions.get(player_id).copied()
    }

}
