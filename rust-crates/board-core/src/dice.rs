use crate::snapshot::Snapshot;
use rand::Rng;
use std::time::{
    Duration,
    Instant,
};

/// How often the faces reshuffle while spinning.
pub const SPIN_INTERVAL: Duration = Duration::from_millis(100);

pub const INITIAL_FACES: [u8; 2] = [1, 1];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiceState {
    Resting([u8; 2]),
    Spinning { started_at: Instant },
}

/// Presentation of the two dice. Spinning is purely cosmetic and only ever
/// ends when an authoritative roll arrives.
#[derive(Debug, Clone)]
pub struct DiceAnimation {
    state: DiceState,
    faces: [u8; 2],
    last_shuffle: Option<Instant>,
}

impl Default for DiceAnimation {
    fn default() -> Self {
        Self {
            state: DiceState::Resting(INITIAL_FACES),
            faces: INITIAL_FACES,
            last_shuffle: None,
        }
    }
}

impl DiceAnimation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DiceState {
        self.state
    }

    pub fn is_spinning(&self) -> bool {
        matches!(self.state, DiceState::Spinning { .. })
    }

    /// Faces to show right now: the resting values, or the latest shuffle.
    pub fn faces(&self) -> [u8; 2] {
        match self.state {
            DiceState::Resting(values) => values,
            DiceState::Spinning { .. } => self.faces,
        }
    }

    pub fn start_spin(&mut self, now: Instant) {
        if !self.is_spinning() {
            tracing::debug!("dice spinning");
        }
        self.state = DiceState::Spinning { started_at: now };
        self.last_shuffle = None;
    }

    /// Lands on the snapshot's roll, if it carries one, overriding any spin.
    pub fn observe(&mut self, snapshot: &Snapshot) {
        if let Some(values) = snapshot.last_roll() {
            self.state = DiceState::Resting(values);
            self.faces = values;
            self.last_shuffle = None;
        }
    }

    pub fn tick<R: Rng>(&mut self, now: Instant, rng: &mut R) -> [u8; 2] {
        if self.is_spinning() {
            let due = self
                .last_shuffle
                .is_none_or(|last| now.saturating_duration_since(last) >= SPIN_INTERVAL);
            if due {
                self.faces = [rng.random_range(1..=6), rng.random_range(1..=6)];
                self.last_shuffle = Some(now);
            }
        }
        self.faces()
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]
    use super::*;
    use proptest::prelude::*;
    use rand::{
        SeedableRng,
        rngs::StdRng,
    };

    fn rolled(values: [u8; 2]) -> Snapshot {
        Snapshot::new([], [], Some(values), None).unwrap()
    }

    #[test]
    fn new__before_any_roll__resting_on_ones() {
        assert_eq!(DiceAnimation::new().state(), DiceState::Resting([1, 1]));
    }

    #[test]
    fn tick__spinning__faces_stay_in_range_and_reshuffle_on_interval() {
        // given
        let mut dice = DiceAnimation::new();
        let mut rng = StdRng::seed_from_u64(7);
        let start = Instant::now();
        dice.start_spin(start);

        // when
        let first = dice.tick(start, &mut rng);
        let held = dice.tick(start + Duration::from_millis(50), &mut rng);

        // then
        assert!(first.iter().all(|f| (1..=6).contains(f)));
        assert_eq!(first, held);
        for step in 1..20u64 {
            let faces = dice.tick(start + SPIN_INTERVAL * step as u32, &mut rng);
            assert!(faces.iter().all(|f| (1..=6).contains(f)));
        }
        assert!(dice.is_spinning());
    }

    #[test]
    fn observe__snapshot_without_roll__keeps_spinning() {
        // given
        let mut dice = DiceAnimation::new();
        dice.start_spin(Instant::now());
        let bought = Snapshot::new([], [], None, Some("bought".into())).unwrap();

        // when
        dice.observe(&bought);

        // then
        assert!(dice.is_spinning());
    }

    #[test]
    fn observe__roll_while_resting__updates_values() {
        // given
        let mut dice = DiceAnimation::new();

        // when
        dice.observe(&rolled([2, 5]));

        // then
        assert_eq!(dice.state(), DiceState::Resting([2, 5]));
        assert_eq!(dice.faces(), [2, 5]);
    }

    proptest! {
        #[test]
        fn observe__roll_after_spin__rests_on_authoritative_faces(
            d1 in 1u8..=6,
            d2 in 1u8..=6,
            spin_ticks in 0u32..30,
            seed in any::<u64>(),
        ) {
            let mut dice = DiceAnimation::new();
            let mut rng = StdRng::seed_from_u64(seed);
            let start = Instant::now();
            dice.start_spin(start);
            for tick in 0..spin_ticks {
                dice.tick(start + Duration::from_millis(16) * tick, &mut rng);
            }

            dice.observe(&rolled([d1, d2]));

            prop_assert_eq!(dice.state(), DiceState::Resting([d1, d2]));
            let later = start + Duration::from_secs(5);
            prop_assert_eq!(dice.tick(later, &mut rng), [d1, d2]);
        }
    }
}
