//! Fixed geometry of the square board, in board units with the origin at the
//! top-left corner and y growing downwards.
//!
//! Slot 0 is the bottom-right corner; slots run right-to-left along the
//! bottom, bottom-to-top along the left, left-to-right along the top and
//! top-to-bottom along the right, ten slots per side.

use crate::BOARD_SLOTS;

pub const BOARD_SIZE: f64 = 800.0;
/// Eleven tile widths per side: nine properties plus two corners.
pub const TILE_WIDTH: f64 = BOARD_SIZE / 11.0;

const SLOTS_PER_SIDE: u8 = BOARD_SLOTS / 4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl TileRect {
    pub fn center(&self) -> Point {
        Point {
            x: self.x + self.width / 2.0,
            y: self.y + self.height / 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Bottom,
    Left,
    Top,
    Right,
}

pub fn side_of(slot: u8) -> Side {
    match (slot % BOARD_SLOTS) / SLOTS_PER_SIDE {
        0 => Side::Bottom,
        1 => Side::Left,
        2 => Side::Top,
        _ => Side::Right,
    }
}

pub fn tile_rect(slot: u8) -> TileRect {
    let slot = slot % BOARD_SLOTS;
    let along = f64::from(slot % SLOTS_PER_SIDE) * TILE_WIDTH;
    let (x, y) = match side_of(slot) {
        Side::Bottom => (BOARD_SIZE - along - TILE_WIDTH, BOARD_SIZE - TILE_WIDTH),
        Side::Left => (0.0, BOARD_SIZE - along - TILE_WIDTH),
        Side::Top => (along, 0.0),
        Side::Right => (BOARD_SIZE - TILE_WIDTH, along),
    };
    TileRect {
        x,
        y,
        width: TILE_WIDTH,
        height: TILE_WIDTH,
    }
}

pub fn slot_center(slot: u8) -> Point {
    tile_rect(slot).center()
}

/// Maps a continuous position in `[0, 40)` onto the perimeter by blending the
/// centers of the two slots it lies between.
pub fn position_point(position: f64) -> Point {
    let position = position.rem_euclid(f64::from(BOARD_SLOTS));
    let base = position.floor();
    let progress = position - base;
    // `base` is in 0..40 after the wrap above.
    let from = base as u8 % BOARD_SLOTS;
    let to = (from + 1) % BOARD_SLOTS;
    let a = slot_center(from);
    let b = slot_center(to);
    Point {
        x: a.x + (b.x - a.x) * progress,
        y: a.y + (b.y - a.y) * progress,
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]
    use super::*;

    fn close(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
    }

    #[test]
    fn slot_center__corners__sit_at_board_corners() {
        let half = TILE_WIDTH / 2.0;
        let far = BOARD_SIZE - half;
        assert!(close(slot_center(0), Point { x: far, y: far }));
        assert!(close(slot_center(10), Point { x: half, y: far }));
        assert!(close(slot_center(20), Point { x: half, y: half }));
        assert!(close(slot_center(30), Point { x: far, y: half }));
    }

    #[test]
    fn slot_center__neighbours__one_tile_apart() {
        for slot in 0..BOARD_SLOTS {
            let a = slot_center(slot);
            let b = slot_center((slot + 1) % BOARD_SLOTS);
            let distance = ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt();
            assert!(
                (distance - TILE_WIDTH).abs() < 1e-9,
                "slot {slot} -> {} is {distance} apart",
                (slot + 1) % BOARD_SLOTS
            );
        }
    }

    #[test]
    fn position_point__halfway__midpoint_of_slots() {
        // given
        let a = slot_center(5);
        let b = slot_center(6);

        // when
        let mid = position_point(5.5);

        // then
        assert!(close(
            mid,
            Point {
                x: (a.x + b.x) / 2.0,
                y: (a.y + b.y) / 2.0
            }
        ));
    }

    #[test]
    fn position_point__across_seam__blends_last_and_first_slot() {
        // given
        let a = slot_center(39);
        let b = slot_center(0);

        // when
        let p = position_point(39.25);

        // then
        assert!(close(
            p,
            Point {
                x: a.x + (b.x - a.x) * 0.25,
                y: a.y + (b.y - a.y) * 0.25
            }
        ));
    }

    #[test]
    fn side_of__each_quarter__expected_side() {
        assert_eq!(side_of(9), Side::Bottom);
        assert_eq!(side_of(10), Side::Left);
        assert_eq!(side_of(25), Side::Top);
        assert_eq!(side_of(39), Side::Right);
    }
}
