//! Grid placement for the browser's 3D scene.

use serde::{Deserialize, Serialize};

use crate::game::CardId;

/// Horizontal distance between card centres, in scene units.
const COLUMN_SPACING: f32 = 2.2;
/// Vertical distance between card centres, in scene units.
const ROW_SPACING: f32 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    pub card_id: CardId,
    pub x: f32,
    pub y: f32,
}

/// Columns and rows of the most square grid holding `total` cards.
pub fn dimensions(total: usize) -> (usize, usize) {
    if total == 0 {
        return (0, 0);
    }
    let columns = (total as f64).sqrt().ceil() as usize;
    (columns, total.div_ceil(columns))
}

/// Centres every card on a grid around the origin, row-major by id.
pub fn grid(total: usize) -> Vec<Slot> {
    let (columns, rows) = dimensions(total);
    let mid_col = (columns as f32 - 1.0) / 2.0;
    let mid_row = (rows as f32 - 1.0) / 2.0;
    (0..total)
        .map(|card_id| {
            let (row, col) = (card_id / columns, card_id % columns);
            Slot {
                card_id,
                x: (col as f32 - mid_col) * COLUMN_SPACING,
                y: (row as f32 - mid_row) * ROW_SPACING,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ten_cards_make_a_four_by_three_grid() {
        assert_eq!(dimensions(10), (4, 3));
        assert_eq!(dimensions(16), (4, 4));
        assert_eq!(dimensions(52), (8, 7));
    }

    fn close(a: f32, b: f32) -> bool { (a - b).abs() < 1e-4 }

    #[test]
    fn grid_is_centred() {
        let slots = grid(10);
        assert_eq!(slots.len(), 10);
        assert!(close(slots[0].x, -3.3) && close(slots[0].y, -3.0));
        assert!(close(slots[3].x, 3.3) && close(slots[3].y, -3.0));
        assert!(close(slots[5].y, 0.0));
        assert!(close(slots[9].x, -1.1) && close(slots[9].y, 3.0));
        assert!(slots.iter().enumerate().all(|(i, s)| s.card_id == i));
    }
}
