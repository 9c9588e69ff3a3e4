#![forbid(unsafe_code)]

//! Property tests for arrow-key navigation.

use proptest::prelude::*;
use shelfkit_grid::{
    CellMatrix, CellPos, CellRegistration, CellState, Direction, DisplayedColumns, navigate,
};

fn matrix_from(mask: &[Vec<bool>]) -> CellMatrix {
    let cols = mask.first().map_or(0, Vec::len);
    let keys: Vec<String> = (0..cols).map(|c| format!("c{c}")).collect();
    let displayed = DisplayedColumns::with_select(&keys);
    let mut cells = Vec::new();
    // Register in reverse to exercise the sort into display order.
    for (r, row) in mask.iter().enumerate().rev() {
        for (c, &enabled) in row.iter().enumerate().rev() {
            let state = if enabled {
                CellState::EnabledValid
            } else {
                CellState::Disabled
            };
            cells.push(CellRegistration::new(r, format!("c{c}"), state));
        }
    }
    CellMatrix::build(mask.len(), &displayed, cells)
}

fn masks() -> impl Strategy<Value = Vec<Vec<bool>>> {
    (1usize..8, 1usize..6).prop_flat_map(|(rows, cols)| {
        prop::collection::vec(prop::collection::vec(any::<bool>(), cols), rows)
    })
}

fn direction() -> impl Strategy<Value = Direction> {
    prop_oneof![
        Just(Direction::Up),
        Just(Direction::Down),
        Just(Direction::Left),
        Just(Direction::Right),
    ]
}

proptest! {
    #[test]
    fn never_lands_on_disabled(mask in masks(), dir in direction(), r in 0usize..8, c in 0usize..6) {
        let matrix = matrix_from(&mask);
        let from = CellPos::new(r % matrix.rows(), c % matrix.cols());
        if let Some(target) = navigate(&matrix, from, dir) {
            prop_assert!(matrix.is_enabled(target));
            prop_assert_ne!(target, from);
        }
    }

    #[test]
    fn stays_on_line(mask in masks(), dir in direction(), r in 0usize..8, c in 0usize..6) {
        let matrix = matrix_from(&mask);
        let from = CellPos::new(r % matrix.rows(), c % matrix.cols());
        if let Some(target) = navigate(&matrix, from, dir) {
            if dir.is_vertical() {
                prop_assert_eq!(target.col, from.col);
            } else {
                prop_assert_eq!(target.row, from.row);
            }
        }
    }

    #[test]
    fn finds_nearest_enabled_down(mask in masks(), r in 0usize..8, c in 0usize..6) {
        let matrix = matrix_from(&mask);
        let rows = matrix.rows();
        let from = CellPos::new(r % rows, c % matrix.cols());
        let expected = (1..rows)
            .map(|step| CellPos::new((from.row + step) % rows, from.col))
            .find(|pos| matrix.is_enabled(*pos));
        prop_assert_eq!(navigate(&matrix, from, Direction::Down), expected);
    }

    #[test]
    fn up_undoes_down_without_gaps(rows in 2usize..10, start in 0usize..10) {
        let mask = vec![vec![true]; rows];
        let matrix = matrix_from(&mask);
        let from = CellPos::new(start % rows, 0);
        let down = navigate(&matrix, from, Direction::Down).unwrap();
        prop_assert_eq!(navigate(&matrix, down, Direction::Up), Some(from));
    }
}

#[test]
fn three_row_wraparound_and_skip() {
    let mut mask = vec![vec![true]; 3];
    let matrix = matrix_from(&mask);
    assert_eq!(navigate(&matrix, CellPos::new(0, 0), Direction::Up), Some(CellPos::new(2, 0)));
    assert_eq!(navigate(&matrix, CellPos::new(2, 0), Direction::Down), Some(CellPos::new(0, 0)));

    mask[1][0] = false;
    let matrix = matrix_from(&mask);
    assert_eq!(navigate(&matrix, CellPos::new(2, 0), Direction::Up), Some(CellPos::new(0, 0)));
}

#[test]
fn all_disabled_column_is_noop() {
    let matrix = matrix_from(&vec![vec![false]; 50]);
    for dir in [Direction::Up, Direction::Down, Direction::Left, Direction::Right] {
        assert_eq!(navigate(&matrix, CellPos::new(25, 0), dir), None);
    }
}
