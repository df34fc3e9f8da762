//! Proptest strategies for valid levels, shared by the test modules.

use std::collections::BTreeSet;

use proptest::prelude::*;

use crate::*;

pub fn size_strategy() -> impl Strategy<Value = GridSize> {
    (1..=8, 1..=8).prop_map(|(rows, cols)| GridSize::new(rows, cols).unwrap())
}

pub fn cell_strategy(size: GridSize) -> impl Strategy<Value = HexCoord> + Clone {
    (0..size.cols(), 0..size.rows()).prop_map(|(q, r)| HexCoord::new(q, r))
}

/// Any rule whose cells fit `size`, with `expected` anywhere in `0..=capacity`.
///
/// Sequence cells may repeat; group cells collapse before the capacity is taken.
pub fn rule_strategy(size: GridSize) -> impl Strategy<Value = Rule> {
    let cells = prop::collection::vec(cell_strategy(size), 1..6);
    prop_oneof![
        cells
            .clone()
            .prop_flat_map(|cells| {
                let capacity = cells.len() as MineCount;
                (Just(cells), 0..=capacity)
            })
            .prop_map(|(cells, expected)| Rule::sequence(cells, expected).unwrap()),
        cells
            .prop_flat_map(|cells| {
                let capacity = cells.iter().collect::<BTreeSet<_>>().len() as MineCount;
                (Just(cells), 0..=capacity)
            })
            .prop_map(|(cells, expected)| Rule::group(cells, expected).unwrap()),
        (cell_strategy(size), 0..=EDGE_CAPACITY as MineCount)
            .prop_map(|(cell, expected)| Rule::edge(cell, expected).unwrap()),
    ]
}

pub fn level_strategy() -> impl Strategy<Value = LevelConfig> {
    size_strategy().prop_flat_map(|size| {
        let mines = prop::collection::vec(cell_strategy(size), 0..12);
        let rules = prop::collection::vec(rule_strategy(size), 0..6);
        (mines, rules)
            .prop_map(move |(mines, rules)| LevelConfig::from_parts(size, mines, rules).unwrap())
    })
}
