use std::collections::BTreeSet;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// One level: grid bounds, mine placement and constraint rules.
///
/// Every mine and every cell referenced by a rule lies inside [`GridSize`].
/// The only way to get a value is through a validating constructor, and all
/// changes produce a new snapshot, so a `LevelConfig` never holds out-of-range
/// data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "LevelFields")]
pub struct LevelConfig {
    size: GridSize,
    mines: BTreeSet<HexCoord>,
    rules: Vec<Rule>,
}

impl LevelConfig {
    pub fn new(
        rows: Axis,
        cols: Axis,
        mines: impl IntoIterator<Item = HexCoord>,
        rules: impl IntoIterator<Item = Rule>,
    ) -> Result<Self> {
        Self::from_parts(GridSize::new(rows, cols)?, mines, rules)
    }

    pub fn from_parts(
        size: GridSize,
        mines: impl IntoIterator<Item = HexCoord>,
        rules: impl IntoIterator<Item = Rule>,
    ) -> Result<Self> {
        let mines: BTreeSet<_> = mines.into_iter().collect();
        let rules: Vec<_> = rules.into_iter().collect();
        validate_mines(size, &mines)?;
        validate_rules(size, &rules)?;
        Ok(Self { size, mines, rules })
    }

    /// An empty level of the given size.
    pub fn empty(size: GridSize) -> Self {
        Self {
            size,
            mines: BTreeSet::new(),
            rules: Vec::new(),
        }
    }

    pub fn with_mines(&self, mines: impl IntoIterator<Item = HexCoord>) -> Result<Self> {
        let mines: BTreeSet<_> = mines.into_iter().collect();
        validate_mines(self.size, &mines)?;
        Ok(Self {
            mines,
            ..self.clone()
        })
    }

    pub fn with_rules(&self, rules: impl IntoIterator<Item = Rule>) -> Result<Self> {
        let rules: Vec<_> = rules.into_iter().collect();
        validate_rules(self.size, &rules)?;
        Ok(Self {
            rules,
            ..self.clone()
        })
    }

    /// Same content on a different grid; fails if anything no longer fits.
    pub fn with_size(&self, size: GridSize) -> Result<Self> {
        Self::from_parts(size, self.mines.iter().copied(), self.rules.iter().cloned())
    }

    /// Moves the level onto `size`, dropping every mine outside it and every
    /// rule with at least one cell outside it.
    pub fn pruned_to(&self, size: GridSize) -> Self {
        let mines: BTreeSet<_> = self
            .mines
            .iter()
            .copied()
            .filter(|&mine| size.contains(mine))
            .collect();
        let rules: Vec<_> = self
            .rules
            .iter()
            .filter(|rule| rule.fits(size))
            .cloned()
            .collect();

        let dropped_mines = self.mines.len() - mines.len();
        let dropped_rules = self.rules.len() - rules.len();
        if dropped_mines > 0 || dropped_rules > 0 {
            log::warn!(
                "Resizing {} -> {} dropped {} mines and {} rules",
                self.size,
                size,
                dropped_mines,
                dropped_rules
            );
        }

        Self { size, mines, rules }
    }

    /// Flips the mine at `coord`.
    pub fn toggled_mine(&self, coord: HexCoord) -> Result<Self> {
        let coord = self.size.validate_coords(coord)?;
        let mut mines = self.mines.clone();
        if !mines.remove(&coord) {
            mines.insert(coord);
        }
        Ok(Self {
            mines,
            ..self.clone()
        })
    }

    /// Appends `rule` after checking that it fits the grid.
    pub fn with_rule_added(&self, rule: Rule) -> Result<Self> {
        check_rule(self.size, &rule)?;
        let mut rules = self.rules.clone();
        rules.push(rule);
        Ok(Self {
            rules,
            ..self.clone()
        })
    }

    pub fn size(&self) -> GridSize {
        self.size
    }

    pub fn rows(&self) -> Axis {
        self.size.rows()
    }

    pub fn cols(&self) -> Axis {
        self.size.cols()
    }

    pub fn mines(&self) -> &BTreeSet<HexCoord> {
        &self.mines
    }

    /// Owned copy of the mines in `(q, r)` order.
    pub fn mine_list(&self) -> Vec<HexCoord> {
        self.mines.iter().copied().collect()
    }

    pub fn mine_count(&self) -> usize {
        self.mines.len()
    }

    pub fn is_mine(&self, coord: HexCoord) -> bool {
        self.mines.contains(&coord)
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Owned copy of the rules in insertion order.
    pub fn rule_list(&self) -> Vec<Rule> {
        self.rules.clone()
    }

    /// Every cell of the grid, row by row.
    pub fn cells(&self) -> impl Iterator<Item = HexCoord> + use<> {
        self.size.cells()
    }

    /// Mine mask indexed by `[q, r]`, the shape play engines consume.
    pub fn mine_mask(&self) -> Array2<bool> {
        let dim = (self.cols() as usize, self.rows() as usize);
        let mut mask = Array2::default(dim);
        for mine in &self.mines {
            mask[(mine.q as usize, mine.r as usize)] = true;
        }
        mask
    }

    /// Mines among the in-bounds neighbors of `coord`.
    pub fn adjacent_mine_count(&self, coord: HexCoord) -> Result<usize> {
        let coord = self.size.validate_coords(coord)?;
        Ok(self
            .size
            .iter_neighbors(coord)
            .filter(|neighbor| self.mines.contains(neighbor))
            .count())
    }
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self::empty(GridSize::DEFAULT)
    }
}

fn validate_mines(size: GridSize, mines: &BTreeSet<HexCoord>) -> Result<()> {
    for &mine in mines {
        size.validate_coords(mine)?;
    }
    Ok(())
}

fn validate_rules(size: GridSize, rules: &[Rule]) -> Result<()> {
    rules.iter().try_for_each(|rule| check_rule(size, rule))
}

fn check_rule(size: GridSize, rule: &Rule) -> Result<()> {
    match rule.first_out_of_bounds(size) {
        Some(cell) => Err(LevelError::OutOfBounds(cell)),
        None => Ok(()),
    }
}

#[derive(Deserialize)]
struct LevelFields {
    size: GridSize,
    mines: Vec<HexCoord>,
    rules: Vec<Rule>,
}

impl TryFrom<LevelFields> for LevelConfig {
    type Error = LevelError;

    fn try_from(fields: LevelFields) -> Result<Self> {
        Self::from_parts(fields.size, fields.mines, fields.rules)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(q: Axis, r: Axis) -> HexCoord {
        HexCoord::new(q, r)
    }

    #[test]
    fn default_is_empty_five_by_five() {
        let level = LevelConfig::default();
        assert_eq!((level.rows(), level.cols()), (5, 5));
        assert!(level.mines().is_empty());
        assert!(level.rules().is_empty());
        assert_eq!(level.cells().count(), 25);
    }

    #[test]
    fn new_rejects_bad_dimensions_and_out_of_range_data() {
        assert_eq!(
            LevelConfig::new(0, 5, [], []),
            Err(LevelError::InvalidDimensions { rows: 0, cols: 5 })
        );
        assert_eq!(
            LevelConfig::new(3, 3, [c(3, 0)], []),
            Err(LevelError::OutOfBounds(c(3, 0)))
        );
        let rule = Rule::sequence([c(0, 0), c(0, 3)], 1).unwrap();
        assert_eq!(
            LevelConfig::new(3, 3, [], [rule]),
            Err(LevelError::OutOfBounds(c(0, 3)))
        );
    }

    #[test]
    fn rows_bound_r_and_cols_bound_q() {
        assert!(LevelConfig::new(2, 4, [c(3, 1)], []).is_ok());
        assert!(LevelConfig::new(2, 4, [c(1, 3)], []).is_err());
    }

    #[test]
    fn with_mines_returns_new_snapshot() {
        let level = LevelConfig::new(4, 4, [c(0, 0)], []).unwrap();
        let next = level.with_mines([c(1, 1), c(2, 2)]).unwrap();
        assert_eq!(level.mine_list(), vec![c(0, 0)]);
        assert_eq!(next.mine_list(), vec![c(1, 1), c(2, 2)]);
        assert!(level.with_mines([c(4, 0)]).is_err());
    }

    #[test]
    fn with_rules_validates_bounds() {
        let level = LevelConfig::default();
        let ok = Rule::edge(c(4, 4), 2).unwrap();
        let bad = Rule::edge(c(5, 0), 2).unwrap();
        assert_eq!(level.with_rules([ok.clone()]).unwrap().rules(), &[ok]);
        assert_eq!(level.with_rules([bad]), Err(LevelError::OutOfBounds(c(5, 0))));
    }

    #[test]
    fn returned_copies_do_not_alias_the_level() {
        let level = LevelConfig::new(3, 3, [c(1, 1)], []).unwrap();
        let mut mines = level.mine_list();
        mines.push(c(9, 9));
        let mut rules = level.rule_list();
        rules.push(Rule::edge(c(9, 9), 0).unwrap());
        assert_eq!(level.mine_count(), 1);
        assert!(level.rules().is_empty());
    }

    #[test]
    fn pruning_drops_whole_rules() {
        let level = LevelConfig::new(
            5,
            5,
            [c(4, 4), c(1, 1)],
            [
                Rule::edge(c(4, 4), 2).unwrap(),
                Rule::group([c(0, 0), c(3, 0)], 1).unwrap(),
                Rule::sequence([c(0, 0), c(1, 0)], 1).unwrap(),
            ],
        )
        .unwrap();

        let pruned = level.pruned_to(GridSize::new(3, 3).unwrap());

        assert_eq!(pruned.mine_list(), vec![c(1, 1)]);
        assert_eq!(pruned.rules(), &[Rule::sequence([c(0, 0), c(1, 0)], 1).unwrap()]);
        assert!(level.with_size(GridSize::new(3, 3).unwrap()).is_err());
    }

    #[test]
    fn pruning_drops_rule_when_only_its_last_cell_falls_off() {
        let sequence = Rule::sequence([c(0, 0), c(1, 0), c(2, 0), c(3, 0)], 2).unwrap();
        let group = Rule::group([c(0, 1), c(1, 1), c(3, 1)], 3).unwrap();
        let level = LevelConfig::new(4, 4, [], [sequence.clone(), group]).unwrap();

        let pruned = level.pruned_to(GridSize::new(4, 3).unwrap());
        assert!(pruned.rules().is_empty());

        let kept = level.pruned_to(GridSize::new(2, 4).unwrap());
        assert_eq!(kept.rules().len(), 2);
        assert_eq!(kept.rules()[0], sequence);
    }

    #[test]
    fn single_cell_grid_holds_a_full_level() {
        let cell = c(0, 0);
        let level = LevelConfig::new(
            1,
            1,
            [cell],
            [
                Rule::edge(cell, 0).unwrap(),
                Rule::sequence([cell, cell, cell], 3).unwrap(),
                Rule::group([cell, cell], 1).unwrap(),
            ],
        )
        .unwrap();
        assert_eq!(level.cells().collect::<Vec<_>>(), vec![cell]);
        assert_eq!(level.adjacent_mine_count(cell), Ok(0));
        assert!(level.toggled_mine(c(1, 0)).is_err());
        assert!(Rule::group([cell, cell], 2).is_err());
    }

    #[test]
    fn toggled_mine_flips_membership() {
        let level = LevelConfig::default();
        let on = level.toggled_mine(c(2, 3)).unwrap();
        assert!(on.is_mine(c(2, 3)));
        let off = on.toggled_mine(c(2, 3)).unwrap();
        assert!(!off.is_mine(c(2, 3)));
        assert_eq!(level.toggled_mine(c(5, 0)), Err(LevelError::OutOfBounds(c(5, 0))));
    }

    #[test]
    fn mine_mask_and_adjacent_counts() {
        let level = LevelConfig::new(3, 4, [c(1, 0), c(3, 2)], []).unwrap();
        let mask = level.mine_mask();
        assert_eq!(mask.dim(), (4, 3));
        assert!(mask[(1, 0)]);
        assert!(mask[(3, 2)]);
        assert_eq!(mask.iter().filter(|&&m| m).count(), 2);

        assert_eq!(level.adjacent_mine_count(c(0, 0)), Ok(1));
        assert_eq!(level.adjacent_mine_count(c(2, 2)), Ok(1));
        assert_eq!(level.adjacent_mine_count(c(0, 2)), Ok(0));
    }

    #[test]
    fn json_round_trip_and_validation() {
        let level = LevelConfig::new(
            3,
            3,
            [c(0, 1)],
            [Rule::group([c(0, 0), c(1, 0)], 1).unwrap()],
        )
        .unwrap();
        let json = serde_json::to_string(&level).unwrap();
        let back: LevelConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, level);

        let out_of_range = r#"{"size":{"rows":2,"cols":2},"mines":[{"q":5,"r":0}],"rules":[]}"#;
        assert!(serde_json::from_str::<LevelConfig>(out_of_range).is_err());
        let zero_rows = r#"{"size":{"rows":0,"cols":2},"mines":[],"rules":[]}"#;
        assert!(serde_json::from_str::<LevelConfig>(zero_rows).is_err());
        let over_capacity = concat!(
            r#"{"size":{"rows":2,"cols":2},"mines":[],"#,
            r#""rules":[{"Edge":{"cell":{"q":0,"r":0},"expected":9}}]}"#,
        );
        assert!(serde_json::from_str::<LevelConfig>(over_capacity).is_err());
    }
}
