use core::fmt;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::*;

/// Count type for the mines a rule expects.
pub type MineCount = i32;

/// Largest possible Edge rule value, one per hex neighbor.
pub const EDGE_CAPACITY: usize = HexCoord::NEIGHBOR_DIRECTIONS.len();

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RuleKind {
    Sequence,
    Group,
    Edge,
}

impl RuleKind {
    /// Keyword used in level files.
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Sequence => "SEQUENCE",
            Self::Group => "GROUP",
            Self::Edge => "EDGE",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "SEQUENCE" => Some(Self::Sequence),
            "GROUP" => Some(Self::Group),
            "EDGE" => Some(Self::Edge),
            _ => None,
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Sequence => "Sequence",
            Self::Group => "Group",
            Self::Edge => "Edge",
        };
        f.write_str(name)
    }
}

fn check_expected(kind: RuleKind, expected: MineCount, capacity: usize) -> Result<()> {
    let fits = usize::try_from(expected).is_ok_and(|expected| expected <= capacity);
    if fits {
        Ok(())
    } else {
        Err(LevelError::ExpectedOutOfRange {
            kind,
            expected,
            capacity,
        })
    }
}

/// Exactly `expected` of the cells, taken in order, are mines.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SequenceRuleFields")]
pub struct SequenceRule {
    cells: Vec<HexCoord>,
    expected: MineCount,
}

impl SequenceRule {
    pub fn new(cells: impl IntoIterator<Item = HexCoord>, expected: MineCount) -> Result<Self> {
        let cells: Vec<_> = cells.into_iter().collect();
        if cells.is_empty() {
            return Err(LevelError::EmptyRule(RuleKind::Sequence));
        }
        check_expected(RuleKind::Sequence, expected, cells.len())?;
        Ok(Self { cells, expected })
    }

    pub fn cells(&self) -> &[HexCoord] {
        &self.cells
    }

    pub fn expected(&self) -> MineCount {
        self.expected
    }
}

/// Exactly `expected` of the cells are mines, in any arrangement.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "GroupRuleFields")]
pub struct GroupRule {
    cells: BTreeSet<HexCoord>,
    expected: MineCount,
}

impl GroupRule {
    /// Duplicate cells count once.
    pub fn new(cells: impl IntoIterator<Item = HexCoord>, expected: MineCount) -> Result<Self> {
        let cells: BTreeSet<_> = cells.into_iter().collect();
        if cells.is_empty() {
            return Err(LevelError::EmptyRule(RuleKind::Group));
        }
        check_expected(RuleKind::Group, expected, cells.len())?;
        Ok(Self { cells, expected })
    }

    pub fn cells(&self) -> &BTreeSet<HexCoord> {
        &self.cells
    }

    pub fn expected(&self) -> MineCount {
        self.expected
    }
}

/// Exactly `expected` of the cell's neighbors are mines.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "EdgeRuleFields")]
pub struct EdgeRule {
    cell: HexCoord,
    expected: MineCount,
}

impl EdgeRule {
    pub fn new(cell: HexCoord, expected: MineCount) -> Result<Self> {
        check_expected(RuleKind::Edge, expected, EDGE_CAPACITY)?;
        Ok(Self { cell, expected })
    }

    pub fn cell(&self) -> HexCoord {
        self.cell
    }

    pub fn expected(&self) -> MineCount {
        self.expected
    }
}

#[derive(Deserialize)]
struct SequenceRuleFields {
    cells: Vec<HexCoord>,
    expected: MineCount,
}

impl TryFrom<SequenceRuleFields> for SequenceRule {
    type Error = LevelError;

    fn try_from(fields: SequenceRuleFields) -> Result<Self> {
        Self::new(fields.cells, fields.expected)
    }
}

#[derive(Deserialize)]
struct GroupRuleFields {
    cells: Vec<HexCoord>,
    expected: MineCount,
}

impl TryFrom<GroupRuleFields> for GroupRule {
    type Error = LevelError;

    fn try_from(fields: GroupRuleFields) -> Result<Self> {
        Self::new(fields.cells, fields.expected)
    }
}

#[derive(Deserialize)]
struct EdgeRuleFields {
    cell: HexCoord,
    expected: MineCount,
}

impl TryFrom<EdgeRuleFields> for EdgeRule {
    type Error = LevelError;

    fn try_from(fields: EdgeRuleFields) -> Result<Self> {
        Self::new(fields.cell, fields.expected)
    }
}

/// A mine-count constraint over a set of cells.
///
/// Variants can only be built through their validating constructors, so a
/// `Rule` always has a non-empty cell collection and an `expected` count
/// within its capacity. Whether its cells fit a grid is checked by
/// [`LevelConfig`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rule {
    Sequence(SequenceRule),
    Group(GroupRule),
    Edge(EdgeRule),
}

impl Rule {
    pub fn sequence(
        cells: impl IntoIterator<Item = HexCoord>,
        expected: MineCount,
    ) -> Result<Self> {
        SequenceRule::new(cells, expected).map(Self::Sequence)
    }

    pub fn group(cells: impl IntoIterator<Item = HexCoord>, expected: MineCount) -> Result<Self> {
        GroupRule::new(cells, expected).map(Self::Group)
    }

    pub fn edge(cell: HexCoord, expected: MineCount) -> Result<Self> {
        EdgeRule::new(cell, expected).map(Self::Edge)
    }

    pub const fn kind(&self) -> RuleKind {
        match self {
            Self::Sequence(_) => RuleKind::Sequence,
            Self::Group(_) => RuleKind::Group,
            Self::Edge(_) => RuleKind::Edge,
        }
    }

    pub fn expected(&self) -> MineCount {
        match self {
            Self::Sequence(rule) => rule.expected(),
            Self::Group(rule) => rule.expected(),
            Self::Edge(rule) => rule.expected(),
        }
    }

    /// Largest `expected` value this rule could hold.
    pub fn capacity(&self) -> usize {
        match self {
            Self::Sequence(rule) => rule.cells.len(),
            Self::Group(rule) => rule.cells.len(),
            Self::Edge(_) => EDGE_CAPACITY,
        }
    }

    /// Cells the rule references. For Edge this is the labelled cell itself,
    /// not its neighbors.
    pub fn cells(&self) -> impl Iterator<Item = HexCoord> + '_ {
        let (ordered, grouped, single) = match self {
            Self::Sequence(rule) => (Some(rule.cells.iter()), None, None),
            Self::Group(rule) => (None, Some(rule.cells.iter()), None),
            Self::Edge(rule) => (None, None, Some(rule.cell)),
        };
        ordered
            .into_iter()
            .flatten()
            .chain(grouped.into_iter().flatten())
            .copied()
            .chain(single)
    }

    /// Whether every referenced cell lies inside `size`.
    pub fn fits(&self, size: GridSize) -> bool {
        self.cells().all(|cell| size.contains(cell))
    }

    /// First referenced cell outside `size`, if any.
    pub fn first_out_of_bounds(&self, size: GridSize) -> Option<HexCoord> {
        self.cells().find(|&cell| !size.contains(cell))
    }
}

impl From<SequenceRule> for Rule {
    fn from(rule: SequenceRule) -> Self {
        Self::Sequence(rule)
    }
}

impl From<GroupRule> for Rule {
    fn from(rule: GroupRule) -> Self {
        Self::Group(rule)
    }
}

impl From<EdgeRule> for Rule {
    fn from(rule: EdgeRule) -> Self {
        Self::Edge(rule)
    }
}
