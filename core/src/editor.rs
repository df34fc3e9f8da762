use core::fmt;
use core::str::FromStr;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::*;

/// What a click on a cell does in the editor.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tool {
    #[default]
    Select,
    PlaceMine,
    BuildSequence,
    BuildGroup,
    BuildEdge,
}

impl Tool {
    pub const ALL: [Self; 5] = [
        Self::Select,
        Self::PlaceMine,
        Self::BuildSequence,
        Self::BuildGroup,
        Self::BuildEdge,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Select => "SELECT",
            Self::PlaceMine => "MINE",
            Self::BuildSequence => "SEQUENCE",
            Self::BuildGroup => "GROUP",
            Self::BuildEdge => "EDGE",
        }
    }

    /// Rule type this tool builds, if any.
    pub const fn rule_kind(self) -> Option<RuleKind> {
        match self {
            Self::BuildSequence => Some(RuleKind::Sequence),
            Self::BuildGroup => Some(RuleKind::Group),
            Self::BuildEdge => Some(RuleKind::Edge),
            Self::Select | Self::PlaceMine => None,
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Tool {
    type Err = LevelError;

    fn from_str(name: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|tool| tool.name().eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| LevelError::UnknownTool(name.to_owned()))
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EditOutcome {
    NoChange,
    LevelChanged,
    SelectionChanged,
}

impl EditOutcome {
    pub const fn has_update(self) -> bool {
        !matches!(self, Self::NoChange)
    }
}

/// Owns the level being edited along with the transient interaction state.
///
/// Every mutator validates first and then swaps in a new [`LevelConfig`], so a
/// failed call leaves the session exactly as it was.
#[derive(Clone, Debug, Default)]
pub struct EditorSession {
    level: LevelConfig,
    tool: Tool,
    selection: Vec<HexCoord>,
}

impl EditorSession {
    /// Empty 5x5 level with the select tool.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_level(level: LevelConfig) -> Self {
        Self {
            level,
            ..Self::default()
        }
    }

    pub fn level(&self) -> &LevelConfig {
        &self.level
    }

    pub fn into_level(self) -> LevelConfig {
        self.level
    }

    pub fn current_tool(&self) -> Tool {
        self.tool
    }

    pub fn set_current_tool(&mut self, tool: Tool) {
        if self.tool != tool {
            log::debug!("Tool {} -> {}", self.tool, tool);
        }
        self.tool = tool;
    }

    /// Selected cells in the order they were picked.
    pub fn selected_cells(&self) -> &[HexCoord] {
        &self.selection
    }

    pub fn is_selected(&self, coord: HexCoord) -> bool {
        self.selection.contains(&coord)
    }

    pub fn is_mine(&self, coord: HexCoord) -> bool {
        self.level.is_mine(coord)
    }

    pub fn toggle_mine(&mut self, coord: HexCoord) -> Result<()> {
        self.level = self.level.toggled_mine(coord)?;
        Ok(())
    }

    /// Flips `coord` in the selection; cells outside the grid are ignored.
    pub fn toggle_selected_cell(&mut self, coord: HexCoord) -> EditOutcome {
        if !self.level.size().contains(coord) {
            return EditOutcome::NoChange;
        }
        match self.selection.iter().position(|&cell| cell == coord) {
            Some(index) => {
                self.selection.remove(index);
            }
            None => self.selection.push(coord),
        }
        EditOutcome::SelectionChanged
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn add_rule(&mut self, rule: Rule) -> Result<()> {
        self.level = self.level.with_rule_added(rule)?;
        Ok(())
    }

    /// Resizes the grid, dropping mines, rules and selected cells that no
    /// longer fit. A rule is kept only if all of its cells fit.
    pub fn set_grid_size(&mut self, rows: Axis, cols: Axis) -> Result<()> {
        let size = GridSize::new(rows, cols)?;
        log::debug!("Resizing grid {} -> {}", self.level.size(), size);
        self.level = self.level.pruned_to(size);
        self.selection.retain(|&cell| size.contains(cell));
        Ok(())
    }

    /// Handles a click with the current tool.
    pub fn apply_tool(&mut self, coord: HexCoord) -> Result<EditOutcome> {
        match self.tool {
            Tool::PlaceMine => {
                self.toggle_mine(coord)?;
                Ok(EditOutcome::LevelChanged)
            }
            Tool::Select | Tool::BuildSequence | Tool::BuildGroup | Tool::BuildEdge => {
                Ok(self.toggle_selected_cell(coord))
            }
        }
    }

    /// Builds the rule the current tool describes from the selection.
    pub fn build_rule(&self, expected: MineCount) -> Result<Rule> {
        let kind = self.tool.rule_kind().ok_or(LevelError::NotARuleTool)?;
        if self.selection.is_empty() {
            return Err(LevelError::EmptyRule(kind));
        }
        let size = self.level.size();
        for &cell in &self.selection {
            size.validate_coords(cell)?;
        }

        let cells = self.selection.iter().copied();
        match kind {
            RuleKind::Sequence => Rule::sequence(cells, expected),
            RuleKind::Group => Rule::group(cells, expected),
            RuleKind::Edge => match self.selection.as_slice() {
                &[cell] => Rule::edge(cell, expected),
                cells => Err(LevelError::EdgeSelection(cells.len())),
            },
        }
    }

    /// Adds the rule from [`Self::build_rule`] and clears the selection.
    pub fn commit_rule(&mut self, expected: MineCount) -> Result<Rule> {
        let rule = self.build_rule(expected)?;
        self.add_rule(rule.clone())?;
        self.selection.clear();
        Ok(rule)
    }

    /// Replaces the level and resets the interaction state.
    pub fn replace_level(&mut self, level: LevelConfig) {
        self.level = level;
        self.selection.clear();
        self.tool = Tool::default();
    }

    pub fn load(&mut self, path: impl AsRef<Path>) -> core::result::Result<(), EditorError> {
        let level = load_level(path)?;
        self.replace_level(level);
        Ok(())
    }

    pub fn load_str(&mut self, input: &str) -> core::result::Result<(), EditorError> {
        let level = parse_level(input)?;
        self.replace_level(level);
        Ok(())
    }

    pub fn save(&self, path: impl AsRef<Path>) -> core::result::Result<(), EditorError> {
        save_level(&self.level, path)?;
        Ok(())
    }

    pub fn to_level_string(&self) -> String {
        write_level(&self.level)
    }
}
