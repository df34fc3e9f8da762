use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use hexcells_core::{Axis, GridSize, HexCoord, MineCount, Tool};

#[derive(Parser, Debug)]
#[command(name = "hexcells", version, about = "Create, inspect and edit hexcells level files")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write an empty level.
    New(NewArgs),

    /// Parse a level file and report the first problem, if any.
    Check {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Print a summary and a map of a level.
    Show(ShowArgs),

    /// Change the grid size, dropping whatever no longer fits.
    Resize(ResizeArgs),

    /// Place or remove mines.
    ToggleMine(ToggleMineArgs),

    /// Append a rule built from a list of cells.
    AddRule(AddRuleArgs),
}

#[derive(Args, Debug)]
pub struct NewArgs {
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    #[arg(long, default_value_t = GridSize::DEFAULT.rows())]
    pub rows: Axis,

    #[arg(long, default_value_t = GridSize::DEFAULT.cols())]
    pub cols: Axis,

    /// Overwrite FILE if it already exists.
    #[arg(long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Dump the level as JSON instead.
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ResizeArgs {
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    #[arg(long)]
    pub rows: Axis,

    #[arg(long)]
    pub cols: Axis,

    /// Write the result here instead of back to FILE.
    #[arg(short, long, value_name = "OUT")]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ToggleMineArgs {
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Cells as q,r.
    #[arg(value_name = "CELL", required = true)]
    pub cells: Vec<HexCoord>,
}

#[derive(Args, Debug)]
pub struct AddRuleArgs {
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    #[arg(value_enum)]
    pub kind: RuleKindArg,

    /// Number of mines the rule expects.
    #[arg(allow_negative_numbers = true)]
    pub expected: MineCount,

    /// Cells as q,r, in order for sequences.
    #[arg(value_name = "CELL", required = true)]
    pub cells: Vec<HexCoord>,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum RuleKindArg {
    Sequence,
    Group,
    Edge,
}

impl From<RuleKindArg> for Tool {
    fn from(kind: RuleKindArg) -> Self {
        match kind {
            RuleKindArg::Sequence => Tool::BuildSequence,
            RuleKindArg::Group => Tool::BuildGroup,
            RuleKindArg::Edge => Tool::BuildEdge,
        }
    }
}
