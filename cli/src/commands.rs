use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result, bail};
use hexcells_core::{
    EditorSession, GridSize, HexCoord, LevelConfig, Rule, RuleKind, Tool, load_level, save_level,
};

use crate::cli::{AddRuleArgs, NewArgs, ResizeArgs, ShowArgs, ToggleMineArgs};

pub fn run_new(args: &NewArgs) -> Result<()> {
    if args.file.exists() && !args.force {
        bail!("{} already exists, pass --force to overwrite it", args.file.display());
    }
    let size = GridSize::new(args.rows, args.cols)?;
    let level = LevelConfig::empty(size);
    save_level(&level, &args.file).context("Could not create level")?;
    log::info!("Created {} level at {}", size, args.file.display());
    Ok(())
}

pub fn run_check(file: &Path) -> Result<()> {
    let level = load_level(file).context("Level is invalid")?;
    println!("{}: ok, {}", file.display(), summary(&level));
    Ok(())
}

pub fn run_show(args: &ShowArgs) -> Result<()> {
    let level = load_level(&args.file).context("Could not show level")?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&level)?);
    } else {
        println!("{}", summary(&level));
        print!("{}", render_map(&level));
    }
    Ok(())
}

pub fn run_resize(args: &ResizeArgs) -> Result<()> {
    let mut session = open_session(&args.file)?;
    let mines_before = session.level().mine_count();
    let rules_before = session.level().rules().len();
    session.set_grid_size(args.rows, args.cols)?;

    let level = session.level();
    let dropped_mines = mines_before - level.mine_count();
    let dropped_rules = rules_before - level.rules().len();
    let output = args.output.as_deref().unwrap_or(&args.file);
    session.save(output).context("Could not save resized level")?;
    println!(
        "Resized to {}, dropped {dropped_mines} mines and {dropped_rules} rules",
        level.size()
    );
    Ok(())
}

pub fn run_toggle_mine(args: &ToggleMineArgs) -> Result<()> {
    let mut session = open_session(&args.file)?;
    for &cell in &args.cells {
        session
            .toggle_mine(cell)
            .with_context(|| format!("Could not toggle mine at {cell}"))?;
        log::debug!("Mine at {cell}: {}", session.is_mine(cell));
    }
    session.save(&args.file).context("Could not save level")?;
    println!("{}", summary(session.level()));
    Ok(())
}

pub fn run_add_rule(args: &AddRuleArgs) -> Result<()> {
    let mut session = open_session(&args.file)?;
    let rule = select_and_commit(&mut session, args)?;
    session.save(&args.file).context("Could not save level")?;
    println!("Added {rule}");
    Ok(())
}

fn open_session(file: &Path) -> Result<EditorSession> {
    let mut session = EditorSession::new();
    session.load(file).context("Could not open level")?;
    Ok(session)
}

/// Selects the listed cells with the rule's tool and commits the rule.
///
/// Selection silently ignores cells outside the grid, so they are rejected
/// up front. A cell listed twice is selected once.
fn select_and_commit(session: &mut EditorSession, args: &AddRuleArgs) -> Result<Rule> {
    let size = session.level().size();
    session.set_current_tool(Tool::from(args.kind));
    for &cell in &args.cells {
        size.validate_coords(cell).with_context(|| format!("Could not select cell {cell}"))?;
        if !session.is_selected(cell) {
            session.toggle_selected_cell(cell);
        }
    }
    let rule = session.commit_rule(args.expected).context("Could not build rule")?;
    Ok(rule)
}

fn summary(level: &LevelConfig) -> String {
    let count = |kind| level.rules().iter().filter(|rule| rule.kind() == kind).count();
    format!(
        "{} grid, {} mines, {} rules ({} sequence, {} group, {} edge)",
        level.size(),
        level.mine_count(),
        level.rules().len(),
        count(RuleKind::Sequence),
        count(RuleKind::Group),
        count(RuleKind::Edge),
    )
}

/// One text row per grid row: `*` for a mine, the expected count for an edge
/// rule cell, `.` otherwise.
fn render_map(level: &LevelConfig) -> String {
    let edge_labels: BTreeMap<HexCoord, char> = level
        .rules()
        .iter()
        .filter_map(|rule| match rule {
            Rule::Edge(edge) => {
                let label = u32::try_from(edge.expected())
                    .ok()
                    .and_then(|expected| char::from_digit(expected, 10))?;
                Some((edge.cell(), label))
            }
            Rule::Sequence(_) | Rule::Group(_) => None,
        })
        .collect();

    let mut out = String::new();
    for r in 0..level.rows() {
        let row: Vec<String> = (0..level.cols())
            .map(|q| {
                let cell = HexCoord::new(q, r);
                let glyph = if level.is_mine(cell) {
                    '*'
                } else {
                    edge_labels.get(&cell).copied().unwrap_or('.')
                };
                glyph.to_string()
            })
            .collect();
        let _ = writeln!(out, "{}", row.join(" "));
    }
    out
}
