//! Line-oriented level file format.
//!
//! ```text
//! ROWS <rows>
//! COLS <cols>
//! MINES <count>
//! q,r                                    (count lines)
//! RULES <count>
//! SEQUENCE <expected> <cells> q,r q,r ... (count lines, any rule type)
//! GROUP <expected> <cells> q,r q,r ...
//! EDGE <expected> q,r
//! ```
//!
//! Parsing stops at the first bad line and reports it 1-based. Rule lines are
//! split on runs of whitespace. Coordinates are `q,r` tokens; rule lines that
//! spell them as two separate integers (`EDGE 2 4 4`) are read as well, but
//! writing always produces the `q,r` form.

use core::fmt;
use core::str::{FromStr, Lines};
use std::collections::BTreeSet;
use std::path::Path;

use crate::*;

type LineResult<T> = core::result::Result<T, FormatError>;

pub fn parse_level(input: &str) -> core::result::Result<LevelConfig, CodecError> {
    let mut cursor = LineCursor::new(input);

    let rows = cursor.read("ROWS line", |line| parse_header(line, "ROWS"))?;
    let rows_line = cursor.line;
    let cols = cursor.read("COLS line", |line| parse_header(line, "COLS"))?;
    let size = GridSize::new(rows, cols).map_err(|err| {
        let line = if rows <= 0 { rows_line } else { cursor.line };
        format_error_at(line, err.into())
    })?;
    log::trace!("Level grid is {size}");

    let mine_count = cursor.read("MINES line", |line| parse_count(line, "MINES"))?;
    let mut mines = BTreeSet::new();
    for _ in 0..mine_count {
        let mine = cursor.read("mine coordinates", |line| parse_mine(line, size))?;
        if !mines.insert(mine) {
            log::warn!("Duplicate mine {mine} on line {}", cursor.line);
        }
    }
    log::trace!("Read {} mines", mines.len());

    let rule_count = cursor.read("RULES line", |line| parse_count(line, "RULES"))?;
    let mut rules = Vec::new();
    for _ in 0..rule_count {
        rules.push(cursor.read("rule line", |line| parse_rule(line, size))?);
    }
    log::trace!("Read {} rules", rules.len());

    cursor.expect_end()?;

    // every cell was bounds-checked while parsing its line
    LevelConfig::from_parts(size, mines, rules)
        .map_err(|err| format_error_at(cursor.line, err.into()))
}

/// Level file text for `level`, the exact inverse of [`parse_level`].
pub fn write_level(level: &LevelConfig) -> String {
    level.to_string()
}

pub fn load_level(path: impl AsRef<Path>) -> core::result::Result<LevelConfig, CodecError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| CodecError::Io {
        path: path.to_owned(),
        source,
    })?;
    let level = parse_level(&text)?;
    log::debug!(
        "Loaded {} level with {} mines and {} rules from {}",
        level.size(),
        level.mine_count(),
        level.rules().len(),
        path.display()
    );
    Ok(level)
}

/// Writes the whole file in one call. A failed write may leave a partial file
/// behind, which will not parse back.
pub fn save_level(
    level: &LevelConfig,
    path: impl AsRef<Path>,
) -> core::result::Result<(), CodecError> {
    let path = path.as_ref();
    std::fs::write(path, write_level(level)).map_err(|source| CodecError::Io {
        path: path.to_owned(),
        source,
    })?;
    log::debug!("Saved {} level to {}", level.size(), path.display());
    Ok(())
}

/// Parses one rule line against the grid it belongs to.
pub fn parse_rule(line: &str, size: GridSize) -> LineResult<Rule> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let Some((&keyword, args)) = tokens.split_first() else {
        return Err(FormatError::ExpectedKeyword {
            expected: "SEQUENCE, GROUP or EDGE",
            found: String::new(),
        });
    };
    let kind = RuleKind::from_keyword(keyword)
        .ok_or_else(|| FormatError::UnknownRule(keyword.to_owned()))?;
    let malformed = || FormatError::MalformedRule {
        kind,
        line: line.trim().to_owned(),
    };

    let rule = match kind {
        RuleKind::Sequence | RuleKind::Group => {
            let [expected, declared, cells @ ..] = args else {
                return Err(malformed());
            };
            let expected = parse_int(expected)?;
            let declared = parse_int(declared)?;
            let cells = parse_cells(kind, declared, cells).ok_or_else(malformed)??;
            for &cell in &cells {
                size.validate_coords(cell)?;
            }
            if kind == RuleKind::Sequence {
                Rule::sequence(cells, expected)?
            } else {
                Rule::group(cells, expected)?
            }
        }
        RuleKind::Edge => {
            let (expected, cell) = match args {
                [expected, cell] => (parse_int(expected)?, cell.parse::<HexCoord>()?),
                [expected, q, r] if !q.contains(',') && !r.contains(',') => {
                    (parse_int(expected)?, parse_split_coord(q, r)?)
                }
                _ => return Err(malformed()),
            };
            size.validate_coords(cell)?;
            Rule::edge(cell, expected)?
        }
    };
    Ok(rule)
}

fn parse_header(line: &str, keyword: &'static str) -> LineResult<i32> {
    let mut tokens = line.split_whitespace();
    let found = tokens.next().unwrap_or_default();
    if found != keyword {
        return Err(FormatError::ExpectedKeyword {
            expected: keyword,
            found: found.to_owned(),
        });
    }
    match (tokens.next(), tokens.next()) {
        (Some(value), None) => parse_int(value),
        _ => Err(FormatError::MalformedHeader {
            keyword,
            line: line.trim().to_owned(),
        }),
    }
}

fn parse_count(line: &str, keyword: &'static str) -> LineResult<usize> {
    let count = parse_header(line, keyword)?;
    usize::try_from(count).map_err(|_| FormatError::NegativeCount { keyword, count })
}

fn parse_mine(line: &str, size: GridSize) -> LineResult<HexCoord> {
    let mine = line.trim().parse::<HexCoord>()?;
    Ok(size.validate_coords(mine)?)
}

fn parse_int(token: &str) -> LineResult<i32> {
    token.parse().map_err(|source| FormatError::BadInteger {
        token: token.to_owned(),
        source,
    })
}

fn parse_split_coord(q: &str, r: &str) -> LineResult<HexCoord> {
    Ok(HexCoord::new(parse_int(q)?, parse_int(r)?))
}

/// Reads the cell list of a Sequence/Group line, in either token layout.
///
/// Returns `None` when the split layout leaves a dangling integer.
fn parse_cells(
    kind: RuleKind,
    declared: i32,
    tokens: &[&str],
) -> Option<LineResult<Vec<HexCoord>>> {
    let split_layout = !tokens.is_empty() && tokens.iter().all(|token| !token.contains(','));
    let actual = if split_layout {
        tokens.len() / 2
    } else {
        tokens.len()
    };
    if usize::try_from(declared).is_ok_and(|declared| declared != actual) || declared < 0 {
        return Some(Err(FormatError::CountMismatch {
            kind,
            declared,
            actual,
        }));
    }
    if split_layout && tokens.len() % 2 != 0 {
        return None;
    }

    let cells = if split_layout {
        tokens
            .chunks_exact(2)
            .map(|pair| parse_split_coord(pair[0], pair[1]))
            .collect()
    } else {
        tokens.iter().map(|token| token.parse()).collect()
    };
    Some(cells)
}

fn format_error_at(line: usize, source: FormatError) -> CodecError {
    CodecError::Format { line, source }
}

/// Walks the input line by line, remembering the 1-based number of the last
/// line handed out.
struct LineCursor<'a> {
    lines: Lines<'a>,
    line: usize,
}

impl<'a> LineCursor<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            lines: input.lines(),
            line: 0,
        }
    }

    /// Feeds the next line to `parse`, tagging any failure with its number.
    fn read<T>(
        &mut self,
        what: &'static str,
        parse: impl FnOnce(&'a str) -> LineResult<T>,
    ) -> core::result::Result<T, CodecError> {
        self.line += 1;
        let line = self
            .lines
            .next()
            .ok_or_else(|| format_error_at(self.line, FormatError::UnexpectedEof(what)))?;
        parse(line).map_err(|source| format_error_at(self.line, source))
    }

    /// Only blank lines may follow the last rule.
    fn expect_end(&mut self) -> core::result::Result<(), CodecError> {
        for line in self.lines.by_ref() {
            self.line += 1;
            if !line.trim().is_empty() {
                let source = FormatError::TrailingContent(line.trim().to_owned());
                return Err(format_error_at(self.line, source));
            }
        }
        Ok(())
    }
}

impl FromStr for LevelConfig {
    type Err = CodecError;

    fn from_str(input: &str) -> core::result::Result<Self, Self::Err> {
        parse_level(input)
    }
}

/// A single rule line, without the trailing newline.
impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind().keyword(), self.expected())?;
        match self {
            Self::Sequence(rule) => write_cells(f, rule.cells()),
            Self::Group(rule) => write_cells(f, rule.cells()),
            Self::Edge(rule) => write!(f, " {}", rule.cell()),
        }
    }
}

fn write_cells<'a>(
    f: &mut fmt::Formatter<'_>,
    cells: impl IntoIterator<Item = &'a HexCoord, IntoIter: ExactSizeIterator>,
) -> fmt::Result {
    let cells = cells.into_iter();
    write!(f, " {}", cells.len())?;
    for cell in cells {
        write!(f, " {cell}")?;
    }
    Ok(())
}

/// The complete level file text.
impl fmt::Display for LevelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ROWS {}", self.rows())?;
        writeln!(f, "COLS {}", self.cols())?;
        writeln!(f, "MINES {}", self.mine_count())?;
        for mine in self.mines() {
            writeln!(f, "{mine}")?;
        }
        writeln!(f, "RULES {}", self.rules().len())?;
        for rule in self.rules() {
            writeln!(f, "{rule}")?;
        }
        Ok(())
    }
}
