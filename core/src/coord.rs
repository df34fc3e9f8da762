use core::fmt;
use core::ops::{Add, Sub};
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::*;

/// Single coordinate axis, also used for grid width and height.
pub type Axis = i32;

/// Axial position `(q, r)` of one cell. The implicit third cube axis is `s = -q - r`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HexCoord {
    pub q: Axis,
    pub r: Axis,
}

impl HexCoord {
    /// The six axial neighbor directions.
    pub const NEIGHBOR_DIRECTIONS: [Self; 6] = [
        Self::new(1, 0),
        Self::new(1, -1),
        Self::new(0, -1),
        Self::new(-1, 0),
        Self::new(-1, 1),
        Self::new(0, 1),
    ];

    pub const fn new(q: Axis, r: Axis) -> Self {
        Self { q, r }
    }

    pub const fn s(self) -> Axis {
        -self.q - self.r
    }

    /// Number of steps between two cells.
    ///
    /// The `s` difference needs a wider type: it can reach twice the `Axis` range.
    pub fn distance(self, other: Self) -> u64 {
        let dq = u64::from(self.q.abs_diff(other.q));
        let dr = u64::from(self.r.abs_diff(other.r));
        let sum = |c: Self| i64::from(c.q) + i64::from(c.r);
        let ds = (sum(self) - sum(other)).unsigned_abs();
        dq.max(dr).max(ds)
    }

    /// All six neighbors, regardless of any grid bounds.
    pub fn neighbors(self) -> [Self; 6] {
        Self::NEIGHBOR_DIRECTIONS.map(|d| self + d)
    }
}

impl Add for HexCoord {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.q + rhs.q, self.r + rhs.r)
    }
}

impl Sub for HexCoord {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.q - rhs.q, self.r - rhs.r)
    }
}

impl From<(Axis, Axis)> for HexCoord {
    fn from((q, r): (Axis, Axis)) -> Self {
        Self::new(q, r)
    }
}

/// Same `q,r` form the level files use.
impl fmt::Display for HexCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.q, self.r)
    }
}

impl FromStr for HexCoord {
    type Err = FormatError;

    /// A token that is not two integers around one comma is a
    /// `BadCoordinate`; a well-shaped number that does not fit an [`Axis`] is a
    /// `BadInteger`, the same as anywhere else in a level file.
    fn from_str(token: &str) -> core::result::Result<Self, Self::Err> {
        let bad = || FormatError::BadCoordinate(token.to_owned());
        let (q, r) = token.split_once(',').ok_or_else(bad)?;
        if !is_plain_int(q) || !is_plain_int(r) {
            return Err(bad());
        }
        let axis = |part: &str| -> core::result::Result<Axis, FormatError> {
            part.parse().map_err(|source| FormatError::BadInteger {
                token: part.to_owned(),
                source,
            })
        };
        Ok(Self::new(axis(q)?, axis(r)?))
    }
}

/// Optional sign followed by ASCII digits, the grammar `i32::from_str` accepts.
fn is_plain_int(s: &str) -> bool {
    let digits = s.strip_prefix(['-', '+']).unwrap_or(s);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Positive grid bounds. A cell fits when `0 <= q < cols` and `0 <= r < rows`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "GridFields")]
pub struct GridSize {
    rows: Axis,
    cols: Axis,
}

impl GridSize {
    pub const DEFAULT: Self = Self { rows: 5, cols: 5 };

    pub const fn new(rows: Axis, cols: Axis) -> Result<Self> {
        if rows <= 0 || cols <= 0 {
            return Err(LevelError::InvalidDimensions { rows, cols });
        }
        Ok(Self { rows, cols })
    }

    pub const fn rows(self) -> Axis {
        self.rows
    }

    pub const fn cols(self) -> Axis {
        self.cols
    }

    pub const fn total_cells(self) -> usize {
        self.rows as usize * self.cols as usize
    }

    pub const fn contains(self, coord: HexCoord) -> bool {
        coord.q >= 0 && coord.q < self.cols && coord.r >= 0 && coord.r < self.rows
    }

    pub fn validate_coords(self, coord: HexCoord) -> Result<HexCoord> {
        if self.contains(coord) {
            Ok(coord)
        } else {
            Err(LevelError::OutOfBounds(coord))
        }
    }

    /// Every cell, row by row.
    pub fn cells(self) -> impl Iterator<Item = HexCoord> {
        (0..self.rows).flat_map(move |r| (0..self.cols).map(move |q| HexCoord::new(q, r)))
    }

    pub fn iter_neighbors(self, center: HexCoord) -> NeighborIter {
        NeighborIter::new(center, self)
    }
}

impl Default for GridSize {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for GridSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.rows, self.cols)
    }
}

#[derive(Deserialize)]
struct GridFields {
    rows: Axis,
    cols: Axis,
}

impl TryFrom<GridFields> for GridSize {
    type Error = LevelError;

    fn try_from(fields: GridFields) -> Result<Self> {
        Self::new(fields.rows, fields.cols)
    }
}

/// In-bounds hex neighbors of a cell.
#[derive(Debug)]
pub struct NeighborIter {
    center: HexCoord,
    bounds: GridSize,
    index: u8,
}

impl NeighborIter {
    fn new(center: HexCoord, bounds: GridSize) -> Self {
        Self {
            center,
            bounds,
            index: 0,
        }
    }
}

impl Iterator for NeighborIter {
    type Item = HexCoord;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let delta = *HexCoord::NEIGHBOR_DIRECTIONS.get(usize::from(self.index))?;
            self.index += 1;

            let next_item = self.center + delta;
            if self.bounds.contains(next_item) {
                return Some(next_item);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neighbors_are_at_distance_one() {
        let center = HexCoord::new(3, -2);
        for n in center.neighbors() {
            assert_eq!(center.distance(n), 1);
        }
        assert_eq!(center.distance(center), 0);
        assert_eq!(HexCoord::new(0, 0).distance(HexCoord::new(2, -1)), 2);
    }

    #[test]
    fn distance_spans_the_whole_axis_range() {
        let min = HexCoord::new(Axis::MIN, 0);
        let max = HexCoord::new(Axis::MAX, 0);
        assert_eq!(min.distance(max), u64::from(u32::MAX));
        assert_eq!(max.distance(min), u64::from(u32::MAX));

        let a = HexCoord::new(Axis::MIN, Axis::MIN);
        let b = HexCoord::new(Axis::MAX, Axis::MAX);
        assert_eq!(a.distance(b), 2 * u64::from(u32::MAX));
    }

    #[test]
    fn corner_neighbors_are_clipped_to_grid() {
        let size = GridSize::new(5, 5).unwrap();
        let corner: Vec<_> = size.iter_neighbors(HexCoord::new(0, 0)).collect();
        assert_eq!(corner, vec![HexCoord::new(1, 0), HexCoord::new(0, 1)]);
        assert_eq!(size.iter_neighbors(HexCoord::new(2, 2)).count(), 6);
    }

    #[test]
    fn grid_size_rejects_non_positive() {
        assert_eq!(
            GridSize::new(0, 3),
            Err(LevelError::InvalidDimensions { rows: 0, cols: 3 })
        );
        assert!(GridSize::new(3, -1).is_err());
        assert!(GridSize::new(1, 1).is_ok());
    }

    #[test]
    fn contains_checks_both_axes() {
        let size = GridSize::new(2, 3).unwrap();
        assert!(size.contains(HexCoord::new(2, 1)));
        assert!(!size.contains(HexCoord::new(3, 0)));
        assert!(!size.contains(HexCoord::new(0, 2)));
        assert!(!size.contains(HexCoord::new(-1, 0)));
    }

    #[test]
    fn cells_are_row_major() {
        let size = GridSize::new(2, 2).unwrap();
        let cells: Vec<_> = size.cells().collect();
        assert_eq!(
            cells,
            vec![
                HexCoord::new(0, 0),
                HexCoord::new(1, 0),
                HexCoord::new(0, 1),
                HexCoord::new(1, 1),
            ]
        );
    }

    #[test]
    fn parses_coordinate_tokens() {
        assert_eq!("4,7".parse::<HexCoord>(), Ok(HexCoord::new(4, 7)));
        assert_eq!("-1,0".parse::<HexCoord>(), Ok(HexCoord::new(-1, 0)));
        assert_eq!("+1,-2".parse::<HexCoord>(), Ok(HexCoord::new(1, -2)));
        for bad in ["4", "4,", ",4", "4, 7", " 4,7", "a,b", "1,2,3", "+,2", "--1,2"] {
            assert!(
                matches!(bad.parse::<HexCoord>(), Err(FormatError::BadCoordinate(_))),
                "{bad:?} should be rejected"
            );
        }
        assert_eq!(HexCoord::new(4, 7).to_string(), "4,7");
    }

    #[test]
    fn overflowing_coordinate_is_a_number_error() {
        let err = "99999999999,0".parse::<HexCoord>().unwrap_err();
        assert!(err.is_number_error(), "{err:?}");
        assert!(matches!(err, FormatError::BadInteger { ref token, .. } if token == "99999999999"));

        let err = "0,-99999999999".parse::<HexCoord>().unwrap_err();
        assert!(err.is_number_error());
    }
}
