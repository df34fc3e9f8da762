//! Pixel <-> grid mapping for a flat-top axial hex layout.
//!
//! Renderers and pointer handlers live outside this crate; they only need
//! [`HexLayout::to_pixel_center`] to place cells and [`HexLayout::to_axial`] to
//! resolve a click back to a cell.

use serde::{Deserialize, Serialize};

use crate::*;

const SQRT_3: f64 = 1.732_050_807_568_877_2;

/// Pixel point `(x, y)`.
pub type Point = (f64, f64);

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LayoutFields")]
pub struct HexLayout {
    radius: f64,
    origin: Point,
}

impl HexLayout {
    pub const DEFAULT_RADIUS: f64 = 30.0;

    /// Layout with `origin` at the center of cell `(0, 0)`.
    pub fn new(radius: f64, origin: Point) -> Result<Self> {
        if !(radius.is_finite() && radius > 0.0) {
            return Err(LevelError::InvalidRadius);
        }
        Ok(Self { radius, origin })
    }

    /// Layout padded by one radius so the first column and row are fully visible.
    pub fn with_radius(radius: f64) -> Result<Self> {
        Self::new(radius, (radius, radius))
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn origin(&self) -> Point {
        self.origin
    }

    pub fn to_pixel_center(&self, coord: HexCoord) -> Point {
        let q = f64::from(coord.q);
        let r = f64::from(coord.r);
        let x = self.radius * (1.5 * q);
        let y = self.radius * (SQRT_3 * (r + q / 2.0));
        (x + self.origin.0, y + self.origin.1)
    }

    /// Cell containing `point`, or `None` when it lands outside `size`.
    pub fn to_axial(&self, point: Point, size: GridSize) -> Option<HexCoord> {
        let x = point.0 - self.origin.0;
        let y = point.1 - self.origin.1;

        let q = (2.0 / 3.0 * x) / self.radius;
        let r = (-x / 3.0 + SQRT_3 / 3.0 * y) / self.radius;
        let coord = cube_round(q, r)?;

        size.contains(coord).then_some(coord)
    }

    /// Polygon corners at 60 degree steps, starting east of the center.
    pub fn hex_corners(&self, coord: HexCoord) -> [Point; 6] {
        let (cx, cy) = self.to_pixel_center(coord);
        core::array::from_fn(|i| {
            let angle = (60.0 * i as f64).to_radians();
            (
                cx + self.radius * angle.cos(),
                cy + self.radius * angle.sin(),
            )
        })
    }

    /// Drawing surface that fits a grid of `size` cells.
    pub fn canvas_size(&self, size: GridSize) -> Point {
        let width = f64::from(size.cols()) * self.radius * 1.5 + self.radius;
        let height = f64::from(size.rows()) * self.radius * SQRT_3 + self.radius;
        (width, height)
    }
}

impl Default for HexLayout {
    fn default() -> Self {
        let radius = Self::DEFAULT_RADIUS;
        Self {
            radius,
            origin: (radius, radius),
        }
    }
}

#[derive(Deserialize)]
struct LayoutFields {
    radius: f64,
    origin: Point,
}

impl TryFrom<LayoutFields> for HexLayout {
    type Error = LevelError;

    fn try_from(fields: LayoutFields) -> Result<Self> {
        Self::new(fields.radius, fields.origin)
    }
}

/// Snaps fractional axial coordinates to the nearest cell.
///
/// Each cube component is rounded on its own, then the one with the largest
/// rounding error is rebuilt from the other two so `q + r + s == 0` holds.
fn cube_round(q: f64, r: f64) -> Option<HexCoord> {
    let s = -q - r;
    let mut rq = q.round();
    let mut rr = r.round();
    let rs = s.round();

    let q_diff = (rq - q).abs();
    let r_diff = (rr - r).abs();
    let s_diff = (rs - s).abs();

    if q_diff > r_diff && q_diff > s_diff {
        rq = -rr - rs;
    } else if r_diff > s_diff {
        rr = -rq - rs;
    }

    Some(HexCoord::new(to_axis(rq)?, to_axis(rr)?))
}

fn to_axis(value: f64) -> Option<Axis> {
    (value.is_finite() && value >= f64::from(Axis::MIN) && value <= f64::from(Axis::MAX))
        .then_some(value as Axis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_center_round_trips_on_large_grid() {
        let layout = HexLayout::default();
        let size = GridSize::new(50, 50).unwrap();
        for q in 0..50 {
            for r in 0..50 {
                let coord = HexCoord::new(q, r);
                let center = layout.to_pixel_center(coord);
                assert_eq!(layout.to_axial(center, size), Some(coord));
            }
        }
    }

    #[test]
    fn round_trips_with_custom_origin_and_radius() {
        let layout = HexLayout::new(7.5, (-20.0, 100.0)).unwrap();
        let size = GridSize::new(12, 9).unwrap();
        for coord in size.cells() {
            assert_eq!(layout.to_axial(layout.to_pixel_center(coord), size), Some(coord));
        }
    }

    #[test]
    fn points_near_center_snap_to_cell() {
        let layout = HexLayout::default();
        let size = GridSize::new(5, 5).unwrap();
        let coord = HexCoord::new(2, 3);
        let (x, y) = layout.to_pixel_center(coord);
        let nudge = layout.radius() * 0.4;
        for point in [(x + nudge, y), (x - nudge, y), (x, y + nudge), (x, y - nudge)] {
            assert_eq!(layout.to_axial(point, size), Some(coord));
        }
    }

    #[test]
    fn first_cell_center_sits_at_padding_offset() {
        let layout = HexLayout::default();
        assert_eq!(layout.to_pixel_center(HexCoord::new(0, 0)), (30.0, 30.0));
    }

    #[test]
    fn points_outside_grid_have_no_cell() {
        let layout = HexLayout::default();
        let size = GridSize::new(3, 3).unwrap();
        assert_eq!(layout.to_axial((-200.0, -200.0), size), None);
        let beyond = layout.to_pixel_center(HexCoord::new(3, 0));
        assert_eq!(layout.to_axial(beyond, size), None);
        assert_eq!(layout.to_axial((f64::NAN, 0.0), size), None);
    }

    #[test]
    fn corners_are_one_radius_from_center() {
        let layout = HexLayout::default();
        let coord = HexCoord::new(1, 1);
        let (cx, cy) = layout.to_pixel_center(coord);
        for (x, y) in layout.hex_corners(coord) {
            let dist = ((x - cx).powi(2) + (y - cy).powi(2)).sqrt();
            assert!((dist - layout.radius()).abs() < 1e-9);
        }
    }

    #[test]
    fn rejects_non_positive_radius() {
        for radius in [0.0, -3.0, f64::NAN, f64::INFINITY] {
            assert_eq!(HexLayout::new(radius, (0.0, 0.0)), Err(LevelError::InvalidRadius));
        }
        assert_eq!(HexLayout::with_radius(12.0).unwrap().origin(), (12.0, 12.0));
    }

    #[test]
    fn deserialize_validates_radius() {
        let layout: HexLayout =
            serde_json::from_str(r#"{"radius":10.0,"origin":[10.0,10.0]}"#).unwrap();
        assert_eq!(layout, HexLayout::with_radius(10.0).unwrap());
        assert!(serde_json::from_str::<HexLayout>(r#"{"radius":0.0,"origin":[0.0,0.0]}"#).is_err());
    }

    #[test]
    fn canvas_fits_grid() {
        let layout = HexLayout::default();
        let (w, h) = layout.canvas_size(GridSize::new(5, 5).unwrap());
        assert_eq!(w, 5.0 * 30.0 * 1.5 + 30.0);
        assert!((h - (5.0 * 30.0 * SQRT_3 + 30.0)).abs() < 1e-9);
    }
}
