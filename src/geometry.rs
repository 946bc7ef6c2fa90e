//! Point helpers shared by the localizer, rectifier and segmenter.
//!
//! Contours come out of `imageproc` as integer pixel coordinates; corner
//! ordering and rescaling work on `f32` points so pyramid rescaling keeps
//! sub-pixel precision. Projections are built with
//! `imageproc::geometric_transformations`.

use imageproc::geometric_transformations::Projection;
use imageproc::point::Point;
use serde::Serialize;

/// A 2D point with floating-point coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point2f {
    pub x: f32,
    pub y: f32,
}

impl Point2f {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn from_pixel(p: Point<i32>) -> Self {
        Self::new(p.x as f32, p.y as f32)
    }

    /// x + y, smallest at the top-left corner
    pub fn sum(&self) -> f32 {
        self.x + self.y
    }

    /// y - x, smallest at the top-right corner
    pub fn diff(&self) -> f32 {
        self.y - self.x
    }

    pub fn scaled(&self, sx: f32, sy: f32) -> Self {
        Self::new(self.x * sx, self.y * sy)
    }

    fn as_tuple(&self) -> (f32, f32) {
        (self.x, self.y)
    }
}

/// Cross product of (b - a) and (c - a)
fn cross(a: &Point2f, b: &Point2f, c: &Point2f) -> f32 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// True when the four points span a proper quadrilateral: no two
/// coincide and no three are collinear.
pub fn is_non_degenerate(points: &[Point2f; 4]) -> bool {
    let (min_x, max_x) = points.iter().fold((f32::MAX, f32::MIN), |(lo, hi), p| (lo.min(p.x), hi.max(p.x)));
    let (min_y, max_y) = points.iter().fold((f32::MAX, f32::MIN), |(lo, hi), p| (lo.min(p.y), hi.max(p.y)));
    let extent = (max_x - min_x).max(max_y - min_y);
    if extent <= f32::EPSILON {
        return false;
    }
    let tolerance = 1e-4 * extent * extent;
    (0..4).all(|i| {
        (i + 1..4).all(|j| {
            (j + 1..4).all(|k| cross(&points[i], &points[j], &points[k]).abs() > tolerance)
        })
    })
}

/// Projection taking each `src[i]` onto `dst[i]`, or `None` when either
/// side is degenerate or the system has no solution.
pub fn perspective_projection(src: &[Point2f; 4], dst: &[Point2f; 4]) -> Option<Projection> {
    if !is_non_degenerate(src) || !is_non_degenerate(dst) {
        return None;
    }
    Projection::from_control_points(src.map(|p| p.as_tuple()), dst.map(|p| p.as_tuple()))
}

/// The four pixel-centre corners of a `width` x `height` image,
/// clockwise from top-left. Empty sizes collapse onto the origin.
pub fn target_corners(width: u32, height: u32) -> [Point2f; 4] {
    let (w, h) = (width.saturating_sub(1) as f32, height.saturating_sub(1) as f32);
    [
        Point2f::new(0.0, 0.0),
        Point2f::new(w, 0.0),
        Point2f::new(w, h),
        Point2f::new(0.0, h),
    ]
}
