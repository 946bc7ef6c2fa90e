use crate::detection::preprocessing::clear_border;
use crate::geometry::Point2f;
use crate::models::BoundingBox;
use image::GrayImage;
use imageproc::contours::{BorderType, find_contours};
use imageproc::geometry::contour_area;
use imageproc::point::Point;

/// Outer border of one connected foreground region
#[derive(Debug, Clone)]
pub struct Contour {
    pub points: Vec<Point<i32>>,
    pub bounds: BoundingBox,
}

impl Contour {
    pub fn area(&self) -> f64 {
        contour_area(&self.points)
    }
}

/// Find the outermost contours in a binary image.
///
/// Non-zero pixels are foreground. Only borders that are not nested
/// inside another region are returned, in tracing (raster) order.
pub fn find_external_contours(binary: &GrayImage) -> Vec<Contour> {
    let mut traced = binary.clone();
    clear_border(&mut traced);

    find_contours::<i32>(&traced)
        .into_iter()
        .filter(|c| matches!(c.border_type, BorderType::Outer) && c.parent.is_none())
        .filter_map(|c| {
            let corners: Vec<Point2f> = c.points.iter().copied().map(Point2f::from_pixel).collect();
            let bounds = BoundingBox::from_points(&corners)?;
            Some(Contour { points: c.points, bounds })
        })
        .collect()
}

/// The `limit` largest contours by enclosed area, largest first.
/// Equal areas keep their tracing order.
pub fn largest_contours(contours: Vec<Contour>, limit: usize) -> Vec<Contour> {
    let mut keyed: Vec<(f64, Contour)> = contours.into_iter().map(|c| (c.area(), c)).collect();
    keyed.sort_by(|a, b| b.0.total_cmp(&a.0));
    keyed.into_iter().take(limit).map(|(_, c)| c).collect()
}
