use crate::config::LocalizeConfig;
use crate::detection::{contours, preprocessing};
use crate::geometry::Point2f;
use crate::models::BoundingBox;
use image::GrayImage;
use imageproc::geometry::{approximate_polygon_dp, arc_length};
use tracing::debug;

/// Whether a bounding box has plate proportions
pub fn is_plate_shaped(bounds: &BoundingBox, config: &LocalizeConfig) -> bool {
    let (min_ratio, max_ratio) = config.aspect_ratio_range;
    let aspect = bounds.aspect_ratio();
    aspect > min_ratio && aspect < max_ratio && bounds.width > config.min_width && bounds.height > config.min_height
}

/// The polygon's vertices when it is four-sided and plate-proportioned.
/// Corner order is left as traced.
pub fn plate_corners(polygon: &[Point2f], config: &LocalizeConfig) -> Option<[Point2f; 4]> {
    let corners: [Point2f; 4] = polygon.try_into().ok()?;
    let bounds = BoundingBox::from_points(&corners)?;
    if !is_plate_shaped(&bounds, config) {
        return None;
    }
    debug!(x = bounds.x, y = bounds.y, width = bounds.width, height = bounds.height, "plate outline accepted");
    Some(corners)
}

/// Search one (preprocessed) pyramid level for the plate outline.
///
/// Canny edges, external contours; the largest contours are
/// approximated as polygons in descending area order and the first
/// four-sided, plate-proportioned one wins.
pub fn find_plate_corners(level: &GrayImage, config: &LocalizeConfig) -> Option<[Point2f; 4]> {
    let edges = preprocessing::detect_edges(level, config.edge_low_threshold, config.edge_high_threshold);

    let all_contours = contours::find_external_contours(&edges);
    let total = all_contours.len();
    let candidates = contours::largest_contours(all_contours, config.max_candidates);
    debug!(total, examined = candidates.len(), "plate contour candidates");

    candidates.iter().find_map(|contour| {
        if contour.points.len() < 3 {
            return None;
        }
        let epsilon = config.polygon_approx_tolerance as f64 * arc_length(&contour.points, true);
        if !(epsilon > 0.0) {
            return None;
        }
        let polygon: Vec<Point2f> = approximate_polygon_dp(&contour.points, epsilon, true)
            .into_iter()
            .map(Point2f::from_pixel)
            .collect();
        plate_corners(&polygon, config)
    })
}
