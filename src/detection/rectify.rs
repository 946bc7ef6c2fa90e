use crate::error::DetectionError;
use crate::geometry::{Point2f, perspective_projection, target_corners};
use crate::models::{PlateClass, Quadrilateral, RectifiedPlate};
use image::{DynamicImage, Rgb, RgbImage};
use imageproc::geometric_transformations::{Interpolation, warp_into};

/// Flatten the plate outlined by four loose corner points to its
/// class's canonical size.
///
/// The points are labelled top-left, top-right, bottom-right and
/// bottom-left by coordinate sum and difference. The full-resolution
/// colour frame is then warped onto the target rectangle and converted
/// to grayscale.
pub fn rectify_plate(
    frame: &DynamicImage,
    points: [Point2f; 4],
    class: PlateClass,
) -> Result<RectifiedPlate, DetectionError> {
    let quad = Quadrilateral::from_points(points).ok_or(DetectionError::DegenerateCorners)?;

    let (width, height) = class.target_size();
    let projection = perspective_projection(&quad.corners(), &target_corners(width, height))
        .ok_or(DetectionError::SingularHomography)?;

    let mut warped = RgbImage::new(width, height);
    warp_into(&frame.to_rgb8(), &projection, Interpolation::Bilinear, Rgb([0, 0, 0]), &mut warped);

    Ok(RectifiedPlate {
        class,
        image: DynamicImage::ImageRgb8(warped).to_luma8(),
    })
}
