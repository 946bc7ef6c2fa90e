pub mod contours;
pub mod localize;
pub mod preprocessing;
pub mod pyramid;
pub mod rectify;
pub mod segmentation;

use crate::config::RecognitionConfig;
use crate::error::DetectionError;
use crate::geometry::Point2f;
use image::GrayImage;
use pyramid::{Pyramid, PyramidLevel};

/// Where the plate outline was found in the pyramid
#[derive(Debug, Clone, PartialEq)]
pub struct PlateLocation {
    /// Pyramid level index, 0 being full resolution
    pub level: usize,
    pub width_scale: f32,
    pub height_scale: f32,
    /// Outline vertices in the coordinates of `level`, unordered
    pub corners: [Point2f; 4],
}

impl PlateLocation {
    /// The outline mapped back to full-resolution coordinates
    pub fn source_corners(&self) -> [Point2f; 4] {
        self.corners.map(|p| p.scaled(self.width_scale, self.height_scale))
    }
}

/// Walk the pyramid of a preprocessed grayscale frame, largest level
/// first, and stop at the first level holding a plate outline.
pub fn locate_plate(preprocessed: GrayImage, config: &RecognitionConfig) -> Result<PlateLocation, DetectionError> {
    locate_plate_with(preprocessed, config, |_| {})
}

/// Like [`locate_plate`], calling `on_level` before each level is searched
pub fn locate_plate_with(
    preprocessed: GrayImage,
    config: &RecognitionConfig,
    mut on_level: impl FnMut(&PyramidLevel),
) -> Result<PlateLocation, DetectionError> {
    let pyramid = Pyramid::new(
        preprocessed,
        config.pyramid.scale,
        (config.pyramid.min_width, config.pyramid.min_height),
    );

    for level in pyramid {
        on_level(&level);

        if let Some(corners) = localize::find_plate_corners(&level.image, &config.localize) {
            return Ok(PlateLocation {
                level: level.index,
                width_scale: level.width_scale,
                height_scale: level.height_scale,
                corners,
            });
        }
    }

    Err(DetectionError::NoContour)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn test_locates_plate_at_full_resolution() {
        let frame = GrayImage::from_fn(400, 240, |x, y| {
            let inside = (80..300).contains(&x) && (80..160).contains(&y);
            Luma([if inside { 230 } else { 40 }])
        });
        let location = locate_plate(frame, &RecognitionConfig::default()).unwrap();
        assert_eq!(location.level, 0);
        assert_eq!(location.source_corners(), location.corners);
    }

    #[test]
    fn test_observer_sees_every_searched_level() {
        let frame = GrayImage::from_pixel(300, 200, Luma([90]));
        let mut seen = Vec::new();
        let result = locate_plate_with(frame, &RecognitionConfig::default(), |level| seen.push(level.index));
        assert!(result.is_err());
        assert!(seen.len() > 1);
        assert_eq!(seen, (0..seen.len()).collect::<Vec<_>>());
    }

    #[test]
    fn test_uniform_frame_has_no_plate() {
        let frame = GrayImage::from_pixel(300, 200, Luma([90]));
        assert_eq!(
            locate_plate(frame, &RecognitionConfig::default()).unwrap_err(),
            DetectionError::NoContour
        );
    }

    #[test]
    fn test_source_corners_rescale() {
        let location = PlateLocation {
            level: 2,
            width_scale: 2.25,
            height_scale: 2.0,
            corners: [
                Point2f::new(50.0, 30.0),
                Point2f::new(10.0, 10.0),
                Point2f::new(50.0, 10.0),
                Point2f::new(10.0, 30.0),
            ],
        };
        let source = location.source_corners();
        assert_eq!(source[0], Point2f::new(112.5, 60.0));
        assert_eq!(source[1], Point2f::new(22.5, 20.0));
    }
}
