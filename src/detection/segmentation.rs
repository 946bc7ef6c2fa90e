use crate::config::SegmentConfig;
use crate::detection::{contours, preprocessing};
use crate::error::DetectionError;
use crate::geometry::{Point2f, perspective_projection, target_corners};
use crate::models::{BoundingBox, CharacterGlyph, Quadrilateral, RectifiedPlate};
use image::{GrayImage, Luma};
use imageproc::geometric_transformations::{Interpolation, warp_into};
use imageproc::geometry::min_area_rect;
use tracing::{debug, warn};

/// Characters cut from a rectified plate, plus the binarized plate they
/// were cut from
#[derive(Debug, Clone)]
pub struct Segmentation {
    pub glyphs: Vec<CharacterGlyph>,
    pub binary: GrayImage,
}

/// Whether a bounding box has the proportions of a single character
pub fn is_character_shaped(bounds: &BoundingBox, config: &SegmentConfig) -> bool {
    let (min_ratio, max_ratio) = config.aspect_ratio_range;
    let aspect = bounds.aspect_ratio();
    aspect > min_ratio && aspect < max_ratio && bounds.height > config.min_height && bounds.width > config.min_width
}

/// Split a rectified plate into left-to-right ordered character glyphs.
///
/// Each character-shaped region is deskewed by warping its minimum-area
/// rectangle onto a `glyph_size` canvas of the binarized plate.
pub fn segment_characters(
    plate: &RectifiedPlate,
    config: &SegmentConfig,
    glyph_size: (u32, u32),
) -> Result<Segmentation, DetectionError> {
    let binary = preprocessing::binarize_otsu_inverted(&plate.image);
    let regions = contours::find_external_contours(&binary);
    let target = target_corners(glyph_size.0, glyph_size.1);

    let mut glyphs = Vec::new();
    for region in &regions {
        if !is_character_shaped(&region.bounds, config) {
            continue;
        }

        if region.points.is_empty() {
            continue;
        }
        let rect = min_area_rect(&region.points).map(Point2f::from_pixel);
        let Some(quad) = Quadrilateral::from_points(rect) else {
            warn!(x = region.bounds.x, "character rectangle has ambiguous corners, skipping");
            continue;
        };
        let Some(projection) = perspective_projection(&quad.corners(), &target) else {
            warn!(x = region.bounds.x, "character rectangle is degenerate, skipping");
            continue;
        };

        let mut image = GrayImage::new(glyph_size.0, glyph_size.1);
        warp_into(&binary, &projection, Interpolation::Bilinear, Luma([0]), &mut image);

        glyphs.push(CharacterGlyph {
            x: region.bounds.x,
            bounds: region.bounds,
            image,
        });
    }

    debug!(regions = regions.len(), glyphs = glyphs.len(), "segmented plate");
    if glyphs.is_empty() {
        return Err(DetectionError::NoGlyphs);
    }

    glyphs.sort_by_key(|glyph| glyph.x);
    Ok(Segmentation { glyphs, binary })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PlateClass;

    const GLYPH: (u32, u32) = (40, 80);

    /// White car plate with dark filled rectangles `(x, y, w, h)`
    fn plate(marks: &[(u32, u32, u32, u32)]) -> RectifiedPlate {
        let image = GrayImage::from_fn(390, 140, |x, y| {
            let dark = marks
                .iter()
                .any(|&(mx, my, mw, mh)| x >= mx && x < mx + mw && y >= my && y < my + mh);
            Luma([if dark { 15 } else { 235 }])
        });
        RectifiedPlate {
            class: PlateClass::Car,
            image,
        }
    }

    #[test]
    fn test_character_shape_filter() {
        let config = SegmentConfig::default();
        let glyph = BoundingBox { x: 0, y: 0, width: 30, height: 60 };
        let wide = BoundingBox { x: 0, y: 0, width: 70, height: 60 };
        let short = BoundingBox { x: 0, y: 0, width: 10, height: 18 };
        let sliver = BoundingBox { x: 0, y: 0, width: 4, height: 60 };
        assert!(is_character_shaped(&glyph, &config));
        assert!(!is_character_shaped(&wide, &config));
        assert!(!is_character_shaped(&short, &config));
        assert!(!is_character_shaped(&sliver, &config));
    }

    #[test]
    fn test_glyphs_ordered_left_to_right() {
        // The right-hand mark starts higher, so it is traced first
        let plate = plate(&[(50, 40, 30, 60), (200, 20, 30, 90), (120, 40, 30, 60)]);
        let result = segment_characters(&plate, &SegmentConfig::default(), GLYPH).unwrap();

        let xs: Vec<u32> = result.glyphs.iter().map(|g| g.x).collect();
        assert_eq!(xs, vec![50, 120, 200]);
        assert_eq!(result.binary.dimensions(), (390, 140));
    }

    #[test]
    fn test_stacked_glyphs_keep_detection_order() {
        // Same left edge, so only detection order separates them
        let plate = plate(&[(100, 10, 30, 50), (100, 75, 30, 50)]);
        let result = segment_characters(&plate, &SegmentConfig::default(), GLYPH).unwrap();

        let positions: Vec<(u32, u32)> = result.glyphs.iter().map(|g| (g.x, g.bounds.y)).collect();
        assert_eq!(positions, vec![(100, 10), (100, 75)]);
    }

    #[test]
    fn test_glyphs_normalized_to_target_size() {
        let plate = plate(&[(60, 30, 30, 70)]);
        let result = segment_characters(&plate, &SegmentConfig::default(), GLYPH).unwrap();

        assert_eq!(result.glyphs.len(), 1);
        let glyph = &result.glyphs[0];
        assert_eq!(glyph.image.dimensions(), GLYPH);
        assert_eq!(glyph.image.get_pixel(20, 40)[0], 255);
        assert_eq!(glyph.bounds.width, 30);
        assert_eq!(glyph.bounds.height, 70);
    }

    #[test]
    fn test_non_character_marks_dropped() {
        // A wide bar and a thin sliver next to one real character
        let plate = plate(&[(20, 30, 120, 40), (160, 30, 3, 60), (220, 30, 30, 60)]);
        let result = segment_characters(&plate, &SegmentConfig::default(), GLYPH).unwrap();
        assert_eq!(result.glyphs.len(), 1);
        assert_eq!(result.glyphs[0].x, 220);
    }

    #[test]
    fn test_empty_glyph_size_yields_no_glyphs() {
        let plate = plate(&[(60, 30, 30, 70)]);
        assert_eq!(
            segment_characters(&plate, &SegmentConfig::default(), (0, 80)).unwrap_err(),
            DetectionError::NoGlyphs
        );
    }

    #[test]
    fn test_blank_plate_has_no_glyphs() {
        let blank = plate(&[]);
        assert_eq!(
            segment_characters(&blank, &SegmentConfig::default(), GLYPH).unwrap_err(),
            DetectionError::NoGlyphs
        );
    }
}
