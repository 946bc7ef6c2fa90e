use crate::detection::preprocessing::resize_area;
use image::GrayImage;

/// One level of an image pyramid
#[derive(Debug, Clone)]
pub struct PyramidLevel {
    pub index: usize,
    pub image: GrayImage,
    /// Source width divided by this level's width
    pub width_scale: f32,
    /// Source height divided by this level's height
    pub height_scale: f32,
}

/// Lazily generated sequence of progressively smaller copies of an image.
///
/// The first level is the input itself. Every following level is the
/// previous one shrunk by `scale` (dimensions floored) with area
/// averaging. Generation stops before a level narrower or shorter than
/// the minimum size. A level is only computed when `next` is called, so
/// a consumer that stops early never pays for the smaller levels.
pub struct Pyramid {
    previous: Option<GrayImage>,
    pending: Option<GrayImage>,
    scale: f32,
    min_size: (u32, u32),
    source_size: (u32, u32),
    index: usize,
}

impl Pyramid {
    pub fn new(image: GrayImage, scale: f32, min_size: (u32, u32)) -> Self {
        let source_size = image.dimensions();
        Self {
            previous: None,
            pending: Some(image),
            scale,
            min_size,
            source_size,
            index: 0,
        }
    }

    fn shrink(&self, image: &GrayImage) -> Option<GrayImage> {
        if !(self.scale > 1.0) {
            return None;
        }
        let width = (image.width() as f32 / self.scale).floor() as u32;
        let height = (image.height() as f32 / self.scale).floor() as u32;
        if width < self.min_size.0 || height < self.min_size.1 {
            return None;
        }
        Some(resize_area(image, width, height))
    }
}

impl Iterator for Pyramid {
    type Item = PyramidLevel;

    fn next(&mut self) -> Option<PyramidLevel> {
        let image = match self.pending.take() {
            Some(image) => image,
            None => {
                let previous = self.previous.take()?;
                self.shrink(&previous)?
            }
        };

        let level = PyramidLevel {
            index: self.index,
            width_scale: self.source_size.0 as f32 / image.width().max(1) as f32,
            height_scale: self.source_size.1 as f32 / image.height().max(1) as f32,
            image: image.clone(),
        };
        self.previous = Some(image);
        self.index += 1;
        Some(level)
    }
}
