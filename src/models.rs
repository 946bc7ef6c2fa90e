use crate::error::FailureReason;
use crate::geometry::Point2f;
use image::GrayImage;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Axis-aligned pixel bounding box (inclusive extents)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    /// Bounding box of a set of points, rounded to whole pixels
    pub fn from_points(points: &[Point2f]) -> Option<Self> {
        let first = points.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in points {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        let min_x = min_x.round().max(0.0) as u32;
        let min_y = min_y.round().max(0.0) as u32;
        let max_x = (max_x.round().max(0.0) as u32).max(min_x);
        let max_y = (max_y.round().max(0.0) as u32).max(min_y);
        Some(Self {
            x: min_x,
            y: min_y,
            width: max_x - min_x + 1,
            height: max_y - min_y + 1,
        })
    }

    pub fn aspect_ratio(&self) -> f32 {
        if self.height == 0 {
            return 0.0;
        }
        self.width as f32 / self.height as f32
    }
}

/// Plate outline in source-image coordinates, corners in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Quadrilateral {
    pub top_left: Point2f,
    pub top_right: Point2f,
    pub bottom_right: Point2f,
    pub bottom_left: Point2f,
}

impl Quadrilateral {
    /// Labels four unordered points by coordinate sum and difference.
    ///
    /// The smallest x+y is top-left and the largest bottom-right; the
    /// smallest y-x is top-right and the largest bottom-left. Returns
    /// `None` when an extreme is shared by two points or one point would
    /// take two labels.
    pub fn from_points(points: [Point2f; 4]) -> Option<Self> {
        let tl = unique_extreme(&points, Point2f::sum, Extreme::Min)?;
        let br = unique_extreme(&points, Point2f::sum, Extreme::Max)?;
        let tr = unique_extreme(&points, Point2f::diff, Extreme::Min)?;
        let bl = unique_extreme(&points, Point2f::diff, Extreme::Max)?;

        let mut seen = [false; 4];
        for i in [tl, tr, br, bl] {
            if std::mem::replace(&mut seen[i], true) {
                return None;
            }
        }

        Some(Self {
            top_left: points[tl],
            top_right: points[tr],
            bottom_right: points[br],
            bottom_left: points[bl],
        })
    }

    /// Corners clockwise from top-left
    pub fn corners(&self) -> [Point2f; 4] {
        [self.top_left, self.top_right, self.bottom_right, self.bottom_left]
    }
}

#[derive(Clone, Copy)]
enum Extreme {
    Min,
    Max,
}

fn unique_extreme(points: &[Point2f; 4], key: fn(&Point2f) -> f32, extreme: Extreme) -> Option<usize> {
    let values = points.map(|p| key(&p));
    let target = match extreme {
        Extreme::Min => values.iter().copied().fold(f32::INFINITY, f32::min),
        Extreme::Max => values.iter().copied().fold(f32::NEG_INFINITY, f32::max),
    };
    let mut hits = values.iter().enumerate().filter(|(_, v)| **v == target);
    let (index, _) = hits.next()?;
    if hits.next().is_some() {
        return None;
    }
    Some(index)
}

/// Plate class, selecting the canonical rectified size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlateClass {
    #[default]
    Car,
    Motorcycle,
}

impl PlateClass {
    /// Rectified plate size (width, height) in pixels
    pub fn target_size(&self) -> (u32, u32) {
        match self {
            PlateClass::Car => (390, 140),
            PlateClass::Motorcycle => (235, 135),
        }
    }
}

impl FromStr for PlateClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "car" => Ok(PlateClass::Car),
            "motorcycle" => Ok(PlateClass::Motorcycle),
            other => Err(format!("unknown plate type '{}' (expected car or motorcycle)", other)),
        }
    }
}

impl fmt::Display for PlateClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlateClass::Car => write!(f, "car"),
            PlateClass::Motorcycle => write!(f, "motorcycle"),
        }
    }
}

/// Flattened, grayscale plate at its class's canonical size
#[derive(Debug, Clone)]
pub struct RectifiedPlate {
    pub class: PlateClass,
    pub image: GrayImage,
}

/// A segmented, deskewed, size-normalized character candidate
#[derive(Debug, Clone)]
pub struct CharacterGlyph {
    /// Left edge of the character on the rectified plate, used for ordering
    pub x: u32,
    pub bounds: BoundingBox,
    pub image: GrayImage,
}

/// Final outcome of one recognition run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum RecognitionResult {
    Plate(String),
    Failed(FailureReason),
}

impl RecognitionResult {
    pub fn plate(&self) -> Option<&str> {
        match self {
            RecognitionResult::Plate(text) => Some(text),
            RecognitionResult::Failed(_) => None,
        }
    }

    pub fn failure(&self) -> Option<FailureReason> {
        match self {
            RecognitionResult::Plate(_) => None,
            RecognitionResult::Failed(reason) => Some(*reason),
        }
    }
}

impl From<Result<String, FailureReason>> for RecognitionResult {
    fn from(result: Result<String, FailureReason>) -> Self {
        match result {
            Ok(text) => RecognitionResult::Plate(text),
            Err(reason) => RecognitionResult::Failed(reason),
        }
    }
}

/// The plate string, or the failure reason's user-facing text
impl fmt::Display for RecognitionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecognitionResult::Plate(text) => write!(f, "{}", text),
            RecognitionResult::Failed(reason) => write!(f, "{}", reason),
        }
    }
}
