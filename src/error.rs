use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Failures raised by the geometric stages (localize, rectify, segment)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DetectionError {
    #[error("no plate-shaped quadrilateral found at any pyramid level")]
    NoContour,
    #[error("quadrilateral corners are degenerate")]
    DegenerateCorners,
    #[error("perspective transform is singular")]
    SingularHomography,
    #[error("no character-shaped regions found on the plate")]
    NoGlyphs,
}

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("template directory not found: {}", .0.display())]
    DirectoryMissing(PathBuf),
    #[error("failed to read template directory: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MatchError {
    #[error("template library is empty or unavailable")]
    LibraryUnavailable,
}

/// Why a recognition run produced no plate string.
///
/// The `Display` text is what the UI shell shows to the user.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    #[error("Failed to load image")]
    ImageUnreadable,
    #[error("License plate contour not found")]
    ContourNotFound,
    #[error("Failed to crop license plate")]
    RectifyFailed,
    #[error("No characters segmented")]
    NoCharacters,
    #[error("Template DB not loaded")]
    TemplateDbUnavailable,
}
