mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from platecheck for tests
pub use platecheck::{FailureReason, Pipeline, RecognitionResult, TemplateLibrary, TemplateSource};
