pub mod config;
pub mod detection;
pub mod error;
pub mod geometry;
pub mod models;
pub mod pipeline;
pub mod recognition;

pub use config::{RecognitionConfig, load_config, save_config};
pub use error::{DetectionError, FailureReason, MatchError, TemplateError};
pub use models::{PlateClass, RecognitionResult};
pub use pipeline::{DebugConfig, Pipeline, PipelineContext, TemplateSource};
pub use recognition::TemplateLibrary;
