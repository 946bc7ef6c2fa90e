use crate::config::RecognitionConfig;
use crate::detection::{locate_plate_with, preprocessing, rectify, segmentation};
use crate::error::{FailureReason, TemplateError};
use crate::models::{PlateClass, RecognitionResult};
use crate::recognition::{TemplateLibrary, classify_glyphs};
use anyhow::Result;
use image::{DynamicImage, GrayImage, ImageReader};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Where the orchestrator gets its character templates from
#[derive(Debug, Clone)]
pub enum TemplateSource {
    /// Reload the directory on every recognition run
    Directory(PathBuf),
    /// Share one pre-built library across runs
    Library(Arc<TemplateLibrary>),
}

impl TemplateSource {
    /// Load a directory once, for reuse across many images
    pub fn preload(dir: &Path, threshold: u8) -> Result<Self, TemplateError> {
        Ok(Self::Library(Arc::new(TemplateLibrary::load_dir(dir, threshold)?)))
    }

    pub fn resolve(&self, threshold: u8) -> Result<Arc<TemplateLibrary>, TemplateError> {
        match self {
            TemplateSource::Directory(dir) => Ok(Arc::new(TemplateLibrary::load_dir(dir, threshold)?)),
            TemplateSource::Library(library) => Ok(Arc::clone(library)),
        }
    }
}

/// Progress of one recognition run, logged at every transition
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PipelineState {
    Loaded,
    Preprocessed,
    Searching { level: usize },
    Located { level: usize },
    Rectified,
    Segmented,
    TemplatesReady,
    Classified,
    Unreadable,
    NoContour,
    RectifyFailed,
    NoGlyphs,
    TemplatesUnavailable,
}

impl PipelineState {
    /// The terminal state a run stops in when it fails for `reason`
    pub fn terminal(reason: FailureReason) -> Self {
        match reason {
            FailureReason::ImageUnreadable => PipelineState::Unreadable,
            FailureReason::ContourNotFound => PipelineState::NoContour,
            FailureReason::RectifyFailed => PipelineState::RectifyFailed,
            FailureReason::NoCharacters => PipelineState::NoGlyphs,
            FailureReason::TemplateDbUnavailable => PipelineState::TemplatesUnavailable,
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineState::Loaded => write!(f, "loaded"),
            PipelineState::Preprocessed => write!(f, "preprocessed"),
            PipelineState::Searching { level } => write!(f, "searching(level {})", level),
            PipelineState::Located { level } => write!(f, "located(level {})", level),
            PipelineState::Rectified => write!(f, "rectified"),
            PipelineState::Segmented => write!(f, "segmented"),
            PipelineState::TemplatesReady => write!(f, "templates_ready"),
            PipelineState::Classified => write!(f, "classified"),
            PipelineState::Unreadable => write!(f, "unreadable"),
            PipelineState::NoContour => write!(f, "no_contour"),
            PipelineState::RectifyFailed => write!(f, "rectify_failed"),
            PipelineState::NoGlyphs => write!(f, "no_glyphs"),
            PipelineState::TemplatesUnavailable => write!(f, "templates_unavailable"),
        }
    }
}

/// Debug configuration for pipeline execution
#[derive(Clone, Debug)]
pub struct DebugConfig {
    /// Root directory for debug outputs
    pub output_dir: PathBuf,
    /// Whether debug mode is enabled
    pub enabled: bool,
}

/// Settings shared by every stage of a run
#[derive(Clone, Debug, Default)]
pub struct PipelineContext {
    pub debug: Option<DebugConfig>,
}

impl PipelineContext {
    /// Save an intermediate image as `<stage>/<index>.png` when debug
    /// mode is on. Write failures are logged and otherwise ignored.
    fn save_debug_image(&self, stage: &str, index: usize, image: &DynamicImage) {
        let Some(debug_config) = self.debug.as_ref().filter(|d| d.enabled) else {
            return;
        };

        let stage_dir = debug_config.output_dir.join(stage);
        let filename = format!("{:02}.png", index);
        let saved = std::fs::create_dir_all(&stage_dir)
            .map_err(anyhow::Error::from)
            .and_then(|_| image.save(stage_dir.join(&filename)).map_err(anyhow::Error::from));

        match saved {
            Ok(()) => debug!("saved debug image {}/{}", stage, filename),
            Err(e) => warn!(stage, error = %e, "failed to save debug image"),
        }
    }

    fn save_debug_gray(&self, stage: &str, index: usize, image: &GrayImage) {
        if self.debug.as_ref().is_some_and(|d| d.enabled) {
            self.save_debug_image(stage, index, &DynamicImage::ImageLuma8(image.clone()));
        }
    }
}

/// License plate recognizer: photograph in, plate string or failure
/// reason out.
pub struct Pipeline {
    source: TemplateSource,
    config: RecognitionConfig,
    context: PipelineContext,
}

impl Pipeline {
    pub fn new(source: TemplateSource) -> Self {
        Self {
            source,
            config: RecognitionConfig::default(),
            context: PipelineContext::default(),
        }
    }

    /// Replace the recognition parameters. Settings the pipeline cannot
    /// run with are rejected here rather than mid-run.
    pub fn with_config(mut self, config: RecognitionConfig) -> Result<Self> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    pub fn with_plate_class(mut self, class: PlateClass) -> Self {
        self.config.plate_class = class;
        self
    }

    /// Enable debug mode with output directory
    /// The directory must be empty or non-existent
    pub fn with_debug(mut self, output_dir: PathBuf) -> Result<Self> {
        if output_dir.exists() {
            let entries = std::fs::read_dir(&output_dir)?;
            if entries.count() > 0 {
                return Err(anyhow::anyhow!(
                    "Debug directory is not empty: {}",
                    output_dir.display()
                ));
            }
        } else {
            std::fs::create_dir_all(&output_dir)?;
        }

        self.context.debug = Some(DebugConfig {
            output_dir,
            enabled: true,
        });

        Ok(self)
    }

    pub fn config(&self) -> &RecognitionConfig {
        &self.config
    }

    /// Read and recognize an image file
    pub fn recognize_path(&self, path: &Path) -> RecognitionResult {
        match load_image(path) {
            Ok(img) => {
                debug!(path = %path.display(), width = img.width(), height = img.height(), "image loaded");
                self.recognize(&img)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load image");
                RecognitionResult::Failed(fail(FailureReason::ImageUnreadable))
            }
        }
    }

    /// Recognize the plate in an already decoded photograph
    pub fn recognize(&self, img: &DynamicImage) -> RecognitionResult {
        let result = self.run(img);
        match &result {
            Ok(text) => info!(plate = %text, "plate recognized"),
            Err(reason) => info!(reason = %reason, "plate not recognized"),
        }
        result.into()
    }

    fn load_templates(&self) -> Option<Arc<TemplateLibrary>> {
        match self.source.resolve(self.config.matching.template_threshold) {
            Ok(library) => Some(library),
            Err(e) => {
                warn!(error = %e, "template library unavailable");
                None
            }
        }
    }

    fn run(&self, img: &DynamicImage) -> Result<String, FailureReason> {
        let config = &self.config;
        transition(PipelineState::Loaded);
        self.context.save_debug_image("00_input", 1, img);

        let preprocessed = preprocessing::preprocess(img, &config.preprocess);
        transition(PipelineState::Preprocessed);
        self.context.save_debug_gray("01_preprocessed", 1, &preprocessed);

        let location = locate_plate_with(preprocessed, config, |level| {
            transition(PipelineState::Searching { level: level.index })
        })
        .map_err(|_| fail(FailureReason::ContourNotFound))?;
        transition(PipelineState::Located { level: location.level });

        let plate = rectify::rectify_plate(img, location.source_corners(), config.plate_class)
            .map_err(|e| {
                warn!(error = %e, "rectification failed");
                fail(FailureReason::RectifyFailed)
            })?;
        transition(PipelineState::Rectified);
        self.context.save_debug_gray("02_rectified", 1, &plate.image);

        let segmented = segmentation::segment_characters(&plate, &config.segment, config.matching.glyph_size);

        // Templates are loaded regardless of the segmentation outcome
        let library = self.load_templates();

        let segmented = segmented.map_err(|_| fail(FailureReason::NoCharacters))?;
        transition(PipelineState::Segmented);
        self.context.save_debug_gray("03_binarized", 1, &segmented.binary);
        for (i, glyph) in segmented.glyphs.iter().enumerate() {
            self.context.save_debug_gray("04_glyphs", i + 1, &glyph.image);
        }

        let Some(library) = library else {
            return Err(fail(FailureReason::TemplateDbUnavailable));
        };
        transition(PipelineState::TemplatesReady);

        let text = classify_glyphs(&segmented.glyphs, Some(library.as_ref()), &config.matching)
            .map_err(|_| fail(FailureReason::TemplateDbUnavailable))?;
        transition(PipelineState::Classified);
        Ok(text)
    }
}

fn transition(state: PipelineState) {
    debug!(state = %state, "pipeline state");
}

fn fail(reason: FailureReason) -> FailureReason {
    transition(PipelineState::terminal(reason));
    reason
}

fn load_image(path: &Path) -> Result<DynamicImage> {
    Ok(ImageReader::open(path)?.with_guessed_format()?.decode()?)
}
