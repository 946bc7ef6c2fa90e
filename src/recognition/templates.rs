use crate::detection::preprocessing;
use crate::error::TemplateError;
use image::{DynamicImage, GrayImage};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const TEMPLATE_EXTENSIONS: [&str; 3] = ["png", "jpg", "bmp"];

/// One reference bitmap, labelled by the character it depicts
#[derive(Debug, Clone)]
pub struct TemplateEntry {
    pub label: String,
    pub bitmap: GrayImage,
}

/// Ordered set of character templates with unique labels
#[derive(Debug, Clone, Default)]
pub struct TemplateLibrary {
    entries: Vec<TemplateEntry>,
}

impl TemplateLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a template. A label already present keeps its position and
    /// takes the new bitmap.
    pub fn push(&mut self, label: impl Into<String>, bitmap: GrayImage) {
        let label = label.into();
        match self.entries.iter_mut().find(|entry| entry.label == label) {
            Some(entry) => {
                debug!(label = %label, "replacing duplicate template");
                entry.bitmap = bitmap;
            }
            None => self.entries.push(TemplateEntry { label, bitmap }),
        }
    }

    pub fn get(&self, label: &str) -> Option<&GrayImage> {
        self.entries.iter().find(|entry| entry.label == label).map(|entry| &entry.bitmap)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.label.as_str())
    }

    pub fn entries(&self) -> &[TemplateEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Load every `.png`, `.jpg` and `.bmp` file in `dir` as a template
    /// labelled by its file stem.
    ///
    /// Files are visited in file-name order. Other extensions are ignored
    /// and files that fail to decode are skipped with a warning. An
    /// existing directory with no usable files yields an empty library.
    pub fn load_dir(dir: &Path, threshold: u8) -> Result<Self, TemplateError> {
        if !dir.is_dir() {
            return Err(TemplateError::DirectoryMissing(dir.to_path_buf()));
        }

        let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && has_template_extension(path))
            .collect();
        paths.sort();

        let mut library = Self::new();
        for path in paths {
            let Some(label) = path.file_stem().and_then(|stem| stem.to_str()) else {
                warn!(path = %path.display(), "template file name is not valid UTF-8, skipping");
                continue;
            };
            let label = label.to_string();

            match image::open(&path) {
                Ok(img) => library.push(label, prepare_template(&img, threshold)),
                Err(e) => warn!(path = %path.display(), error = %e, "failed to decode template, skipping"),
            }
        }

        debug!(dir = %dir.display(), count = library.len(), "loaded template library");
        Ok(library)
    }
}

/// Case-sensitive: `A.PNG` is not a template
fn has_template_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| TEMPLATE_EXTENSIONS.contains(&ext))
}

/// Grayscale, binarize at `threshold` and crop to the glyph's extent.
pub fn prepare_template(img: &DynamicImage, threshold: u8) -> GrayImage {
    let binary = preprocessing::binarize(&img.to_luma8(), threshold, false);
    preprocessing::crop_to_content(&binary)
}
