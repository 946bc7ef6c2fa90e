use crate::config::MatchConfig;
use crate::detection::preprocessing::resize_area;
use crate::error::MatchError;
use crate::models::CharacterGlyph;
use crate::recognition::templates::{TemplateEntry, TemplateLibrary};
use image::GrayImage;
use rayon::prelude::*;
use tracing::debug;

/// Zero-mean normalized cross-correlation of two equally sized images,
/// in [-1, 1]. A flat image has no correlation with anything and scores 0.
pub fn normalized_correlation(a: &GrayImage, b: &GrayImage) -> f32 {
    if a.dimensions() != b.dimensions() || a.as_raw().is_empty() {
        return 0.0;
    }

    let n = a.as_raw().len() as f64;
    let mean = |img: &GrayImage| img.as_raw().iter().map(|&v| v as f64).sum::<f64>() / n;
    let (mean_a, mean_b) = (mean(a), mean(b));

    let (mut cross, mut var_a, mut var_b) = (0.0f64, 0.0f64, 0.0f64);
    for (&pa, &pb) in a.as_raw().iter().zip(b.as_raw()) {
        let da = pa as f64 - mean_a;
        let db = pb as f64 - mean_b;
        cross += da * db;
        var_a += da * da;
        var_b += db * db;
    }

    let denom = (var_a * var_b).sqrt();
    if denom < 1e-9 {
        return 0.0;
    }
    (cross / denom) as f32
}

/// The best-scoring template for a glyph. Templates must already be at
/// the glyph's size. The first template reaching the top score wins.
pub fn best_match<'a>(glyph: &GrayImage, templates: &'a [TemplateEntry]) -> (Option<&'a str>, f32) {
    let mut best: (Option<&str>, f32) = (None, -1.0);
    for template in templates {
        let score = normalized_correlation(glyph, &template.bitmap);
        if score > best.1 {
            best = (Some(template.label.as_str()), score);
        }
    }
    best
}

/// Classify each glyph against the library and join the labels in glyph
/// order. Glyphs whose best score does not exceed the confidence floor
/// become the unknown marker.
pub fn classify_glyphs(
    glyphs: &[CharacterGlyph],
    library: Option<&TemplateLibrary>,
    config: &MatchConfig,
) -> Result<String, MatchError> {
    let library = match library {
        Some(library) if !library.is_empty() => library,
        _ => return Err(MatchError::LibraryUnavailable),
    };
    if glyphs.is_empty() {
        return Ok(String::new());
    }

    let (width, height) = config.glyph_size;
    let templates: Vec<TemplateEntry> = library
        .entries()
        .iter()
        .map(|entry| TemplateEntry {
            label: entry.label.clone(),
            bitmap: resize_area(&entry.bitmap, width, height),
        })
        .collect();

    let labels: Vec<String> = glyphs
        .par_iter()
        .enumerate()
        .map(|(index, glyph)| {
            let image = resize_area(&glyph.image, width, height);
            let (label, score) = best_match(&image, &templates);
            debug!(index, x = glyph.x, label = label.unwrap_or(""), score, "glyph match");
            match label {
                Some(label) if score > config.confidence_floor => label.to_string(),
                _ => config.unknown_marker.to_string(),
            }
        })
        .collect();

    Ok(labels.concat())
}
