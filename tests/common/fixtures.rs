use image::{GrayImage, Luma, Rgb, RgbImage};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Blocky 5x7 glyphs, top row first. Every glyph is 4-connected and
/// touches all four sides of its cell.
pub const FONT: &[(char, [&str; 7])] = &[
    ('N', ["#...#", "##..#", "###.#", "#.###", "#..##", "#...#", "#...#"]),
    ('D', ["####.", "#..##", "#...#", "#...#", "#...#", "#..##", "####."]),
    ('J', ["#####", "..#..", "..#..", "..#..", "..#..", "#.#..", "####."]),
    ('8', [".###.", "##.##", "#...#", "#####", "#...#", "##.##", ".###."]),
    ('9', [".###.", "##.##", "#...#", "##.##", ".####", "....#", "#####"]),
    ('5', ["#####", "#....", "####.", "...##", "....#", "##.##", ".###."]),
    ('7', ["#####", "....#", "...##", "...#.", "..##.", ".##..", "##..."]),
];

pub const PLATE_TEXT: &str = "NDJ8975";

/// Background, plate surface and ink levels of the synthetic photo
const BACKGROUND: u8 = 60;
const PLATE: u8 = 235;
const INK: u8 = 20;

/// Photo geometry: the plate already has the car plate's canonical size
pub const PHOTO_SIZE: (u32, u32) = (520, 320);
pub const PLATE_ORIGIN: (u32, u32) = (65, 90);
pub const PLATE_SIZE: (u32, u32) = (390, 140);
const CHAR_CELL: u32 = 8;
const CHAR_GAP: u32 = 12;

fn rows(label: char) -> &'static [&'static str; 7] {
    FONT.iter()
        .find(|(c, _)| *c == label)
        .map(|(_, rows)| rows)
        .unwrap_or_else(|| panic!("no glyph for {label:?}"))
}

fn is_ink(label: char, col: u32, row: u32) -> bool {
    rows(label)[row as usize].as_bytes()[col as usize] == b'#'
}

/// Render a glyph as white strokes on black, `cell` pixels per font
/// pixel, with `pad` pixels of black around it.
pub fn render_glyph(label: char, cell: u32, pad: u32) -> GrayImage {
    GrayImage::from_fn(5 * cell + 2 * pad, 7 * cell + 2 * pad, |x, y| {
        let inside = x >= pad && y >= pad && x < pad + 5 * cell && y < pad + 7 * cell;
        let on = inside && is_ink(label, (x - pad) / cell, (y - pad) / cell);
        Luma([if on { 255 } else { 0 }])
    })
}

/// Template directory with one `<label>.png` per character of `labels`
pub fn write_template_dir(labels: &str) -> TempDir {
    let dir = TempDir::new().expect("Failed to create template directory");
    for label in labels.chars() {
        render_glyph(label, 10, 10)
            .save(dir.path().join(format!("{label}.png")))
            .expect("Failed to save template");
    }
    dir
}

/// Grey photo with a light plate showing `text` in dark characters.
pub fn plate_photo(text: &str) -> RgbImage {
    let count = text.chars().count() as u32;
    let (char_w, char_h) = (5 * CHAR_CELL, 7 * CHAR_CELL);
    let text_w = count * char_w + count.saturating_sub(1) * CHAR_GAP;
    let (plate_x, plate_y) = PLATE_ORIGIN;
    let text_x = plate_x + (PLATE_SIZE.0 - text_w) / 2;
    let text_y = plate_y + (PLATE_SIZE.1 - char_h) / 2;
    let chars: Vec<char> = text.chars().collect();

    RgbImage::from_fn(PHOTO_SIZE.0, PHOTO_SIZE.1, |x, y| {
        let on_plate = x >= plate_x && y >= plate_y && x < plate_x + PLATE_SIZE.0 && y < plate_y + PLATE_SIZE.1;
        if !on_plate {
            return Rgb([BACKGROUND; 3]);
        }

        if x >= text_x && y >= text_y && y < text_y + char_h && x < text_x + text_w {
            let offset = x - text_x;
            let slot = offset / (char_w + CHAR_GAP);
            let within = offset % (char_w + CHAR_GAP);
            if within < char_w && is_ink(chars[slot as usize], within / CHAR_CELL, (y - text_y) / CHAR_CELL) {
                return Rgb([INK; 3]);
            }
        }
        Rgb([PLATE; 3])
    })
}

/// Photo with no plate-shaped structure at all
pub fn blank_photo() -> RgbImage {
    RgbImage::from_pixel(PHOTO_SIZE.0, PHOTO_SIZE.1, Rgb([BACKGROUND; 3]))
}

/// Save an image into `dir` as a PNG and return its path
pub fn save_png(dir: &Path, name: &str, image: &RgbImage) -> PathBuf {
    let path = dir.join(name);
    image
        .save_with_format(&path, image::ImageFormat::Png)
        .expect("Failed to save test image");
    path
}
