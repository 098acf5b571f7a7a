//! Headline image renderer.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use ab_glyph::{FontVec, PxScale};
use async_trait::async_trait;
use image::{ImageFormat, Rgb, RgbImage};
use imageproc::drawing::{draw_text_mut, text_size};
use newscaster_core::{ImageRenderer, Settings};
use rand::seq::IndexedRandom;
use tracing::{debug, warn};

use crate::error::{RenderError, Result};
use crate::layout::{clamp_lines, font_size_for, wrap_words, HORIZONTAL_PADDING};

/// Size of the fallback canvas.
pub const DEFAULT_CANVAS: (u32, u32) = (1200, 630);

const BACKGROUND: Rgb<u8> = Rgb([40, 40, 40]);
const TEXT_COLOR: Rgb<u8> = Rgb([255, 255, 255]);
const STROKE_COLOR: Rgb<u8> = Rgb([0, 0, 0]);
const STROKE_WIDTH: i32 = 2;
const LINE_SPACING: f32 = 1.2;

const TEMPLATE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Directories and font used by the renderer.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub fonts_dir: PathBuf,
    pub templates_dir: PathBuf,
    pub output_dir: PathBuf,
    pub font_file: String,
}

impl RenderConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            fonts_dir: settings.fonts_dir.clone(),
            templates_dir: settings.templates_dir.clone(),
            output_dir: settings.output_dir.clone(),
            font_file: settings.default_font.clone(),
        }
    }

    pub fn font_path(&self) -> PathBuf {
        self.fonts_dir.join(&self.font_file)
    }
}

/// Draws a headline onto a template or a plain canvas and saves a JPEG.
#[derive(Debug, Clone)]
pub struct TitleRenderer {
    config: Arc<RenderConfig>,
    sequence: Arc<AtomicU64>,
}

impl TitleRenderer {
    pub fn new(config: RenderConfig) -> Self {
        Self {
            config: Arc::new(config),
            sequence: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Whether the configured font file exists.
    pub fn font_available(&self) -> bool {
        self.config.font_path().is_file()
    }

    /// Background templates, sorted by path. A missing directory yields none.
    pub fn templates(&self) -> Vec<PathBuf> {
        let Ok(entries) = std::fs::read_dir(&self.config.templates_dir) else {
            return Vec::new();
        };

        let mut templates: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && is_template(path))
            .collect();
        templates.sort();
        templates
    }

    /// Render `title` and return the path of the written file.
    pub fn render_to_file(&self, title: &str) -> Result<PathBuf> {
        let title = title.trim();
        if title.is_empty() {
            return Err(RenderError::EmptyTitle);
        }

        let font = self.load_font()?;
        let mut canvas = self.background()?;

        let (width, height) = canvas.dimensions();
        let scale = PxScale::from(font_size_for(width, height));
        let max_width = width.saturating_sub(HORIZONTAL_PADDING);

        let lines = clamp_lines(wrap_words(title, max_width, |s| {
            text_size(scale, &font, s).0
        }));

        let line_height = (text_size(scale, &font, "Test").1 as f32 * LINE_SPACING) as i32;
        let total_height = line_height * lines.len() as i32;
        let mut y = (height as i32 - total_height) / 2;

        for line in &lines {
            let line_width = text_size(scale, &font, line).0 as i32;
            let x = (width as i32 - line_width) / 2;
            draw_stroked(&mut canvas, x, y, scale, &font, line);
            y += line_height;
        }

        std::fs::create_dir_all(&self.config.output_dir)?;
        let path = self.next_output_path();
        canvas.save_with_format(&path, ImageFormat::Jpeg)?;

        debug!(path = %path.display(), lines = lines.len(), "Rendered headline image");
        Ok(path)
    }

    fn load_font(&self) -> Result<FontVec> {
        let path = self.config.font_path();
        if !path.is_file() {
            return Err(RenderError::FontNotFound(path));
        }
        let bytes = std::fs::read(&path)?;
        FontVec::try_from_vec(bytes).map_err(|e| RenderError::InvalidFont {
            path,
            reason: e.to_string(),
        })
    }

    fn background(&self) -> Result<RgbImage> {
        let templates = self.templates();
        match templates.choose(&mut rand::rng()) {
            Some(template) => Ok(image::open(template)?.to_rgb8()),
            None => {
                debug!("No templates found, using plain background");
                let (width, height) = DEFAULT_CANVAS;
                Ok(RgbImage::from_pixel(width, height, BACKGROUND))
            }
        }
    }

    fn next_output_path(&self) -> PathBuf {
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S_%3f");
        self.config
            .output_dir
            .join(format!("post_{}_{}.jpg", stamp, seq))
    }
}

#[async_trait]
impl ImageRenderer for TitleRenderer {
    async fn render(&self, title: &str) -> Option<PathBuf> {
        let renderer = self.clone();
        let title = title.to_string();

        let result = tokio::task::spawn_blocking(move || renderer.render_to_file(&title))
            .await
            .map_err(|e| RenderError::Task(e.to_string()))
            .and_then(|inner| inner);

        match result {
            Ok(path) => Some(path),
            Err(e) => {
                warn!(error = %e, "Image generation failed");
                None
            }
        }
    }
}

fn is_template(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| TEMPLATE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// White text with a black outline drawn by offsetting the glyphs.
fn draw_stroked(canvas: &mut RgbImage, x: i32, y: i32, scale: PxScale, font: &FontVec, text: &str) {
    for dx in -STROKE_WIDTH..=STROKE_WIDTH {
        for dy in -STROKE_WIDTH..=STROKE_WIDTH {
            if dx != 0 || dy != 0 {
                draw_text_mut(canvas, STROKE_COLOR, x + dx, y + dy, scale, font, text);
            }
        }
    }
    draw_text_mut(canvas, TEXT_COLOR, x, y, scale, font, text);
}
