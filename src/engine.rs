//! # Codec Engine Module
//!
//! In-process image codec engine built on the `image` crate. All three
//! operations work on in-memory byte buffers: decode from any supported
//! input format, then re-encode to the requested target.
//!
//! ## Responsibilities:
//! - `TargetFormat`: closed enum of the formats the engine can emit
//! - `EngineState`: explicit load lifecycle (`Unloaded -> Loading -> Ready | Failed`)
//! - `CodecEngine`: `load()`, `convert()`, `compress()`, `resize()`
//!
//! ## Lifecycle:
//! The engine must be loaded once before first use. `load()` runs a warm-up
//! encode for every target format on a blocking thread; until it completes,
//! every operation fails with `EngineError::Unavailable`. Callers that want
//! a distinct "engine unavailable" condition (rather than a per-item
//! failure) check `is_ready()` before starting a batch.
//!
//! ## Operations:
//! - `convert`: decode and re-encode (JPEG output is written at quality 85)
//! - `compress`: quality-aware re-encode; JPEG honors the quality knob,
//!   PNG and WebP re-encode losslessly
//! - `resize`: percentage downscale with Lanczos3, then encode
//!
//! All heavy pixel work runs under `tokio::task::spawn_blocking` so the
//! async driver thread is never blocked mid-batch.

use crate::error::EngineError;
use image::{codecs::pnm, DynamicImage, ImageOutputFormat};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Cursor;
use std::str::FromStr;
use tracing::{debug, info};

/// Output formats the engine can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetFormat {
    Jpg,
    Png,
    Webp,
    Gif,
    Bmp,
    Ico,
    Tiff,
    Pnm,
}

impl TargetFormat {
    pub const ALL: [TargetFormat; 8] = [
        Self::Jpg,
        Self::Png,
        Self::Webp,
        Self::Gif,
        Self::Bmp,
        Self::Ico,
        Self::Tiff,
        Self::Pnm,
    ];

    /// File extension for output names (no leading dot)
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Jpg => "jpg",
            Self::Png => "png",
            Self::Webp => "webp",
            Self::Gif => "gif",
            Self::Bmp => "bmp",
            Self::Ico => "ico",
            Self::Tiff => "tiff",
            Self::Pnm => "pnm",
        }
    }

    /// Formats with a meaningful quality knob (lossy or losslessly re-encodable)
    pub fn supports_compression(&self) -> bool {
        matches!(self, Self::Jpg | Self::Png | Self::Webp)
    }

    /// Formats the resize operation can emit
    pub fn supports_resize(&self) -> bool {
        matches!(self, Self::Jpg | Self::Png | Self::Webp | Self::Gif | Self::Bmp)
    }
}

impl fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for TargetFormat {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Ok(Self::Jpg),
            "png" => Ok(Self::Png),
            "webp" => Ok(Self::Webp),
            "gif" => Ok(Self::Gif),
            "bmp" => Ok(Self::Bmp),
            "ico" => Ok(Self::Ico),
            "tiff" | "tif" => Ok(Self::Tiff),
            "pnm" | "ppm" => Ok(Self::Pnm),
            // No in-process HEIC encoder exists; reject it by name so the
            // message is clearer than a generic unsupported-format error
            "heic" => Err(EngineError::UnsupportedFormat(
                "heic has no in-process encoder".to_string(),
            )),
            other => Err(EngineError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Explicit engine load lifecycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineState {
    Unloaded,
    Loading,
    Ready,
    Failed(String),
}

/// JPEG quality used by plain conversion (no quality knob exposed)
const CONVERT_JPEG_QUALITY: u8 = 85;

/// In-process codec engine with an explicit load lifecycle
pub struct CodecEngine {
    state: EngineState,
}

impl CodecEngine {
    /// Create an unloaded engine; `load()` must run before first use
    pub fn new() -> Self {
        Self {
            state: EngineState::Unloaded,
        }
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == EngineState::Ready
    }

    /// One-time asynchronous load: warm up every encoder on a blocking thread
    pub async fn load(&mut self) -> Result<(), EngineError> {
        if self.is_ready() {
            return Ok(());
        }

        self.state = EngineState::Loading;
        debug!("Loading codec engine (warm-up encode per target format)");

        let outcome = tokio::task::spawn_blocking(Self::warm_up)
            .await
            .map_err(|e| EngineError::Encode(format!("codec worker failed: {}", e)))
            .and_then(|r| r);

        match outcome {
            Ok(()) => {
                self.state = EngineState::Ready;
                info!("✅ Codec engine ready ({} target formats)", TargetFormat::ALL.len());
                Ok(())
            }
            Err(e) => {
                self.state = EngineState::Failed(e.to_string());
                Err(e)
            }
        }
    }

    /// Encode a probe image once per format so a broken encoder surfaces at
    /// load time instead of mid-batch
    fn warm_up() -> Result<(), EngineError> {
        let probe = DynamicImage::ImageRgb8(image::RgbImage::new(1, 1));
        for format in TargetFormat::ALL {
            encode(&probe, format, CONVERT_JPEG_QUALITY)?;
        }
        Ok(())
    }

    /// Reformat an image: decode from memory, re-encode as `format`
    pub async fn convert(
        &self,
        input: Vec<u8>,
        format: TargetFormat,
    ) -> Result<Vec<u8>, EngineError> {
        self.ensure_ready()?;
        run_blocking(move || {
            let img = decode(&input)?;
            encode(&img, format, CONVERT_JPEG_QUALITY)
        })
        .await
    }

    /// Recompress an image at the given quality (1-100)
    ///
    /// Only jpg, png and webp targets are accepted. The quality knob drives
    /// the JPEG encoder; PNG and WebP re-encode losslessly, so for those the
    /// quality value affects nothing but is still validated for range.
    pub async fn compress(
        &self,
        input: Vec<u8>,
        format: TargetFormat,
        quality: u8,
    ) -> Result<Vec<u8>, EngineError> {
        self.ensure_ready()?;
        if !format.supports_compression() {
            return Err(EngineError::UnsupportedCompression(format));
        }
        let quality = quality.clamp(1, 100);
        run_blocking(move || {
            let img = decode(&input)?;
            encode(&img, format, quality)
        })
        .await
    }

    /// Downscale an image by a percentage (1-100) and encode as `format`
    pub async fn resize(
        &self,
        input: Vec<u8>,
        format: TargetFormat,
        scale_percent: u8,
    ) -> Result<Vec<u8>, EngineError> {
        self.ensure_ready()?;
        if !format.supports_resize() {
            return Err(EngineError::UnsupportedResize(format));
        }
        let scale = f32::from(scale_percent.clamp(1, 100)) / 100.0;
        run_blocking(move || {
            let img = decode(&input)?;
            let new_width = ((img.width() as f32 * scale) as u32).max(1);
            let new_height = ((img.height() as f32 * scale) as u32).max(1);
            let resized = img.resize(new_width, new_height, image::imageops::FilterType::Lanczos3);
            encode(&resized, format, CONVERT_JPEG_QUALITY)
        })
        .await
    }

    fn ensure_ready(&self) -> Result<(), EngineError> {
        if self.is_ready() {
            Ok(())
        } else {
            Err(EngineError::Unavailable)
        }
    }
}

impl Default for CodecEngine {
    fn default() -> Self {
        Self::new()
    }
}

async fn run_blocking<F>(work: F) -> Result<Vec<u8>, EngineError>
where
    F: FnOnce() -> Result<Vec<u8>, EngineError> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| EngineError::Encode(format!("codec worker failed: {}", e)))?
}

fn decode(input: &[u8]) -> Result<DynamicImage, EngineError> {
    image::load_from_memory(input).map_err(|e| EngineError::Decode(e.to_string()))
}

fn encode(
    img: &DynamicImage,
    format: TargetFormat,
    jpeg_quality: u8,
) -> Result<Vec<u8>, EngineError> {
    let mut output = Vec::new();
    let mut cursor = Cursor::new(&mut output);

    let result = match format {
        // The JPEG encoder rejects alpha channels, so flatten first
        TargetFormat::Jpg => DynamicImage::ImageRgb8(img.to_rgb8())
            .write_to(&mut cursor, ImageOutputFormat::Jpeg(jpeg_quality)),
        TargetFormat::Png => img.write_to(&mut cursor, ImageOutputFormat::Png),
        TargetFormat::Webp => img.write_to(&mut cursor, ImageOutputFormat::WebP),
        TargetFormat::Gif => img.write_to(&mut cursor, ImageOutputFormat::Gif),
        TargetFormat::Bmp => img.write_to(&mut cursor, ImageOutputFormat::Bmp),
        TargetFormat::Ico => img.write_to(&mut cursor, ImageOutputFormat::Ico),
        TargetFormat::Tiff => img.write_to(&mut cursor, ImageOutputFormat::Tiff),
        TargetFormat::Pnm => img.write_to(
            &mut cursor,
            ImageOutputFormat::Pnm(pnm::PnmSubtype::Pixmap(pnm::SampleEncoding::Binary)),
        ),
    };

    result.map_err(|e| EngineError::Encode(e.to_string()))?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient_png(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x * 7 % 256) as u8, (y * 13 % 256) as u8, ((x + y) % 256) as u8])
        });
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("jpeg".parse::<TargetFormat>().unwrap(), TargetFormat::Jpg);
        assert_eq!("WEBP".parse::<TargetFormat>().unwrap(), TargetFormat::Webp);
        assert_eq!("tif".parse::<TargetFormat>().unwrap(), TargetFormat::Tiff);
        assert!(matches!(
            "heic".parse::<TargetFormat>(),
            Err(EngineError::UnsupportedFormat(_))
        ));
        assert!("svg".parse::<TargetFormat>().is_err());
    }

    #[test]
    fn test_output_extension() {
        assert_eq!(TargetFormat::Jpg.extension(), "jpg");
        assert_eq!(TargetFormat::Pnm.to_string(), "pnm");
    }

    #[tokio::test]
    async fn test_operations_fail_before_load() {
        let engine = CodecEngine::new();
        assert_eq!(*engine.state(), EngineState::Unloaded);
        let err = engine
            .convert(gradient_png(4, 4), TargetFormat::Png)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Unavailable));
    }

    #[tokio::test]
    async fn test_load_reaches_ready() {
        let mut engine = CodecEngine::new();
        engine.load().await.unwrap();
        assert!(engine.is_ready());
        // Loading again is a no-op
        engine.load().await.unwrap();
        assert!(engine.is_ready());
    }

    #[tokio::test]
    async fn test_convert_round_trip() {
        let mut engine = CodecEngine::new();
        engine.load().await.unwrap();

        let jpg = engine
            .convert(gradient_png(16, 16), TargetFormat::Jpg)
            .await
            .unwrap();
        assert!(!jpg.is_empty());

        let decoded = image::load_from_memory(&jpg).unwrap();
        assert_eq!(decoded.width(), 16);
        assert_eq!(decoded.height(), 16);
    }

    #[tokio::test]
    async fn test_convert_rejects_garbage_input() {
        let mut engine = CodecEngine::new();
        engine.load().await.unwrap();

        let err = engine
            .convert(b"definitely not an image".to_vec(), TargetFormat::Png)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Decode(_)));
    }

    #[tokio::test]
    async fn test_compress_rejects_non_compressible_target() {
        let mut engine = CodecEngine::new();
        engine.load().await.unwrap();

        let err = engine
            .compress(gradient_png(4, 4), TargetFormat::Ico, 80)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::UnsupportedCompression(TargetFormat::Ico)));
    }

    #[tokio::test]
    async fn test_quality_changes_size_not_outcome() {
        let mut engine = CodecEngine::new();
        engine.load().await.unwrap();

        let input = gradient_png(64, 64);
        let low = engine
            .compress(input.clone(), TargetFormat::Jpg, 1)
            .await
            .unwrap();
        let high = engine
            .compress(input, TargetFormat::Jpg, 100)
            .await
            .unwrap();
        assert!(!low.is_empty());
        assert!(!high.is_empty());
        assert!(low.len() <= high.len());
    }

    #[tokio::test]
    async fn test_resize_halves_dimensions() {
        let mut engine = CodecEngine::new();
        engine.load().await.unwrap();

        let out = engine
            .resize(gradient_png(32, 32), TargetFormat::Png, 50)
            .await
            .unwrap();
        let decoded = image::load_from_memory(&out).unwrap();
        assert_eq!(decoded.width(), 16);
        assert_eq!(decoded.height(), 16);
    }
}
