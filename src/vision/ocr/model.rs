// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! End-to-end PaddleOCR engine: detection, cropping, per-language recognition

use anyhow::{Context, Result};
use async_trait::async_trait;
use image::DynamicImage;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use super::detection::OcrDetectionModel;
use super::preprocessing::{preprocess_for_detection, preprocess_for_recognition};
use super::recognition::{OcrRecognitionModel, RecognizedText};
use crate::vision::engine::{EngineFactory, OcrEngine, Quad, RawRegion};
use crate::vision::image_utils::load_image_file;

/// Shared detector file inside the model directory
pub const DETECTION_MODEL_FILE: &str = "det_model.onnx";
/// Per-language recognizer file, under `<model_dir>/<lang>/`
pub const RECOGNITION_MODEL_FILE: &str = "rec_model.onnx";
/// Per-language character keys, under `<model_dir>/<lang>/`
pub const KEYS_FILE: &str = "keys.txt";

/// Paths for one language's recognizer
#[derive(Debug, Clone, PartialEq)]
pub struct LanguageModelPaths {
    pub language: String,
    pub model: PathBuf,
    pub keys: PathBuf,
}

/// Resolve the per-language recognizer paths under `model_dir`
pub fn language_model_paths(model_dir: &Path, language: &str) -> Result<LanguageModelPaths> {
    let valid = !language.is_empty()
        && language
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if !valid {
        anyhow::bail!("Invalid language code '{}'", language);
    }

    let dir = model_dir.join(language);
    Ok(LanguageModelPaths {
        language: language.to_string(),
        model: dir.join(RECOGNITION_MODEL_FILE),
        keys: dir.join(KEYS_FILE),
    })
}

/// PaddleOCR pipeline running on CPU via ONNX Runtime
pub struct PaddleOcrEngine {
    languages: Vec<String>,
    detector: OcrDetectionModel,
    recognizers: Vec<(String, OcrRecognitionModel)>,
}

impl std::fmt::Debug for PaddleOcrEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaddleOcrEngine")
            .field("languages", &self.languages)
            .field("detector", &self.detector)
            .finish_non_exhaustive()
    }
}

impl PaddleOcrEngine {
    /// Load the detector and one recognizer per language
    ///
    /// Expected layout:
    /// - `<model_dir>/det_model.onnx`
    /// - `<model_dir>/<lang>/rec_model.onnx`
    /// - `<model_dir>/<lang>/keys.txt`
    pub fn load(model_dir: &Path, languages: &[String]) -> Result<Self> {
        if languages.is_empty() {
            anyhow::bail!("At least one OCR language is required");
        }

        let detector = OcrDetectionModel::load(model_dir.join(DETECTION_MODEL_FILE))?;

        let mut recognizers = Vec::with_capacity(languages.len());
        for language in languages {
            let paths = language_model_paths(model_dir, language)?;
            let recognizer = OcrRecognitionModel::load(&paths.model, &paths.keys)
                .with_context(|| format!("Unsupported OCR language '{}'", language))?;
            recognizers.push((paths.language, recognizer));
        }

        info!(
            "PaddleOCR engine ready ({} languages, model dir {})",
            recognizers.len(),
            model_dir.display()
        );

        Ok(Self {
            languages: languages.to_vec(),
            detector,
            recognizers,
        })
    }

    /// Best non-empty reading of a crop across all loaded languages
    fn recognize_crop(&self, crop: &DynamicImage) -> Result<Option<RecognizedText>> {
        let tensor = preprocess_for_recognition(crop);
        let mut best: Option<RecognizedText> = None;

        for (language, recognizer) in &self.recognizers {
            let reading = recognizer
                .recognize(&tensor)
                .with_context(|| format!("Recognition failed for language '{}'", language))?;
            if reading.is_empty() {
                continue;
            }
            if best
                .as_ref()
                .map_or(true, |b| reading.confidence > b.confidence)
            {
                best = Some(reading);
            }
        }

        Ok(best)
    }
}

/// Integer pixel rectangle (x, y, width, height) covering a quad,
/// or `None` when it is degenerate
fn crop_rect(quad: &Quad) -> Option<(u32, u32, u32, u32)> {
    let xs = quad.iter().map(|p| p[0]);
    let ys = quad.iter().map(|p| p[1]);
    let x0 = xs.clone().fold(f64::INFINITY, f64::min).floor().max(0.0);
    let x1 = xs.fold(f64::NEG_INFINITY, f64::max).ceil();
    let y0 = ys.clone().fold(f64::INFINITY, f64::min).floor().max(0.0);
    let y1 = ys.fold(f64::NEG_INFINITY, f64::max).ceil();

    let width = (x1 - x0) as u32;
    let height = (y1 - y0) as u32;
    (width > 0 && height > 0).then_some((x0 as u32, y0 as u32, width, height))
}

impl OcrEngine for PaddleOcrEngine {
    fn languages(&self) -> &[String] {
        &self.languages
    }

    fn read_text(&self, image_path: &Path) -> Result<Vec<RawRegion>> {
        let started = Instant::now();
        let (image, info) = load_image_file(image_path)?;
        debug!("Decoded image: {}x{}, {} bytes", info.width, info.height, info.size_bytes);

        let (tensor, letterbox) = preprocess_for_detection(&image);
        let boxes = self.detector.detect(&tensor)?;

        let mut regions = Vec::with_capacity(boxes.len());
        for text_box in &boxes {
            let quad = text_box.to_original_quad(&letterbox);
            let Some((x, y, w, h)) = crop_rect(&quad) else {
                continue;
            };
            let crop = image.crop_imm(x, y, w, h);
            if let Some(reading) = self.recognize_crop(&crop)? {
                regions.push(RawRegion::new(quad, reading.text, reading.confidence as f64));
            }
        }

        info!(
            "OCR complete: {} regions from {} boxes, {}ms",
            regions.len(),
            boxes.len(),
            started.elapsed().as_millis()
        );
        Ok(regions)
    }
}

/// Builds `PaddleOcrEngine`s from a model directory
#[derive(Debug, Clone)]
pub struct PaddleOcrFactory {
    model_dir: PathBuf,
}

impl PaddleOcrFactory {
    pub fn new(model_dir: impl Into<PathBuf>) -> Self {
        Self {
            model_dir: model_dir.into(),
        }
    }
}

#[async_trait]
impl EngineFactory for PaddleOcrFactory {
    async fn build(&self, languages: &[String]) -> Result<Arc<dyn OcrEngine>> {
        let model_dir = self.model_dir.clone();
        let languages = languages.to_vec();
        // Session creation is CPU-heavy; keep it off the async workers
        let engine = tokio::task::spawn_blocking(move || PaddleOcrEngine::load(&model_dir, &languages))
            .await
            .context("OCR engine loader task failed")??;
        Ok(Arc::new(engine))
    }
}
