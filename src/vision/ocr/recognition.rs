// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! PaddleOCR text recognition model
//!
//! One instance per language: a CRNN recognizer plus its character keys.

use anyhow::{anyhow, Context, Result};
use ndarray::{Array4, ArrayView2, Axis, Ix2};
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

use super::preprocessing::REC_INPUT_HEIGHT;

/// Recognized text with confidence score
#[derive(Debug, Clone, PartialEq)]
pub struct RecognizedText {
    pub text: String,
    /// Mean per-character probability (0.0-1.0)
    pub confidence: f32,
}

impl RecognizedText {
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Parse a character keys file: one character per line.
///
/// Class 0 of the model output is the CTC blank, so class `i` maps to
/// `keys[i - 1]`. A trailing space class is appended when the file does
/// not already contain one.
pub fn parse_keys(contents: &str) -> Vec<char> {
    let mut keys: Vec<char> = contents
        .lines()
        .filter_map(|line| line.trim_end_matches('\r').chars().next())
        .collect();
    if !keys.contains(&' ') {
        keys.push(' ');
    }
    keys
}

/// Greedy CTC decoding over a `[time, classes]` probability matrix:
/// take the best class per step, collapse repeats, drop blanks.
pub fn ctc_greedy_decode(probs: ArrayView2<f32>, keys: &[char]) -> RecognizedText {
    let mut text = String::new();
    let mut total = 0.0f32;
    let mut emitted = 0usize;
    let mut prev: Option<usize> = None;

    for step in probs.axis_iter(Axis(0)) {
        let (best, best_prob) = step
            .iter()
            .copied()
            .enumerate()
            .fold((0usize, f32::NEG_INFINITY), |acc, (i, p)| {
                if p > acc.1 {
                    (i, p)
                } else {
                    acc
                }
            });

        if best != 0 && prev != Some(best) {
            if let Some(ch) = keys.get(best - 1) {
                text.push(*ch);
                total += best_prob;
                emitted += 1;
            }
        }
        prev = (best != 0).then_some(best);
    }

    let confidence = if emitted == 0 {
        0.0
    } else {
        (total / emitted as f32).clamp(0.0, 1.0)
    };

    RecognizedText {
        text: text.trim().to_string(),
        confidence,
    }
}

/// PaddleOCR text recognition model (CPU-only)
#[derive(Clone)]
pub struct OcrRecognitionModel {
    session: Arc<Mutex<Session>>,
    keys: Arc<Vec<char>>,
    input_name: String,
}

impl std::fmt::Debug for OcrRecognitionModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OcrRecognitionModel")
            .field("keys", &self.keys.len())
            .field("input_name", &self.input_name)
            .finish_non_exhaustive()
    }
}

impl OcrRecognitionModel {
    /// Load a recognizer (`rec_model.onnx`) and its keys file
    pub fn load<P: AsRef<Path>>(model_path: P, keys_path: P) -> Result<Self> {
        let model_path = model_path.as_ref();
        let keys_path = keys_path.as_ref();

        if !model_path.exists() {
            anyhow::bail!("OCR recognition model not found: {}", model_path.display());
        }
        if !keys_path.exists() {
            anyhow::bail!("OCR character keys not found: {}", keys_path.display());
        }

        let keys = std::fs::read_to_string(keys_path)
            .with_context(|| format!("Failed to read keys file: {}", keys_path.display()))?;
        let keys = parse_keys(&keys);
        info!(
            "Loading OCR recognition model from {} ({} keys)",
            model_path.display(),
            keys.len()
        );

        let session = Session::builder()
            .context("Failed to create session builder")?
            .with_execution_providers([CPUExecutionProvider::default().build()])
            .context("Failed to set CPU execution provider")?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .context("Failed to set optimization level")?
            .with_intra_threads(4)
            .context("Failed to set intra threads")?
            .commit_from_file(model_path)
            .with_context(|| {
                format!(
                    "Failed to load OCR recognition model from {}",
                    model_path.display()
                )
            })?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .unwrap_or_else(|| "x".to_string());

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            keys: Arc::new(keys),
            input_name,
        })
    }

    pub fn key_count(&self) -> usize {
        self.keys.len()
    }

    /// Recognize a preprocessed `[1, 3, 48, W]` crop
    pub fn recognize(&self, input: &Array4<f32>) -> Result<RecognizedText> {
        let shape = input.shape();
        if shape[0] != 1 || shape[1] != 3 || shape[2] != REC_INPUT_HEIGHT as usize || shape[3] < 4
        {
            anyhow::bail!(
                "Invalid input shape: {:?}, expected [1, 3, {}, W>=4]",
                shape,
                REC_INPUT_HEIGHT
            );
        }

        let mut session = self
            .session
            .lock()
            .map_err(|_| anyhow!("OCR recognition session lock poisoned"))?;

        let input_value =
            Value::from_array(input.to_owned()).context("Failed to create input tensor")?;

        let outputs = session
            .run(ort::inputs![self.input_name.as_str() => input_value])
            .context("Recognition inference failed")?;

        let output = outputs[0]
            .try_extract_array::<f32>()
            .context("Failed to extract output tensor")?;
        debug!("Recognition output shape: {:?}", output.shape());

        // [batch, time, classes] or [time, classes]
        let mut probs = output.view();
        while probs.ndim() > 2 {
            probs = probs.index_axis_move(Axis(0), 0);
        }
        let probs = probs
            .into_dimensionality::<Ix2>()
            .context("Unexpected recognition output shape")?;

        Ok(ctc_greedy_decode(probs, &self.keys))
    }
}
