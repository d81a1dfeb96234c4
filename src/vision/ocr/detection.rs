// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! PaddleOCR text detection model
//!
//! Runs the DB (Differentiable Binarization) detector and turns its
//! probability map into text boxes in original-image coordinates.

use anyhow::{anyhow, Context, Result};
use ndarray::{Array4, ArrayView2, Axis, Ix2};
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

use super::preprocessing::Letterbox;
use crate::vision::engine::Quad;

/// Post-processing parameters for the probability map
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectionParams {
    /// Pixel probability above which a pixel counts as text
    pub pixel_threshold: f32,
    /// Minimum mean probability for a region to be kept
    pub box_threshold: f32,
    /// Minimum number of pixels in a region
    pub min_pixels: usize,
    /// DB unclip ratio used to grow the shrunk text kernel back out
    pub unclip_ratio: f32,
}

impl Default for DetectionParams {
    fn default() -> Self {
        Self {
            pixel_threshold: 0.3,
            box_threshold: 0.5,
            min_pixels: 10,
            unclip_ratio: 1.5,
        }
    }
}

/// Axis-aligned text box in model (letterboxed) space
#[derive(Debug, Clone, PartialEq)]
pub struct TextBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Mean pixel probability inside the region (0.0-1.0)
    pub score: f32,
}

impl TextBox {
    /// Grow the box on every side by the DB unclip distance
    /// (area * ratio / perimeter)
    pub fn unclip(&self, ratio: f32) -> Self {
        let perimeter = 2.0 * (self.width + self.height);
        if perimeter <= 0.0 {
            return self.clone();
        }
        let d = self.width * self.height * ratio / perimeter;
        Self {
            x: self.x - d,
            y: self.y - d,
            width: self.width + 2.0 * d,
            height: self.height + 2.0 * d,
            score: self.score,
        }
    }

    /// Corner points mapped back onto the original image
    pub fn to_original_quad(&self, letterbox: &Letterbox) -> Quad {
        let corners = [
            (self.x, self.y),
            (self.x + self.width, self.y),
            (self.x + self.width, self.y + self.height),
            (self.x, self.y + self.height),
        ];
        corners.map(|(x, y)| {
            let (ox, oy) = letterbox.map_to_original(x, y);
            [ox as f64, oy as f64]
        })
    }
}

/// Extract text boxes from a 2D probability map
///
/// Regions are 4-connected components above `pixel_threshold`, returned in
/// reading order (top to bottom, then left to right).
pub fn extract_boxes(prob_map: ArrayView2<f32>, params: &DetectionParams) -> Vec<TextBox> {
    let (height, width) = prob_map.dim();
    let mut visited = vec![false; width * height];
    let mut boxes = Vec::new();

    for y in 0..height {
        for x in 0..width {
            if visited[y * width + x] || prob_map[[y, x]] < params.pixel_threshold {
                continue;
            }

            let region = flood_fill(&prob_map, &mut visited, x, y, params.pixel_threshold);
            if region.count < params.min_pixels {
                continue;
            }
            let score = region.sum / region.count as f32;
            if score < params.box_threshold {
                continue;
            }

            let kernel = TextBox {
                x: region.min_x as f32,
                y: region.min_y as f32,
                width: (region.max_x - region.min_x + 1) as f32,
                height: (region.max_y - region.min_y + 1) as f32,
                score,
            };
            boxes.push(kernel.unclip(params.unclip_ratio));
        }
    }

    boxes.sort_by(|a, b| a.y.total_cmp(&b.y).then(a.x.total_cmp(&b.x)));
    boxes
}

struct Region {
    min_x: usize,
    max_x: usize,
    min_y: usize,
    max_y: usize,
    count: usize,
    sum: f32,
}

fn flood_fill(
    prob_map: &ArrayView2<f32>,
    visited: &mut [bool],
    start_x: usize,
    start_y: usize,
    threshold: f32,
) -> Region {
    let (height, width) = prob_map.dim();
    let mut region = Region {
        min_x: start_x,
        max_x: start_x,
        min_y: start_y,
        max_y: start_y,
        count: 0,
        sum: 0.0,
    };
    let mut stack = vec![(start_x, start_y)];

    while let Some((x, y)) = stack.pop() {
        let idx = y * width + x;
        if visited[idx] {
            continue;
        }
        let prob = prob_map[[y, x]];
        if prob < threshold {
            continue;
        }

        visited[idx] = true;
        region.count += 1;
        region.sum += prob;
        region.min_x = region.min_x.min(x);
        region.max_x = region.max_x.max(x);
        region.min_y = region.min_y.min(y);
        region.max_y = region.max_y.max(y);

        if x > 0 {
            stack.push((x - 1, y));
        }
        if x + 1 < width {
            stack.push((x + 1, y));
        }
        if y > 0 {
            stack.push((x, y - 1));
        }
        if y + 1 < height {
            stack.push((x, y + 1));
        }
    }

    region
}

/// PaddleOCR text detection model (CPU-only)
#[derive(Clone)]
pub struct OcrDetectionModel {
    session: Arc<Mutex<Session>>,
    input_name: String,
    params: DetectionParams,
}

impl std::fmt::Debug for OcrDetectionModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OcrDetectionModel")
            .field("input_name", &self.input_name)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

impl OcrDetectionModel {
    /// Load the detection model (det_model.onnx)
    pub fn load<P: AsRef<Path>>(model_path: P) -> Result<Self> {
        let model_path = model_path.as_ref();

        if !model_path.exists() {
            anyhow::bail!("OCR detection model not found: {}", model_path.display());
        }

        info!("Loading OCR detection model from {}", model_path.display());

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
                    "Failed to load OCR detection model from {}",
                    model_path.display()
                )
            })?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .unwrap_or_else(|| "x".to_string());

        debug!("Detection model loaded - input: {}", input_name);

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            input_name,
            params: DetectionParams::default(),
        })
    }

    pub fn with_params(mut self, params: DetectionParams) -> Self {
        self.params = params;
        self
    }

    /// Run detection on a preprocessed `[1, 3, H, W]` tensor.
    /// Boxes are returned in the tensor's coordinate space.
    pub fn detect(&self, input: &Array4<f32>) -> Result<Vec<TextBox>> {
        let shape = input.shape();
        if shape[0] != 1 || shape[1] != 3 {
            anyhow::bail!("Invalid input shape: {:?}, expected [1, 3, H, W]", shape);
        }

        let mut session = self
            .session
            .lock()
            .map_err(|_| anyhow!("OCR detection session lock poisoned"))?;

        let input_value =
            Value::from_array(input.to_owned()).context("Failed to create input tensor")?;

        let outputs = session
            .run(ort::inputs![self.input_name.as_str() => input_value])
            .context("Detection inference failed")?;

        let output = outputs[0]
            .try_extract_array::<f32>()
            .context("Failed to extract output tensor")?;

        // Probability map comes back as [1, 1, H, W] or [1, H, W]
        let mut prob_map = output.view();
        while prob_map.ndim() > 2 {
            prob_map = prob_map.index_axis_move(Axis(0), 0);
        }
        let prob_map = prob_map
            .into_dimensionality::<Ix2>()
            .context("Unexpected detection output shape")?;

        let boxes = extract_boxes(prob_map, &self.params);
        debug!("Detected {} text regions", boxes.len());
        Ok(boxes)
    }
}
