// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! PaddleOCR integration for text extraction from images
//!
//! CPU-only OCR using PaddleOCR ONNX models.
//!
//! Components:
//! - `detection` - Text region detection (DB probability map)
//! - `recognition` - CTC text recognition, one model per language
//! - `preprocessing` - Image preprocessing for both models
//! - `model` - Combined pipeline implementing `OcrEngine`

pub mod detection;
pub mod model;
pub mod preprocessing;
pub mod recognition;

pub use detection::{DetectionParams, OcrDetectionModel, TextBox};
pub use model::{PaddleOcrEngine, PaddleOcrFactory};
pub use recognition::{OcrRecognitionModel, RecognizedText};
