// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! OCR engine seam, the PaddleOCR implementation behind it, and image helpers

pub mod engine;
pub mod image_utils;
pub mod ocr;

pub use engine::{EngineAccessor, EngineFactory, OcrEngine, Quad, RawRegion};
pub use image_utils::{decode_image_bytes, detect_format, load_image_file, ImageError, ImageInfo};
pub use ocr::{PaddleOcrEngine, PaddleOcrFactory};
