// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Recognition endpoint module
//!
//! Provides POST /recognize for extracting words from an uploaded image.

pub mod handler;
pub mod request;
pub mod response;

pub use handler::{recognize_handler, DEFAULT_LANGUAGES};
pub use request::{read_image_field, UploadedImage};
pub use response::{BoundingBox, RecognitionResponse, Word};
