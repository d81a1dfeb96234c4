// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Multipart upload extraction

use axum::body::Bytes;
use axum_extra::extract::Multipart;

use crate::api::errors::ApiError;

/// Multipart field carrying the image
pub const IMAGE_FIELD: &str = "image";

/// The uploaded image file
#[derive(Debug, Clone)]
pub struct UploadedImage {
    /// Client-supplied filename; never used as a path
    pub filename: String,
    pub bytes: Bytes,
}

/// Pull the `image` file field out of a multipart body
///
/// Only parts with a `filename` parameter count as files. The first
/// matching part wins; other parts are skipped.
pub async fn read_image_field(mut multipart: Multipart) -> Result<UploadedImage, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::MalformedUpload(e.to_string()))?
    {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        let Some(filename) = field.file_name().map(str::to_owned) else {
            continue;
        };
        if filename.is_empty() {
            return Err(ApiError::EmptyFilename);
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::MalformedUpload(e.to_string()))?;
        return Ok(UploadedImage { filename, bytes });
    }

    Err(ApiError::NoImageProvided)
}
