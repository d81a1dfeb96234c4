// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image preprocessing for the PaddleOCR models

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, Rgb, RgbImage};
use ndarray::Array4;

/// Square input side of the detection model
pub const DET_INPUT_SIZE: u32 = 640;

/// Recognition model input height (PP-OCRv4/v5 use 48)
pub const REC_INPUT_HEIGHT: u32 = 48;

/// Maximum width for recognition model input
pub const REC_MAX_WIDTH: u32 = 320;

/// Normalization constants (ImageNet)
pub const MEAN: [f32; 3] = [0.485, 0.456, 0.406];
pub const STD: [f32; 3] = [0.229, 0.224, 0.225];

const PAD_GRAY: Rgb<u8> = Rgb([128, 128, 128]);

/// Geometry of a letterboxed image: how the original was scaled and
/// where it sits inside the padded square.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Letterbox {
    pub scale: f32,
    pub offset_x: u32,
    pub offset_y: u32,
    pub original_width: u32,
    pub original_height: u32,
}

impl Letterbox {
    pub fn new(original_width: u32, original_height: u32, target_size: u32) -> Self {
        if original_width == 0 || original_height == 0 {
            return Self {
                scale: 1.0,
                offset_x: 0,
                offset_y: 0,
                original_width,
                original_height,
            };
        }

        let scale = (target_size as f32 / original_width as f32)
            .min(target_size as f32 / original_height as f32);
        let (new_w, new_h) = Self::scaled_dims(original_width, original_height, scale);

        Self {
            scale,
            offset_x: (target_size - new_w.min(target_size)) / 2,
            offset_y: (target_size - new_h.min(target_size)) / 2,
            original_width,
            original_height,
        }
    }

    fn scaled_dims(w: u32, h: u32, scale: f32) -> (u32, u32) {
        (
            ((w as f32 * scale).round() as u32).max(1),
            ((h as f32 * scale).round() as u32).max(1),
        )
    }

    /// Map a point from model space back to the original image,
    /// clamped to the image bounds.
    pub fn map_to_original(&self, x: f32, y: f32) -> (f32, f32) {
        let orig_x = (x - self.offset_x as f32) / self.scale;
        let orig_y = (y - self.offset_y as f32) / self.scale;
        (
            orig_x.clamp(0.0, self.original_width as f32),
            orig_y.clamp(0.0, self.original_height as f32),
        )
    }
}

/// Letterbox the image into a gray-padded square of `target_size`
pub fn letterbox(image: &DynamicImage, target_size: u32) -> (RgbImage, Letterbox) {
    let (orig_w, orig_h) = image.dimensions();
    let info = Letterbox::new(orig_w, orig_h, target_size);
    let mut canvas = RgbImage::from_pixel(target_size, target_size, PAD_GRAY);

    if orig_w == 0 || orig_h == 0 {
        return (canvas, info);
    }

    let (new_w, new_h) = Letterbox::scaled_dims(orig_w, orig_h, info.scale);
    let resized = image
        .resize_exact(new_w, new_h, FilterType::Lanczos3)
        .to_rgb8();
    image::imageops::replace(
        &mut canvas,
        &resized,
        info.offset_x as i64,
        info.offset_y as i64,
    );

    (canvas, info)
}

/// Convert an RGB image into a normalized NCHW tensor `[1, 3, H, W]`
pub fn to_normalized_tensor(rgb: &RgbImage) -> Array4<f32> {
    let (width, height) = rgb.dimensions();
    let mut tensor = Array4::zeros((1, 3, height as usize, width as usize));

    for (x, y, pixel) in rgb.enumerate_pixels() {
        for c in 0..3 {
            tensor[[0, c, y as usize, x as usize]] = (pixel[c] as f32 / 255.0 - MEAN[c]) / STD[c];
        }
    }

    tensor
}

/// Detection input: letterboxed square tensor plus the geometry needed to
/// map detections back onto the original image
pub fn preprocess_for_detection(image: &DynamicImage) -> (Array4<f32>, Letterbox) {
    let (canvas, info) = letterbox(image, DET_INPUT_SIZE);
    (to_normalized_tensor(&canvas), info)
}

/// Recognition input: fixed height, aspect-preserving width capped at
/// `REC_MAX_WIDTH`, no padding
pub fn preprocess_for_recognition(crop: &DynamicImage) -> Array4<f32> {
    let (orig_w, orig_h) = crop.dimensions();
    let scale = REC_INPUT_HEIGHT as f32 / orig_h.max(1) as f32;
    let new_width = ((orig_w as f32 * scale).round() as u32).clamp(4, REC_MAX_WIDTH);

    let resized = crop
        .resize_exact(new_width, REC_INPUT_HEIGHT, FilterType::Lanczos3)
        .to_rgb8();
    to_normalized_tensor(&resized)
}
