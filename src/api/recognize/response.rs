// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Recognition response types

use serde::{Deserialize, Serialize};

use crate::vision::{Quad, RawRegion};

/// Axis-aligned box enclosing a region's quadrilateral
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct BoundingBox {
    pub x0: i64,
    pub y0: i64,
    pub x1: i64,
    pub y1: i64,
}

impl BoundingBox {
    /// Envelope of a top-left, top-right, bottom-right, bottom-left quad.
    /// Left/top edges take the min of their corners, right/bottom the max;
    /// coordinates are truncated toward zero.
    pub fn enclosing(quad: &Quad) -> Self {
        let [tl, tr, br, bl] = quad;
        Self {
            x0: tl[0].min(bl[0]) as i64,
            y0: tl[1].min(tr[1]) as i64,
            x1: tr[0].max(br[0]) as i64,
            y1: bl[1].max(br[1]) as i64,
        }
    }
}

/// A recognized word with its location
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Word {
    pub text: String,
    /// Confidence score (0.0-1.0)
    pub confidence: f64,
    pub bbox: BoundingBox,
}

impl From<&RawRegion> for Word {
    fn from(region: &RawRegion) -> Self {
        Self {
            text: region.text.clone(),
            confidence: region.confidence,
            bbox: BoundingBox::enclosing(&region.quad),
        }
    }
}

/// Body of a successful POST /recognize
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecognitionResponse {
    /// All region strings joined by single spaces, in engine order
    pub text: String,
    pub words: Vec<Word>,
}

impl RecognitionResponse {
    pub fn from_regions(regions: &[RawRegion]) -> Self {
        let words: Vec<Word> = regions.iter().map(Word::from).collect();
        let text = words
            .iter()
            .map(|w| w.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        Self { text, words }
    }
}
