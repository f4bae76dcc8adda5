//! Composite Plan Builder
//!
//! A plan is a list of per-input tile transforms followed by a strictly linear
//! overlay chain: every overlay reads the composite produced by the one before
//! it, starting from a solid base layer.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::config::CanvasSpec;
use crate::layout::Placement;
use crate::pipeline::MosaicError;

/// A named intermediate in the compositing graph
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Layer {
    /// Solid background canvas
    Base,
    /// Transformed tile for input `n`
    Tile(usize),
    /// Running composite after overlay `n`
    Composite(usize),
    /// Final composite
    Output,
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Layer::Base => write!(f, "base"),
            Layer::Tile(n) => write!(f, "img{}", n),
            Layer::Composite(n) => write!(f, "tmp{}", n),
            Layer::Output => write!(f, "out"),
        }
    }
}

/// Scale preserving aspect so the short side covers the tile, center-crop to
/// `size`x`size`, square sample aspect.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransformOp {
    pub input: usize,
    pub size: u32,
    pub output: Layer,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OverlayOp {
    pub below: Layer,
    pub tile: Layer,
    pub x: u32,
    pub y: u32,
    pub output: Layer,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompositePlan {
    pub canvas: CanvasSpec,
    pub background: String,
    pub tile_size: u32,
    pub transforms: Vec<TransformOp>,
    pub overlays: Vec<OverlayOp>,
    pub output: Layer,
}

impl CompositePlan {
    pub fn input_count(&self) -> usize {
        self.transforms.len()
    }
}

pub fn build_plan(
    images: &[PathBuf],
    tile_size: u32,
    placements: &[Placement],
    canvas: &CanvasSpec,
    background: &str,
) -> Result<CompositePlan, MosaicError> {
    if images.len() != placements.len() {
        return Err(MosaicError::PlanMismatch {
            images: images.len(),
            placements: placements.len(),
        });
    }

    let transforms = (0..images.len())
        .map(|input| TransformOp {
            input,
            size: tile_size,
            output: Layer::Tile(input),
        })
        .collect();

    let last = placements.len().saturating_sub(1);
    let (output, overlays) = placements.iter().enumerate().fold(
        (Layer::Base, Vec::with_capacity(placements.len())),
        |(below, mut overlays), (i, placement)| {
            let output = if i == last { Layer::Output } else { Layer::Composite(i) };
            overlays.push(OverlayOp {
                below,
                tile: Layer::Tile(i),
                x: placement.x,
                y: placement.y,
                output,
            });
            (output, overlays)
        },
    );

    Ok(CompositePlan {
        canvas: *canvas,
        background: background.to_string(),
        tile_size,
        transforms,
        overlays,
        output,
    })
}
