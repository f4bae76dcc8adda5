//! Grid Layout Planner
//!
//! Tiles are square and sized from the canvas width alone. Leftover area is
//! spread as gaps, outer margins included. When `rows * tile` exceeds the
//! canvas height the vertical gap collapses to zero and the bottom rows
//! overflow; this is reported by validation, never corrected here.

use serde::{Deserialize, Serialize};

use crate::config::{CanvasSpec, GridSpec};
use crate::pipeline::MosaicError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Spacing {
    pub gap_x: f64,
    pub gap_y: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Placement {
    pub index: usize,
    pub row: u32,
    pub col: u32,
    pub x: u32,
    pub y: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GridLayout {
    pub tile_size: u32,
    pub spacing: Spacing,
    pub placements: Vec<Placement>,
}

pub fn tile_size(canvas: &CanvasSpec, grid: &GridSpec) -> u32 {
    if grid.columns == 0 {
        return 0;
    }
    canvas.width / grid.columns
}

pub fn spacing(canvas: &CanvasSpec, grid: &GridSpec, tile: u32) -> Spacing {
    let remaining_x = (canvas.width as i64 - grid.columns as i64 * tile as i64).max(0);
    let remaining_y = (canvas.height as i64 - grid.rows as i64 * tile as i64).max(0);
    Spacing {
        gap_x: remaining_x as f64 / (grid.columns as f64 + 1.0),
        gap_y: remaining_y as f64 / (grid.rows as f64 + 1.0),
    }
}

/// Offset of cell `n` along one axis
fn offset(gap: f64, n: u32, tile: u32) -> u32 {
    (gap + n as f64 * (tile as f64 + gap)).round() as u32
}

pub fn plan_grid(
    canvas: &CanvasSpec,
    grid: &GridSpec,
    required_count: usize,
) -> Result<GridLayout, MosaicError> {
    if grid.cells() != required_count as u64 {
        return Err(MosaicError::ConfigMismatch {
            columns: grid.columns,
            rows: grid.rows,
            required: required_count,
        });
    }
    if grid.columns == 0 || grid.rows == 0 {
        return Err(MosaicError::InvalidConfig(
            "grid columns and rows must be positive".to_string(),
        ));
    }

    let tile = tile_size(canvas, grid);
    if tile == 0 {
        return Err(MosaicError::InvalidConfig(format!(
            "canvas width {} is too narrow for {} columns",
            canvas.width, grid.columns
        )));
    }

    let spacing = spacing(canvas, grid, tile);
    let placements = (0..required_count)
        .map(|index| {
            let row = (index / grid.columns as usize) as u32;
            let col = (index % grid.columns as usize) as u32;
            Placement {
                index,
                row,
                col,
                x: offset(spacing.gap_x, col, tile),
                y: offset(spacing.gap_y, row, tile),
            }
        })
        .collect();

    Ok(GridLayout { tile_size: tile, spacing, placements })
}
