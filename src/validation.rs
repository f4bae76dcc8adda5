//! Config Validation - Rule/Policy Separation
//!
//! Rules produce structured violations.
//! Only `Error` severity invalidates a config; warnings and info are logged.

use serde::{Deserialize, Serialize};

use crate::config::MosaicConfig;
use crate::layout::tile_size;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ViolationSeverity {
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationViolation {
    pub rule: String,
    pub severity: ViolationSeverity,
    pub message: String,
    pub expected: Option<String>,
    pub actual: Option<String>,
    pub remediation: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub violations: Vec<ValidationViolation>,
}

impl ValidationResult {
    pub fn has_errors(&self) -> bool {
        self.violations.iter().any(|v| v.severity == ViolationSeverity::Error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &ValidationViolation> {
        self.violations.iter().filter(|v| v.severity == ViolationSeverity::Error)
    }

    pub fn violated(&self, rule: &str) -> bool {
        self.errors().any(|v| v.rule == rule)
    }
}

pub trait ValidationRule {
    fn name(&self) -> &'static str;
    fn validate(&self, config: &MosaicConfig) -> Vec<ValidationViolation>;
}

// --- Concrete Rules ---

pub struct CanvasRule;

impl ValidationRule for CanvasRule {
    fn name(&self) -> &'static str { "canvas_dimensions" }

    fn validate(&self, config: &MosaicConfig) -> Vec<ValidationViolation> {
        let canvas = config.canvas;
        if canvas.width == 0 || canvas.height == 0 {
            vec![ValidationViolation {
                rule: self.name().to_string(),
                severity: ViolationSeverity::Error,
                message: "Canvas dimensions must be positive".to_string(),
                expected: Some("width > 0 and height > 0".to_string()),
                actual: Some(format!("{}x{}", canvas.width, canvas.height)),
                remediation: vec!["Set canvas.width and canvas.height".to_string()],
            }]
        } else {
            vec![]
        }
    }
}

pub struct GridCountRule;

impl ValidationRule for GridCountRule {
    fn name(&self) -> &'static str { "grid_count" }

    fn validate(&self, config: &MosaicConfig) -> Vec<ValidationViolation> {
        let grid = config.grid;
        if grid.columns == 0 || grid.rows == 0 || grid.cells() != config.required_count as u64 {
            vec![ValidationViolation {
                rule: self.name().to_string(),
                severity: ViolationSeverity::Error,
                message: "Grid does not match required image count".to_string(),
                expected: Some(format!("{} cells", config.required_count)),
                actual: Some(format!("{}x{} = {}", grid.columns, grid.rows, grid.cells())),
                remediation: vec![
                    "Adjust grid.columns and grid.rows".to_string(),
                    "Or pass a matching --count".to_string(),
                ],
            }]
        } else {
            vec![]
        }
    }
}

pub struct TileSizeRule;

impl ValidationRule for TileSizeRule {
    fn name(&self) -> &'static str { "tile_size" }

    fn validate(&self, config: &MosaicConfig) -> Vec<ValidationViolation> {
        if config.grid.columns == 0 || config.canvas.width == 0 {
            return vec![];
        }
        if tile_size(&config.canvas, &config.grid) == 0 {
            vec![ValidationViolation {
                rule: self.name().to_string(),
                severity: ViolationSeverity::Error,
                message: "Canvas too narrow for column count".to_string(),
                expected: Some(format!("width >= {}", config.grid.columns)),
                actual: Some(config.canvas.width.to_string()),
                remediation: vec!["Reduce grid.columns".to_string()],
            }]
        } else {
            vec![]
        }
    }
}

/// The colour is spliced into the filter graph verbatim: only a plain colour
/// name or a `0x`/`#` hex value is accepted.
pub struct BackgroundRule;

pub fn is_safe_colour(colour: &str) -> bool {
    let hex = colour
        .strip_prefix("0x")
        .or_else(|| colour.strip_prefix("0X"))
        .or_else(|| colour.strip_prefix('#'));
    match hex {
        Some(digits) => {
            matches!(digits.len(), 6 | 8) && digits.chars().all(|c| c.is_ascii_hexdigit())
        }
        None => !colour.is_empty() && colour.chars().all(|c| c.is_ascii_alphabetic()),
    }
}

impl ValidationRule for BackgroundRule {
    fn name(&self) -> &'static str { "background" }

    fn validate(&self, config: &MosaicConfig) -> Vec<ValidationViolation> {
        if is_safe_colour(&config.background) {
            return vec![];
        }
        vec![ValidationViolation {
            rule: self.name().to_string(),
            severity: ViolationSeverity::Error,
            message: "Background must be a colour name or hex value".to_string(),
            expected: Some("e.g. black, 0x202020, #202020".to_string()),
            actual: Some(config.background.clone()),
            remediation: vec!["Set background to a plain colour".to_string()],
        }]
    }
}

/// Tiles are sized from width only; rows may overflow or leave wide bands.
pub struct VerticalFitRule;

impl ValidationRule for VerticalFitRule {
    fn name(&self) -> &'static str { "vertical_fit" }

    fn validate(&self, config: &MosaicConfig) -> Vec<ValidationViolation> {
        let tile = tile_size(&config.canvas, &config.grid) as u64;
        if tile == 0 || config.grid.rows == 0 {
            return vec![];
        }

        let needed = config.grid.rows as u64 * tile;
        let height = config.canvas.height as u64;
        if needed > height {
            return vec![ValidationViolation {
                rule: self.name().to_string(),
                severity: ViolationSeverity::Warning,
                message: "Rows overflow canvas height; bottom tiles will be clipped".to_string(),
                expected: Some(format!("height >= {}", needed)),
                actual: Some(height.to_string()),
                remediation: vec!["Increase canvas.height or reduce grid.rows".to_string()],
            }];
        }

        let gap = (height - needed) / (config.grid.rows as u64 + 1);
        if gap > tile {
            return vec![ValidationViolation {
                rule: self.name().to_string(),
                severity: ViolationSeverity::Info,
                message: "Vertical gaps are larger than tiles".to_string(),
                expected: Some(format!("gap <= {}", tile)),
                actual: Some(gap.to_string()),
                remediation: vec!["Add rows or reduce canvas.height".to_string()],
            }];
        }
        vec![]
    }
}

/// Validator orchestrates rules
pub struct Validator {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl Validator {
    pub fn new() -> Self {
        Self {
            rules: vec![
                Box::new(CanvasRule),
                Box::new(GridCountRule),
                Box::new(TileSizeRule),
                Box::new(VerticalFitRule),
                Box::new(BackgroundRule),
            ],
        }
    }

    pub fn validate(&self, config: &MosaicConfig) -> ValidationResult {
        let violations: Vec<_> = self.rules.iter()
            .flat_map(|rule| rule.validate(config))
            .collect();
        let valid = !violations.iter().any(|v| v.severity == ViolationSeverity::Error);
        ValidationResult { valid, violations }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}
