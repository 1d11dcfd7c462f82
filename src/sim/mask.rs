//! Pixel-accurate hit shapes
//!
//! Collisions are tested pixel against pixel, so a rounded boulder does not
//! kill a player that only grazes its bounding box.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Alpha values above this count as solid
pub const ALPHA_THRESHOLD: u8 = 127;

/// Largest configurable side of a hit shape, in pixels
pub const MAX_SHAPE_SIDE: u32 = 4096;

fn area(width: u32, height: u32) -> usize {
    width as usize * height as usize
}

/// A width x height grid of solid/empty pixels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    width: u32,
    height: u32,
    bits: Vec<bool>,
}

impl Mask {
    /// Fully solid rectangle
    pub fn filled(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bits: vec![true; area(width, height)],
        }
    }

    /// Ellipse inscribed in a width x height box
    pub fn ellipse(width: u32, height: u32) -> Self {
        let rx = width as f32 / 2.0;
        let ry = height as f32 / 2.0;
        let mut bits = Vec::with_capacity(area(width, height));
        for y in 0..height {
            for x in 0..width {
                let dx = (x as f32 + 0.5 - rx) / rx;
                let dy = (y as f32 + 0.5 - ry) / ry;
                bits.push(dx * dx + dy * dy <= 1.0);
            }
        }
        Self {
            width,
            height,
            bits,
        }
    }

    /// Build from text rows where `#` is solid. Returns `None` for ragged rows.
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Option<Self> {
        let height = rows.len() as u32;
        let width = rows.first().map(|r| r.as_ref().chars().count()).unwrap_or(0) as u32;
        let mut bits = Vec::with_capacity(area(width, height));
        for row in rows {
            let row = row.as_ref();
            if row.chars().count() as u32 != width {
                return None;
            }
            bits.extend(row.chars().map(|c| c == '#'));
        }
        Some(Self {
            width,
            height,
            bits,
        })
    }

    /// Build from a row-major alpha channel (as a renderer would hand over)
    pub fn from_alpha(width: u32, height: u32, alpha: &[u8], threshold: u8) -> Option<Self> {
        if alpha.len() != area(width, height) {
            return None;
        }
        Some(Self {
            width,
            height,
            bits: alpha.iter().map(|&a| a > threshold).collect(),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Whether the pixel at (x, y) is solid; out of range reads as empty
    pub fn get(&self, x: u32, y: u32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        self.bits[y as usize * self.width as usize + x as usize]
    }

    /// Number of solid pixels
    pub fn count(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }

    /// True if any solid pixel of `other`, placed with its top-left corner at
    /// `offset` relative to this mask's top-left corner, lands on a solid
    /// pixel of this mask
    pub fn overlaps(&self, other: &Mask, offset: (i32, i32)) -> bool {
        let (ox, oy) = offset;
        let x0 = ox.max(0);
        let y0 = oy.max(0);
        let x1 = (ox + other.width as i32).min(self.width as i32);
        let y1 = (oy + other.height as i32).min(self.height as i32);
        if x0 >= x1 || y0 >= y1 {
            return false;
        }

        for y in y0..y1 {
            for x in x0..x1 {
                if self.get(x as u32, y as u32) && other.get((x - ox) as u32, (y - oy) as u32) {
                    return true;
                }
            }
        }
        false
    }
}

/// Shape description as it appears in configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ShapeSpec {
    Rect { width: u32, height: u32 },
    Ellipse { width: u32, height: u32 },
    Pixels { rows: Vec<String> },
}

impl ShapeSpec {
    /// Width used by the spawner's feasibility math
    pub fn width(&self) -> u32 {
        match self {
            ShapeSpec::Rect { width, .. } | ShapeSpec::Ellipse { width, .. } => *width,
            ShapeSpec::Pixels { rows } => {
                rows.first().map(|r| r.chars().count()).unwrap_or(0) as u32
            }
        }
    }

    /// Rasterize into a mask, rejecting empty or ragged shapes
    pub fn build(&self, name: &str) -> Result<Mask, ConfigError> {
        let (width, height) = match self {
            ShapeSpec::Rect { width, height } | ShapeSpec::Ellipse { width, height } => (*width, *height),
            ShapeSpec::Pixels { rows } => (self.width(), rows.len().min(u32::MAX as usize) as u32),
        };
        if width > MAX_SHAPE_SIDE || height > MAX_SHAPE_SIDE {
            return Err(ConfigError::ShapeTooLarge {
                name: name.to_string(),
                width,
                height,
                max: MAX_SHAPE_SIDE,
            });
        }

        let mask = match self {
            ShapeSpec::Rect { width, height } => Mask::filled(*width, *height),
            ShapeSpec::Ellipse { width, height } => Mask::ellipse(*width, *height),
            ShapeSpec::Pixels { rows } => {
                let expected = self.width() as usize;
                if let Some((row, r)) = rows
                    .iter()
                    .enumerate()
                    .find(|(_, r)| r.chars().count() != expected)
                {
                    return Err(ConfigError::RaggedShape {
                        name: name.to_string(),
                        row,
                        expected,
                        actual: r.chars().count(),
                    });
                }
                Mask::from_rows(rows).ok_or_else(|| ConfigError::EmptyShape {
                    name: name.to_string(),
                })?
            }
        };

        if mask.count() == 0 {
            return Err(ConfigError::EmptyShape {
                name: name.to_string(),
            });
        }
        Ok(mask)
    }
}
