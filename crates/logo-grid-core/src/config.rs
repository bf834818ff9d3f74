use serde::{Deserialize, Serialize};

use crate::error::{LogoGridError, Result};
use crate::model::Size;

/// Grid layout configuration.
/// Key notes:
///   - every cell is `cell_width x cell_height`; logos are scaled to fit and centered inside
///   - `cell_padding` separates columns and is also the left/right margin of the canvas
///   - `row_padding` and `outer_vertical_padding` are signed; negative values overlap rows
///     or pull the grid past the top/bottom edge
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GridConfig {
    /// Cell width in pixels.
    pub cell_width: u32,
    /// Cell height in pixels.
    pub cell_height: u32,
    /// Pixels between columns and on the left/right edges.
    pub cell_padding: i32,
    /// Number of rows (columns are derived from the input count).
    pub rows: u32,
    /// Pixels between rows (may be negative).
    pub row_padding: i32,
    /// Pixels above the first row and below the last row (may be negative).
    pub outer_vertical_padding: i32,

    /// Trim transparent borders (alpha <= trim_threshold) before scaling.
    #[serde(default = "default_trim")]
    pub trim: bool,
    #[serde(default)]
    pub trim_threshold: u8,
    /// Opaque canvas color; transparent logo pixels flatten against it.
    #[serde(default = "default_background")]
    pub background: [u8; 3],

    /// Prepare cells on the rayon pool when feature "parallel" is on.
    #[serde(default)]
    pub parallel: bool,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            cell_width: 450,
            cell_height: 300,
            cell_padding: 50,
            rows: 2,
            row_padding: -50,
            outer_vertical_padding: 0,
            trim: default_trim(),
            trim_threshold: 0,
            background: default_background(),
            parallel: false,
        }
    }
}

impl GridConfig {
    /// Validates the parameters that do not depend on the input count.
    ///
    /// Returns an error if the cell has a zero dimension or `rows` is zero.
    pub fn validate(&self) -> Result<()> {
        if self.cell_width == 0 || self.cell_height == 0 {
            return Err(LogoGridError::InvalidConfig(format!(
                "cell size must be positive, got {}x{}",
                self.cell_width, self.cell_height
            )));
        }
        if self.rows == 0 {
            return Err(LogoGridError::InvalidConfig(
                "rows must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Number of columns needed to hold `count` cells in `rows` rows (ceiling division).
    pub fn columns_for(&self, count: usize) -> u32 {
        let rows = self.rows.max(1) as usize;
        count.div_ceil(rows) as u32
    }

    /// Computes the canvas size for `count` cells.
    ///
    /// `width = cell_w * cols + pad * (cols - 1) + 2 * pad`
    /// `height = cell_h * rows + row_pad * (rows - 1) + 2 * outer_pad`
    ///
    /// Fails with `InvalidConfig` when either total is not positive or does not fit in `u32`.
    pub fn canvas_size(&self, count: usize) -> Result<Size> {
        self.validate()?;
        if count == 0 {
            return Err(LogoGridError::Empty);
        }
        let cols = self.columns_for(count) as i64;
        let rows = self.rows as i64;
        let pad = self.cell_padding as i64;
        let width = self.cell_width as i64 * cols + pad * (cols - 1) + 2 * pad;
        let height = self.cell_height as i64 * rows
            + self.row_padding as i64 * (rows - 1)
            + 2 * self.outer_vertical_padding as i64;

        if width <= 0 || height <= 0 {
            return Err(LogoGridError::InvalidConfig(format!(
                "padding leaves no canvas: {}x{} for {} column(s) and {} row(s)",
                width, height, cols, rows
            )));
        }
        if width > u32::MAX as i64 || height > u32::MAX as i64 {
            return Err(LogoGridError::InvalidConfig(format!(
                "canvas {}x{} exceeds the maximum image size",
                width, height
            )));
        }
        Ok(Size::new(width as u32, height as u32))
    }

    /// Top-left corner of cell `index` on the canvas. May be negative when paddings are.
    pub fn cell_origin(&self, index: usize, columns: u32) -> (i64, i64) {
        let columns = columns.max(1) as usize;
        let row = (index / columns) as i64;
        let col = (index % columns) as i64;
        let x = col * (self.cell_width as i64 + self.cell_padding as i64) + self.cell_padding as i64;
        let y = row * (self.cell_height as i64 + self.row_padding as i64)
            + self.outer_vertical_padding as i64;
        (x, y)
    }

    pub fn cell_size(&self) -> Size {
        Size::new(self.cell_width, self.cell_height)
    }
}

fn default_trim() -> bool {
    true
}
fn default_background() -> [u8; 3] {
    [255, 255, 255]
}

/// Builder for `GridConfig` for ergonomic construction.
#[derive(Debug, Default, Clone)]
pub struct GridConfigBuilder {
    cfg: GridConfig,
}

impl GridConfigBuilder {
    pub fn new() -> Self {
        Self {
            cfg: GridConfig::default(),
        }
    }
    pub fn with_cell_size(mut self, w: u32, h: u32) -> Self {
        self.cfg.cell_width = w;
        self.cfg.cell_height = h;
        self
    }
    pub fn cell_padding(mut self, v: i32) -> Self {
        self.cfg.cell_padding = v;
        self
    }
    pub fn rows(mut self, v: u32) -> Self {
        self.cfg.rows = v;
        self
    }
    pub fn row_padding(mut self, v: i32) -> Self {
        self.cfg.row_padding = v;
        self
    }
    pub fn outer_vertical_padding(mut self, v: i32) -> Self {
        self.cfg.outer_vertical_padding = v;
        self
    }
    pub fn trim(mut self, v: bool) -> Self {
        self.cfg.trim = v;
        self
    }
    pub fn trim_threshold(mut self, v: u8) -> Self {
        self.cfg.trim_threshold = v;
        self
    }
    pub fn background(mut self, v: [u8; 3]) -> Self {
        self.cfg.background = v;
        self
    }
    pub fn parallel(mut self, v: bool) -> Self {
        self.cfg.parallel = v;
        self
    }
    pub fn build(self) -> GridConfig {
        self.cfg
    }
}

impl GridConfig {
    /// Create a fluent builder for `GridConfig`.
    pub fn builder() -> GridConfigBuilder {
        GridConfigBuilder::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_canvas_for_four_logos() {
        let cfg = GridConfig::default();
        assert_eq!(cfg.columns_for(4), 2);
        assert_eq!(cfg.canvas_size(4).unwrap(), Size::new(1050, 550));
    }

    #[test]
    fn single_row_single_column() {
        let cfg = GridConfig::builder()
            .with_cell_size(100, 80)
            .cell_padding(10)
            .rows(1)
            .row_padding(-30)
            .outer_vertical_padding(5)
            .build();
        // (cols - 1) and (rows - 1) collapse to zero
        assert_eq!(cfg.canvas_size(1).unwrap(), Size::new(120, 90));
    }

    #[test]
    fn very_negative_outer_padding_is_rejected() {
        let cfg = GridConfig::builder()
            .with_cell_size(100, 100)
            .rows(1)
            .outer_vertical_padding(-50)
            .build();
        match cfg.canvas_size(2) {
            Err(LogoGridError::InvalidConfig(_)) => {}
            other => panic!("expected InvalidConfig, got {:?}", other),
        }
    }

    #[test]
    fn zero_rows_is_rejected() {
        let cfg = GridConfig {
            rows: 0,
            ..Default::default()
        };
        assert!(matches!(cfg.validate(), Err(LogoGridError::InvalidConfig(_))));
    }

    #[test]
    fn cell_origin_follows_row_major_order() {
        let cfg = GridConfig::default();
        assert_eq!(cfg.cell_origin(0, 2), (50, 0));
        assert_eq!(cfg.cell_origin(1, 2), (550, 0));
        assert_eq!(cfg.cell_origin(2, 2), (50, 250));
    }
}
