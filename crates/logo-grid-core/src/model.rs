use serde::{Deserialize, Serialize};

/// Width/height pair in pixels.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Size {
    pub w: u32,
    pub h: u32,
}

impl Size {
    pub fn new(w: u32, h: u32) -> Self {
        Self { w, h }
    }
    pub fn area(&self) -> u64 {
        self.w as u64 * self.h as u64
    }
    pub fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }
}

/// Axis-aligned rectangle (pixels). `x,y` is top-left; `w,h` are sizes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }
    /// Inclusive right edge coordinate (`x + w - 1`).
    pub fn right(&self) -> u32 {
        self.x + self.w.saturating_sub(1)
    }
    /// Inclusive bottom edge coordinate (`y + h - 1`).
    pub fn bottom(&self) -> u32 {
        self.y + self.h.saturating_sub(1)
    }
    pub fn size(&self) -> Size {
        Size::new(self.w, self.h)
    }
}

/// Cell rectangle on the canvas. Signed because negative paddings can push cells past an edge.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CanvasRect {
    pub x: i64,
    pub y: i64,
    pub w: u32,
    pub h: u32,
}

/// Geometry of one input within the grid.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CellPlacement {
    /// Position in the input sequence.
    pub index: usize,
    pub key: String,
    pub row: u32,
    pub col: u32,
    /// Destination of the whole cell on the canvas.
    pub cell: CanvasRect,
    /// Content bounds within the original image (the whole image when not trimmed).
    pub source: Rect,
    /// Original (untrimmed) image size.
    pub source_size: Size,
    /// True if trimming removed any border.
    pub trimmed: bool,
    /// Uniform scale applied to the trimmed image.
    pub scale: f64,
    /// Size of the logo after scaling; fits inside the cell.
    pub fitted: Size,
    /// Top-left of the fitted logo relative to the cell.
    pub offset: (u32, u32),
}

impl CellPlacement {
    /// Absolute canvas rectangle covered by the fitted logo.
    pub fn logo_rect(&self) -> CanvasRect {
        CanvasRect {
            x: self.cell.x + self.offset.0 as i64,
            y: self.cell.y + self.offset.1 as i64,
            w: self.fitted.w,
            h: self.fitted.h,
        }
    }
}

/// Layout-level metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Meta {
    /// Schema version for exported layout JSON; current: "1".
    pub schema_version: String,
    pub app: String,
    pub version: String,
    pub cell_size: Size,
    pub cell_padding: i32,
    pub row_padding: i32,
    pub outer_vertical_padding: i32,
    pub trim_mode: String,
    pub background_color: [u8; 3],
}

/// Complete geometry of a grid composition, without pixel data.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GridLayout {
    pub canvas: Size,
    pub columns: u32,
    pub rows: u32,
    pub cells: Vec<CellPlacement>,
    pub meta: Meta,
}

/// Statistics about how a grid uses its canvas.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GridStats {
    pub num_cells: usize,
    pub columns: u32,
    pub rows: u32,
    /// Rows holding at least one cell; less than `rows` when there are more rows than inputs.
    pub rows_used: u32,
    pub canvas_area: u64,
    /// Sum of fitted logo areas.
    pub logo_area: u64,
    /// logo_area / canvas_area. Can exceed 1.0 with overlapping rows.
    pub coverage: f64,
    pub num_trimmed: usize,
}

impl GridLayout {
    /// Computes usage statistics for this layout.
    pub fn stats(&self) -> GridStats {
        let canvas_area = self.canvas.area();
        let logo_area: u64 = self.cells.iter().map(|c| c.fitted.area()).sum();
        let rows_used = self.cells.iter().map(|c| c.row + 1).max().unwrap_or(0);
        let num_trimmed = self.cells.iter().filter(|c| c.trimmed).count();
        let coverage = if canvas_area > 0 {
            logo_area as f64 / canvas_area as f64
        } else {
            0.0
        };
        GridStats {
            num_cells: self.cells.len(),
            columns: self.columns,
            rows: self.rows,
            rows_used,
            canvas_area,
            logo_area,
            coverage,
            num_trimmed,
        }
    }
}

impl GridStats {
    /// Returns a human-readable summary of the statistics.
    pub fn summary(&self) -> String {
        format!(
            "Cells: {}, Grid: {}x{} ({} row(s) used), Canvas Area: {} px², Logo Area: {} px², Coverage: {:.2}%, Trimmed: {}",
            self.num_cells,
            self.columns,
            self.rows,
            self.rows_used,
            self.canvas_area,
            self.logo_area,
            self.coverage * 100.0,
            self.num_trimmed,
        )
    }

    /// Canvas pixels not covered by any logo (0 when rows overlap enough to exceed the canvas).
    pub fn empty_area(&self) -> u64 {
        self.canvas_area.saturating_sub(self.logo_area)
    }
}
