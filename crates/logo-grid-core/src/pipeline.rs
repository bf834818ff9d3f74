use image::{DynamicImage, GenericImageView, Rgb, RgbImage};
use tracing::{debug, instrument, trace};

use crate::compositing::{Fit, fit_to_cell, flatten, paste_opaque, render_cell};
use crate::config::GridConfig;
use crate::error::{LogoGridError, Result};
use crate::model::{CanvasRect, CellPlacement, GridLayout, GridStats, Meta, Rect, Size};
use crate::trim::image_content_bounds;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// In-memory image to place (key + decoded image). The key names the input in
/// layouts and errors, typically its file name.
pub struct InputImage {
    pub key: String,
    pub image: DynamicImage,
}

impl InputImage {
    pub fn new(key: impl Into<String>, image: DynamicImage) -> Self {
        Self {
            key: key.into(),
            image,
        }
    }
}

/// Output of a composition: the layout it followed and the opaque canvas.
pub struct GridOutput {
    pub layout: GridLayout,
    pub image: RgbImage,
}

impl GridOutput {
    /// Convenience for `layout.stats()`.
    pub fn stats(&self) -> GridStats {
        self.layout.stats()
    }
}

/// Trim bounds of one input.
struct Measured {
    source: Rect,
    source_size: Size,
    trimmed: bool,
}

fn measure(index: usize, input: &InputImage, cfg: &GridConfig) -> Result<Measured> {
    let (w, h) = input.image.dimensions();
    let degenerate = || LogoGridError::DegenerateImage {
        index,
        key: input.key.clone(),
    };
    if w == 0 || h == 0 {
        return Err(degenerate());
    }
    let source = if cfg.trim {
        image_content_bounds(&input.image, cfg.trim_threshold).ok_or_else(degenerate)?
    } else {
        Rect::new(0, 0, w, h)
    };
    Ok(Measured {
        source,
        source_size: Size::new(w, h),
        trimmed: (source.w, source.h) != (w, h),
    })
}

#[instrument(skip_all, fields(count = inputs.len()))]
/// Computes the grid geometry for `inputs` without rendering.
///
/// Checks run in this order: configuration, empty input, each image for zero area
/// (after trimming), then the canvas totals.
pub fn plan_grid(inputs: &[InputImage], cfg: &GridConfig) -> Result<GridLayout> {
    cfg.validate()?;
    if inputs.is_empty() {
        return Err(LogoGridError::Empty);
    }

    let measured = inputs
        .iter()
        .enumerate()
        .map(|(i, inp)| measure(i, inp, cfg))
        .collect::<Result<Vec<_>>>()?;

    let canvas = cfg.canvas_size(inputs.len())?;
    let columns = cfg.columns_for(inputs.len());
    let cell_size = cfg.cell_size();

    let cells = measured
        .into_iter()
        .zip(inputs)
        .enumerate()
        .map(|(index, (m, inp))| {
            let fit = fit_to_cell(m.source.size(), cell_size);
            let (x, y) = cfg.cell_origin(index, columns);
            trace!(index, key = %inp.key, x, y, w = fit.size.w, h = fit.size.h, "cell");
            CellPlacement {
                index,
                key: inp.key.clone(),
                row: index as u32 / columns,
                col: index as u32 % columns,
                cell: CanvasRect {
                    x,
                    y,
                    w: cell_size.w,
                    h: cell_size.h,
                },
                source: m.source,
                source_size: m.source_size,
                trimmed: m.trimmed,
                scale: fit.scale,
                fitted: fit.size,
                offset: fit.offset,
            }
        })
        .collect();

    debug!(
        width = canvas.w,
        height = canvas.h,
        columns,
        rows = cfg.rows,
        "planned grid"
    );
    Ok(GridLayout {
        canvas,
        columns,
        rows: cfg.rows,
        cells,
        meta: build_meta(cfg),
    })
}

#[instrument(skip_all, fields(count = inputs.len()))]
/// Composes `inputs` into a single opaque grid image.
///
/// Notes:
/// - Cell `i` lands at row `i / columns`, column `i % columns`; order is never changed.
/// - Cells are pasted in input order, so with negative row padding later rows cover earlier ones.
/// - The result only depends on the inputs and `cfg`.
pub fn compose_grid(inputs: &[InputImage], cfg: &GridConfig) -> Result<GridOutput> {
    let layout = plan_grid(inputs, cfg)?;
    let cells = render_cells(inputs, &layout, cfg);

    let mut canvas = RgbImage::from_pixel(layout.canvas.w, layout.canvas.h, Rgb(cfg.background));
    for (placement, cell) in layout.cells.iter().zip(&cells) {
        paste_opaque(&mut canvas, cell, placement.cell.x, placement.cell.y);
    }
    debug!(
        width = layout.canvas.w,
        height = layout.canvas.h,
        "composed grid"
    );
    Ok(GridOutput {
        layout,
        image: canvas,
    })
}

/// Composes unnamed images; keys become their 0-based positions.
pub fn compose(images: &[DynamicImage], cfg: &GridConfig) -> Result<RgbImage> {
    let inputs: Vec<InputImage> = images
        .iter()
        .enumerate()
        .map(|(i, img)| InputImage::new(i.to_string(), img.clone()))
        .collect();
    Ok(compose_grid(&inputs, cfg)?.image)
}

fn render_cells(inputs: &[InputImage], layout: &GridLayout, cfg: &GridConfig) -> Vec<RgbImage> {
    #[cfg(feature = "parallel")]
    {
        if cfg.parallel {
            return layout
                .cells
                .par_iter()
                .zip(inputs.par_iter())
                .map(|(p, inp)| render_one(inp, p, cfg))
                .collect();
        }
    }
    layout
        .cells
        .iter()
        .zip(inputs)
        .map(|(p, inp)| render_one(inp, p, cfg))
        .collect()
}

fn render_one(input: &InputImage, placement: &CellPlacement, cfg: &GridConfig) -> RgbImage {
    let s = placement.source;
    let logo = input.image.crop_imm(s.x, s.y, s.w, s.h).to_rgba8();
    let fit = Fit {
        scale: placement.scale,
        size: placement.fitted,
        offset: placement.offset,
    };
    flatten(&render_cell(&logo, cfg.cell_size(), &fit, cfg.background))
}

fn build_meta(cfg: &GridConfig) -> Meta {
    Meta {
        schema_version: "1".into(),
        app: "logo-grid".into(),
        version: env!("CARGO_PKG_VERSION").into(),
        cell_size: cfg.cell_size(),
        cell_padding: cfg.cell_padding,
        row_padding: cfg.row_padding,
        outer_vertical_padding: cfg.outer_vertical_padding,
        trim_mode: if cfg.trim { "trim" } else { "none" }.into(),
        background_color: cfg.background,
    }
}
