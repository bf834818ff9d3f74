//! Core library for composing logos into a uniform grid.
//!
//! - Trimming: transparent borders are cropped before scaling (`trim`)
//! - Scale-to-fit: each logo is scaled uniformly to fit its cell and centered (`compositing`)
//! - Pipeline: `compose_grid` takes in-memory images and returns one opaque RGB canvas
//!   plus the layout; `plan_grid` computes the layout alone
//! - Layouts are serde-serializable; `to_json` exports them for tooling.
//!
//! Quick example:
//! ```ignore
//! use image::ImageReader;
//! use logo_grid_core::{GridConfig, InputImage, compose_grid};
//! # fn main() -> anyhow::Result<()> {
//! let a = ImageReader::open("a.png")?.decode()?;
//! let b = ImageReader::open("b.png")?.decode()?;
//! let inputs = vec![InputImage::new("a", a), InputImage::new("b", b)];
//! let cfg = GridConfig { rows: 1, ..Default::default() };
//! let out = compose_grid(&inputs, &cfg)?;
//! out.image.save("grid.png")?;
//! # Ok(()) }
//! ```

pub mod compositing;
pub mod config;
pub mod error;
pub mod export;
pub mod model;
pub mod pipeline;
pub mod trim;

pub use config::*;
pub use error::*;
pub use export::*;
pub use model::*;
pub use pipeline::*;
pub use trim::{content_bounds, trim, trim_with_threshold};

/// Convenience prelude for common types and functions.
/// Importing `logo_grid_core::prelude::*` brings the primary APIs into scope.
pub mod prelude {
    pub use crate::config::{GridConfig, GridConfigBuilder};
    pub use crate::error::LogoGridError;
    pub use crate::model::{CanvasRect, CellPlacement, GridLayout, GridStats, Rect, Size};
    pub use crate::{GridOutput, InputImage, compose, compose_grid, plan_grid, to_json, trim};
}
