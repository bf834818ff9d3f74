use thiserror::Error;

#[derive(Debug, Error)]
pub enum LogoGridError {
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    /// An input has zero area, either as decoded or after trimming a fully blank image.
    #[error("Degenerate image at position {index} ({key}): no visible content to scale")]
    DegenerateImage { index: usize, key: String },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Nothing to compose")]
    Empty,
}

pub type Result<T> = std::result::Result<T, LogoGridError>;
