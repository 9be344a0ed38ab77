//! Error types for deck building.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building a deck.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to read or write a file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// The HTML slideshow does not exist.
    #[error("{} not found", .0.display())]
    MissingInput(PathBuf),

    /// The HTML slideshow has no slides container.
    #[error("Could not find {0} container in HTML")]
    MissingContainer(String),

    /// No slide images matched the naming pattern.
    #[error(
        "No slide images found in {}\nRun 'node export-slides.js' first to generate screenshots.",
        .0.display()
    )]
    NoImages(PathBuf),

    /// A configured CSS selector could not be parsed.
    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    /// The image naming pattern could not be compiled.
    #[error("Invalid image naming pattern: {0}")]
    InvalidPattern(String),

    /// The image has an extension with no known content type.
    #[error("Unsupported image type: {}", .0.display())]
    UnsupportedImage(PathBuf),

    /// ZIP archive error (for PPTX).
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// XML writing error (for PPTX).
    #[error("XML error: {0}")]
    XmlError(String),
}
