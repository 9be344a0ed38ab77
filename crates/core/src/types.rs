//! Domain types for a screenshot deck.

use std::path::{Path, PathBuf};

/// English Metric Units per inch.
pub const EMU_PER_INCH: u64 = 914_400;

/// Slide dimensions in EMU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlideSize {
    pub width: u64,
    pub height: u64,
}

impl SlideSize {
    /// 16:9 at 10in x 5.625in, matching 1280x720 screenshots.
    pub const WIDESCREEN: SlideSize = SlideSize {
        width: 10 * EMU_PER_INCH,
        height: 5_143_500,
    };

    /// Create a slide size from EMU values.
    pub fn new(width: u64, height: u64) -> Self {
        Self { width, height }
    }

    /// Create a slide size from inches.
    pub fn from_inches(width: f64, height: f64) -> Self {
        Self {
            width: (width * EMU_PER_INCH as f64).round() as u64,
            height: (height * EMU_PER_INCH as f64).round() as u64,
        }
    }
}

impl Default for SlideSize {
    fn default() -> Self {
        Self::WIDESCREEN
    }
}

/// A screenshot on disk for one slide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideImage {
    /// Index parsed from the file name (`slide-007.png` -> 7).
    pub number: u64,

    /// Location of the image file.
    pub path: PathBuf,
}

impl SlideImage {
    /// Create a new slide image reference.
    pub fn new(number: u64, path: impl Into<PathBuf>) -> Self {
        Self {
            number,
            path: path.into(),
        }
    }

    /// Lowercased file extension, if any.
    pub fn extension(&self) -> Option<String> {
        self.path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
    }

    /// File name for display purposes.
    pub fn file_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("")
    }

    /// Path of the image file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// One slide of the deck: an image and the notes at the same position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlidePair {
    /// 0-based slide position.
    pub position: usize,

    /// The screenshot shown on the slide.
    pub image: SlideImage,

    /// Notes at this position. `None` when the notes list ran out,
    /// `Some("")` when the section had no notes.
    pub notes: Option<String>,
}

impl SlidePair {
    /// Notes to attach to the slide, if there is any text.
    pub fn speaker_notes(&self) -> Option<&str> {
        self.notes.as_deref().filter(|n| !n.is_empty())
    }
}

/// An assembled deck, ready to be serialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deck {
    /// Dimensions shared by every slide.
    pub size: SlideSize,

    /// Slides in presentation order.
    pub slides: Vec<SlidePair>,
}

impl Deck {
    /// Pair images with notes by position.
    ///
    /// One slide is created per image. Image `i` takes note `i`; when the
    /// notes run out the remaining slides get `None`, and surplus notes are
    /// ignored.
    pub fn assemble(images: Vec<SlideImage>, notes: &[String]) -> Self {
        let slides = images
            .into_iter()
            .enumerate()
            .map(|(position, image)| SlidePair {
                position,
                image,
                notes: notes.get(position).cloned(),
            })
            .collect();

        Self {
            size: SlideSize::default(),
            slides,
        }
    }

    /// Use a different slide size.
    pub fn with_size(mut self, size: SlideSize) -> Self {
        self.size = size;
        self
    }

    /// Number of slides.
    pub fn len(&self) -> usize {
        self.slides.len()
    }

    /// Whether the deck has no slides.
    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    /// Number of slides that carry speaker notes.
    pub fn notes_count(&self) -> usize {
        self.slides
            .iter()
            .filter(|s| s.speaker_notes().is_some())
            .count()
    }
}
