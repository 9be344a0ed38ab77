//! Core domain types, speaker-notes extraction, and slide image discovery
//! for building a deck from slide screenshots.

pub mod error;
pub mod images;
pub mod notes;
pub mod types;

pub use error::{Error, Result};
pub use images::ImageLocator;
pub use notes::NotesExtractor;
pub use types::{Deck, SlideImage, SlidePair, SlideSize};
