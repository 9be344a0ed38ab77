//! PPTX (Office Open XML) writer for screenshot decks.
//!
//! Produces .pptx files, which are ZIP archives containing XML documents.

pub mod parts;
pub mod templates;
pub mod writer;

pub use writer::PptxWriter;
