//! The extract → pair → assemble sequence behind `build-deck`.

use deck_core::{Deck, Error, ImageLocator, NotesExtractor, Result};
use deck_pptx::PptxWriter;
use std::path::PathBuf;

/// Inputs and output for one run.
#[derive(Debug, Clone)]
pub struct Pipeline {
    html: PathBuf,
    slides_dir: PathBuf,
    output: PathBuf,
    extractor: NotesExtractor,
    locator: ImageLocator,
}

/// What a successful run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub sections: usize,
    pub images: usize,
    pub slides: usize,
    pub output: PathBuf,
}

impl Pipeline {
    /// Create a pipeline with the default extractor and locator.
    pub fn new(html: impl Into<PathBuf>, slides_dir: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            html: html.into(),
            slides_dir: slides_dir.into(),
            output: output.into(),
            extractor: NotesExtractor::new(),
            locator: ImageLocator::new(),
        }
    }

    /// Use a custom image locator.
    pub fn with_locator(mut self, locator: ImageLocator) -> Self {
        self.locator = locator;
        self
    }

    /// Extract notes, locate images, and write the deck.
    ///
    /// Every fatal check happens before the output path is touched.
    pub fn run(&self) -> Result<Summary> {
        if !self.html.exists() {
            return Err(Error::MissingInput(self.html.clone()));
        }

        let notes = self.extractor.extract_file(&self.html)?;
        println!("Extracted notes from {} sections", notes.len());

        let images = self.locator.locate(&self.slides_dir)?;
        if images.is_empty() {
            return Err(Error::NoImages(self.slides_dir.clone()));
        }
        println!("Found {} slide images", images.len());

        if images.len() != notes.len() {
            eprintln!(
                "WARNING: {} images but {} sections in HTML. Notes may not align perfectly.",
                images.len(),
                notes.len()
            );
        }

        let summary = Summary {
            sections: notes.len(),
            images: images.len(),
            slides: images.len(),
            output: self.output.clone(),
        };

        let deck = Deck::assemble(images, &notes);
        log::debug!("Assembled {} slides, {} with notes", deck.len(), deck.notes_count());

        PptxWriter::new().save(&deck, &self.output)?;

        Ok(summary)
    }
}
