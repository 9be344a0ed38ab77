//! Speaker notes extraction from Reveal.js HTML.
//!
//! Each direct child `<section>` of the slides container is one slide. Its
//! notes live in a nested `<aside class="notes">`; a section without one
//! still occupies a position and yields an empty string, so the output is
//! always aligned with the section count.

use crate::{Error, Result};
use scraper::{ElementRef, Html, Selector};
use std::path::Path;

/// Default selector for the element holding all slide sections.
pub const DEFAULT_CONTAINER_SELECTOR: &str = ".slides";

/// Default selector for the notes element inside a section.
pub const DEFAULT_NOTES_SELECTOR: &str = "aside.notes";

/// Extracts speaker notes, one entry per top-level slide section.
#[derive(Debug, Clone)]
pub struct NotesExtractor {
    container_selector: String,
    notes_selector: String,
}

impl Default for NotesExtractor {
    fn default() -> Self {
        Self {
            container_selector: DEFAULT_CONTAINER_SELECTOR.to_string(),
            notes_selector: DEFAULT_NOTES_SELECTOR.to_string(),
        }
    }
}

impl NotesExtractor {
    /// Create an extractor using the Reveal.js defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the selector for the slides container.
    pub fn with_container_selector(mut self, selector: impl Into<String>) -> Self {
        self.container_selector = selector.into();
        self
    }

    /// Set the selector for the notes element inside each section.
    pub fn with_notes_selector(mut self, selector: impl Into<String>) -> Self {
        self.notes_selector = selector.into();
        self
    }

    /// Read an HTML file and extract its notes.
    ///
    /// A missing file surfaces as [`Error::IoError`].
    pub fn extract_file(&self, path: &Path) -> Result<Vec<String>> {
        let html = std::fs::read_to_string(path)?;
        self.extract(&html)
    }

    /// Extract notes from an HTML document.
    pub fn extract(&self, html: &str) -> Result<Vec<String>> {
        let container_selector = parse_selector(&self.container_selector)?;
        let notes_selector = parse_selector(&self.notes_selector)?;

        let document = Html::parse_document(html);
        let container = document
            .select(&container_selector)
            .next()
            .ok_or_else(|| Error::MissingContainer(self.container_selector.clone()))?;

        let notes: Vec<String> = top_level_sections(container)
            .map(|section| {
                section
                    .select(&notes_selector)
                    .next()
                    .map(notes_text)
                    .unwrap_or_default()
            })
            .collect();

        log::debug!(
            "Found {} top-level sections, {} with notes",
            notes.len(),
            notes.iter().filter(|n| !n.is_empty()).count()
        );

        Ok(notes)
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| Error::InvalidSelector(format!("'{}': {}", selector, e)))
}

/// Direct `<section>` children of the container; nested sections are skipped.
fn top_level_sections<'a>(container: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    container
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name() == "section")
}

/// Join every text node with a newline, then trim the ends.
fn notes_text(element: ElementRef<'_>) -> String {
    let joined = element.text().collect::<Vec<_>>().join("\n");
    joined
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .trim()
        .to_string()
}
