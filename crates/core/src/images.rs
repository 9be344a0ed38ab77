//! Slide screenshot discovery.

use crate::{Error, Result, SlideImage};
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

/// Default file name prefix written by the screenshot export.
pub const DEFAULT_PREFIX: &str = "slide-";

/// Default screenshot extension.
pub const DEFAULT_EXTENSION: &str = "png";

/// Regex for the default `slide-NNN.png` naming.
static DEFAULT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^slide\-(\d+)\.png$").unwrap());

/// Finds slide images named `<prefix><index>.<extension>` in a directory.
#[derive(Debug, Clone)]
pub struct ImageLocator {
    pattern: Regex,
}

impl ImageLocator {
    /// Create a locator for `slide-NNN.png`.
    pub fn new() -> Self {
        Self {
            pattern: DEFAULT_PATTERN.clone(),
        }
    }

    /// Match a different prefix and extension.
    pub fn with_naming(mut self, prefix: &str, extension: &str) -> Result<Self> {
        self.pattern = naming_pattern(prefix, extension)?;
        Ok(self)
    }

    /// List matching images sorted by their numeric index.
    ///
    /// A missing directory yields an empty list; deciding whether that is
    /// fatal is left to the caller.
    pub fn locate(&self, dir: &Path) -> Result<Vec<SlideImage>> {
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("Image directory {} does not exist", dir.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        let mut images = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    log::warn!("Skipping unreadable entry in {}: {}", dir.display(), e);
                    continue;
                }
            };

            if entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
                continue;
            }

            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                continue;
            };

            match self.slide_number(name) {
                Some(number) => images.push(SlideImage::new(number, entry.path())),
                None => log::debug!("Ignoring {}", name),
            }
        }

        images.sort_by(|a, b| {
            a.number
                .cmp(&b.number)
                .then_with(|| a.file_name().cmp(b.file_name()))
        });

        Ok(images)
    }

    /// Parse the index out of a matching file name.
    ///
    /// A name that matches but whose digits overflow `u64` is skipped
    /// with a warning rather than silently ignored.
    fn slide_number(&self, name: &str) -> Option<u64> {
        let digits = self.pattern.captures(name)?.get(1)?.as_str();
        match digits.parse() {
            Ok(number) => Some(number),
            Err(e) => {
                log::warn!("Skipping {}: slide index {} is out of range ({})", name, digits, e);
                None
            }
        }
    }
}

impl Default for ImageLocator {
    fn default() -> Self {
        Self::new()
    }
}

fn naming_pattern(prefix: &str, extension: &str) -> Result<Regex> {
    let extension = extension.trim_start_matches('.');
    let pattern = format!(r"^{}(\d+)\.{}$", regex::escape(prefix), regex::escape(extension));
    Regex::new(&pattern).map_err(|e| Error::InvalidPattern(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"").unwrap();
    }

    fn names(images: &[SlideImage]) -> Vec<&str> {
        images.iter().map(|i| i.file_name()).collect()
    }

    #[test]
    fn test_slide_number() {
        let locator = ImageLocator::new();
        assert_eq!(locator.slide_number("slide-001.png"), Some(1));
        assert_eq!(locator.slide_number("slide-123.png"), Some(123));
        assert_eq!(locator.slide_number("slide-7.png"), Some(7));
        assert_eq!(locator.slide_number("slide-001.jpg"), None);
        assert_eq!(locator.slide_number("slide-.png"), None);
        assert_eq!(locator.slide_number("my-slide-001.png"), None);
        assert_eq!(locator.slide_number("slide-001.png.bak"), None);
    }

    #[test]
    fn test_slide_number_beyond_u32() {
        let locator = ImageLocator::new();
        assert_eq!(locator.slide_number("slide-4294967296.png"), Some(4_294_967_296));
        assert_eq!(locator.slide_number("slide-99999999999999999999999.png"), None);
    }

    #[test]
    fn test_locate_skips_out_of_range_index() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "slide-001.png");
        touch(dir.path(), "slide-4294967296.png");
        touch(dir.path(), "slide-99999999999999999999999.png");

        let images = ImageLocator::new().locate(dir.path()).unwrap();
        assert_eq!(names(&images), vec!["slide-001.png", "slide-4294967296.png"]);
    }

    #[test]
    fn test_default_pattern_matches_defaults() {
        let built = naming_pattern(DEFAULT_PREFIX, DEFAULT_EXTENSION).unwrap();
        for name in ["slide-001.png", "slide-42.png", "slide-1.jpg", "slides-001.png", "slide-001xpng"] {
            assert_eq!(built.is_match(name), DEFAULT_PATTERN.is_match(name), "{}", name);
        }
    }

    #[test]
    fn test_sorted_numerically() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["slide-010.png", "slide-002.png", "slide-001.png"] {
            touch(dir.path(), name);
        }

        let images = ImageLocator::new().locate(dir.path()).unwrap();
        assert_eq!(names(&images), vec!["slide-001.png", "slide-002.png", "slide-010.png"]);
        assert_eq!(images.iter().map(|i| i.number).collect::<Vec<_>>(), vec![1, 2, 10]);
    }

    #[test]
    fn test_sorted_numerically_without_padding() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["slide-10.png", "slide-2.png", "slide-1.png"] {
            touch(dir.path(), name);
        }

        let images = ImageLocator::new().locate(dir.path()).unwrap();
        assert_eq!(names(&images), vec!["slide-1.png", "slide-2.png", "slide-10.png"]);
    }

    #[test]
    fn test_ignores_non_matching_files() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "slide-001.png");
        touch(dir.path(), "notes.txt");
        touch(dir.path(), "cover.png");
        touch(dir.path(), "slide-002.jpg");
        fs::create_dir(dir.path().join("slide-003.png")).unwrap();

        let images = ImageLocator::new().locate(dir.path()).unwrap();
        assert_eq!(names(&images), vec!["slide-001.png"]);
    }

    #[test]
    fn test_missing_directory_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let images = ImageLocator::new()
            .locate(&dir.path().join("exports/slides"))
            .unwrap();
        assert!(images.is_empty());
    }

    #[test]
    fn test_custom_naming() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "page_2.jpg");
        touch(dir.path(), "page_1.jpg");
        touch(dir.path(), "slide-001.png");

        let images = ImageLocator::new()
            .with_naming("page_", ".jpg")
            .unwrap()
            .locate(dir.path())
            .unwrap();
        assert_eq!(names(&images), vec!["page_1.jpg", "page_2.jpg"]);
    }
}
