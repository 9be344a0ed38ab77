//! PPTX package writer implementation.

use crate::parts::{self, SlidePart};
use crate::templates;
use deck_core::{Deck, Error, Result};
use std::io::{Cursor, Seek, Write};
use std::path::Path;
use zip::write::FileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

/// Writer for PPTX (Office Open XML) files.
pub struct PptxWriter;

impl PptxWriter {
    /// Create a new PPTX writer.
    pub fn new() -> Self {
        Self
    }

    /// Render the deck and write it to `path`, replacing any existing file.
    ///
    /// The package is built in memory first so a failure never leaves a
    /// truncated file behind.
    pub fn save(&self, deck: &Deck, path: &Path) -> Result<()> {
        let bytes = self.to_bytes(deck)?;
        std::fs::write(path, bytes)?;
        log::debug!("Wrote {}", path.display());
        Ok(())
    }

    /// Render the deck into an in-memory PPTX package.
    pub fn to_bytes(&self, deck: &Deck) -> Result<Vec<u8>> {
        let cursor = self.write(deck, Cursor::new(Vec::new()))?;
        Ok(cursor.into_inner())
    }

    /// Write the deck as a PPTX package to a seekable writer.
    pub fn write<W: Write + Seek>(&self, deck: &Deck, writer: W) -> Result<W> {
        let slides = plan_slides(deck)?;
        let notes_count = slides.iter().filter(|s| s.notes.is_some()).count();

        let mut zip = ZipWriter::new(writer);

        add_part(&mut zip, "[Content_Types].xml", &parts::content_types_xml(&slides)?)?;
        add_part(&mut zip, "_rels/.rels", &parts::root_rels_xml()?)?;
        add_part(&mut zip, "docProps/app.xml", &parts::app_props_xml(slides.len(), notes_count)?)?;

        add_part(&mut zip, "ppt/presentation.xml", &parts::presentation_xml(deck.size, slides.len())?)?;
        add_part(
            &mut zip,
            "ppt/_rels/presentation.xml.rels",
            &parts::presentation_rels_xml(&slides)?,
        )?;
        add_part(&mut zip, "ppt/presProps.xml", templates::PRES_PROPS_XML.as_bytes())?;
        add_part(&mut zip, "ppt/viewProps.xml", templates::VIEW_PROPS_XML.as_bytes())?;
        add_part(&mut zip, "ppt/tableStyles.xml", templates::TABLE_STYLES_XML.as_bytes())?;

        add_part(&mut zip, "ppt/slideMasters/slideMaster1.xml", templates::SLIDE_MASTER_XML.as_bytes())?;
        add_part(
            &mut zip,
            "ppt/slideMasters/_rels/slideMaster1.xml.rels",
            templates::SLIDE_MASTER_RELS_XML.as_bytes(),
        )?;
        add_part(&mut zip, "ppt/slideLayouts/slideLayout1.xml", templates::SLIDE_LAYOUT_XML.as_bytes())?;
        add_part(
            &mut zip,
            "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
            templates::SLIDE_LAYOUT_RELS_XML.as_bytes(),
        )?;
        add_part(&mut zip, "ppt/notesMasters/notesMaster1.xml", templates::NOTES_MASTER_XML.as_bytes())?;
        add_part(
            &mut zip,
            "ppt/notesMasters/_rels/notesMaster1.xml.rels",
            templates::NOTES_MASTER_RELS_XML.as_bytes(),
        )?;
        add_part(&mut zip, "ppt/theme/theme1.xml", templates::THEME_XML.as_bytes())?;
        add_part(&mut zip, "ppt/theme/theme2.xml", templates::THEME_XML.as_bytes())?;

        for (slide, pair) in slides.iter().zip(&deck.slides) {
            let image = std::fs::read(pair.image.path()).map_err(|e| {
                std::io::Error::new(
                    e.kind(),
                    format!("{}: {}", pair.image.path().display(), e),
                )
            })?;
            add_media(&mut zip, &slide.media_path(), &image)?;

            add_part(&mut zip, &slide.slide_path(), &parts::slide_xml(slide, deck.size)?)?;
            add_part(&mut zip, &slide.slide_rels_path(), &parts::slide_rels_xml(slide)?)?;

            if let Some(notes) = slide.notes {
                add_part(&mut zip, &slide.notes_path(), &parts::notes_slide_xml(notes)?)?;
                add_part(&mut zip, &slide.notes_rels_path(), &parts::notes_slide_rels_xml(slide)?)?;
            }

            log::debug!(
                "Slide {}: {} ({})",
                slide.number,
                slide.description,
                if slide.notes.is_some() { "with notes" } else { "no notes" }
            );
        }

        zip.finish()
            .map_err(|e| Error::ZipError(format!("Failed to finish archive: {}", e)))
    }
}

impl Default for PptxWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Work out part names and notes for every slide before anything is written.
fn plan_slides(deck: &Deck) -> Result<Vec<SlidePart<'_>>> {
    deck.slides
        .iter()
        .enumerate()
        .map(|(idx, pair)| {
            let extension = pair
                .image
                .extension()
                .filter(|ext| parts::image_content_type(ext).is_some())
                .ok_or_else(|| Error::UnsupportedImage(pair.image.path.clone()))?;

            Ok(SlidePart {
                number: idx + 1,
                extension,
                description: pair.image.file_name(),
                notes: pair.speaker_notes(),
            })
        })
        .collect()
}

/// Fixed timestamps keep the output byte-for-byte reproducible.
fn part_options(method: CompressionMethod) -> FileOptions {
    FileOptions::default()
        .compression_method(method)
        .last_modified_time(DateTime::default())
}

fn add_part<W: Write + Seek>(zip: &mut ZipWriter<W>, name: &str, content: &[u8]) -> Result<()> {
    add_entry(zip, name, content, CompressionMethod::Deflated)
}

/// Images are already compressed; store them as-is.
fn add_media<W: Write + Seek>(zip: &mut ZipWriter<W>, name: &str, content: &[u8]) -> Result<()> {
    add_entry(zip, name, content, CompressionMethod::Stored)
}

fn add_entry<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    name: &str,
    content: &[u8],
    method: CompressionMethod,
) -> Result<()> {
    zip.start_file(name, part_options(method))
        .map_err(|e| Error::ZipError(format!("Failed to add '{}': {}", name, e)))?;
    zip.write_all(content)
        .map_err(|e| Error::ZipError(format!("Failed to write '{}': {}", name, e)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use deck_core::{SlideImage, SlideSize};
    use quick_xml::events::Event;
    use quick_xml::Reader;
    use std::io::Read;
    use std::path::PathBuf;
    use zip::ZipArchive;

    /// Not a decodable PNG, but the writer never decodes images.
    const FAKE_PNG: &[u8] = b"\x89PNG\r\n\x1a\nfake";

    fn write_images(dir: &Path, count: usize) -> Vec<SlideImage> {
        (1..=count)
            .map(|i| {
                let path = dir.join(format!("slide-{:03}.png", i));
                let mut bytes = FAKE_PNG.to_vec();
                bytes.push(i as u8);
                std::fs::write(&path, bytes).unwrap();
                SlideImage::new(i as u64, path)
            })
            .collect()
    }

    fn open(bytes: Vec<u8>) -> ZipArchive<Cursor<Vec<u8>>> {
        ZipArchive::new(Cursor::new(bytes)).unwrap()
    }

    fn read_part(archive: &mut ZipArchive<Cursor<Vec<u8>>>, path: &str) -> String {
        let mut file = archive.by_name(path).unwrap();
        let mut content = String::new();
        file.read_to_string(&mut content).unwrap();
        content
    }

    fn has_part(archive: &mut ZipArchive<Cursor<Vec<u8>>>, path: &str) -> bool {
        archive.by_name(path).is_ok()
    }

    fn local_name(name: &[u8]) -> &[u8] {
        match name.iter().position(|&b| b == b':') {
            Some(pos) => &name[pos + 1..],
            None => name,
        }
    }

    /// Paragraph texts of a notes slide, in order.
    fn notes_paragraphs(xml: &str) -> Vec<String> {
        let mut reader = Reader::from_str(xml);
        let mut paragraphs = Vec::new();
        let mut in_text = false;

        loop {
            match reader.read_event().unwrap() {
                Event::Start(ref e) => match local_name(e.name().as_ref()) {
                    b"p" => paragraphs.push(String::new()),
                    b"t" => in_text = true,
                    _ => {}
                },
                Event::Empty(ref e) if local_name(e.name().as_ref()) == b"p" => {
                    paragraphs.push(String::new());
                }
                Event::Text(ref e) if in_text => {
                    if let Some(last) = paragraphs.last_mut() {
                        last.push_str(&e.unescape().unwrap());
                    }
                }
                Event::End(ref e) if local_name(e.name().as_ref()) == b"t" => in_text = false,
                Event::Eof => break,
                _ => {}
            }
        }

        paragraphs
    }

    /// Slide targets listed in presentation.xml.rels, in relationship order.
    fn slide_targets(xml: &str) -> Vec<String> {
        let mut reader = Reader::from_str(xml);
        let mut targets = Vec::new();

        loop {
            match reader.read_event().unwrap() {
                Event::Empty(ref e) if e.name().as_ref() == b"Relationship" => {
                    let mut rel_type = String::new();
                    let mut target = String::new();
                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"Type" => rel_type = String::from_utf8_lossy(&attr.value).to_string(),
                            b"Target" => target = String::from_utf8_lossy(&attr.value).to_string(),
                            _ => {}
                        }
                    }
                    if rel_type.ends_with("/slide") {
                        targets.push(target);
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        targets
    }

    /// `(type, idx)` of every placeholder in a part, in document order.
    fn placeholders(xml: &str) -> Vec<(String, String)> {
        let mut reader = Reader::from_str(xml);
        let mut found = Vec::new();

        loop {
            match reader.read_event().unwrap() {
                Event::Empty(ref e) if e.name().as_ref() == b"p:ph" => {
                    let mut ph_type = String::new();
                    let mut idx = String::new();
                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"type" => ph_type = String::from_utf8_lossy(&attr.value).to_string(),
                            b"idx" => idx = String::from_utf8_lossy(&attr.value).to_string(),
                            _ => {}
                        }
                    }
                    found.push((ph_type, idx));
                }
                Event::Eof => break,
                _ => {}
            }
        }

        found
    }

    #[test]
    fn test_positional_pairing_in_package() {
        let dir = tempfile::tempdir().unwrap();
        let images = write_images(dir.path(), 3);
        let notes = vec!["Intro text".to_string(), String::new()];
        let deck = Deck::assemble(images, &notes);

        let mut archive = open(PptxWriter::new().to_bytes(&deck).unwrap());

        let rels = read_part(&mut archive, "ppt/_rels/presentation.xml.rels");
        assert_eq!(
            slide_targets(&rels),
            vec!["slides/slide1.xml", "slides/slide2.xml", "slides/slide3.xml"]
        );

        let notes1 = read_part(&mut archive, "ppt/notesSlides/notesSlide1.xml");
        assert_eq!(notes_paragraphs(&notes1), vec!["Intro text"]);
        assert!(!has_part(&mut archive, "ppt/notesSlides/notesSlide2.xml"));
        assert!(!has_part(&mut archive, "ppt/notesSlides/notesSlide3.xml"));

        let slide2_rels = read_part(&mut archive, "ppt/slides/_rels/slide2.xml.rels");
        assert!(!slide2_rels.contains("notesSlide"));
    }

    #[test]
    fn test_notes_placeholders_resolve_against_master() {
        let dir = tempfile::tempdir().unwrap();
        let images = write_images(dir.path(), 1);
        let deck = Deck::assemble(images, &["Intro text".to_string()]);

        let mut archive = open(PptxWriter::new().to_bytes(&deck).unwrap());
        let notes = placeholders(&read_part(&mut archive, "ppt/notesSlides/notesSlide1.xml"));
        let master = placeholders(&read_part(&mut archive, "ppt/notesMasters/notesMaster1.xml"));

        assert_eq!(notes.len(), 2);
        for placeholder in &notes {
            assert!(
                master.contains(placeholder),
                "{:?} has no match in the notes master {:?}",
                placeholder,
                master
            );
        }
    }

    #[test]
    fn test_images_are_embedded_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let images = write_images(dir.path(), 2);
        let deck = Deck::assemble(images.clone(), &[]);

        let mut archive = open(PptxWriter::new().to_bytes(&deck).unwrap());

        for (i, image) in images.iter().enumerate() {
            let mut file = archive.by_name(&format!("ppt/media/image{}.png", i + 1)).unwrap();
            let mut embedded = Vec::new();
            file.read_to_end(&mut embedded).unwrap();
            assert_eq!(embedded, std::fs::read(&image.path).unwrap());
        }
    }

    #[test]
    fn test_every_slide_shares_the_deck_size() {
        let dir = tempfile::tempdir().unwrap();
        let deck = Deck::assemble(write_images(dir.path(), 2), &[]);

        let mut archive = open(PptxWriter::new().to_bytes(&deck).unwrap());

        let presentation = read_part(&mut archive, "ppt/presentation.xml");
        assert!(presentation.contains(r#"<p:sldSz cx="9144000" cy="5143500""#));
        for n in 1..=2 {
            let slide = read_part(&mut archive, &format!("ppt/slides/slide{}.xml", n));
            assert!(slide.contains(r#"<a:off x="0" y="0"/><a:ext cx="9144000" cy="5143500"/>"#));
        }
    }

    #[test]
    fn test_custom_slide_size() {
        let dir = tempfile::tempdir().unwrap();
        let deck = Deck::assemble(write_images(dir.path(), 1), &[])
            .with_size(SlideSize::from_inches(13.333, 7.5));

        let mut archive = open(PptxWriter::new().to_bytes(&deck).unwrap());

        let slide = read_part(&mut archive, "ppt/slides/slide1.xml");
        assert!(slide.contains(&format!(
            r#"<a:ext cx="{}" cy="{}"/>"#,
            deck.size.width, deck.size.height
        )));
    }

    #[test]
    fn test_multiline_notes_become_paragraphs() {
        let dir = tempfile::tempdir().unwrap();
        let notes = vec!["Line one\n\nLine two & more".to_string()];
        let deck = Deck::assemble(write_images(dir.path(), 1), &notes);

        let mut archive = open(PptxWriter::new().to_bytes(&deck).unwrap());

        let xml = read_part(&mut archive, "ppt/notesSlides/notesSlide1.xml");
        assert_eq!(notes_paragraphs(&xml), vec!["Line one", "", "Line two & more"]);
    }

    #[test]
    fn test_app_properties_count_slides_and_notes() {
        let dir = tempfile::tempdir().unwrap();
        let notes = vec!["a".to_string(), String::new(), "c".to_string()];
        let deck = Deck::assemble(write_images(dir.path(), 4), &notes);

        let mut archive = open(PptxWriter::new().to_bytes(&deck).unwrap());

        let app = read_part(&mut archive, "docProps/app.xml");
        assert!(app.contains("<Slides>4</Slides>"));
        assert!(app.contains("<Notes>2</Notes>"));
    }

    #[test]
    fn test_output_is_reproducible() {
        let dir = tempfile::tempdir().unwrap();
        let notes = vec!["First".to_string(), "Second".to_string()];
        let deck = Deck::assemble(write_images(dir.path(), 2), &notes);

        let writer = PptxWriter::new();
        assert_eq!(writer.to_bytes(&deck).unwrap(), writer.to_bytes(&deck).unwrap());
    }

    #[test]
    fn test_unsupported_image_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slide-001.webp");
        std::fs::write(&path, b"RIFF").unwrap();
        let deck = Deck::assemble(vec![SlideImage::new(1, path.clone())], &[]);

        let err = PptxWriter::new().to_bytes(&deck).unwrap_err();
        assert!(matches!(err, Error::UnsupportedImage(p) if p == path));
    }

    #[test]
    fn test_save_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("deck.pptx");
        std::fs::write(&output, b"stale").unwrap();
        let deck = Deck::assemble(write_images(dir.path(), 1), &[]);

        PptxWriter::new().save(&deck, &output).unwrap();

        let bytes = std::fs::read(&output).unwrap();
        assert!(bytes.starts_with(b"PK\x03\x04"));
        let mut archive = open(bytes);
        assert!(has_part(&mut archive, "ppt/slides/slide1.xml"));
    }

    #[test]
    fn test_failed_render_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("deck.pptx");
        let missing = PathBuf::from(dir.path()).join("slide-001.png");
        let deck = Deck::assemble(vec![SlideImage::new(1, missing)], &[]);

        assert!(PptxWriter::new().save(&deck, &output).is_err());
        assert!(!output.exists());
    }
}
