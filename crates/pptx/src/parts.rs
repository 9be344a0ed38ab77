//! Generated package parts: everything that depends on the deck contents.

use crate::templates;
use deck_core::{Error, Result, SlideSize};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_P: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
const NS_RELS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const NS_CONTENT_TYPES: &str = "http://schemas.openxmlformats.org/package/2006/content-types";
const NS_EXTENDED: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/extended-properties";

/// Relationship type URIs.
mod rel_types {
    pub const OFFICE_DOCUMENT: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
    pub const EXTENDED_PROPERTIES: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties";
    pub const SLIDE_MASTER: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster";
    pub const NOTES_MASTER: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/notesMaster";
    pub const THEME: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme";
    pub const PRES_PROPS: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/presProps";
    pub const VIEW_PROPS: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/viewProps";
    pub const TABLE_STYLES: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/tableStyles";
    pub const SLIDE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
    pub const SLIDE_LAYOUT: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";
    pub const IMAGE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
    pub const NOTES_SLIDE: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/notesSlide";
}

/// Content type URIs.
mod content_types {
    pub const RELS: &str = "application/vnd.openxmlformats-package.relationships+xml";
    pub const XML: &str = "application/xml";
    pub const PRESENTATION: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml";
    pub const SLIDE_MASTER: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml";
    pub const SLIDE_LAYOUT: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml";
    pub const NOTES_MASTER: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.notesMaster+xml";
    pub const THEME: &str = "application/vnd.openxmlformats-officedocument.theme+xml";
    pub const PRES_PROPS: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.presProps+xml";
    pub const VIEW_PROPS: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.viewProps+xml";
    pub const TABLE_STYLES: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.tableStyles+xml";
    pub const SLIDE: &str = "application/vnd.openxmlformats-officedocument.presentationml.slide+xml";
    pub const NOTES_SLIDE: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.notesSlide+xml";
    pub const EXTENDED_PROPERTIES: &str =
        "application/vnd.openxmlformats-officedocument.extended-properties+xml";
}

/// Relationship id of the first slide in `presentation.xml.rels`.
/// rId1..rId6 are taken by the master, notes master, theme and property parts.
const FIRST_SLIDE_REL_ID: usize = 7;

/// Slide ids in `presentation.xml` start here.
const FIRST_SLIDE_ID: usize = 256;

/// Portrait notes page, 7.5in x 10in.
const NOTES_SIZE: SlideSize = SlideSize {
    width: 6_858_000,
    height: 9_144_000,
};

/// Media types PowerPoint accepts for pictures, keyed by extension.
pub fn image_content_type(extension: &str) -> Option<&'static str> {
    match extension {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "bmp" => Some("image/bmp"),
        _ => None,
    }
}

/// Everything the generated parts need to know about one slide.
#[derive(Debug, Clone)]
pub struct SlidePart<'a> {
    /// 1-based slide number, also used for the notes slide.
    pub number: usize,

    /// Lowercased image extension.
    pub extension: String,

    /// Original image file name, kept as the picture description.
    pub description: &'a str,

    /// Speaker notes to write, if any.
    pub notes: Option<&'a str>,
}

impl SlidePart<'_> {
    pub fn slide_path(&self) -> String {
        format!("ppt/slides/slide{}.xml", self.number)
    }

    pub fn slide_rels_path(&self) -> String {
        format!("ppt/slides/_rels/slide{}.xml.rels", self.number)
    }

    pub fn media_name(&self) -> String {
        format!("image{}.{}", self.number, self.extension)
    }

    pub fn media_path(&self) -> String {
        format!("ppt/media/{}", self.media_name())
    }

    pub fn notes_path(&self) -> String {
        format!("ppt/notesSlides/notesSlide{}.xml", self.number)
    }

    pub fn notes_rels_path(&self) -> String {
        format!("ppt/notesSlides/_rels/notesSlide{}.xml.rels", self.number)
    }
}

/// Thin wrapper over a quick-xml writer for building one part.
struct XmlPart {
    writer: Writer<Vec<u8>>,
}

impl XmlPart {
    fn new() -> Result<Self> {
        let mut part = Self {
            writer: Writer::new(Vec::new()),
        };
        part.write(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
        Ok(part)
    }

    fn start(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
        let mut element = BytesStart::new(name);
        for &attr in attrs {
            element.push_attribute(attr);
        }
        self.write(Event::Start(element))
    }

    fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
        let mut element = BytesStart::new(name);
        for &attr in attrs {
            element.push_attribute(attr);
        }
        self.write(Event::Empty(element))
    }

    fn end(&mut self, name: &str) -> Result<()> {
        self.write(Event::End(BytesEnd::new(name)))
    }

    fn text(&mut self, text: &str) -> Result<()> {
        self.write(Event::Text(BytesText::new(text)))
    }

    fn write(&mut self, event: Event<'_>) -> Result<()> {
        self.writer
            .write_event(event)
            .map_err(|e| Error::XmlError(e.to_string()))
    }

    fn finish(self) -> Vec<u8> {
        self.writer.into_inner()
    }

    /// Open a PresentationML root element with the usual namespaces.
    fn start_pml_root(&mut self, name: &str, extra: &[(&str, &str)]) -> Result<()> {
        let mut attrs = vec![("xmlns:a", NS_A), ("xmlns:r", NS_R), ("xmlns:p", NS_P)];
        attrs.extend_from_slice(extra);
        self.start(name, &attrs)
    }

    /// The empty group-shape header every `p:spTree` starts with.
    fn group_shape_header(&mut self) -> Result<()> {
        self.start("p:nvGrpSpPr", &[])?;
        self.empty("p:cNvPr", &[("id", "1"), ("name", "")])?;
        self.empty("p:cNvGrpSpPr", &[])?;
        self.empty("p:nvPr", &[])?;
        self.end("p:nvGrpSpPr")?;
        self.start("p:grpSpPr", &[])?;
        self.start("a:xfrm", &[])?;
        self.empty("a:off", &[("x", "0"), ("y", "0")])?;
        self.empty("a:ext", &[("cx", "0"), ("cy", "0")])?;
        self.empty("a:chOff", &[("x", "0"), ("y", "0")])?;
        self.empty("a:chExt", &[("cx", "0"), ("cy", "0")])?;
        self.end("a:xfrm")?;
        self.end("p:grpSpPr")
    }

    fn relationship(&mut self, id: &str, rel_type: &str, target: &str) -> Result<()> {
        self.empty(
            "Relationship",
            &[("Id", id), ("Type", rel_type), ("Target", target)],
        )
    }
}

/// `[Content_Types].xml`
pub fn content_types_xml(slides: &[SlidePart<'_>]) -> Result<Vec<u8>> {
    let mut xml = XmlPart::new()?;
    xml.start("Types", &[("xmlns", NS_CONTENT_TYPES)])?;
    xml.empty("Default", &[("Extension", "rels"), ("ContentType", content_types::RELS)])?;
    xml.empty("Default", &[("Extension", "xml"), ("ContentType", content_types::XML)])?;

    let mut extensions: Vec<&str> = slides.iter().map(|s| s.extension.as_str()).collect();
    extensions.sort_unstable();
    extensions.dedup();
    for extension in extensions {
        let content_type = image_content_type(extension).ok_or_else(|| {
            Error::XmlError(format!("No content type for .{} media", extension))
        })?;
        xml.empty("Default", &[("Extension", extension), ("ContentType", content_type)])?;
    }

    let fixed = [
        ("/ppt/presentation.xml", content_types::PRESENTATION),
        ("/ppt/slideMasters/slideMaster1.xml", content_types::SLIDE_MASTER),
        ("/ppt/slideLayouts/slideLayout1.xml", content_types::SLIDE_LAYOUT),
        ("/ppt/notesMasters/notesMaster1.xml", content_types::NOTES_MASTER),
        ("/ppt/theme/theme1.xml", content_types::THEME),
        ("/ppt/theme/theme2.xml", content_types::THEME),
        ("/ppt/presProps.xml", content_types::PRES_PROPS),
        ("/ppt/viewProps.xml", content_types::VIEW_PROPS),
        ("/ppt/tableStyles.xml", content_types::TABLE_STYLES),
        ("/docProps/app.xml", content_types::EXTENDED_PROPERTIES),
    ];
    for (part_name, content_type) in fixed {
        xml.empty("Override", &[("PartName", part_name), ("ContentType", content_type)])?;
    }

    for slide in slides {
        let part_name = format!("/{}", slide.slide_path());
        xml.empty("Override", &[("PartName", part_name.as_str()), ("ContentType", content_types::SLIDE)])?;
        if slide.notes.is_some() {
            let part_name = format!("/{}", slide.notes_path());
            xml.empty(
                "Override",
                &[("PartName", part_name.as_str()), ("ContentType", content_types::NOTES_SLIDE)],
            )?;
        }
    }

    xml.end("Types")?;
    Ok(xml.finish())
}

/// `_rels/.rels`
pub fn root_rels_xml() -> Result<Vec<u8>> {
    let mut xml = XmlPart::new()?;
    xml.start("Relationships", &[("xmlns", NS_RELS)])?;
    xml.relationship("rId1", rel_types::OFFICE_DOCUMENT, "ppt/presentation.xml")?;
    xml.relationship("rId2", rel_types::EXTENDED_PROPERTIES, "docProps/app.xml")?;
    xml.end("Relationships")?;
    Ok(xml.finish())
}

/// `docProps/app.xml`
pub fn app_props_xml(slide_count: usize, notes_count: usize) -> Result<Vec<u8>> {
    let mut xml = XmlPart::new()?;
    xml.start("Properties", &[("xmlns", NS_EXTENDED)])?;
    for (name, value) in [
        ("Application", env!("CARGO_PKG_NAME").to_string()),
        ("Slides", slide_count.to_string()),
        ("Notes", notes_count.to_string()),
    ] {
        xml.start(name, &[])?;
        xml.text(&value)?;
        xml.end(name)?;
    }
    xml.end("Properties")?;
    Ok(xml.finish())
}

/// `ppt/presentation.xml`
pub fn presentation_xml(size: SlideSize, slide_count: usize) -> Result<Vec<u8>> {
    let mut xml = XmlPart::new()?;
    xml.start_pml_root("p:presentation", &[("saveSubsetFonts", "1")])?;

    xml.start("p:sldMasterIdLst", &[])?;
    xml.empty("p:sldMasterId", &[("id", "2147483648"), ("r:id", "rId1")])?;
    xml.end("p:sldMasterIdLst")?;

    xml.start("p:notesMasterIdLst", &[])?;
    xml.empty("p:notesMasterId", &[("r:id", "rId2")])?;
    xml.end("p:notesMasterIdLst")?;

    // An empty sldIdLst is a schema violation, so leave it out entirely.
    if slide_count > 0 {
        xml.start("p:sldIdLst", &[])?;
        for i in 0..slide_count {
            let id = (FIRST_SLIDE_ID + i).to_string();
            let rel_id = format!("rId{}", FIRST_SLIDE_REL_ID + i);
            xml.empty("p:sldId", &[("id", id.as_str()), ("r:id", rel_id.as_str())])?;
        }
        xml.end("p:sldIdLst")?;
    }

    let cx = size.width.to_string();
    let cy = size.height.to_string();
    if size == SlideSize::WIDESCREEN {
        xml.empty("p:sldSz", &[("cx", cx.as_str()), ("cy", cy.as_str()), ("type", "screen16x9")])?;
    } else {
        xml.empty("p:sldSz", &[("cx", cx.as_str()), ("cy", cy.as_str())])?;
    }
    let notes_cx = NOTES_SIZE.width.to_string();
    let notes_cy = NOTES_SIZE.height.to_string();
    xml.empty("p:notesSz", &[("cx", notes_cx.as_str()), ("cy", notes_cy.as_str())])?;

    xml.end("p:presentation")?;
    Ok(xml.finish())
}

/// `ppt/_rels/presentation.xml.rels`
pub fn presentation_rels_xml(slides: &[SlidePart<'_>]) -> Result<Vec<u8>> {
    let mut xml = XmlPart::new()?;
    xml.start("Relationships", &[("xmlns", NS_RELS)])?;
    xml.relationship("rId1", rel_types::SLIDE_MASTER, "slideMasters/slideMaster1.xml")?;
    xml.relationship("rId2", rel_types::NOTES_MASTER, "notesMasters/notesMaster1.xml")?;
    xml.relationship("rId3", rel_types::THEME, "theme/theme1.xml")?;
    xml.relationship("rId4", rel_types::PRES_PROPS, "presProps.xml")?;
    xml.relationship("rId5", rel_types::VIEW_PROPS, "viewProps.xml")?;
    xml.relationship("rId6", rel_types::TABLE_STYLES, "tableStyles.xml")?;
    for (i, slide) in slides.iter().enumerate() {
        let id = format!("rId{}", FIRST_SLIDE_REL_ID + i);
        let target = format!("slides/slide{}.xml", slide.number);
        xml.relationship(&id, rel_types::SLIDE, &target)?;
    }
    xml.end("Relationships")?;
    Ok(xml.finish())
}

/// `ppt/slides/slideN.xml`: one picture covering the whole slide.
pub fn slide_xml(slide: &SlidePart<'_>, size: SlideSize) -> Result<Vec<u8>> {
    let mut xml = XmlPart::new()?;
    xml.start_pml_root("p:sld", &[])?;
    xml.start("p:cSld", &[])?;
    xml.start("p:spTree", &[])?;
    xml.group_shape_header()?;

    xml.start("p:pic", &[])?;
    xml.start("p:nvPicPr", &[])?;
    xml.empty(
        "p:cNvPr",
        &[("id", "2"), ("name", "Picture 1"), ("descr", slide.description)],
    )?;
    xml.start("p:cNvPicPr", &[])?;
    xml.empty("a:picLocks", &[("noChangeAspect", "1")])?;
    xml.end("p:cNvPicPr")?;
    xml.empty("p:nvPr", &[])?;
    xml.end("p:nvPicPr")?;

    xml.start("p:blipFill", &[])?;
    xml.empty("a:blip", &[("r:embed", "rId2")])?;
    xml.start("a:stretch", &[])?;
    xml.empty("a:fillRect", &[])?;
    xml.end("a:stretch")?;
    xml.end("p:blipFill")?;

    xml.start("p:spPr", &[])?;
    xml.start("a:xfrm", &[])?;
    xml.empty("a:off", &[("x", "0"), ("y", "0")])?;
    let cx = size.width.to_string();
    let cy = size.height.to_string();
    xml.empty("a:ext", &[("cx", cx.as_str()), ("cy", cy.as_str())])?;
    xml.end("a:xfrm")?;
    xml.start("a:prstGeom", &[("prst", "rect")])?;
    xml.empty("a:avLst", &[])?;
    xml.end("a:prstGeom")?;
    xml.end("p:spPr")?;
    xml.end("p:pic")?;

    xml.end("p:spTree")?;
    xml.end("p:cSld")?;
    xml.start("p:clrMapOvr", &[])?;
    xml.empty("a:masterClrMapping", &[])?;
    xml.end("p:clrMapOvr")?;
    xml.end("p:sld")?;
    Ok(xml.finish())
}

/// `ppt/slides/_rels/slideN.xml.rels`
pub fn slide_rels_xml(slide: &SlidePart<'_>) -> Result<Vec<u8>> {
    let mut xml = XmlPart::new()?;
    xml.start("Relationships", &[("xmlns", NS_RELS)])?;
    xml.relationship("rId1", rel_types::SLIDE_LAYOUT, "../slideLayouts/slideLayout1.xml")?;
    xml.relationship("rId2", rel_types::IMAGE, &format!("../media/{}", slide.media_name()))?;
    if slide.notes.is_some() {
        let target = format!("../notesSlides/notesSlide{}.xml", slide.number);
        xml.relationship("rId3", rel_types::NOTES_SLIDE, &target)?;
    }
    xml.end("Relationships")?;
    Ok(xml.finish())
}

/// `ppt/notesSlides/notesSlideN.xml`: one paragraph per line of notes.
pub fn notes_slide_xml(notes: &str) -> Result<Vec<u8>> {
    let mut xml = XmlPart::new()?;
    xml.start_pml_root("p:notes", &[])?;
    xml.start("p:cSld", &[])?;
    xml.start("p:spTree", &[])?;
    xml.group_shape_header()?;

    xml.start("p:sp", &[])?;
    xml.start("p:nvSpPr", &[])?;
    xml.empty("p:cNvPr", &[("id", "2"), ("name", "Slide Image Placeholder 1")])?;
    xml.start("p:cNvSpPr", &[])?;
    xml.empty(
        "a:spLocks",
        &[("noGrp", "1"), ("noRot", "1"), ("noChangeAspect", "1")],
    )?;
    xml.end("p:cNvSpPr")?;
    xml.start("p:nvPr", &[])?;
    xml.empty(
        "p:ph",
        &[("type", "sldImg"), ("idx", templates::NOTES_SLIDE_IMAGE_IDX)],
    )?;
    xml.end("p:nvPr")?;
    xml.end("p:nvSpPr")?;
    xml.empty("p:spPr", &[])?;
    xml.end("p:sp")?;

    xml.start("p:sp", &[])?;
    xml.start("p:nvSpPr", &[])?;
    xml.empty("p:cNvPr", &[("id", "3"), ("name", "Notes Placeholder 2")])?;
    xml.start("p:cNvSpPr", &[])?;
    xml.empty("a:spLocks", &[("noGrp", "1")])?;
    xml.end("p:cNvSpPr")?;
    xml.start("p:nvPr", &[])?;
    xml.empty(
        "p:ph",
        &[
            ("type", "body"),
            ("sz", templates::NOTES_BODY_SIZE),
            ("idx", templates::NOTES_BODY_IDX),
        ],
    )?;
    xml.end("p:nvPr")?;
    xml.end("p:nvSpPr")?;
    xml.empty("p:spPr", &[])?;
    xml.start("p:txBody", &[])?;
    xml.empty("a:bodyPr", &[])?;
    xml.empty("a:lstStyle", &[])?;
    for line in notes.split('\n') {
        let line = xml_safe(line);
        xml.start("a:p", &[])?;
        if line.is_empty() {
            xml.empty("a:endParaRPr", &[("lang", "en-US"), ("dirty", "0")])?;
        } else {
            xml.start("a:r", &[])?;
            xml.empty("a:rPr", &[("lang", "en-US"), ("dirty", "0")])?;
            xml.start("a:t", &[])?;
            xml.text(&line)?;
            xml.end("a:t")?;
            xml.end("a:r")?;
        }
        xml.end("a:p")?;
    }
    xml.end("p:txBody")?;
    xml.end("p:sp")?;

    xml.end("p:spTree")?;
    xml.end("p:cSld")?;
    xml.start("p:clrMapOvr", &[])?;
    xml.empty("a:masterClrMapping", &[])?;
    xml.end("p:clrMapOvr")?;
    xml.end("p:notes")?;
    Ok(xml.finish())
}

/// `ppt/notesSlides/_rels/notesSlideN.xml.rels`
pub fn notes_slide_rels_xml(slide: &SlidePart<'_>) -> Result<Vec<u8>> {
    let mut xml = XmlPart::new()?;
    xml.start("Relationships", &[("xmlns", NS_RELS)])?;
    xml.relationship("rId1", rel_types::NOTES_MASTER, "../notesMasters/notesMaster1.xml")?;
    xml.relationship("rId2", rel_types::SLIDE, &format!("../slides/slide{}.xml", slide.number))?;
    xml.end("Relationships")?;
    Ok(xml.finish())
}

/// Drop control characters that XML 1.0 cannot carry.
fn xml_safe(line: &str) -> String {
    line.chars()
        .filter(|&c| c == '\t' || !c.is_control())
        .collect()
}
