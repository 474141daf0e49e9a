//! Assembles the OOXML package: one master, one blank layout, one theme and
//! a slide part per added slide.

use std::fmt::Write as _;
use std::io::{Cursor, Write};

use deck_core::render::ExportSlide;
use deck_core::theme::{BODY_FONT, HEADING_FONT};
use deck_core::{Error, Result, Theme};
use quick_xml::escape::escape;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::xml::{
    emu, slide_rels_xml, slide_xml, SlidePart, NS_A, NS_P, NS_PKG_RELS, NS_R, REL_SLIDE_LAYOUT,
    XML_DECL,
};
use deck_core::render::export::{SLIDE_HEIGHT, SLIDE_WIDTH};

const REL_OFFICE_DOC: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
const REL_CORE_PROPS: &str =
    "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties";
const REL_APP_PROPS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties";
const REL_SLIDE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
const REL_SLIDE_MASTER: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster";
const REL_THEME: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme";

const CT_PRESENTATION: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml";
const CT_SLIDE: &str = "application/vnd.openxmlformats-officedocument.presentationml.slide+xml";
const CT_MASTER: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml";
const CT_LAYOUT: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml";
const CT_THEME: &str = "application/vnd.openxmlformats-officedocument.theme+xml";
const CT_CORE: &str = "application/vnd.openxmlformats-package.core-properties+xml";
const CT_APP: &str = "application/vnd.openxmlformats-officedocument.extended-properties+xml";

/// Builds a .pptx in memory.
pub struct PptxWriter<'a> {
    theme: &'a Theme,
    title: String,
    slides: Vec<SlidePart>,
}

impl<'a> PptxWriter<'a> {
    pub fn new(theme: &'a Theme, title: impl Into<String>) -> Self {
        Self {
            theme,
            title: title.into(),
            slides: Vec::new(),
        }
    }

    /// Append a slide. Slides are written in the order they are added.
    pub fn add_slide(&mut self, slide: &ExportSlide) {
        log::debug!(
            "slide {} ({}): {} primitives",
            self.slides.len() + 1,
            slide.layout,
            slide.primitives.len()
        );
        self.slides.push(slide_xml(slide));
    }

    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    /// Write every part and return the archive bytes.
    pub fn finish(self) -> Result<Vec<u8>> {
        let n = self.slides.len();
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

        put(&mut zip, "[Content_Types].xml", &content_types(n))?;
        put(&mut zip, "_rels/.rels", &root_rels())?;
        put(&mut zip, "docProps/core.xml", &core_props(&self.title))?;
        put(&mut zip, "docProps/app.xml", &app_props(n))?;
        put(&mut zip, "ppt/presentation.xml", &presentation(n))?;
        put(&mut zip, "ppt/_rels/presentation.xml.rels", &presentation_rels(n))?;
        put(&mut zip, "ppt/slideMasters/slideMaster1.xml", &slide_master())?;
        put(
            &mut zip,
            "ppt/slideMasters/_rels/slideMaster1.xml.rels",
            &slide_master_rels(),
        )?;
        put(&mut zip, "ppt/slideLayouts/slideLayout1.xml", &slide_layout())?;
        put(
            &mut zip,
            "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
            &slide_layout_rels(),
        )?;
        put(&mut zip, "ppt/theme/theme1.xml", &theme_part(self.theme))?;

        for (i, part) in self.slides.iter().enumerate() {
            let n = i + 1;
            put(&mut zip, &format!("ppt/slides/slide{}.xml", n), &part.xml)?;
            put(
                &mut zip,
                &format!("ppt/slides/_rels/slide{}.xml.rels", n),
                &slide_rels_xml(&part.image_links),
            )?;
        }

        let cursor = zip
            .finish()
            .map_err(|e| Error::ZipError(format!("Failed to finish archive: {}", e)))?;
        Ok(cursor.into_inner())
    }
}

fn put<W: Write + std::io::Seek>(zip: &mut ZipWriter<W>, path: &str, content: &str) -> Result<()> {
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
    zip.start_file(path, options)
        .map_err(|e| Error::ZipError(format!("Failed to start '{}': {}", path, e)))?;
    zip.write_all(content.as_bytes())?;
    Ok(())
}

fn content_types(slides: usize) -> String {
    let mut out = format!(
        r#"{XML_DECL}<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/>"#
    );
    let overrides = [
        ("/ppt/presentation.xml", CT_PRESENTATION),
        ("/ppt/slideMasters/slideMaster1.xml", CT_MASTER),
        ("/ppt/slideLayouts/slideLayout1.xml", CT_LAYOUT),
        ("/ppt/theme/theme1.xml", CT_THEME),
        ("/docProps/core.xml", CT_CORE),
        ("/docProps/app.xml", CT_APP),
    ];
    for (part, ct) in overrides {
        let _ = write!(out, r#"<Override PartName="{part}" ContentType="{ct}"/>"#);
    }
    for n in 1..=slides {
        let _ = write!(
            out,
            r#"<Override PartName="/ppt/slides/slide{n}.xml" ContentType="{CT_SLIDE}"/>"#
        );
    }
    out.push_str("</Types>");
    out
}

fn root_rels() -> String {
    format!(
        r#"{XML_DECL}<Relationships xmlns="{NS_PKG_RELS}"><Relationship Id="rId1" Type="{REL_OFFICE_DOC}" Target="ppt/presentation.xml"/><Relationship Id="rId2" Type="{REL_CORE_PROPS}" Target="docProps/core.xml"/><Relationship Id="rId3" Type="{REL_APP_PROPS}" Target="docProps/app.xml"/></Relationships>"#
    )
}

fn core_props(title: &str) -> String {
    format!(
        r#"{XML_DECL}<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"><dc:title>{}</dc:title><dc:creator>CanvasDeck</dc:creator></cp:coreProperties>"#,
        escape(title)
    )
}

fn app_props(slides: usize) -> String {
    format!(
        r#"{XML_DECL}<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties"><Application>CanvasDeck</Application><PresentationFormat>On-screen Show (16:9)</PresentationFormat><Slides>{slides}</Slides></Properties>"#
    )
}

/// Slide `n` (1-based) is `rId{n+1}`; `rId1` is the master and the theme
/// comes last.
fn presentation(slides: usize) -> String {
    let mut out = format!(
        r#"{XML_DECL}<p:presentation xmlns:a="{NS_A}" xmlns:r="{NS_R}" xmlns:p="{NS_P}" saveSubsetFonts="1"><p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst><p:sldIdLst>"#
    );
    for n in 1..=slides {
        let _ = write!(out, r#"<p:sldId id="{}" r:id="rId{}"/>"#, 255 + n, n + 1);
    }
    let _ = write!(
        out,
        r#"</p:sldIdLst><p:sldSz cx="{}" cy="{}"/><p:notesSz cx="{}" cy="{}"/></p:presentation>"#,
        emu(SLIDE_WIDTH),
        emu(SLIDE_HEIGHT),
        emu(SLIDE_HEIGHT),
        emu(SLIDE_WIDTH)
    );
    out
}

fn presentation_rels(slides: usize) -> String {
    let mut out = format!(
        r#"{XML_DECL}<Relationships xmlns="{NS_PKG_RELS}"><Relationship Id="rId1" Type="{REL_SLIDE_MASTER}" Target="slideMasters/slideMaster1.xml"/>"#
    );
    for n in 1..=slides {
        let _ = write!(
            out,
            r#"<Relationship Id="rId{}" Type="{REL_SLIDE}" Target="slides/slide{}.xml"/>"#,
            n + 1,
            n
        );
    }
    let _ = write!(
        out,
        r#"<Relationship Id="rId{}" Type="{REL_THEME}" Target="theme/theme1.xml"/></Relationships>"#,
        slides + 2
    );
    out
}

const EMPTY_TREE: &str = r#"<p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr></p:spTree>"#;

fn slide_master() -> String {
    format!(
        r#"{XML_DECL}<p:sldMaster xmlns:a="{NS_A}" xmlns:r="{NS_R}" xmlns:p="{NS_P}"><p:cSld><p:bg><p:bgRef idx="1001"><a:schemeClr val="bg1"/></p:bgRef></p:bg>{EMPTY_TREE}</p:cSld><p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/><p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/></p:sldLayoutIdLst><p:txStyles><p:titleStyle><a:lvl1pPr><a:defRPr sz="4400"/></a:lvl1pPr></p:titleStyle><p:bodyStyle><a:lvl1pPr><a:defRPr sz="1800"/></a:lvl1pPr></p:bodyStyle><p:otherStyle><a:lvl1pPr><a:defRPr sz="1800"/></a:lvl1pPr></p:otherStyle></p:txStyles></p:sldMaster>"#
    )
}

fn slide_master_rels() -> String {
    format!(
        r#"{XML_DECL}<Relationships xmlns="{NS_PKG_RELS}"><Relationship Id="rId1" Type="{REL_SLIDE_LAYOUT}" Target="../slideLayouts/slideLayout1.xml"/><Relationship Id="rId2" Type="{REL_THEME}" Target="../theme/theme1.xml"/></Relationships>"#
    )
}

fn slide_layout() -> String {
    format!(
        r#"{XML_DECL}<p:sldLayout xmlns:a="{NS_A}" xmlns:r="{NS_R}" xmlns:p="{NS_P}" type="blank" preserve="1"><p:cSld name="Blank">{EMPTY_TREE}</p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>"#
    )
}

fn slide_layout_rels() -> String {
    format!(
        r#"{XML_DECL}<Relationships xmlns="{NS_PKG_RELS}"><Relationship Id="rId1" Type="{REL_SLIDE_MASTER}" Target="../slideMasters/slideMaster1.xml"/></Relationships>"#
    )
}

/// Office theme carrying the deck theme's colors and fonts, so text added
/// later in an editor picks them up.
fn theme_part(theme: &Theme) -> String {
    let e = &theme.export;
    let accents: Vec<&str> = (0..6).map(|i| theme.chart_color(i)).collect();
    let mut out = format!(
        r#"{XML_DECL}<a:theme xmlns:a="{NS_A}" name="CanvasDeck {}"><a:themeElements><a:clrScheme name="{}">"#,
        theme.label, theme.label
    );
    let _ = write!(
        out,
        r#"<a:dk1><a:srgbClr val="{}"/></a:dk1><a:lt1><a:srgbClr val="{}"/></a:lt1><a:dk2><a:srgbClr val="{}"/></a:dk2><a:lt2><a:srgbClr val="{}"/></a:lt2>"#,
        e.text, e.background, e.subtext, e.card_fill
    );
    for (i, color) in std::iter::once(e.accent).chain(accents.into_iter().skip(1)).enumerate() {
        let _ = write!(out, r#"<a:accent{n}><a:srgbClr val="{color}"/></a:accent{n}>"#, n = i + 1);
    }
    let _ = write!(
        out,
        r#"<a:hlink><a:srgbClr val="{}"/></a:hlink><a:folHlink><a:srgbClr val="{}"/></a:folHlink></a:clrScheme>"#,
        e.accent, e.subtext
    );
    let _ = write!(
        out,
        r#"<a:fontScheme name="CanvasDeck"><a:majorFont><a:latin typeface="{HEADING_FONT}"/><a:ea typeface=""/><a:cs typeface=""/></a:majorFont><a:minorFont><a:latin typeface="{BODY_FONT}"/><a:ea typeface=""/><a:cs typeface=""/></a:minorFont></a:fontScheme>"#
    );
    out.push_str(FORMAT_SCHEME);
    out.push_str("</a:themeElements></a:theme>");
    out
}

const FORMAT_SCHEME: &str = r#"<a:fmtScheme name="Office"><a:fillStyleLst><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:fillStyleLst><a:lnStyleLst><a:ln w="6350"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln><a:ln w="12700"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln><a:ln w="19050"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln></a:lnStyleLst><a:effectStyleLst><a:effectStyle><a:effectLst/></a:effectStyle><a:effectStyle><a:effectLst/></a:effectStyle><a:effectStyle><a:effectLst/></a:effectStyle></a:effectStyleLst><a:bgFillStyleLst><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:bgFillStyleLst></a:fmtScheme>"#;

#[cfg(test)]
mod tests {
    use super::*;
    use deck_core::ThemeKey;

    #[test]
    fn test_presentation_lists_slides_in_order() {
        let xml = presentation(3);
        assert!(xml.contains(r#"<p:sldId id="256" r:id="rId2"/><p:sldId id="257" r:id="rId3"/><p:sldId id="258" r:id="rId4"/>"#));
        assert!(xml.contains(r#"<p:sldSz cx="9144000" cy="5143500"/>"#));

        let rels = presentation_rels(3);
        assert!(rels.contains(r#"Id="rId4" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide3.xml""#));
        assert!(rels.contains(r#"Id="rId5" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme""#));
    }

    #[test]
    fn test_content_types_cover_slides() {
        let xml = content_types(2);
        assert!(xml.contains("/ppt/slides/slide1.xml"));
        assert!(xml.contains("/ppt/slides/slide2.xml"));
        assert!(!xml.contains("/ppt/slides/slide3.xml"));
    }

    #[test]
    fn test_theme_part_uses_palette_and_fonts() {
        let theme = Theme::get(ThemeKey::Executive);
        let xml = theme_part(theme);
        assert!(xml.contains(&format!(r#"<a:accent1><a:srgbClr val="{}"/>"#, theme.export.accent)));
        assert!(xml.contains("<a:accent6>"));
        assert!(xml.contains(r#"<a:latin typeface="Space Grotesk"/>"#));
        assert!(xml.contains(r#"<a:latin typeface="Urbanist"/>"#));
    }

    #[test]
    fn test_core_props_escape_title() {
        assert!(core_props("Q&A").contains("<dc:title>Q&amp;A</dc:title>"));
    }

    #[test]
    fn test_empty_writer_produces_archive() {
        let writer = PptxWriter::new(Theme::get(ThemeKey::Cyber), "Empty");
        assert_eq!(writer.slide_count(), 0);
        let bytes = writer.finish().unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }
}
