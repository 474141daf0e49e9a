//! Reads a .pptx back: slide order, named shapes with their text, and
//! linked images.

use std::collections::HashMap;
use std::io::{Read, Seek};

use deck_core::{Error, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::Serialize;
use zip::ZipArchive;

use crate::xml::EMU_PER_INCH;

/// A shape as found in a slide part.
#[derive(Debug, Clone, Default, Serialize)]
pub struct InspectedShape {
    pub name: String,
    /// Paragraphs joined with `\n`.
    pub text: String,
    /// Offset in inches.
    pub x: f64,
    pub y: f64,
    pub is_picture: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct InspectedSlide {
    /// 1-based position in the presentation.
    pub number: usize,
    /// Part path inside the archive, e.g. `ppt/slides/slide1.xml`.
    pub path: String,
    pub shapes: Vec<InspectedShape>,
    /// External image targets from the slide's relationships.
    pub image_links: Vec<String>,
}

impl InspectedSlide {
    /// First shape with exactly this name.
    pub fn shape(&self, name: &str) -> Option<&InspectedShape> {
        self.shapes.iter().find(|s| s.name == name)
    }

    /// Non-empty shape texts in document order.
    pub fn texts(&self) -> Vec<&str> {
        self.shapes
            .iter()
            .map(|s| s.text.as_str())
            .filter(|t| !t.is_empty())
            .collect()
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct InspectedDeck {
    pub title: Option<String>,
    pub slides: Vec<InspectedSlide>,
}

/// Reader for .pptx archives.
pub struct PptxInspector;

impl PptxInspector {
    pub fn new() -> Self {
        Self
    }

    /// Inspect a .pptx from a reader.
    pub fn inspect<R: Read + Seek>(&self, reader: R) -> Result<InspectedDeck> {
        let mut archive = ZipArchive::new(reader)
            .map_err(|e| Error::ZipError(format!("Failed to open ZIP: {}", e)))?;

        let title = match read_part(&mut archive, "docProps/core.xml") {
            Ok(xml) => element_text(&xml, b"title"),
            Err(_) => None,
        };

        let mut deck = InspectedDeck {
            title,
            slides: Vec::new(),
        };
        for (idx, path) in self.slide_order(&mut archive)?.into_iter().enumerate() {
            let xml = read_part(&mut archive, &path)?;
            let shapes = extract_shapes(&xml)?;
            let image_links = match read_part(&mut archive, &rels_path_for(&path)) {
                Ok(rels) => relationships(&rels)?
                    .into_iter()
                    .filter(|r| r.external && r.rel_type.ends_with("/image"))
                    .map(|r| r.target)
                    .collect(),
                Err(_) => Vec::new(),
            };
            deck.slides.push(InspectedSlide {
                number: idx + 1,
                path,
                shapes,
                image_links,
            });
        }
        log::debug!("inspected {} slides", deck.slides.len());
        Ok(deck)
    }

    /// Slide part paths in presentation order.
    ///
    /// `p:sldIdLst` in presentation.xml is authoritative; when it is missing
    /// the slide relationships are ordered by the number in their target.
    fn slide_order<R: Read + Seek>(&self, archive: &mut ZipArchive<R>) -> Result<Vec<String>> {
        let rels = relationships(&read_part(archive, "ppt/_rels/presentation.xml.rels")?)?;
        let slide_rels: HashMap<String, String> = rels
            .into_iter()
            .filter(|r| r.rel_type.ends_with("/slide"))
            .map(|r| (r.id, resolve_target(&r.target)))
            .collect();

        let listed = slide_id_list(&read_part(archive, "ppt/presentation.xml")?)?;
        if !listed.is_empty() {
            return listed
                .into_iter()
                .map(|rid| {
                    slide_rels.get(&rid).cloned().ok_or_else(|| {
                        Error::XmlError(format!("Slide relationship '{}' not found", rid))
                    })
                })
                .collect();
        }

        let mut slides: Vec<String> = slide_rels.into_values().collect();
        slides.sort_by_key(|path| (extract_slide_number(path), path.clone()));
        Ok(slides)
    }
}

impl Default for PptxInspector {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
struct Relationship {
    id: String,
    rel_type: String,
    target: String,
    external: bool,
}

fn relationships(xml: &str) -> Result<Vec<Relationship>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut rels = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if local_name(e.name().as_ref()) == b"Relationship" =>
            {
                rels.push(Relationship {
                    id: attr(e, b"Id").unwrap_or_default(),
                    rel_type: attr(e, b"Type").unwrap_or_default(),
                    target: attr(e, b"Target").unwrap_or_default(),
                    external: attr(e, b"TargetMode").as_deref() == Some("External"),
                });
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!(
                    "Error parsing relationships: {}",
                    e
                )));
            }
            _ => {}
        }
    }
    Ok(rels)
}

/// Relationship ids of `p:sldId` entries, in order.
fn slide_id_list(xml: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut ids = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if local_name(e.name().as_ref()) == b"sldId" =>
            {
                if let Some(rid) = attr(e, b"r:id") {
                    ids.push(rid);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!(
                    "Error parsing presentation.xml: {}",
                    e
                )));
            }
            _ => {}
        }
    }
    Ok(ids)
}

/// Shapes and pictures in a slide part, in tree order.
fn extract_shapes(xml: &str) -> Result<Vec<InspectedShape>> {
    let mut shapes = Vec::new();
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut current: Option<InspectedShape> = None;
    let mut paragraphs: Vec<String> = Vec::new();
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => match local_name(e.name().as_ref()) {
                b"sp" | b"pic" => {
                    current = Some(InspectedShape {
                        is_picture: local_name(e.name().as_ref()) == b"pic",
                        ..InspectedShape::default()
                    });
                    paragraphs.clear();
                }
                b"cNvPr" => read_name(&mut current, e),
                b"off" => read_offset(&mut current, e),
                b"p" if current.is_some() => paragraphs.push(String::new()),
                b"t" => in_text = true,
                _ => {}
            },
            Ok(Event::Empty(ref e)) => match local_name(e.name().as_ref()) {
                b"cNvPr" => read_name(&mut current, e),
                b"off" => read_offset(&mut current, e),
                b"p" if current.is_some() => paragraphs.push(String::new()),
                _ => {}
            },
            Ok(Event::Text(ref e)) if in_text => {
                let text = e.unescape().unwrap_or_default();
                match paragraphs.last_mut() {
                    Some(p) => p.push_str(&text),
                    None => paragraphs.push(text.into_owned()),
                }
            }
            Ok(Event::End(ref e)) => match local_name(e.name().as_ref()) {
                b"sp" | b"pic" => {
                    if let Some(mut shape) = current.take() {
                        shape.text = paragraphs.join("\n").trim().to_string();
                        shapes.push(shape);
                    }
                    paragraphs.clear();
                }
                b"t" => in_text = false,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!("Error parsing slide: {}", e)));
            }
            _ => {}
        }
    }

    Ok(shapes)
}

fn read_name(current: &mut Option<InspectedShape>, e: &BytesStart<'_>) {
    if let Some(shape) = current {
        if shape.name.is_empty() {
            shape.name = attr(e, b"name").unwrap_or_default();
        }
    }
}

/// Only the first offset of a shape is its position.
fn read_offset(current: &mut Option<InspectedShape>, e: &BytesStart<'_>) {
    let Some(shape) = current else {
        return;
    };
    if shape.x != 0.0 || shape.y != 0.0 {
        return;
    }
    let inches = |key: &[u8]| {
        attr(e, key)
            .and_then(|v| v.parse::<f64>().ok())
            .map(|emu| emu / EMU_PER_INCH)
            .unwrap_or_default()
    };
    shape.x = inches(b"x");
    shape.y = inches(b"y");
}

/// Text of the first element with this local name.
fn element_text(xml: &str, name: &[u8]) -> Option<String> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut inside = false;
    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) if local_name(e.name().as_ref()) == name => inside = true,
            Ok(Event::Text(ref e)) if inside => {
                return e.unescape().ok().map(|t| t.into_owned());
            }
            Ok(Event::End(_)) if inside => return None,
            Ok(Event::Eof) | Err(_) => return None,
            _ => {}
        }
    }
}

fn attr(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

fn read_part<R: Read + Seek>(archive: &mut ZipArchive<R>, path: &str) -> Result<String> {
    let mut file = archive
        .by_name(path)
        .map_err(|e| Error::ZipError(format!("File not found in archive '{}': {}", path, e)))?;

    let mut content = String::new();
    file.read_to_string(&mut content)
        .map_err(|e| Error::ZipError(format!("Failed to read '{}': {}", path, e)))?;

    Ok(content)
}

/// Targets in presentation.xml.rels are relative to `ppt/`.
fn resolve_target(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("ppt/{}", target),
    }
}

/// `ppt/slides/slide3.xml` -> `ppt/slides/_rels/slide3.xml.rels`
fn rels_path_for(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part),
    }
}

/// Extract the local name from a potentially namespaced XML element name.
fn local_name(name: &[u8]) -> &[u8] {
    match name.iter().position(|&b| b == b':') {
        Some(pos) => &name[pos + 1..],
        None => name,
    }
}

/// Trailing number of a part name such as "slide3.xml".
fn extract_slide_number(s: &str) -> Option<usize> {
    let s = s.trim_end_matches(".xml");
    let start = s.trim_end_matches(|c: char| c.is_ascii_digit()).len();
    s[start..].parse().ok()
}
