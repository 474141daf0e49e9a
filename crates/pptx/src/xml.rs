//! DrawingML for one slide part.
//!
//! Every primitive becomes one `p:sp` (text boxes, shapes, lines) or `p:pic`
//! (linked images). Shape ids start at 2; id 1 is the slide's group root.
//! The primitive's name is written as `cNvPr/@name` so the inspector can
//! find it again.

use std::fmt::Write;

use deck_core::render::{
    Align, ExportSlide, Frame, ImagePrimitive, Primitive, ShapeKind, ShapePrimitive, Stroke,
    TextPrimitive, VAlign,
};
use quick_xml::escape::escape;

pub const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
pub const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
pub const NS_P: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
pub const NS_PKG_RELS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

pub const REL_IMAGE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
pub const REL_SLIDE_LAYOUT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";

pub const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// English Metric Units per inch.
pub const EMU_PER_INCH: f64 = 914_400.0;

/// EMU per point, for line widths.
const EMU_PER_POINT: f64 = 12_700.0;

/// Left indent of bulleted paragraphs.
const BULLET_INDENT: i64 = 285_750;

pub fn emu(inches: f64) -> i64 {
    (inches * EMU_PER_INCH).round() as i64
}

/// A rendered slide part and the external image targets it links, in
/// relationship order (`rId2`, `rId3`, ...; `rId1` is the layout).
#[derive(Debug, Clone)]
pub struct SlidePart {
    pub xml: String,
    pub image_links: Vec<String>,
}

/// Write the XML for one slide.
pub fn slide_xml(slide: &ExportSlide) -> SlidePart {
    let mut out = String::with_capacity(4096);
    let mut image_links = Vec::new();

    let _ = write!(
        out,
        r#"{XML_DECL}<p:sld xmlns:a="{NS_A}" xmlns:r="{NS_R}" xmlns:p="{NS_P}"><p:cSld>"#
    );
    let _ = write!(
        out,
        r#"<p:bg><p:bgPr><a:solidFill><a:srgbClr val="{}"/></a:solidFill><a:effectLst/></p:bgPr></p:bg>"#,
        slide.background
    );
    out.push_str(
        r#"<p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#,
    );

    for (i, primitive) in slide.primitives.iter().enumerate() {
        let id = i + 2;
        match primitive {
            Primitive::Text(t) => write_text(&mut out, id, t),
            Primitive::Shape(s) => write_shape(&mut out, id, s),
            Primitive::Image(img) => {
                image_links.push(img.url.clone());
                let rel_id = format!("rId{}", image_links.len() + 1);
                write_image(&mut out, id, img, &rel_id);
            }
        }
    }

    out.push_str(r#"</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>"#);
    SlidePart { xml: out, image_links }
}

/// Relationships of a slide part: its layout, then each linked image.
pub fn slide_rels_xml(image_links: &[String]) -> String {
    let mut out = format!(r#"{XML_DECL}<Relationships xmlns="{NS_PKG_RELS}">"#);
    let _ = write!(
        out,
        r#"<Relationship Id="rId1" Type="{REL_SLIDE_LAYOUT}" Target="../slideLayouts/slideLayout1.xml"/>"#
    );
    for (i, url) in image_links.iter().enumerate() {
        let _ = write!(
            out,
            r#"<Relationship Id="rId{}" Type="{REL_IMAGE}" Target="{}" TargetMode="External"/>"#,
            i + 2,
            escape(url.as_str())
        );
    }
    out.push_str("</Relationships>");
    out
}

fn write_xfrm(out: &mut String, frame: &Frame) {
    let _ = write!(
        out,
        r#"<a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm>"#,
        emu(frame.x),
        emu(frame.y),
        emu(frame.w),
        emu(frame.h)
    );
}

fn write_nv(out: &mut String, id: usize, name: &str, tx_box: bool) {
    let _ = write!(
        out,
        r#"<p:nvSpPr><p:cNvPr id="{}" name="{}"/><p:cNvSpPr{}/><p:nvPr/></p:nvSpPr>"#,
        id,
        escape(name),
        if tx_box { r#" txBox="1""# } else { "" }
    );
}

fn write_line(out: &mut String, stroke: Option<&Stroke>) {
    match stroke {
        Some(s) => {
            let _ = write!(
                out,
                r#"<a:ln w="{}"><a:solidFill><a:srgbClr val="{}"/></a:solidFill></a:ln>"#,
                (s.width * EMU_PER_POINT).round() as i64,
                s.color
            );
        }
        None => out.push_str("<a:ln><a:noFill/></a:ln>"),
    }
}

fn write_text(out: &mut String, id: usize, t: &TextPrimitive) {
    out.push_str("<p:sp>");
    write_nv(out, id, &t.name, true);
    out.push_str("<p:spPr>");
    write_xfrm(out, &t.frame);
    out.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom><a:noFill/></p:spPr>"#);

    let anchor = match t.valign {
        VAlign::Top => "t",
        VAlign::Middle => "ctr",
        VAlign::Bottom => "b",
    };
    let _ = write!(
        out,
        r#"<p:txBody><a:bodyPr wrap="square" lIns="0" tIns="0" rIns="0" bIns="0" anchor="{anchor}"><a:normAutofit/></a:bodyPr><a:lstStyle/>"#
    );

    let algn = match t.align {
        Align::Left => "l",
        Align::Center => "ctr",
        Align::Right => "r",
    };
    let size = (t.font_size * 100.0).round() as i64;
    for paragraph in &t.paragraphs {
        if t.bullets {
            let _ = write!(
                out,
                r#"<a:p><a:pPr marL="{BULLET_INDENT}" indent="-{BULLET_INDENT}" algn="{algn}"><a:buFont typeface="Arial"/><a:buChar char="&#8226;"/></a:pPr>"#
            );
        } else {
            let _ = write!(out, r#"<a:p><a:pPr algn="{algn}"><a:buNone/></a:pPr>"#);
        }
        let _ = write!(
            out,
            r#"<a:r><a:rPr lang="en-US" sz="{size}" b="{}" dirty="0"><a:solidFill><a:srgbClr val="{}"/></a:solidFill><a:latin typeface="{}"/></a:rPr><a:t>{}</a:t></a:r></a:p>"#,
            u8::from(t.bold),
            t.color,
            escape(t.font),
            escape(paragraph.as_str())
        );
    }
    if t.paragraphs.is_empty() {
        out.push_str("<a:p/>");
    }
    out.push_str("</p:txBody></p:sp>");
}

fn write_shape(out: &mut String, id: usize, s: &ShapePrimitive) {
    let prst = match s.kind {
        ShapeKind::Rect => "rect",
        ShapeKind::RoundRect => "roundRect",
        ShapeKind::Ellipse => "ellipse",
        ShapeKind::Line => "line",
    };
    out.push_str("<p:sp>");
    write_nv(out, id, &s.name, false);
    out.push_str("<p:spPr>");
    write_xfrm(out, &s.frame);
    let _ = write!(out, r#"<a:prstGeom prst="{prst}"><a:avLst/></a:prstGeom>"#);
    match s.fill {
        Some(color) => {
            let _ = write!(out, r#"<a:solidFill><a:srgbClr val="{color}"/></a:solidFill>"#);
        }
        None => out.push_str("<a:noFill/>"),
    }
    write_line(out, s.stroke.as_ref());
    out.push_str("</p:spPr></p:sp>");
}

fn write_image(out: &mut String, id: usize, img: &ImagePrimitive, rel_id: &str) {
    let _ = write!(
        out,
        r#"<p:pic><p:nvPicPr><p:cNvPr id="{}" name="{}" descr="{}"/><p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr><p:nvPr/></p:nvPicPr>"#,
        id,
        escape(img.name.as_str()),
        escape(img.description.as_str())
    );
    let _ = write!(out, r#"<p:blipFill><a:blip r:link="{rel_id}">"#);
    if img.transparency > 0 {
        let amount = (100 - u32::from(img.transparency.min(100))) * 1000;
        let _ = write!(out, r#"<a:alphaModFix amt="{amount}"/>"#);
    }
    out.push_str(r#"</a:blip><a:stretch><a:fillRect/></a:stretch></p:blipFill><p:spPr>"#);
    write_xfrm(out, &img.frame);
    out.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr></p:pic>"#);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slide(primitives: Vec<Primitive>) -> ExportSlide {
        ExportSlide {
            layout: "plain".to_string(),
            background: "0F0F0F",
            primitives,
        }
    }

    #[test]
    fn test_emu() {
        assert_eq!(emu(10.0), 9_144_000);
        assert_eq!(emu(5.625), 5_143_500);
        assert_eq!(emu(0.0), 0);
    }

    #[test]
    fn test_text_is_escaped() {
        let part = slide_xml(&slide(vec![Primitive::Text(TextPrimitive {
            name: "Title".to_string(),
            frame: Frame::new(1.0, 1.0, 2.0, 1.0),
            paragraphs: vec!["R&D <2024>".to_string()],
            font_size: 28.0,
            font: "Space Grotesk",
            bold: true,
            color: "FFFFFF",
            align: Align::Center,
            valign: VAlign::Bottom,
            bullets: false,
        })]));
        assert!(part.xml.contains("<a:t>R&amp;D &lt;2024&gt;</a:t>"));
        assert!(part.xml.contains(r#"name="Title""#));
        assert!(part.xml.contains(r#"sz="2800" b="1""#));
        assert!(part.xml.contains(r#"anchor="b""#));
        assert!(part.xml.contains(r#"algn="ctr""#));
        assert!(part.image_links.is_empty());
    }

    #[test]
    fn test_images_are_linked_with_alpha() {
        let part = slide_xml(&slide(vec![
            Primitive::Shape(ShapePrimitive {
                name: "Accent Bar".to_string(),
                kind: ShapeKind::Rect,
                frame: Frame::new(1.0, 2.3, 2.0, 0.05),
                fill: Some("8B5CF6"),
                stroke: None,
            }),
            Primitive::Image(ImagePrimitive {
                name: "Background".to_string(),
                frame: Frame::full(),
                url: "https://image.example/prompt/a%20b?width=1280&height=720".to_string(),
                description: "a b".to_string(),
                transparency: 60,
            }),
        ]));
        assert!(part.xml.contains(r#"<a:blip r:link="rId2"><a:alphaModFix amt="40000"/>"#));
        assert!(part.xml.contains(r#"<a:srgbClr val="8B5CF6"/>"#));
        assert_eq!(part.image_links.len(), 1);

        let rels = slide_rels_xml(&part.image_links);
        assert!(rels.contains(r#"Id="rId2""#));
        assert!(rels.contains("width=1280&amp;height=720"));
        assert!(rels.contains(r#"TargetMode="External""#));
    }

    #[test]
    fn test_bullets_and_lines() {
        let part = slide_xml(&slide(vec![
            Primitive::Text(TextPrimitive {
                name: "Bullets".to_string(),
                frame: Frame::new(0.5, 1.8, 4.0, 3.5),
                paragraphs: vec!["one".to_string(), "two".to_string()],
                font_size: 14.0,
                font: "Urbanist",
                bold: false,
                color: "D1D5DB",
                align: Align::Left,
                valign: VAlign::Top,
                bullets: true,
            }),
            Primitive::Shape(ShapePrimitive {
                name: "Timeline".to_string(),
                kind: ShapeKind::Line,
                frame: Frame::new(1.0, 3.0, 8.0, 0.0),
                fill: None,
                stroke: Some(Stroke {
                    color: "555555",
                    width: 2.0,
                }),
            }),
        ]));
        assert_eq!(part.xml.matches("<a:buChar").count(), 2);
        assert!(part.xml.contains(r#"<a:prstGeom prst="line">"#));
        assert!(part.xml.contains(r#"<a:ln w="25400">"#));
    }
}
