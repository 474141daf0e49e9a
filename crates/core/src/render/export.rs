//! Export rendering: slide to drawing primitives.
//!
//! Geometry is in inches on a 16:9 slide of [`SLIDE_WIDTH`] × [`SLIDE_HEIGHT`];
//! colors are `RRGGBB` triplets from the theme's export palette. Every
//! primitive is named so the written file can be inspected shape by shape.

use serde::Serialize;

use super::{bar_percent, bento_cell, marker_position, RenderContext};
use crate::theme::{BODY_FONT, HEADING_FONT};
use crate::types::{
    format_value, BentoSlide, ChartSlide, PlainSlide, Slide, SplitSlide, StatSlide,
    TimelineSlide, TitleSlide,
};

/// Slide width in inches.
pub const SLIDE_WIDTH: f64 = 10.0;

/// Slide height in inches.
pub const SLIDE_HEIGHT: f64 = 5.625;

/// Position and size in inches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Frame {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Frame {
    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// The whole slide.
    pub const fn full() -> Self {
        Self::new(0.0, 0.0, SLIDE_WIDTH, SLIDE_HEIGHT)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum VAlign {
    #[default]
    Top,
    Middle,
    Bottom,
}

/// A text box. Each entry of `paragraphs` is its own paragraph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextPrimitive {
    pub name: String,
    pub frame: Frame,
    pub paragraphs: Vec<String>,
    /// Font size in points.
    pub font_size: f64,
    pub font: &'static str,
    pub bold: bool,
    pub color: &'static str,
    pub align: Align,
    pub valign: VAlign,
    pub bullets: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ShapeKind {
    Rect,
    RoundRect,
    Ellipse,
    Line,
}

/// Outline of a shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Stroke {
    pub color: &'static str,
    /// Width in points.
    pub width: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShapePrimitive {
    pub name: String,
    pub kind: ShapeKind,
    pub frame: Frame,
    pub fill: Option<&'static str>,
    pub stroke: Option<Stroke>,
}

/// An externally linked image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImagePrimitive {
    pub name: String,
    pub frame: Frame,
    pub url: String,
    pub description: String,
    /// Transparency in percent, 0 is opaque.
    pub transparency: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Primitive {
    Text(TextPrimitive),
    Shape(ShapePrimitive),
    Image(ImagePrimitive),
}

impl Primitive {
    pub fn name(&self) -> &str {
        match self {
            Self::Text(t) => &t.name,
            Self::Shape(s) => &s.name,
            Self::Image(i) => &i.name,
        }
    }
}

/// One slide's worth of primitives, in drawing order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportSlide {
    pub layout: String,
    pub background: &'static str,
    pub primitives: Vec<Primitive>,
}

impl ExportSlide {
    /// Primitives whose name starts with `prefix`.
    pub fn named<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a Primitive> + 'a {
        self.primitives
            .iter()
            .filter(move |p| p.name().starts_with(prefix))
    }

    /// All text in drawing order.
    pub fn texts(&self) -> Vec<&str> {
        self.primitives
            .iter()
            .filter_map(|p| match p {
                Primitive::Text(t) => Some(t),
                _ => None,
            })
            .flat_map(|t| t.paragraphs.iter().map(String::as_str))
            .collect()
    }
}

/// Collects primitives for one slide.
struct Canvas<'a> {
    ctx: &'a RenderContext<'a>,
    primitives: Vec<Primitive>,
}

impl<'a> Canvas<'a> {
    fn new(ctx: &'a RenderContext<'a>) -> Self {
        Self {
            ctx,
            primitives: Vec::new(),
        }
    }

    fn text(&mut self, name: impl Into<String>, frame: Frame, text: &str, size: f64) -> &mut TextPrimitive {
        self.paragraphs(name, frame, vec![text.to_string()], size)
    }

    fn paragraphs(
        &mut self,
        name: impl Into<String>,
        frame: Frame,
        paragraphs: Vec<String>,
        size: f64,
    ) -> &mut TextPrimitive {
        self.primitives.push(Primitive::Text(TextPrimitive {
            name: name.into(),
            frame,
            paragraphs,
            font_size: size,
            font: BODY_FONT,
            bold: false,
            color: self.ctx.theme.export.subtext,
            align: Align::Left,
            valign: VAlign::Top,
            bullets: false,
        }));
        match self.primitives.last_mut() {
            Some(Primitive::Text(t)) => t,
            _ => unreachable!("text primitive was just pushed"),
        }
    }

    /// Bold heading text in the theme's text color.
    fn heading(&mut self, name: impl Into<String>, frame: Frame, text: &str, size: f64) -> &mut TextPrimitive {
        let color = self.ctx.theme.export.text;
        let t = self.text(name, frame, text, size);
        t.bold = true;
        t.font = HEADING_FONT;
        t.color = color;
        t
    }

    fn shape(
        &mut self,
        name: impl Into<String>,
        kind: ShapeKind,
        frame: Frame,
        fill: Option<&'static str>,
        stroke: Option<Stroke>,
    ) {
        self.primitives.push(Primitive::Shape(ShapePrimitive {
            name: name.into(),
            kind,
            frame,
            fill,
            stroke,
        }));
    }

    fn image(&mut self, name: impl Into<String>, frame: Frame, url: String, description: &str, transparency: u8) {
        self.primitives.push(Primitive::Image(ImagePrimitive {
            name: name.into(),
            frame,
            url,
            description: description.to_string(),
            transparency,
        }));
    }
}

/// Render a slide to export primitives.
pub fn render_export(slide: &Slide, ctx: &RenderContext<'_>) -> ExportSlide {
    let mut canvas = Canvas::new(ctx);
    match slide {
        Slide::TitleCyber(s) => title_cyber(s, &mut canvas),
        Slide::SplitBleed(s) => split_bleed(s, &mut canvas),
        Slide::TimelineHorizontal(s) => timeline(s, &mut canvas),
        Slide::BentoGrid(s) => bento(s, &mut canvas),
        Slide::BigStat(s) => big_stat(s, &mut canvas),
        Slide::ChartBar(s) => chart_bar(s, &mut canvas),
        Slide::Plain(s) => plain(s, &mut canvas),
    }
    ExportSlide {
        layout: slide.tag().to_string(),
        background: ctx.theme.export.background,
        primitives: canvas.primitives,
    }
}

/// Standard slide title across the top.
fn top_title(canvas: &mut Canvas<'_>, title: &str) {
    canvas.heading("Title", Frame::new(0.5, 0.4, 9.0, 0.8), title, 28.0);
}

fn title_cyber(s: &TitleSlide, canvas: &mut Canvas<'_>) {
    let palette = &canvas.ctx.theme.export;
    if let Some(url) = canvas.ctx.image_url(s.image_prompt.as_deref()) {
        let description = s.image_prompt.as_deref().unwrap_or_default();
        canvas.image("Background", Frame::full(), url, description, 60);
    }
    canvas.shape(
        "Accent Bar",
        ShapeKind::Rect,
        Frame::new(1.0, 2.3, 2.0, 0.05),
        Some(palette.accent),
        None,
    );
    canvas.heading("Title", Frame::new(1.0, 2.5, 8.0, 1.5), &s.title, 48.0);
    if let Some(subtitle) = &s.subtitle {
        canvas.text("Subtitle", Frame::new(1.0, 4.0, 8.0, 1.0), subtitle, 18.0);
    }
}

fn split_bleed(s: &SplitSlide, canvas: &mut Canvas<'_>) {
    let palette = &canvas.ctx.theme.export;
    canvas.heading("Title", Frame::new(0.5, 0.5, 4.0, 1.0), &s.title, 28.0);
    if !s.content.is_empty() {
        canvas
            .paragraphs("Bullets", Frame::new(0.5, 1.8, 4.0, 3.5), s.content.clone(), 14.0)
            .bullets = true;
    }
    let right = Frame::new(5.0, 0.0, 5.0, SLIDE_HEIGHT);
    match canvas.ctx.image_url(s.image_prompt.as_deref()) {
        Some(url) => {
            let description = s.image_prompt.as_deref().unwrap_or_default();
            canvas.image("Image", right, url, description, 0);
        }
        None => canvas.shape("Placeholder", ShapeKind::Rect, right, Some(palette.placeholder), None),
    }
}

fn timeline(s: &TimelineSlide, canvas: &mut Canvas<'_>) {
    const LINE_X: f64 = 1.0;
    const LINE_W: f64 = 8.0;
    const LINE_Y: f64 = 3.0;
    const MARKER: f64 = 0.3;

    let palette = &canvas.ctx.theme.export;
    top_title(canvas, &s.title);
    canvas.shape(
        "Timeline",
        ShapeKind::Line,
        Frame::new(LINE_X, LINE_Y, LINE_W, 0.0),
        None,
        Some(Stroke {
            color: palette.subtext,
            width: 2.0,
        }),
    );

    let entries = s.visible_entries();
    for (i, entry) in entries.iter().enumerate() {
        let n = i + 1;
        let center = LINE_X + LINE_W * marker_position(i, entries.len());
        canvas.shape(
            format!("Marker {}", n),
            ShapeKind::Ellipse,
            Frame::new(center - MARKER / 2.0, LINE_Y - MARKER / 2.0, MARKER, MARKER),
            Some(palette.background),
            Some(Stroke {
                color: palette.accent,
                width: 3.0,
            }),
        );

        let year = canvas.heading(format!("Year {}", n), Frame::new(center - 0.65, 2.3, 1.3, 0.4), &entry.year, 16.0);
        year.align = Align::Center;
        year.color = palette.accent;

        let title = canvas.heading(format!("Step {}", n), Frame::new(center - 0.95, 3.3, 1.9, 0.5), &entry.title, 12.0);
        title.align = Align::Center;

        let desc = canvas.text(format!("Detail {}", n), Frame::new(center - 0.95, 3.8, 1.9, 0.8), &entry.description, 10.0);
        desc.align = Align::Center;
    }
}

fn bento(s: &BentoSlide, canvas: &mut Canvas<'_>) {
    const CARD_W: f64 = 4.25;
    const CARD_H: f64 = 1.8;

    let palette = &canvas.ctx.theme.export;
    top_title(canvas, &s.title);

    for (i, block) in s.visible_blocks().iter().enumerate() {
        let n = i + 1;
        let (col, row) = bento_cell(i);
        let x = 0.5 + col as f64 * 4.75;
        let y = 1.5 + row as f64 * 2.1;

        canvas.shape(
            format!("Card {}", n),
            ShapeKind::RoundRect,
            Frame::new(x, y, CARD_W, CARD_H),
            Some(palette.card_fill),
            Some(Stroke {
                color: palette.card_line,
                width: 1.0,
            }),
        );
        canvas.shape(
            format!("Icon {}", n),
            ShapeKind::Ellipse,
            Frame::new(x + 0.2, y + 0.2, 0.5, 0.5),
            Some(palette.accent),
            None,
        );
        canvas.heading(format!("Card Title {}", n), Frame::new(x + 0.2, y + 0.8, 3.8, 0.4), &block.title, 14.0);
        canvas.text(format!("Card Body {}", n), Frame::new(x + 0.2, y + 1.1, 3.8, 0.6), &block.body, 11.0);
    }
}

fn big_stat(s: &StatSlide, canvas: &mut Canvas<'_>) {
    let palette = &canvas.ctx.theme.export;
    let (value, label) = s
        .stat
        .as_ref()
        .map(|st| (st.value.as_str(), st.label.as_str()))
        .unwrap_or_default();

    let stat = canvas.heading("Stat", Frame::new(0.5, 1.5, 5.0, 2.5), value, 120.0);
    stat.color = palette.accent;
    stat.align = Align::Center;
    stat.valign = VAlign::Middle;

    if !label.is_empty() {
        canvas.text("Stat Label", Frame::new(0.5, 4.0, 5.0, 0.5), label, 14.0).align = Align::Center;
    }

    canvas.shape(
        "Divider",
        ShapeKind::Line,
        Frame::new(5.5, 2.0, 0.0, 2.0),
        None,
        Some(Stroke {
            color: palette.accent,
            width: 3.0,
        }),
    );
    canvas
        .heading("Title", Frame::new(6.0, 2.0, 3.5, 1.0), &s.title, 24.0)
        .valign = VAlign::Bottom;
    canvas.text("Support", Frame::new(6.0, 3.0, 3.5, 1.5), s.supporting_text(), 14.0);
}

fn chart_bar(s: &ChartSlide, canvas: &mut Canvas<'_>) {
    const LABEL_X: f64 = 0.5;
    const LABEL_W: f64 = 1.8;
    const TRACK_X: f64 = 2.5;
    const TRACK_W: f64 = 7.0;
    const AREA_Y: f64 = 1.5;
    const AREA_H: f64 = 3.5;

    let theme = canvas.ctx.theme;
    top_title(canvas, &s.title);

    let Some(chart) = &s.chart else {
        return;
    };
    if chart.is_empty() {
        return;
    }

    let row_h = (AREA_H / chart.len() as f64).min(0.9);
    let bar_h = row_h * 0.6;
    for (i, (label, value)) in chart.bars().enumerate() {
        let n = i + 1;
        let y = AREA_Y + row_h * i as f64 + (row_h - bar_h) / 2.0;
        let bar_w = TRACK_W * bar_percent(value) / 100.0;

        let l = canvas.heading(format!("Label {}", n), Frame::new(LABEL_X, y, LABEL_W, bar_h), label, 12.0);
        l.align = Align::Right;
        l.valign = VAlign::Middle;

        canvas.shape(
            format!("Track {}", n),
            ShapeKind::RoundRect,
            Frame::new(TRACK_X, y, TRACK_W, bar_h),
            Some(theme.export.card_fill),
            None,
        );
        canvas.shape(
            format!("Bar {}", n),
            ShapeKind::RoundRect,
            Frame::new(TRACK_X, y, bar_w, bar_h),
            Some(theme.chart_color(i)),
            None,
        );

        let text = format!("{}{}", format_value(value), chart.unit);
        let v = canvas.heading(format!("Value {}", n), Frame::new(TRACK_X, y, bar_w.max(1.2), bar_h), &text, 12.0);
        v.align = Align::Right;
        v.valign = VAlign::Middle;
        v.color = theme.export.text;
    }
}

fn plain(s: &PlainSlide, canvas: &mut Canvas<'_>) {
    canvas.heading("Title", Frame::new(0.5, 0.5, 9.0, 1.0), &s.title, 24.0);
    if !s.content.is_empty() {
        canvas.paragraphs("Content", Frame::new(0.5, 1.5, 9.0, 3.5), s.content.clone(), 14.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::{ImageUrlBuilder, SeedPolicy};
    use crate::theme::{Theme, ThemeKey};
    use crate::types::{Block, Chart, Stat, TimelineEntry};

    fn render(slide: &Slide, key: ThemeKey) -> ExportSlide {
        let images = ImageUrlBuilder::new().with_seed_policy(SeedPolicy::Derived);
        render_export(slide, &RenderContext::new(Theme::get(key), &images))
    }

    fn minimal_slides() -> Vec<Slide> {
        vec![
            Slide::TitleCyber(TitleSlide {
                title: "T".into(),
                ..Default::default()
            }),
            Slide::SplitBleed(SplitSlide {
                title: "S".into(),
                ..Default::default()
            }),
            Slide::TimelineHorizontal(TimelineSlide {
                title: "L".into(),
                ..Default::default()
            }),
            Slide::BentoGrid(BentoSlide {
                title: "B".into(),
                ..Default::default()
            }),
            Slide::BigStat(StatSlide {
                title: "N".into(),
                ..Default::default()
            }),
            Slide::ChartBar(ChartSlide {
                title: "C".into(),
                chart: None,
            }),
        ]
    }

    #[test]
    fn test_minimal_slides_render() {
        for slide in minimal_slides() {
            let out = render(&slide, ThemeKey::Cyber);
            assert!(!out.primitives.is_empty(), "{} rendered nothing", slide.tag());
            assert_eq!(out.layout, slide.tag());
            assert_eq!(out.background, "0F0F0F");
        }
    }

    #[test]
    fn test_split_placeholder_fill() {
        let out = render(&minimal_slides()[1], ThemeKey::Cyber);
        match out.named("Placeholder").next() {
            Some(Primitive::Shape(s)) => {
                assert_eq!(s.fill, Some("333333"));
                assert_eq!(s.frame, Frame::new(5.0, 0.0, 5.0, SLIDE_HEIGHT));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(out.named("Image").count(), 0);
    }

    #[test]
    fn test_title_background_transparency() {
        let slide = Slide::TitleCyber(TitleSlide {
            title: "T".into(),
            subtitle: None,
            image_prompt: Some("aurora".into()),
        });
        let out = render(&slide, ThemeKey::Cyber);
        match &out.primitives[0] {
            Primitive::Image(img) => {
                assert_eq!(img.transparency, 60);
                assert_eq!(img.frame, Frame::full());
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_chart_bars_cycle_palette() {
        let slide = Slide::ChartBar(ChartSlide {
            title: "Mix".into(),
            chart: Some(Chart::new(
                (0..6).map(|i| format!("L{}", i)).collect(),
                vec![10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0],
                "%",
            )),
        });
        let theme = Theme::get(ThemeKey::Electric);
        let out = render(&slide, ThemeKey::Electric);
        let bars: Vec<_> = out
            .named("Bar ")
            .map(|p| match p {
                Primitive::Shape(s) => s.clone(),
                other => panic!("unexpected {:?}", other),
            })
            .collect();
        assert_eq!(bars.len(), 6);
        for (i, bar) in bars.iter().enumerate() {
            assert_eq!(bar.fill, Some(theme.chart_color(i)));
        }
        assert_eq!(bars[4].fill, bars[0].fill);
        assert!((bars[1].frame.w - 7.0 * 0.2).abs() < 1e-9);
        assert!(out.texts().contains(&"60%"));
    }

    #[test]
    fn test_bento_card_positions() {
        let slide = Slide::BentoGrid(BentoSlide {
            title: "Grid".into(),
            blocks: vec![Block::default(); 5],
        });
        let out = render(&slide, ThemeKey::Executive);
        let cards: Vec<Frame> = out
            .named("Card ")
            .filter_map(|p| match p {
                Primitive::Shape(s) => Some(s.frame),
                _ => None,
            })
            .collect();
        assert_eq!(cards.len(), 4);
        assert_eq!((cards[0].x, cards[0].y), (0.5, 1.5));
        assert_eq!((cards[1].x, cards[1].y), (5.25, 1.5));
        assert_eq!((cards[2].x, cards[2].y), (0.5, 3.6));
        assert_eq!((cards[3].x, cards[3].y), (5.25, 3.6));
        match out.named("Card 1").next() {
            Some(Primitive::Shape(s)) => assert_eq!(s.fill, Some("F1F5F9")),
            other => panic!("unexpected {:?}", other),
        };
    }

    #[test]
    fn test_timeline_markers() {
        let slide = Slide::TimelineHorizontal(TimelineSlide {
            title: "Steps".into(),
            entries: vec![TimelineEntry::default(); 5],
        });
        let out = render(&slide, ThemeKey::Cyber);
        assert_eq!(out.named("Marker ").count(), 4);
        assert_eq!(out.named("Timeline").count(), 1);
    }

    #[test]
    fn test_big_stat_support_text() {
        let slide = Slide::BigStat(StatSlide {
            title: "Jobs".into(),
            stat: Some(Stat {
                value: "12M".into(),
                label: "Jobs".into(),
            }),
            subtitle: Some("Worldwide".into()),
            content: vec![],
        });
        let out = render(&slide, ThemeKey::Cyber);
        assert_eq!(out.texts(), vec!["12M", "Jobs", "Jobs", "Worldwide"]);
    }

    #[test]
    fn test_plain_joins_content() {
        let slide = Slide::Plain(PlainSlide {
            layout: "quote".into(),
            title: "Words".into(),
            content: vec!["a".into(), "b".into()],
        });
        let out = render(&slide, ThemeKey::Cyber);
        assert_eq!(out.texts(), vec!["Words", "a", "b"]);
    }

    #[test]
    fn test_same_input_same_primitives() {
        for slide in minimal_slides() {
            assert_eq!(render(&slide, ThemeKey::Cyber), render(&slide, ThemeKey::Cyber));
        }
    }
}
