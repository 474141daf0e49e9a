//! On-screen rendering: slide to visual tree.
//!
//! The tree is medium-neutral (kinds, classes, inline style) and can be
//! serialized to HTML with [`Node::to_html`] for the browser.

use askama::Template;
use serde::Serialize;

use super::{bar_percent, bento_cell, bento_icon, marker_position, RenderContext};
use crate::error::Result;
use crate::theme::{Theme, BODY_FONT, HEADING_FONT};
use crate::types::{
    format_value, BentoSlide, ChartSlide, PlainSlide, Slide, SplitSlide, StatSlide,
    TimelineSlide, TitleSlide,
};

const FONTS_URL: &str = "https://fonts.googleapis.com/css2?family=Space+Grotesk:wght@400;700&family=Urbanist:wght@400;600&display=swap";

/// Kind of a visual node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum NodeKind {
    /// Slide root.
    Section,
    /// Generic container.
    Block,
    Heading(u8),
    Text,
    Image { src: String, alt: String },
    Icon(Icon),
}

/// Icons used by the layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Icon {
    Layout,
    BarChart,
    Type,
    Grid,
    CheckCircle,
    Image,
}

impl Icon {
    pub fn name(self) -> &'static str {
        match self {
            Self::Layout => "layout",
            Self::BarChart => "bar-chart",
            Self::Type => "type",
            Self::Grid => "grid",
            Self::CheckCircle => "check-circle",
            Self::Image => "image",
        }
    }
}

/// A node of the visual tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub kind: NodeKind,
    /// Role of the node within its layout, e.g. `title` or `bar`.
    pub class: &'static str,
    pub attrs: Vec<(&'static str, String)>,
    pub style: Vec<(&'static str, String)>,
    pub text: Option<String>,
    pub children: Vec<Node>,
}

impl Node {
    fn new(kind: NodeKind, class: &'static str) -> Self {
        Self {
            kind,
            class,
            attrs: Vec::new(),
            style: Vec::new(),
            text: None,
            children: Vec::new(),
        }
    }

    pub fn section(class: &'static str) -> Self {
        Self::new(NodeKind::Section, class)
    }

    pub fn block(class: &'static str) -> Self {
        Self::new(NodeKind::Block, class)
    }

    pub fn heading(level: u8, class: &'static str, text: impl Into<String>) -> Self {
        let mut node = Self::new(NodeKind::Heading(level), class);
        node.text = Some(text.into());
        node
    }

    pub fn text(class: &'static str, text: impl Into<String>) -> Self {
        let mut node = Self::new(NodeKind::Text, class);
        node.text = Some(text.into());
        node
    }

    pub fn image(class: &'static str, src: impl Into<String>, alt: impl Into<String>) -> Self {
        Self::new(
            NodeKind::Image {
                src: src.into(),
                alt: alt.into(),
            },
            class,
        )
    }

    pub fn icon(class: &'static str, icon: Icon) -> Self {
        Self::new(NodeKind::Icon(icon), class)
    }

    /// Add an inline style property.
    pub fn style(mut self, property: &'static str, value: impl Into<String>) -> Self {
        self.style.push((property, value.into()));
        self
    }

    /// Add an attribute.
    pub fn attr(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.attrs.push((name, value.into()));
        self
    }

    pub fn child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = Node>) -> Self {
        self.children.extend(children);
        self
    }

    /// Value of an inline style property.
    pub fn style_value(&self, property: &str) -> Option<&str> {
        self.style
            .iter()
            .find(|(k, _)| *k == property)
            .map(|(_, v)| v.as_str())
    }

    /// Value of an attribute.
    pub fn attr_value(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
    }

    /// All descendants (including self) with the given class, in document order.
    pub fn find_all(&self, class: &str) -> Vec<&Node> {
        let mut found = Vec::new();
        self.collect_class(class, &mut found);
        found
    }

    /// First descendant (including self) with the given class.
    pub fn find(&self, class: &str) -> Option<&Node> {
        if self.class == class {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(class))
    }

    fn collect_class<'a>(&'a self, class: &str, out: &mut Vec<&'a Node>) {
        if self.class == class {
            out.push(self);
        }
        for child in &self.children {
            child.collect_class(class, out);
        }
    }

    /// All text in the tree, in document order, one entry per text-bearing node.
    pub fn texts(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_texts(&mut out);
        out
    }

    fn collect_texts<'a>(&'a self, out: &mut Vec<&'a str>) {
        if let Some(text) = &self.text {
            out.push(text);
        }
        for child in &self.children {
            child.collect_texts(out);
        }
    }

    /// Serialize the tree to HTML.
    pub fn to_html(&self) -> Result<String> {
        let children = self
            .children
            .iter()
            .map(Node::to_html)
            .collect::<Result<Vec<_>>>()?;

        let mut attrs: Vec<(&str, &str)> = self.attrs.iter().map(|(k, v)| (*k, v.as_str())).collect();
        match &self.kind {
            NodeKind::Image { src, alt } => {
                attrs.push(("src", src.as_str()));
                attrs.push(("alt", alt.as_str()));
            }
            NodeKind::Icon(icon) => {
                attrs.push(("data-icon", icon.name()));
                attrs.push(("aria-hidden", "true"));
            }
            _ => {}
        }
        let style = (!self.style.is_empty()).then(|| {
            self.style
                .iter()
                .map(|(k, v)| format!("{}: {}", k, v))
                .collect::<Vec<_>>()
                .join("; ")
        });

        let template = NodeTemplate {
            tag: self.tag(),
            class: self.class,
            attrs,
            style,
            text: self.text.as_deref(),
            void: matches!(self.kind, NodeKind::Image { .. }),
            children,
        };
        Ok(template.render()?)
    }

    fn tag(&self) -> &'static str {
        match self.kind {
            NodeKind::Section => "section",
            NodeKind::Block => "div",
            NodeKind::Heading(1) => "h1",
            NodeKind::Heading(2) => "h2",
            NodeKind::Heading(_) => "h3",
            NodeKind::Text => "p",
            NodeKind::Image { .. } => "img",
            NodeKind::Icon(_) => "span",
        }
    }
}

/// One element; children arrive already rendered.
#[derive(Template)]
#[template(path = "node.html")]
struct NodeTemplate<'a> {
    tag: &'static str,
    class: &'static str,
    attrs: Vec<(&'a str, &'a str)>,
    style: Option<String>,
    text: Option<&'a str>,
    void: bool,
    children: Vec<String>,
}

#[derive(Template)]
#[template(path = "deck.html")]
struct DeckPage<'a> {
    title: &'a str,
    fonts_url: &'static str,
    page_bg: &'static str,
    text_color: &'static str,
    slides: Vec<String>,
}

/// A standalone HTML page showing `slides` one after another, each with its
/// `SLIDE n / N` counter.
pub fn document_html(title: &str, theme: &Theme, slides: &[Node]) -> Result<String> {
    let page = DeckPage {
        title,
        fonts_url: FONTS_URL,
        page_bg: theme.screen.page_bg,
        text_color: theme.screen.text,
        slides: slides.iter().map(Node::to_html).collect::<Result<Vec<_>>>()?,
    };
    Ok(page.render()?)
}

/// Render a slide to its on-screen tree.
pub fn render_screen(slide: &Slide, ctx: &RenderContext<'_>) -> Node {
    let body = match slide {
        Slide::TitleCyber(s) => title_cyber(s, ctx),
        Slide::SplitBleed(s) => split_bleed(s, ctx),
        Slide::TimelineHorizontal(s) => timeline(s, ctx),
        Slide::BentoGrid(s) => bento(s, ctx),
        Slide::BigStat(s) => big_stat(s, ctx),
        Slide::ChartBar(s) => chart_bar(s, ctx),
        Slide::Plain(s) => plain(s, ctx),
    };

    let p = &ctx.theme.screen;
    Node::section("slide")
        .attr("data-layout", slide.tag())
        .attr("data-theme", ctx.theme.key.as_str())
        .style("background-color", p.slide_bg)
        .style("color", p.text)
        .style("font-family", format!("'{}', sans-serif", BODY_FONT))
        .style("aspect-ratio", "16 / 9")
        .style("position", "relative")
        .style("overflow", "hidden")
        .children(body)
}

fn heading(ctx: &RenderContext<'_>, level: u8, class: &'static str, text: &str) -> Node {
    Node::heading(level, class, text)
        .style("color", ctx.theme.screen.heading)
        .style("font-family", format!("'{}', sans-serif", HEADING_FONT))
        .style("font-weight", "700")
}

/// Slide heading with the accent rule on its left edge.
fn ruled_heading(ctx: &RenderContext<'_>, text: &str) -> Node {
    heading(ctx, 2, "title", text)
        .style("border-left", format!("4px solid {}", ctx.theme.screen.emphasis))
        .style("padding-left", "1.5rem")
}

fn title_cyber(s: &TitleSlide, ctx: &RenderContext<'_>) -> Vec<Node> {
    let p = &ctx.theme.screen;
    let mut nodes = Vec::new();

    if let Some(url) = ctx.image_url(s.image_prompt.as_deref()) {
        nodes.push(
            Node::block("backdrop")
                .style("position", "absolute")
                .style("inset", "0")
                .style("opacity", "0.4")
                .child(
                    Node::image("backdrop-image", url, s.image_prompt.clone().unwrap_or_default())
                        .style("width", "100%")
                        .style("height", "100%")
                        .style("object-fit", "cover"),
                )
                .child(
                    Node::block("backdrop-fade")
                        .style("position", "absolute")
                        .style("inset", "0")
                        .style(
                            "background",
                            format!("linear-gradient(to right, {}, transparent)", p.slide_bg),
                        ),
                ),
        );
    }

    let mut hero = Node::block("hero")
        .style("position", "relative")
        .style("padding", "4rem")
        .child(
            Node::block("accent-bar")
                .style("height", "0.25rem")
                .style("width", "6rem")
                .style(
                    "background",
                    format!("linear-gradient(to right, {}, {})", p.gradient.0, p.gradient.1),
                ),
        )
        .child(heading(ctx, 1, "title", &s.title).style("font-size", "4.5rem"));
    if let Some(subtitle) = &s.subtitle {
        hero = hero.child(Node::text("subtitle", subtitle).style("font-size", "1.5rem"));
    }
    nodes.push(hero);
    nodes
}

fn split_bleed(s: &SplitSlide, ctx: &RenderContext<'_>) -> Vec<Node> {
    let p = &ctx.theme.screen;
    let bullets = s.content.iter().map(|c| {
        Node::block("bullet")
            .style("display", "flex")
            .style("gap", "1.25rem")
            .child(Node::icon("bullet-icon", Icon::CheckCircle).style("color", p.accent))
            .child(Node::text("bullet-text", c).style("font-size", "1.25rem"))
    });

    let left = Node::block("split-left")
        .style("width", "50%")
        .style("padding", "4rem")
        .child(heading(ctx, 2, "title", &s.title))
        .child(Node::block("bullets").children(bullets));

    let right = match ctx.image_url(s.image_prompt.as_deref()) {
        Some(url) => Node::image("image", url, s.image_prompt.clone().unwrap_or_default())
            .style("width", "100%")
            .style("height", "100%")
            .style("object-fit", "cover"),
        None => Node::block("placeholder")
            .style("width", "100%")
            .style("height", "100%")
            .style("background-color", "rgba(0, 0, 0, 0.1)")
            .child(Node::icon("placeholder-icon", Icon::Image).style("opacity", "0.5")),
    };

    vec![Node::block("split")
        .style("display", "flex")
        .style("height", "100%")
        .child(left)
        .child(
            Node::block("split-right")
                .style("width", "50%")
                .style("overflow", "hidden")
                .child(right),
        )]
}

fn timeline(s: &TimelineSlide, ctx: &RenderContext<'_>) -> Vec<Node> {
    let p = &ctx.theme.screen;
    let entries = s.visible_entries();
    let items = entries.iter().enumerate().map(|(i, entry)| {
        Node::block("timeline-item")
            .attr("data-index", i.to_string())
            .style("position", "absolute")
            .style(
                "left",
                format!("{}%", marker_position(i, entries.len()) * 100.0),
            )
            .style("transform", "translateX(-50%)")
            .style("text-align", "center")
            .child(
                Node::block("marker")
                    .style("width", "1.5rem")
                    .style("height", "1.5rem")
                    .style("border-radius", "50%")
                    .style("background-color", p.slide_bg)
                    .style("border", format!("4px solid {}", p.emphasis)),
            )
            .child(
                Node::text("year", &entry.year)
                    .style("color", p.accent)
                    .style("font-family", format!("'{}', sans-serif", HEADING_FONT)),
            )
            .child(Node::text("item-title", &entry.title).style("color", p.heading))
            .child(Node::text("item-desc", &entry.description).style("font-size", "0.875rem"))
    });

    vec![
        ruled_heading(ctx, &s.title),
        Node::block("timeline")
            .style("position", "relative")
            .style("margin", "2rem 3rem 0")
            .child(
                Node::block("timeline-line")
                    .style("position", "absolute")
                    .style("top", "40%")
                    .style("height", "2px")
                    .style("width", "100%")
                    .style("background-color", p.rule),
            )
            .children(items),
    ]
}

fn bento(s: &BentoSlide, ctx: &RenderContext<'_>) -> Vec<Node> {
    let p = &ctx.theme.screen;
    let cards = s.visible_blocks().iter().enumerate().map(|(i, block)| {
        let (col, row) = bento_cell(i);
        Node::block("card")
            .attr("data-index", i.to_string())
            .style("grid-column", (col + 1).to_string())
            .style("grid-row", (row + 1).to_string())
            .style("background", p.card_bg)
            .style("border", format!("1px solid {}", p.card_border))
            .style("border-radius", "1.5rem")
            .style("padding", "2.5rem")
            .child(
                Node::block("icon-well")
                    .style("color", p.accent)
                    .child(Node::icon("icon", bento_icon(i))),
            )
            .child(heading(ctx, 3, "card-title", &block.title))
            .child(Node::text("card-body", &block.body).style("font-size", "1.125rem"))
    });

    vec![
        heading(ctx, 2, "title", &s.title),
        Node::block("bento-grid")
            .style("display", "grid")
            .style("grid-template-columns", "repeat(2, 1fr)")
            .style("gap", "2rem")
            .children(cards),
    ]
}

fn big_stat(s: &StatSlide, ctx: &RenderContext<'_>) -> Vec<Node> {
    let p = &ctx.theme.screen;
    let (value, label) = s
        .stat
        .as_ref()
        .map(|st| (st.value.as_str(), st.label.as_str()))
        .unwrap_or_default();

    let mut figure = Node::block("stat-figure").child(
        Node::text("stat-value", value)
            .style("color", p.accent)
            .style("font-family", format!("'{}', sans-serif", HEADING_FONT))
            .style("font-size", "12.5rem")
            .style("line-height", "1"),
    );
    if !label.is_empty() {
        figure = figure.child(Node::text("stat-label", label).style("text-transform", "uppercase"));
    }

    vec![Node::block("stat-row")
        .style("display", "flex")
        .style("align-items", "center")
        .style("gap", "5rem")
        .style("padding", "4rem")
        .child(figure)
        .child(
            Node::block("divider")
                .style("width", "4px")
                .style("align-self", "stretch")
                .style("background-color", p.emphasis),
        )
        .child(
            Node::block("stat-side")
                .child(heading(ctx, 3, "title", &s.title).style("font-size", "3rem"))
                .child(Node::text("stat-support", s.supporting_text()).style("font-size", "1.5rem")),
        )]
}

fn chart_bar(s: &ChartSlide, ctx: &RenderContext<'_>) -> Vec<Node> {
    let p = &ctx.theme.screen;
    let mut chart = Node::block("chart")
        .style("display", "flex")
        .style("flex-direction", "column")
        .style("gap", "2.5rem");

    if let Some(data) = &s.chart {
        chart = chart.children(data.bars().enumerate().map(|(i, (label, value))| {
            Node::block("bar-row")
                .attr("data-index", i.to_string())
                .style("display", "flex")
                .style("align-items", "center")
                .style("gap", "2rem")
                .child(Node::text("bar-label", label).style("width", "10rem").style("text-align", "right"))
                .child(
                    Node::block("bar-track")
                        .style("flex", "1")
                        .style("height", "3.5rem")
                        .style("background", p.card_bg)
                        .style("border-radius", "0.75rem")
                        .child(
                            Node::block("bar")
                                .style("width", format!("{}%", bar_percent(value)))
                                .style("height", "100%")
                                .style("background-color", ctx.theme.chart_css_color(i))
                                .child(Node::text(
                                    "bar-value",
                                    format!("{}{}", format_value(value), data.unit),
                                )),
                        ),
                )
        }));
    }

    vec![ruled_heading(ctx, &s.title), chart]
}

fn plain(s: &PlainSlide, ctx: &RenderContext<'_>) -> Vec<Node> {
    vec![
        heading(ctx, 2, "title", &s.title),
        Node::text("content", s.content.join("\n")).style("white-space", "pre-line"),
    ]
}
