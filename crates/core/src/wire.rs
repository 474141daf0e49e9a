//! JSON wire format for decks, as produced by the generator.
//!
//! Every field except `slides` is optional and loosely typed on the way in:
//! `content` may be a single string, numbers may arrive as strings, years as
//! numbers. Values of the wrong shape (a `null` in a list, a bare string
//! where an object belongs) are logged and replaced by an empty value or
//! dropped. Conversion into [`Deck`] sanitizes all text and never fails on a
//! missing slide field.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::sanitize::TextSanitizer;
use crate::types::{
    BentoSlide, Block, Chart, ChartSlide, Deck, LayoutKind, PlainSlide, Slide, SplitSlide, Stat,
    StatSlide, TimelineEntry, TimelineSlide, TitleSlide,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireDeck {
    #[serde(default)]
    pub title: Option<Text>,
    #[serde(deserialize_with = "items")]
    pub slides: Vec<WireSlide>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireSlide {
    #[serde(default)]
    pub layout: Option<Text>,
    #[serde(default)]
    pub title: Option<Text>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<Text>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<TextList>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_prompt: Option<Text>,
    #[serde(default, deserialize_with = "items", skip_serializing_if = "Vec::is_empty")]
    pub timeline: Vec<WireTimelineEntry>,
    #[serde(default, deserialize_with = "items", skip_serializing_if = "Vec::is_empty")]
    pub blocks: Vec<WireBlock>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub chart: Option<WireChart>,
    #[serde(default, deserialize_with = "stat", skip_serializing_if = "Option::is_none")]
    pub stat: Option<WireStat>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WireTimelineEntry {
    #[serde(default)]
    pub year: Option<Text>,
    #[serde(default)]
    pub title: Option<Text>,
    #[serde(default)]
    pub desc: Option<Text>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WireBlock {
    #[serde(default)]
    pub title: Option<Text>,
    #[serde(default)]
    pub content: Option<Text>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WireChart {
    #[serde(default, deserialize_with = "items")]
    pub labels: Vec<Text>,
    #[serde(default, deserialize_with = "items")]
    pub values: Vec<Number>,
    #[serde(default)]
    pub label: Option<Text>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WireStat {
    #[serde(default)]
    pub value: Option<Text>,
    #[serde(default)]
    pub label: Option<Text>,
}

/// A list field. Anything but an array reads as empty; elements that do not
/// fit `T` are dropped.
fn items<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let elements = match Value::deserialize(deserializer)? {
        Value::Array(elements) => elements,
        Value::Null => return Ok(Vec::new()),
        other => {
            log::warn!("expected a list, ignoring {}", other);
            return Ok(Vec::new());
        }
    };
    Ok(elements
        .into_iter()
        .filter_map(|element| match serde_json::from_value(element) {
            Ok(item) => Some(item),
            Err(e) => {
                log::warn!("dropping malformed list entry: {}", e);
                None
            }
        })
        .collect())
}

/// A field that falls back to its default when the value has the wrong shape.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(T::default());
    }
    Ok(serde_json::from_value(value).unwrap_or_else(|e| {
        log::warn!("ignoring malformed field: {}", e);
        T::default()
    }))
}

/// `stat` is an object, but a bare scalar is taken as its value.
fn stat<'de, D>(deserializer: D) -> Result<Option<WireStat>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        fields @ Value::Object(_) => Some(serde_json::from_value(fields).unwrap_or_else(|e| {
            log::warn!("ignoring malformed stat: {}", e);
            WireStat::default()
        })),
        scalar => Some(WireStat {
            value: serde_json::from_value(scalar).ok(),
            label: None,
        }),
    })
}

/// A scalar that should be read as text.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Text {
    Str(String),
    Num(serde_json::Number),
    Bool(bool),
    /// `null`, or a list or object where text belongs.
    Other(Value),
}

impl Text {
    fn into_string(self) -> String {
        match self {
            Self::Str(s) => s,
            Self::Num(n) => n.to_string(),
            Self::Bool(b) => b.to_string(),
            Self::Other(Value::Null) => String::new(),
            Self::Other(other) => {
                log::warn!("expected text, ignoring {}", other);
                String::new()
            }
        }
    }
}

impl From<String> for Text {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

/// A list of strings that may also arrive as a single string.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextList {
    Many(Vec<Text>),
    One(Text),
}

impl TextList {
    fn into_vec(self) -> Vec<String> {
        match self {
            Self::Many(items) => items.into_iter().map(Text::into_string).collect(),
            Self::One(t) => vec![t.into_string()],
        }
    }
}

/// A number that may also arrive as text such as `"80"` or `"80%"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Number {
    Num(f64),
    Str(String),
    /// Anything else reads as 0.
    Other(Value),
}

impl Number {
    fn value(&self) -> f64 {
        match self {
            Self::Num(v) if v.is_finite() => *v,
            Self::Num(_) => 0.0,
            Self::Str(s) => {
                let trimmed = s.trim().trim_end_matches('%').replace(',', "");
                match trimmed.trim().parse::<f64>() {
                    Ok(v) if v.is_finite() => v,
                    _ => {
                        log::warn!("non-numeric chart value {:?}, using 0", s);
                        0.0
                    }
                }
            }
            Self::Other(other) => {
                if !other.is_null() {
                    log::warn!("non-numeric chart value {}, using 0", other);
                }
                0.0
            }
        }
    }
}

impl TryFrom<WireDeck> for Deck {
    type Error = String;

    fn try_from(wire: WireDeck) -> Result<Self, Self::Error> {
        if wire.slides.is_empty() {
            return Err("deck has no slides".to_string());
        }
        let sanitizer = TextSanitizer::new();
        let title = sanitizer.clean(&wire.title.map(Text::into_string).unwrap_or_default());
        let slides = wire
            .slides
            .into_iter()
            .map(|s| slide_from_wire(s, &sanitizer))
            .collect();
        Ok(Deck { title, slides })
    }
}

impl From<WireSlide> for Slide {
    fn from(wire: WireSlide) -> Self {
        slide_from_wire(wire, &TextSanitizer::new())
    }
}

fn slide_from_wire(wire: WireSlide, sanitizer: &TextSanitizer) -> Slide {
    let text = |t: Option<Text>| sanitizer.clean(&t.map(Text::into_string).unwrap_or_default());
    let optional = |t: Option<Text>| {
        t.map(|t| sanitizer.clean(&t.into_string()))
            .filter(|s| !s.is_empty())
    };
    let list = |l: Option<TextList>| -> Vec<String> {
        l.map(TextList::into_vec)
            .unwrap_or_default()
            .iter()
            .map(|s| sanitizer.clean(s))
            .filter(|s| !s.is_empty())
            .collect()
    };

    let layout = wire.layout.map(Text::into_string).unwrap_or_default();
    let title = text(wire.title);

    match LayoutKind::from_tag(&layout) {
        Some(LayoutKind::TitleCyber) => Slide::TitleCyber(TitleSlide {
            title,
            subtitle: optional(wire.subtitle),
            image_prompt: optional(wire.image_prompt),
        }),
        Some(LayoutKind::SplitBleed) => Slide::SplitBleed(SplitSlide {
            title,
            content: list(wire.content),
            image_prompt: optional(wire.image_prompt),
        }),
        Some(LayoutKind::TimelineHorizontal) => Slide::TimelineHorizontal(TimelineSlide {
            title,
            entries: wire
                .timeline
                .into_iter()
                .map(|e| TimelineEntry {
                    year: text(e.year),
                    title: text(e.title),
                    description: text(e.desc),
                })
                .collect(),
        }),
        Some(LayoutKind::BentoGrid) => Slide::BentoGrid(BentoSlide {
            title,
            blocks: wire
                .blocks
                .into_iter()
                .map(|b| Block {
                    title: text(b.title),
                    body: text(b.content),
                })
                .collect(),
        }),
        Some(LayoutKind::BigStat) => Slide::BigStat(StatSlide {
            title,
            stat: wire.stat.map(|s| Stat {
                value: text(s.value),
                label: text(s.label),
            }),
            subtitle: optional(wire.subtitle),
            content: list(wire.content),
        }),
        Some(LayoutKind::ChartBar) => Slide::ChartBar(ChartSlide {
            title,
            chart: wire.chart.map(|c| {
                Chart::new(
                    c.labels
                        .into_iter()
                        .map(|l| sanitizer.clean(&l.into_string()))
                        .collect(),
                    c.values.iter().map(Number::value).collect(),
                    text(c.label),
                )
            }),
        }),
        None => {
            log::debug!("unknown layout {:?}, rendering as plain slide", layout);
            Slide::Plain(PlainSlide {
                layout,
                title,
                content: list(wire.content),
            })
        }
    }
}

impl From<Deck> for WireDeck {
    fn from(deck: Deck) -> Self {
        Self {
            title: Some(Text::Str(deck.title)),
            slides: deck.slides.into_iter().map(WireSlide::from).collect(),
        }
    }
}

impl From<Slide> for WireSlide {
    fn from(slide: Slide) -> Self {
        let layout = Some(Text::Str(slide.tag().to_string()));
        let content = |c: Vec<String>| {
            (!c.is_empty()).then(|| TextList::Many(c.into_iter().map(Text::from).collect()))
        };
        match slide {
            Slide::TitleCyber(s) => Self {
                layout,
                title: Some(s.title.into()),
                subtitle: s.subtitle.map(Text::from),
                image_prompt: s.image_prompt.map(Text::from),
                ..Self::default()
            },
            Slide::SplitBleed(s) => Self {
                layout,
                title: Some(s.title.into()),
                content: content(s.content),
                image_prompt: s.image_prompt.map(Text::from),
                ..Self::default()
            },
            Slide::TimelineHorizontal(s) => Self {
                layout,
                title: Some(s.title.into()),
                timeline: s
                    .entries
                    .into_iter()
                    .map(|e| WireTimelineEntry {
                        year: Some(e.year.into()),
                        title: Some(e.title.into()),
                        desc: Some(e.description.into()),
                    })
                    .collect(),
                ..Self::default()
            },
            Slide::BentoGrid(s) => Self {
                layout,
                title: Some(s.title.into()),
                blocks: s
                    .blocks
                    .into_iter()
                    .map(|b| WireBlock {
                        title: Some(b.title.into()),
                        content: Some(b.body.into()),
                    })
                    .collect(),
                ..Self::default()
            },
            Slide::BigStat(s) => Self {
                layout,
                title: Some(s.title.into()),
                subtitle: s.subtitle.map(Text::from),
                content: content(s.content),
                stat: s.stat.map(|st| WireStat {
                    value: Some(st.value.into()),
                    label: Some(st.label.into()),
                }),
                ..Self::default()
            },
            Slide::ChartBar(s) => Self {
                layout,
                title: Some(s.title.into()),
                chart: s.chart.map(|c| WireChart {
                    labels: c.labels().iter().cloned().map(Text::from).collect(),
                    values: c.values().iter().copied().map(Number::Num).collect(),
                    label: Some(c.unit.into()),
                }),
                ..Self::default()
            },
            Slide::Plain(s) => Self {
                layout,
                title: Some(s.title.into()),
                content: content(s.content),
                ..Self::default()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_deck() {
        let json = r#"{
            "title": "Renewable Energy",
            "slides": [
                {"layout": "title-cyber", "title": "The Sun Rises", "subtitle": "Clean power", "imagePrompt": "solar field"},
                {"layout": "chart-bar", "title": "Share", "chart": {"labels": ["Solar","Wind"], "values": [40, 35], "label": "%"}},
                {"layout": "big-stat", "title": "Growth", "stat": {"value": "150%", "label": "Growth"}}
            ]
        }"#;
        let deck = Deck::from_json(json).unwrap();
        assert_eq!(deck.title, "Renewable Energy");
        assert_eq!(deck.layout_tags(), vec!["title-cyber", "chart-bar", "big-stat"]);

        match &deck.slides[0] {
            Slide::TitleCyber(s) => {
                assert_eq!(s.subtitle.as_deref(), Some("Clean power"));
                assert_eq!(s.image_prompt.as_deref(), Some("solar field"));
            }
            other => panic!("unexpected slide {:?}", other),
        }
        match &deck.slides[1] {
            Slide::ChartBar(s) => {
                let chart = s.chart.as_ref().unwrap();
                assert_eq!(chart.values(), &[40.0, 35.0]);
                assert_eq!(chart.unit, "%");
            }
            other => panic!("unexpected slide {:?}", other),
        }
    }

    #[test]
    fn test_empty_slides_rejected() {
        let err = Deck::from_json(r#"{"title": "Nothing", "slides": []}"#).unwrap_err();
        assert!(err.to_string().contains("no slides"));
    }

    #[test]
    fn test_missing_slides_rejected() {
        assert!(Deck::from_json(r#"{"title": "Nothing"}"#).is_err());
        assert!(Deck::from_json("not json").is_err());
    }

    #[test]
    fn test_lenient_fields() {
        let json = r#"{
            "slides": [
                {"layout": "split-bleed", "title": "Why", "content": "Only one point"},
                {"layout": "timeline-horizontal", "title": "When", "timeline": [{"year": 2023, "title": "Start"}]},
                {"layout": "chart-bar", "title": "How much", "chart": {"labels": ["A","B"], "values": ["80%", "n/a"]}}
            ]
        }"#;
        let deck = Deck::from_json(json).unwrap();
        assert_eq!(deck.title, "");

        match &deck.slides[0] {
            Slide::SplitBleed(s) => assert_eq!(s.content, vec!["Only one point"]),
            other => panic!("unexpected slide {:?}", other),
        }
        match &deck.slides[1] {
            Slide::TimelineHorizontal(s) => {
                assert_eq!(s.entries[0].year, "2023");
                assert_eq!(s.entries[0].description, "");
            }
            other => panic!("unexpected slide {:?}", other),
        }
        match &deck.slides[2] {
            Slide::ChartBar(s) => {
                let chart = s.chart.as_ref().unwrap();
                assert_eq!(chart.values(), &[80.0, 0.0]);
                assert_eq!(chart.unit, "");
            }
            other => panic!("unexpected slide {:?}", other),
        }
    }

    #[test]
    fn test_unknown_layout_becomes_plain() {
        let json = r#"{"title": "T", "slides": [{"layout": "mosaic", "title": "Odd", "content": ["a", "b"]}]}"#;
        let deck = Deck::from_json(json).unwrap();
        match &deck.slides[0] {
            Slide::Plain(p) => {
                assert_eq!(p.layout, "mosaic");
                assert_eq!(p.content, vec!["a", "b"]);
            }
            other => panic!("unexpected slide {:?}", other),
        }
        assert_eq!(deck.slides[0].tag(), "mosaic");
    }

    #[test]
    fn test_markdown_stripped_on_parse() {
        let json = r#"{"title": "**Bold** deck", "slides": [{"layout": "title-cyber", "title": "*Hello*  world"}]}"#;
        let deck = Deck::from_json(json).unwrap();
        assert_eq!(deck.title, "Bold deck");
        assert_eq!(deck.slides[0].title(), "Hello world");
    }

    #[test]
    fn test_serialized_deck_parses_back() {
        let json = r#"{"title": "T", "slides": [
            {"layout": "bento-grid", "title": "Grid", "blocks": [{"title": "One", "content": "First"}]},
            {"layout": "big-stat", "title": "Stat", "content": ["Context"], "stat": {"value": "42", "label": "Answers"}}
        ]}"#;
        let deck = Deck::from_json(json).unwrap();
        let again = Deck::from_json(&deck.to_json().unwrap()).unwrap();
        assert_eq!(deck, again);
    }

    #[test]
    fn test_null_list_entries() {
        let json = r#"{"slides": [
            {"layout": "chart-bar", "title": "Mix", "chart": {"labels": ["A", null], "values": [80, null]}},
            {"layout": "split-bleed", "title": "Why", "content": ["x", null]},
            {"layout": "timeline-horizontal", "title": "When", "timeline": [null, {"year": 2020, "title": "Go"}, "later"]},
            {"layout": "bento-grid", "title": "Grid", "blocks": [{"title": "One", "content": null}, 7]}
        ]}"#;
        let deck = Deck::from_json(json).unwrap();

        match &deck.slides[0] {
            Slide::ChartBar(s) => {
                let chart = s.chart.as_ref().unwrap();
                assert_eq!(chart.values(), &[80.0, 0.0]);
                assert_eq!(chart.labels(), &["A".to_string(), String::new()]);
            }
            other => panic!("unexpected slide {:?}", other),
        }
        match &deck.slides[1] {
            Slide::SplitBleed(s) => assert_eq!(s.content, vec!["x"]),
            other => panic!("unexpected slide {:?}", other),
        }
        match &deck.slides[2] {
            Slide::TimelineHorizontal(s) => {
                assert_eq!(s.entries.len(), 1);
                assert_eq!(s.entries[0].year, "2020");
            }
            other => panic!("unexpected slide {:?}", other),
        }
        match &deck.slides[3] {
            Slide::BentoGrid(s) => {
                assert_eq!(s.blocks.len(), 1);
                assert_eq!(s.blocks[0].body, "");
            }
            other => panic!("unexpected slide {:?}", other),
        }
    }

    #[test]
    fn test_wrong_shaped_fields() {
        let json = r#"{"title": ["not", "text"], "slides": [
            {"layout": "big-stat", "title": "Growth", "stat": "150%"},
            {"layout": "chart-bar", "title": {"text": "Mix"}, "chart": "see appendix"},
            {"layout": 3, "title": null, "content": {"a": 1}},
            null
        ]}"#;
        let deck = Deck::from_json(json).unwrap();
        assert_eq!(deck.title, "");
        assert_eq!(deck.len(), 3);

        match &deck.slides[0] {
            Slide::BigStat(s) => {
                let stat = s.stat.as_ref().unwrap();
                assert_eq!(stat.value, "150%");
                assert_eq!(stat.label, "");
            }
            other => panic!("unexpected slide {:?}", other),
        }
        match &deck.slides[1] {
            Slide::ChartBar(s) => {
                assert_eq!(s.title, "");
                assert!(s.chart.is_none());
            }
            other => panic!("unexpected slide {:?}", other),
        }
        match &deck.slides[2] {
            Slide::Plain(p) => {
                assert_eq!(p.layout, "3");
                assert!(p.content.is_empty());
            }
            other => panic!("unexpected slide {:?}", other),
        }
    }

    #[test]
    fn test_only_malformed_slides_rejected() {
        let err = Deck::from_json(r#"{"slides": [null, "slide"]}"#).unwrap_err();
        assert!(err.to_string().contains("no slides"));
    }

    #[test]
    fn test_control_chars_removed() {
        let json = r#"{"title": "Grid\u0001 Scale", "slides": [{"layout": "split-bleed", "title": "A\u000bB", "content": ["x\u001f"]}]}"#;
        let deck = Deck::from_json(json).unwrap();
        assert_eq!(deck.title, "Grid Scale");
        match &deck.slides[0] {
            Slide::SplitBleed(s) => {
                assert_eq!(s.title, "AB");
                assert_eq!(s.content, vec!["x"]);
            }
            other => panic!("unexpected slide {:?}", other),
        }
    }
}
