//! Domain types for a generated deck.
//!
//! A [`Slide`] is a closed sum type: one variant per layout kind, each carrying
//! only the fields its layout draws. Anything the generator sends under an
//! unrecognized layout tag becomes [`Slide::Plain`].

use serde::{Deserialize, Serialize};

use crate::wire::{WireDeck, WireSlide};

/// Number of timeline entries the horizontal timeline has room for.
pub const TIMELINE_SLOTS: usize = 4;

/// Number of cards in the bento grid.
pub const BENTO_SLOTS: usize = 4;

/// A generated deck: a title and its slides in presentation order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WireDeck", into = "WireDeck")]
pub struct Deck {
    /// Deck title.
    pub title: String,

    /// Slides in presentation order. Never empty for a parsed deck.
    pub slides: Vec<Slide>,
}

impl Deck {
    /// Create a deck from already-typed slides.
    pub fn new(title: impl Into<String>, slides: Vec<Slide>) -> Self {
        Self {
            title: title.into(),
            slides,
        }
    }

    /// Parse a deck from its JSON description.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        serde_json::from_str(json).map_err(|e| crate::Error::InvalidDeck(e.to_string()))
    }

    /// Serialize the deck back to its JSON description.
    pub fn to_json(&self) -> crate::Result<String> {
        serde_json::to_string(self).map_err(|e| crate::Error::InvalidDeck(e.to_string()))
    }

    /// Number of slides.
    pub fn len(&self) -> usize {
        self.slides.len()
    }

    /// Whether the deck has no slides.
    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    /// Layout tags of all slides, in order.
    pub fn layout_tags(&self) -> Vec<&str> {
        self.slides.iter().map(Slide::tag).collect()
    }
}

/// The six layout kinds the renderer knows how to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayoutKind {
    TitleCyber,
    SplitBleed,
    TimelineHorizontal,
    BentoGrid,
    BigStat,
    ChartBar,
}

impl LayoutKind {
    /// All layout kinds, in the order the generator is told about them.
    pub const ALL: [LayoutKind; 6] = [
        LayoutKind::TitleCyber,
        LayoutKind::TimelineHorizontal,
        LayoutKind::BentoGrid,
        LayoutKind::SplitBleed,
        LayoutKind::ChartBar,
        LayoutKind::BigStat,
    ];

    /// The wire tag for this layout.
    pub fn tag(self) -> &'static str {
        match self {
            Self::TitleCyber => "title-cyber",
            Self::SplitBleed => "split-bleed",
            Self::TimelineHorizontal => "timeline-horizontal",
            Self::BentoGrid => "bento-grid",
            Self::BigStat => "big-stat",
            Self::ChartBar => "chart-bar",
        }
    }

    /// Look up a layout by its wire tag.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim() {
            "title-cyber" => Some(Self::TitleCyber),
            "split-bleed" => Some(Self::SplitBleed),
            "timeline-horizontal" => Some(Self::TimelineHorizontal),
            "bento-grid" => Some(Self::BentoGrid),
            "big-stat" => Some(Self::BigStat),
            "chart-bar" => Some(Self::ChartBar),
            _ => None,
        }
    }
}

/// A single slide, tagged by layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "WireSlide", into = "WireSlide")]
pub enum Slide {
    TitleCyber(TitleSlide),
    SplitBleed(SplitSlide),
    TimelineHorizontal(TimelineSlide),
    BentoGrid(BentoSlide),
    BigStat(StatSlide),
    ChartBar(ChartSlide),
    /// Fallback for layout tags the renderer does not know.
    Plain(PlainSlide),
}

impl Slide {
    /// The layout kind, or `None` for the plain fallback.
    pub fn kind(&self) -> Option<LayoutKind> {
        match self {
            Self::TitleCyber(_) => Some(LayoutKind::TitleCyber),
            Self::SplitBleed(_) => Some(LayoutKind::SplitBleed),
            Self::TimelineHorizontal(_) => Some(LayoutKind::TimelineHorizontal),
            Self::BentoGrid(_) => Some(LayoutKind::BentoGrid),
            Self::BigStat(_) => Some(LayoutKind::BigStat),
            Self::ChartBar(_) => Some(LayoutKind::ChartBar),
            Self::Plain(_) => None,
        }
    }

    /// The layout tag as it appears on the wire.
    pub fn tag(&self) -> &str {
        match self {
            Self::Plain(p) => &p.layout,
            other => other.kind().map(LayoutKind::tag).unwrap_or_default(),
        }
    }

    /// The slide title.
    pub fn title(&self) -> &str {
        match self {
            Self::TitleCyber(s) => &s.title,
            Self::SplitBleed(s) => &s.title,
            Self::TimelineHorizontal(s) => &s.title,
            Self::BentoGrid(s) => &s.title,
            Self::BigStat(s) => &s.title,
            Self::ChartBar(s) => &s.title,
            Self::Plain(s) => &s.title,
        }
    }

    /// The image description, for layouts that can show an image.
    pub fn image_prompt(&self) -> Option<&str> {
        match self {
            Self::TitleCyber(s) => s.image_prompt.as_deref(),
            Self::SplitBleed(s) => s.image_prompt.as_deref(),
            _ => None,
        }
    }
}

/// Full-bleed hero slide.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TitleSlide {
    pub title: String,
    pub subtitle: Option<String>,
    pub image_prompt: Option<String>,
}

/// Half text, half image.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SplitSlide {
    pub title: String,
    pub content: Vec<String>,
    pub image_prompt: Option<String>,
}

/// Horizontal timeline with up to [`TIMELINE_SLOTS`] entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimelineSlide {
    pub title: String,
    pub entries: Vec<TimelineEntry>,
}

impl TimelineSlide {
    /// Entries that fit on the timeline.
    pub fn visible_entries(&self) -> &[TimelineEntry] {
        &self.entries[..self.entries.len().min(TIMELINE_SLOTS)]
    }
}

/// One point on a timeline.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimelineEntry {
    pub year: String,
    pub title: String,
    pub description: String,
}

/// Two-column grid of cards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BentoSlide {
    pub title: String,
    pub blocks: Vec<Block>,
}

impl BentoSlide {
    /// Blocks that fit in the grid.
    pub fn visible_blocks(&self) -> &[Block] {
        &self.blocks[..self.blocks.len().min(BENTO_SLOTS)]
    }
}

/// A bento card.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Block {
    pub title: String,
    pub body: String,
}

/// One dominant number with supporting text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatSlide {
    pub title: String,
    pub stat: Option<Stat>,
    pub subtitle: Option<String>,
    pub content: Vec<String>,
}

impl StatSlide {
    /// Text shown beside the number: the subtitle, else the first content item.
    pub fn supporting_text(&self) -> &str {
        self.subtitle
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.content.first().map(String::as_str))
            .unwrap_or_default()
    }
}

/// A headline statistic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stat {
    pub value: String,
    pub label: String,
}

/// Horizontal bar chart.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartSlide {
    pub title: String,
    pub chart: Option<Chart>,
}

/// Bar chart data. Labels and values always have the same length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Chart {
    labels: Vec<String>,
    values: Vec<f64>,
    /// Unit shown after each value, e.g. `%`.
    pub unit: String,
}

impl Chart {
    /// Create a chart, dropping trailing labels or values that have no partner.
    pub fn new(mut labels: Vec<String>, mut values: Vec<f64>, unit: impl Into<String>) -> Self {
        let len = labels.len().min(values.len());
        if labels.len() != values.len() {
            log::debug!(
                "chart has {} labels and {} values, keeping {}",
                labels.len(),
                values.len(),
                len
            );
        }
        labels.truncate(len);
        values.truncate(len);
        Self {
            labels,
            values,
            unit: unit.into(),
        }
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of bars.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Label/value pairs in order.
    pub fn bars(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.labels
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }
}

/// Fallback slide for unknown layouts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlainSlide {
    /// The layout tag as received.
    pub layout: String,
    pub title: String,
    pub content: Vec<String>,
}

/// Format a chart value without a trailing `.0`.
pub fn format_value(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        let s = format!("{:.2}", value);
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_tag_round_trip() {
        for kind in LayoutKind::ALL {
            assert_eq!(LayoutKind::from_tag(kind.tag()), Some(kind));
        }
        assert_eq!(LayoutKind::from_tag("mosaic"), None);
    }

    #[test]
    fn test_chart_truncates_to_shorter_list() {
        let chart = Chart::new(
            vec!["A".into(), "B".into(), "C".into()],
            vec![10.0, 20.0],
            "%",
        );
        assert_eq!(chart.len(), 2);
        assert_eq!(chart.labels(), &["A".to_string(), "B".to_string()]);

        let chart = Chart::new(vec!["A".into()], vec![10.0, 20.0, 30.0], "");
        assert_eq!(chart.len(), 1);
        assert_eq!(chart.bars().collect::<Vec<_>>(), vec![("A", 10.0)]);
    }

    #[test]
    fn test_visible_slots() {
        let slide = TimelineSlide {
            title: "History".into(),
            entries: vec![TimelineEntry::default(); 6],
        };
        assert_eq!(slide.visible_entries().len(), TIMELINE_SLOTS);

        let slide = BentoSlide {
            title: "Pillars".into(),
            blocks: vec![Block::default(); 2],
        };
        assert_eq!(slide.visible_blocks().len(), 2);
    }

    #[test]
    fn test_supporting_text_prefers_subtitle() {
        let mut slide = StatSlide {
            title: "Growth".into(),
            stat: None,
            subtitle: Some("Year over year".into()),
            content: vec!["First point".into()],
        };
        assert_eq!(slide.supporting_text(), "Year over year");

        slide.subtitle = None;
        assert_eq!(slide.supporting_text(), "First point");

        slide.content.clear();
        assert_eq!(slide.supporting_text(), "");
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(80.0), "80");
        assert_eq!(format_value(12.5), "12.5");
        assert_eq!(format_value(0.333), "0.33");
    }
}
