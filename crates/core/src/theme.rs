//! The fixed theme registry.
//!
//! Each theme carries its colors twice: CSS colors for the screen tree and
//! bare `RRGGBB` triplets for the exported presentation. Both render paths
//! read from the same [`Theme`] so they stay visually consistent.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// Heading font family used by every theme.
pub const HEADING_FONT: &str = "Space Grotesk";

/// Body font family used by every theme.
pub const BODY_FONT: &str = "Urbanist";

/// Key of a registered theme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeKey {
    #[default]
    Cyber,
    Executive,
    Electric,
}

impl ThemeKey {
    /// All theme keys in display order.
    pub const ALL: [ThemeKey; 3] = [ThemeKey::Cyber, ThemeKey::Executive, ThemeKey::Electric];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cyber => "cyber",
            Self::Executive => "executive",
            Self::Electric => "electric",
        }
    }

    /// The theme this key names.
    pub fn theme(self) -> &'static Theme {
        Theme::get(self)
    }
}

impl FromStr for ThemeKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "cyber" => Ok(Self::Cyber),
            "executive" => Ok(Self::Executive),
            "electric" => Ok(Self::Electric),
            other => Err(Error::UnknownTheme(other.to_string())),
        }
    }
}

impl fmt::Display for ThemeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// CSS colors for the on-screen tree.
#[derive(Debug, Clone, Serialize)]
pub struct ScreenPalette {
    /// Page background around the slide.
    pub page_bg: &'static str,
    pub slide_bg: &'static str,
    /// Body text.
    pub text: &'static str,
    pub heading: &'static str,
    pub accent: &'static str,
    /// Filled accent surfaces (buttons, icon wells).
    pub accent_bg: &'static str,
    /// Left rules on headings and the stat divider.
    pub emphasis: &'static str,
    pub card_bg: &'static str,
    pub card_border: &'static str,
    /// Timeline connector.
    pub rule: &'static str,
    /// Start and end of the title underline gradient.
    pub gradient: (&'static str, &'static str),
}

/// `RRGGBB` colors for the exported presentation.
#[derive(Debug, Clone, Serialize)]
pub struct ExportPalette {
    pub background: &'static str,
    pub text: &'static str,
    /// Secondary text, lines and connectors.
    pub subtext: &'static str,
    pub accent: &'static str,
    pub card_fill: &'static str,
    pub card_line: &'static str,
    /// Fill used where an image would go but none was described.
    pub placeholder: &'static str,
}

/// A named visual palette.
#[derive(Debug, Clone, Serialize)]
pub struct Theme {
    pub key: ThemeKey,
    /// Short display label, also used in the export file name.
    pub label: &'static str,
    pub screen: ScreenPalette,
    pub export: ExportPalette,
    /// Series colors as `RRGGBB`, cycled by bar index.
    pub chart_colors: &'static [&'static str],
}

static THEMES: [Theme; 3] = [
    Theme {
        key: ThemeKey::Cyber,
        label: "Cyber",
        screen: ScreenPalette {
            page_bg: "#121212",
            slide_bg: "#0f0f0f",
            text: "#d1d5db",
            heading: "#ffffff",
            accent: "#8b5cf6",
            accent_bg: "#7c3aed",
            emphasis: "#8b5cf6",
            card_bg: "rgba(255, 255, 255, 0.05)",
            card_border: "rgba(255, 255, 255, 0.1)",
            rule: "#333333",
            gradient: ("#ffffff", "#c4b5fd"),
        },
        export: ExportPalette {
            background: "0F0F0F",
            text: "FFFFFF",
            subtext: "A3A3A3",
            accent: "7C3AED",
            card_fill: "151515",
            card_line: "333333",
            placeholder: "333333",
        },
        chart_colors: &["A78BFA", "22D3EE", "FB923C", "4ADE80"],
    },
    Theme {
        key: ThemeKey::Executive,
        label: "Executive",
        screen: ScreenPalette {
            page_bg: "#f1f5f9",
            slide_bg: "#ffffff",
            text: "#475569",
            heading: "#0f172a",
            accent: "#1d4ed8",
            accent_bg: "#1d4ed8",
            emphasis: "#1d4ed8",
            card_bg: "#f8fafc",
            card_border: "#e2e8f0",
            rule: "#cbd5e1",
            gradient: ("#0f172a", "#334155"),
        },
        export: ExportPalette {
            background: "FFFFFF",
            text: "000000",
            subtext: "475569",
            accent: "1D4ED8",
            card_fill: "F1F5F9",
            card_line: "CBD5E1",
            placeholder: "333333",
        },
        chart_colors: &["1E40AF", "3B82F6", "93C5FD", "CBD5E1"],
    },
    Theme {
        key: ThemeKey::Electric,
        label: "Electric",
        screen: ScreenPalette {
            page_bg: "#000000",
            slide_bg: "#000000",
            text: "#ecfccb",
            heading: "#a3e635",
            accent: "#a3e635",
            accent_bg: "#84cc16",
            emphasis: "#a3e635",
            card_bg: "rgba(54, 83, 20, 0.2)",
            card_border: "rgba(132, 204, 22, 0.3)",
            rule: "#333333",
            gradient: ("#a3e635", "#d9f99d"),
        },
        export: ExportPalette {
            background: "000000",
            text: "FFFFFF",
            subtext: "D9F99D",
            accent: "A3E635",
            card_fill: "151515",
            card_line: "333333",
            placeholder: "333333",
        },
        chart_colors: &["A3E635", "EC4899", "06B6D4", "FACC15"],
    },
];

impl Theme {
    /// Look up a theme by key.
    pub fn get(key: ThemeKey) -> &'static Theme {
        match key {
            ThemeKey::Cyber => &THEMES[0],
            ThemeKey::Executive => &THEMES[1],
            ThemeKey::Electric => &THEMES[2],
        }
    }

    /// Look up a theme by its string key.
    pub fn lookup(key: &str) -> Result<&'static Theme> {
        key.parse::<ThemeKey>().map(Theme::get)
    }

    /// All registered themes.
    pub fn all() -> &'static [Theme] {
        &THEMES
    }

    /// Chart color for series `index` as `RRGGBB`, cycling through the palette.
    pub fn chart_color(&self, index: usize) -> &'static str {
        self.chart_colors[index % self.chart_colors.len()]
    }

    /// Chart color for series `index` as a CSS color.
    pub fn chart_css_color(&self, index: usize) -> String {
        format!("#{}", self.chart_color(index).to_lowercase())
    }

    /// File name for an exported deck in this theme.
    pub fn export_file_name(&self) -> String {
        format!("CanvasDeck_{}.pptx", self.label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_hex_triplet(s: &str) -> bool {
        s.len() == 6 && s.chars().all(|c| c.is_ascii_hexdigit())
    }

    #[test]
    fn test_registry_matches_keys() {
        for key in ThemeKey::ALL {
            assert_eq!(Theme::get(key).key, key);
        }
        assert_eq!(Theme::all().len(), 3);
    }

    #[test]
    fn test_parse_key() {
        assert_eq!("cyber".parse::<ThemeKey>().unwrap(), ThemeKey::Cyber);
        assert_eq!(" Executive ".parse::<ThemeKey>().unwrap(), ThemeKey::Executive);
        assert!(matches!(
            "neon".parse::<ThemeKey>(),
            Err(Error::UnknownTheme(k)) if k == "neon"
        ));
        assert_eq!(Theme::lookup("electric").unwrap().label, "Electric");
    }

    #[test]
    fn test_export_colors_are_hex_triplets() {
        for theme in Theme::all() {
            let e = &theme.export;
            for color in [
                e.background,
                e.text,
                e.subtext,
                e.accent,
                e.card_fill,
                e.card_line,
                e.placeholder,
            ] {
                assert!(is_hex_triplet(color), "{} in {}", color, theme.label);
            }
            assert!(theme.chart_colors.iter().all(|c| is_hex_triplet(c)));
        }
    }

    #[test]
    fn test_chart_color_cycles() {
        let theme = Theme::get(ThemeKey::Cyber);
        let n = theme.chart_colors.len();
        assert_eq!(theme.chart_color(0), theme.chart_color(n));
        assert_eq!(theme.chart_color(1), theme.chart_color(n + 1));
        assert_eq!(theme.chart_css_color(0), "#a78bfa");
    }

    #[test]
    fn test_export_file_name() {
        assert_eq!(
            Theme::get(ThemeKey::Executive).export_file_name(),
            "CanvasDeck_Executive.pptx"
        );
    }
}
