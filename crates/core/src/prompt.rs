//! The designer prompt sent to the generator and the parsing of its reply.

use crate::types::{Deck, LayoutKind};
use crate::{Error, Result};

/// Slide count used when the request does not name one.
pub const DEFAULT_SLIDE_COUNT: usize = 6;

/// Build the full generation instruction for a user request.
pub fn designer_prompt(request: &str) -> String {
    let layouts = LayoutKind::ALL
        .iter()
        .enumerate()
        .map(|(i, kind)| format!("{}. '{}': {}", i + 1, kind.tag(), layout_hint(*kind)))
        .collect::<Vec<_>>()
        .join("\n");
    let tags = LayoutKind::ALL
        .iter()
        .map(|k| format!("\"{}\"", k.tag()))
        .collect::<Vec<_>>()
        .join(" | ");

    format!(
        r#"Act as a Senior Presentation Designer.
User Request: "{request}".

Generate a JSON structure for a presentation.
CRITICAL: Check if user asked for a specific number of slides. If so, use that count. Otherwise default to {count}.
IMPORTANT: All text content must be plain text only. Do NOT use any markdown formatting like *text*, **text**, _text_, or any other formatting symbols.

DESIGN SYSTEM:
- 'Space Grotesk' headers.
- 'Urbanist' body.

REQUIRED LAYOUTS (Mix these):
{layouts}

JSON Structure:
{{
  "title": "Deck Title",
  "slides": [
    {{
      "layout": {tags},
      "title": "Slide Header",
      "subtitle": "...",
      "content": ["pt1", "pt2"],
      "imagePrompt": "Abstract visual description...",
      "timeline": [ {{ "year": "2023", "title": "...", "desc": "..." }} ],
      "blocks": [ {{ "title": "...", "content": "..." }} ],
      "chart": {{ "labels": ["A","B","C","D"], "values": [80, 60, 40, 90], "label": "%" }},
      "stat": {{ "value": "150%", "label": "Growth" }}
    }}
  ]
}}

Return ONLY valid JSON. No markdown. All text must be plain text without any formatting symbols."#,
        request = request.trim(),
        count = DEFAULT_SLIDE_COUNT,
        layouts = layouts,
        tags = tags,
    )
}

fn layout_hint(kind: LayoutKind) -> &'static str {
    match kind {
        LayoutKind::TitleCyber => "Main title, subtitle.",
        LayoutKind::TimelineHorizontal => "4 distinct chronological steps.",
        LayoutKind::BentoGrid => "4 cards with brief content.",
        LayoutKind::SplitBleed => "Image on right (50%), content on left.",
        LayoutKind::ChartBar => "4 data points.",
        LayoutKind::BigStat => "One massive number with context.",
    }
}

/// Slice out the outermost JSON object from model output, which may be
/// wrapped in prose or code fences.
pub fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (end > start).then(|| &raw[start..=end])
}

/// Turn the generator's text reply into a deck.
pub fn parse_generated_deck(raw: &str) -> Result<Deck> {
    let json = extract_json_object(raw)
        .ok_or_else(|| Error::MalformedResponse("no JSON object in generated text".to_string()))?;
    let deck: Deck =
        serde_json::from_str(json).map_err(|e| Error::MalformedResponse(e.to_string()))?;
    log::debug!("parsed generated deck '{}' with {} slides", deck.title, deck.len());
    Ok(deck)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_mentions_request_and_layouts() {
        let prompt = designer_prompt("  3 slides on renewable energy ");
        assert!(prompt.contains("User Request: \"3 slides on renewable energy\""));
        assert!(prompt.contains("Otherwise default to 6"));
        for kind in LayoutKind::ALL {
            assert!(prompt.contains(kind.tag()));
        }
        assert!(prompt.contains("\"imagePrompt\""));
    }

    #[test]
    fn test_extract_json_object() {
        assert_eq!(extract_json_object("```json\n{\"a\": 1}\n```"), Some("{\"a\": 1}"));
        assert_eq!(extract_json_object("no braces"), None);
        assert_eq!(extract_json_object("} backwards {"), None);
    }

    #[test]
    fn test_parse_generated_deck() {
        let raw = r#"Here you go:
```json
{"title": "Energy", "slides": [
  {"layout": "title-cyber", "title": "Energy"},
  {"layout": "chart-bar", "title": "Mix", "chart": {"labels": ["Solar"], "values": [40], "label": "%"}},
  {"layout": "big-stat", "title": "Jobs", "stat": {"value": "12M", "label": "Jobs"}}
]}
```"#;
        let deck = parse_generated_deck(raw).unwrap();
        assert_eq!(deck.layout_tags(), vec!["title-cyber", "chart-bar", "big-stat"]);
    }

    #[test]
    fn test_parse_errors_are_malformed_response() {
        assert!(matches!(
            parse_generated_deck("sorry, I cannot"),
            Err(Error::MalformedResponse(_))
        ));
        assert!(matches!(
            parse_generated_deck("{\"title\": \"x\", \"slides\": []}"),
            Err(Error::MalformedResponse(_))
        ));
        assert!(matches!(
            parse_generated_deck("{ not json }"),
            Err(Error::MalformedResponse(_))
        ));
    }
}
