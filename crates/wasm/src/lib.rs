//! WASM bindings for CanvasDeck.
//!
//! The browser owns the network call to the generator: it asks for the
//! designer prompt, sends it, and hands the raw reply back to
//! [`DeckSession::finish_generation`]. Everything else (navigation, theme
//! switching, slide HTML, PPTX bytes) happens here.

use deck_core::render::document_html;
use deck_core::{prompt, Deck, SeedPolicy, Session, Theme, ThemeKey};
use serde::Serialize;
use std::fmt::Display;
use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn init() {
    // Set up better panic messages in the console
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

fn js_error(e: impl Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// One interactive deck session.
#[wasm_bindgen]
pub struct DeckSession {
    inner: Session,
}

#[wasm_bindgen]
impl DeckSession {
    /// Create a session. `theme` defaults to `cyber`.
    #[wasm_bindgen(constructor)]
    pub fn new(theme: Option<String>) -> Result<DeckSession, JsValue> {
        Self::with_theme(theme.as_deref()).map_err(js_error)
    }

    #[wasm_bindgen(js_name = loadDeck)]
    pub fn load_deck(&mut self, json: &str) -> Result<(), JsValue> {
        self.load_deck_impl(json).map_err(js_error)
    }

    /// Mark a generation as started; throws if one is already running.
    #[wasm_bindgen(js_name = beginGeneration)]
    pub fn begin_generation(&mut self) -> Result<(), JsValue> {
        self.inner.begin_generation().map_err(js_error)
    }

    /// Finish a generation with the generator's raw text, or with the error
    /// message the request failed with. Throws on failure; the previous deck
    /// stays loaded.
    #[wasm_bindgen(js_name = finishGeneration)]
    pub fn finish_generation(
        &mut self,
        raw: Option<String>,
        error: Option<String>,
    ) -> Result<usize, JsValue> {
        self.finish_generation_impl(raw.as_deref(), error)
            .map_err(js_error)
    }

    #[wasm_bindgen(js_name = isBusy)]
    pub fn is_busy(&self) -> bool {
        self.inner.is_busy()
    }

    pub fn next(&mut self) -> bool {
        self.inner.next()
    }

    pub fn previous(&mut self) -> bool {
        self.inner.previous()
    }

    #[wasm_bindgen(js_name = goTo)]
    pub fn go_to(&mut self, index: usize) -> bool {
        self.inner.go_to(index)
    }

    #[wasm_bindgen(js_name = currentIndex)]
    pub fn current_index(&self) -> usize {
        self.inner.current_index()
    }

    #[wasm_bindgen(js_name = slideCount)]
    pub fn slide_count(&self) -> usize {
        self.inner.deck().map(Deck::len).unwrap_or_default()
    }

    /// `SLIDE n / N`, or undefined before a deck is loaded.
    pub fn counter(&self) -> Option<String> {
        self.inner.counter()
    }

    #[wasm_bindgen(js_name = setTheme)]
    pub fn set_theme(&mut self, key: &str) -> Result<(), JsValue> {
        let key: ThemeKey = key.parse().map_err(js_error)?;
        self.inner.set_theme(key);
        Ok(())
    }

    #[wasm_bindgen(js_name = themeKey)]
    pub fn theme_key(&self) -> String {
        self.inner.theme_key().to_string()
    }

    /// `random`, `derived`, or a number.
    #[wasm_bindgen(js_name = setSeedPolicy)]
    pub fn set_seed_policy(&mut self, policy: &str) -> Result<(), JsValue> {
        let policy: SeedPolicy = policy.parse().map_err(js_error)?;
        self.inner.set_seed_policy(policy);
        Ok(())
    }

    #[wasm_bindgen(js_name = renderCurrentHtml)]
    pub fn render_current_html(&self) -> Result<String, JsValue> {
        self.inner
            .render_current()
            .and_then(|node| node.to_html())
            .map_err(js_error)
    }

    /// The whole deck as a standalone HTML page.
    #[wasm_bindgen(js_name = renderDocumentHtml)]
    pub fn render_document_html(&self) -> Result<String, JsValue> {
        self.document_html_impl().map_err(js_error)
    }

    /// The deck in its current theme as .pptx bytes.
    #[wasm_bindgen(js_name = exportPptx)]
    pub fn export_pptx(&self) -> Result<js_sys::Uint8Array, JsValue> {
        deck_pptx::export_session(&self.inner)
            .map(|file| js_sys::Uint8Array::from(file.bytes.as_slice()))
            .map_err(js_error)
    }

    #[wasm_bindgen(js_name = exportFileName)]
    pub fn export_file_name(&self) -> String {
        self.inner.theme().export_file_name()
    }

    #[wasm_bindgen(js_name = deckJson)]
    pub fn deck_json(&self) -> Option<String> {
        self.inner.deck().and_then(|d| d.to_json().ok())
    }
}

impl DeckSession {
    fn with_theme(theme: Option<&str>) -> deck_core::Result<Self> {
        let key: ThemeKey = match theme {
            Some(k) => k.parse()?,
            None => ThemeKey::default(),
        };
        Ok(Self {
            inner: Session::new(key),
        })
    }

    fn load_deck_impl(&mut self, json: &str) -> deck_core::Result<()> {
        let deck = Deck::from_json(json)?;
        self.inner.load_deck(deck);
        Ok(())
    }

    fn finish_generation_impl(
        &mut self,
        raw: Option<&str>,
        error: Option<String>,
    ) -> deck_core::Result<usize> {
        let outcome = match (raw, error) {
            (_, Some(message)) => Err(deck_core::Error::GenerationFailed(message)),
            (Some(raw), None) => prompt::parse_generated_deck(raw),
            (None, None) => Err(deck_core::Error::MalformedResponse(
                "empty generation response".to_string(),
            )),
        };
        self.inner.finish_generation(outcome).map(Deck::len)
    }

    fn document_html_impl(&self) -> deck_core::Result<String> {
        let nodes = self.inner.render_all()?;
        let title = self.inner.deck().map(|d| d.title.as_str()).unwrap_or_default();
        document_html(title, self.inner.theme(), &nodes)
    }
}

/// The designer prompt for a free-text request, to send to the generator.
#[wasm_bindgen(js_name = designerPrompt)]
pub fn designer_prompt(request: &str) -> String {
    prompt::designer_prompt(request)
}

#[derive(Debug, Serialize)]
struct ThemeSummary {
    key: &'static str,
    label: &'static str,
    accent: &'static str,
    background: &'static str,
}

fn theme_summaries() -> Vec<ThemeSummary> {
    Theme::all()
        .iter()
        .map(|t| ThemeSummary {
            key: t.key.as_str(),
            label: t.label,
            accent: t.screen.accent,
            background: t.screen.slide_bg,
        })
        .collect()
}

/// The registered themes as `[{ key, label, accent, background }]`.
#[wasm_bindgen]
pub fn themes() -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(&theme_summaries())
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}
