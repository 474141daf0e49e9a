//! State of one interactive session: the current deck, slide index, theme
//! and the busy flag that gates generation.
//!
//! A generation runs as `begin_generation` → (caller awaits the request) →
//! `finish_generation`. Only one can be in flight; the flag is cleared on
//! every finish, and a failed generation leaves the previous deck in place.

use crate::image::{ImageUrlBuilder, SeedPolicy};
use crate::render::{render_export, render_screen, ExportSlide, Node, RenderContext};
use crate::theme::{Theme, ThemeKey};
use crate::types::{Deck, Slide};
use crate::{Error, Result};

#[derive(Debug, Clone, Default)]
pub struct Session {
    deck: Option<Deck>,
    current: usize,
    theme: ThemeKey,
    busy: bool,
    images: ImageUrlBuilder,
}

impl Session {
    /// Create an empty session with the given theme.
    pub fn new(theme: ThemeKey) -> Self {
        Self {
            theme,
            ..Self::default()
        }
    }

    /// Use a specific image URL builder (and with it, a seed policy).
    pub fn with_images(mut self, images: ImageUrlBuilder) -> Self {
        self.images = images;
        self
    }

    /// Change how image seeds are chosen for later renders.
    pub fn set_seed_policy(&mut self, policy: SeedPolicy) {
        self.images = self.images.clone().with_seed_policy(policy);
    }

    pub fn deck(&self) -> Option<&Deck> {
        self.deck.as_ref()
    }

    pub fn theme(&self) -> &'static Theme {
        Theme::get(self.theme)
    }

    pub fn theme_key(&self) -> ThemeKey {
        self.theme
    }

    /// Switch theme. Slides and position are untouched.
    pub fn set_theme(&mut self, key: ThemeKey) {
        log::debug!("theme {} -> {}", self.theme, key);
        self.theme = key;
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Mark a generation as started. Fails if one is already in flight.
    pub fn begin_generation(&mut self) -> Result<()> {
        if self.busy {
            return Err(Error::Busy);
        }
        self.busy = true;
        Ok(())
    }

    /// Record the outcome of a generation.
    ///
    /// The busy flag is cleared either way. On success the deck is replaced
    /// and the view returns to the first slide; on failure the error is
    /// handed back and the previous deck stays.
    pub fn finish_generation(&mut self, outcome: Result<Deck>) -> Result<&Deck> {
        self.busy = false;
        match outcome {
            Ok(deck) => {
                log::info!("loaded deck '{}' ({} slides)", deck.title, deck.len());
                self.current = 0;
                Ok(self.deck.insert(deck))
            }
            Err(e) => {
                log::warn!("generation failed: {}", e);
                Err(e)
            }
        }
    }

    /// Replace the deck directly, e.g. from a saved description.
    pub fn load_deck(&mut self, deck: Deck) {
        self.deck = Some(deck);
        self.current = 0;
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_slide(&self) -> Option<&Slide> {
        self.deck.as_ref()?.slides.get(self.current)
    }

    /// Move to the next slide. Returns whether the position changed.
    pub fn next(&mut self) -> bool {
        self.go_to(self.current + 1)
    }

    /// Move to the previous slide. Returns whether the position changed.
    pub fn previous(&mut self) -> bool {
        match self.current.checked_sub(1) {
            Some(i) => self.go_to(i),
            None => false,
        }
    }

    /// Jump to a slide, clamped to the deck. Returns whether the position changed.
    pub fn go_to(&mut self, index: usize) -> bool {
        let Some(deck) = &self.deck else {
            return false;
        };
        let target = index.min(deck.len().saturating_sub(1));
        let changed = target != self.current;
        self.current = target;
        changed
    }

    /// Counter text such as `SLIDE 2 / 6`.
    pub fn counter(&self) -> Option<String> {
        let deck = self.deck.as_ref()?;
        Some(format!("SLIDE {} / {}", self.current + 1, deck.len()))
    }

    fn context(&self) -> RenderContext<'_> {
        RenderContext::new(self.theme(), &self.images)
    }

    /// Screen tree for the current slide.
    pub fn render_current(&self) -> Result<Node> {
        let slide = self.current_slide().ok_or(Error::NoDeck)?;
        Ok(render_screen(slide, &self.context()))
    }

    /// Screen trees for every slide.
    pub fn render_all(&self) -> Result<Vec<Node>> {
        let deck = self.deck.as_ref().ok_or(Error::NoDeck)?;
        let ctx = self.context();
        Ok(deck.slides.iter().map(|s| render_screen(s, &ctx)).collect())
    }

    /// Export primitives for every slide, in order.
    pub fn export_slides(&self) -> Result<Vec<ExportSlide>> {
        let deck = self.deck.as_ref().ok_or(Error::NoDeck)?;
        let ctx = self.context();
        Ok(deck.slides.iter().map(|s| render_export(s, &ctx)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deck(n: usize) -> Deck {
        let slides = (0..n)
            .map(|i| format!(r#"{{"layout": "title-cyber", "title": "Slide {}"}}"#, i))
            .collect::<Vec<_>>()
            .join(",");
        Deck::from_json(&format!(r#"{{"title": "Deck", "slides": [{}]}}"#, slides)).unwrap()
    }

    #[test]
    fn test_busy_flag_gates_generation() {
        let mut session = Session::new(ThemeKey::Cyber);
        session.begin_generation().unwrap();
        assert!(session.is_busy());
        assert!(matches!(session.begin_generation(), Err(Error::Busy)));

        session.finish_generation(Ok(deck(2))).unwrap();
        assert!(!session.is_busy());
        session.begin_generation().unwrap();
    }

    #[test]
    fn test_failed_generation_keeps_previous_deck() {
        let mut session = Session::new(ThemeKey::Cyber);
        session.begin_generation().unwrap();
        session.finish_generation(Ok(deck(3))).unwrap();
        session.go_to(2);

        session.begin_generation().unwrap();
        let err = session
            .finish_generation(Err(Error::GenerationFailed("503".into())))
            .unwrap_err();
        assert!(matches!(err, Error::GenerationFailed(_)));
        assert!(!session.is_busy());
        assert_eq!(session.deck().unwrap().len(), 3);
        assert_eq!(session.current_index(), 2);
    }

    #[test]
    fn test_new_deck_resets_position() {
        let mut session = Session::new(ThemeKey::Cyber);
        session.load_deck(deck(4));
        session.go_to(3);
        session.begin_generation().unwrap();
        session.finish_generation(Ok(deck(2))).unwrap();
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.counter().as_deref(), Some("SLIDE 1 / 2"));
    }

    #[test]
    fn test_navigation_is_clamped() {
        let mut session = Session::new(ThemeKey::Cyber);
        assert!(!session.next());
        assert_eq!(session.counter(), None);

        session.load_deck(deck(3));
        assert!(!session.previous());
        assert!(session.next());
        assert!(session.next());
        assert!(!session.next());
        assert_eq!(session.current_index(), 2);
        assert!(!session.go_to(99));
        assert!(session.go_to(0));
    }

    #[test]
    fn test_render_requires_deck() {
        let session = Session::new(ThemeKey::Cyber);
        assert!(matches!(session.render_current(), Err(Error::NoDeck)));
        assert!(matches!(session.export_slides(), Err(Error::NoDeck)));
    }

    #[test]
    fn test_theme_switch_keeps_content() {
        let mut session = Session::new(ThemeKey::Cyber);
        session.set_seed_policy(SeedPolicy::Derived);
        session.load_deck(deck(3));
        session.go_to(1);

        let before = session.render_all().unwrap();
        session.set_theme(ThemeKey::Electric);
        let after = session.render_all().unwrap();

        assert_eq!(session.current_index(), 1);
        assert_eq!(before.len(), after.len());
        for (b, a) in before.iter().zip(&after) {
            assert_eq!(b.texts(), a.texts());
            assert_eq!(a.attr_value("data-theme"), Some("electric"));
        }
        assert_eq!(session.export_slides().unwrap()[0].background, "000000");
    }
}
