//! Core deck model, theme registry, layout rendering and session state
//! for CanvasDeck.

pub mod error;
pub mod image;
pub mod prompt;
pub mod render;
pub mod sanitize;
pub mod session;
pub mod theme;
pub mod types;
pub mod wire;

pub use error::{Error, Result};
pub use image::{ImageUrlBuilder, SeedPolicy};
pub use prompt::{designer_prompt, parse_generated_deck};
pub use render::{render_export, render_screen, ExportSlide, Node, Primitive, RenderContext};
pub use sanitize::TextSanitizer;
pub use session::Session;
pub use theme::{Theme, ThemeKey};
pub use types::{Deck, LayoutKind, Slide};
