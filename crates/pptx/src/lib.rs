//! PPTX (Office Open XML) export for CanvasDeck.
//!
//! A .pptx file is a ZIP archive of XML parts. [`PptxWriter`] assembles one
//! from rendered [`ExportSlide`](deck_core::ExportSlide)s, and
//! [`PptxInspector`] reads a written file back for checks and the CLI.

pub mod export;
pub mod inspect;
pub mod package;
pub mod xml;

pub use export::{export_deck, export_session, ExportedFile};
pub use inspect::{InspectedDeck, InspectedShape, InspectedSlide, PptxInspector};
pub use package::PptxWriter;
