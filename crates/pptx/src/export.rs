//! Deck to .pptx.

use deck_core::render::{render_export, RenderContext};
use deck_core::{Deck, ImageUrlBuilder, Result, Session, Theme};

use crate::package::PptxWriter;

/// A finished export, ready to be saved or sent as a download.
#[derive(Debug, Clone)]
pub struct ExportedFile {
    /// `CanvasDeck_<ThemeLabel>.pptx`
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Render every slide of `deck` for export and package the result.
///
/// No network access happens here: images are written as external links.
pub fn export_deck(deck: &Deck, theme: &Theme, images: &ImageUrlBuilder) -> Result<ExportedFile> {
    let ctx = RenderContext::new(theme, images);
    let mut writer = PptxWriter::new(theme, deck.title.as_str());
    for slide in &deck.slides {
        writer.add_slide(&render_export(slide, &ctx));
    }
    let bytes = writer.finish()?;
    log::info!(
        "exported '{}' ({} slides, {} bytes) with theme {}",
        deck.title,
        deck.len(),
        bytes.len(),
        theme.key
    );
    Ok(ExportedFile {
        file_name: theme.export_file_name(),
        bytes,
    })
}

/// Export the session's deck in its current theme.
pub fn export_session(session: &Session) -> Result<ExportedFile> {
    let theme = session.theme();
    let mut writer = PptxWriter::new(theme, session.deck().map(|d| d.title.as_str()).unwrap_or_default());
    for slide in session.export_slides()? {
        writer.add_slide(&slide);
    }
    Ok(ExportedFile {
        file_name: theme.export_file_name(),
        bytes: writer.finish()?,
    })
}
