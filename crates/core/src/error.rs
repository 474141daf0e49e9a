//! Error types for deck generation, rendering and export.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while generating, rendering or exporting a deck.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to read or write a file.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The generation request could not be sent or returned a non-success status.
    #[error("Generation request failed: {0}")]
    GenerationFailed(String),

    /// The generation response could not be turned into a deck.
    #[error("Malformed generation response: {0}")]
    MalformedResponse(String),

    /// Deck JSON could not be parsed.
    #[error("Invalid deck JSON: {0}")]
    InvalidDeck(String),

    /// The theme key is not one of the registered themes.
    #[error("Unknown theme: {0}")]
    UnknownTheme(String),

    /// A generation is already in flight for this session.
    #[error("A deck is already being generated")]
    Busy,

    /// An operation needs a loaded deck but the session has none.
    #[error("No deck loaded")]
    NoDeck,

    /// Configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Failed to build the exported presentation.
    #[error("Export error: {0}")]
    ExportError(String),

    /// An HTML template failed to render.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    /// ZIP archive error (for PPTX).
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// XML error (for PPTX).
    #[error("XML error: {0}")]
    XmlError(String),
}
