use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{web, HttpResponse};
use deck_core::theme::{ExportPalette, ScreenPalette};
use deck_core::{Deck, SeedPolicy, Theme, ThemeKey};
use serde::{Deserialize, Serialize};

use crate::errors::ApiError;
use crate::AppState;

const PPTX_MIME: &str = "application/vnd.openxmlformats-officedocument.presentationml.presentation";

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub prompt: Option<String>,
}

pub async fn generate_deck(
    state: web::Data<AppState>,
    body: web::Json<GenerateRequest>,
) -> Result<HttpResponse, ApiError> {
    let prompt = body
        .prompt
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Prompt is required".to_string()))?;

    let deck = state.client.generate_deck(prompt).await?;
    log::info!("generated '{}' with {} slides", deck.title, deck.len());
    Ok(HttpResponse::Ok().json(deck))
}

#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    pub deck: Deck,
    #[serde(default)]
    pub theme: Option<String>,
    /// Fixed image seed; the server's policy applies when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

pub async fn export(
    state: web::Data<AppState>,
    body: web::Json<ExportRequest>,
) -> Result<HttpResponse, ApiError> {
    let ExportRequest { deck, theme, seed } = body.into_inner();
    let theme = match theme.as_deref() {
        Some(key) => Theme::lookup(key)?,
        None => ThemeKey::default().theme(),
    };
    let images = match seed {
        Some(seed) => state.images.clone().with_seed_policy(SeedPolicy::Fixed(seed)),
        None => state.images.clone(),
    };

    let file = deck_pptx::export_deck(&deck, theme, &images)?;
    Ok(HttpResponse::Ok()
        .content_type(PPTX_MIME)
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(file.file_name)],
        })
        .body(file.bytes))
}

#[derive(Debug, Serialize)]
pub struct ThemeInfo {
    pub key: ThemeKey,
    pub label: &'static str,
    pub accent: &'static str,
    pub screen: &'static ScreenPalette,
    pub export: &'static ExportPalette,
    pub chart_colors: &'static [&'static str],
}

impl From<&'static Theme> for ThemeInfo {
    fn from(theme: &'static Theme) -> Self {
        Self {
            key: theme.key,
            label: theme.label,
            accent: theme.screen.accent,
            screen: &theme.screen,
            export: &theme.export,
            chart_colors: theme.chart_colors,
        }
    }
}

pub async fn themes() -> HttpResponse {
    let themes: Vec<ThemeInfo> = Theme::all().iter().map(ThemeInfo::from).collect();
    HttpResponse::Ok().json(themes)
}
