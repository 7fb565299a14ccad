//! Palette administration endpoints

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use palette::{fallback_gradient, Gradient, Palette, PaletteCategory, ThemeContext};
use serde::{Deserialize, Serialize};

use crate::auth::Caller;
use crate::error::AppError;
use crate::AppState;

/// Body of `POST /api/palette-change`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePaletteRequest {
    /// Palette to activate
    pub palette_id: String,
}

/// Successful palette change
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePaletteResponse {
    /// Always true
    pub success: bool,
    /// The palette now active
    pub palette_id: String,
}

/// Palettes of one category
#[derive(Debug, Clone, Serialize)]
pub struct PaletteGroup {
    /// Category key
    pub category: PaletteCategory,
    /// Display label
    pub label: &'static str,
    /// Palettes in registry order
    pub palettes: Vec<Palette>,
}

/// Body of `GET /api/palettes`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PalettesResponse {
    /// Currently active palette
    pub active_palette_id: String,
    /// Palettes grouped for the picker
    pub groups: Vec<PaletteGroup>,
}

/// Body of `GET /api/palette`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivePaletteResponse {
    /// Resolved string and numeric color maps
    #[serde(flatten)]
    pub context: ThemeContext,
    /// Static background for pages where the scene is gated off
    pub fallback_gradient: Gradient,
}

/// Make a palette active; admin only
pub async fn change_palette(
    State(state): State<AppState>,
    Caller(caller): Caller,
    payload: Result<Json<ChangePaletteRequest>, JsonRejection>,
) -> Result<Json<ChangePaletteResponse>, AppError> {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(_) if !state.admin.is_admin(&caller) => {
            return Err(AppError::Unauthorized("Unauthorized".to_string()));
        }
        Err(rejection) => return Err(AppError::BadRequest(rejection.body_text())),
    };

    let applied = state.admin.apply_palette(&request.palette_id, &caller).await?;
    Ok(Json(ChangePaletteResponse {
        success: true,
        palette_id: applied.palette_id,
    }))
}

/// Registry grouped by category, with the active id
pub async fn list_palettes(State(state): State<AppState>) -> Json<PalettesResponse> {
    let active_palette_id = state.resolver.resolve_active_palette_id().await;

    let groups = [PaletteCategory::Regional, PaletteCategory::Tech]
        .into_iter()
        .map(|category| PaletteGroup {
            category,
            label: category.label(),
            palettes: state.registry.by_category(category).cloned().collect(),
        })
        .filter(|group| !group.palettes.is_empty())
        .collect();

    Json(PalettesResponse {
        active_palette_id,
        groups,
    })
}

/// Resolved context of the active palette with its fallback gradient
pub async fn active_palette(State(state): State<AppState>) -> Json<ActivePaletteResponse> {
    let context = state.resolver.resolve_active_context().await;
    Json(ActivePaletteResponse {
        fallback_gradient: fallback_gradient(&context),
        context: ThemeContext::clone(&context),
    })
}
