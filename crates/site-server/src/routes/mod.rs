//! API routes

use axum::{
    routing::{get, post},
    Router,
};

use crate::AppState;

mod palettes;
mod theme;

pub use palettes::{
    ActivePaletteResponse, ChangePaletteRequest, ChangePaletteResponse, PaletteGroup,
    PalettesResponse,
};

/// Build the `/api` router
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/palette-change", post(palettes::change_palette))
        .route("/palettes", get(palettes::list_palettes))
        .route("/palette", get(palettes::active_palette))
}

/// Routes served at the site root
pub fn site_router() -> Router<AppState> {
    Router::new().route("/theme.css", get(theme::theme_css))
}
