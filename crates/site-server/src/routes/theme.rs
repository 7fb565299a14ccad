//! Stylesheet for the active palette

use axum::{extract::State, http::header, response::IntoResponse};
use palette::theme_stylesheet;

use crate::AppState;

/// `:root` custom properties and fallback gradient for the active palette
pub async fn theme_css(State(state): State<AppState>) -> impl IntoResponse {
    let context = state.resolver.resolve_active_context().await;
    (
        [
            (header::CONTENT_TYPE, "text/css; charset=utf-8"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        theme_stylesheet(&context),
    )
}
