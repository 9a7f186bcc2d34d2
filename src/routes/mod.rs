//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Public JSON API under `/api`, the back office under `/api/admin`, static
//! downloads (answer keys and the like) under `/assets`. Browser pages are
//! clients of this API and are not served from here.

pub mod admin;
pub mod auth;
pub mod discovery;
pub mod forms;
pub mod reviews;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/discovery", post(admin::create_item))
        .route("/discovery/{id}", put(admin::update_item).delete(admin::delete_item))
        .route("/discovery/import", post(admin::import_csv))
        .route("/discovery/template.csv", get(admin::template))
        .route("/discovery/export.csv", get(admin::export_csv))
        .route("/settings/banner", get(admin::get_banner).put(admin::save_banner))
        .route("/events", get(admin::list_events))
        .route("/registrations", get(admin::list_registrations))
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/me", get(auth::me))
        .route("/discovery", get(discovery::list_items))
        .route("/discovery/featured", get(discovery::featured))
        .route("/discovery/upcoming", get(discovery::upcoming_events))
        .route("/discovery/{id}", get(discovery::get_item))
        .route("/discovery/{id}/reviews", get(reviews::list).post(reviews::create))
        .route("/reviews/{id}", put(reviews::update).delete(reviews::delete))
        .route("/categories", get(discovery::categories))
        .route("/events/featured", get(forms::featured_events))
        .route("/registrations", post(forms::register))
        .route("/inquiries", post(forms::inquire))
        .route("/competition/applications", post(forms::apply))
        .route("/competition/admit-card", get(forms::admit_card))
        .route("/competition/result", get(forms::exam_result))
        .route("/settings/banner", get(forms::banner))
        .nest("/admin", admin_routes())
}

/// Full application router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let assets = ServeDir::new(&state.assets_dir);

    Router::new()
        .nest("/api", api_routes())
        .route("/healthz", get(healthz))
        .nest_service("/assets", assets)
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
