use std::any::Any;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any as AnyOrigin, CorsLayer};
use tower_http::services::ServeDir;

use crate::handlers::a002_worker::WorkerResource;
use crate::handlers::a003_product::ProductResource;
use crate::handlers::a004_supplier::SupplierResource;
use crate::handlers::crud::{self, CrudResource};
use crate::handlers::{a001_company, media};
use crate::shared::state::AppState;
use crate::shared::web::render::{AJAX_ERROR_MESSAGE, NOT_FOUND_MESSAGE};
use crate::system;

/// Room for multipart framing on top of the image itself
const UPLOAD_OVERHEAD_BYTES: usize = 64 * 1024;

/// List, detail, create, update and delete routes of one catalog aggregate
fn crud_routes<T: CrudResource>() -> Router<AppState> {
    let base = T::BASE_PATH;
    Router::new()
        .route(&format!("{}/", base), get(crud::list::<T>))
        .route(
            &format!("{}/create/", base),
            get(crud::create_form::<T>).post(crud::create::<T>),
        )
        .route(&format!("{}/:id/", base), get(crud::detail::<T>))
        .route(
            &format!("{}/:id/update/", base),
            get(crud::update_form::<T>).post(crud::update::<T>),
        )
        .route(
            &format!("{}/:id/delete/", base),
            get(crud::delete_confirm::<T>).post(crud::delete::<T>),
        )
}

async fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "detail": NOT_FOUND_MESSAGE })),
    )
        .into_response()
}

/// A panicking handler still answers with the generic error body
fn panic_response(_panic: Box<dyn Any + Send + 'static>) -> Response {
    tracing::error!("Handler panicked while processing a request");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": AJAX_ERROR_MESSAGE })),
    )
        .into_response()
}

/// Build the application router
pub fn configure_routes(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AnyOrigin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::HeaderName::from_static("x-requested-with"),
        ]);
    let upload_limit = state.config.media.max_upload_bytes() + UPLOAD_OVERHEAD_BYTES;
    let media_dir = ServeDir::new(&state.media_root);

    Router::new()
        .route("/health", get(|| async { "ok" }))
        // ========================================
        // COMPANY (singleton, no id in the path)
        // ========================================
        .route("/company/", get(a001_company::detail))
        .route(
            "/company/create/",
            get(a001_company::create_form).post(a001_company::create),
        )
        .route(
            "/company/update/",
            get(a001_company::update_form).post(a001_company::update),
        )
        .route(
            "/company/delete/",
            get(a001_company::delete_confirm).post(a001_company::delete),
        )
        // ========================================
        // CATALOGS
        // ========================================
        .merge(crud_routes::<WorkerResource>())
        .merge(crud_routes::<ProductResource>())
        .merge(crud_routes::<SupplierResource>())
        // ========================================
        // MEDIA
        // ========================================
        .route(
            "/upload/",
            post(media::upload).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .nest_service(media::MEDIA_URL, media_dir)
        .fallback(not_found)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(middleware::from_fn(system::middleware::request_logger))
        .layer(cors)
        .layer(middleware::from_fn(system::middleware::security_headers))
        .with_state(state)
}
