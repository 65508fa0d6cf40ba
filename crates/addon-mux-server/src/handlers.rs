use addon_mux_core::CatalogRequest;
use addon_mux_sources::StoreError;
use axum::extract::{Path, State};
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN, CACHE_CONTROL,
};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::any::Any;
use std::sync::Arc;
use tracing::{debug, error, info};
use crate::AppState;

const NO_CACHE: &str = "no-cache, no-store, must-revalidate, max-age=0";
const ALLOWED_METHODS: &str = "GET, OPTIONS";
const JSON_SUFFIX: &str = ".json";

pub(crate) async fn apply_addon_headers(mut response: Response) -> Response {
    let headers = response.headers_mut();
    headers.insert(CACHE_CONTROL, HeaderValue::from_static(NO_CACHE));
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static(ALLOWED_METHODS));
    headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static("*"));
    response
}

pub(crate) async fn handle_preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}

pub(crate) async fn handle_health(State(state): State<Arc<AppState>>) -> Response {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ready",
            "version": env!("CARGO_PKG_VERSION"),
            "manifest_id": state.compositor.info().id,
        })),
    )
        .into_response()
}

pub(crate) async fn handle_manifest(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Response {
    if user_id.trim().is_empty() {
        return missing_parameter("userId");
    }

    match state.store.user_exists(&user_id).await {
        Ok(true) => {}
        Ok(false) => {
            info!(operation = "manifest_user_not_found", user_id = %user_id, "Serving user-not-found manifest");
            return Json(state.compositor.user_not_found()).into_response();
        }
        Err(e) => return internal_error("manifest", &user_id, &e),
    }

    let registrations = match state.store.active_registrations(&user_id).await {
        Ok(registrations) => registrations,
        Err(e) => return internal_error("manifest", &user_id, &e),
    };

    let manifest = state.compositor.compose(&registrations);
    debug!(
        operation = "manifest_composed",
        user_id = %user_id,
        registrations = registrations.len(),
        catalogs = manifest.catalogs.len(),
        "Composed combined manifest"
    );
    Json(manifest).into_response()
}

pub(crate) async fn handle_catalog(
    State(state): State<Arc<AppState>>,
    Path((user_id, content_type, catalog_file)): Path<(String, String, String)>,
) -> Response {
    let composite_id = strip_json_suffix(&catalog_file);
    serve_catalog(&state, &user_id, &content_type, composite_id, None).await
}

pub(crate) async fn handle_catalog_with_extra(
    State(state): State<Arc<AppState>>,
    Path((user_id, content_type, composite_id, extra_file)): Path<(String, String, String, String)>,
) -> Response {
    let extra = strip_json_suffix(&extra_file);
    serve_catalog(&state, &user_id, &content_type, &composite_id, Some(extra)).await
}

async fn serve_catalog(
    state: &AppState,
    user_id: &str,
    content_type: &str,
    composite_id: &str,
    extra: Option<&str>,
) -> Response {
    for (name, value) in [("userId", user_id), ("type", content_type), ("id", composite_id)] {
        if value.trim().is_empty() {
            return missing_parameter(name);
        }
    }

    match state.store.user_exists(user_id).await {
        Ok(true) => {}
        Ok(false) => {
            info!(operation = "catalog_user_not_found", user_id, "Catalog requested for unknown user");
            return error_response(StatusCode::NOT_FOUND, "user_not_found", "user not found");
        }
        Err(e) => return internal_error("catalog", user_id, &e),
    }

    let registrations = match state.store.active_registrations(user_id).await {
        Ok(registrations) => registrations,
        Err(e) => return internal_error("catalog", user_id, &e),
    };

    let request = CatalogRequest::new(content_type, composite_id).with_extra(extra.filter(|e| !e.is_empty()));
    let response = state.router.route(&registrations, request).await;
    Json(response).into_response()
}

fn strip_json_suffix(segment: &str) -> &str {
    segment.strip_suffix(JSON_SUFFIX).unwrap_or(segment)
}

fn missing_parameter(name: &str) -> Response {
    error_response(
        StatusCode::BAD_REQUEST,
        "missing_parameter",
        &format!("missing required parameter '{name}'"),
    )
}

/// Log the detail, answer with a generic body
fn internal_error(operation: &str, user_id: &str, err: &StoreError) -> Response {
    error!(operation, user_id, error = %err, "Registration store failure");
    error_response(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "internal server error")
}

pub(crate) fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!(operation = "handler_panic", panic = detail, "Request handler panicked");
    error_response(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "internal server error")
}

fn error_response(status: StatusCode, code: &str, message: &str) -> Response {
    (
        status,
        Json(json!({
            "error": {
                "code": code,
                "message": message,
            }
        })),
    )
        .into_response()
}
