//! API route definitions.

use axum::http::{HeaderValue, Method, header};
use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::auth::auth_middleware;

use super::handlers;
use super::state::AppState;

/// Create the application router.
///
/// Authentication is attached as an advisory layer over every route:
/// a valid bearer token yields a principal in request extensions, an
/// invalid or absent one leaves the request unauthenticated. Route
/// policy is enforced by the handlers' extractors.
pub fn create_router(state: AppState) -> Router {
    let cors = build_cors_layer(&state);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_request(DefaultOnRequest::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    let auth_state = state.auth.clone();

    Router::new()
        .route("/health", get(handlers::health))
        // Session handshake
        .route("/account/login", post(handlers::auth::login))
        .route("/account/logout", post(handlers::auth::logout))
        .route("/account/actual", get(handlers::auth::current_session))
        // Account management
        .route("/account/save", post(handlers::accounts::save_account))
        .route("/account/list", get(handlers::accounts::list_accounts))
        .route("/account/role", post(handlers::accounts::account_role))
        .route("/account/edit", put(handlers::accounts::edit_account))
        .route("/account/delete", delete(handlers::accounts::delete_account))
        .route("/account/clear", delete(handlers::accounts::clear_accounts))
        // Student directory
        .route("/student/list", get(handlers::students::list_students))
        .route("/student", get(handlers::students::get_student))
        .route("/student/save", post(handlers::students::save_student))
        .route("/student/edit", put(handlers::students::edit_student))
        .route("/student/delete", delete(handlers::students::delete_student))
        .route("/student/clear", delete(handlers::students::clear_students))
        .layer(middleware::from_fn_with_state(auth_state, auth_middleware))
        .layer(trace_layer)
        .layer(cors)
        .with_state(state)
}

/// Build the CORS layer from configured origins.
fn build_cors_layer(state: &AppState) -> CorsLayer {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];

    let headers = [
        header::AUTHORIZATION,
        header::CONTENT_TYPE,
        header::ACCEPT,
        header::ORIGIN,
    ];

    let origins: Vec<HeaderValue> = state
        .auth
        .allowed_origins()
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                tracing::warn!("CORS: Invalid origin in config: {}", origin);
                None
            })
        })
        .collect();

    if origins.is_empty() {
        tracing::warn!("CORS: No valid origins configured, denying all cross-origin requests");
        CorsLayer::new().allow_origin(AllowOrigin::exact(HeaderValue::from_static("null")))
    } else {
        tracing::info!("CORS: Allowing {} origin(s)", origins.len());
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(headers)
            .allow_credentials(true)
    }
}
