// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::state::AppState;

pub mod health;
pub mod session;

use health::{HealthChecks, HealthResponse, ReadyResponse};
use session::SessionResponse;

pub fn router(state: AppState) -> Router {
    let session_route = get(session::get_session).delete(session::sign_out);
    #[cfg(feature = "dev")]
    let session_route = session_route.post(session::dev::sign_in);

    let v1_routes = Router::new()
        .route("/session", session_route)
        .route("/session/roles/{role}", get(session::check_role))
        .with_state(state);

    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .with_state(state);

    Router::new()
        .nest("/v1", v1_routes)
        .merge(health_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", api_doc()))
        .layer(TraceLayer::new_for_http())
}

fn api_doc() -> utoipa::openapi::OpenApi {
    #[allow(unused_mut)]
    let mut doc = ApiDoc::openapi();
    #[cfg(feature = "dev")]
    doc.merge(DevApiDoc::openapi());
    doc
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        health::liveness,
        session::get_session,
        session::check_role,
        session::sign_out
    ),
    components(
        schemas(
            ReadyResponse,
            HealthChecks,
            HealthResponse,
            SessionResponse
        )
    ),
    tags(
        (name = "Health", description = "Liveness and readiness"),
        (name = "Session", description = "Cookie ticket sessions")
    )
)]
struct ApiDoc;

#[cfg(feature = "dev")]
#[derive(OpenApi)]
#[openapi(paths(session::dev::sign_in), components(schemas(session::dev::SignInRequest)))]
struct DevApiDoc;
