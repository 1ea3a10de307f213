// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session endpoints backed by the active ticket provider.

use axum::{
    extract::Path,
    http::{HeaderMap, StatusCode},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::info;
use utoipa::ToSchema;

use crate::auth::{extractor::outbound_header_map, registry, Auth, AuthError, Ticket};
use crate::error::ApiError;

/// Response for GET /v1/session
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    /// Authenticated principal
    pub subject: String,
    /// Role labels as issued
    pub roles: Vec<String>,
    /// Ticket expiry
    pub expires_at: DateTime<Utc>,
    /// Caller-defined ticket data
    #[schema(value_type = Object)]
    pub data: Value,
}

impl From<Ticket<Value>> for SessionResponse {
    fn from(ticket: Ticket<Value>) -> Self {
        Self {
            subject: ticket.subject,
            roles: ticket.roles,
            expires_at: ticket.expiry,
            data: ticket.payload,
        }
    }
}

/// Get the current session.
#[utoipa::path(
    get,
    path = "/v1/session",
    tag = "Session",
    responses(
        (status = 200, description = "Session information", body = SessionResponse),
        (status = 401, description = "No valid ticket cookie"),
    )
)]
pub async fn get_session(Auth(ticket): Auth) -> Json<SessionResponse> {
    Json(ticket.into())
}

/// Check whether the caller holds a role (case-insensitive).
#[utoipa::path(
    get,
    path = "/v1/session/roles/{role}",
    params(
        ("role" = String, Path, description = "Role name to check")
    ),
    tag = "Session",
    responses(
        (status = 204, description = "Caller holds the role"),
        (status = 401, description = "No valid ticket cookie"),
        (status = 403, description = "Caller does not hold the role"),
    )
)]
pub async fn check_role(auth: Auth, Path(role): Path<String>) -> Result<StatusCode, AuthError> {
    auth.require_role(&role)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Sign out by clearing the ticket cookie.
///
/// Always succeeds, whatever state the caller's ticket is in.
#[utoipa::path(
    delete,
    path = "/v1/session",
    tag = "Session",
    responses((status = 204, description = "Ticket cookie cleared"))
)]
pub async fn sign_out() -> Result<(StatusCode, HeaderMap), ApiError> {
    let provider = registry::current();
    let headers = outbound_header_map(&provider.sign_out())?;
    info!(provider = %provider.name(), "signed out");
    Ok((StatusCode::NO_CONTENT, headers))
}

/// Development-only ticket issuance.
#[cfg(feature = "dev")]
pub mod dev {
    use axum::{extract::State, http::HeaderMap, http::StatusCode, Json};
    use serde::Deserialize;
    use serde_json::Value;
    use utoipa::ToSchema;

    use crate::auth::{extractor::outbound_header_map, registry};
    use crate::error::ApiError;
    use crate::state::AppState;

    /// Request body for POST /v1/session
    #[derive(Debug, Deserialize, ToSchema)]
    pub struct SignInRequest {
        pub subject: String,
        #[serde(default)]
        pub roles: Vec<String>,
        #[serde(default)]
        #[schema(value_type = Object)]
        pub data: Value,
        /// Defaults to the configured lifetime
        #[serde(default)]
        pub days: Option<i64>,
    }

    /// Issue a ticket without any credential check.
    ///
    /// Development builds only.
    #[utoipa::path(
        post,
        path = "/v1/session",
        request_body = SignInRequest,
        tag = "Session",
        responses(
            (status = 201, description = "Ticket cookie set"),
            (status = 400, description = "Invalid subject or lifetime"),
        )
    )]
    pub async fn sign_in(
        State(state): State<AppState>,
        Json(request): Json<SignInRequest>,
    ) -> Result<(StatusCode, HeaderMap), ApiError> {
        let days = request.days.unwrap_or(state.lifetime_days);
        let provider = registry::current();
        let headers = provider.sign_in(&request.subject, &request.roles, &request.data, days)?;
        Ok((StatusCode::CREATED, outbound_header_map(&headers)?))
    }
}
