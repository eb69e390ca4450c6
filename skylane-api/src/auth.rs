use axum::{extract::State, routing::post, Json, Router};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use skylane_core::CustomerStore;
use skylane_shared::RegisteredCustomer;

use crate::error::AppError;
use crate::middleware::auth::{Claims, ROLE_CUSTOMER, ROLE_MANAGER};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct LoginRequest {
    /// Customer email or manager employee id; both go through the same
    /// credential shape.
    identifier: String,
    password: String,
}

#[derive(Debug, Serialize)]
struct AuthResponse {
    token: String,
    role: String,
}

#[derive(Debug, Deserialize)]
struct RegisterRequest {
    email: String,
    first_name: String,
    last_name: String,
    password: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
}

/// Dual-mode login: tries the registered-customer table first, then the
/// manager table.
async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    if let Some(customer) = state
        .store
        .find_registered_customer(&body.identifier)
        .await?
    {
        if verify_password(&body.password, &customer.password_hash)? {
            return issue_token(&state, &body.identifier, ROLE_CUSTOMER);
        }
    }

    if let Some(manager) = state.store.find_manager(&body.identifier).await? {
        if verify_password(&body.password, &manager.password_hash)? {
            return issue_token(&state, &body.identifier, ROLE_MANAGER);
        }
    }

    Err(AppError::AuthenticationError(
        "invalid credentials".to_string(),
    ))
}

async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    if !body.email.contains('@') {
        return Err(AppError::ValidationError(
            "a valid email address is required".to_string(),
        ));
    }
    if body.first_name.is_empty() || body.last_name.is_empty() {
        return Err(AppError::ValidationError(
            "first and last name are required".to_string(),
        ));
    }
    if body.password.len() < 8 {
        return Err(AppError::ValidationError(
            "password must be at least 8 characters".to_string(),
        ));
    }

    let password_hash = bcrypt::hash(&body.password, bcrypt::DEFAULT_COST)
        .map_err(|e| AppError::InternalServerError(format!("password hashing failed: {e}")))?;

    state
        .store
        .upsert_customer(&body.email, &body.first_name, &body.last_name)
        .await?;
    state
        .store
        .register_customer(&RegisteredCustomer {
            email: body.email.clone(),
            password_hash,
            registered_on: Utc::now().date_naive(),
        })
        .await?;

    tracing::info!(email = %body.email, "customer registered");
    Ok(Json(serde_json::json!({ "email": body.email })))
}

fn issue_token(
    state: &AppState,
    subject: &str,
    role: &str,
) -> Result<Json<AuthResponse>, AppError> {
    let claims = Claims {
        sub: subject.to_string(),
        role: role.to_string(),
        exp: (Utc::now() + Duration::seconds(state.auth.expiration as i64)).timestamp() as usize,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(state.auth.secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(format!("Token encoding failed: {}", e)))?;

    Ok(Json(AuthResponse {
        token,
        role: role.to_string(),
    }))
}

fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    bcrypt::verify(password, hash)
        .map_err(|e| AppError::InternalServerError(format!("password verification failed: {e}")))
}
