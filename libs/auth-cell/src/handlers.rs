use std::sync::Arc;
use std::sync::OnceLock;

use axum::{extract::State, http::StatusCode, Extension, Json};
use regex::Regex;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::postgrest::PostgrestClient;
use shared_models::auth::AuthUser;
use shared_models::error::AppError;
use shared_utils::jwt::issue_token;

use crate::models::{AuthResponse, LoginRequest, RegisterRequest, UserAccount};
use crate::password;

/// Tokens live a week, matching how long a portal session is trusted.
const TOKEN_TTL_HOURS: i64 = 24 * 7;

fn email_is_valid(email: &str) -> bool {
    static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
    EMAIL_RE
        .get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"))
        .is_match(email)
}

fn issue_for(user: &UserAccount, config: &AppConfig) -> Result<String, AppError> {
    issue_token(
        &user.id.to_string(),
        &user.email,
        user.role.as_str(),
        &user.name,
        &config.jwt_secret,
        TOKEN_TTL_HOURS,
    )
    .map_err(AppError::Internal)
}

#[axum::debug_handler]
pub async fn register(
    State(config): State<Arc<AppConfig>>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    if request.name.trim().is_empty() || request.password.is_empty() {
        return Err(AppError::BadRequest("Missing required fields".to_string()));
    }
    if !email_is_valid(&request.email) {
        return Err(AppError::Validation("Invalid email address".to_string()));
    }

    let client = PostgrestClient::new(&config);

    let existing_path = format!("/rest/v1/users?email=eq.{}&select=id", request.email);
    let existing: Vec<Value> = client
        .request(Method::GET, &existing_path, None)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    if !existing.is_empty() {
        return Err(AppError::BadRequest("User already exists".to_string()));
    }

    let password_hash =
        password::hash_password(&request.password).map_err(|e| AppError::Internal(e.to_string()))?;

    let body = json!({
        "name": request.name,
        "email": request.email,
        "password_hash": password_hash,
        "role": request.role,
        "profile": request.profile,
    });
    let rows: Vec<UserAccount> = client
        .request_returning(Method::POST, "/rest/v1/users", Some(body))
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    let user = rows
        .into_iter()
        .next()
        .ok_or_else(|| AppError::Database("Insert returned no user row".to_string()))?;

    let token = issue_for(&user, &config)?;

    info!("Registered new {} account {}", user.role, user.id);
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: user.public(),
        }),
    ))
}

#[axum::debug_handler]
pub async fn login(
    State(config): State<Arc<AppConfig>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let client = PostgrestClient::new(&config);

    let path = format!("/rest/v1/users?email=eq.{}", request.email);
    let rows: Vec<UserAccount> = client
        .request(Method::GET, &path, None)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    // Same response for unknown email and wrong password.
    let user = rows
        .into_iter()
        .next()
        .ok_or_else(|| AppError::Auth("Invalid credentials".to_string()))?;

    let matches = password::verify_password(&request.password, &user.password_hash)
        .map_err(|e| AppError::Internal(e.to_string()))?;
    if !matches {
        return Err(AppError::Auth("Invalid credentials".to_string()));
    }

    let token = issue_for(&user, &config)?;

    debug!("User {} logged in", user.id);
    Ok(Json(AuthResponse {
        token,
        user: user.public(),
    }))
}

#[axum::debug_handler]
pub async fn get_profile(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Value>, AppError> {
    let user_id = Uuid::parse_str(&user.id)
        .map_err(|_| AppError::BadRequest("Invalid user ID format".to_string()))?;
    debug!("Getting profile for user: {}", user_id);

    let client = PostgrestClient::new(&config);

    let path = format!("/rest/v1/users?id=eq.{}", user_id);
    let rows: Vec<UserAccount> = client
        .request(Method::GET, &path, None)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    let account = rows
        .into_iter()
        .next()
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(json!(account.public())))
}
