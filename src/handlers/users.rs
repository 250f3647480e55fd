use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::User;
use crate::state::AppState;

// GET /api/users
pub async fn list_users(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<User>>, AppError> {
    let db = state.db.lock().unwrap();
    let users = queries::list_users(&db)?;
    Ok(Json(users))
}

// POST /api/users
#[derive(Deserialize)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub is_host: bool,
    #[serde(default = "default_true")]
    pub is_guest: bool,
}

fn default_true() -> bool {
    true
}

pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateUser>,
) -> Result<Json<User>, AppError> {
    let user = User {
        id: Uuid::new_v4().to_string(),
        name: payload.name,
        email: payload.email,
        is_host: payload.is_host,
        is_guest: payload.is_guest,
        created_at: Utc::now().naive_utc(),
    };

    let db = state.db.lock().unwrap();
    queries::create_user(&db, &user)?;
    Ok(Json(user))
}
