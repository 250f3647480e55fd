use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub is_host: bool,
    pub is_guest: bool,
    pub created_at: chrono::NaiveDateTime,
}
