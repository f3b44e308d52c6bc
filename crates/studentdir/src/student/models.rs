//! Student entity and request types.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Student database row.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Student {
    pub id: i64,
    pub name: String,
    pub phone_number: i64,
    pub email: String,
    pub address: String,
}

/// Request body for creating a student.
#[derive(Debug, Deserialize)]
pub struct CreateStudentRequest {
    pub name: String,
    #[serde(default)]
    pub phone_number: i64,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub address: String,
}

/// Request body for editing a student.
#[derive(Debug, Deserialize)]
pub struct UpdateStudentRequest {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub phone_number: i64,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub address: String,
}
