//! Student directory handlers.

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use tracing::instrument;

use super::accounts::IdQuery;
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::auth::{CurrentUser, RequireAdmin};
use crate::student::{CreateStudentRequest, Student, UpdateStudentRequest};

/// List all students. Open to everyone.
#[instrument(skip(state))]
pub async fn list_students(State(state): State<AppState>) -> ApiResult<Json<Vec<Student>>> {
    let students = state.students.list_students().await?;
    Ok(Json(students))
}

/// Get a student by id.
#[instrument(skip(state, _user))]
pub async fn get_student(
    _user: CurrentUser,
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
) -> ApiResult<Json<Student>> {
    let student = state
        .students
        .get_student(query.id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Student not found: {}", query.id)))?;

    Ok(Json(student))
}

/// Create a new student.
#[instrument(skip(state, _user, request), fields(name = %request.name))]
pub async fn save_student(
    _user: CurrentUser,
    State(state): State<AppState>,
    Json(request): Json<CreateStudentRequest>,
) -> ApiResult<(StatusCode, Json<Student>)> {
    let student = state.students.save_student(request).await?;
    Ok((StatusCode::CREATED, Json(student)))
}

/// Edit an existing student.
#[instrument(skip(state, _user, request), fields(student_id = request.id))]
pub async fn edit_student(
    _user: CurrentUser,
    State(state): State<AppState>,
    Json(request): Json<UpdateStudentRequest>,
) -> ApiResult<Json<Student>> {
    let id = request.id;
    let student = state
        .students
        .edit_student(request)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Student not found: {}", id)))?;

    Ok(Json(student))
}

/// Delete a student by id. Admin only.
#[instrument(skip(state, _admin))]
pub async fn delete_student(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
) -> ApiResult<StatusCode> {
    state.students.delete_student(query.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Delete every student. Admin only.
#[instrument(skip(state, _admin))]
pub async fn clear_students(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> ApiResult<StatusCode> {
    state.students.clear_students().await?;
    Ok(StatusCode::NO_CONTENT)
}
