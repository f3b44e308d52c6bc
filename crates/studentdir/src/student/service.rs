//! Student service for business logic.

use anyhow::{Result, bail};
use tracing::{info, instrument, warn};

use super::models::{CreateStudentRequest, Student, UpdateStudentRequest};
use super::repository::StudentRepository;

/// Service for student directory operations.
#[derive(Debug, Clone)]
pub struct StudentService {
    repo: StudentRepository,
}

impl StudentService {
    /// Create a new student service.
    pub fn new(repo: StudentRepository) -> Self {
        Self { repo }
    }

    /// Create a new student with validation.
    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn save_student(&self, request: CreateStudentRequest) -> Result<Student> {
        if request.name.trim().is_empty() {
            bail!("Invalid student: name cannot be empty.");
        }

        let student = self.repo.create(request).await?;
        info!(student_id = student.id, "Created student");

        Ok(student)
    }

    /// Get a student by ID.
    #[instrument(skip(self))]
    pub async fn get_student(&self, id: i64) -> Result<Option<Student>> {
        self.repo.get(id).await
    }

    /// List all students.
    #[instrument(skip(self))]
    pub async fn list_students(&self) -> Result<Vec<Student>> {
        self.repo.list().await
    }

    /// Edit an existing student. Returns `None` when it does not exist.
    #[instrument(skip(self, request), fields(student_id = request.id))]
    pub async fn edit_student(&self, request: UpdateStudentRequest) -> Result<Option<Student>> {
        if self.repo.get(request.id).await?.is_none() {
            return Ok(None);
        }

        if request.name.trim().is_empty() {
            bail!("Invalid student: name cannot be empty.");
        }

        let student = self.repo.update(request).await?;
        info!(student_id = student.id, "Updated student");

        Ok(Some(student))
    }

    /// Delete a student.
    #[instrument(skip(self))]
    pub async fn delete_student(&self, id: i64) -> Result<()> {
        self.repo.delete(id).await?;
        info!(student_id = id, "Deleted student");
        Ok(())
    }

    /// Delete every student.
    #[instrument(skip(self))]
    pub async fn clear_students(&self) -> Result<()> {
        self.repo.delete_all().await?;
        warn!("Deleted all students");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    async fn setup_service() -> StudentService {
        let db = Database::in_memory().await.unwrap();
        StudentService::new(StudentRepository::new(db.pool().clone()))
    }

    fn create_request(name: &str) -> CreateStudentRequest {
        CreateStudentRequest {
            name: name.to_string(),
            phone_number: 5551234,
            email: String::new(),
            address: String::new(),
        }
    }

    #[tokio::test]
    async fn test_save_rejects_empty_name() {
        let service = setup_service().await;
        let err = service.save_student(create_request("  ")).await.unwrap_err();
        assert!(err.to_string().contains("name cannot be empty"));
    }

    #[tokio::test]
    async fn test_save_and_list() {
        let service = setup_service().await;
        service.save_student(create_request("Ada")).await.unwrap();
        service.save_student(create_request("Grace")).await.unwrap();

        let all = service.list_students().await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_edit_missing_student_is_none() {
        let service = setup_service().await;
        let result = service
            .edit_student(UpdateStudentRequest {
                id: 7,
                name: "Ghost".to_string(),
                phone_number: 0,
                email: String::new(),
                address: String::new(),
            })
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_clear_students() {
        let service = setup_service().await;
        service.save_student(create_request("Ada")).await.unwrap();
        service.clear_students().await.unwrap();
        assert!(service.list_students().await.unwrap().is_empty());
    }
}
