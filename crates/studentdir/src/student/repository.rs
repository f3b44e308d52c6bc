//! Student repository for database operations.

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use tracing::{debug, instrument};

use super::models::{CreateStudentRequest, Student, UpdateStudentRequest};

/// Repository for student database operations.
#[derive(Debug, Clone)]
pub struct StudentRepository {
    pool: SqlitePool,
}

impl StudentRepository {
    /// Create a new student repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new student.
    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create(&self, request: CreateStudentRequest) -> Result<Student> {
        debug!("creating student: {}", request.name);

        let result = sqlx::query(
            r#"
            INSERT INTO students (name, phone_number, email, address)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&request.name)
        .bind(request.phone_number)
        .bind(&request.email)
        .bind(&request.address)
        .execute(&self.pool)
        .await
        .context("Failed to insert student")?;

        let id = result.last_insert_rowid();
        self.get(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Student not found after creation"))
    }

    /// Get a student by ID.
    #[instrument(skip(self))]
    pub async fn get(&self, id: i64) -> Result<Option<Student>> {
        let student = sqlx::query_as::<_, Student>(
            r#"
            SELECT id, name, phone_number, email, address
            FROM students
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch student")?;

        Ok(student)
    }

    /// List all students.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Student>> {
        let students = sqlx::query_as::<_, Student>(
            r#"
            SELECT id, name, phone_number, email, address
            FROM students
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list students")?;

        Ok(students)
    }

    /// Overwrite a student's fields.
    #[instrument(skip(self, request), fields(student_id = request.id))]
    pub async fn update(&self, request: UpdateStudentRequest) -> Result<Student> {
        let result = sqlx::query(
            r#"
            UPDATE students
            SET name = ?, phone_number = ?, email = ?, address = ?
            WHERE id = ?
            "#,
        )
        .bind(&request.name)
        .bind(request.phone_number)
        .bind(&request.email)
        .bind(&request.address)
        .bind(request.id)
        .execute(&self.pool)
        .await
        .context("Failed to update student")?;

        if result.rows_affected() == 0 {
            return Err(anyhow::anyhow!("Student not found: {}", request.id));
        }

        self.get(request.id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Student not found after update"))
    }

    /// Delete a student.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM students WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete student")?;

        if result.rows_affected() == 0 {
            return Err(anyhow::anyhow!("Student not found: {}", id));
        }

        Ok(())
    }

    /// Delete all students.
    #[instrument(skip(self))]
    pub async fn delete_all(&self) -> Result<()> {
        sqlx::query("DELETE FROM students")
            .execute(&self.pool)
            .await
            .context("Failed to delete students")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    async fn setup_repo() -> StudentRepository {
        let db = Database::in_memory().await.unwrap();
        StudentRepository::new(db.pool().clone())
    }

    fn create_request(name: &str) -> CreateStudentRequest {
        CreateStudentRequest {
            name: name.to_string(),
            phone_number: 5551234,
            email: format!("{}@example.com", name),
            address: "1 Main St".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_and_get_student() {
        let repo = setup_repo().await;

        let student = repo.create(create_request("Ada")).await.unwrap();
        assert_eq!(student.name, "Ada");
        assert_eq!(student.phone_number, 5551234);

        let fetched = repo.get(student.id).await.unwrap().unwrap();
        assert_eq!(fetched.id, student.id);

        assert!(repo.get(9999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_students() {
        let repo = setup_repo().await;
        for name in ["Ada", "Grace", "Edsger"] {
            repo.create(create_request(name)).await.unwrap();
        }

        let all = repo.list().await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].name, "Ada");
    }

    #[tokio::test]
    async fn test_update_student() {
        let repo = setup_repo().await;
        let student = repo.create(create_request("Ada")).await.unwrap();

        let updated = repo
            .update(UpdateStudentRequest {
                id: student.id,
                name: "Ada Lovelace".to_string(),
                phone_number: 5559999,
                email: "ada@example.com".to_string(),
                address: "2 Analytical Way".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(updated.name, "Ada Lovelace");
        assert_eq!(updated.phone_number, 5559999);
    }

    #[tokio::test]
    async fn test_update_missing_student() {
        let repo = setup_repo().await;
        let result = repo
            .update(UpdateStudentRequest {
                id: 404,
                name: "Ghost".to_string(),
                phone_number: 0,
                email: String::new(),
                address: String::new(),
            })
            .await;
        assert!(result.unwrap_err().to_string().contains("not found"));
    }

    #[tokio::test]
    async fn test_delete_and_clear() {
        let repo = setup_repo().await;
        let a = repo.create(create_request("Ada")).await.unwrap();
        repo.create(create_request("Grace")).await.unwrap();

        repo.delete(a.id).await.unwrap();
        assert_eq!(repo.list().await.unwrap().len(), 1);

        repo.delete_all().await.unwrap();
        assert!(repo.list().await.unwrap().is_empty());
    }
}
