//! Program registration and administrative edits.

use uuid::Uuid;

use crate::error::StoreError;
use crate::types::Program;
use crate::{now_rfc3339, JobStore};

fn validate_program(name: &str, estimated_duration_seconds: Option<i64>) -> Result<(), StoreError> {
    if name.trim().is_empty() {
        return Err(StoreError::validation("program name must not be empty"));
    }
    if let Some(est) = estimated_duration_seconds {
        if est <= 0 {
            return Err(StoreError::validation(
                "estimated_duration_seconds must be positive when present",
            ));
        }
    }
    Ok(())
}

impl JobStore {
    /// Register a new program. Names are unique across the registry.
    pub async fn register_program(
        &self,
        name: &str,
        code_text: &str,
        estimated_duration_seconds: Option<i64>,
    ) -> Result<Program, StoreError> {
        validate_program(name, estimated_duration_seconds)?;

        let existing: Option<i64> = sqlx::query_scalar("SELECT 1 FROM programs WHERE name = ?")
            .bind(name)
            .fetch_optional(self.pool())
            .await?;
        if existing.is_some() {
            return Err(StoreError::validation(format!(
                "program with name '{name}' already exists"
            )));
        }

        let id = Uuid::new_v4();
        let now = now_rfc3339();
        sqlx::query(
            "INSERT INTO programs (id, name, code_text, estimated_duration_seconds, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(name)
        .bind(code_text)
        .bind(estimated_duration_seconds)
        .bind(&now)
        .bind(&now)
        .execute(self.pool())
        .await?;

        tracing::info!(program_id = %id, name = %name, "program registered");
        self.get_program(id).await
    }

    pub async fn get_program(&self, id: Uuid) -> Result<Program, StoreError> {
        sqlx::query_as::<_, Program>(
            "SELECT id, name, code_text, estimated_duration_seconds, created_at, updated_at \
             FROM programs WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await?
        .ok_or(StoreError::ProgramNotFound(id))
    }

    pub async fn list_programs(&self) -> Result<Vec<Program>, StoreError> {
        let programs = sqlx::query_as::<_, Program>(
            "SELECT id, name, code_text, estimated_duration_seconds, created_at, updated_at \
             FROM programs ORDER BY created_at DESC",
        )
        .fetch_all(self.pool())
        .await?;
        Ok(programs)
    }

    /// Administrative full edit of a program. Does not touch existing jobs.
    pub async fn update_program(
        &self,
        id: Uuid,
        name: &str,
        code_text: &str,
        estimated_duration_seconds: Option<i64>,
    ) -> Result<Program, StoreError> {
        validate_program(name, estimated_duration_seconds)?;

        let taken: Option<i64> =
            sqlx::query_scalar("SELECT 1 FROM programs WHERE name = ? AND id != ?")
                .bind(name)
                .bind(id)
                .fetch_optional(self.pool())
                .await?;
        if taken.is_some() {
            return Err(StoreError::validation(format!(
                "program with name '{name}' already exists"
            )));
        }

        let rows = sqlx::query(
            "UPDATE programs SET name = ?, code_text = ?, estimated_duration_seconds = ?, updated_at = ? \
             WHERE id = ?",
        )
        .bind(name)
        .bind(code_text)
        .bind(estimated_duration_seconds)
        .bind(now_rfc3339())
        .bind(id)
        .execute(self.pool())
        .await?
        .rows_affected();
        if rows == 0 {
            return Err(StoreError::ProgramNotFound(id));
        }

        self.get_program(id).await
    }
}
