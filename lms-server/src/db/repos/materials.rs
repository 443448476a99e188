//! Course material repository

use chrono::{DateTime, Utc};
use lms_core::models::NewMaterial;
use sqlx::{FromRow, SqlitePool};

use super::DbError;
use crate::uploads::StoredFile;

/// Material record from database
#[derive(Debug, Clone, FromRow)]
pub struct Material {
    pub id: i64,
    pub course_id: i64,
    pub author_id: Option<i64>,
    pub title: String,
    pub body: Option<String>,
    pub file_name: Option<String>,
    pub stored_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

const MATERIAL_COLUMNS: &str =
    "id, course_id, author_id, title, body, file_name, stored_name, created_at";

/// Material repository
pub struct MaterialRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> MaterialRepo<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        course_id: i64,
        author_id: i64,
        material: &NewMaterial,
        file: Option<&StoredFile>,
    ) -> Result<Material, DbError> {
        let sql = format!(
            "INSERT INTO materials (course_id, author_id, title, body, file_name, stored_name, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {MATERIAL_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Material>(&sql)
            .bind(course_id)
            .bind(author_id)
            .bind(material.title.as_str())
            .bind(material.body.as_ref().map(|b| b.as_str()))
            .bind(file.map(|f| f.file_name.as_str()))
            .bind(file.map(|f| f.stored_name.as_str()))
            .bind(Utc::now())
            .fetch_one(self.pool)
            .await?)
    }

    pub async fn get(&self, id: i64) -> Result<Material, DbError> {
        let sql = format!("SELECT {MATERIAL_COLUMNS} FROM materials WHERE id = $1");
        sqlx::query_as::<_, Material>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("material", id))
    }

    /// Newest first.
    pub async fn list_for_course(&self, course_id: i64) -> Result<Vec<Material>, DbError> {
        let sql = format!(
            "SELECT {MATERIAL_COLUMNS} FROM materials WHERE course_id = $1 ORDER BY created_at DESC, id DESC"
        );
        Ok(sqlx::query_as::<_, Material>(&sql)
            .bind(course_id)
            .fetch_all(self.pool)
            .await?)
    }

    /// Delete and return the removed row so its file can be cleaned up.
    pub async fn delete(&self, id: i64) -> Result<Material, DbError> {
        let sql = format!("DELETE FROM materials WHERE id = $1 RETURNING {MATERIAL_COLUMNS}");
        sqlx::query_as::<_, Material>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("material", id))
    }
}
