//! Namespace repository.
//!
//! Writes that race with another scheduler (in this process or another one)
//! are serialised by `rotation_version`: every conditional statement carries
//! the version the caller read, and a zero row count means the caller lost.

use crate::repositories::from_millis;
use crate::{DbError, NamespaceStore, Result as DbErrorResult};

use tmq_core::Namespace;

use std::panic::Location;

use async_trait::async_trait;
use error_location::ErrorLocation;
use sqlx::{FromRow, SqlitePool};

#[derive(Debug, FromRow)]
struct NamespaceRow {
    name: String,
    created: i64,
    expires: i64,
    rotation_version: i64,
    contact: Option<String>,
}

impl TryFrom<NamespaceRow> for Namespace {
    type Error = DbError;

    fn try_from(row: NamespaceRow) -> DbErrorResult<Self> {
        Namespace::validate_name(&row.name).map_err(|source| DbError::InvalidRecord {
            source,
            location: ErrorLocation::from(Location::caller()),
        })?;

        Ok(Namespace {
            created: from_millis(row.created, "tmq_namespaces.created")?,
            expires: from_millis(row.expires, "tmq_namespaces.expires")?,
            name: row.name,
            rotation_version: row.rotation_version,
            contact: row.contact,
        })
    }
}

pub struct NamespaceRepository {
    pool: SqlitePool,
}

impl NamespaceRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NamespaceStore for NamespaceRepository {
    async fn insert(&self, namespace: &Namespace) -> DbErrorResult<()> {
        sqlx::query(
            r#"
                INSERT INTO tmq_namespaces (name, created, expires, rotation_version, contact)
                VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&namespace.name)
        .bind(namespace.created.timestamp_millis())
        .bind(namespace.expires.timestamp_millis())
        .bind(namespace.rotation_version)
        .bind(&namespace.contact)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, name: &str) -> DbErrorResult<Option<Namespace>> {
        let row = sqlx::query_as::<_, NamespaceRow>(
            r#"
                SELECT name, created, expires, rotation_version, contact
                FROM tmq_namespaces
                WHERE name = ?
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Namespace::try_from).transpose()
    }

    async fn list_all(&self) -> DbErrorResult<Vec<Namespace>> {
        let rows = sqlx::query_as::<_, NamespaceRow>(
            r#"
                SELECT name, created, expires, rotation_version, contact
                FROM tmq_namespaces
                ORDER BY expires ASC, name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Namespace::try_from).collect()
    }

    async fn compare_and_swap(
        &self,
        expected_version: i64,
        updated: &Namespace,
    ) -> DbErrorResult<bool> {
        let result = sqlx::query(
            r#"
                UPDATE tmq_namespaces
                SET created = ?, expires = ?, rotation_version = ?, contact = ?
                WHERE name = ? AND rotation_version = ?
            "#,
        )
        .bind(updated.created.timestamp_millis())
        .bind(updated.expires.timestamp_millis())
        .bind(updated.rotation_version)
        .bind(&updated.contact)
        .bind(&updated.name)
        .bind(expected_version)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn delete_if_version(&self, name: &str, expected_version: i64) -> DbErrorResult<bool> {
        let result = sqlx::query(
            r#"
                DELETE FROM tmq_namespaces
                WHERE name = ? AND rotation_version = ?
            "#,
        )
        .bind(name)
        .bind(expected_version)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}
