//! Entry statements issued through the query executor.

use std::sync::Arc;

use crate::postgres::{DatabaseError, QueryExecutor, SqlValue};

use super::{Entry, EntryInput};

const ENTRY_COLUMNS: &str = "id, title, content, created_at";

/// CRUD access to the `entries` table.
///
/// Inputs are expected to be validated by the caller.
#[derive(Clone)]
pub struct EntryRepository {
    executor: Arc<QueryExecutor>,
}

impl EntryRepository {
    pub fn new(executor: Arc<QueryExecutor>) -> Self {
        Self { executor }
    }

    /// All entries, newest first.
    pub async fn list(&self) -> Result<Vec<Entry>, DatabaseError> {
        let statement =
            format!("SELECT {ENTRY_COLUMNS} FROM entries ORDER BY created_at DESC, id DESC");
        self.executor
            .query(&statement, &[])
            .await?
            .deserialize_all()
    }

    pub async fn create(&self, input: &EntryInput) -> Result<Entry, DatabaseError> {
        let statement = format!(
            "INSERT INTO entries (title, content) VALUES ($1, $2) RETURNING {ENTRY_COLUMNS}"
        );
        let result = self
            .executor
            .query(&statement, &[input.title.as_str().into(), input.content.as_str().into()])
            .await?;

        let row = result.into_first().ok_or_else(|| {
            DatabaseError::Statement(sqlx::Error::RowNotFound)
        })?;
        let entry: Entry = row.deserialize()?;
        tracing::debug!(entry_id = entry.id, "Entry created");
        Ok(entry)
    }

    pub async fn get(&self, id: i32) -> Result<Option<Entry>, DatabaseError> {
        let statement = format!("SELECT {ENTRY_COLUMNS} FROM entries WHERE id = $1");
        self.single(&statement, &[SqlValue::Int(id)]).await
    }

    /// Replace title and content. `None` if no entry has this id.
    pub async fn update(&self, id: i32, input: &EntryInput) -> Result<Option<Entry>, DatabaseError> {
        let statement = format!(
            "UPDATE entries SET title = $1, content = $2 WHERE id = $3 RETURNING {ENTRY_COLUMNS}"
        );
        let params = [
            input.title.as_str().into(),
            input.content.as_str().into(),
            SqlValue::Int(id),
        ];
        self.single(&statement, &params).await
    }

    /// Delete by id, returning the removed entry.
    pub async fn delete(&self, id: i32) -> Result<Option<Entry>, DatabaseError> {
        let statement = format!("DELETE FROM entries WHERE id = $1 RETURNING {ENTRY_COLUMNS}");
        self.single(&statement, &[SqlValue::Int(id)]).await
    }

    async fn single(
        &self,
        statement: &str,
        params: &[SqlValue],
    ) -> Result<Option<Entry>, DatabaseError> {
        self.executor
            .query(statement, params)
            .await?
            .into_first()
            .map(|row| row.deserialize())
            .transpose()
    }
}
