//! Entry CRUD endpoints.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};
use serde::Serialize;

use crate::entries::{Entry, EntryInput};
use crate::error::{AppError, Result};
use crate::server::AppState;

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub message: String,
}

type EntryBody = std::result::Result<Json<EntryInput>, JsonRejection>;
type EntryPath = std::result::Result<Path<i32>, PathRejection>;

fn not_found() -> AppError {
    AppError::NotFound("Entry not found".to_string())
}

/// Unwrap the request body and check it before any statement runs.
fn validated(body: EntryBody) -> Result<EntryInput> {
    let Json(input) = body?;
    input
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    Ok(input)
}

fn entry_id(path: EntryPath) -> Result<i32> {
    let Path(id) = path?;
    tracing::Span::current().record("entry_id", id);
    Ok(id)
}

/// GET /api/entries - List all entries, newest first
#[tracing::instrument(name = "http.list_entries", skip(state))]
pub async fn list_entries(State(state): State<AppState>) -> Result<Json<Vec<Entry>>> {
    Ok(Json(state.entries.list().await?))
}

/// POST /api/entries - Create a new entry
#[tracing::instrument(name = "http.create_entry", skip(state, body))]
pub async fn create_entry(
    State(state): State<AppState>,
    body: EntryBody,
) -> Result<(StatusCode, Json<Entry>)> {
    let input = validated(body)?;
    let entry = state.entries.create(&input).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// GET /api/entries/{id} - Get a specific entry
#[tracing::instrument(
    name = "http.get_entry",
    skip(state, path),
    fields(entry_id = tracing::field::Empty)
)]
pub async fn get_entry(State(state): State<AppState>, path: EntryPath) -> Result<Json<Entry>> {
    let id = entry_id(path)?;
    state.entries.get(id).await?.map(Json).ok_or_else(not_found)
}

/// PUT /api/entries/{id} - Replace an entry's title and content
#[tracing::instrument(
    name = "http.update_entry",
    skip(state, path, body),
    fields(entry_id = tracing::field::Empty)
)]
pub async fn update_entry(
    State(state): State<AppState>,
    path: EntryPath,
    body: EntryBody,
) -> Result<Json<Entry>> {
    let id = entry_id(path)?;
    let input = validated(body)?;
    state
        .entries
        .update(id, &input)
        .await?
        .map(Json)
        .ok_or_else(not_found)
}

/// DELETE /api/entries/{id} - Delete an entry
#[tracing::instrument(
    name = "http.delete_entry",
    skip(state, path),
    fields(entry_id = tracing::field::Empty)
)]
pub async fn delete_entry(
    State(state): State<AppState>,
    path: EntryPath,
) -> Result<Json<DeleteResponse>> {
    let id = entry_id(path)?;
    match state.entries.delete(id).await? {
        Some(_) => Ok(Json(DeleteResponse {
            message: "Entry deleted successfully".to_string(),
        })),
        None => Err(not_found()),
    }
}
