use uuid::Uuid;

use takenotes_types::api::{CreateNoteRequest, NotePatch, NoteRecord};
use takenotes_types::models::{CategoryAlias, Note};

use crate::TakeNotesClient;
use crate::categories::resolve_alias_in;
use crate::error::ApiError;

/// Scope for [`TakeNotesClient::list_notes`].
#[derive(Debug, Clone, Copy)]
pub enum NoteFilter {
    /// A server-assigned category id.
    Category(Uuid),
    /// A sidebar alias, resolved against the category list before filtering.
    Alias(CategoryAlias),
}

impl TakeNotesClient {
    /// List all notes, or just those in one category. Server order (most
    /// recently updated first) is preserved.
    pub async fn list_notes(&self, filter: Option<NoteFilter>) -> Result<Vec<Note>, ApiError> {
        let path = match filter {
            None => "/api/notes/".to_owned(),
            Some(NoteFilter::Category(id)) => format!("/api/notes/?category={id}"),
            Some(NoteFilter::Alias(alias)) => {
                let categories = self.list_categories().await?;
                match resolve_alias_in(alias, &categories) {
                    Some(id) => format!("/api/notes/?category={id}"),
                    // No matching category: pass the alias through and let
                    // the server decide what (if anything) it matches.
                    None => format!("/api/notes/?category={alias}"),
                }
            }
        };

        let records: Vec<NoteRecord> = self.gateway().get(&path).await?;
        Ok(records.into_iter().map(Note::from).collect())
    }

    /// A missing note reads as `Ok(None)`; any other failure propagates.
    pub async fn get_note(&self, id: Uuid) -> Result<Option<Note>, ApiError> {
        match self
            .gateway()
            .get::<NoteRecord>(&format!("/api/notes/{id}/"))
            .await
        {
            Ok(record) => Ok(Some(record.into())),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Create an empty note, optionally pre-assigned to a category.
    pub async fn create_note(&self, category: Option<Uuid>) -> Result<Note, ApiError> {
        let record: NoteRecord = self
            .gateway()
            .post("/api/notes/", &CreateNoteRequest { category })
            .await?;
        Ok(record.into())
    }

    /// Apply a partial update. Only the fields present in `patch` are sent;
    /// `updated_at` comes back server-assigned.
    pub async fn update_note(&self, id: Uuid, patch: &NotePatch) -> Result<Note, ApiError> {
        let record: NoteRecord = self
            .gateway()
            .patch(&format!("/api/notes/{id}/"), patch)
            .await?;
        Ok(record.into())
    }

    pub async fn delete_note(&self, id: Uuid) -> Result<(), ApiError> {
        self.gateway().delete(&format!("/api/notes/{id}/")).await
    }
}
