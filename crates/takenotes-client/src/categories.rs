use std::collections::HashMap;

use uuid::Uuid;

use takenotes_types::api::{CategoryRecord, NoteRecord};
use takenotes_types::models::{Category, CategoryAlias};

use crate::TakeNotesClient;
use crate::error::ApiError;

pub const UNCATEGORIZED: &str = "Uncategorized";

impl TakeNotesClient {
    /// Fetch the user's categories, preserving the server's order.
    pub async fn list_categories(&self) -> Result<Vec<Category>, ApiError> {
        let records: Vec<CategoryRecord> = self.gateway().get("/api/categories/").await?;
        Ok(records.into_iter().map(Category::from).collect())
    }

    /// Map a sidebar alias to the server-assigned category id, or `None` when
    /// no category answers to that name.
    pub async fn resolve_alias(&self, alias: CategoryAlias) -> Result<Option<Uuid>, ApiError> {
        let categories = self.list_categories().await?;
        Ok(resolve_alias_in(alias, &categories))
    }

    /// Tally all notes by their category name. Notes without a category count
    /// under "Uncategorized".
    pub async fn category_counts(&self) -> Result<HashMap<String, usize>, ApiError> {
        let records: Vec<NoteRecord> = self.gateway().get("/api/notes/").await?;
        let mut counts = HashMap::new();
        for record in records {
            let name = record
                .category_name
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| UNCATEGORIZED.to_owned());
            *counts.entry(name).or_insert(0) += 1;
        }
        Ok(counts)
    }
}

/// Pure lookup half of [`TakeNotesClient::resolve_alias`].
pub fn resolve_alias_in(alias: CategoryAlias, categories: &[Category]) -> Option<Uuid> {
    categories
        .iter()
        .find(|category| alias.matches_name(&category.name))
        .map(|category| category.id)
}
