use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// -- Auth --

/// The backend keys accounts by username; the client sends the email address
/// as that username.
#[derive(Debug, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshResponse {
    pub access: Option<String>,
}

/// Register response. Newer backends nest the pair under `tokens`; older ones
/// return `access`/`refresh` at the top level. Both shapes are accepted.
#[derive(Debug, Deserialize)]
pub struct RegisterResponse {
    pub tokens: Option<TokenPair>,
    pub access: Option<String>,
    pub refresh: Option<String>,
}

impl RegisterResponse {
    /// Extract the token pair, preferring the nested form.
    pub fn into_tokens(self) -> Option<TokenPair> {
        if let Some(tokens) = self.tokens {
            return Some(tokens);
        }
        match (self.access, self.refresh) {
            (Some(access), Some(refresh)) => Some(TokenPair { access, refresh }),
            _ => None,
        }
    }
}

// -- Categories --

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryRecord {
    pub id: Uuid,
    pub name: String,
    pub color: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub note_count: Option<u64>,
}

// -- Notes --

/// A note as serialized by the server. `category_name`, `category_color` and
/// `last_edited_label` are display-only fields derived server-side; `title`
/// and `content` may be absent on sparsely-created notes.
#[derive(Debug, Clone, Deserialize)]
pub struct NoteRecord {
    pub id: Uuid,
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<Uuid>,
    pub category_name: Option<String>,
    pub category_color: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_edited: Option<DateTime<Utc>>,
    pub last_edited_label: Option<String>,
}

#[derive(Debug, Default, Serialize)]
pub struct CreateNoteRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Uuid>,
}

/// Partial update for a note. Only fields that are `Some` end up in the PATCH
/// body, so an update that sets the title alone leaves content and category
/// untouched on the server.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NotePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Uuid>,
}

impl NotePatch {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn category(mut self, category: Uuid) -> Self {
        self.category = Some(category);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none() && self.category.is_none()
    }
}
