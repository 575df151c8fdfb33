use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::api::{CategoryRecord, NoteRecord};

/// Fallback swatch for notes whose category cannot be resolved client-side.
/// Matches the server's default category color.
pub const DEFAULT_CATEGORY_COLOR: &str = "#A3A3A3";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub color: String,
    pub note_count: Option<u64>,
}

impl From<CategoryRecord> for Category {
    fn from(rec: CategoryRecord) -> Self {
        Self {
            id: rec.id,
            name: rec.name,
            color: rec.color,
            note_count: rec.note_count,
        }
    }
}

/// Client-side note shape. `category_name`, `category_color` and
/// `last_edited_label` are for display only and never sent back to the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub category_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub category_name: Option<String>,
    pub category_color: Option<String>,
    pub last_edited_label: Option<String>,
}

impl From<NoteRecord> for Note {
    fn from(rec: NoteRecord) -> Self {
        // Older backends omit the label; derive it from updated_at so the UI
        // always has something to show.
        let label = rec
            .last_edited_label
            .or_else(|| Some(relative_day_label(rec.updated_at, Utc::now())));
        Self {
            id: rec.id,
            title: rec.title.unwrap_or_default(),
            content: rec.content.unwrap_or_default(),
            category_id: rec.category,
            created_at: rec.created_at,
            updated_at: rec.updated_at,
            category_name: rec.category_name,
            category_color: rec.category_color,
            last_edited_label: label,
        }
    }
}

impl Note {
    /// Color to render the category badge with.
    pub fn display_color(&self) -> &str {
        self.category_color
            .as_deref()
            .unwrap_or(DEFAULT_CATEGORY_COLOR)
    }
}

/// The three fixed sidebar categories used for routing, distinct from the
/// server-assigned category ids they resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CategoryAlias {
    Random,
    School,
    Personal,
}

impl CategoryAlias {
    pub const ALL: [CategoryAlias; 3] = [Self::Random, Self::School, Self::Personal];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Random => "random",
            Self::School => "school",
            Self::Personal => "personal",
        }
    }

    /// Case-insensitive parse of the fixed alias strings. Anything else is
    /// not an alias.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "random" => Some(Self::Random),
            "school" => Some(Self::School),
            "personal" => Some(Self::Personal),
            _ => None,
        }
    }

    /// True when `name` is this alias's server-side category name,
    /// case-insensitively. "random" also answers to the seeded name
    /// "Random Thoughts".
    pub fn matches_name(self, name: &str) -> bool {
        let name = name.to_lowercase();
        match self {
            Self::Random => name == "random" || name == "random thoughts",
            Self::School => name == "school",
            Self::Personal => name == "personal",
        }
    }
}

impl fmt::Display for CategoryAlias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// "Today", "Yesterday", or "Mon D" — the same labels the server derives for
/// `last_edited_label`.
pub fn relative_day_label(updated_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let updated = updated_at.date_naive();
    let today = now.date_naive();

    if updated == today {
        return "Today".into();
    }
    if today.pred_opt() == Some(updated) {
        return "Yesterday".into();
    }
    format!("{} {}", MONTHS[updated.month0() as usize], updated.day())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn relative_label_today_yesterday_and_older() {
        let now = at(2026, 8, 30);
        assert_eq!(relative_day_label(at(2026, 8, 30), now), "Today");
        assert_eq!(relative_day_label(at(2026, 8, 29), now), "Yesterday");
        assert_eq!(relative_day_label(at(2026, 8, 1), now), "Aug 1");
        assert_eq!(relative_day_label(at(2025, 12, 25), now), "Dec 25");
    }

    #[test]
    fn alias_parse_is_case_insensitive() {
        assert_eq!(CategoryAlias::parse("Random"), Some(CategoryAlias::Random));
        assert_eq!(CategoryAlias::parse("SCHOOL"), Some(CategoryAlias::School));
        assert_eq!(
            CategoryAlias::parse("personal"),
            Some(CategoryAlias::Personal)
        );
        assert_eq!(CategoryAlias::parse("work"), None);
    }

    #[test]
    fn random_alias_matches_both_server_names() {
        assert!(CategoryAlias::Random.matches_name("Random Thoughts"));
        assert!(CategoryAlias::Random.matches_name("random"));
        assert!(CategoryAlias::Random.matches_name("RANDOM THOUGHTS"));
        assert!(!CategoryAlias::Random.matches_name("School"));
    }

    #[test]
    fn note_from_record_defaults_missing_fields() {
        let record = NoteRecord {
            id: Uuid::new_v4(),
            title: None,
            content: None,
            category: None,
            category_name: None,
            category_color: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            last_edited: None,
            last_edited_label: None,
        };
        let note = Note::from(record);
        assert_eq!(note.title, "");
        assert_eq!(note.content, "");
        assert_eq!(note.display_color(), DEFAULT_CATEGORY_COLOR);
        // Label is derived from updated_at when the server omits it
        assert_eq!(note.last_edited_label.as_deref(), Some("Today"));
    }

    #[test]
    fn note_keeps_server_provided_label() {
        let record = NoteRecord {
            id: Uuid::new_v4(),
            title: Some("t".into()),
            content: Some("c".into()),
            category: Some(Uuid::new_v4()),
            category_name: Some("School".into()),
            category_color: Some("#BFDBFE".into()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            last_edited: None,
            last_edited_label: Some("Yesterday".into()),
        };
        let note = Note::from(record);
        assert_eq!(note.last_edited_label.as_deref(), Some("Yesterday"));
        assert_eq!(note.display_color(), "#BFDBFE");
    }
}
