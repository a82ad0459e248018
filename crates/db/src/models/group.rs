//! Group entity model and DTOs.

use petkare_core::types::{DbId, Timestamp};
use petkare_core::validation::{present, take_text, FieldErrors};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use validator::Validate;

/// A row from the `groups` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Group {
    pub id: DbId,
    pub scientific_name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Raw `group` object as it appears inside a pet payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GroupPayload {
    #[serde(default, deserialize_with = "present")]
    pub scientific_name: Option<Option<Value>>,
}

/// A validated group reference, resolved through get-or-create.
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct NewGroup {
    #[validate(length(max = 50, message = "Ensure this field has no more than 50 characters."))]
    pub scientific_name: String,
}

impl NewGroup {
    pub fn new(scientific_name: impl Into<String>) -> Self {
        Self {
            scientific_name: scientific_name.into(),
        }
    }
}

impl GroupPayload {
    /// Check presence and length of `scientific_name`.
    ///
    /// Error paths are relative to the group object (`scientific_name`).
    pub fn into_new(self) -> Result<NewGroup, FieldErrors> {
        let mut errors = FieldErrors::new();
        let Some(scientific_name) =
            take_text(&mut errors, "scientific_name", self.scientific_name, true)
        else {
            return Err(errors);
        };

        let group = NewGroup { scientific_name };
        if let Err(e) = group.validate() {
            errors.merge(e.into());
        }
        errors.into_result(group)
    }
}
