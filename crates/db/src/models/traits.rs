//! Trait entity model, pet-trait link rows and DTOs.

use petkare_core::types::{DbId, Timestamp};
use petkare_core::validation::{present, take_text, FieldErrors};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use validator::Validate;

/// A row from the `traits` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Trait {
    pub id: DbId,
    pub name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A trait joined through `pet_traits`, tagged with the owning pet.
#[derive(Debug, Clone, FromRow)]
pub struct TraitLink {
    pub pet_id: DbId,
    #[sqlx(flatten)]
    pub trait_row: Trait,
}

/// Raw trait object as it appears inside a pet payload's `traits` list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TraitPayload {
    #[serde(default, deserialize_with = "present")]
    pub name: Option<Option<Value>>,
}

/// A validated trait reference, resolved through get-or-create.
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct NewTrait {
    #[validate(length(max = 20, message = "Ensure this field has no more than 20 characters."))]
    pub name: String,
}

impl NewTrait {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl TraitPayload {
    /// Check presence and length of `name`.
    pub fn into_new(self) -> Result<NewTrait, FieldErrors> {
        let mut errors = FieldErrors::new();
        let Some(name) = take_text(&mut errors, "name", self.name, true) else {
            return Err(errors);
        };

        let item = NewTrait { name };
        if let Err(e) = item.validate() {
            errors.merge(e.into());
        }
        errors.into_result(item)
    }
}
