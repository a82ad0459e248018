//! Pet entity model and DTOs.
//!
//! Request bodies arrive as [`PetPayload`] and are resolved into either a
//! [`CreatePet`] (every required field present) or an [`UpdatePet`] (only
//! the fields the client sent) before reaching the repository.

use petkare_core::pet::{check_sex, DEFAULT_SEX};
use petkare_core::types::{DbId, Timestamp};
use petkare_core::validation::{
    choice_text, present, take, take_integer, take_list, take_number, take_object, take_text,
    FieldErrors,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use validator::Validate;

use crate::models::group::{Group, GroupPayload, NewGroup};
use crate::models::traits::{NewTrait, Trait, TraitPayload};

// ---------------------------------------------------------------------------
// Entity structs (database rows)
// ---------------------------------------------------------------------------

/// A row from the `pets` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Pet {
    pub id: DbId,
    pub name: String,
    pub age: i32,
    pub weight: f64,
    pub sex: String,
    #[serde(skip_serializing)]
    pub group_id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A pet with its group and traits resolved, as returned by the API.
#[derive(Debug, Clone, Serialize)]
pub struct PetDetail {
    #[serde(flatten)]
    pub pet: Pet,
    pub group: Group,
    pub traits: Vec<Trait>,
    pub traits_count: usize,
}

impl PetDetail {
    pub fn new(pet: Pet, group: Group, traits: Vec<Trait>) -> Self {
        let traits_count = traits.len();
        Self {
            pet,
            group,
            traits,
            traits_count,
        }
    }
}

// ---------------------------------------------------------------------------
// DTOs (request payloads)
// ---------------------------------------------------------------------------

/// Raw pet request body. Every key is tri-state (missing / null / value)
/// and untyped, so a wrong-typed value is reported against its own field
/// alongside every other field error.
///
/// Unknown keys, including `id`, are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PetPayload {
    #[serde(default, deserialize_with = "present")]
    pub name: Option<Option<Value>>,
    #[serde(default, deserialize_with = "present")]
    pub age: Option<Option<Value>>,
    #[serde(default, deserialize_with = "present")]
    pub weight: Option<Option<Value>>,
    #[serde(default, deserialize_with = "present")]
    pub sex: Option<Option<Value>>,
    #[serde(default, deserialize_with = "present")]
    pub group: Option<Option<Value>>,
    #[serde(default, deserialize_with = "present")]
    pub traits: Option<Option<Value>>,
}

/// DTO for creating a new pet.
#[derive(Debug, Clone, PartialEq)]
pub struct CreatePet {
    pub name: String,
    pub age: i32,
    pub weight: f64,
    pub sex: String,
    pub group: NewGroup,
    pub traits: Vec<NewTrait>,
}

/// DTO for a partial pet update. `None` fields are left untouched.
///
/// `traits: Some(vec![])` clears every trait from the pet.
#[derive(Debug, Clone, Default, PartialEq, Validate)]
pub struct UpdatePet {
    #[validate(length(max = 50, message = "Ensure this field has no more than 50 characters."))]
    pub name: Option<String>,
    #[validate(range(min = 0, message = "Ensure this value is greater than or equal to 0."))]
    pub age: Option<i32>,
    #[validate(range(min = 0.0, message = "Ensure this value is greater than or equal to 0."))]
    pub weight: Option<f64>,
    pub sex: Option<String>,
    pub group: Option<NewGroup>,
    pub traits: Option<Vec<NewTrait>>,
}

impl PetPayload {
    /// Validate as a full create: `name`, `age`, `weight`, `group` and
    /// `traits` are required; `sex` defaults to "Not Informed".
    pub fn into_create(self) -> Result<CreatePet, FieldErrors> {
        match self.resolve(true)? {
            UpdatePet {
                name: Some(name),
                age: Some(age),
                weight: Some(weight),
                sex,
                group: Some(group),
                traits: Some(traits),
            } => Ok(CreatePet {
                name,
                age,
                weight,
                sex: sex.unwrap_or_else(|| DEFAULT_SEX.to_string()),
                group,
                traits,
            }),
            // resolve(true) reports every missing required field.
            _ => {
                let mut errors = FieldErrors::new();
                errors.add("non_field_errors", "Incomplete pet payload.");
                Err(errors)
            }
        }
    }

    /// Validate as a partial update: only fields present in the body are
    /// checked, but none of them may be null.
    pub fn into_update(self) -> Result<UpdatePet, FieldErrors> {
        self.resolve(false)
    }

    fn resolve(self, required: bool) -> Result<UpdatePet, FieldErrors> {
        let mut errors = FieldErrors::new();

        let name = take_text(&mut errors, "name", self.name, required);
        let age = take_integer(&mut errors, "age", self.age, required);
        let weight = take_number(&mut errors, "weight", self.weight, required);
        let sex = take(&mut errors, "sex", self.sex, false)
            .map(choice_text)
            .and_then(|s| check_sex(&mut errors, s));

        let group = take(&mut errors, "group", self.group, required)
            .and_then(|value| take_object::<GroupPayload>(&mut errors, "group", value))
            .and_then(|payload| match payload.into_new() {
                Ok(group) => Some(group),
                Err(nested) => {
                    errors.extend_nested("group", nested);
                    None
                }
            });

        let traits = take(&mut errors, "traits", self.traits, required)
            .and_then(|value| take_list(&mut errors, "traits", value))
            .and_then(|items| resolve_traits(&mut errors, items));

        let fields = UpdatePet {
            name,
            age,
            weight,
            sex,
            group,
            traits,
        };
        if let Err(e) = fields.validate() {
            errors.merge(e.into());
        }
        errors.into_result(fields)
    }
}

/// Validate every trait entry, keying errors as `traits[i].name`.
///
/// Returns `None` if any entry is invalid.
fn resolve_traits(errors: &mut FieldErrors, items: Vec<Value>) -> Option<Vec<NewTrait>> {
    let mut resolved = Vec::with_capacity(items.len());
    let mut ok = true;
    for (index, item) in items.into_iter().enumerate() {
        let path = format!("traits[{index}]");
        let Some(payload) = take_object::<TraitPayload>(errors, &path, item) else {
            ok = false;
            continue;
        };
        match payload.into_new() {
            Ok(t) => resolved.push(t),
            Err(nested) => {
                errors.extend_nested(&path, nested);
                ok = false;
            }
        }
    }
    ok.then_some(resolved)
}
