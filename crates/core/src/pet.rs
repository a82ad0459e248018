//! Pet, group and trait field rules.

use crate::validation::FieldErrors;

// ---------------------------------------------------------------------------
// Length limits
// ---------------------------------------------------------------------------

pub const PET_NAME_MAX_LEN: usize = 50;
pub const GROUP_SCIENTIFIC_NAME_MAX_LEN: usize = 50;
pub const TRAIT_NAME_MAX_LEN: usize = 20;

// ---------------------------------------------------------------------------
// Sex choices
// ---------------------------------------------------------------------------

pub const SEX_MALE: &str = "Male";
pub const SEX_FEMALE: &str = "Female";
pub const SEX_NOT_INFORMED: &str = "Not Informed";

/// All accepted values for `pets.sex`.
pub const VALID_SEXES: &[&str] = &[SEX_MALE, SEX_FEMALE, SEX_NOT_INFORMED];

/// Applied on create when the payload omits `sex`.
pub const DEFAULT_SEX: &str = SEX_NOT_INFORMED;

/// Check `sex` against [`VALID_SEXES`], recording a choice error otherwise.
///
/// Returns the value unchanged when valid.
pub fn check_sex(errors: &mut FieldErrors, sex: String) -> Option<String> {
    if VALID_SEXES.contains(&sex.as_str()) {
        Some(sex)
    } else {
        errors.add("sex", format!("\"{sex}\" is not a valid choice."));
        None
    }
}
