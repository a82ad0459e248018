//! Query parameter types for API handlers.

use petkare_core::pagination::PAGE_PARAM;

/// Query parameters for `GET /api/pets` (`?page=&trait=`).
///
/// `page` is kept as raw text so that `last` and malformed values can be
/// resolved by the pagination rules rather than rejected by the extractor.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct PetListParams {
    pub page: Option<String>,
    /// Exact trait name to filter by.
    pub trait_name: Option<String>,
}

impl PetListParams {
    /// Pick the known keys out of decoded query pairs. A repeated key takes
    /// its last value; unknown keys are ignored.
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        let last = |name: &str| {
            pairs
                .iter()
                .rev()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.clone())
        };
        Self {
            page: last(PAGE_PARAM),
            trait_name: last("trait"),
        }
    }
}
