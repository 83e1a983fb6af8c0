/// Result of an allocation: which identity row the caller now owns.
///
/// - `is_existing == true`: the row pre-existed. Its URN value must never be
///   mutated.
/// - `is_existing == false`: the row was inserted by this call. The caller
///   must either write the final URN back or remove the row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IdentityHandle {
    pub id: i64,
    pub urn: Option<String>,
    pub is_existing: bool,
}

impl IdentityHandle {
    pub fn fresh(id: i64) -> Self {
        Self {
            id,
            urn: None,
            is_existing: false,
        }
    }

    pub fn existing(id: i64, urn: Option<String>) -> Self {
        Self {
            id,
            urn,
            is_existing: true,
        }
    }
}

/// A persisted row of the identity table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IdentityRecord {
    pub id: i64,
    pub work_id: String,
    pub structure_type: String,
    pub urn: Option<String>,
}
