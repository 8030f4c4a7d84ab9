use std::sync::LazyLock;

use regex::Regex;

use crate::error::{CoreError, Result};

// FHIR id datatype: 1-64 characters of [A-Za-z0-9\-\.]
static ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9\-\.]{1,64}$").expect("valid id regex"));

pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

pub fn validate_id(id: &str) -> Result<()> {
    if ID_PATTERN.is_match(id) {
        Ok(())
    } else {
        Err(CoreError::invalid_id(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_valid() {
        let id = generate_id();
        assert!(validate_id(&id).is_ok());
        assert_ne!(id, generate_id());
    }

    #[test]
    fn rejects_empty_and_illegal_ids() {
        assert!(validate_id("").is_err());
        assert!(validate_id("has space").is_err());
        assert!(validate_id("slash/inside").is_err());
        assert!(validate_id(&"x".repeat(65)).is_err());
    }

    #[test]
    fn accepts_numeric_and_dotted_ids() {
        assert!(validate_id("8932748723984").is_ok());
        assert!(validate_id("tech1").is_ok());
        assert!(validate_id("a.b-c").is_ok());
    }
}
