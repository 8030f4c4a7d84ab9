//! Reference targets used inside composed resources.
//!
//! A reference either points at a resource embedded in the parent's
//! `contained` list (`#id`) or at a resource held by the remote store
//! (`ResourceType/id`). Absolute URLs are accepted when they start with the
//! store's base URL.
//!
//! # Example
//!
//! ```
//! use labpass_core::fhir_reference::{ReferenceTarget, parse_reference};
//!
//! let target = parse_reference("Patient/123", None).unwrap();
//! assert_eq!(target, ReferenceTarget::resource("Patient", "123"));
//!
//! let target = parse_reference("#1", None).unwrap();
//! assert_eq!(target.to_string(), "#1");
//! ```

use std::fmt;

/// A reference to a resource held by the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FhirReference {
    pub resource_type: String,
    pub id: String,
}

impl FhirReference {
    pub fn new(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            id: id.into(),
        }
    }

    /// Returns the reference as a relative string (Type/id).
    pub fn to_relative(&self) -> String {
        format!("{}/{}", self.resource_type, self.id)
    }
}

impl fmt::Display for FhirReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_relative())
    }
}

/// Where a reference points: into the parent document or out to the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ReferenceTarget {
    /// Local fragment into the parent's `contained` list
    Contained(String),
    /// Server-assigned external path
    Resource(FhirReference),
}

impl ReferenceTarget {
    pub fn contained(id: impl Into<String>) -> Self {
        Self::Contained(id.into())
    }

    pub fn resource(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::Resource(FhirReference::new(resource_type, id))
    }

    pub fn is_contained(&self) -> bool {
        matches!(self, Self::Contained(_))
    }
}

impl fmt::Display for ReferenceTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Contained(id) => write!(f, "#{id}"),
            Self::Resource(r) => write!(f, "{r}"),
        }
    }
}

/// A reference string that could not be classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidReference(pub String);

impl fmt::Display for InvalidReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid reference: {}", self.0)
    }
}

impl std::error::Error for InvalidReference {}

/// Parse a reference string into its target.
///
/// `base_url` is the store's base; absolute URLs under it are treated as
/// relative paths, any other absolute URL is rejected.
pub fn parse_reference(
    reference: &str,
    base_url: Option<&str>,
) -> Result<ReferenceTarget, InvalidReference> {
    let reference = reference.trim();
    if reference.is_empty() {
        return Err(InvalidReference("empty reference".to_string()));
    }

    if let Some(contained_id) = reference.strip_prefix('#') {
        if contained_id.is_empty() {
            return Err(InvalidReference("empty fragment".to_string()));
        }
        return Ok(ReferenceTarget::contained(contained_id));
    }

    let path = if reference.contains("://") {
        let base = base_url
            .map(|b| b.trim_end_matches('/'))
            .ok_or_else(|| InvalidReference(format!("absolute URL without base: {reference}")))?;
        reference
            .strip_prefix(base)
            .filter(|suffix| suffix.is_empty() || suffix.starts_with('/'))
            .map(|suffix| suffix.trim_start_matches('/'))
            .ok_or_else(|| InvalidReference(format!("URL outside {base}: {reference}")))?
    } else {
        reference
    };

    let mut parts = path.split('/');
    let (Some(resource_type), Some(id)) = (parts.next(), parts.next()) else {
        return Err(InvalidReference(format!(
            "reference must contain Type/id: {reference}"
        )));
    };

    if !resource_type
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_uppercase())
    {
        return Err(InvalidReference(format!(
            "resource type must start with uppercase letter: {resource_type}"
        )));
    }

    if id.is_empty() {
        return Err(InvalidReference("resource id cannot be empty".to_string()));
    }

    Ok(ReferenceTarget::resource(resource_type, id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_reference() {
        let r = parse_reference("Observation/42", None).unwrap();
        assert_eq!(r, ReferenceTarget::resource("Observation", "42"));
        assert!(!r.is_contained());
    }

    #[test]
    fn test_versioned_reference_keeps_type_and_id() {
        let r = parse_reference("Patient/123/_history/2", None).unwrap();
        assert_eq!(r, ReferenceTarget::resource("Patient", "123"));
    }

    #[test]
    fn test_contained_reference() {
        let r = parse_reference("#8932748723984", None).unwrap();
        assert_eq!(r, ReferenceTarget::contained("8932748723984"));
        assert!(r.is_contained());
        assert!(parse_reference("#", None).is_err());
    }

    #[test]
    fn test_absolute_url_under_base() {
        let r = parse_reference(
            "https://r2.smarthealthit.org/Patient/565010",
            Some("https://r2.smarthealthit.org/"),
        )
        .unwrap();
        assert_eq!(r, ReferenceTarget::resource("Patient", "565010"));
    }

    #[test]
    fn test_absolute_url_elsewhere_is_invalid() {
        assert!(parse_reference("http://other.org/Patient/1", Some("http://here.org")).is_err());
        assert!(parse_reference("http://other.org/Patient/1", None).is_err());
    }

    #[test]
    fn test_base_must_end_at_path_boundary() {
        let base = Some("https://r2.smarthealthit.org");
        assert!(parse_reference("https://r2.smarthealthit.orgPatient/1", base).is_err());
        assert!(parse_reference("https://r2.smarthealthit.org.evil/Patient/1", base).is_err());
        assert_eq!(
            parse_reference("https://r2.smarthealthit.org/Patient/1", base).unwrap(),
            ReferenceTarget::resource("Patient", "1")
        );
    }

    #[test]
    fn test_invalid_shapes() {
        assert!(parse_reference("", None).is_err());
        assert!(parse_reference("  ", None).is_err());
        assert!(parse_reference("patient/1", None).is_err());
        assert!(parse_reference("Patient/", None).is_err());
        assert!(parse_reference("Patient", None).is_err());
    }

    #[test]
    fn test_display_round_trips() {
        for raw in ["#1", "Patient/abc"] {
            assert_eq!(parse_reference(raw, None).unwrap().to_string(), raw);
        }
    }
}
