use crate::error::{CoreError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

/// FHIR `dateTime`/`instant`, always rendered as RFC 3339.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FhirDateTime(pub OffsetDateTime);

impl FhirDateTime {
    pub fn new(datetime: OffsetDateTime) -> Self {
        Self(datetime)
    }
}

impl fmt::Display for FhirDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let formatted = self.0.format(&Rfc3339).map_err(|_| fmt::Error)?;
        write!(f, "{formatted}")
    }
}

impl FromStr for FhirDateTime {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        let datetime = OffsetDateTime::parse(s, &Rfc3339).map_err(|e| {
            CoreError::invalid_date_time(format!("Failed to parse FHIR DateTime '{s}': {e}"))
        })?;
        Ok(FhirDateTime(datetime))
    }
}

impl Serialize for FhirDateTime {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let formatted = self.0.format(&Rfc3339).map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&formatted)
    }
}

impl<'de> Deserialize<'de> for FhirDateTime {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        FhirDateTime::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// FHIR `date` with day precision (`YYYY-MM-DD`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FhirDate(pub Date);

impl FhirDate {
    pub fn new(date: Date) -> Self {
        Self(date)
    }
}

impl fmt::Display for FhirDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let formatted = self
            .0
            .format(format_description!("[year]-[month]-[day]"))
            .map_err(|_| fmt::Error)?;
        write!(f, "{formatted}")
    }
}

impl FromStr for FhirDate {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        let date = Date::parse(s, format_description!("[year]-[month]-[day]")).map_err(|e| {
            CoreError::invalid_date_time(format!("Failed to parse FHIR date '{s}': {e}"))
        })?;
        Ok(FhirDate(date))
    }
}

impl Serialize for FhirDate {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FhirDate {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        FhirDate::from_str(&s).map_err(serde::de::Error::custom)
    }
}

pub fn now_utc() -> FhirDateTime {
    FhirDateTime(OffsetDateTime::now_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime};

    #[test]
    fn test_fhir_datetime_display() {
        let fhir_dt = FhirDateTime::new(datetime!(2023-05-15 14:30:00 UTC));
        assert_eq!(fhir_dt.to_string(), "2023-05-15T14:30:00Z");
    }

    #[test]
    fn test_fhir_datetime_from_str_with_offset() {
        let fhir_dt = FhirDateTime::from_str("2023-05-15T14:30:00+02:00").unwrap();
        assert_eq!(
            fhir_dt.0.to_offset(time::UtcOffset::UTC),
            datetime!(2023-05-15 12:30:00 UTC)
        );
    }

    #[test]
    fn test_fhir_datetime_from_str_invalid() {
        assert!(FhirDateTime::from_str("invalid-date").is_err());
        assert!(FhirDateTime::from_str("2023-13-01T00:00:00Z").is_err());
        assert!(FhirDateTime::from_str("").is_err());
    }

    #[test]
    fn test_fhir_datetime_serialization() {
        let fhir_dt = FhirDateTime::new(datetime!(2023-05-15 14:30:00 UTC));
        let json = serde_json::to_string(&fhir_dt).unwrap();
        assert_eq!(json, "\"2023-05-15T14:30:00Z\"");

        let back: FhirDateTime = serde_json::from_str(&json).unwrap();
        assert_eq!(back, fhir_dt);
    }

    #[test]
    fn test_fhir_date_display_and_parse() {
        let d = FhirDate::from_str("2030-01-01").unwrap();
        assert_eq!(d.0, date!(2030 - 01 - 01));
        assert_eq!(d.to_string(), "2030-01-01");
    }

    #[test]
    fn test_fhir_date_serialization() {
        let d = FhirDate::new(date!(2024 - 12 - 04));
        assert_eq!(serde_json::to_string(&d).unwrap(), "\"2024-12-04\"");
        assert!(serde_json::from_str::<FhirDate>("\"2024-12-32\"").is_err());
    }

    #[test]
    fn test_error_message_content() {
        match FhirDate::from_str("bad-date") {
            Err(CoreError::InvalidDateTime(msg)) => {
                assert!(msg.contains("bad-date"));
            }
            _ => panic!("Expected InvalidDateTime error"),
        }
    }

    #[test]
    fn test_now_utc_is_monotonic_enough() {
        let a = now_utc();
        let b = now_utc();
        assert!((b.0 - a.0).whole_seconds() < 1);
    }
}
