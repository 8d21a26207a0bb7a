use axum::http::StatusCode;
use regex::Regex;
use std::sync::OnceLock;

/// Maximum allowed length for department and modality keys
const MAX_KEY_LENGTH: usize = 64;

fn key_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("key pattern is valid"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    KeyEmpty(&'static str),
    KeyTooLong(&'static str, usize),
    KeyInvalid(&'static str, String),
    PriorityNotNumeric(String),
    InvalidNotificationId(String),
}

impl ValidationError {
    pub fn to_status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }

    pub fn to_message(&self) -> String {
        match self {
            ValidationError::KeyEmpty(kind) => format!("{} cannot be empty", kind),
            ValidationError::KeyTooLong(kind, len) => {
                format!("{} too long: {} characters (max {})", kind, len, MAX_KEY_LENGTH)
            }
            ValidationError::KeyInvalid(kind, value) => {
                format!("{} contains invalid characters: '{}'", kind, value)
            }
            ValidationError::PriorityNotNumeric(value) => {
                format!("Priority must be a number, got '{}'", value)
            }
            ValidationError::InvalidNotificationId(id) => {
                format!("Invalid notification id: '{}'", id)
            }
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_message())
    }
}

impl std::error::Error for ValidationError {}

pub type ValidationResult<T> = Result<T, ValidationError>;

pub struct Validator;

impl Validator {
    /// Validate a department or modality key taken from the request path
    pub fn validate_key(kind: &'static str, value: &str) -> ValidationResult<()> {
        if value.is_empty() {
            return Err(ValidationError::KeyEmpty(kind));
        }

        if value.len() > MAX_KEY_LENGTH {
            return Err(ValidationError::KeyTooLong(kind, value.len()));
        }

        if !key_pattern().is_match(value) {
            return Err(ValidationError::KeyInvalid(kind, value.to_string()));
        }

        Ok(())
    }

    pub fn validate_department(department: &str) -> ValidationResult<()> {
        Self::validate_key("Department", department)
    }

    pub fn validate_modality(modality: &str) -> ValidationResult<()> {
        Self::validate_key("Modality", modality)
    }

    /// Parse the priority segment; range checking is left to the ledger
    pub fn parse_priority(raw: &str) -> ValidationResult<i64> {
        raw.trim()
            .parse::<i64>()
            .map_err(|_| ValidationError::PriorityNotNumeric(raw.to_string()))
    }

    pub fn validate_notification_id(id: &str) -> ValidationResult<()> {
        uuid::Uuid::parse_str(id)
            .map_err(|_| ValidationError::InvalidNotificationId(id.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_validation() {
        assert!(Validator::validate_department("aod").is_ok());
        assert!(Validator::validate_modality("CT_1-north").is_ok());

        assert_eq!(
            Validator::validate_department(""),
            Err(ValidationError::KeyEmpty("Department"))
        );
        assert!(matches!(
            Validator::validate_modality(&"m".repeat(65)),
            Err(ValidationError::KeyTooLong("Modality", 65))
        ));
        assert!(Validator::validate_department("bad.key").is_err());
        assert!(Validator::validate_department("a b").is_err());
        assert!(Validator::validate_department("../etc").is_err());
    }

    #[test]
    fn test_priority_parsing() {
        assert_eq!(Validator::parse_priority("1"), Ok(1));
        assert_eq!(Validator::parse_priority("99"), Ok(99));
        assert!(Validator::parse_priority("high").is_err());
        assert!(Validator::parse_priority("").is_err());
    }

    #[test]
    fn test_notification_id_validation() {
        assert!(Validator::validate_notification_id("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(Validator::validate_notification_id("xxx").is_err());
    }

    #[test]
    fn test_messages() {
        let err = ValidationError::KeyInvalid("Department", "a.b".to_string());
        assert_eq!(err.to_message(), "Department contains invalid characters: 'a.b'");
        assert_eq!(err.to_status_code(), StatusCode::BAD_REQUEST);
    }
}
