// Validation pipe for JSON payloads

use crate::{ErrorReport, Validate, ValidateError, Validator};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Validates raw JSON bodies
pub struct ValidationPipe;

impl ValidationPipe {
    /// Deserialize a JSON body and validate it with its declared rules
    pub fn parse<T>(body: &[u8]) -> Result<T, ValidateError>
    where
        T: DeserializeOwned + Validate,
    {
        let parsed: T = serde_json::from_slice(body)?;
        parsed.validate()?;
        Ok(parsed)
    }

    /// Validate an arbitrary JSON document with a configured validator.
    ///
    /// The document replaces the validator's record and is returned on success.
    pub fn validate_json(body: &[u8], validator: &mut Validator) -> Result<Value, ValidateError> {
        let document: Value = serde_json::from_slice(body)?;
        validator.set_data(document).validate()?;
        Ok(validator.data().clone())
    }

    /// JSON error body for a failed validation
    pub fn error_body(errors: &ErrorReport) -> Vec<u8> {
        errors.to_json().to_string().into_bytes()
    }
}

/// Build an ordered list of `key => value` string pairs for rules or messages
#[macro_export]
macro_rules! rules {
    ($($key:expr => $value:expr),* $(,)?) => {{
        let pairs: ::std::vec::Vec<(::std::string::String, ::std::string::String)> =
            ::std::vec![$((::std::string::String::from($key), ::std::string::String::from($value))),*];
        pairs
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Deserialize, Serialize)]
    struct SignupDto {
        name: String,
        age: i32,
        email: Option<String>,
    }

    impl Validate for SignupDto {
        fn rules() -> Vec<(&'static str, &'static str)> {
            vec![
                ("name", "required|min:2"),
                ("age", "required|between:18,99"),
                ("email", "email"),
            ]
        }

        fn messages() -> Vec<(&'static str, &'static str)> {
            vec![("age.between", "Age must be between 18 and 99")]
        }
    }

    #[test]
    fn test_parse_valid_body() {
        let body = br#"{"name": "John", "age": 30, "email": null}"#;
        let dto: SignupDto = ValidationPipe::parse(body).unwrap();
        assert_eq!(dto.name, "John");
    }

    #[test]
    fn test_parse_invalid_body() {
        let body = br#"{"name": "John", "age": 12, "email": "nope"}"#;
        let error = ValidationPipe::parse::<SignupDto>(body).unwrap_err();
        let report = error.report().unwrap();

        assert_eq!(report.first("age"), Some("Age must be between 18 and 99"));
        assert_eq!(report.first("email"), Some("email is not email"));
    }

    #[test]
    fn test_parse_malformed_json() {
        let error = ValidationPipe::parse::<SignupDto>(b"{").unwrap_err();
        assert!(matches!(error, ValidateError::Json(_)));
    }

    #[test]
    fn test_validate_json_document() {
        let mut validator = Validator::make(
            Value::Null,
            rules! { "id" => "required|int" },
            rules! {},
        )
        .unwrap();

        let document = ValidationPipe::validate_json(br#"{"id": "42"}"#, &mut validator).unwrap();
        assert_eq!(document["id"], "42");

        let error = ValidationPipe::validate_json(br#"{"id": "x"}"#, &mut validator).unwrap_err();
        let body = ValidationPipe::error_body(error.report().unwrap());
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["errors"]["id"][0], "id is not int");
    }

    #[test]
    fn test_rules_macro() {
        let rules = rules! {
            "age" => "required",
            "email" => "email|required",
        };
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[1], ("email".to_string(), "email|required".to_string()));
    }
}
