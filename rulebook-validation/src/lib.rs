//! Rule-string driven validation for Rulebook
//!
//! Validates a record (a JSON object) against per-field rule chains written
//! as compact specification strings, with custom messages and pluggable rules.
//!
//! # Examples
//!
//! ## Basic Validation
//!
//! ```
//! use rulebook_validation::Validator;
//! use serde_json::json;
//!
//! let mut validator = Validator::make(
//!     json!({"age": 20, "email": "john@example.com"}),
//!     [("age", "required|between:18,99"), ("email", "email|required")],
//!     [("age.between", "You must be an adult")],
//! )
//! .unwrap();
//!
//! assert!(validator.passes().unwrap());
//! ```
//!
//! ## Custom Rules
//!
//! ```
//! use rulebook_validation::Validator;
//! use serde_json::json;
//!
//! let mut validator = Validator::new();
//! validator.add_extension("bigger", |params, value, _ctx| {
//!     let bound: i64 = params[0].parse().unwrap_or(i64::MAX);
//!     value.as_i64().is_some_and(|v| v > bound)
//! });
//! validator
//!     .set_data(json!({"age": 20}))
//!     .set_rules([("age", "required|bigger:18")])
//!     .unwrap();
//!
//! assert!(validator.passes().unwrap());
//! ```
//!
//! ## Error Reports
//!
//! ```
//! use rulebook_validation::Validator;
//! use serde_json::json;
//!
//! let mut validator = Validator::make(
//!     json!({"age": 20}),
//!     [("age", "max:18")],
//!     Vec::<(&str, &str)>::new(),
//! )
//! .unwrap();
//!
//! assert!(validator.fails().unwrap());
//! assert_eq!(validator.errors().first("age"), Some("age is not max"));
//! ```
//!
//! Unknown rules are configuration bugs, not validation failures:
//!
//! ```
//! use rulebook_validation::{RuleError, Validator};
//! use serde_json::json;
//!
//! let mut validator = Validator::make(
//!     json!({"age": "192.159.2.2"}),
//!     [("age", "ipv6")],
//!     Vec::<(&str, &str)>::new(),
//! )
//! .unwrap();
//!
//! assert!(matches!(validator.passes(), Err(RuleError::RuleNotFound(_))));
//! ```

mod config;
mod errors;
mod messages;
mod pipe;
mod registry;
mod rules;
mod traits;
mod validator;
pub mod validators;
pub mod values;

pub use config::*;
pub use errors::*;
pub use messages::*;
pub use pipe::*;
pub use registry::*;
pub use rules::*;
pub use traits::*;
pub use validator::*;
