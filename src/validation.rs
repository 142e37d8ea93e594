//! Client-side form validation
//!
//! Checks run before a request is sent; failures are field-keyed messages
//! for the form and never reach the store.

use crate::api::{LoginRequest, RegisterRequest};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"));

static SYMBOL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]{1,5}$").expect("valid symbol pattern"));

/// Minimum username length on registration
pub const MIN_USERNAME_LEN: usize = 3;
/// Minimum password length on registration
pub const MIN_PASSWORD_LEN: usize = 6;

/// Field name → message
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(BTreeMap<&'static str, String>);

impl ValidationErrors {
    /// No errors yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message for `field`, keeping the first one
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    /// Message for `field`
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// True when every field passed
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of failing fields
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate over (field, message) in field order
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(k, v)| (*k, v.as_str()))
    }

    fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.iter().map(|(k, v)| format!("{}: {}", k, v)).collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Loose `local@domain.tld` check
pub fn validate_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// One to five letters, case-insensitive
pub fn validate_stock_symbol(symbol: &str) -> bool {
    SYMBOL_RE.is_match(&symbol.to_uppercase())
}

/// Non-blank after trimming
pub fn validate_required(value: &str) -> bool {
    !value.trim().is_empty()
}

/// Login form: both fields required
pub fn validate_login(request: &LoginRequest) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    if !validate_required(&request.username_or_email) {
        errors.add("usernameOrEmail", "Username or email is required");
    }
    if request.password.is_empty() {
        errors.add("password", "Password is required");
    }
    errors.into_result()
}

/// Registration form
pub fn validate_registration(request: &RegisterRequest) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let username = request.username.trim();
    if username.is_empty() {
        errors.add("username", "Username is required");
    } else if username.chars().count() < MIN_USERNAME_LEN {
        errors.add("username", "Username must be at least 3 characters");
    }

    let email = request.email.trim();
    if email.is_empty() {
        errors.add("email", "Email is required");
    } else if !validate_email(email) {
        errors.add("email", "Email is invalid");
    }

    if request.password.is_empty() {
        errors.add("password", "Password is required");
    } else if request.password.chars().count() < MIN_PASSWORD_LEN {
        errors.add("password", "Password must be at least 6 characters");
    }

    if request.confirm_password.is_empty() {
        errors.add("confirmPassword", "Please confirm your password");
    } else if request.confirm_password != request.password {
        errors.add("confirmPassword", "Passwords do not match");
    }

    errors.into_result()
}
