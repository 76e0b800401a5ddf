//! Login and signup form validation.
//!
//! These are the field rules the forms enforce before anything is sent.
//! The session store never validates; only the flows call into this module.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

/// A single failing field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldError {
    /// Form field name, as sent on the wire.
    pub field: &'static str,
    /// Human-readable reason.
    pub message: &'static str,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Every failing field of one form submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub errors: Vec<FieldError>,
}

impl ValidationError {
    /// Message for `field`, if it failed.
    pub fn message_for(&self, field: &str) -> Option<&'static str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.errors.iter().map(|e| e.message).collect();
        write!(f, "{}", messages.join("; "))
    }
}

impl std::error::Error for ValidationError {}

/// Collects field errors while a form is checked.
#[derive(Debug, Default)]
struct Checker {
    errors: Vec<FieldError>,
}

impl Checker {
    fn fail(&mut self, field: &'static str, message: &'static str) {
        self.errors.push(FieldError { field, message });
    }

    /// Required, then at least `min` characters.
    fn min_len(
        &mut self,
        field: &'static str,
        value: &str,
        min: usize,
        required: &'static str,
        too_short: &'static str,
    ) {
        if value.is_empty() {
            self.fail(field, required);
        } else if value.chars().count() < min {
            self.fail(field, too_short);
        }
    }

    fn email(&mut self, value: &str) {
        if value.is_empty() {
            self.fail("email", "Email is required");
        } else if !is_valid_email(value) {
            self.fail("email", "Invalid email format");
        }
    }

    fn finish(self) -> Result<(), ValidationError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError {
                errors: self.errors,
            })
        }
    }
}

/// `local@domain.tld` with a letters-only TLD of two or more characters.
pub fn is_valid_email(value: &str) -> bool {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL
        .get_or_init(|| compile(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$"))
        .is_match(value)
}

/// Exactly ten digits.
fn is_phone(value: &str) -> bool {
    static PHONE: OnceLock<Regex> = OnceLock::new();
    PHONE.get_or_init(|| compile(r"^[0-9]{10}$")).is_match(value)
}

/// Exactly six digits.
fn is_type_code(value: &str) -> bool {
    static TYPE_CODE: OnceLock<Regex> = OnceLock::new();
    TYPE_CODE.get_or_init(|| compile(r"^[0-9]{6}$")).is_match(value)
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("field pattern is valid")
}

/// Login form input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut check = Checker::default();
        check.email(&self.email);
        check.min_len(
            "password",
            &self.password,
            6,
            "Password is required",
            "Password must be at least 6 characters long",
        );
        check.finish()
    }
}

/// Signup form input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignupForm {
    pub name: String,
    pub company: String,
    pub email: String,
    pub phone: String,
    /// Six-digit account type code.
    pub type_code: String,
    pub password: String,
    pub confirm_password: String,
}

impl SignupForm {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut check = Checker::default();

        check.min_len(
            "name",
            &self.name,
            2,
            "Full name is required",
            "Name must be at least 2 characters",
        );
        check.min_len(
            "compname",
            &self.company,
            2,
            "Company name is required",
            "Company name must be at least 2 characters",
        );
        check.email(&self.email);

        if self.phone.is_empty() {
            check.fail("phone", "Phone number is required");
        } else if !is_phone(&self.phone) {
            check.fail("phone", "Phone number must be 10 digits");
        }

        if self.type_code.is_empty() {
            check.fail("type", "Type code is required");
        } else if !is_type_code(&self.type_code) {
            check.fail("type", "Type code must be exactly 6 digits");
        }

        check.min_len(
            "password",
            &self.password,
            8,
            "Password is required",
            "Password must be at least 8 characters",
        );

        if self.confirm_password.is_empty() {
            check.fail("confirmPassword", "Please confirm your password");
        } else if self.confirm_password != self.password {
            check.fail("confirmPassword", "Passwords do not match");
        }

        check.finish()
    }
}
