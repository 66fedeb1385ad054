//! Field rules for user input. All violations are collected; checks within a
//! single field stop at the first failure.

use lazy_static::lazy_static;
use regex::Regex;

use crate::auth::repo::{StoreResult, UserStore};

pub const FULL_NAME_REQUIRED: &str = "O campo 'FullName' é obrigatório.";
pub const FULL_NAME_FORMAT: &str =
    "O campo 'FullName' deve conter apenas letras e espaços, sem números.";
pub const FULL_NAME_TOO_LONG: &str = "O campo 'FullName' deve ter no máximo 100 caracteres.";
pub const EMAIL_REQUIRED: &str = "O campo 'Email' é obrigatório.";
pub const EMAIL_FORMAT: &str = "O campo 'Email' não é válido.";
pub const EMAIL_TOO_LONG: &str = "O campo 'Email' deve ter no máximo 255 caracteres.";
pub const EMAIL_TAKEN: &str = "E-mail já cadastrado.";
pub const PASSWORD_REQUIRED: &str = "O campo 'Password' é obrigatório.";
pub const PASSWORD_TOO_SHORT: &str = "A senha deve ter no mínimo 6 caracteres.";
pub const PASSWORD_TOO_LONG: &str = "A senha deve ter no máximo 100 caracteres.";

pub const FULL_NAME_MAX_CHARS: usize = 100;
/// Matches the `VARCHAR(255)` email column.
pub const EMAIL_MAX_CHARS: usize = 255;
pub const PASSWORD_MIN_CHARS: usize = 6;
pub const PASSWORD_MAX_CHARS: usize = 100;

lazy_static! {
    static ref FULL_NAME_RE: Regex = Regex::new(r"^[A-Za-zÀ-ÖØ-öø-ÿ\s]+$").unwrap();
    static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
}

/// Whether an empty password is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordPolicy {
    /// Registration: a password must be given.
    Required,
    /// Edit: empty keeps the stored hash.
    KeepIfEmpty,
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub fn check_full_name(full_name: &str) -> Option<&'static str> {
    let full_name = full_name.trim();
    if full_name.is_empty() {
        Some(FULL_NAME_REQUIRED)
    } else if !FULL_NAME_RE.is_match(full_name) {
        Some(FULL_NAME_FORMAT)
    } else if full_name.chars().count() > FULL_NAME_MAX_CHARS {
        Some(FULL_NAME_TOO_LONG)
    } else {
        None
    }
}

/// Syntax only; uniqueness needs the store. Expects a normalized email.
pub fn check_email_format(email: &str) -> Option<&'static str> {
    if email.is_empty() {
        Some(EMAIL_REQUIRED)
    } else if !is_valid_email(email) {
        Some(EMAIL_FORMAT)
    } else if email.chars().count() > EMAIL_MAX_CHARS {
        Some(EMAIL_TOO_LONG)
    } else {
        None
    }
}

pub fn check_password(password: &str, policy: PasswordPolicy) -> Option<&'static str> {
    if password.trim().is_empty() {
        return match policy {
            PasswordPolicy::Required => Some(PASSWORD_REQUIRED),
            PasswordPolicy::KeepIfEmpty => None,
        };
    }
    let len = password.chars().count();
    if len < PASSWORD_MIN_CHARS {
        Some(PASSWORD_TOO_SHORT)
    } else if len > PASSWORD_MAX_CHARS {
        Some(PASSWORD_TOO_LONG)
    } else {
        None
    }
}

/// Run every rule and return the messages in field order. Empty means valid.
///
/// `email` must already be normalized. `existing_id` is the record being
/// edited, which may keep its own email.
pub async fn validate_user(
    store: &dyn UserStore,
    full_name: &str,
    email: &str,
    password: &str,
    existing_id: Option<i64>,
    policy: PasswordPolicy,
) -> StoreResult<Vec<String>> {
    let mut errors = Vec::new();

    if let Some(msg) = check_full_name(full_name) {
        errors.push(msg.to_string());
    }

    match check_email_format(email) {
        Some(msg) => errors.push(msg.to_string()),
        None => {
            if store.email_taken(email, existing_id).await? {
                errors.push(EMAIL_TAKEN.to_string());
            }
        }
    }

    if let Some(msg) = check_password(password, policy) {
        errors.push(msg.to_string());
    }

    Ok(errors)
}
