//! User model.
//!
//! # Invariants
//! - Display name is 1..=50 characters after trimming.
//! - Secret is 4..=20 characters and is never trimmed or serialized.

use crate::error::{CoreError, CoreResult};
use crate::model::ident::{bounded_text, UserId};
use crate::model::permission::Role;
use serde::Serialize;

const NAME_MAX_CHARS: usize = 50;
const SECRET_MIN_CHARS: usize = 4;
const SECRET_MAX_CHARS: usize = 20;

/// Actor able to authenticate and act under one role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    id: UserId,
    name: String,
    #[serde(skip_serializing)]
    secret: String,
    role: Role,
}

impl User {
    pub fn new(id: &str, name: &str, secret: &str, role: Role) -> CoreResult<Self> {
        Ok(Self {
            id: UserId::parse(id)?,
            name: normalize_name(name)?,
            secret: validate_secret(secret)?,
            role,
        })
    }

    pub fn id(&self) -> &UserId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }

    pub fn role(&self) -> &Role {
        &self.role
    }

    /// Compares a login attempt against the stored secret.
    pub fn verify_secret(&self, candidate: &str) -> bool {
        self.secret == candidate
    }

    pub fn set_name(&mut self, name: &str) -> CoreResult<()> {
        self.name = normalize_name(name)?;
        Ok(())
    }

    pub fn set_secret(&mut self, secret: &str) -> CoreResult<()> {
        self.secret = validate_secret(secret)?;
        Ok(())
    }

    pub fn set_role(&mut self, role: Role) {
        self.role = role;
    }
}

fn normalize_name(name: &str) -> CoreResult<String> {
    bounded_text("user name", name, 1, NAME_MAX_CHARS)
}

fn validate_secret(secret: &str) -> CoreResult<String> {
    let len = secret.chars().count();
    if !(SECRET_MIN_CHARS..=SECRET_MAX_CHARS).contains(&len) {
        return Err(CoreError::format(
            "user secret",
            format!(
                "length must be between {SECRET_MIN_CHARS} and {SECRET_MAX_CHARS} characters"
            ),
        ));
    }
    Ok(secret.to_string())
}
