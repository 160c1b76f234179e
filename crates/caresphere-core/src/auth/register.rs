//! Registration form checks performed before anything is sent.

use crate::error::{GatewayError, Result};
use crate::session::Role;

use super::wire::RegisterRequest;

/// Minimum accepted password length.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Specialization assumed for doctors who do not pick one.
pub const DEFAULT_SPECIALIZATION: &str = "General Practice";

/// Specializations a doctor can register with.
pub const SPECIALIZATIONS: &[&str] = &[
    "General Practice",
    "Cardiology",
    "Endocrinology",
    "Neurology",
    "Orthopedics",
    "Psychiatry",
    "Dermatology",
    "Oncology",
    "Pediatrics",
    "Gastroenterology",
];

/// Registration form as entered by the user.
#[derive(Debug, Clone)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub role: Role,
    /// Only used for doctors.
    pub specialization: Option<String>,
}

impl RegisterForm {
    /// Checks the form and builds the request body.
    pub fn validate(&self) -> Result<RegisterRequest> {
        let name = self.name.trim();
        let email = self.email.trim();

        if name.is_empty() || email.is_empty() || self.password.is_empty() {
            return Err(GatewayError::Validation("All fields are required.".to_string()));
        }
        if self.password != self.confirm_password {
            return Err(GatewayError::Validation("Passwords do not match.".to_string()));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(GatewayError::Validation(format!(
                "Password must be at least {} characters.",
                MIN_PASSWORD_LEN
            )));
        }

        let specialization = match self.role {
            Role::Patient => None,
            Role::Doctor => Some(resolve_specialization(self.specialization.as_deref())?),
        };

        Ok(RegisterRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: self.password.clone(),
            role: self.role,
            specialization,
        })
    }
}

fn resolve_specialization(requested: Option<&str>) -> Result<String> {
    let Some(requested) = requested.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(DEFAULT_SPECIALIZATION.to_string());
    };
    SPECIALIZATIONS
        .iter()
        .find(|known| known.eq_ignore_ascii_case(requested))
        .map(|known| (*known).to_string())
        .ok_or_else(|| GatewayError::Validation(format!("Unknown specialization: {}", requested)))
}
