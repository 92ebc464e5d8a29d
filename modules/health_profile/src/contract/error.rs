use thiserror::Error;

/// Errors that are safe to expose to other modules
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HealthProfileError {
    #[error("User not found: {id}")]
    NotFound { id: i32 },

    #[error("User with email '{email}' already exists")]
    Conflict { email: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Internal error")]
    Internal,
}

impl HealthProfileError {
    pub fn not_found(id: i32) -> Self {
        Self::NotFound { id }
    }

    pub fn conflict(email: String) -> Self {
        Self::Conflict { email }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn internal() -> Self {
        Self::Internal
    }
}

impl From<crate::domain::error::DomainError> for HealthProfileError {
    fn from(domain_error: crate::domain::error::DomainError) -> Self {
        use crate::domain::error::DomainError::*;
        match domain_error {
            UserNotFound { id } => Self::not_found(id),
            EmailAlreadyExists { email } => Self::conflict(email),
            Validation { field, message } => Self::validation(format!("{field}: {message}")),
            Database { .. } => Self::internal(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::DomainError;

    #[test]
    fn database_details_do_not_cross_the_contract() {
        let e: HealthProfileError = DomainError::database("disk I/O error").into();
        assert_eq!(e, HealthProfileError::Internal);
        assert_eq!(e.to_string(), "Internal error");
    }

    #[test]
    fn validation_keeps_the_field_name() {
        let e: HealthProfileError = DomainError::validation("email", "must not be blank").into();
        assert_eq!(
            e,
            HealthProfileError::validation("email: must not be blank")
        );
    }
}
