use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use tracing::{debug, info, instrument, warn};

use crate::contract::model::{
    Assessment, BasePatch, NewAssessment, NewUser, ProfilePatch, User,
};
use crate::domain::error::DomainError;
use crate::domain::repo::{AssessmentsRepository, RepoError, UsersRepository};

/// Domain service with business rules for profiles and assessments.
/// Depends only on the repository ports, not on infra types.
#[derive(Clone)]
pub struct Service {
    users: Arc<dyn UsersRepository>,
    assessments: Arc<dyn AssessmentsRepository>,
    config: ServiceConfig,
}

/// Configuration for the domain service
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub max_full_name_length: usize,
    pub enforce_user_reference: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            max_full_name_length: 200,
            enforce_user_reference: false,
        }
    }
}

impl Service {
    pub fn new(
        users: Arc<dyn UsersRepository>,
        assessments: Arc<dyn AssessmentsRepository>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            users,
            assessments,
            config,
        }
    }

    #[instrument(name = "health_profile.service.get_user", skip(self), fields(user_id = %id))]
    pub async fn get_user(&self, id: i32) -> Result<User, DomainError> {
        debug!("Getting user by id");

        let user = self
            .users
            .find_by_id(id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
            .ok_or_else(|| DomainError::user_not_found(id))?;
        debug!("Successfully retrieved user");
        Ok(user)
    }

    #[instrument(
        name = "health_profile.service.create_user",
        skip(self, new_user),
        fields(email = %new_user.base.email)
    )]
    pub async fn create_user(&self, new_user: NewUser) -> Result<User, DomainError> {
        info!("Creating new user");

        self.validate_full_name(&new_user.base.full_name)?;
        validate_email(&new_user.base.email)?;

        if self
            .users
            .email_exists(&new_user.base.email)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
        {
            return Err(DomainError::email_already_exists(new_user.base.email));
        }

        let email = new_user.base.email.clone();
        let user = self
            .users
            .insert(new_user)
            .await
            .map_err(|e| map_write_error(e, email))?;

        info!("Successfully created user with id={}", user.id);
        Ok(user)
    }

    #[instrument(name = "health_profile.service.update_user", skip(self, patch), fields(user_id = %id))]
    pub async fn update_user(&self, id: i32, patch: ProfilePatch) -> Result<User, DomainError> {
        info!("Updating user");

        self.validate_base_patch(&patch.base)?;

        let mut current = self
            .users
            .find_by_id(id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
            .ok_or_else(|| DomainError::user_not_found(id))?;

        // Uniqueness for email change
        if let Some(ref new_email) = patch.base.email {
            if new_email != &current.email
                && self
                    .users
                    .email_exists(new_email)
                    .await
                    .map_err(|e| DomainError::database(e.to_string()))?
            {
                return Err(DomainError::email_already_exists(new_email.clone()));
            }
        }

        apply_patch(&mut current, patch);

        self.users
            .update(current.clone())
            .await
            .map_err(|e| map_write_error(e, current.email.clone()))?;

        info!("Successfully updated user");
        Ok(current)
    }

    #[instrument(
        name = "health_profile.service.create_assessment",
        skip(self, new_assessment),
        fields(user_id = %new_assessment.user_id)
    )]
    pub async fn create_assessment(
        &self,
        mut new_assessment: NewAssessment,
    ) -> Result<Assessment, DomainError> {
        info!("Creating assessment");

        if new_assessment.user_id <= 0 {
            return Err(DomainError::validation(
                "user_id",
                "must be a positive integer",
            ));
        }
        if new_assessment.risk_scores.is_empty() {
            return Err(DomainError::validation(
                "risk_scores",
                "must contain at least one score",
            ));
        }

        if self.config.enforce_user_reference {
            let exists = self
                .users
                .find_by_id(new_assessment.user_id)
                .await
                .map_err(|e| DomainError::database(e.to_string()))?
                .is_some();
            if !exists {
                return Err(DomainError::user_not_found(new_assessment.user_id));
            }
        }

        if new_assessment.created_at.is_none() {
            new_assessment.created_at =
                Some(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true));
        }

        let assessment = self
            .assessments
            .insert(new_assessment)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;

        info!("Successfully created assessment with id={}", assessment.id);
        Ok(assessment)
    }

    #[instrument(name = "health_profile.service.list_assessments", skip(self), fields(user_id = %user_id))]
    pub async fn list_assessments(&self, user_id: i32) -> Result<Vec<Assessment>, DomainError> {
        debug!("Listing assessments for user");

        let items = self
            .assessments
            .list_by_user(user_id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;

        debug!("Found {} assessments", items.len());
        Ok(items)
    }

    fn validate_full_name(&self, full_name: &str) -> Result<(), DomainError> {
        if full_name.trim().is_empty() {
            return Err(DomainError::validation("full_name", "must not be blank"));
        }
        let len = full_name.chars().count();
        if len > self.config.max_full_name_length {
            return Err(DomainError::validation(
                "full_name",
                format!(
                    "too long: {} characters (max: {})",
                    len, self.config.max_full_name_length
                ),
            ));
        }
        Ok(())
    }

    fn validate_base_patch(&self, patch: &BasePatch) -> Result<(), DomainError> {
        if let Some(ref full_name) = patch.full_name {
            self.validate_full_name(full_name)?;
        }
        if let Some(ref email) = patch.email {
            validate_email(email)?;
        }
        Ok(())
    }
}

fn validate_email(email: &str) -> Result<(), DomainError> {
    if email.trim().is_empty() {
        return Err(DomainError::validation("email", "must not be blank"));
    }
    Ok(())
}

fn map_write_error(e: RepoError, email: String) -> DomainError {
    match e {
        RepoError::Conflict(detail) => {
            warn!(%detail, "unique index rejected user write");
            DomainError::email_already_exists(email)
        }
        RepoError::Other(e) => DomainError::database(e.to_string()),
    }
}

fn merge<T>(slot: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *slot = value;
    }
}

fn apply_patch(user: &mut User, patch: ProfilePatch) {
    let ProfilePatch {
        base,
        health,
        lifestyle,
        emergency,
        security,
    } = patch;

    if let Some(v) = base.full_name {
        user.full_name = v;
    }
    if let Some(v) = base.date_of_birth {
        user.date_of_birth = v;
    }
    if let Some(v) = base.gender {
        user.gender = v;
    }
    if let Some(v) = base.email {
        user.email = v;
    }
    merge(&mut user.phone_number, base.phone_number);
    merge(&mut user.address, base.address);

    merge(&mut user.medical_history, health.medical_history);
    merge(&mut user.family_medical_history, health.family_medical_history);
    merge(&mut user.current_medications, health.current_medications);
    merge(&mut user.vaccination_records, health.vaccination_records);

    merge(&mut user.lifestyle_info, lifestyle.lifestyle_info);

    merge(&mut user.blood_type, emergency.blood_type);
    merge(&mut user.emergency_contacts, emergency.emergency_contacts);
    merge(&mut user.organ_donor_status, emergency.organ_donor_status);

    merge(
        &mut user.data_sharing_preferences,
        security.data_sharing_preferences,
    );
    merge(&mut user.auth_method, security.auth_method);
}
