use async_trait::async_trait;

use crate::contract::{
    error::HealthProfileError,
    model::{Assessment, NewAssessment, NewUser, ProfilePatch, User},
};

/// In-process API of the health_profile module for other modules.
#[async_trait]
pub trait HealthProfileApi: Send + Sync {
    async fn get_user(&self, id: i32) -> Result<User, HealthProfileError>;

    async fn create_user(&self, new_user: NewUser) -> Result<User, HealthProfileError>;

    /// Merge the provided fields into the stored profile.
    async fn update_user(&self, id: i32, patch: ProfilePatch) -> Result<User, HealthProfileError>;

    async fn create_assessment(
        &self,
        new_assessment: NewAssessment,
    ) -> Result<Assessment, HealthProfileError>;

    /// Assessments of one user, oldest first; empty when there are none.
    async fn list_assessments(&self, user_id: i32) -> Result<Vec<Assessment>, HealthProfileError>;
}
