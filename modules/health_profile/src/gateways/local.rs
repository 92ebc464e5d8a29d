use async_trait::async_trait;
use std::sync::Arc;

use crate::contract::{
    client::HealthProfileApi,
    error::HealthProfileError,
    model::{Assessment, NewAssessment, NewUser, ProfilePatch, User},
};
use crate::domain::service::Service;

/// Local implementation of [`HealthProfileApi`] that delegates to the domain service
pub struct HealthProfileLocalClient {
    service: Arc<Service>,
}

impl HealthProfileLocalClient {
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl HealthProfileApi for HealthProfileLocalClient {
    async fn get_user(&self, id: i32) -> Result<User, HealthProfileError> {
        self.service.get_user(id).await.map_err(Into::into)
    }

    async fn create_user(&self, new_user: NewUser) -> Result<User, HealthProfileError> {
        self.service.create_user(new_user).await.map_err(Into::into)
    }

    async fn update_user(&self, id: i32, patch: ProfilePatch) -> Result<User, HealthProfileError> {
        self.service
            .update_user(id, patch)
            .await
            .map_err(Into::into)
    }

    async fn create_assessment(
        &self,
        new_assessment: NewAssessment,
    ) -> Result<Assessment, HealthProfileError> {
        self.service
            .create_assessment(new_assessment)
            .await
            .map_err(Into::into)
    }

    async fn list_assessments(&self, user_id: i32) -> Result<Vec<Assessment>, HealthProfileError> {
        self.service
            .list_assessments(user_id)
            .await
            .map_err(Into::into)
    }
}
