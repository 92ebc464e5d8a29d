use async_trait::async_trait;
use thiserror::Error;

use crate::contract::model::{Assessment, NewAssessment, NewUser, User};

/// Write failures the domain reacts to; everything else is opaque.
#[derive(Debug, Error)]
pub enum RepoError {
    /// A unique index rejected the row (e.g. two concurrent creates with one email).
    #[error("unique constraint violated: {0}")]
    Conflict(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Port for the domain layer: user persistence.
/// Object-safe and async-friendly via `async_trait`.
#[async_trait]
pub trait UsersRepository: Send + Sync {
    async fn find_by_id(&self, id: i32) -> anyhow::Result<Option<User>>;
    async fn email_exists(&self, email: &str) -> anyhow::Result<bool>;
    /// Persist a validated profile; storage assigns the id.
    async fn insert(&self, new_user: NewUser) -> Result<User, RepoError>;
    /// Overwrite the row with primary key `u.id`.
    async fn update(&self, u: User) -> Result<(), RepoError>;
}

/// Port for the domain layer: assessment persistence.
#[async_trait]
pub trait AssessmentsRepository: Send + Sync {
    async fn insert(&self, new_assessment: NewAssessment) -> anyhow::Result<Assessment>;
    /// Ascending id order.
    async fn list_by_user(&self, user_id: i32) -> anyhow::Result<Vec<Assessment>>;
}
