//! SeaORM-backed repository implementations for the domain ports.
//!
//! Both structs are generic over `C: ConnectionTrait`, so they can be built
//! with a `DatabaseConnection` or a transactional connection.

use anyhow::Context;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, SqlErr,
};

use crate::contract::model::{Assessment, NewAssessment, NewUser, User};
use crate::domain::repo::{AssessmentsRepository, RepoError, UsersRepository};
use crate::infra::storage::codec;
use crate::infra::storage::entity::{assessments, users};

/// Unique-index violations become [`RepoError::Conflict`]; the rest stay opaque.
fn classify_write_error(e: DbErr, what: &'static str) -> RepoError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => RepoError::Conflict(detail),
        _ => RepoError::Other(anyhow::Error::new(e).context(what)),
    }
}

/// SeaORM users repository.
/// Holds a connection object; its lifetime/ownership is up to the caller.
pub struct SeaOrmUsersRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmUsersRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }
}

#[async_trait::async_trait]
impl<C> UsersRepository for SeaOrmUsersRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn find_by_id(&self, id: i32) -> anyhow::Result<Option<User>> {
        let found = users::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("find_by_id failed")?;
        found.map(codec::user_from_model).transpose()
    }

    async fn email_exists(&self, email: &str) -> anyhow::Result<bool> {
        let count = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .count(&self.conn)
            .await
            .context("email_exists failed")?;
        Ok(count > 0)
    }

    async fn insert(&self, new_user: NewUser) -> Result<User, RepoError> {
        let m = codec::new_user_active_model(new_user)?;
        let row = m
            .insert(&self.conn)
            .await
            .map_err(|e| classify_write_error(e, "insert failed"))?;
        Ok(codec::user_from_model(row)?)
    }

    async fn update(&self, u: User) -> Result<(), RepoError> {
        let m = codec::user_active_model(u)?;
        let _ = m
            .update(&self.conn)
            .await
            .map_err(|e| classify_write_error(e, "update failed"))?;
        Ok(())
    }
}

/// SeaORM assessments repository.
pub struct SeaOrmAssessmentsRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmAssessmentsRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }
}

#[async_trait::async_trait]
impl<C> AssessmentsRepository for SeaOrmAssessmentsRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn insert(&self, a: NewAssessment) -> anyhow::Result<Assessment> {
        let m = assessments::ActiveModel {
            user_id: Set(a.user_id),
            risk_scores: Set(codec::encode_risk_scores(&a.risk_scores)?),
            recommendations: Set(a.recommendations),
            created_at: Set(a.created_at),
            ..Default::default()
        };
        let row = m.insert(&self.conn).await.context("insert failed")?;
        codec::assessment_from_model(row)
    }

    async fn list_by_user(&self, user_id: i32) -> anyhow::Result<Vec<Assessment>> {
        let rows = assessments::Entity::find()
            .filter(assessments::Column::UserId.eq(user_id))
            .order_by_asc(assessments::Column::Id)
            .all(&self.conn)
            .await
            .context("list_by_user failed")?;
        rows.into_iter().map(codec::assessment_from_model).collect()
    }
}
