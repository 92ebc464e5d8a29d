use sea_orm::entity::prelude::*;

/// No foreign key to `users`; `user_id` is a plain indexed column.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "assessments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(indexed)]
    pub user_id: i32,
    /// JSON object text: category -> score.
    #[sea_orm(column_type = "Text")]
    pub risk_scores: String,
    #[sea_orm(column_type = "Text")]
    pub recommendations: String,
    pub created_at: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
