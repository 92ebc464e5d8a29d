use sea_orm::entity::prelude::*;

/// `lifestyle_info` and `emergency_contacts` hold JSON object text; see `codec`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub full_name: String,
    pub date_of_birth: Date,
    pub gender: String,
    #[sea_orm(unique)]
    pub email: String,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub medical_history: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub family_medical_history: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub current_medications: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub vaccination_records: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub lifestyle_info: Option<String>,
    pub blood_type: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub emergency_contacts: Option<String>,
    pub organ_donor_status: Option<String>,
    pub data_sharing_preferences: Option<String>,
    pub auth_method: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
