use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    FullName,
    DateOfBirth,
    Gender,
    Email,
    PhoneNumber,
    Address,
    MedicalHistory,
    FamilyMedicalHistory,
    CurrentMedications,
    VaccinationRecords,
    LifestyleInfo,
    BloodType,
    EmergencyContacts,
    OrganDonorStatus,
    DataSharingPreferences,
    AuthMethod,
}

#[derive(DeriveIden)]
enum Assessments {
    Table,
    Id,
    UserId,
    RiskScores,
    Recommendations,
    CreatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::FullName).string().not_null())
                    .col(ColumnDef::new(Users::DateOfBirth).date().not_null())
                    .col(ColumnDef::new(Users::Gender).string().not_null())
                    .col(ColumnDef::new(Users::Email).string().not_null())
                    .col(ColumnDef::new(Users::PhoneNumber).string().null())
                    .col(ColumnDef::new(Users::Address).string().null())
                    .col(ColumnDef::new(Users::MedicalHistory).text().null())
                    .col(ColumnDef::new(Users::FamilyMedicalHistory).text().null())
                    .col(ColumnDef::new(Users::CurrentMedications).text().null())
                    .col(ColumnDef::new(Users::VaccinationRecords).text().null())
                    .col(ColumnDef::new(Users::LifestyleInfo).text().null())
                    .col(ColumnDef::new(Users::BloodType).string().null())
                    .col(ColumnDef::new(Users::EmergencyContacts).text().null())
                    .col(ColumnDef::new(Users::OrganDonorStatus).string().null())
                    .col(ColumnDef::new(Users::DataSharingPreferences).string().null())
                    .col(ColumnDef::new(Users::AuthMethod).string().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("ux_users_email")
                    .table(Users::Table)
                    .col(Users::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Assessments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Assessments::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Assessments::UserId).integer().not_null())
                    .col(ColumnDef::new(Assessments::RiskScores).text().not_null())
                    .col(ColumnDef::new(Assessments::Recommendations).text().not_null())
                    .col(ColumnDef::new(Assessments::CreatedAt).string().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("ix_assessments_user_id")
                    .table(Assessments::Table)
                    .col(Assessments::UserId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Assessments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}
