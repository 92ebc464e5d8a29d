use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::contract::model::{
    Assessment, BasePatch, Document, NewAssessment, NewUser, ProfilePatch, RiskScores, User,
    UserBase, UserEmergency, UserHealth, UserLifestyle, UserSecurity,
};

/// REST DTO for a stored user profile
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserDto {
    pub id: i32,
    pub full_name: String,
    pub date_of_birth: NaiveDate,
    pub gender: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub medical_history: Option<String>,
    pub family_medical_history: Option<String>,
    pub current_medications: Option<String>,
    pub vaccination_records: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub lifestyle_info: Option<Document>,
    pub blood_type: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub emergency_contacts: Option<Document>,
    pub organ_donor_status: Option<String>,
    pub data_sharing_preferences: Option<String>,
    pub auth_method: Option<String>,
}

/// Identity and contact fields, required on create.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserBaseReq {
    pub full_name: String,
    /// Calendar date, `YYYY-MM-DD`.
    pub date_of_birth: NaiveDate,
    pub gender: String,
    pub email: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UserHealthReq {
    #[serde(default)]
    pub medical_history: Option<String>,
    #[serde(default)]
    pub family_medical_history: Option<String>,
    #[serde(default)]
    pub current_medications: Option<String>,
    #[serde(default)]
    pub vaccination_records: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UserLifestyleReq {
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub lifestyle_info: Option<Document>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UserEmergencyReq {
    #[serde(default)]
    pub blood_type: Option<String>,
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub emergency_contacts: Option<Document>,
    #[serde(default)]
    pub organ_donor_status: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UserSecurityReq {
    #[serde(default)]
    pub data_sharing_preferences: Option<String>,
    #[serde(default)]
    pub auth_method: Option<String>,
}

/// Create request: every fragment's fields at the top level.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateUserReq {
    #[serde(flatten)]
    pub base: UserBaseReq,
    #[serde(flatten)]
    pub health: UserHealthReq,
    #[serde(flatten)]
    pub lifestyle: UserLifestyleReq,
    #[serde(flatten)]
    pub emergency: UserEmergencyReq,
    #[serde(flatten)]
    pub security: UserSecurityReq,
}

/// Partial update of the base fragment; absent or null fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct BasePatchReq {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

/// Whole-profile partial update.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateUserReq {
    #[serde(flatten)]
    pub base: BasePatchReq,
    #[serde(flatten)]
    pub health: UserHealthReq,
    #[serde(flatten)]
    pub lifestyle: UserLifestyleReq,
    #[serde(flatten)]
    pub emergency: UserEmergencyReq,
    #[serde(flatten)]
    pub security: UserSecurityReq,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateAssessmentReq {
    pub user_id: i32,
    /// Category -> score, where a score is a number or a label.
    #[schema(value_type = Object)]
    pub risk_scores: RiskScores,
    pub recommendations: String,
    /// Opaque label; stamped with the current UTC time when omitted.
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AssessmentDto {
    pub id: i32,
    pub user_id: i32,
    #[schema(value_type = Object)]
    pub risk_scores: RiskScores,
    pub recommendations: String,
    pub created_at: String,
}

// Conversion implementations between REST DTOs and contract models

impl From<User> for UserDto {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            full_name: u.full_name,
            date_of_birth: u.date_of_birth,
            gender: u.gender,
            email: u.email,
            phone_number: u.phone_number,
            address: u.address,
            medical_history: u.medical_history,
            family_medical_history: u.family_medical_history,
            current_medications: u.current_medications,
            vaccination_records: u.vaccination_records,
            lifestyle_info: u.lifestyle_info,
            blood_type: u.blood_type,
            emergency_contacts: u.emergency_contacts,
            organ_donor_status: u.organ_donor_status,
            data_sharing_preferences: u.data_sharing_preferences,
            auth_method: u.auth_method,
        }
    }
}

impl From<UserBaseReq> for UserBase {
    fn from(r: UserBaseReq) -> Self {
        Self {
            full_name: r.full_name,
            date_of_birth: r.date_of_birth,
            gender: r.gender,
            email: r.email,
            phone_number: r.phone_number,
            address: r.address,
        }
    }
}

impl From<UserHealthReq> for UserHealth {
    fn from(r: UserHealthReq) -> Self {
        Self {
            medical_history: r.medical_history,
            family_medical_history: r.family_medical_history,
            current_medications: r.current_medications,
            vaccination_records: r.vaccination_records,
        }
    }
}

impl From<UserLifestyleReq> for UserLifestyle {
    fn from(r: UserLifestyleReq) -> Self {
        Self {
            lifestyle_info: r.lifestyle_info,
        }
    }
}

impl From<UserEmergencyReq> for UserEmergency {
    fn from(r: UserEmergencyReq) -> Self {
        Self {
            blood_type: r.blood_type,
            emergency_contacts: r.emergency_contacts,
            organ_donor_status: r.organ_donor_status,
        }
    }
}

impl From<UserSecurityReq> for UserSecurity {
    fn from(r: UserSecurityReq) -> Self {
        Self {
            data_sharing_preferences: r.data_sharing_preferences,
            auth_method: r.auth_method,
        }
    }
}

impl From<CreateUserReq> for NewUser {
    fn from(r: CreateUserReq) -> Self {
        Self {
            base: r.base.into(),
            health: r.health.into(),
            lifestyle: r.lifestyle.into(),
            emergency: r.emergency.into(),
            security: r.security.into(),
        }
    }
}

impl From<BasePatchReq> for BasePatch {
    fn from(r: BasePatchReq) -> Self {
        Self {
            full_name: r.full_name,
            date_of_birth: r.date_of_birth,
            gender: r.gender,
            email: r.email,
            phone_number: r.phone_number,
            address: r.address,
        }
    }
}

impl From<UpdateUserReq> for ProfilePatch {
    fn from(r: UpdateUserReq) -> Self {
        Self {
            base: r.base.into(),
            health: r.health.into(),
            lifestyle: r.lifestyle.into(),
            emergency: r.emergency.into(),
            security: r.security.into(),
        }
    }
}

impl From<CreateAssessmentReq> for NewAssessment {
    fn from(r: CreateAssessmentReq) -> Self {
        Self {
            user_id: r.user_id,
            risk_scores: r.risk_scores,
            recommendations: r.recommendations,
            created_at: r.created_at,
        }
    }
}

impl From<Assessment> for AssessmentDto {
    fn from(a: Assessment) -> Self {
        Self {
            id: a.id,
            user_id: a.user_id,
            risk_scores: a.risk_scores,
            recommendations: a.recommendations,
            created_at: a.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_reads_all_fragments_from_one_object() {
        let req: CreateUserReq = serde_json::from_value(serde_json::json!({
            "full_name": "Ada Lovelace",
            "date_of_birth": "1815-12-10",
            "gender": "female",
            "email": "ada@example.com",
            "medical_history": "none",
            "lifestyle_info": { "smoker": false },
            "blood_type": "A+",
            "auth_method": "password"
        }))
        .unwrap();

        let new_user = NewUser::from(req);
        assert_eq!(new_user.base.full_name, "Ada Lovelace");
        assert_eq!(
            new_user.base.date_of_birth,
            NaiveDate::from_ymd_opt(1815, 12, 10).unwrap()
        );
        assert_eq!(new_user.health.medical_history.as_deref(), Some("none"));
        assert_eq!(
            new_user.lifestyle.lifestyle_info.unwrap()["smoker"],
            serde_json::json!(false)
        );
        assert_eq!(new_user.emergency.blood_type.as_deref(), Some("A+"));
        assert_eq!(new_user.security.auth_method.as_deref(), Some("password"));
        assert!(new_user.base.phone_number.is_none());
    }

    #[test]
    fn create_request_requires_base_fields_and_a_real_date() {
        let missing_email = serde_json::json!({
            "full_name": "Ada", "date_of_birth": "1815-12-10", "gender": "female"
        });
        assert!(serde_json::from_value::<CreateUserReq>(missing_email).is_err());

        let bad_date = serde_json::json!({
            "full_name": "Ada", "date_of_birth": "1815-02-30", "gender": "f", "email": "a@b.c"
        });
        assert!(serde_json::from_value::<CreateUserReq>(bad_date).is_err());
    }

    #[test]
    fn sub_documents_must_be_objects() {
        let req = serde_json::json!({
            "full_name": "Ada", "date_of_birth": "1815-12-10", "gender": "f",
            "email": "a@b.c", "emergency_contacts": "call mom"
        });
        assert!(serde_json::from_value::<CreateUserReq>(req).is_err());
    }
}
