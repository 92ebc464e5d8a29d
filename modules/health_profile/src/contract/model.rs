use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Free-form key/value sub-document (lifestyle info, emergency contacts).
pub type Document = serde_json::Map<String, serde_json::Value>;

/// One risk category score: a number (`42`, `0.37`) or a label (`"high"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RiskScore {
    Numeric(serde_json::Number),
    Descriptive(String),
}

pub type RiskScores = BTreeMap<String, RiskScore>;

/// Stored user profile as seen by other modules.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
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
    pub lifestyle_info: Option<Document>,
    pub blood_type: Option<String>,
    pub emergency_contacts: Option<Document>,
    pub organ_donor_status: Option<String>,
    pub data_sharing_preferences: Option<String>,
    pub auth_method: Option<String>,
}

/// Identity and contact fragment; the only mandatory part of a profile.
#[derive(Debug, Clone, PartialEq)]
pub struct UserBase {
    pub full_name: String,
    pub date_of_birth: NaiveDate,
    pub gender: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct UserHealth {
    pub medical_history: Option<String>,
    pub family_medical_history: Option<String>,
    pub current_medications: Option<String>,
    pub vaccination_records: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct UserLifestyle {
    pub lifestyle_info: Option<Document>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct UserEmergency {
    pub blood_type: Option<String>,
    pub emergency_contacts: Option<Document>,
    pub organ_donor_status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct UserSecurity {
    pub data_sharing_preferences: Option<String>,
    pub auth_method: Option<String>,
}

/// Data for creating a new user: the union of all fragments.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub base: UserBase,
    pub health: UserHealth,
    pub lifestyle: UserLifestyle,
    pub emergency: UserEmergency,
    pub security: UserSecurity,
}

/// Partial update of the base fragment.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BasePatch {
    pub full_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
}

/// Whole-profile partial update. `None` leaves the stored value untouched;
/// the optional fragments reuse their create shapes with that meaning.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProfilePatch {
    pub base: BasePatch,
    pub health: UserHealth,
    pub lifestyle: UserLifestyle,
    pub emergency: UserEmergency,
    pub security: UserSecurity,
}

impl From<BasePatch> for ProfilePatch {
    fn from(base: BasePatch) -> Self {
        Self {
            base,
            ..Default::default()
        }
    }
}

impl From<UserHealth> for ProfilePatch {
    fn from(health: UserHealth) -> Self {
        Self {
            health,
            ..Default::default()
        }
    }
}

impl From<UserLifestyle> for ProfilePatch {
    fn from(lifestyle: UserLifestyle) -> Self {
        Self {
            lifestyle,
            ..Default::default()
        }
    }
}

impl From<UserEmergency> for ProfilePatch {
    fn from(emergency: UserEmergency) -> Self {
        Self {
            emergency,
            ..Default::default()
        }
    }
}

impl From<UserSecurity> for ProfilePatch {
    fn from(security: UserSecurity) -> Self {
        Self {
            security,
            ..Default::default()
        }
    }
}

/// Stored risk assessment.
#[derive(Debug, Clone, PartialEq)]
pub struct Assessment {
    pub id: i32,
    pub user_id: i32,
    pub risk_scores: RiskScores,
    pub recommendations: String,
    /// Opaque label; RFC 3339 UTC when stamped by the service.
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewAssessment {
    pub user_id: i32,
    pub risk_scores: RiskScores,
    pub recommendations: String,
    pub created_at: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn risk_score_accepts_numbers_and_labels() {
        let scores: RiskScores =
            serde_json::from_str(r#"{"diabetes": 42, "stroke": 0.5, "heart": "high"}"#).unwrap();
        assert_eq!(
            scores["diabetes"],
            RiskScore::Numeric(serde_json::Number::from(42))
        );
        assert!(matches!(scores["stroke"], RiskScore::Numeric(_)));
        assert_eq!(scores["heart"], RiskScore::Descriptive("high".into()));
    }

    #[test]
    fn risk_score_rejects_other_json_types() {
        for raw in [r#"{"a": true}"#, r#"{"a": null}"#, r#"{"a": [1]}"#, r#"{"a": {}}"#] {
            assert!(serde_json::from_str::<RiskScores>(raw).is_err(), "{raw}");
        }
    }

    #[test]
    fn fragment_patch_touches_only_its_fragment() {
        let patch = ProfilePatch::from(UserSecurity {
            auth_method: Some("mfa".into()),
            ..Default::default()
        });
        assert_eq!(patch.base, BasePatch::default());
        assert_eq!(patch.health, UserHealth::default());
        assert_eq!(patch.security.auth_method.as_deref(), Some("mfa"));
    }
}
