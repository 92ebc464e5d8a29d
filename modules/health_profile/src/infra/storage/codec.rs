//! Encode/decode boundary between structured fields and their TEXT columns.
//!
//! Storage never inspects these documents; it only round-trips them. A stored
//! value that no longer parses is reported as a storage error, not silently
//! dropped.

use anyhow::Context;

use crate::contract::model::{
    Assessment, Document, NewUser, RiskScores, User,
};
use crate::infra::storage::entity::{assessments, users};

pub fn encode_document(doc: Option<&Document>) -> anyhow::Result<Option<String>> {
    doc.map(|d| serde_json::to_string(d).context("encode document"))
        .transpose()
}

pub fn decode_document(column: &str, raw: Option<&str>) -> anyhow::Result<Option<Document>> {
    raw.map(|s| {
        serde_json::from_str::<Document>(s)
            .with_context(|| format!("stored {column} is not a JSON object"))
    })
    .transpose()
}

pub fn encode_risk_scores(scores: &RiskScores) -> anyhow::Result<String> {
    serde_json::to_string(scores).context("encode risk_scores")
}

pub fn decode_risk_scores(raw: &str) -> anyhow::Result<RiskScores> {
    serde_json::from_str(raw).context("stored risk_scores is not a category -> score object")
}

pub fn user_from_model(m: users::Model) -> anyhow::Result<User> {
    let lifestyle_info = decode_document("lifestyle_info", m.lifestyle_info.as_deref())?;
    let emergency_contacts =
        decode_document("emergency_contacts", m.emergency_contacts.as_deref())?;
    Ok(User {
        id: m.id,
        full_name: m.full_name,
        date_of_birth: m.date_of_birth,
        gender: m.gender,
        email: m.email,
        phone_number: m.phone_number,
        address: m.address,
        medical_history: m.medical_history,
        family_medical_history: m.family_medical_history,
        current_medications: m.current_medications,
        vaccination_records: m.vaccination_records,
        lifestyle_info,
        blood_type: m.blood_type,
        emergency_contacts,
        organ_donor_status: m.organ_donor_status,
        data_sharing_preferences: m.data_sharing_preferences,
        auth_method: m.auth_method,
    })
}

/// Column values for a new row; `id` is left to the database.
pub fn new_user_active_model(u: NewUser) -> anyhow::Result<users::ActiveModel> {
    use sea_orm::{ActiveValue::NotSet, Set};

    Ok(users::ActiveModel {
        id: NotSet,
        full_name: Set(u.base.full_name),
        date_of_birth: Set(u.base.date_of_birth),
        gender: Set(u.base.gender),
        email: Set(u.base.email),
        phone_number: Set(u.base.phone_number),
        address: Set(u.base.address),
        medical_history: Set(u.health.medical_history),
        family_medical_history: Set(u.health.family_medical_history),
        current_medications: Set(u.health.current_medications),
        vaccination_records: Set(u.health.vaccination_records),
        lifestyle_info: Set(encode_document(u.lifestyle.lifestyle_info.as_ref())?),
        blood_type: Set(u.emergency.blood_type),
        emergency_contacts: Set(encode_document(u.emergency.emergency_contacts.as_ref())?),
        organ_donor_status: Set(u.emergency.organ_donor_status),
        data_sharing_preferences: Set(u.security.data_sharing_preferences),
        auth_method: Set(u.security.auth_method),
    })
}

/// Every column set, keyed by `u.id`.
pub fn user_active_model(u: User) -> anyhow::Result<users::ActiveModel> {
    use sea_orm::Set;

    Ok(users::ActiveModel {
        id: Set(u.id),
        full_name: Set(u.full_name),
        date_of_birth: Set(u.date_of_birth),
        gender: Set(u.gender),
        email: Set(u.email),
        phone_number: Set(u.phone_number),
        address: Set(u.address),
        medical_history: Set(u.medical_history),
        family_medical_history: Set(u.family_medical_history),
        current_medications: Set(u.current_medications),
        vaccination_records: Set(u.vaccination_records),
        lifestyle_info: Set(encode_document(u.lifestyle_info.as_ref())?),
        blood_type: Set(u.blood_type),
        emergency_contacts: Set(encode_document(u.emergency_contacts.as_ref())?),
        organ_donor_status: Set(u.organ_donor_status),
        data_sharing_preferences: Set(u.data_sharing_preferences),
        auth_method: Set(u.auth_method),
    })
}

pub fn assessment_from_model(m: assessments::Model) -> anyhow::Result<Assessment> {
    Ok(Assessment {
        id: m.id,
        user_id: m.user_id,
        risk_scores: decode_risk_scores(&m.risk_scores)?,
        recommendations: m.recommendations,
        created_at: m.created_at.unwrap_or_default(),
    })
}
