use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{PreventionPlan, Reminder, ResourceCatalog, ResourceLink, Triage};

/// Arbitrary JSON object body.
pub type JsonObject = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ResourceLinkDto {
    pub id: u32,
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ResourceCatalogDto {
    pub articles: Vec<ResourceLinkDto>,
    pub videos: Vec<ResourceLinkDto>,
    pub infographics: Vec<ResourceLinkDto>,
}

/// Symptom checker request. Only `symptoms` is read; other keys are ignored.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SymptomCheckReq {
    pub symptoms: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SymptomCheckDto {
    pub potential_conditions: Vec<String>,
    /// Percent, one per condition.
    pub confidence: Vec<u8>,
    pub next_steps: String,
}

/// Lifestyle entry (diet, exercise, sleep, stress, ...); any JSON object.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = Object)]
pub struct LifestyleEntry(pub JsonObject);

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LifestyleLogAckDto {
    pub message: String,
    /// The submitted object, unchanged.
    #[schema(value_type = Object)]
    pub data: JsonObject,
}

#[derive(Debug, Clone, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserQuery {
    pub user_id: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProgressDto {
    pub user_id: i32,
    pub progress: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReminderDto {
    pub message: String,
    /// `YYYY-MM-DD`
    pub date: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PreventionPlanDto {
    pub recommendations: Vec<String>,
    pub reminders: Vec<ReminderDto>,
}

impl From<ResourceLink> for ResourceLinkDto {
    fn from(l: ResourceLink) -> Self {
        Self {
            id: l.id,
            title: l.title.to_string(),
            url: l.url.to_string(),
        }
    }
}

impl From<ResourceCatalog> for ResourceCatalogDto {
    fn from(c: ResourceCatalog) -> Self {
        Self {
            articles: c.articles.into_iter().map(Into::into).collect(),
            videos: c.videos.into_iter().map(Into::into).collect(),
            infographics: c.infographics.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<Triage> for SymptomCheckDto {
    fn from(t: Triage) -> Self {
        Self {
            potential_conditions: t
                .potential_conditions
                .into_iter()
                .map(str::to_string)
                .collect(),
            confidence: t.confidence,
            next_steps: t.next_steps.to_string(),
        }
    }
}

impl From<Reminder> for ReminderDto {
    fn from(r: Reminder) -> Self {
        Self {
            message: r.message.to_string(),
            date: r.date.to_string(),
        }
    }
}

impl From<PreventionPlan> for PreventionPlanDto {
    fn from(p: PreventionPlan) -> Self {
        Self {
            recommendations: p
                .recommendations
                .into_iter()
                .map(str::to_string)
                .collect(),
            reminders: p.reminders.into_iter().map(Into::into).collect(),
        }
    }
}
