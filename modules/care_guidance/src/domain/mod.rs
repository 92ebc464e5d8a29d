//! Fixed guidance content and the keyword triage rule.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceLink {
    pub id: u32,
    pub title: &'static str,
    pub url: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceCatalog {
    pub articles: Vec<ResourceLink>,
    pub videos: Vec<ResourceLink>,
    pub infographics: Vec<ResourceLink>,
}

pub fn resource_catalog() -> ResourceCatalog {
    ResourceCatalog {
        articles: vec![
            ResourceLink {
                id: 1,
                title: "Heart Health Tips",
                url: "https://example.com/heart-health",
            },
            ResourceLink {
                id: 2,
                title: "Preventing Diabetes",
                url: "https://example.com/diabetes-prevention",
            },
        ],
        videos: vec![ResourceLink {
            id: 1,
            title: "Healthy Living",
            url: "https://youtube.com/examplevideo",
        }],
        infographics: Vec::new(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Triage {
    pub potential_conditions: Vec<&'static str>,
    pub confidence: Vec<u8>,
    pub next_steps: &'static str,
}

const EMERGENCY_KEYWORD: &str = "chest pain";

/// Case-insensitive substring match on the emergency keyword.
pub fn triage(symptoms: &str) -> Triage {
    if symptoms.to_lowercase().contains(EMERGENCY_KEYWORD) {
        Triage {
            potential_conditions: vec!["Heart Attack"],
            confidence: vec![90],
            next_steps: "Seek emergency care immediately.",
        }
    } else {
        Triage {
            potential_conditions: vec!["Common Cold"],
            confidence: vec![50],
            next_steps: "Rest and stay hydrated.",
        }
    }
}

pub const LIFESTYLE_LOGGED: &str = "Lifestyle data logged";

pub const PROGRESS_SUMMARY: &str = "You have maintained a consistent activity level.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reminder {
    pub message: &'static str,
    pub date: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreventionPlan {
    pub recommendations: Vec<&'static str>,
    pub reminders: Vec<Reminder>,
}

/// Same plan for every user for now.
pub fn prevention_plan(_user_id: i32) -> PreventionPlan {
    PreventionPlan {
        recommendations: vec![
            "Increase fiber intake",
            "Schedule a colonoscopy screening",
            "Consider a cardiology consultation",
        ],
        reminders: vec![Reminder {
            message: "Book your annual check-up",
            date: "2025-03-15",
        }],
    }
}
