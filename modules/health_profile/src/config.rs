use serde::{Deserialize, Serialize};

/// Configuration for the health_profile module
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HealthProfileConfig {
    /// Reject assessments whose `user_id` has no matching user.
    #[serde(default)]
    pub enforce_user_reference: bool,
    #[serde(default = "default_max_full_name_length")]
    pub max_full_name_length: usize,
}

impl Default for HealthProfileConfig {
    fn default() -> Self {
        Self {
            enforce_user_reference: false,
            max_full_name_length: default_max_full_name_length(),
        }
    }
}

fn default_max_full_name_length() -> usize {
    200
}
