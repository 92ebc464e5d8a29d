//! Care guidance: educational resources, symptom triage, lifestyle logging
//! and prevention reminders. Answers are fixed or derived from the request
//! alone; nothing is persisted.

pub mod module;
pub use module::{register, CareGuidance, MODULE_NAME};

#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod domain;
