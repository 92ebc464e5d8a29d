pub mod assessments;
pub mod users;
