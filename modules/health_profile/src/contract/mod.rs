pub mod client;
pub mod error;
pub mod model;

pub use client::HealthProfileApi;
pub use error::HealthProfileError;
pub use model::*;
