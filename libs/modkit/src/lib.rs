//! # ModKit - module system for the CareLens server
//!
//! Modules implement a small set of capability traits and are registered
//! explicitly with a [`RegistryBuilder`]. The runtime drives every module
//! through the same ordered phases:
//!
//! init → db (migrations) → rest (router composition) → start → wait → stop
//!
//! ```rust,ignore
//! let mut b = modkit::RegistryBuilder::default();
//! api_ingress::register(&mut b);
//! health_profile::register(&mut b);
//! let registry = b.build_topo_sorted()?;
//! ```

pub use anyhow::Result;
pub use async_trait::async_trait;

pub mod context;
pub use context::{ConfigProvider, ModuleCtx, ModuleCtxBuilder};

pub mod contracts;
pub use contracts::*;

pub mod registry;
pub use registry::{ModuleRegistry, RegistryBuilder, RegistryError};

pub mod api;
pub use api::auth::{bearer_token, AuthError, BearerToken};
pub use api::extract::{JsonBody, PathParams, QueryParams};
pub use api::problem::{
    conflict, internal_error, not_found, unauthorized, unprocessable, Problem, ProblemResponse,
    ValidationError,
};

pub mod runtime;
pub use runtime::{run, DbFactory, DbOptions, RunOptions, ShutdownOptions};
