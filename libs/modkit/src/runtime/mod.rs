mod runner;
pub mod shutdown;

pub use runner::{run, DbFactory, DbOptions, RunOptions, ShutdownOptions};
