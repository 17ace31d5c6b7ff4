//! CLI command handlers, one file per command.

mod get;
mod merge;
mod plan;
mod space;

pub use get::run_get;
pub use merge::run_merge;
pub use plan::run_plan;
pub use space::run_space;
