pub mod config;
pub mod logging;

pub mod download_target;
pub mod error;
pub mod fetch;
pub mod merge;
pub mod progress;
pub mod scratch;
pub mod segmenter;
pub mod session;
pub mod space;

pub use error::{CoreError, CoreResult};
