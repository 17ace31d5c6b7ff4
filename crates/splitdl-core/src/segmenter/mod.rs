//! Range math for segmented downloads.
//!
//! Maps a worker index to the inclusive byte range that worker fetches.

mod range;

pub use range::{chunk_size_for, plan, plan_all, Range};
