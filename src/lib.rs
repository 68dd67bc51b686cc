//! snapr - yearly snapshot branch automation
//!
//! Publishes one year-named branch per training window into a git
//! repository, and fetches published year branches back into year-named
//! directories in parallel.

pub mod error;
pub mod fetch;
pub mod git;
pub mod params;
pub mod publish;
pub mod window;

pub use error::{Result, SnaprError};
