//! StudyHub Core - Shared functionality for StudyHub tools
//!
//! Standard config locations, plus the small formatting
//! helpers every terminal front end needs.

pub mod format;
pub mod paths;

pub use paths::Paths;
