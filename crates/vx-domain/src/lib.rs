#![deny(clippy::all, warnings)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate
)]

pub mod identity;
pub mod layout;
pub mod paths;

pub use identity::EnvironmentId;
pub use layout::{EnvironmentLayout, BIN_DIR};
pub use paths::absolutize;
