pub mod assets;
pub mod catalog;
pub mod config;
pub mod error;
pub mod io;
pub mod manifest;
pub mod paths;
pub mod project;
pub mod request;
pub mod resolve;
pub mod scaffold;
pub mod toolchain;
pub mod types;
pub mod version;
pub mod writer;

pub use catalog::TemplateStore;
pub use error::{Result, SpinboxError};
pub use request::{Mode, ProjectRequest};
pub use types::{Component, Ecosystem};

/// Version recorded in project files written by this build.
pub const SPINBOX_VERSION: &str = env!("CARGO_PKG_VERSION");
