//! Pure resolution of a [`ProjectRequest`](crate::request::ProjectRequest)
//! against the template store. Nothing here touches the filesystem.

pub mod deps;
pub mod examples;

pub use deps::{
    active_ecosystems, resolve_dependencies, EcosystemDependencies, ResolvedDependencies,
    ResolvedPackage,
};
pub use examples::{resolve_examples, ExampleResolution, ResolutionWarning};
