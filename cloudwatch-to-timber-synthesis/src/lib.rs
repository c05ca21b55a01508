//! This crate provides the core logic of the CloudWatch-to-Timber plugin:
//! - Resource template synthesis (role, forwarder function, permission, subscription filters)
//! - The packaging hook that merges those resources into a service template
//! - The host framework interface, with a document-backed implementation
//!

pub mod config;
mod error;
pub mod host;
mod plugin;
pub mod synthesis;
pub mod types;

// Re-exports for a small, focused public API
pub use config::{ServiceConfig, TimberConfig};
pub use error::{TimberError, TimberResult};
pub use host::document::{DocumentHost, HostOptions};
pub use host::version::{ensure_compatible, FrameworkVersion, MINIMUM_FRAMEWORK_VERSION};
pub use host::ServiceHost;
pub use plugin::{ForwardingOutcome, SkipReason, TimberPlugin, PACKAGE_HOOK};
pub use synthesis::{
    build_access_role, build_forwarder_function, build_invoke_permission,
    build_subscription_filter,
};
pub use types::{ResourceDefinition, ResourceKind, Resources, TemplateResource};
