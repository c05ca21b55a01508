//! Host framework integration: the narrow interface the plugin needs from
//! the deployment framework, its naming rules, and the version check.

pub mod document;
pub mod naming;
pub mod version;

use crate::config::ServiceConfig;
use crate::types::{ResourceDefinition, TemplateResource};

/// Everything the plugin reads from or writes to the host framework.
///
/// The naming methods default to the framework's AWS conventions; hosts
/// only override them when they name log groups differently.
pub trait ServiceHost {
    /// Version string of the running framework
    fn framework_version(&self) -> &str;

    /// The service being packaged
    fn service(&self) -> &ServiceConfig;

    fn service_name(&self) -> &str {
        self.service().service_name()
    }

    /// Resolved deployment stage
    fn stage(&self) -> String;

    /// Resolved deployment region
    fn region(&self) -> String;

    fn log_group_name(&self, function_name: &str) -> String {
        naming::log_group_name(function_name)
    }

    fn log_group_logical_id(&self, function_name: &str) -> String {
        naming::log_group_logical_id(function_name)
    }

    /// Insert `resource` into the template, replacing any entry already at `logical_id`.
    fn set_resource(&mut self, logical_id: &str, resource: ResourceDefinition);

    /// Show a message to the user running the framework
    fn log(&mut self, message: &str);
}

/// Insert into a resource mapping with overwrite semantics
pub(crate) fn overwrite_resource(
    resources: &mut crate::types::Resources,
    logical_id: &str,
    resource: ResourceDefinition,
) {
    if resources
        .insert(logical_id.to_string(), TemplateResource::from(resource))
        .is_some()
    {
        log::debug!("Replaced existing resource {logical_id}");
    }
}
