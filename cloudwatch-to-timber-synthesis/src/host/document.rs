//! [`ServiceHost`] backed by a resolved service document.
//!
//! This stands in for the framework when the plugin runs outside of it, for
//! example against the output of `serverless print --format json`.

use crate::config::ServiceConfig;
use crate::error::{TimberError, TimberResult};
use crate::host::{overwrite_resource, ServiceHost};
use crate::types::ResourceDefinition;

/// Stage used when neither the options nor the provider name one
pub const DEFAULT_STAGE: &str = "dev";
/// Region used when neither the options nor the provider name one
pub const DEFAULT_REGION: &str = "us-east-1";

/// Command line style overrides, taking precedence over the provider block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostOptions {
    pub stage: Option<String>,
    pub region: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DocumentHost {
    framework_version: String,
    document: ServiceConfig,
    options: HostOptions,
    messages: Vec<String>,
}

impl DocumentHost {
    pub fn new(
        framework_version: impl Into<String>,
        document: ServiceConfig,
        options: HostOptions,
    ) -> Self {
        Self {
            framework_version: framework_version.into(),
            document,
            options,
            messages: Vec::new(),
        }
    }

    /// Build a host from the JSON text of a service document.
    pub fn from_json(
        framework_version: impl Into<String>,
        json: &str,
        options: HostOptions,
    ) -> TimberResult<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        if !value.is_object() {
            return Err(TimberError::invalid_config(
                "service document must be a JSON object",
            ));
        }
        let document: ServiceConfig = serde_json::from_value(value)?;
        Ok(Self::new(framework_version, document, options))
    }

    pub fn document(&self) -> &ServiceConfig {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut ServiceConfig {
        &mut self.document
    }

    pub fn into_document(self) -> ServiceConfig {
        self.document
    }

    /// Messages passed to [`ServiceHost::log`], oldest first
    pub fn messages(&self) -> &[String] {
        &self.messages
    }
}

impl ServiceHost for DocumentHost {
    fn framework_version(&self) -> &str {
        &self.framework_version
    }

    fn service(&self) -> &ServiceConfig {
        &self.document
    }

    fn stage(&self) -> String {
        self.options
            .stage
            .as_deref()
            .or(self.document.provider.stage.as_deref())
            .unwrap_or(DEFAULT_STAGE)
            .to_string()
    }

    fn region(&self) -> String {
        self.options
            .region
            .as_deref()
            .or(self.document.provider.region.as_deref())
            .unwrap_or(DEFAULT_REGION)
            .to_string()
    }

    fn set_resource(&mut self, logical_id: &str, resource: ResourceDefinition) {
        overwrite_resource(self.document.resources_mut(), logical_id, resource);
    }

    fn log(&mut self, message: &str) {
        log::info!("{message}");
        self.messages.push(message.to_string());
    }
}
