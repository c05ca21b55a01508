//! Service document and plugin configuration model.
//!
//! Only the parts of a serverless service the plugin reads are typed. All
//! other keys are carried through `extra` maps so a document written back
//! out matches the one read in, apart from the injected resources.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::types::Resources;

/// Key of the plugin's block under `custom`
pub const CUSTOM_CONFIG_KEY: &str = "timber";
/// Per-function flag; `false` disables forwarding for that function
pub const FUNCTION_FLAG_KEY: &str = "timber";

/// Settings read from `custom.timber`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimberConfig {
    #[serde(default)]
    pub api_key: Option<String>,
}

impl TimberConfig {
    /// Read the plugin block out of a service's `custom` section.
    ///
    /// A missing block, or one that does not deserialize (for example a
    /// numeric `apiKey`), yields the default config.
    pub fn from_custom(custom: Option<&Value>) -> Self {
        let Some(block) = custom.and_then(|c| c.get(CUSTOM_CONFIG_KEY)) else {
            return Self::default();
        };
        match serde_json::from_value(block.clone()) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Ignoring unreadable custom.{CUSTOM_CONFIG_KEY} block: {e}");
                Self::default()
            }
        }
    }

    /// The API key, if present and non-empty
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|key| !key.is_empty())
    }
}

/// `service:` is either a bare name or a mapping with a `name` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ServiceName {
    Name(String),
    Described {
        name: String,
        #[serde(flatten)]
        extra: Map<String, Value>,
    },
}

impl ServiceName {
    pub fn name(&self) -> &str {
        match self {
            Self::Name(name) | Self::Described { name, .. } => name,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProviderConfig {
    pub fn is_empty(&self) -> bool {
        self.stage.is_none() && self.region.is_none() && self.extra.is_empty()
    }
}

/// A single function's spec, kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FunctionSpec(pub Value);

impl FunctionSpec {
    /// True only when the spec sets `timber: false` as a boolean.
    pub fn opts_out(&self) -> bool {
        matches!(self.0.get(FUNCTION_FLAG_KEY), Some(Value::Bool(false)))
    }
}

/// The `functions:` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Functions {
    Mapping(BTreeMap<String, FunctionSpec>),
    /// Anything that is not a mapping of name to spec
    Other(Value),
}

impl Functions {
    pub fn as_mapping(&self) -> Option<&BTreeMap<String, FunctionSpec>> {
        match self {
            Self::Mapping(functions) => Some(functions),
            Self::Other(_) => None,
        }
    }
}

/// The `resources:` section, of which only `Resources` is typed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourcesSection {
    #[serde(rename = "Resources", default, skip_serializing_if = "BTreeMap::is_empty")]
    pub resources: Resources,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A resolved serverless service document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub service: ServiceName,
    #[serde(default, skip_serializing_if = "ProviderConfig::is_empty")]
    pub provider: ProviderConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub functions: Option<Functions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<ResourcesSection>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ServiceConfig {
    pub fn service_name(&self) -> &str {
        self.service.name()
    }

    /// Declared functions, or `None` when the section is absent or not a mapping
    pub fn function_mapping(&self) -> Option<&BTreeMap<String, FunctionSpec>> {
        self.functions.as_ref().and_then(Functions::as_mapping)
    }

    pub fn timber_config(&self) -> TimberConfig {
        TimberConfig::from_custom(self.custom.as_ref())
    }

    /// Set `custom.timber.apiKey`, creating the blocks as needed.
    ///
    /// A `custom` or `custom.timber` entry that is not a mapping is replaced.
    pub fn set_api_key(&mut self, api_key: &str) {
        let custom = self
            .custom
            .get_or_insert_with(|| Value::Object(Map::new()));
        if !custom.is_object() {
            *custom = Value::Object(Map::new());
        }
        if let Value::Object(custom) = custom {
            let block = custom
                .entry(CUSTOM_CONFIG_KEY)
                .or_insert_with(|| Value::Object(Map::new()));
            if !block.is_object() {
                *block = Value::Object(Map::new());
            }
            if let Value::Object(block) = block {
                block.insert("apiKey".to_string(), Value::String(api_key.to_string()));
            }
        }
    }

    pub fn resources(&self) -> Option<&Resources> {
        self.resources.as_ref().map(|section| &section.resources)
    }

    /// The `resources.Resources` mapping, created on first use.
    pub fn resources_mut(&mut self) -> &mut Resources {
        &mut self.resources.get_or_insert_with(Default::default).resources
    }
}
