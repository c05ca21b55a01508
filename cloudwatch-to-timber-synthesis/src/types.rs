//! Typed CloudFormation records produced by the synthesizer.
//!
//! Resources serialize to the `{Type, Properties, DependsOn}` shape the host
//! framework merges into its compiled template. Resources already present in
//! a service document are kept as opaque JSON so a load/save cycle never
//! drops fields we do not model.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Logical id of the forwarder's execution role
pub const ROLE_RESOURCE: &str = "TimberRole";
/// Logical id of the forwarder function
pub const FUNCTION_RESOURCE: &str = "CloudwatchToTimber";
/// Logical id of the permission letting CloudWatch Logs invoke the forwarder
pub const PERMISSION_RESOURCE: &str = "CloudwatchToTimberPermission";
/// Appended to a log group's logical id to key its subscription filter
pub const SUBSCRIPTION_FILTER_SUFFIX: &str = "ToTimber";

pub const POLICY_VERSION: &str = "2012-10-17";

/// Logical id of the subscription filter attached to a log group
pub fn subscription_filter_logical_id(log_group_logical_id: &str) -> String {
    format!("{log_group_logical_id}{SUBSCRIPTION_FILTER_SUFFIX}")
}

/// CloudFormation intrinsic functions used by the generated resources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Intrinsic {
    #[serde(rename = "Fn::GetAtt")]
    GetAtt(String, String),
    #[serde(rename = "Fn::Join")]
    Join(String, Vec<JoinPart>),
    #[serde(rename = "Ref")]
    Ref(String),
}

impl Intrinsic {
    /// `Fn::GetAtt [logical_id, Arn]`
    pub fn arn_of(logical_id: &str) -> Self {
        Self::GetAtt(logical_id.to_string(), "Arn".to_string())
    }

    pub fn reference(name: &str) -> Self {
        Self::Ref(name.to_string())
    }

    pub fn join(delimiter: &str, parts: Vec<JoinPart>) -> Self {
        Self::Join(delimiter.to_string(), parts)
    }
}

/// One element of an `Fn::Join` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JoinPart {
    Literal(String),
    Intrinsic(Intrinsic),
}

impl From<&str> for JoinPart {
    fn from(value: &str) -> Self {
        Self::Literal(value.to_string())
    }
}

impl From<String> for JoinPart {
    fn from(value: String) -> Self {
        Self::Literal(value)
    }
}

impl From<Intrinsic> for JoinPart {
    fn from(value: Intrinsic) -> Self {
        Self::Intrinsic(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    Allow,
    Deny,
}

/// IAM policy document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    pub version: String,
    pub statement: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Statement {
    pub effect: Effect,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub principal: Option<Principal>,
    pub action: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Principal {
    pub service: Vec<String>,
}

/// Policy embedded in a role's `Policies` list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InlinePolicy {
    pub policy_name: String,
    pub policy_document: PolicyDocument,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RoleProperties {
    pub role_name: String,
    pub assume_role_policy_document: PolicyDocument,
    pub path: String,
    pub policies: Vec<InlinePolicy>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FunctionCode {
    pub s3_bucket: String,
    pub s3_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FunctionEnvironment {
    pub variables: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FunctionProperties {
    pub code: FunctionCode,
    pub function_name: String,
    pub handler: String,
    pub memory_size: u32,
    pub role: Intrinsic,
    pub runtime: String,
    pub timeout: u32,
    pub environment: FunctionEnvironment,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PermissionProperties {
    pub function_name: Intrinsic,
    pub action: String,
    pub principal: Intrinsic,
    pub source_arn: Intrinsic,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SubscriptionFilterProperties {
    pub destination_arn: Intrinsic,
    pub filter_pattern: String,
    pub log_group_name: String,
}

/// Resource type together with its properties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "Type", content = "Properties")]
pub enum ResourceKind {
    #[serde(rename = "AWS::IAM::Role")]
    Role(RoleProperties),
    #[serde(rename = "AWS::Lambda::Function")]
    Function(FunctionProperties),
    #[serde(rename = "AWS::Lambda::Permission")]
    Permission(PermissionProperties),
    #[serde(rename = "AWS::Logs::SubscriptionFilter")]
    SubscriptionFilter(SubscriptionFilterProperties),
}

impl ResourceKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Role(_) => "AWS::IAM::Role",
            Self::Function(_) => "AWS::Lambda::Function",
            Self::Permission(_) => "AWS::Lambda::Permission",
            Self::SubscriptionFilter(_) => "AWS::Logs::SubscriptionFilter",
        }
    }
}

/// A complete resource entry of the template's `Resources` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDefinition {
    #[serde(flatten)]
    pub kind: ResourceKind,
    #[serde(rename = "DependsOn", default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
}

impl ResourceDefinition {
    pub fn new(kind: ResourceKind) -> Self {
        Self {
            kind,
            depends_on: Vec::new(),
        }
    }

    #[must_use]
    pub fn depends_on<I, S>(mut self, logical_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.depends_on
            .extend(logical_ids.into_iter().map(Into::into));
        self
    }

    pub fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }
}

/// An entry of a service's resource mapping.
///
/// Deserialization always yields [`TemplateResource::Existing`]; only the
/// synthesizer produces [`TemplateResource::Synthesized`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TemplateResource {
    Synthesized(ResourceDefinition),
    Existing(serde_json::Value),
}

impl<'de> Deserialize<'de> for TemplateResource {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        serde_json::Value::deserialize(deserializer).map(Self::Existing)
    }
}

impl From<ResourceDefinition> for TemplateResource {
    fn from(value: ResourceDefinition) -> Self {
        Self::Synthesized(value)
    }
}

/// The `Resources` mapping, keyed by logical id
pub type Resources = BTreeMap<String, TemplateResource>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_intrinsics_serialize_as_cloudformation_functions() {
        assert_eq!(
            serde_json::to_value(Intrinsic::arn_of("TimberRole")).unwrap(),
            json!({"Fn::GetAtt": ["TimberRole", "Arn"]})
        );
        assert_eq!(
            serde_json::to_value(Intrinsic::reference("AWS::Region")).unwrap(),
            json!({"Ref": "AWS::Region"})
        );

        let join = Intrinsic::join(
            ".",
            vec!["logs".into(), Intrinsic::reference("AWS::Region").into()],
        );
        assert_eq!(
            serde_json::to_value(join).unwrap(),
            json!({"Fn::Join": [".", ["logs", {"Ref": "AWS::Region"}]]})
        );
    }

    #[test]
    fn test_resource_definition_shape() {
        let resource = ResourceDefinition::new(ResourceKind::SubscriptionFilter(
            SubscriptionFilterProperties {
                destination_arn: Intrinsic::arn_of(FUNCTION_RESOURCE),
                filter_pattern: String::new(),
                log_group_name: "/aws/lambda/svc-dev-hello".to_string(),
            },
        ))
        .depends_on([FUNCTION_RESOURCE, PERMISSION_RESOURCE]);

        let value = serde_json::to_value(&resource).unwrap();
        assert_eq!(value["Type"], "AWS::Logs::SubscriptionFilter");
        assert_eq!(value["Properties"]["FilterPattern"], "");
        assert_eq!(value["Properties"]["LogGroupName"], "/aws/lambda/svc-dev-hello");
        assert_eq!(
            value["DependsOn"],
            json!(["CloudwatchToTimber", "CloudwatchToTimberPermission"])
        );
    }

    #[test]
    fn test_depends_on_omitted_when_empty() {
        let resource = ResourceDefinition::new(ResourceKind::SubscriptionFilter(
            SubscriptionFilterProperties {
                destination_arn: Intrinsic::arn_of(FUNCTION_RESOURCE),
                filter_pattern: String::new(),
                log_group_name: "group".to_string(),
            },
        ));
        let value = serde_json::to_value(&resource).unwrap();
        assert!(value.get("DependsOn").is_none());
    }

    #[test]
    fn test_function_code_uses_s3_casing() {
        let code = FunctionCode {
            s3_bucket: "bucket".to_string(),
            s3_key: "key.zip".to_string(),
        };
        assert_eq!(
            serde_json::to_value(code).unwrap(),
            json!({"S3Bucket": "bucket", "S3Key": "key.zip"})
        );
    }

    #[test]
    fn test_existing_resources_deserialize_opaquely() {
        let raw = json!({
            "Type": "AWS::IAM::Role",
            "Properties": {"RoleName": "mine", "Tags": [{"Key": "team", "Value": "infra"}]}
        });
        let resource: TemplateResource = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(resource, TemplateResource::Existing(raw.clone()));
        assert_eq!(serde_json::to_value(&resource).unwrap(), raw);
    }

    #[test]
    fn test_subscription_filter_logical_id() {
        assert_eq!(
            subscription_filter_logical_id("HelloLogGroup"),
            "HelloLogGroupToTimber"
        );
    }
}
