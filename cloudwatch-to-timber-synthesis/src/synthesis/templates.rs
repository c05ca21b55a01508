//! Resource templates for the log forwarding stack.
//!
//! Every builder is a pure function of its string arguments: the same input
//! always yields the same [`ResourceDefinition`].

use std::collections::BTreeMap;

use crate::types::{
    Effect, FunctionCode, FunctionEnvironment, FunctionProperties, InlinePolicy, Intrinsic,
    JoinPart, PermissionProperties, PolicyDocument, Principal, ResourceDefinition, ResourceKind,
    RoleProperties, Statement, SubscriptionFilterProperties, FUNCTION_RESOURCE,
    PERMISSION_RESOURCE, POLICY_VERSION, ROLE_RESOURCE,
};

/// Service principal allowed to assume the forwarder role
pub const LAMBDA_SERVICE_PRINCIPAL: &str = "lambda.amazonaws.com";
pub const ROLE_POLICY_NAME: &str = "cloudwatch";
/// Log actions granted to the forwarder role
pub const ROLE_LOG_ACTIONS: [&str; 3] = [
    "logs:CreateLogGroup",
    "logs:CreateLogStream",
    "logs:PutLogEvents",
];
// Log group names are unknown until deploy time, so the grant covers all of them.
pub const ROLE_LOG_RESOURCE: &str = "arn:aws:logs:*:*:*";

/// Published forwarder artifact
pub const FORWARDER_CODE_BUCKET: &str = "takeshape-api.dev.assets";
pub const FORWARDER_CODE_KEY: &str = "timber-cloudwatch-logs-lambda-function-latest.zip";
pub const FORWARDER_HANDLER: &str = "main.lambda_handler";
pub const FORWARDER_RUNTIME: &str = "python3.6";
pub const FORWARDER_MEMORY_SIZE: u32 = 128;
pub const FORWARDER_TIMEOUT: u32 = 6;
/// Environment variable the forwarder reads its Timber API key from
pub const API_KEY_VARIABLE: &str = "TIMBER_API_KEY";

/// Forward every log event
pub const MATCH_ALL_PATTERN: &str = "";

/// Build the execution role the forwarder runs under.
///
/// The role may be assumed by Lambda only and is allowed to create log
/// groups and streams and to put log events.
pub fn build_access_role(service_name: &str, stage: &str, region: &str) -> ResourceDefinition {
    let trust_policy = PolicyDocument {
        version: POLICY_VERSION.to_string(),
        statement: vec![Statement {
            effect: Effect::Allow,
            principal: Some(Principal {
                service: vec![LAMBDA_SERVICE_PRINCIPAL.to_string()],
            }),
            action: vec!["sts:AssumeRole".to_string()],
            resource: None,
        }],
    };

    let log_policy = PolicyDocument {
        version: POLICY_VERSION.to_string(),
        statement: vec![Statement {
            effect: Effect::Allow,
            principal: None,
            action: ROLE_LOG_ACTIONS.iter().map(ToString::to_string).collect(),
            resource: Some(vec![ROLE_LOG_RESOURCE.to_string()]),
        }],
    };

    ResourceDefinition::new(ResourceKind::Role(RoleProperties {
        role_name: format!("{service_name}-{stage}-{region}-cloudWatchToTimberRole"),
        assume_role_policy_document: trust_policy,
        path: "/".to_string(),
        policies: vec![InlinePolicy {
            policy_name: ROLE_POLICY_NAME.to_string(),
            policy_document: log_policy,
        }],
    }))
}

/// Build the Lambda function that relays CloudWatch log events to Timber.
///
/// `api_key` is placed in the function environment as-is.
pub fn build_forwarder_function(
    service_name: &str,
    stage: &str,
    api_key: &str,
) -> ResourceDefinition {
    let mut variables = BTreeMap::new();
    variables.insert(API_KEY_VARIABLE.to_string(), api_key.to_string());

    ResourceDefinition::new(ResourceKind::Function(FunctionProperties {
        code: FunctionCode {
            s3_bucket: FORWARDER_CODE_BUCKET.to_string(),
            s3_key: FORWARDER_CODE_KEY.to_string(),
        },
        function_name: format!("{service_name}-{stage}-cloudwatchLogsToTimber"),
        handler: FORWARDER_HANDLER.to_string(),
        memory_size: FORWARDER_MEMORY_SIZE,
        role: Intrinsic::arn_of(ROLE_RESOURCE),
        runtime: FORWARDER_RUNTIME.to_string(),
        timeout: FORWARDER_TIMEOUT,
        environment: FunctionEnvironment { variables },
    }))
    .depends_on([ROLE_RESOURCE])
}

/// Build the permission letting CloudWatch Logs invoke the forwarder.
///
/// Only log groups of functions named `{function_prefix}*` may trigger it.
pub fn build_invoke_permission(function_prefix: &str) -> ResourceDefinition {
    let region = || JoinPart::from(Intrinsic::reference("AWS::Region"));

    let principal = Intrinsic::join(
        ".",
        vec!["logs".into(), region(), "amazonaws".into(), "com".into()],
    );

    let source_arn = Intrinsic::join(
        "",
        vec![
            "arn:aws:logs:".into(),
            region(),
            ":".into(),
            Intrinsic::reference("AWS::AccountId").into(),
            format!(":log-group:/aws/lambda/{function_prefix}*").into(),
        ],
    );

    ResourceDefinition::new(ResourceKind::Permission(PermissionProperties {
        function_name: Intrinsic::arn_of(FUNCTION_RESOURCE),
        action: "lambda:InvokeFunction".to_string(),
        principal,
        source_arn,
    }))
}

/// Build the subscription filter streaming one log group into the forwarder.
///
/// The filter waits for the forwarder, its permission, and the log group
/// itself before attaching.
pub fn build_subscription_filter(
    log_group_name: &str,
    log_group_logical_id: &str,
) -> ResourceDefinition {
    ResourceDefinition::new(ResourceKind::SubscriptionFilter(
        SubscriptionFilterProperties {
            destination_arn: Intrinsic::arn_of(FUNCTION_RESOURCE),
            filter_pattern: MATCH_ALL_PATTERN.to_string(),
            log_group_name: log_group_name.to_string(),
        },
    ))
    .depends_on([FUNCTION_RESOURCE, PERMISSION_RESOURCE, log_group_logical_id])
}
