//! Packaging step: inject the forwarding resources into the service template

use std::fmt;

use crate::host::ServiceHost;
use crate::synthesis::{
    build_access_role, build_forwarder_function, build_invoke_permission,
    build_subscription_filter,
};
use crate::types::{
    subscription_filter_logical_id, FUNCTION_RESOURCE, PERMISSION_RESOURCE, ROLE_RESOURCE,
};

/// Why a packaging pass left the template untouched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NoFunctions,
    MissingApiKey,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoFunctions => f.write_str("Timber: No functions to log"),
            Self::MissingApiKey => f.write_str("Timber: missing apiKey"),
        }
    }
}

/// Result of a packaging pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForwardingOutcome {
    Skipped(SkipReason),
    /// Logical ids written to the resource mapping, in insertion order
    Applied { inserted: Vec<String> },
}

impl<H: ServiceHost> super::service::TimberPlugin<H> {
    /// Add the Timber role, forwarder, permission and one subscription filter
    /// per function to the service's resources.
    ///
    /// When the service declares no functions or no API key is configured,
    /// the reason is logged through the host and nothing is written.
    pub fn add_timber(&mut self) -> ForwardingOutcome {
        let function_names: Option<Vec<(String, bool)>> = self
            .host
            .service()
            .function_mapping()
            .filter(|functions| !functions.is_empty())
            .map(|functions| {
                functions
                    .iter()
                    .map(|(name, spec)| (name.clone(), spec.opts_out()))
                    .collect()
            });
        let Some(function_names) = function_names else {
            return self.skip(SkipReason::NoFunctions);
        };

        let config = self.host.service().timber_config();
        let Some(api_key) = config.api_key() else {
            return self.skip(SkipReason::MissingApiKey);
        };

        let service_name = self.host.service_name().to_string();
        let stage = self.host.stage();
        let region = self.host.region();
        let function_prefix = format!("{service_name}-{stage}-");

        let mut inserted = Vec::with_capacity(function_names.len() + 3);

        self.host.set_resource(
            ROLE_RESOURCE,
            build_access_role(&service_name, &stage, &region),
        );
        inserted.push(ROLE_RESOURCE.to_string());

        self.host.set_resource(
            FUNCTION_RESOURCE,
            build_forwarder_function(&service_name, &stage, api_key),
        );
        inserted.push(FUNCTION_RESOURCE.to_string());

        self.host
            .set_resource(PERMISSION_RESOURCE, build_invoke_permission(&function_prefix));
        inserted.push(PERMISSION_RESOURCE.to_string());

        for (function_name, opts_out) in function_names {
            if opts_out {
                log::debug!("Function {function_name} opted out of Timber forwarding");
                continue;
            }
            let log_group_name = self
                .host
                .log_group_name(&format!("{function_prefix}{function_name}"));
            let log_group_logical_id = self.host.log_group_logical_id(&function_name);
            let logical_id = subscription_filter_logical_id(&log_group_logical_id);

            self.host.set_resource(
                &logical_id,
                build_subscription_filter(&log_group_name, &log_group_logical_id),
            );
            log::debug!("Forwarding {log_group_name} to Timber via {logical_id}");
            inserted.push(logical_id);
        }

        log::debug!(
            "Injected {} Timber resources into {service_name}-{stage}",
            inserted.len()
        );
        ForwardingOutcome::Applied { inserted }
    }

    fn skip(&mut self, reason: SkipReason) -> ForwardingOutcome {
        self.host.log(&reason.to_string());
        ForwardingOutcome::Skipped(reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServiceConfig;
    use crate::error::TimberError;
    use crate::plugin::{TimberPlugin, PACKAGE_HOOK};
    use crate::types::{ResourceDefinition, ResourceKind};
    use serde_json::json;

    /// Host that records every call instead of touching a document
    #[derive(Debug)]
    struct RecordingHost {
        version: String,
        service: ServiceConfig,
        writes: Vec<(String, ResourceDefinition)>,
        messages: Vec<String>,
    }

    impl RecordingHost {
        fn new(service: serde_json::Value) -> Self {
            Self {
                version: "1.26.1".to_string(),
                service: serde_json::from_value(service).unwrap(),
                writes: Vec::new(),
                messages: Vec::new(),
            }
        }
    }

    impl ServiceHost for RecordingHost {
        fn framework_version(&self) -> &str {
            &self.version
        }

        fn service(&self) -> &ServiceConfig {
            &self.service
        }

        fn stage(&self) -> String {
            "prod".to_string()
        }

        fn region(&self) -> String {
            "eu-west-1".to_string()
        }

        fn set_resource(&mut self, logical_id: &str, resource: ResourceDefinition) {
            self.writes.push((logical_id.to_string(), resource));
        }

        fn log(&mut self, message: &str) {
            self.messages.push(message.to_string());
        }
    }

    fn plugin(service: serde_json::Value) -> TimberPlugin<RecordingHost> {
        TimberPlugin::new(RecordingHost::new(service)).unwrap()
    }

    #[test]
    fn test_rejects_old_framework() {
        let mut host = RecordingHost::new(json!({"service": "orders"}));
        host.version = "1.11.0".to_string();
        assert!(matches!(
            TimberPlugin::new(host),
            Err(TimberError::IncompatibleFramework { .. })
        ));
    }

    #[test]
    fn test_no_functions_is_a_logged_no_op() {
        for functions in [json!(null), json!({}), json!(["hello"]), json!("hello")] {
            let mut plugin = plugin(json!({
                "service": "orders",
                "functions": functions,
                "custom": {"timber": {"apiKey": "key"}}
            }));
            assert_eq!(
                plugin.add_timber(),
                ForwardingOutcome::Skipped(SkipReason::NoFunctions)
            );
            assert!(plugin.host().writes.is_empty());
            assert_eq!(plugin.host().messages, ["Timber: No functions to log"]);
        }
    }

    #[test]
    fn test_missing_api_key_is_a_logged_no_op() {
        let mut plugin = plugin(json!({
            "service": "orders",
            "functions": {"hello": {"handler": "handler.hello"}}
        }));
        assert_eq!(
            plugin.add_timber(),
            ForwardingOutcome::Skipped(SkipReason::MissingApiKey)
        );
        assert!(plugin.host().writes.is_empty());
        assert_eq!(plugin.host().messages, ["Timber: missing apiKey"]);
    }

    #[test]
    fn test_opted_out_function_gets_no_filter() {
        let mut plugin = plugin(json!({
            "service": "orders",
            "functions": {
                "a": {"handler": "handler.a"},
                "b": {"handler": "handler.b", "timber": false}
            },
            "custom": {"timber": {"apiKey": "key"}}
        }));

        let outcome = plugin.add_timber();
        assert_eq!(
            outcome,
            ForwardingOutcome::Applied {
                inserted: vec![
                    "TimberRole".to_string(),
                    "CloudwatchToTimber".to_string(),
                    "CloudwatchToTimberPermission".to_string(),
                    "ALogGroupToTimber".to_string(),
                ]
            }
        );
        assert_eq!(plugin.host().writes.len(), 4);
        assert!(plugin.host().messages.is_empty());
    }

    #[test]
    fn test_uses_host_identity_for_names() {
        let mut plugin = plugin(json!({
            "service": "orders",
            "functions": {"create-order": {}},
            "custom": {"timber": {"apiKey": "key"}}
        }));
        plugin.add_timber();

        let writes = &plugin.host().writes;
        let ResourceKind::Role(role) = &writes[0].1.kind else {
            panic!("first write should be the role");
        };
        assert_eq!(role.role_name, "orders-prod-eu-west-1-cloudWatchToTimberRole");

        let ResourceKind::Function(function) = &writes[1].1.kind else {
            panic!("second write should be the forwarder");
        };
        assert_eq!(function.function_name, "orders-prod-cloudwatchLogsToTimber");

        let (logical_id, filter) = &writes[3];
        assert_eq!(logical_id, "CreateDashorderLogGroupToTimber");
        let ResourceKind::SubscriptionFilter(props) = &filter.kind else {
            panic!("fourth write should be a subscription filter");
        };
        assert_eq!(props.log_group_name, "/aws/lambda/orders-prod-create-order");
        assert_eq!(
            filter.depends_on,
            ["CloudwatchToTimber", "CloudwatchToTimberPermission", "CreateDashorderLogGroup"]
        );
    }

    #[test]
    fn test_run_hook_dispatch() {
        let mut plugin = plugin(json!({
            "service": "orders",
            "functions": {"hello": {}},
            "custom": {"timber": {"apiKey": "key"}}
        }));
        assert_eq!(plugin.hooks(), [PACKAGE_HOOK]);
        assert!(plugin.run_hook("deploy:deploy").is_none());
        assert!(plugin.host().writes.is_empty());

        let outcome = plugin.run_hook(PACKAGE_HOOK);
        assert!(matches!(outcome, Some(ForwardingOutcome::Applied { .. })));
        assert_eq!(plugin.host().writes.len(), 4);
    }
}
