//! Lambda checks: every function under the deployment prefix plus the shared
//! layers the functions are built on.

use async_trait::async_trait;
use aws_sdk_lambda::types::{FunctionConfiguration, LayersListItem};
use aws_sdk_lambda::Client;
use log::debug;

use super::DomainCheck;
use crate::types::{CheckLog, DeploymentInfo};

/// Layer name fragment shared by the runtime layers regardless of deployment.
const SHARED_LAYER_FRAGMENT: &str = "base-api";

pub struct FunctionsCheck {
    pub lambda: Client,
}

#[async_trait]
impl DomainCheck for FunctionsCheck {
    fn title(&self) -> &'static str {
        "LAMBDA FUNCTIONS"
    }

    async fn run(&self, info: &DeploymentInfo) -> CheckLog {
        let mut log = CheckLog::new();
        let prefix = info.resource_prefix();

        log.section("Functions");
        let mut pages = self.lambda.list_functions().into_paginator().send();
        let mut function_count = 0;
        while let Some(page) = pages.next().await {
            let output = match page {
                Ok(output) => output,
                Err(err) => {
                    log.fail(format!(
                        "List functions: {}",
                        aws_sdk_lambda::Error::from(err)
                    ));
                    return log;
                }
            };
            for function in output.functions() {
                if function
                    .function_name()
                    .is_some_and(|name| name.starts_with(&prefix))
                {
                    function_count += 1;
                    verify_function(&mut log, function);
                }
            }
        }
        debug!("Found {} functions with prefix {}", function_count, prefix);
        if function_count == 0 {
            log.warn(format!(
                "No Lambda functions found with prefix '{}'",
                prefix
            ));
        }

        log.section("Layers");
        match self.lambda.list_layers().send().await {
            Ok(output) => verify_layers(&mut log, output.layers(), &prefix),
            Err(err) => log.warn(format!(
                "List layers: {}",
                aws_sdk_lambda::Error::from(err)
            )),
        }

        log
    }
}

fn verify_function(log: &mut CheckLog, function: &FunctionConfiguration) {
    log.pass(format!(
        "Lambda '{}' ({}, {}MB, {})",
        function.function_name().unwrap_or_default(),
        function
            .runtime()
            .map(|r| r.as_str())
            .unwrap_or("unknown"),
        function.memory_size().unwrap_or_default(),
        function.state().map(|s| s.as_str()).unwrap_or("Unknown")
    ));
    if let Some(vpc) = function.vpc_config() {
        if !vpc.subnet_ids().is_empty() {
            log.pass(format!(
                "  VPC configured: {} subnets",
                vpc.subnet_ids().len()
            ));
        }
    }
}

fn verify_layers(log: &mut CheckLog, layers: &[LayersListItem], prefix: &str) {
    let mut found = false;
    for layer in layers {
        let name = layer.layer_name().unwrap_or_default();
        if name.contains(SHARED_LAYER_FRAGMENT) || name.contains(prefix) {
            found = true;
            log.pass(format!(
                "Layer '{}' (latest version: {})",
                name,
                layer
                    .latest_matching_version()
                    .map(|v| v.version())
                    .unwrap_or_default()
            ));
        }
    }
    if !found {
        log.warn("No webapp-related layers found");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::testing::canned_response;
    use crate::types::DeploymentInfoBuilder;
    use aws_sdk_lambda::config::retry::RetryConfig;
    use aws_sdk_lambda::config::{BehaviorVersion, Credentials, Region};
    use aws_sdk_lambda::types::{LayerVersionsListItem, Runtime, State, VpcConfigResponse};
    use aws_smithy_runtime::client::http::test_util::{ReplayEvent, StaticReplayClient};

    fn test_client(events: Vec<ReplayEvent>) -> Client {
        let config = aws_sdk_lambda::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .credentials_provider(Credentials::new("akid", "secret", None, None, "testing"))
            .retry_config(RetryConfig::disabled())
            .http_client(StaticReplayClient::new(events))
            .build();
        Client::from_conf(config)
    }

    fn info() -> DeploymentInfo {
        DeploymentInfoBuilder::default()
            .deployment_id("acme-prod".to_string())
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_run_function_list_error_is_single_failure() {
        let check = FunctionsCheck {
            lambda: test_client(vec![canned_response(
                400,
                r#"{"Message":"access denied"}"#,
            )]),
        };
        let log = check.run(&info()).await;
        assert_eq!(log.failed(), 1);
        assert_eq!(log.total(), 1);
        assert!(log
            .results()
            .all(|r| r.message.starts_with("List functions: ")));
    }

    #[tokio::test]
    async fn test_run_no_matching_functions_warns_without_failure() {
        let check = FunctionsCheck {
            lambda: test_client(vec![
                canned_response(200, r#"{"Functions":[]}"#),
                canned_response(200, r#"{"Layers":[]}"#),
            ]),
        };
        let log = check.run(&info()).await;
        assert!(!log.has_failures());
        assert_eq!(log.warned(), 2);
        let messages: Vec<&str> = log.results().map(|r| r.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "No Lambda functions found with prefix 'acme-prod-webapp'",
                "No webapp-related layers found"
            ]
        );
    }

    #[test]
    fn test_verify_function_reports_runtime_memory_and_state() {
        let function = FunctionConfiguration::builder()
            .function_name("acme-prod-webapp-user")
            .runtime(Runtime::from("provided.al2023"))
            .memory_size(128)
            .state(State::Active)
            .build();
        let mut log = CheckLog::new();
        verify_function(&mut log, &function);
        let messages: Vec<&str> = log.results().map(|r| r.message.as_str()).collect();
        assert_eq!(
            messages,
            vec!["Lambda 'acme-prod-webapp-user' (provided.al2023, 128MB, Active)"]
        );
    }

    #[test]
    fn test_verify_function_reports_vpc_attachment() {
        let function = FunctionConfiguration::builder()
            .function_name("acme-prod-webapp-message")
            .vpc_config(
                VpcConfigResponse::builder()
                    .subnet_ids("subnet-1")
                    .subnet_ids("subnet-2")
                    .build(),
            )
            .build();
        let mut log = CheckLog::new();
        verify_function(&mut log, &function);
        assert!(log
            .results()
            .any(|r| r.message == "  VPC configured: 2 subnets"));
    }

    #[test]
    fn test_verify_layers_matches_shared_fragment_and_prefix() {
        let layers = vec![
            LayersListItem::builder()
                .layer_name("base-api-deps")
                .latest_matching_version(LayerVersionsListItem::builder().version(3).build())
                .build(),
            LayersListItem::builder().layer_name("unrelated").build(),
        ];
        let mut log = CheckLog::new();
        verify_layers(&mut log, &layers, "acme-prod-webapp");
        assert_eq!(log.passed(), 1);
        assert_eq!(log.warned(), 0);
        assert!(log
            .results()
            .any(|r| r.message == "Layer 'base-api-deps' (latest version: 3)"));
    }

    #[test]
    fn test_verify_layers_none_matching_is_warning() {
        let layers = vec![LayersListItem::builder().layer_name("other").build()];
        let mut log = CheckLog::new();
        verify_layers(&mut log, &layers, "acme-prod-webapp");
        assert_eq!(log.warned(), 1);
        assert!(!log.has_failures());
    }
}
