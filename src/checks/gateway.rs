//! API Gateway checks: the REST API itself, deployed stages, resource
//! methods and configured authorizers.

use async_trait::async_trait;
use aws_sdk_apigateway::types::{Authorizer, Resource, Stage};
use aws_sdk_apigateway::Client;
use log::debug;

use super::{find_by_name, DomainCheck};
use crate::types::{CheckLog, DeploymentInfo};

pub struct GatewayCheck {
    pub apigw: Client,
}

#[async_trait]
impl DomainCheck for GatewayCheck {
    fn title(&self) -> &'static str {
        "API GATEWAY"
    }

    async fn run(&self, info: &DeploymentInfo) -> CheckLog {
        let mut log = CheckLog::new();

        log.section("REST API");
        let api_name = info.resource_name("api");
        let apis = match self.apigw.get_rest_apis().send().await {
            Ok(output) => output.items.unwrap_or_default(),
            Err(err) => {
                log.fail(format!(
                    "List REST APIs: {}",
                    aws_sdk_apigateway::Error::from(err)
                ));
                return log;
            }
        };
        let Some(api) = find_by_name(&apis, &api_name, |a| a.name()) else {
            log.fail(format!("REST API '{}' not found", api_name));
            return log;
        };
        let api_id = api.id().unwrap_or_default().to_string();
        log.pass(format!("REST API '{}' exists (ID: {})", api_name, api_id));
        debug!("Checking stages and resources for API: {}", api_id);

        log.section("API Stages");
        match self.apigw.get_stages().rest_api_id(&api_id).send().await {
            Ok(output) => verify_stages(&mut log, output.item()),
            Err(err) => log.fail(format!(
                "Get stages: {}",
                aws_sdk_apigateway::Error::from(err)
            )),
        }

        log.section("API Resources");
        match self.apigw.get_resources().rest_api_id(&api_id).send().await {
            Ok(output) => verify_resources(&mut log, output.items()),
            Err(err) => log.fail(format!(
                "Get resources: {}",
                aws_sdk_apigateway::Error::from(err)
            )),
        }

        log.section("Authorizers");
        match self
            .apigw
            .get_authorizers()
            .rest_api_id(&api_id)
            .send()
            .await
        {
            Ok(output) => verify_authorizers(&mut log, output.items()),
            Err(err) => log.warn(format!(
                "Get authorizers: {}",
                aws_sdk_apigateway::Error::from(err)
            )),
        }

        log
    }
}

fn verify_stages(log: &mut CheckLog, stages: &[Stage]) {
    for stage in stages {
        log.pass(format!(
            "Stage '{}' deployed",
            stage.stage_name().unwrap_or_default()
        ));
        if stage.tracing_enabled() {
            log.pass("  X-Ray tracing enabled");
        }
        if stage.cache_cluster_enabled() {
            log.pass(format!(
                "  Caching enabled (size: {})",
                stage
                    .cache_cluster_size()
                    .map(|s| s.as_str())
                    .unwrap_or("unknown")
            ));
        }
    }
}

fn verify_resources(log: &mut CheckLog, resources: &[Resource]) {
    let mut method_count = 0;
    for resource in resources {
        if let Some(methods) = resource.resource_methods() {
            for method in methods.keys() {
                method_count += 1;
                log.pass(format!(
                    "  {} {}",
                    method,
                    resource.path().unwrap_or_default()
                ));
            }
        }
    }
    if method_count == 0 {
        log.warn("No API methods found");
    }
}

fn verify_authorizers(log: &mut CheckLog, authorizers: &[Authorizer]) {
    if authorizers.is_empty() {
        log.warn("No authorizers configured");
        return;
    }
    for authorizer in authorizers {
        log.pass(format!(
            "Authorizer '{}' (type: {})",
            authorizer.name().unwrap_or_default(),
            authorizer
                .r#type()
                .map(|t| t.as_str())
                .unwrap_or("unknown")
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::testing::canned_response;
    use crate::types::DeploymentInfoBuilder;
    use aws_sdk_apigateway::config::retry::RetryConfig;
    use aws_sdk_apigateway::config::{BehaviorVersion, Credentials, Region};
    use aws_sdk_apigateway::types::{AuthorizerType, CacheClusterSize, Method};
    use aws_smithy_runtime::client::http::test_util::{ReplayEvent, StaticReplayClient};

    fn test_client(events: Vec<ReplayEvent>) -> Client {
        let config = aws_sdk_apigateway::Config::builder()
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
    async fn test_run_api_list_error_is_single_failure() {
        let check = GatewayCheck {
            apigw: test_client(vec![canned_response(
                400,
                r#"{"message":"access denied"}"#,
            )]),
        };
        let log = check.run(&info()).await;
        assert_eq!(log.failed(), 1);
        assert_eq!(log.total(), 1);
        assert!(log
            .results()
            .all(|r| r.message.starts_with("List REST APIs: ")));
    }

    #[tokio::test]
    async fn test_run_missing_api_is_single_failure() {
        let check = GatewayCheck {
            apigw: test_client(vec![canned_response(200, r#"{"item":[]}"#)]),
        };
        let log = check.run(&info()).await;
        assert_eq!(log.failed(), 1);
        assert_eq!(log.total(), 1);
        let messages: Vec<&str> = log.results().map(|r| r.message.as_str()).collect();
        assert_eq!(messages, vec!["REST API 'acme-prod-webapp-api' not found"]);
    }

    #[test]
    fn test_verify_stages_reports_tracing_and_caching() {
        let stage = Stage::builder()
            .stage_name("prod")
            .tracing_enabled(true)
            .cache_cluster_enabled(true)
            .cache_cluster_size(CacheClusterSize::from("0.5"))
            .build();
        let mut log = CheckLog::new();
        verify_stages(&mut log, &[stage]);
        let messages: Vec<&str> = log.results().map(|r| r.message.as_str()).collect();
        assert_eq!(messages[0], "Stage 'prod' deployed");
        assert_eq!(messages[1], "  X-Ray tracing enabled");
        assert_eq!(messages[2], "  Caching enabled (size: 0.5)");
    }

    #[test]
    fn test_verify_stages_without_extras_only_reports_deployment() {
        let stage = Stage::builder().stage_name("dev").build();
        let mut log = CheckLog::new();
        verify_stages(&mut log, &[stage]);
        assert_eq!(log.total(), 1);
    }

    #[test]
    fn test_verify_resources_lists_each_method() {
        let resource = Resource::builder()
            .path("/users")
            .resource_methods("GET", Method::builder().build())
            .resource_methods("POST", Method::builder().build())
            .build();
        let mut log = CheckLog::new();
        verify_resources(&mut log, &[resource]);
        assert_eq!(log.passed(), 2);
        assert!(log.results().all(|r| r.message.ends_with(" /users")));
    }

    #[test]
    fn test_verify_resources_empty_is_warning() {
        let mut log = CheckLog::new();
        verify_resources(&mut log, &[]);
        assert_eq!(log.warned(), 1);
        assert!(!log.has_failures());
    }

    #[test]
    fn test_verify_authorizers_missing_is_warning() {
        let mut log = CheckLog::new();
        verify_authorizers(&mut log, &[]);
        assert_eq!(log.warned(), 1);
        assert!(!log.has_failures());
    }

    #[test]
    fn test_verify_authorizers_present() {
        let authorizer = Authorizer::builder()
            .name("cognito")
            .r#type(AuthorizerType::CognitoUserPools)
            .build();
        let mut log = CheckLog::new();
        verify_authorizers(&mut log, &[authorizer]);
        assert_eq!(log.passed(), 1);
        assert!(log
            .results()
            .any(|r| r.message == "Authorizer 'cognito' (type: COGNITO_USER_POOLS)"));
    }
}
