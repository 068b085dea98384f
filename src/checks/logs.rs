//! CloudWatch Logs checks: the API Gateway access log group and the
//! per-function Lambda log groups.

use async_trait::async_trait;
use aws_sdk_cloudwatchlogs::types::LogGroup;
use aws_sdk_cloudwatchlogs::Client;

use super::DomainCheck;
use crate::types::{CheckLog, DeploymentInfo};

pub struct LogsCheck {
    pub logs: Client,
}

#[async_trait]
impl DomainCheck for LogsCheck {
    fn title(&self) -> &'static str {
        "CLOUDWATCH LOGGING"
    }

    async fn run(&self, info: &DeploymentInfo) -> CheckLog {
        let mut log = CheckLog::new();

        log.section("Log Groups");
        let expected_groups = [info.resource_name("apigw-logs")];
        for group_name in &expected_groups {
            match self
                .logs
                .describe_log_groups()
                .log_group_name_prefix(group_name)
                .send()
                .await
            {
                Ok(output) => verify_log_group(&mut log, group_name, output.log_groups()),
                Err(err) => {
                    log.fail(format!(
                        "Describe log group '{}': {}",
                        group_name,
                        aws_sdk_cloudwatchlogs::Error::from(err)
                    ));
                    continue;
                }
            }
        }

        log.section("Lambda Log Groups");
        let prefix = format!("/aws/lambda/{}", info.resource_prefix());
        match self
            .logs
            .describe_log_groups()
            .log_group_name_prefix(&prefix)
            .send()
            .await
        {
            Ok(output) => verify_lambda_log_groups(&mut log, output.log_groups()),
            Err(err) => log.warn(format!(
                "List Lambda log groups: {}",
                aws_sdk_cloudwatchlogs::Error::from(err)
            )),
        }

        log
    }
}

fn retention_text(retention_in_days: Option<i32>) -> String {
    match retention_in_days {
        Some(days) => format!("{} days", days),
        None => "never expire".to_string(),
    }
}

fn verify_log_group(log: &mut CheckLog, expected_name: &str, groups: &[LogGroup]) {
    // The prefix query can return sibling groups; match the exact name.
    match groups
        .iter()
        .find(|g| g.log_group_name() == Some(expected_name))
    {
        Some(group) => log.pass(format!(
            "Log group '{}' (retention: {})",
            expected_name,
            retention_text(group.retention_in_days())
        )),
        None => log.warn(format!("Log group '{}' not found", expected_name)),
    }
}

fn verify_lambda_log_groups(log: &mut CheckLog, groups: &[LogGroup]) {
    if groups.is_empty() {
        log.warn("No Lambda log groups found");
        return;
    }
    for group in groups {
        log.pass(format!(
            "Lambda logs: {}",
            group.log_group_name().unwrap_or_default()
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::testing::canned_response;
    use crate::types::DeploymentInfoBuilder;
    use aws_sdk_cloudwatchlogs::config::retry::RetryConfig;
    use aws_sdk_cloudwatchlogs::config::{BehaviorVersion, Credentials, Region};
    use aws_smithy_runtime::client::http::test_util::{ReplayEvent, StaticReplayClient};

    const DESCRIBE_DENIED: &str =
        r#"{"__type":"AccessDeniedException","message":"access denied"}"#;

    fn test_client(events: Vec<ReplayEvent>) -> Client {
        let config = aws_sdk_cloudwatchlogs::Config::builder()
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
    async fn test_run_describe_errors_fail_group_and_warn_lambda_section() {
        let check = LogsCheck {
            logs: test_client(vec![
                canned_response(400, DESCRIBE_DENIED),
                canned_response(400, DESCRIBE_DENIED),
            ]),
        };
        let log = check.run(&info()).await;
        assert_eq!(log.failed(), 1);
        assert_eq!(log.warned(), 1);
        assert_eq!(log.passed(), 0);
    }

    #[tokio::test]
    async fn test_run_no_log_groups_warns_without_failure() {
        let check = LogsCheck {
            logs: test_client(vec![
                canned_response(200, r#"{"logGroups":[]}"#),
                canned_response(200, r#"{"logGroups":[]}"#),
            ]),
        };
        let log = check.run(&info()).await;
        assert!(!log.has_failures());
        assert_eq!(log.warned(), 2);
        let messages: Vec<&str> = log.results().map(|r| r.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "Log group 'acme-prod-webapp-apigw-logs' not found",
                "No Lambda log groups found"
            ]
        );
    }

    #[test]
    fn test_retention_text() {
        assert_eq!(retention_text(Some(30)), "30 days");
        assert_eq!(retention_text(None), "never expire");
    }

    #[test]
    fn test_verify_log_group_requires_exact_name() {
        let groups = vec![
            LogGroup::builder()
                .log_group_name("acme-prod-webapp-apigw-logs-extra")
                .build(),
            LogGroup::builder()
                .log_group_name("acme-prod-webapp-apigw-logs")
                .retention_in_days(30)
                .build(),
        ];
        let mut log = CheckLog::new();
        verify_log_group(&mut log, "acme-prod-webapp-apigw-logs", &groups);
        let messages: Vec<&str> = log.results().map(|r| r.message.as_str()).collect();
        assert_eq!(
            messages,
            vec!["Log group 'acme-prod-webapp-apigw-logs' (retention: 30 days)"]
        );
    }

    #[test]
    fn test_verify_log_group_missing_is_warning() {
        let mut log = CheckLog::new();
        verify_log_group(&mut log, "acme-prod-webapp-apigw-logs", &[]);
        assert_eq!(log.warned(), 1);
        assert!(!log.has_failures());
    }

    #[test]
    fn test_verify_lambda_log_groups_lists_each() {
        let groups = vec![
            LogGroup::builder()
                .log_group_name("/aws/lambda/acme-prod-webapp-user")
                .build(),
            LogGroup::builder()
                .log_group_name("/aws/lambda/acme-prod-webapp-message")
                .build(),
        ];
        let mut log = CheckLog::new();
        verify_lambda_log_groups(&mut log, &groups);
        assert_eq!(log.passed(), 2);
    }

    #[test]
    fn test_verify_lambda_log_groups_empty_is_warning() {
        let mut log = CheckLog::new();
        verify_lambda_log_groups(&mut log, &[]);
        assert_eq!(log.warned(), 1);
    }
}
