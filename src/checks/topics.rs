//! SNS checks: the four SES event topics the deployment is expected to own.

use async_trait::async_trait;
use aws_sdk_sns::Client;
use std::collections::HashSet;

use super::DomainCheck;
use crate::types::{CheckLog, DeploymentInfo};

/// Name suffixes of the SES event topics, one per event class.
const TOPIC_SUFFIXES: [&str; 4] = ["bounce", "complaint", "reject", "received-emails"];

pub struct TopicsCheck {
    pub sns: Client,
}

#[async_trait]
impl DomainCheck for TopicsCheck {
    fn title(&self) -> &'static str {
        "SNS TOPICS"
    }

    async fn run(&self, info: &DeploymentInfo) -> CheckLog {
        let mut log = CheckLog::new();

        log.section("SES Event Topics");
        let topics = match self.sns.list_topics().send().await {
            Ok(output) => output.topics.unwrap_or_default(),
            Err(err) => {
                log.fail(format!("List topics: {}", aws_sdk_sns::Error::from(err)));
                return log;
            }
        };
        let present: HashSet<&str> = topics
            .iter()
            .filter_map(|t| t.topic_arn())
            .map(topic_name_from_arn)
            .collect();
        verify_topics(&mut log, &expected_topics(info), &present);

        log
    }
}

fn expected_topics(info: &DeploymentInfo) -> Vec<String> {
    TOPIC_SUFFIXES
        .iter()
        .map(|suffix| info.resource_name(suffix))
        .collect()
}

/// Topic names are the last segment of the topic ARN.
fn topic_name_from_arn(arn: &str) -> &str {
    arn.rsplit_once(':').map_or(arn, |(_, name)| name)
}

fn verify_topics(log: &mut CheckLog, expected: &[String], present: &HashSet<&str>) {
    for topic in expected {
        if present.contains(topic.as_str()) {
            log.pass(format!("Topic '{}' exists", topic));
        } else {
            log.warn(format!("Topic '{}' not found", topic));
        }
    }
}
