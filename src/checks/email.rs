//! Outbound email checks: the SES email identity for the deployment domain,
//! the configuration set, its event destinations, and the S3 bucket that
//! stores received emails.

use async_trait::async_trait;
use aws_sdk_sesv2::types::{
    DkimAttributes, DkimStatus, EventDestination, ReputationOptions, SendingOptions,
};
use log::debug;

use super::{find_by_name, DomainCheck};
use crate::types::{CheckLog, DeploymentInfo};

pub struct EmailCheck {
    pub ses: aws_sdk_sesv2::Client,
    pub s3: aws_sdk_s3::Client,
}

#[async_trait]
impl DomainCheck for EmailCheck {
    fn title(&self) -> &'static str {
        "SES EMAIL SERVICE"
    }

    async fn run(&self, info: &DeploymentInfo) -> CheckLog {
        let mut log = CheckLog::new();

        log.section("Email Identity");
        let identities = match self.ses.list_email_identities().send().await {
            Ok(output) => output.email_identities.unwrap_or_default(),
            Err(err) => {
                log.fail(format!(
                    "List email identities: {}",
                    aws_sdk_sesv2::Error::from(err)
                ));
                return log;
            }
        };
        match find_by_name(&identities, &info.domain, |i| i.identity_name()) {
            Some(identity) => {
                debug!("Found email identity: {}", info.domain);
                if let Ok(details) = self
                    .ses
                    .get_email_identity()
                    .email_identity(identity.identity_name().unwrap_or_default())
                    .send()
                    .await
                {
                    verify_identity(
                        &mut log,
                        &info.domain,
                        details.verified_for_sending_status,
                        details.dkim_attributes.as_ref(),
                    );
                }
            }
            None => log.fail(format!("Email identity '{}' not found", info.domain)),
        }

        log.section("Configuration Sets");
        let config_set_name = info.resource_name("configuration-set");
        match self
            .ses
            .get_configuration_set()
            .configuration_set_name(&config_set_name)
            .send()
            .await
        {
            Ok(output) => {
                log.pass(format!("Configuration set '{}' exists", config_set_name));
                verify_configuration_set(
                    &mut log,
                    output.reputation_options.as_ref(),
                    output.sending_options.as_ref(),
                );
            }
            Err(_) => log.fail(format!("Configuration set '{}' not found", config_set_name)),
        }

        if let Ok(output) = self
            .ses
            .get_configuration_set_event_destinations()
            .configuration_set_name(&config_set_name)
            .send()
            .await
        {
            verify_event_destinations(&mut log, output.event_destinations());
        }

        log.section("S3 Email Storage");
        let bucket_name = info.resource_name("ses-received-emails");
        match self.s3.head_bucket().bucket(&bucket_name).send().await {
            Ok(_) => {
                log.pass(format!("S3 bucket '{}' exists", bucket_name));
                if let Ok(lifecycle) = self
                    .s3
                    .get_bucket_lifecycle_configuration()
                    .bucket(&bucket_name)
                    .send()
                    .await
                {
                    if !lifecycle.rules().is_empty() {
                        log.pass(format!(
                            "S3 lifecycle rules: {} configured",
                            lifecycle.rules().len()
                        ));
                    }
                }
            }
            Err(_) => log.warn(format!("S3 bucket '{}' not accessible", bucket_name)),
        }

        log
    }
}

fn verify_identity(
    log: &mut CheckLog,
    domain: &str,
    verified_for_sending: bool,
    dkim: Option<&DkimAttributes>,
) {
    if verified_for_sending {
        log.pass(format!("Email identity '{}' verified for sending", domain));
    } else {
        log.warn(format!(
            "Email identity '{}' not verified for sending",
            domain
        ));
    }
    if let Some(dkim) = dkim {
        match dkim.status() {
            Some(DkimStatus::Success) => log.pass("DKIM: verified"),
            Some(DkimStatus::Pending) => log.warn("DKIM: pending verification"),
            Some(status) => log.warn(format!("DKIM status: {}", status.as_str())),
            None => log.warn("DKIM status: unknown"),
        }
    }
}

fn verify_configuration_set(
    log: &mut CheckLog,
    reputation: Option<&ReputationOptions>,
    sending: Option<&SendingOptions>,
) {
    if reputation.is_some_and(|r| r.reputation_metrics_enabled) {
        log.pass("Reputation metrics enabled");
    } else {
        log.warn("Reputation metrics disabled");
    }
    if sending.is_some_and(|s| s.sending_enabled) {
        log.pass("Sending enabled");
    } else {
        log.warn("Sending disabled");
    }
}

fn verify_event_destinations(log: &mut CheckLog, destinations: &[EventDestination]) {
    if destinations.is_empty() {
        return;
    }
    log.pass(format!(
        "Event destinations configured: {}",
        destinations.len()
    ));
    for destination in destinations {
        log.pass(format!(
            "  - {} (enabled: {})",
            destination.name(),
            destination.enabled()
        ));
    }
}
