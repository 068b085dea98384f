//! Networking checks for the deployment VPC.
//!
//! Verifies that the VPC named `{deployment}-webapp-vpc` exists and is
//! available, that DNS support/hostnames are enabled, and that subnets, an
//! internet gateway and NAT gateways are in place.

use async_trait::async_trait;
use aws_sdk_ec2::types::{Filter, Subnet, Vpc, VpcAttributeName, VpcState};
use aws_sdk_ec2::Client;
use log::debug;

use super::DomainCheck;
use crate::types::{CheckLog, DeploymentInfo};

/// Tag the CDK puts on subnets it creates.
pub const SUBNET_TYPE_TAG: &str = "aws-cdk:subnet-type";

pub struct NetworkCheck {
    pub ec2: Client,
}

impl NetworkCheck {
    async fn vpc_flag(&self, vpc_id: &str, attribute: VpcAttributeName) -> Option<bool> {
        let output = self
            .ec2
            .describe_vpc_attribute()
            .vpc_id(vpc_id)
            .attribute(attribute.clone())
            .send()
            .await
            .ok()?;
        match attribute {
            VpcAttributeName::EnableDnsSupport => {
                output.enable_dns_support.and_then(|a| a.value)
            }
            VpcAttributeName::EnableDnsHostnames => {
                output.enable_dns_hostnames.and_then(|a| a.value)
            }
            _ => None,
        }
    }
}

#[async_trait]
impl DomainCheck for NetworkCheck {
    fn title(&self) -> &'static str {
        "VPC AND NETWORKING"
    }

    async fn run(&self, info: &DeploymentInfo) -> CheckLog {
        let mut log = CheckLog::new();
        let vpc_name = info.resource_name("vpc");
        debug!("Looking up VPC: {}", vpc_name);

        log.section("VPC");
        let vpcs = match self
            .ec2
            .describe_vpcs()
            .filters(Filter::builder().name("tag:Name").values(&vpc_name).build())
            .send()
            .await
        {
            Ok(output) => output.vpcs.unwrap_or_default(),
            Err(err) => {
                log.fail(format!("VPC lookup: {}", aws_sdk_ec2::Error::from(err)));
                return log;
            }
        };
        let Some(vpc) = vpcs.first() else {
            log.fail(format!("VPC '{}' not found", vpc_name));
            return log;
        };
        verify_vpc(&mut log, &vpc_name, vpc);
        let vpc_id = vpc.vpc_id().unwrap_or_default().to_string();

        let dns_support = self.vpc_flag(&vpc_id, VpcAttributeName::EnableDnsSupport).await;
        verify_flag(&mut log, "DNS support", dns_support);
        let dns_hostnames = self
            .vpc_flag(&vpc_id, VpcAttributeName::EnableDnsHostnames)
            .await;
        verify_flag(&mut log, "DNS hostnames", dns_hostnames);

        log.section("Subnets");
        match self
            .ec2
            .describe_subnets()
            .filters(Filter::builder().name("vpc-id").values(&vpc_id).build())
            .send()
            .await
        {
            Ok(output) => verify_subnet_types(&mut log, &output.subnets.unwrap_or_default()),
            Err(err) => {
                log.fail(format!("Subnet lookup: {}", aws_sdk_ec2::Error::from(err)));
                return log;
            }
        }

        log.section("Internet Gateway");
        match self
            .ec2
            .describe_internet_gateways()
            .filters(
                Filter::builder()
                    .name("attachment.vpc-id")
                    .values(&vpc_id)
                    .build(),
            )
            .send()
            .await
        {
            Ok(output) if !output.internet_gateways().is_empty() => {
                log.pass("Internet Gateway attached")
            }
            _ => log.warn("No Internet Gateway found"),
        }

        log.section("NAT Gateways");
        match self
            .ec2
            .describe_nat_gateways()
            .filter(Filter::builder().name("vpc-id").values(&vpc_id).build())
            .filter(Filter::builder().name("state").values("available").build())
            .send()
            .await
        {
            Ok(output) if !output.nat_gateways().is_empty() => log.pass(format!(
                "NAT Gateways: {} available",
                output.nat_gateways().len()
            )),
            _ => log.warn("No NAT Gateways found"),
        }

        log
    }
}

fn verify_vpc(log: &mut CheckLog, expected_name: &str, vpc: &Vpc) {
    log.pass(format!(
        "VPC '{}' exists (CIDR: {})",
        expected_name,
        vpc.cidr_block().unwrap_or("unknown")
    ));
    match vpc.state() {
        Some(VpcState::Available) => log.pass("VPC state: available"),
        state => log.fail(format!(
            "VPC state: {}",
            state.map(|s| s.as_str()).unwrap_or("unknown")
        )),
    }
}

fn verify_flag(log: &mut CheckLog, name: &str, enabled: Option<bool>) {
    if enabled == Some(true) {
        log.pass(format!("{} enabled", name));
    } else {
        log.warn(format!("{} not enabled", name));
    }
}

/// Counts public vs. private subnets by the CDK subnet-type tag.
fn verify_subnet_types(log: &mut CheckLog, subnets: &[Subnet]) {
    let mut public = 0;
    let mut private = 0;
    for subnet in subnets {
        for tag in subnet.tags() {
            if tag.key() == Some(SUBNET_TYPE_TAG) {
                match tag.value() {
                    Some("Public") => public += 1,
                    Some(value) if value.contains("Private") => private += 1,
                    _ => {}
                }
            }
        }
    }
    log.pass(format!("Subnets: {} public, {} private", public, private));
}
