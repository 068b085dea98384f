//! Smoke-tests a webapp deployment by querying the AWS control plane and
//! checking that the expected infrastructure exists and is configured as
//! intended. All queries are read-only; nothing is provisioned or repaired.
//!
//! The expected resource names are derived from the deployment identifier
//! (e.g. `acme-prod` expects a VPC named `acme-prod-webapp-vpc`). AWS
//! credentials come from the ambient default credential chain.

mod aws;
mod checks;
mod report;
mod types;

use clap::Parser;
use colored::Colorize;
use std::process::exit;

use checks::database::DatabaseCheck;
use checks::email::EmailCheck;
use checks::functions::FunctionsCheck;
use checks::gateway::GatewayCheck;
use checks::identity::IdentityCheck;
use checks::logs::LogsCheck;
use checks::network::NetworkCheck;
use checks::topics::TopicsCheck;
use checks::DomainCheck;
use types::{CheckLog, DeploymentInfo, DEFAULT_DOMAIN};

#[derive(Parser, Debug, Clone)]
#[command(
    version,
    about = "Verifies that the deployed webapp infrastructure exists and is configured as intended. AWS configuration must be set up for the deployment's account."
)]
struct Options {
    /// Deployment identifier used to construct expected resource names.
    #[arg(short, long, env = "DEPLOYMENT_ID")]
    deployment_id: Option<String>,
    /// Domain the SES email identity is registered for.
    #[arg(long, env = "DOMAIN")]
    domain: Option<String>,
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,
}

#[tokio::main]
async fn main() {
    let options = Options::parse();
    env_logger::Builder::new()
        .filter_level(options.verbose.log_level_filter())
        .init();

    report::banner();

    let Some(deployment_id) = options.deployment_id.filter(|id| !id.is_empty()) else {
        eprintln!("{}", "✗ DEPLOYMENT_ID environment variable is required".red());
        eprintln!("  Example: DEPLOYMENT_ID=acme-prod webapp-checker");
        exit(1);
    };

    let config = aws::aws_setup().await;
    let info = DeploymentInfo {
        deployment_id,
        region: config.region().map(|r| r.to_string()).unwrap_or_default(),
        domain: options
            .domain
            .unwrap_or_else(|| DEFAULT_DOMAIN.to_string()),
    };
    report::context(&info);

    // Fixed order; every domain runs even when an earlier one fails.
    let domains: Vec<Box<dyn DomainCheck>> = vec![
        Box::new(NetworkCheck {
            ec2: aws_sdk_ec2::Client::new(&config),
        }),
        Box::new(EmailCheck {
            ses: aws_sdk_sesv2::Client::new(&config),
            s3: aws_sdk_s3::Client::new(&config),
        }),
        Box::new(IdentityCheck {
            cognito: aws_sdk_cognitoidentityprovider::Client::new(&config),
        }),
        Box::new(DatabaseCheck {
            dynamo: aws_sdk_dynamodb::Client::new(&config),
        }),
        Box::new(GatewayCheck {
            apigw: aws_sdk_apigateway::Client::new(&config),
        }),
        Box::new(FunctionsCheck {
            lambda: aws_sdk_lambda::Client::new(&config),
        }),
        Box::new(TopicsCheck {
            sns: aws_sdk_sns::Client::new(&config),
        }),
        Box::new(LogsCheck {
            logs: aws_sdk_cloudwatchlogs::Client::new(&config),
        }),
    ];

    let mut run_log = CheckLog::new();
    for domain in &domains {
        report::header(domain.title());
        let domain_log = domain.run(&info).await;
        report::print_log(&domain_log);
        run_log.merge(domain_log);
    }

    report::summary(&run_log);
    if run_log.has_failures() {
        exit(1);
    }
}
