//! DynamoDB checks for the user table: existence, status, key schema,
//! billing mode, encryption, deletion protection and contributor insights.

use async_trait::async_trait;
use aws_sdk_dynamodb::types::{TableDescription, TableStatus};
use aws_sdk_dynamodb::Client;
use log::debug;

use super::DomainCheck;
use crate::types::{CheckLog, DeploymentInfo};

pub struct DatabaseCheck {
    pub dynamo: Client,
}

#[async_trait]
impl DomainCheck for DatabaseCheck {
    fn title(&self) -> &'static str {
        "DYNAMODB DATABASE"
    }

    async fn run(&self, info: &DeploymentInfo) -> CheckLog {
        let mut log = CheckLog::new();

        log.section("User Table");
        let table_name = info.resource_name("db-user");
        debug!("Describing table: {}", table_name);
        let table = match self
            .dynamo
            .describe_table()
            .table_name(&table_name)
            .send()
            .await
        {
            Ok(output) => output.table,
            Err(_) => {
                log.fail(format!("Table '{}' not found", table_name));
                return log;
            }
        };
        let Some(table) = table else {
            log.fail(format!("Table '{}' not found", table_name));
            return log;
        };
        verify_table(&mut log, &table_name, &table);

        if let Ok(insights) = self
            .dynamo
            .describe_contributor_insights()
            .table_name(&table_name)
            .send()
            .await
        {
            if let Some(status) = insights.contributor_insights_status() {
                log.pass(format!("Contributor insights: {}", status.as_str()));
            }
        }

        log
    }
}

fn verify_table(log: &mut CheckLog, table_name: &str, table: &TableDescription) {
    log.pass(format!("Table '{}' exists", table_name));

    match table.table_status() {
        Some(TableStatus::Active) => log.pass("Table status: ACTIVE"),
        Some(status) => log.warn(format!("Table status: {}", status.as_str())),
        None => log.warn("Table status: unknown"),
    }

    for key in table.key_schema() {
        log.pass(format!(
            "Key: {} ({})",
            key.attribute_name(),
            key.key_type().as_str()
        ));
    }

    if let Some(billing) = table
        .billing_mode_summary()
        .and_then(|b| b.billing_mode())
    {
        log.pass(format!("Billing mode: {}", billing.as_str()));
    }

    if let Some(sse) = table.sse_description() {
        log.pass(format!(
            "Encryption: {} ({})",
            sse.status().map(|s| s.as_str()).unwrap_or("unknown"),
            sse.sse_type().map(|t| t.as_str()).unwrap_or("unknown")
        ));
    }

    if table.deletion_protection_enabled().unwrap_or(false) {
        log.pass("Deletion protection: enabled");
    } else {
        log.warn("Deletion protection: disabled");
    }

    log.pass(format!("Item count: {}", table.item_count().unwrap_or(0)));
}
