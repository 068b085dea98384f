//! Cognito checks: the deployment user pool, its policies and triggers, and
//! the app clients with their OAuth configuration.

use async_trait::async_trait;
use aws_sdk_cognitoidentityprovider::types::{UserPoolClientType, UserPoolType};
use aws_sdk_cognitoidentityprovider::Client;
use itertools::Itertools;
use log::debug;

use super::{find_by_name, DomainCheck};
use crate::types::{CheckLog, DeploymentInfo};

/// ListUserPools/ListUserPoolClients page size (the API maximum).
const MAX_RESULTS: i32 = 60;

pub struct IdentityCheck {
    pub cognito: Client,
}

#[async_trait]
impl DomainCheck for IdentityCheck {
    fn title(&self) -> &'static str {
        "COGNITO AUTHENTICATION"
    }

    async fn run(&self, info: &DeploymentInfo) -> CheckLog {
        let mut log = CheckLog::new();

        log.section("User Pool");
        let pool_name = info.resource_name("userpool");
        let pools = match self
            .cognito
            .list_user_pools()
            .max_results(MAX_RESULTS)
            .send()
            .await
        {
            Ok(output) => output.user_pools.unwrap_or_default(),
            Err(err) => {
                log.fail(format!(
                    "List user pools: {}",
                    aws_sdk_cognitoidentityprovider::Error::from(err)
                ));
                return log;
            }
        };
        let Some(pool) = find_by_name(&pools, &pool_name, |p| p.name()) else {
            log.fail(format!("User Pool '{}' not found", pool_name));
            return log;
        };
        let pool_id = pool.id().unwrap_or_default().to_string();
        log.pass(format!("User Pool '{}' exists (ID: {})", pool_name, pool_id));

        match self
            .cognito
            .describe_user_pool()
            .user_pool_id(&pool_id)
            .send()
            .await
        {
            Ok(output) => {
                if let Some(details) = output.user_pool {
                    verify_user_pool(&mut log, &details);
                }
            }
            Err(err) => log.fail(format!(
                "Describe user pool: {}",
                aws_sdk_cognitoidentityprovider::Error::from(err)
            )),
        }

        log.section("User Pool Clients");
        let clients = match self
            .cognito
            .list_user_pool_clients()
            .user_pool_id(&pool_id)
            .max_results(MAX_RESULTS)
            .send()
            .await
        {
            Ok(output) => output.user_pool_clients.unwrap_or_default(),
            Err(err) => {
                log.fail(format!(
                    "List user pool clients: {}",
                    aws_sdk_cognitoidentityprovider::Error::from(err)
                ));
                return log;
            }
        };
        if clients.is_empty() {
            log.fail("No User Pool clients found");
            return log;
        }
        for client in &clients {
            let Some(client_id) = client.client_id() else {
                continue;
            };
            debug!("Describing user pool client: {}", client_id);
            if let Ok(output) = self
                .cognito
                .describe_user_pool_client()
                .user_pool_id(&pool_id)
                .client_id(client_id)
                .send()
                .await
            {
                if let Some(details) = output.user_pool_client {
                    verify_pool_client(&mut log, &details);
                }
            }
        }

        log
    }
}

fn verify_user_pool(log: &mut CheckLog, pool: &UserPoolType) {
    if let Some(mfa) = pool.mfa_configuration() {
        log.pass(format!("MFA configuration: {}", mfa.as_str()));
    }
    if let Some(policy) = pool.policies().and_then(|p| p.password_policy()) {
        log.pass(format!(
            "Password policy: min length {}, require numbers={}, symbols={}",
            policy.minimum_length().unwrap_or_default(),
            policy.require_numbers(),
            policy.require_symbols()
        ));
    }
    if let Some(account) = pool
        .email_configuration()
        .and_then(|e| e.email_sending_account())
    {
        log.pass(format!("Email sending: {}", account.as_str()));
    }
    if let Some(lambda_config) = pool.lambda_config() {
        let triggers = [
            lambda_config.pre_sign_up(),
            lambda_config.post_confirmation(),
            lambda_config.pre_authentication(),
            lambda_config.post_authentication(),
            lambda_config.custom_message(),
        ]
        .iter()
        .filter(|t| t.is_some())
        .count();
        if triggers > 0 {
            log.pass(format!("Lambda triggers: {} configured", triggers));
        }
    }
    log.pass(format!(
        "Estimated users: {}",
        pool.estimated_number_of_users()
    ));
}

fn verify_pool_client(log: &mut CheckLog, client: &UserPoolClientType) {
    log.pass(format!(
        "Client '{}' (ID: {})",
        client.client_name().unwrap_or_default(),
        client.client_id().unwrap_or_default()
    ));
    if !client.allowed_o_auth_flows().is_empty() {
        log.pass(format!(
            "  OAuth flows: {}",
            client
                .allowed_o_auth_flows()
                .iter()
                .map(|f| f.as_str())
                .join(", ")
        ));
    }
    if !client.allowed_o_auth_scopes().is_empty() {
        log.pass(format!(
            "  OAuth scopes: {}",
            client.allowed_o_auth_scopes().iter().join(", ")
        ));
    }
    if !client.explicit_auth_flows().is_empty() {
        log.pass(format!(
            "  Auth flows: {}",
            client
                .explicit_auth_flows()
                .iter()
                .map(|f| f.as_str())
                .join(", ")
        ));
    }
}
