//! One module per infrastructure domain. Every routine follows the same
//! shape: build the expected resource name from the deployment context, issue
//! the read-only lookup, match by exact name, then classify each secondary
//! property as passed/warning. Lookup failures and missing primary resources
//! are recorded as failures and end that domain early; soft gaps only warn.

pub mod database;
pub mod email;
pub mod functions;
pub mod gateway;
pub mod identity;
pub mod logs;
pub mod network;
pub mod topics;

use async_trait::async_trait;

use crate::types::{CheckLog, DeploymentInfo};

/// A self-contained lookup-and-assert routine for one infrastructure domain.
///
/// `run` never returns an error: every failure mode inside the domain is
/// converted into entries of the returned log.
#[async_trait]
pub trait DomainCheck {
    /// Header printed above the domain's results.
    fn title(&self) -> &'static str;

    async fn run(&self, info: &DeploymentInfo) -> CheckLog;
}

/// Exact-equality lookup of an expected resource name in an API listing.
pub fn find_by_name<'a, T>(
    items: &'a [T],
    expected: &str,
    name: impl Fn(&'a T) -> Option<&'a str>,
) -> Option<&'a T> {
    items.iter().find(|item| name(item) == Some(expected))
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_by_name_is_exact() {
        let pools = vec![
            ("pool-1", "acme-prod-webapp-userpool-old"),
            ("pool-2", "acme-prod-webapp-userpool"),
        ];
        let found = find_by_name(&pools, "acme-prod-webapp-userpool", |p| Some(p.1));
        assert_eq!(found.map(|p| p.0), Some("pool-2"));
        assert!(find_by_name(&pools, "acme-prod-webapp", |p| Some(p.1)).is_none());
    }

    #[test]
    fn test_find_by_name_skips_unnamed_entries() {
        let items: Vec<Option<&str>> = vec![None, Some("a")];
        let found = find_by_name(&items, "a", |i| *i);
        assert_eq!(found, Some(&Some("a")));
    }
}
