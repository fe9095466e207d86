//! HTTP client for the explorer's transaction log API.

use super::{LedgerError, LedgerSource};
use crate::domain::{AccountId, LogEntry};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Ledger source backed by the public explorer API.
#[derive(Debug, Clone)]
pub struct ExplorerClient {
    client: Client,
    base_url: String,
}

impl ExplorerClient {
    /// Create a client with a per-request timeout.
    pub fn new(base_url: String, request_timeout: Duration) -> Result<Self, LedgerError> {
        let client = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| LedgerError::Network(e.to_string()))?;

        Ok(Self { client, base_url })
    }

    fn logs_url(&self, account: AccountId, before: Option<&str>) -> String {
        let mut url = format!(
            "{}/api/accounts/{}/logs",
            self.base_url.trim_end_matches('/'),
            account
        );
        if let Some(cursor) = before {
            url.push_str("?before=");
            url.push_str(cursor);
        }
        url
    }
}

#[async_trait]
impl LedgerSource for ExplorerClient {
    async fn fetch_page(
        &self,
        account: AccountId,
        before: Option<&str>,
    ) -> Result<Vec<LogEntry>, LedgerError> {
        let url = self.logs_url(account, before);
        debug!(%url, "fetching log page");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| LedgerError::Network(e.to_string()))?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(LedgerError::RateLimited);
        }
        if !status.is_success() {
            return Err(LedgerError::Http {
                status: status.as_u16(),
            });
        }

        response
            .json::<Vec<LogEntry>>()
            .await
            .map_err(|e| LedgerError::Parse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> ExplorerClient {
        ExplorerClient::new(
            "https://explorer.example.com".to_string(),
            Duration::from_secs(10),
        )
        .unwrap()
    }

    #[test]
    fn logs_url_without_cursor() {
        assert_eq!(
            client().logs_url(AccountId::new(524876), None),
            "https://explorer.example.com/api/accounts/524876/logs"
        );
    }

    #[test]
    fn logs_url_with_cursor() {
        assert_eq!(
            client().logs_url(AccountId::new(7), Some("2025-03-14T09:26:53Z")),
            "https://explorer.example.com/api/accounts/7/logs?before=2025-03-14T09:26:53Z"
        );
    }

    #[test]
    fn logs_url_trims_trailing_slash() {
        let c = ExplorerClient::new(
            "https://explorer.example.com/".to_string(),
            Duration::from_secs(10),
        )
        .unwrap();
        assert_eq!(
            c.logs_url(AccountId::new(1), None),
            "https://explorer.example.com/api/accounts/1/logs"
        );
    }
}
