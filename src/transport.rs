use std::time::Duration;

use async_trait::async_trait;

use crate::error::TransportError;

/// HTTP collaborator of the handshake. One instance is one session: every
/// request it makes shares the same cookie jar.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str) -> Result<String, TransportError>;

    /// POST `fields` as `application/x-www-form-urlencoded`.
    async fn post_form(&self, url: &str, fields: &[(String, String)])
        -> Result<String, TransportError>;
}

/// `reqwest` client with a cookie store.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .connect_timeout(Duration::from_secs(15))
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }

    async fn read_body(url: &str, response: reqwest::Response) -> Result<String, TransportError> {
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response.text().await?)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<String, TransportError> {
        log::debug!("GET {url}");
        let response = self.client.get(url).send().await?;
        Self::read_body(url, response).await
    }

    async fn post_form(
        &self,
        url: &str,
        fields: &[(String, String)],
    ) -> Result<String, TransportError> {
        log::debug!("POST {url} ({} fields)", fields.len());
        let response = self.client.post(url).form(fields).send().await?;
        Self::read_body(url, response).await
    }
}
