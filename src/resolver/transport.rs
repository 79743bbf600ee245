// reqwest-backed HTTP transport

use async_trait::async_trait;
use reqwest::header::{HeaderName, ACCEPT, CONTENT_LENGTH, CONTENT_TYPE, USER_AGENT};
use std::time::Duration;

use super::config::NetworkConfig;
use super::errors::ResolveError;
use super::traits::{HttpReply, HttpTransport, ProbeReply};

pub struct ReqwestTransport {
    client: reqwest::Client,
    user_agent: String,
}

impl ReqwestTransport {
    /// Build a client honouring the configured proxy. Per-request timeouts
    /// are applied at call time.
    pub fn new(config: &NetworkConfig) -> Result<Self, ResolveError> {
        let mut builder = reqwest::Client::builder();

        if let Some(proxy_url) = config.proxy.as_deref() {
            let proxy = reqwest::Proxy::all(proxy_url)
                .map_err(|e| ResolveError::InvalidUrl(format!("proxy {}: {}", proxy_url, e)))?;
            builder = builder.proxy(proxy);
            tracing::debug!(proxy = proxy_url, "using outbound proxy");
        } else if !config.use_system_proxy {
            builder = builder.no_proxy();
        }

        let client = builder
            .build()
            .map_err(|e| ResolveError::Transport(format!("failed to build client: {}", e)))?;

        Ok(Self {
            client,
            user_agent: config.user_agent.clone(),
        })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
        timeout: Duration,
    ) -> Result<HttpReply, ResolveError> {
        let response = self
            .client
            .post(url)
            .header(ACCEPT, "application/json")
            .header(USER_AGENT, &self.user_agent)
            .json(body)
            .timeout(timeout)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(HttpReply { status, body })
    }

    async fn head(&self, url: &str, timeout: Duration) -> Result<ProbeReply, ResolveError> {
        let response = self.client.head(url).timeout(timeout).send().await?;

        let header = |name: HeaderName| {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };

        Ok(ProbeReply {
            status: response.status().as_u16(),
            content_length: header(CONTENT_LENGTH),
            content_type: header(CONTENT_TYPE),
        })
    }
}
