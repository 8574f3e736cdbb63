use crate::domain::ports::{Page, Transport};
use crate::utils::error::{Result, SniperError};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use std::time::Duration;

pub const DEFAULT_USER_AGENT: &str = concat!("slot-sniper/", env!("CARGO_PKG_VERSION"));

/// `Transport` backed by a reqwest client. Redirects are followed so the
/// page's final URL carries whatever the service appended on the way.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client })
    }

    async fn send(&self, request: RequestBuilder) -> Result<Page> {
        let response = request.send().await?;
        let final_url = response.url().clone();
        let status = response.status().as_u16();
        tracing::debug!("HTTP {} <- {}", status, final_url);
        // 標頭已收到但內容讀到一半斷線，視為暫時性中斷
        let body = response.text().await.map_err(|e| SniperError::Transient {
            message: format!("response body from {} interrupted: {}", final_url, e),
        })?;

        Ok(Page {
            final_url,
            status,
            body,
        })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<Page> {
        tracing::trace!("GET {} {:?}", url, query);
        self.send(self.client.get(url).query(query)).await
    }

    async fn post_form(
        &self,
        url: &str,
        query: &[(&str, &str)],
        form: &[(&str, &str)],
    ) -> Result<Page> {
        tracing::trace!("POST {} {:?}", url, query);
        self.send(self.client.post(url).query(query).form(form)).await
    }
}
