use crate::utils::error::Result;
use async_trait::async_trait;
use url::Url;

/// 一次 HTTP 往返的結果。`final_url` 是跟隨重新導向後的網址。
#[derive(Debug, Clone)]
pub struct Page {
    pub final_url: Url,
    pub status: u16,
    pub body: String,
}

impl Page {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn query_param(&self, key: &str) -> Option<String> {
        self.final_url
            .query_pairs()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }
}

/// HTTP boundary used by every network-touching component.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<Page>;

    async fn post_form(
        &self,
        url: &str,
        query: &[(&str, &str)],
        form: &[(&str, &str)],
    ) -> Result<Page>;
}
