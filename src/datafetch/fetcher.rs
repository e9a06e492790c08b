use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

/// Source of paginated record batches.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch one page and return the decoded JSON body unchanged.
    /// Shape validation is left to [`Pages`](super::Pages).
    async fn fetch_page(&self, page: u32, page_size: u32) -> Result<Value>;
}

#[async_trait]
impl<T: PageSource + ?Sized> PageSource for &T {
    async fn fetch_page(&self, page: u32, page_size: u32) -> Result<Value> {
        (**self).fetch_page(page, page_size).await
    }
}
