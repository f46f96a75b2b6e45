use async_trait::async_trait;
use reqwest::{Request, Response};

/// Executes a single prepared HTTP request.
///
/// The pipeline only needs plain GETs, but going through a trait keeps the
/// transport swappable (proxies, custom TLS, test doubles).
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}
