use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info};
use url::Url;

use crate::error::FetchError;

const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";
const TIMEOUT: Duration = Duration::from_secs(30);

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// One attempt. Transport failures and non-2xx replies are both errors.
    async fn fetch(&self, url: &Url) -> Result<String, FetchError>;
}

pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(TIMEOUT)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        info!("Fetching rates from {}", url);

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(FetchError::Status { status, body });
        }
        debug!("Received {} bytes from {}", body.len(), url);
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_body_on_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/mortgages/mortgage-rates")
            .with_status(200)
            .with_body("<table></table>")
            .create_async()
            .await;

        let url = Url::parse(&format!("{}/mortgages/mortgage-rates", server.url())).unwrap();
        let body = HttpFetcher::new().unwrap().fetch(&url).await.unwrap();

        assert_eq!(body, "<table></table>");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn non_ok_status_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/")
            .with_status(503)
            .with_body("maintenance")
            .expect(1)
            .create_async()
            .await;

        let url = Url::parse(&server.url()).unwrap();
        let result = HttpFetcher::new().unwrap().fetch(&url).await;

        match result {
            Err(FetchError::Status { status, body }) => {
                assert_eq!(status.as_u16(), 503);
                assert_eq!(body, "maintenance");
            }
            other => panic!("expected status error, got {:?}", other.map(|_| ())),
        }
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn unreachable_host_is_an_error() {
        let url = Url::parse("http://127.0.0.1:9/").unwrap();
        let result = HttpFetcher::new().unwrap().fetch(&url).await;
        assert!(matches!(result, Err(FetchError::Transport(_))));
    }
}
