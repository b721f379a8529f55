use crate::app::ports::HttpClientPort;
use crate::error::{EtlError, Result};
use crate::infra::http_client::ReqwestHttp;
use crate::types::RawPage;
use std::time::Duration;
use tracing::{info, instrument};

/// Single GET of `url` through `http`. Non-2xx, transport errors and empty bodies all fail.
#[instrument(skip(http))]
pub async fn fetch_with(http: &dyn HttpClientPort, url: &str) -> Result<RawPage> {
    info!("Getting wikipedia page...");
    let failed = |cause: String| EtlError::FetchFailed {
        url: url.to_string(),
        cause,
    };

    let resp = http.get(url).await.map_err(failed)?;
    if !(200..300).contains(&resp.status) {
        return Err(failed(format!("HTTP status {}", resp.status)));
    }
    if resp.bytes.is_empty() {
        return Err(failed("empty response body".to_string()));
    }

    let html = String::from_utf8_lossy(&resp.bytes).into_owned();
    info!(bytes = resp.bytes.len(), content_type = %resp.content_type, "Fetched page");
    Ok(RawPage {
        url: url.to_string(),
        html,
    })
}

pub async fn fetch(url: &str, timeout: Duration) -> Result<RawPage> {
    let http = ReqwestHttp::new(timeout).map_err(|cause| EtlError::FetchFailed {
        url: url.to_string(),
        cause,
    })?;
    fetch_with(&http, url).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn returns_page_on_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/wiki/Stadiums"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
            .mount(&server)
            .await;

        let url = format!("{}/wiki/Stadiums", server.uri());
        let page = fetch(&url, Duration::from_secs(5)).await.unwrap();
        assert_eq!(page.html, "<html></html>");
        assert_eq!(page.url, url);
    }

    #[tokio::test]
    async fn server_error_is_fetch_failed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = fetch(&server.uri(), Duration::from_secs(5)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FetchFailed);
        assert!(err.to_string().contains("503"));
    }

    #[tokio::test]
    async fn timeout_is_fetch_failed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("late")
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let err = fetch(&server.uri(), Duration::from_millis(100)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FetchFailed);
    }

    #[tokio::test]
    async fn empty_body_is_fetch_failed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let err = fetch(&server.uri(), Duration::from_secs(5)).await.unwrap_err();
        assert!(err.to_string().contains("empty"));
    }
}
