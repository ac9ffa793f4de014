use anyhow::{Context, Error};
use lazy_static::lazy_static;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest_tracing::TracingMiddleware;
use std::collections::HashMap;
use thiserror::Error as ThisError;

use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

lazy_static! {
    static ref CLIENT: ClientWithMiddleware = {
        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(3);
        ClientBuilder::new(reqwest::Client::new())
            // Retry failed requests.
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .with(TracingMiddleware::default())
            .build()
    };
}

pub struct HttpClient;

#[derive(ThisError, Debug)]
pub enum HttpClientError {
    #[error(transparent)]
    ResponseError(#[from] Error),
    #[error("httpBuilderError {0}")]
    HTTPBuilderError(String),
}

struct HeadersMapGenerator(HeaderMap);

impl HeadersMapGenerator {
    fn into_inner(self) -> HeaderMap {
        self.0
    }
}

impl TryFrom<HashMap<&'static str, String>> for HeadersMapGenerator {
    type Error = HttpClientError;

    fn try_from(value: HashMap<&'static str, String>) -> Result<Self, Self::Error> {
        let mut header_map = HeaderMap::new();

        for (key, value) in value.into_iter() {
            let value = HeaderValue::from_str(&value)
                .map_err(|err| HttpClientError::HTTPBuilderError(format!("{err} {key}")))?;
            header_map.insert(key, value);
        }
        Ok(Self(header_map))
    }
}

impl HttpClient {
    pub async fn get_json<DTO: DeserializeOwned>(url: Url) -> anyhow::Result<DTO> {
        let response = CLIENT
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("Failed to fetch request from {url}"))?
            .error_for_status()
            .with_context(|| format!("Unsuccessful response from {url}"))?;
        response
            .json::<DTO>()
            .await
            .with_context(|| format!("Failed to deserialize response from {url}"))
    }

    pub async fn post_json<DTO: DeserializeOwned>(
        url: Url,
        headers: HashMap<&'static str, String>,
        body: Value,
    ) -> Result<DTO, HttpClientError> {
        let generator = HeadersMapGenerator::try_from(headers)?;
        let header_map = generator.into_inner();
        CLIENT
            .post(url)
            .headers(header_map)
            .json(&body)
            .send()
            .await
            .context("Failed to get json response")?
            .error_for_status()
            .context("Unsuccessful response status")?
            .json::<DTO>()
            .await
            .context("Failed to deserialize response")
            .map_err(HttpClientError::ResponseError)
    }
}

#[cfg(test)]
mod tests {
    use crate::http_client::{HttpClient, HttpClientError};
    use httpmock::{Method::GET, Method::POST, MockServer};
    use serde::Deserialize;
    use serde_json::json;
    use std::collections::HashMap;
    use url::Url;

    #[derive(Deserialize, Debug, PartialEq)]
    struct Station {
        #[serde(rename = "stationShortCode")]
        code: String,
    }

    #[tokio::test]
    async fn test_get_json_deserializes_the_response() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/stations");
                then.status(200)
                    .header("content-type", "application/json")
                    .json_body(json!([{ "stationShortCode": "HKI" }]));
            })
            .await;

        let url = Url::parse(&server.url("/stations")).unwrap();
        let stations = HttpClient::get_json::<Vec<Station>>(url).await.unwrap();

        mock.assert_async().await;
        assert_eq!(
            stations,
            vec![Station {
                code: "HKI".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn test_post_json_sends_headers() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/send")
                    .header("Authorization", "Bearer token");
                then.status(200)
                    .header("content-type", "application/json")
                    .json_body(json!({ "requestId": "1" }));
            })
            .await;

        let url = Url::parse(&server.url("/send")).unwrap();
        let headers = HashMap::from([("Authorization", "Bearer token".to_string())]);
        let result =
            HttpClient::post_json::<serde_json::Value>(url, headers, json!({ "hello": 1 })).await;

        mock.assert_async().await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_invalid_header_values_are_rejected() {
        let url = Url::parse("http://localhost:1/send").unwrap();
        let headers = HashMap::from([("Authorization", "line\nbreak".to_string())]);
        let result =
            HttpClient::post_json::<serde_json::Value>(url, headers, json!({})).await;
        assert!(matches!(result, Err(HttpClientError::HTTPBuilderError(_))));
    }
}
