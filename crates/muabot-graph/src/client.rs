// SPDX-FileCopyrightText: 2026 Muabot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Facebook Graph API.
//!
//! Provides [`GraphClient`] which handles request construction, page token
//! authentication, and transient error retry for read calls. Send API calls
//! never retry: Messenger deliveries are not idempotent and a duplicate
//! message is worse than a missing one.

use std::time::Duration;

use muabot_config::model::FacebookConfig;
use muabot_core::MuabotError;
use tracing::{debug, warn};

use crate::types::{
    GraphErrorResponse, LeadgenData, PageInfo, PublishResponse, SendMessageRequest,
};

/// HTTP client for Graph API communication.
///
/// The base URL comes from configuration so tests can point it at a local
/// mock server. Page access tokens are passed per call; the client itself
/// holds no credentials.
#[derive(Debug, Clone)]
pub struct GraphClient {
    client: reqwest::Client,
    base_url: String,
    max_retries: u32,
}

impl GraphClient {
    /// Creates a new Graph API client from the facebook config section.
    pub fn new(config: &FacebookConfig) -> Result<Self, MuabotError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.send_timeout_secs))
            .build()
            .map_err(|e| MuabotError::Graph {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: config.graph_base_url.trim_end_matches('/').to_string(),
            max_retries: 1,
        })
    }

    /// Sends a message through the Send API. Success is any 2xx; the
    /// response body is not inspected.
    pub async fn send_message(
        &self,
        access_token: &str,
        request: &SendMessageRequest,
    ) -> Result<(), MuabotError> {
        let url = format!("{}/me/messages", self.base_url);
        let response = self
            .client
            .post(&url)
            .query(&[("access_token", access_token)])
            .json(request)
            .send()
            .await
            .map_err(|e| MuabotError::Graph {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        debug!(status = %status, "send API response received");

        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(graph_error(status, &body))
    }

    /// Fetch page metadata. Used by the connection test; retries once on a
    /// transient status.
    pub async fn get_page_info(
        &self,
        page_id: &str,
        access_token: &str,
    ) -> Result<PageInfo, MuabotError> {
        let url = format!("{}/{page_id}", self.base_url);
        let body = self
            .get_with_retry(
                &url,
                &[
                    ("fields", "id,name,category,picture,fan_count,link"),
                    ("access_token", access_token),
                ],
            )
            .await?;
        serde_json::from_str(&body).map_err(|e| MuabotError::Graph {
            message: format!("failed to parse page info: {e}"),
            source: Some(Box::new(e)),
        })
    }

    /// Fetch a lead form submission by id. Retries once on a transient
    /// status.
    pub async fn get_leadgen(
        &self,
        leadgen_id: &str,
        access_token: &str,
    ) -> Result<LeadgenData, MuabotError> {
        let url = format!("{}/{leadgen_id}", self.base_url);
        let body = self
            .get_with_retry(
                &url,
                &[
                    ("fields", "id,created_time,field_data"),
                    ("access_token", access_token),
                ],
            )
            .await?;
        serde_json::from_str(&body).map_err(|e| MuabotError::Graph {
            message: format!("failed to parse leadgen data: {e}"),
            source: Some(Box::new(e)),
        })
    }

    /// Publish a text post to the page feed. Returns the new post id.
    pub async fn publish_post(
        &self,
        page_id: &str,
        access_token: &str,
        message: &str,
        link: Option<&str>,
    ) -> Result<String, MuabotError> {
        let url = format!("{}/{page_id}/feed", self.base_url);
        let mut form = vec![("message", message), ("access_token", access_token)];
        if let Some(link) = link {
            form.push(("link", link));
        }
        self.publish(&url, &form).await
    }

    /// Publish a photo by URL to the page. Returns the new photo id.
    pub async fn publish_photo(
        &self,
        page_id: &str,
        access_token: &str,
        photo_url: &str,
        caption: Option<&str>,
    ) -> Result<String, MuabotError> {
        let url = format!("{}/{page_id}/photos", self.base_url);
        let mut form = vec![("url", photo_url), ("access_token", access_token)];
        if let Some(caption) = caption {
            form.push(("caption", caption));
        }
        self.publish(&url, &form).await
    }

    async fn publish(&self, url: &str, form: &[(&str, &str)]) -> Result<String, MuabotError> {
        let response = self
            .client
            .post(url)
            .form(form)
            .send()
            .await
            .map_err(|e| MuabotError::Graph {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        debug!(status = %status, url, "publish response received");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(graph_error(status, &body));
        }

        let body = response.text().await.unwrap_or_default();
        let parsed: PublishResponse =
            serde_json::from_str(&body).map_err(|e| MuabotError::Graph {
                message: format!("failed to parse publish response: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(parsed.id)
    }

    /// GET with a single retry after 1 second on 429/500/503.
    async fn get_with_retry(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<String, MuabotError> {
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                warn!(attempt, url, "retrying Graph request after transient error");
                tokio::time::sleep(Duration::from_secs(1)).await;
            }

            let response = self
                .client
                .get(url)
                .query(query)
                .send()
                .await
                .map_err(|e| MuabotError::Graph {
                    message: format!("HTTP request failed: {e}"),
                    source: Some(Box::new(e)),
                })?;

            let status = response.status();
            debug!(status = %status, attempt, url, "Graph response received");

            if status.is_success() {
                return response.text().await.map_err(|e| MuabotError::Graph {
                    message: format!("failed to read response body: {e}"),
                    source: Some(Box::new(e)),
                });
            }

            if is_transient_error(status) && attempt < self.max_retries {
                let body = response.text().await.unwrap_or_default();
                warn!(status = %status, body = %body, "transient error, will retry");
                last_error = Some(graph_error(status, &body));
                continue;
            }

            let body = response.text().await.unwrap_or_default();
            return Err(graph_error(status, &body));
        }

        Err(last_error.unwrap_or_else(|| MuabotError::Graph {
            message: "Graph request failed after retries".into(),
            source: None,
        }))
    }
}

/// Map a non-2xx Graph response to an error, extracting the structured
/// message when the body has Graph's error envelope.
fn graph_error(status: reqwest::StatusCode, body: &str) -> MuabotError {
    let message = match serde_json::from_str::<GraphErrorResponse>(body) {
        Ok(parsed) => format!(
            "Graph API error ({}, code {}): {}",
            parsed.error.type_, parsed.error.code, parsed.error.message
        ),
        Err(_) => format!("Graph API returned {status}: {body}"),
    };
    MuabotError::Graph {
        message,
        source: None,
    }
}

/// Returns true for HTTP status codes that indicate transient errors worth retrying.
fn is_transient_error(status: reqwest::StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 503)
}

#[cfg(test)]
mod tests {
    use super::*;
    use muabot_core::{Psid, QuickReply};
    use wiremock::matchers::{body_string_contains, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: &str) -> GraphClient {
        let config = FacebookConfig {
            verify_token: "vt".into(),
            app_secret: None,
            graph_base_url: base_url.to_string(),
            send_timeout_secs: 5,
        };
        GraphClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn send_message_posts_to_me_messages() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/me/messages"))
            .and(query_param("access_token", "EAAB-tok"))
            .and(body_string_contains("RESPONSE"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "recipient_id": "2408", "message_id": "m_out_1"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let request = SendMessageRequest::text(&Psid("2408".into()), "Xin chào!");
        client.send_message("EAAB-tok", &request).await.unwrap();
    }

    #[tokio::test]
    async fn send_message_does_not_retry_on_500() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/me/messages"))
            .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
                "error": {"message": "Temporary send failure", "type": "FacebookApiException", "code": 1}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let request = SendMessageRequest::text(&Psid("2408".into()), "hi");
        let result = client.send_message("tok", &request).await;
        assert!(result.is_err(), "send must fail without retrying");
    }

    #[tokio::test]
    async fn send_message_extracts_graph_error_message() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/me/messages"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": {
                    "message": "Invalid OAuth access token.",
                    "type": "OAuthException",
                    "code": 190
                }
            })))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let request = SendMessageRequest::text(&Psid("2408".into()), "hi");
        let err = client.send_message("bad", &request).await.unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("OAuthException"), "got: {msg}");
        assert!(msg.contains("Invalid OAuth access token."), "got: {msg}");
        assert!(msg.contains("190"), "got: {msg}");
    }

    #[tokio::test]
    async fn get_page_info_parses_fields() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/1234567890"))
            .and(query_param("access_token", "tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "1234567890",
                "name": "Quán Cà Phê Mua",
                "category": "Coffee shop",
                "fan_count": 1280,
                "link": "https://facebook.com/quancaphemua",
                "picture": {"data": {"url": "https://example.com/pic.jpg"}}
            })))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let info = client.get_page_info("1234567890", "tok").await.unwrap();
        assert_eq!(info.name, "Quán Cà Phê Mua");
        assert_eq!(info.fan_count, Some(1280));
        assert_eq!(info.picture.unwrap().data.url, "https://example.com/pic.jpg");
    }

    #[tokio::test]
    async fn get_page_info_retries_on_429() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/555"))
            .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
                "error": {"message": "Rate limited", "type": "ThrottleException", "code": 4}
            })))
            .up_to_n_times(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/555"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "555", "name": "Retry Shop"
            })))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let info = client.get_page_info("555", "tok").await.unwrap();
        assert_eq!(info.name, "Retry Shop");
    }

    #[tokio::test]
    async fn get_page_info_exhausts_retries_on_503() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/666"))
            .respond_with(ResponseTemplate::new(503).set_body_json(serde_json::json!({
                "error": {"message": "Service unavailable", "type": "TransientException", "code": 2}
            })))
            .expect(2)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let result = client.get_page_info("666", "tok").await;
        assert!(result.is_err());
        let msg = result.unwrap_err().to_string();
        assert!(msg.contains("TransientException"), "got: {msg}");
    }

    #[tokio::test]
    async fn get_page_info_fails_fast_on_401() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/777"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "error": {"message": "Bad token", "type": "OAuthException", "code": 190}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let result = client.get_page_info("777", "tok").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn get_leadgen_parses_field_data() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/lead_001"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "lead_001",
                "created_time": "2026-02-04T10:00:00+0000",
                "field_data": [
                    {"name": "full_name", "values": ["Nguyễn Văn An"]},
                    {"name": "phone_number", "values": ["+84912345678"]}
                ]
            })))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let lead = client.get_leadgen("lead_001", "tok").await.unwrap();
        assert_eq!(lead.field_data.len(), 2);
        assert_eq!(lead.field_data[0].name, "full_name");
        assert_eq!(lead.field_data[1].values[0], "+84912345678");
    }

    #[tokio::test]
    async fn publish_post_returns_id() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/888/feed"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "888_123"
            })))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let id = client
            .publish_post("888", "tok", "Khuyến mãi hôm nay!", None)
            .await
            .unwrap();
        assert_eq!(id, "888_123");
    }

    #[tokio::test]
    async fn publish_photo_returns_id() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/888/photos"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "ph_456"
            })))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let id = client
            .publish_photo("888", "tok", "https://example.com/p.jpg", Some("Món mới"))
            .await
            .unwrap();
        assert_eq!(id, "ph_456");
    }

    #[tokio::test]
    async fn quick_replies_serialized_in_send_body() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/me/messages"))
            .and(body_string_contains("quick_replies"))
            .and(body_string_contains("PRODUCT_7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "recipient_id": "2408", "message_id": "m_out_2"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let replies = vec![QuickReply {
            title: "Cà phê".into(),
            payload: "PRODUCT_7".into(),
        }];
        let request =
            SendMessageRequest::with_quick_replies(&Psid("2408".into()), "Chọn món:", &replies);
        client.send_message("tok", &request).await.unwrap();
    }
}
