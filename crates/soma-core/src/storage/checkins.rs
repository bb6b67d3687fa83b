//! Repository for check-in rows behind the Supabase REST interface.
//!
//! Rows are insert-only. Reads always ask the store to filter, order, and
//! limit server-side so the service never pages through a user's history.

use reqwest::RequestBuilder;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::{
    error::{Result, StoreError},
    models::{CheckinSummary, NewCheckin},
};

/// Collection holding one row per submitted check-in.
const COLLECTION: &str = "checkins";

/// Field subset selected for read-back responses.
const SUMMARY_FIELDS: &str = "created_at,soma,insight";

/// Shape of a PostgREST error body.
#[derive(Debug, Deserialize)]
struct RestError {
    message: String,
}

/// Repository for check-in storage operations.
#[derive(Debug, Clone)]
pub struct Repository {
    http: reqwest::Client,
    collection: Url,
    service_role_key: String,
}

impl Repository {
    /// Creates a repository bound to one project's check-in collection.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Endpoint` if the collection URL cannot be
    /// derived from the project base URL.
    pub fn new(http: reqwest::Client, base: &Url, service_role_key: String) -> Result<Self> {
        let collection = base
            .join(&format!("/rest/v1/{COLLECTION}"))
            .map_err(|e| StoreError::Endpoint(e.to_string()))?;

        Ok(Self { http, collection, service_role_key })
    }

    /// Inserts one check-in row. `created_at` is assigned by the store.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Transport` if the request never completes, or
    /// `StoreError::Rejected` with the API's message on a non-success
    /// status. No partial writes are possible: the insert either lands or
    /// the error surfaces.
    pub async fn insert(&self, row: &NewCheckin) -> Result<()> {
        self.send(
            self.http
                .post(self.collection.clone())
                .header("Prefer", "return=minimal")
                .json(row),
        )
        .await?;

        debug!(owner = %row.telegram_user_id, "check-in stored");
        Ok(())
    }

    /// Fetches the caller's newest check-in, reduced to the summary
    /// fields, or `None` when the user has no rows.
    ///
    /// Ordering and the limit are applied by the store:
    /// `created_at` descending, one row.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Rejected` with the API's message on rejection
    /// or `StoreError::Decode` if the row shape is unexpected.
    pub async fn latest_for_user(&self, owner_id: &str) -> Result<Option<CheckinSummary>> {
        let owner_filter = format!("eq.{owner_id}");

        let response = self
            .send(self.http.get(self.collection.clone()).query(&[
                ("select", SUMMARY_FIELDS),
                ("telegram_user_id", owner_filter.as_str()),
                ("order", "created_at.desc"),
                ("limit", "1"),
            ]))
            .await?;

        let mut rows: Vec<CheckinSummary> =
            response.json().await.map_err(|e| StoreError::Decode(e.to_string()))?;

        Ok(if rows.is_empty() { None } else { Some(rows.remove(0)) })
    }

    /// Metadata-only reachability probe against the collection.
    pub(crate) async fn ping(&self) -> Result<()> {
        self.send(self.http.head(self.collection.clone()).query(&[("limit", "0")])).await?;
        Ok(())
    }

    /// Attaches credentials, sends, and maps non-success statuses to
    /// `StoreError::Rejected` carrying the API's own message.
    async fn send(&self, request: RequestBuilder) -> Result<reqwest::Response> {
        let response = request
            .header("apikey", &self.service_role_key)
            .bearer_auth(&self.service_role_key)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<RestError>(&body).map(|e| e.message).unwrap_or_else(
            |_| {
                if body.is_empty() {
                    format!("storage returned status {status}")
                } else {
                    body
                }
            },
        );

        Err(StoreError::Rejected { status: status.as_u16(), message })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};
    use wiremock::{
        matchers::{body_partial_json, header, method, path, query_param},
        Mock, MockServer, ResponseTemplate,
    };

    use super::*;
    use crate::storage::Storage;

    const SERVICE_KEY: &str = "service-role-test-key";

    fn test_storage(server: &MockServer) -> Storage {
        Storage::connect(reqwest::Client::new(), &server.uri(), SERVICE_KEY).unwrap()
    }

    fn sample_row() -> NewCheckin {
        NewCheckin {
            telegram_user_id: "42".to_string(),
            sleep: json!(7),
            energy: json!(3),
            stress: json!(1),
            activity: json!("walk"),
            alcohol: false,
            soma: json!(5),
            insight: "Based on your check-in.".to_string(),
        }
    }

    #[tokio::test]
    async fn insert_posts_row_with_credentials() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/rest/v1/checkins"))
            .and(header("apikey", SERVICE_KEY))
            .and(header("authorization", format!("Bearer {SERVICE_KEY}")))
            .and(header("Prefer", "return=minimal"))
            .and(body_partial_json(json!({
                "telegram_user_id": "42",
                "alcohol": false,
                "insight": "Based on your check-in."
            })))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let storage = test_storage(&server);
        storage.checkins.insert(&sample_row()).await.unwrap();
    }

    #[tokio::test]
    async fn insert_surfaces_rest_error_message() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/rest/v1/checkins"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "message": "permission denied for table checkins"
            })))
            .mount(&server)
            .await;

        let storage = test_storage(&server);
        let err = storage.checkins.insert(&sample_row()).await.unwrap_err();

        match err {
            StoreError::Rejected { status, message } => {
                assert_eq!(status, 403);
                assert_eq!(message, "permission denied for table checkins");
            },
            other => panic!("expected Rejected, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn latest_queries_with_filter_order_and_limit() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/checkins"))
            .and(query_param("select", "created_at,soma,insight"))
            .and(query_param("telegram_user_id", "eq.42"))
            .and(query_param("order", "created_at.desc"))
            .and(query_param("limit", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                "created_at": "2024-05-06T08:00:00+00:00",
                "soma": 5,
                "insight": "Based on your check-in."
            }])))
            .expect(1)
            .mount(&server)
            .await;

        let storage = test_storage(&server);
        let latest = storage.checkins.latest_for_user("42").await.unwrap().unwrap();

        assert_eq!(latest.soma, json!(5));
        assert_eq!(latest.insight, "Based on your check-in.");
    }

    #[tokio::test]
    async fn latest_returns_none_for_empty_result() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/checkins"))
            .respond_with(ResponseTemplate::new(200).set_body_json(Value::Array(vec![])))
            .mount(&server)
            .await;

        let storage = test_storage(&server);
        assert!(storage.checkins.latest_for_user("42").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn latest_reports_undecodable_rows() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/checkins"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([{ "created_at": "garbage" }])),
            )
            .mount(&server)
            .await;

        let storage = test_storage(&server);
        let err = storage.checkins.latest_for_user("42").await.unwrap_err();
        assert!(matches!(err, StoreError::Decode(_)));
    }

    #[tokio::test]
    async fn rejection_without_json_body_falls_back_to_status_text() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/rest/v1/checkins"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let storage = test_storage(&server);
        let err = storage.checkins.insert(&sample_row()).await.unwrap_err();

        match err {
            StoreError::Rejected { status, message } => {
                assert_eq!(status, 502);
                assert!(message.contains("502"));
            },
            other => panic!("expected Rejected, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn ping_issues_metadata_only_request() {
        let server = MockServer::start().await;

        Mock::given(method("HEAD"))
            .and(path("/rest/v1/checkins"))
            .and(query_param("limit", "0"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let storage = test_storage(&server);
        storage.health_check().await.unwrap();
    }
}
