// Record persistence against a hosted PostgREST-compatible CRUD API

use async_trait::async_trait;
use reqwest::{header, Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use xss_core::{IngestRecord, NewRecord, RECORD_COLUMNS};

use super::{RecordStore, StoreError, NO_SUCH_ID};

/// Client for a PostgREST endpoint such as `https://<project>.supabase.co/rest/v1`.
pub struct PostgrestStore {
    client: Client,
    endpoint: String,
    api_key: String,
    select: String,
}

impl PostgrestStore {
    pub fn new(base_url: &str, api_key: &str, table: &str) -> Result<Self, StoreError> {
        let client = Client::builder()
            .user_agent(concat!("xss-collector/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/{}", base_url.trim_end_matches('/'), table),
            api_key: api_key.to_string(),
            select: RECORD_COLUMNS.replace(' ', ""),
        })
    }

    fn request(&self, method: Method) -> RequestBuilder {
        self.client
            .request(method, &self.endpoint)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header(header::ACCEPT, "application/json")
    }

    /// Ask for the affected rows back, restricted to `select` columns.
    fn returning(&self, method: Method, select: &str) -> RequestBuilder {
        self.request(method)
            .header("Prefer", "return=representation")
            .query(&[("select", select)])
    }

    async fn records(response: Response) -> Result<Vec<IngestRecord>, StoreError> {
        Self::rows(response).await
    }

    async fn rows<T: DeserializeOwned>(response: Response) -> Result<Vec<T>, StoreError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(StoreError::Rejected {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        serde_json::from_str(&body).map_err(|e| StoreError::Malformed(e.to_string()))
    }
}

/// Deleted row as returned with `select=id`.
#[derive(Debug, Deserialize)]
struct RowId {
    id: i64,
}

/// PostgREST reports errors as `{"message": ..., "details": ...}`.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}

fn eq(value: impl std::fmt::Display) -> String {
    format!("eq.{value}")
}

#[async_trait]
impl RecordStore for PostgrestStore {
    async fn insert(&self, record: NewRecord) -> Result<IngestRecord, StoreError> {
        let response = self
            .returning(Method::POST, &self.select)
            .json(&[&record])
            .send()
            .await?;
        Self::records(response)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::Malformed("insert returned no rows".to_string()))
    }

    async fn update_screenshot_by_url(
        &self,
        url: &str,
        screenshot: Option<&str>,
    ) -> Result<Vec<IngestRecord>, StoreError> {
        let response = self
            .returning(Method::PATCH, &self.select)
            .query(&[("url", eq(url))])
            .json(&json!({ "screenshot": screenshot }))
            .send()
            .await?;
        Self::records(response).await
    }

    async fn update_screenshot_by_id(
        &self,
        id: i64,
        url: &str,
        screenshot: Option<&str>,
    ) -> Result<Vec<IngestRecord>, StoreError> {
        let response = self
            .returning(Method::PATCH, &self.select)
            .query(&[("id", eq(id)), ("url", eq(url))])
            .json(&json!({ "screenshot": screenshot }))
            .send()
            .await?;
        Self::records(response).await
    }

    async fn list(&self) -> Result<Vec<IngestRecord>, StoreError> {
        let response = self
            .request(Method::GET)
            .query(&[("select", self.select.as_str()), ("order", "id.asc")])
            .send()
            .await?;
        Self::records(response).await
    }

    async fn delete_by_id(&self, id: i64) -> Result<bool, StoreError> {
        let response = self
            .returning(Method::DELETE, "id")
            .query(&[("id", eq(id))])
            .send()
            .await?;
        let deleted: Vec<RowId> = Self::rows(response).await?;
        Ok(deleted.iter().any(|row| row.id == id))
    }

    async fn delete_all(&self) -> Result<usize, StoreError> {
        // PostgREST refuses an unfiltered DELETE
        let response = self
            .returning(Method::DELETE, "id")
            .query(&[("id", format!("neq.{NO_SUCH_ID}"))])
            .send()
            .await?;
        let deleted: Vec<RowId> = Self::rows(response).await?;
        Ok(deleted.len())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let response = self
            .request(Method::GET)
            .query(&[("select", "id"), ("limit", "1")])
            .send()
            .await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await?;
            Err(StoreError::Rejected {
                status: status.as_u16(),
                message: error_message(&body),
            })
        }
    }
}
