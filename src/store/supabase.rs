use super::*;
use reqwest::{header, StatusCode};
use serde::Serialize;

/// Challenge store backed by a Supabase project, talking to its PostgREST
/// endpoint (`/rest/v1/<table>`).
pub struct SupabaseStore {
    base_url: String,
    api_key: String,
    table: String,
    timeout: Duration,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct StatusPatch<'a> {
    status: ChallengeStatus,
    player: &'a str,
}

impl SupabaseStore {
    pub fn new(base_url: &str, api_key: &str, table: &str, timeout: Duration) -> StoreResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StoreError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            table: table.to_string(),
            timeout,
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.table)
    }

    fn request(&self, method: reqwest::Method) -> reqwest::RequestBuilder {
        self.client
            .request(method, self.table_url())
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    fn map_send_error(&self, e: reqwest::Error) -> StoreError {
        if e.is_timeout() {
            StoreError::Timeout(self.timeout)
        } else {
            StoreError::Request(e.to_string())
        }
    }

    /// Turn a non-success response into a `StoreError::Status` carrying the body
    async fn check_status(response: reqwest::Response) -> StoreResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(status_error(status, body))
    }
}

fn status_error(status: StatusCode, body: String) -> StoreError {
    StoreError::Status {
        status: status.as_u16(),
        body,
    }
}

#[async_trait]
impl ChallengeStore for SupabaseStore {
    async fn list_all(&self) -> StoreResult<Vec<Challenge>> {
        let response = self
            .request(reqwest::Method::GET)
            .query(&[("select", "*"), ("order", "date.asc")])
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        Self::check_status(response)
            .await?
            .json::<Vec<Challenge>>()
            .await
            .map_err(|e| StoreError::Parse(e.to_string()))
    }

    async fn insert(&self, draft: NewChallenge) -> StoreResult<()> {
        let response = self
            .request(reqwest::Method::POST)
            .header("Prefer", "return=minimal")
            .json(&[draft])
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        Self::check_status(response).await?;
        Ok(())
    }

    async fn update_status(
        &self,
        id: &str,
        status: ChallengeStatus,
        player: &str,
    ) -> StoreResult<()> {
        let filter = format!("eq.{}", id);
        let response = self
            .request(reqwest::Method::PATCH)
            .query(&[("id", filter.as_str())])
            .header("Prefer", "return=representation")
            .header(header::ACCEPT, "application/json")
            .json(&StatusPatch { status, player })
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        // PostgREST answers an update matching no rows with an empty list
        let updated: Vec<Challenge> = Self::check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| StoreError::Parse(e.to_string()))?;

        if updated.is_empty() {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "supabase"
    }
}
