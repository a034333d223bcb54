use anyhow::{anyhow, Result};
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client, Method,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error};

use shared_config::AppConfig;

/// Non-success response from PostgREST, kept typed so callers can branch on status.
#[derive(Error, Debug, Clone)]
#[error("PostgREST error ({status}): {message}")]
pub struct PostgrestError {
    pub status: u16,
    pub message: String,
}

impl PostgrestError {
    pub fn is_conflict(&self) -> bool {
        self.status == 409
    }

    /// Name of the unique constraint a conflict violated, read from the
    /// PostgREST body (`duplicate key value violates unique constraint "x"`).
    pub fn violated_constraint(&self) -> Option<String> {
        let detail = serde_json::from_str::<Value>(&self.message)
            .ok()
            .and_then(|body| body.get("message").and_then(Value::as_str).map(str::to_string))
            .unwrap_or_else(|| self.message.clone());

        let (_, rest) = detail.split_once("unique constraint \"")?;
        let (name, _) = rest.split_once('"')?;
        Some(name.to_string())
    }
}

/// PostgREST client authenticated with the service-role key. The API issues its
/// own JWTs, so row access is enforced in the services, not by RLS.
pub struct SupabaseClient {
    client: Client,
    base_url: String,
    service_key: String,
}

impl SupabaseClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.supabase_url.trim_end_matches('/').to_string(),
            service_key: config.supabase_service_role_key.clone(),
        }
    }

    fn get_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();

        headers.insert("apikey", HeaderValue::from_str(&self.service_key)?);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.service_key))?,
        );

        Ok(headers)
    }

    pub async fn request<T>(&self, method: Method, path: &str, body: Option<Value>) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.request_with_headers(method, path, body, None).await
    }

    pub async fn request_with_headers<T>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        extra_headers: Option<HeaderMap>,
    ) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making {} request to {}", method, url);

        let mut headers = self.get_headers()?;
        if let Some(extra) = extra_headers {
            headers.extend(extra);
        }

        let mut req = self.client.request(method, &url).headers(headers);

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            error!("API error ({}): {}", status, error_text);

            return Err(PostgrestError {
                status: status.as_u16(),
                message: error_text,
            }
            .into());
        }

        // DELETE/PATCH without `return=representation` answer 204 with no body.
        let text = response.text().await?;
        let text = if text.trim().is_empty() { "null" } else { text.as_str() };

        serde_json::from_str::<T>(text).map_err(|e| anyhow!("Failed to decode response from {}: {}", url, e))
    }

    /// Writes returning the affected rows (`Prefer: return=representation`).
    pub async fn request_returning(
        &self,
        method: Method,
        path: &str,
        body: Value,
    ) -> Result<Vec<Value>> {
        let mut headers = HeaderMap::new();
        headers.insert("Prefer", HeaderValue::from_static("return=representation"));

        self.request_with_headers(method, path, Some(body), Some(headers)).await
    }

    /// Fetch the first row matching a PostgREST query, if any.
    pub async fn select_one<T>(&self, path: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        let rows: Vec<Value> = self.request(Method::GET, path, None).await?;

        match rows.into_iter().next() {
            Some(row) => Ok(Some(serde_json::from_value(row)?)),
            None => Ok(None),
        }
    }

    /// Invoke a Postgres function; each call runs in its own transaction.
    pub async fn rpc<T>(&self, function: &str, args: Value) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let path = format!("/rest/v1/rpc/{}", function);
        self.request(Method::POST, &path, Some(args)).await
    }
}

/// Borrow the [`PostgrestError`] behind an error produced by [`SupabaseClient`].
pub fn postgrest_error(err: &anyhow::Error) -> Option<&PostgrestError> {
    err.downcast_ref::<PostgrestError>()
}
