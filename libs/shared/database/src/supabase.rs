use anyhow::{Result, anyhow};
use async_trait::async_trait;
use reqwest::{
    Client,
    header::{HeaderMap, HeaderValue, CONTENT_TYPE, AUTHORIZATION},
    Method,
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, error};

use shared_config::AppConfig;

use crate::store::{Filter, RecordKey, RecordStore};

pub struct SupabaseClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl SupabaseClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.supabase_url.trim_end_matches('/').to_string(),
            api_key: config.supabase_api_key.clone(),
        }
    }

    fn get_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();

        headers.insert("apikey", HeaderValue::from_str(&self.api_key)?);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.api_key))?,
        );

        Ok(headers)
    }

    pub async fn request<T>(&self, method: Method, path: &str, body: Option<Value>) -> Result<T>
    where T: DeserializeOwned {
        self.request_with_headers(method, path, body, None).await
    }

    pub async fn request_with_headers<T>(&self, method: Method, path: &str,
                                         body: Option<Value>,
                                         extra_headers: Option<HeaderMap>)
                                         -> Result<T>
    where T: DeserializeOwned {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making {} request to {}", method, url);

        let mut headers = self.get_headers()?;
        if let Some(extra) = extra_headers {
            headers.extend(extra);
        }

        let mut req = self.client.request(method, &url)
            .headers(headers);

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            error!("API error ({}): {}", status, error_text);

            return Err(match status.as_u16() {
                401 | 403 => anyhow!("Authentication error: {}", error_text),
                404 => anyhow!("Resource not found: {}", error_text),
                _ => anyhow!("API error ({}): {}", status, error_text),
            });
        }

        let data = response.json::<T>().await?;
        Ok(data)
    }
}

/// `RecordStore` over the PostgREST interface (`/rest/v1/{table}`).
pub struct SupabaseStore {
    supabase: SupabaseClient,
}

impl SupabaseStore {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    fn eq_param(attribute: &str, value: &str) -> String {
        format!("{}=eq.{}", urlencoding::encode(attribute), urlencoding::encode(value))
    }

    fn representation_headers(prefer: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("Prefer", HeaderValue::from_static(prefer));
        headers
    }
}

#[async_trait]
impl RecordStore for SupabaseStore {
    async fn get(&self, table: &str, key: &RecordKey) -> Result<Option<Value>> {
        let path = format!(
            "/rest/v1/{}?select=*&{}&limit=1",
            table,
            Self::eq_param(&key.attribute, &key.value)
        );

        let mut result: Vec<Value> = self.supabase.request(Method::GET, &path, None).await?;

        Ok(if result.is_empty() { None } else { Some(result.swap_remove(0)) })
    }

    async fn put(&self, table: &str, key_attribute: &str, record: Value) -> Result<()> {
        let path = format!("/rest/v1/{}?on_conflict={}", table, urlencoding::encode(key_attribute));

        let _: Vec<Value> = self.supabase.request_with_headers(
            Method::POST,
            &path,
            Some(record),
            Some(Self::representation_headers("resolution=merge-duplicates,return=representation")),
        ).await?;

        Ok(())
    }

    async fn scan(&self, table: &str, filters: &[Filter]) -> Result<Vec<Value>> {
        let mut path = format!("/rest/v1/{}?select=*", table);
        for filter in filters {
            path.push('&');
            path.push_str(&Self::eq_param(&filter.attribute, &filter.value));
        }

        self.supabase.request(Method::GET, &path, None).await
    }

    async fn update(&self, table: &str, key: &RecordKey, fields: Map<String, Value>) -> Result<bool> {
        let path = format!("/rest/v1/{}?{}", table, Self::eq_param(&key.attribute, &key.value));

        let updated: Vec<Value> = self.supabase.request_with_headers(
            Method::PATCH,
            &path,
            Some(Value::Object(fields)),
            Some(Self::representation_headers("return=representation")),
        ).await?;

        Ok(!updated.is_empty())
    }
}
