//! Supabase-backed long-term store, speaking PostgREST.
//!
//! Tables: `users`, `turns`, `preferences`, `special_memories`, `events`.
//! Row shapes are the serde forms of the core record types; `turns`
//! omits `message_id` on insert and lets the database assign it.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use niyati_core::{
    Error, EventKind, MemoryStore, MoodPatterns, Result, SessionEvent, SpecialMemory, TurnRecord,
    UserProfile,
};
use serde_json::json;

use crate::patterns::compute_patterns;
use crate::MemoryError;

const SEARCH_LIMIT: usize = 5;
const PATTERN_WINDOW_DAYS: i64 = 30;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// PostgREST client for the Supabase row store.
pub struct SupabaseStore {
    client: reqwest::Client,
    base_url: String,
    key: String,
}

impl SupabaseStore {
    pub fn new(url: impl Into<String>, key: impl Into<String>) -> Result<Self> {
        let base_url = url.into();
        let key = key.into();
        if base_url.is_empty() || key.is_empty() {
            return Err(MemoryError::Configuration(
                "Supabase URL and key are required".to_string(),
            )
            .into());
        }

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| MemoryError::Configuration(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            key,
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn request(&self, method: reqwest::Method, table: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, self.table_url(table))
            .header("apikey", &self.key)
            .header("Authorization", format!("Bearer {}", self.key))
    }

    async fn check(response: reqwest::Response) -> std::result::Result<reqwest::Response, MemoryError> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let error_text = response.text().await.unwrap_or_default();
            Err(MemoryError::Api(format!("HTTP {}: {}", status, error_text)))
        }
    }

    async fn fetch_profile(&self, user_id: &str) -> std::result::Result<Option<UserProfile>, MemoryError> {
        let response = self
            .request(reqwest::Method::GET, "users")
            .query(&[("user_id", format!("eq.{}", user_id)), ("limit", "1".to_string())])
            .send()
            .await?;

        let rows: Vec<UserProfile> = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| MemoryError::Api(format!("malformed users row: {}", e)))?;
        Ok(rows.into_iter().next())
    }

    async fn insert_profile(&self, profile: &UserProfile) -> std::result::Result<(), MemoryError> {
        let response = self
            .request(reqwest::Method::POST, "users")
            .query(&[("on_conflict", "user_id")])
            .header("Prefer", "resolution=merge-duplicates")
            .json(profile)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }
}

#[async_trait]
impl MemoryStore for SupabaseStore {
    async fn create_user(&self, username: &str, display_name: &str) -> Result<UserProfile> {
        let profile = UserProfile::new(uuid::Uuid::new_v4().to_string(), display_name)
            .with_username(username);
        self.insert_profile(&profile).await.map_err(Error::from)?;
        Ok(profile)
    }

    async fn load_profile(
        &self,
        user_id: &str,
        display_name: Option<&str>,
    ) -> Result<UserProfile> {
        if let Some(profile) = self.fetch_profile(user_id).await.map_err(Error::from)? {
            return Ok(profile);
        }

        let profile = UserProfile::new(user_id, display_name.unwrap_or("dost"));
        self.insert_profile(&profile).await.map_err(Error::from)?;
        Ok(profile)
    }

    async fn touch_last_active(&self, user_id: &str) -> Result<()> {
        let response = self
            .request(reqwest::Method::PATCH, "users")
            .query(&[("user_id", format!("eq.{}", user_id))])
            .json(&json!({ "last_active": Utc::now() }))
            .send()
            .await
            .map_err(MemoryError::from)
            .map_err(Error::from)?;
        Self::check(response).await.map_err(Error::from)?;
        Ok(())
    }

    async fn append_turn(&self, turn: &TurnRecord) -> Result<()> {
        let response = self
            .request(reqwest::Method::POST, "turns")
            .json(turn)
            .send()
            .await
            .map_err(MemoryError::from)
            .map_err(Error::from)?;
        Self::check(response).await.map_err(Error::from)?;
        Ok(())
    }

    async fn search_memories(&self, user_id: &str, query: &str) -> Result<Vec<TurnRecord>> {
        let response = self
            .request(reqwest::Method::GET, "turns")
            .query(&[
                ("user_id", format!("eq.{}", user_id)),
                ("user_text", format!("wfts.{}", query)),
                ("order", "timestamp.desc".to_string()),
                ("limit", SEARCH_LIMIT.to_string()),
            ])
            .send()
            .await;

        // Text search needs server-side support; degrade to recency.
        let rows = match response {
            Ok(resp) => match Self::check(resp).await {
                Ok(resp) => resp.json::<Vec<TurnRecord>>().await.ok(),
                Err(e) => {
                    tracing::debug!(error = %e, "text search unavailable, falling back to recent turns");
                    None
                }
            },
            Err(e) => {
                tracing::debug!(error = %e, "text search request failed, falling back to recent turns");
                None
            }
        };

        match rows {
            Some(rows) => Ok(rows),
            None => self.get_recent(user_id, SEARCH_LIMIT).await,
        }
    }

    async fn get_recent(&self, user_id: &str, n: usize) -> Result<Vec<TurnRecord>> {
        let response = self
            .request(reqwest::Method::GET, "turns")
            .query(&[
                ("user_id", format!("eq.{}", user_id)),
                ("order", "timestamp.desc".to_string()),
                ("limit", n.to_string()),
            ])
            .send()
            .await
            .map_err(MemoryError::from)
            .map_err(Error::from)?;

        let rows: Vec<TurnRecord> = Self::check(response)
            .await
            .map_err(Error::from)?
            .json()
            .await
            .map_err(|e| Error::Store(format!("malformed turns row: {}", e)))?;
        Ok(rows)
    }

    async fn get_patterns(&self, user_id: &str) -> Result<MoodPatterns> {
        let cutoff = Utc::now() - chrono::Duration::days(PATTERN_WINDOW_DAYS);
        let response = self
            .request(reqwest::Method::GET, "turns")
            .query(&[
                ("user_id", format!("eq.{}", user_id)),
                ("timestamp", format!("gte.{}", cutoff.to_rfc3339())),
                ("order", "timestamp.asc".to_string()),
            ])
            .send()
            .await
            .map_err(MemoryError::from)
            .map_err(Error::from)?;

        let rows: Vec<TurnRecord> = Self::check(response)
            .await
            .map_err(Error::from)?
            .json()
            .await
            .map_err(|e| Error::Store(format!("malformed turns row: {}", e)))?;
        Ok(compute_patterns(&rows))
    }

    async fn upsert_preference(
        &self,
        user_id: &str,
        preference_type: &str,
        value: &str,
        weight: f32,
    ) -> Result<()> {
        let row = json!({
            "user_id": user_id,
            "preference_type": preference_type,
            "value": value,
            "weight": weight,
            "updated_at": Utc::now(),
        });

        let response = self
            .request(reqwest::Method::POST, "preferences")
            .query(&[("on_conflict", "user_id,preference_type")])
            .header("Prefer", "resolution=merge-duplicates")
            .json(&row)
            .send()
            .await
            .map_err(MemoryError::from)
            .map_err(Error::from)?;
        Self::check(response).await.map_err(Error::from)?;
        Ok(())
    }

    async fn add_special_memory(&self, memory: &SpecialMemory) -> Result<()> {
        let response = self
            .request(reqwest::Method::POST, "special_memories")
            .json(memory)
            .send()
            .await
            .map_err(MemoryError::from)
            .map_err(Error::from)?;
        Self::check(response).await.map_err(Error::from)?;
        Ok(())
    }

    async fn append_event(&self, user_id: &str, kind: EventKind) -> Result<()> {
        let event = SessionEvent::new(user_id, kind);
        let response = self
            .request(reqwest::Method::POST, "events")
            .json(&event)
            .send()
            .await
            .map_err(MemoryError::from)
            .map_err(Error::from)?;
        Self::check(response).await.map_err(Error::from)?;
        Ok(())
    }
}
