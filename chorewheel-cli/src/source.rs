//! Where chores come from: a JSON snapshot on disk or the remote chore API.

use anyhow::{bail, Context, Result};
use chorewheel_core::{Chore, Performer, PlanningSnapshot, UserProfile};
use reqwest::header::AUTHORIZATION;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::config::ApiSection;

/// On-disk snapshot, same field names as the API.
#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotFile {
    pub user: UserProfile,
    #[serde(default)]
    pub performers: Vec<Performer>,
    #[serde(default)]
    pub chores: Vec<Chore>,
}

impl From<SnapshotFile> for PlanningSnapshot {
    fn from(f: SnapshotFile) -> Self {
        PlanningSnapshot {
            chores: f.chores,
            user: f.user,
            roster: f.performers.into_iter().collect(),
        }
    }
}

pub fn load_snapshot(path: &Path) -> Result<PlanningSnapshot> {
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let file: SnapshotFile =
        serde_json::from_str(&s).with_context(|| format!("parse {}", path.display()))?;
    Ok(file.into())
}

/// Every API response is wrapped as `{"res": ...}`.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    res: T,
}

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl ApiClient {
    pub fn from_config(api: &ApiSection) -> Result<Self> {
        let token = api.token.clone().ok_or_else(|| {
            anyhow::anyhow!("No API token set. Pass --snapshot <file> or set config.toml [api].token")
        })?;
        Ok(Self {
            http: reqwest::Client::new(),
            base_url: api.base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%url, "GET");

        let resp = self
            .http
            .get(&url)
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .send()
            .await
            .with_context(|| format!("request {url}"))?;

        let status = resp.status();
        if !status.is_success() {
            let txt = resp.text().await.unwrap_or_default();
            bail!("chore API error on {path}: {status} {txt}");
        }

        let body: Envelope<T> = resp
            .json()
            .await
            .with_context(|| format!("parse response from {path}"))?;
        Ok(body.res)
    }

    /// Fetch chores, circle members and the signed-in profile, one after another.
    pub async fn fetch_snapshot(&self) -> Result<PlanningSnapshot> {
        let chores: Vec<Chore> = self.get("/api/v1/chores/").await?;
        let performers: Vec<Performer> = self.get("/api/v1/circles/members/").await?;
        let user: UserProfile = self.get("/api/v1/users/profile").await?;

        Ok(PlanningSnapshot {
            chores,
            user,
            roster: performers.into_iter().collect(),
        })
    }
}
