use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

use crate::config::CliConfig;

pub struct EvoClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl EvoClient {
    pub fn new(config: &CliConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn add_auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => req.header("X-API-Key", key),
            None => req,
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let req = self.client.get(self.url(path));
        let resp = self
            .add_auth(req)
            .send()
            .await
            .context("Failed to connect to the evo control surface")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("{status}: {body}");
        }
        resp.json::<T>().await.context("Failed to parse response")
    }

    async fn post<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let req = self.client.post(self.url(path));
        let resp = self
            .add_auth(req)
            .send()
            .await
            .context("Failed to connect to the evo control surface")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("{status}: {body}");
        }
        resp.json::<T>().await.context("Failed to parse response")
    }

    /// `GET /api/status` — Evolver orchestrator snapshot.
    pub async fn get_status(&self) -> Result<serde_json::Value> {
        self.get("/api/status").await
    }

    /// `GET /api/budget` — Token Budget snapshot.
    pub async fn get_budget(&self) -> Result<serde_json::Value> {
        self.get("/api/budget").await
    }

    /// `GET /api/router` — Model Router snapshot.
    pub async fn get_router(&self) -> Result<serde_json::Value> {
        self.get("/api/router").await
    }

    /// `GET /api/generations?limit=`.
    pub async fn recent_generations(&self, limit: usize) -> Result<serde_json::Value> {
        self.get(&format!("/api/generations?limit={limit}")).await
    }

    /// `GET /api/generations/:n`.
    pub async fn get_generation(&self, n: u64) -> Result<serde_json::Value> {
        self.get(&format!("/api/generations/{n}")).await
    }

    /// `GET /api/generations/by-status/:status?limit=`.
    pub async fn generations_by_status(&self, status: &str, limit: usize) -> Result<serde_json::Value> {
        self.get(&format!("/api/generations/by-status/{status}?limit={limit}"))
            .await
    }

    /// `POST /api/control/pause`.
    pub async fn pause(&self) -> Result<serde_json::Value> {
        self.post("/api/control/pause").await
    }

    /// `POST /api/control/resume`.
    pub async fn resume(&self) -> Result<serde_json::Value> {
        self.post("/api/control/resume").await
    }

    /// `POST /api/control/run-once`.
    pub async fn run_once(&self) -> Result<serde_json::Value> {
        self.post("/api/control/run-once").await
    }
}
