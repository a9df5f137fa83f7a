use crate::ai::with_retries;
use crate::commentary::CommentaryBackend;
use crate::error::{Result, VerbumError};
use futures_util::future::BoxFuture;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Body of `POST /api/get-info`
#[derive(Debug, Serialize, Deserialize)]
pub struct InfoRequest {
    pub prompt: String,
}

/// Commentary through the server's `/api/get-info` route
#[derive(Clone)]
pub struct ProxyCommentary {
    client: Client,
    base_url: String,
    attempts: u32,
}

impl ProxyCommentary {
    pub fn new(base_url: &str, attempts: u32) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            attempts: attempts.max(1),
        }
    }

    pub fn endpoint(&self) -> String {
        format!("{}/api/get-info", self.base_url)
    }

    async fn post(&self, prompt: &str) -> Result<String> {
        let response = self
            .client
            .post(self.endpoint())
            .json(&InfoRequest {
                prompt: prompt.to_string(),
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(VerbumError::ExternalService(format!(
                "commentary proxy returned {}",
                response.status()
            )));
        }

        Ok(response.text().await?)
    }
}

impl CommentaryBackend for ProxyCommentary {
    fn complete<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Result<String>> {
        Box::pin(with_retries(self.attempts, move || self.post(prompt)))
    }
}
