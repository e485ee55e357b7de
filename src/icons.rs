use crate::error::AppError;
use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD};

const DEFAULT_CONTENT_TYPE: &str = "image/png";

/// Raw icon bytes plus the content type the server declared for them.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddedIcon {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl EmbeddedIcon {
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.content_type, STANDARD.encode(&self.bytes))
    }
}

#[async_trait]
pub trait IconFetcher: Send + Sync {
    async fn fetch_icon(&self, url: &str) -> Result<EmbeddedIcon, AppError>;
}

pub struct HttpIconFetcher {
    client: reqwest::Client,
}

impl HttpIconFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl IconFetcher for HttpIconFetcher {
    async fn fetch_icon(&self, url: &str) -> Result<EmbeddedIcon, AppError> {
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(AppError::HttpStatus(response.status()));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();
        let bytes = response.bytes().await?.to_vec();

        Ok(EmbeddedIcon {
            content_type,
            bytes,
        })
    }
}
