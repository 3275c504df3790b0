// src/services/storage.rs

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;

use crate::common::error::AppError;

/// Armazenamento do PDF da nota fiscal. Devolve a URL pública do arquivo.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn upload(&self, path: &str, content_type: &str, bytes: Vec<u8>) -> Result<String, AppError>;
}

/// Cliente para um storage compatível com a API `storage/v1/object`.
#[derive(Clone)]
pub struct HttpObjectStorage {
    client: reqwest::Client,
    base_url: String,
    bucket: String,
    key: String,
}

impl HttpObjectStorage {
    pub fn new(client: reqwest::Client, base_url: &str, bucket: &str, key: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            bucket: bucket.to_string(),
            key: key.to_string(),
        }
    }

    pub fn public_url(&self, path: &str) -> String {
        format!("{}/storage/v1/object/public/{}/{}", self.base_url, self.bucket, path)
    }
}

#[async_trait]
impl ObjectStorage for HttpObjectStorage {
    async fn upload(&self, path: &str, content_type: &str, bytes: Vec<u8>) -> Result<String, AppError> {
        let url = format!("{}/storage/v1/object/{}/{}", self.base_url, self.bucket, path);
        self.client
            .post(&url)
            .bearer_auth(&self.key)
            .header(CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?
            .error_for_status()?;

        Ok(self.public_url(path))
    }
}

/// Caminho do anexo: `notas/{id da requisição}/{nome saneado}`.
pub fn attachment_path(requisition_id: uuid::Uuid, file_name: &str) -> String {
    let safe: String = file_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' { c } else { '_' })
        .collect();
    let safe = if safe.trim_matches('_').is_empty() { "nota-fiscal.pdf".to_string() } else { safe };
    format!("notas/{}/{}", requisition_id, safe)
}
