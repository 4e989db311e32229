use async_trait::async_trait;
use serde_json::Value;

use super::{indent_for, DocumentStore};
use crate::api::ApiClient;
use crate::error::Result;
use crate::json;
use crate::models::ApiReply;
use crate::surface::SurfaceKind;

/// Identité unique du document de configuration
pub const CONFIG_ID: &str = "config";

/// Document de configuration : opaque, toujours mis à jour (jamais créé)
pub struct ConfigStore {
    api: ApiClient,
}

impl ConfigStore {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl DocumentStore for ConfigStore {
    type Summary = Value;
    type Entry = Value;

    async fn fetch(&self, _id: &str) -> Result<Value> {
        self.api.config().await
    }

    fn render(&self, entry: &Value, kind: SurfaceKind) -> String {
        json::pretty(entry, indent_for(kind))
    }

    /// Le texte saisi part tel quel : ordre des clés et mise en forme conservés
    async fn update(&self, _id: &str, text: &str) -> Result<ApiReply> {
        self.api.save_config(text).await
    }
}
