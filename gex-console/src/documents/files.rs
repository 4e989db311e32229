use async_trait::async_trait;
use serde_json::json;

use super::{DocumentStore, Validation};
use crate::api::ApiClient;
use crate::error::{ConsoleError, Result};
use crate::json as fmt;
use crate::models::ApiReply;
use crate::surface::SurfaceKind;

/// Nom de fichier de règles : espaces et `.json` final retirés ;
/// vide, `/`, `\` ou `..` refusés
pub fn normalize_name(raw: &str) -> Result<String> {
    let name = raw.trim();
    let name = name.strip_suffix(".json").unwrap_or(name);
    if name.is_empty() {
        return Err(ConsoleError::MissingName);
    }
    if name.contains('/') || name.contains('\\') || name.contains("..") {
        return Err(ConsoleError::InvalidName(name.to_string()));
    }
    Ok(name.to_string())
}

/// Fichiers JSON bruts de /api/rules/raw, adressés par nom sans extension
pub struct RuleFileStore {
    api: ApiClient,
    new_rule_name: &'static str,
}

impl RuleFileStore {
    pub fn new(api: ApiClient, new_rule_name: &'static str) -> Self {
        Self { api, new_rule_name }
    }
}

#[async_trait]
impl DocumentStore for RuleFileStore {
    type Summary = String;
    type Entry = String;

    fn validation(&self) -> Validation {
        Validation::Lenient
    }

    async fn list(&self) -> Result<Vec<String>> {
        self.api.rule_files().await
    }

    async fn fetch(&self, id: &str) -> Result<String> {
        self.api.rule_file(&normalize_name(id)?).await
    }

    /// Verbatim en surface simple ; l'éditeur de code reformate le JSON valide
    fn render(&self, entry: &String, kind: SurfaceKind) -> String {
        match kind {
            SurfaceKind::Plain => entry.clone(),
            SurfaceKind::Rich if entry.trim().is_empty() => "{}".into(),
            SurfaceKind::Rich => fmt::reformat(entry, fmt::RICH_INDENT),
        }
    }

    fn template(&self, kind: SurfaceKind) -> String {
        let base = json!({
            "name": self.new_rule_name,
            "action": "allow",
            "protocol": "tcp",
            "enabled": true,
            "description": "",
        });
        fmt::pretty(&base, super::indent_for(kind))
    }

    fn identity_for_create(&self, _text: &str, requested: Option<&str>) -> Result<String> {
        normalize_name(requested.unwrap_or_default())
    }

    async fn create(&self, id: &str, text: &str) -> Result<ApiReply> {
        self.api.create_rule_file(&normalize_name(id)?, text).await
    }

    async fn update(&self, id: &str, text: &str) -> Result<ApiReply> {
        self.api.update_rule_file(&normalize_name(id)?, text).await
    }

    async fn delete(&self, id: &str) -> Result<ApiReply> {
        self.api.delete_rule_file(&normalize_name(id)?).await
    }
}
