use async_trait::async_trait;

use super::{indent_for, DocumentStore};
use crate::api::ApiClient;
use crate::error::{ConsoleError, Result};
use crate::json;
use crate::models::{synthetic_rule_id, ApiReply, Rule};
use crate::surface::SurfaceKind;

/// Règles structurées de /api/rules, adressées par id
pub struct RuleStore {
    api: ApiClient,
    new_rule_name: &'static str,
}

impl RuleStore {
    pub fn new(api: ApiClient, new_rule_name: &'static str) -> Self {
        Self { api, new_rule_name }
    }
}

fn parse(text: &str) -> Result<Rule> {
    serde_json::from_str(text).map_err(ConsoleError::InvalidJson)
}

#[async_trait]
impl DocumentStore for RuleStore {
    type Summary = Rule;
    type Entry = Rule;

    async fn list(&self) -> Result<Vec<Rule>> {
        self.api.rules().await
    }

    async fn fetch(&self, id: &str) -> Result<Rule> {
        self.api.rule(id).await
    }

    fn render(&self, entry: &Rule, kind: SurfaceKind) -> String {
        json::pretty(entry, indent_for(kind))
    }

    fn template(&self, kind: SurfaceKind) -> String {
        json::pretty(&Rule::template(self.new_rule_name), indent_for(kind))
    }

    /// L'id du texte, ou un id synthétique `rule_<millis>` s'il est vide
    fn identity_for_create(&self, text: &str, _requested: Option<&str>) -> Result<String> {
        let rule = parse(text)?;
        if rule.id.trim().is_empty() {
            Ok(synthetic_rule_id())
        } else {
            Ok(rule.id)
        }
    }

    async fn create(&self, id: &str, text: &str) -> Result<ApiReply> {
        let mut rule = parse(text)?;
        rule.id = id.to_string();
        self.api.create_rule(&rule).await
    }

    /// L'id du texte est écrasé par celui de la session
    async fn update(&self, id: &str, text: &str) -> Result<ApiReply> {
        let mut rule = parse(text)?;
        rule.id = id.to_string();
        self.api.update_rule(id, &rule).await
    }

    async fn delete(&self, id: &str) -> Result<ApiReply> {
        self.api.delete_rule(id).await
    }
}
