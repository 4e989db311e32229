/**
 * CONTRÔLEUR RÈGLES - Règles structurées de /api/rules
 *
 * FONCTIONNEMENT :
 * - Activation : liste rechargée, éditeur pré-rempli d'une nouvelle règle
 * - Sauvegarde réussie : message, éditeur fermé, liste rechargée, nouveau modèle
 * - Suppression : confirmation obligatoire, l'éditeur ouvert n'est pas touché
 */

use async_trait::async_trait;
use parking_lot::Mutex as SyncMutex;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::{Context, Controller};
use crate::documents::{DocumentEditor, DocumentStore, RuleStore, SaveOutcome, Session};
use crate::error::{ConsoleError, Result};
use crate::locale::Labels;
use crate::models::Rule;
use crate::page::{ids, PageKind};
use crate::render;
use crate::surface::SurfaceKind;
use crate::toast::Notifier;

pub struct RulesController {
    ctx: Context,
    editor: Mutex<DocumentEditor<RuleStore>>,
    notifier: Notifier,
    cache: SyncMutex<Vec<Rule>>,
}

impl RulesController {
    pub fn new(ctx: Context) -> Self {
        let store = RuleStore::new(ctx.api.clone(), ctx.labels().new_rule_name);
        let editor = DocumentEditor::new(store, ctx.page.clone(), ids::RULE_EDITOR, SurfaceKind::Plain);
        let notifier = ctx.notifier();
        Self { ctx, editor: Mutex::new(editor), notifier, cache: SyncMutex::new(Vec::new()) }
    }

    /// Dernière liste chargée avec succès
    pub fn rules(&self) -> Vec<Rule> {
        self.cache.lock().clone()
    }

    pub async fn session(&self) -> Session {
        self.editor.lock().await.session().clone()
    }

    pub async fn text(&self) -> String {
        self.editor.lock().await.text()
    }

    pub async fn set_text(&self, text: &str) {
        self.editor.lock().await.set_text(text);
    }

    pub async fn refresh(&self) -> Result<Vec<Rule>> {
        let labels = self.ctx.labels();
        let rules = match self.editor.lock().await.store().list().await {
            Ok(rules) => rules,
            Err(err) => {
                warn!("rules load failed: {err}");
                self.notifier.error(labels.rules_load_error);
                return Err(err);
            }
        };
        self.ctx.page.set_html(ids::RULES_TBODY, &render::rules_table(&rules, labels));
        *self.cache.lock() = rules.clone();
        Ok(rules)
    }

    pub async fn new_rule(&self) {
        self.editor.lock().await.open_new();
    }

    pub async fn edit(&self, id: &str) -> Result<()> {
        let labels = self.ctx.labels();
        let result = self.editor.lock().await.open_existing(id).await;
        if let Err(err) = &result {
            warn!("rule {id} load failed: {err}");
            self.notifier.error(&Labels::prefixed(labels.rule_load_prefix, &labels.describe(err)));
        }
        result
    }

    pub async fn save(&self) -> Result<SaveOutcome> {
        let labels = self.ctx.labels();
        let outcome = self.editor.lock().await.save(None, &strict).await;
        match outcome {
            Ok(SaveOutcome::Saved { ref id, created, .. }) => {
                info!("rule {id} saved");
                self.notifier.success(if created { labels.rule_created } else { labels.rule_updated });
                self.editor.lock().await.close();
                let _ = self.refresh().await;
                self.new_rule().await;
                outcome
            }
            Ok(SaveOutcome::Cancelled) => outcome,
            Err(err) => {
                let text = match &err {
                    ConsoleError::InvalidJson(_) => labels.invalid_json(&err),
                    ConsoleError::Server(_) => labels.describe(&err),
                    _ => labels.save_error(&labels.describe(&err)),
                };
                self.notifier.error(&text);
                Err(err)
            }
        }
    }

    /// `Ok(false)` si la confirmation est refusée (aucune requête)
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let labels = self.ctx.labels();
        if !self.ctx.confirm.confirm(labels.confirm_delete_rule) {
            return Ok(false);
        }
        let result = self.editor.lock().await.store().delete(id).await;
        match result {
            Ok(_) => {
                info!("rule {id} deleted");
                self.notifier.success(labels.rule_deleted);
                let _ = self.refresh().await;
                Ok(true)
            }
            Err(err) => {
                warn!("rule {id} delete failed: {err}");
                let text = match &err {
                    ConsoleError::Server(_) => labels.describe(&err),
                    _ => labels.delete_error(&labels.describe(&err)),
                };
                self.notifier.error(&text);
                Err(err)
            }
        }
    }
}

fn strict(_: &ConsoleError) -> bool {
    false
}

#[async_trait]
impl Controller for RulesController {
    fn kind(&self) -> PageKind {
        PageKind::Rules
    }

    async fn activate(&self) {
        let _ = self.refresh().await;
        self.new_rule().await;
    }

    fn teardown(&self) {
        self.notifier.clear();
        match self.editor.try_lock() {
            Ok(mut editor) => editor.close(),
            Err(_) => debug!("editor busy, close skipped on teardown"),
        }
    }
}
