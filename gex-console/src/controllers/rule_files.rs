/**
 * CONTRÔLEUR FICHIERS DE RÈGLES - Fichiers JSON bruts de /api/rules/raw
 *
 * FONCTIONNEMENT :
 * - Éditeur dans une fenêtre modale ; le champ nom n'est visible qu'en création
 * - JSON invalide : enregistrement possible après confirmation, puis avertissement
 * - Clic sur le fond de la modale = fermeture (session Idle, surface libérée)
 * - Échec de chargement : modale fermée, aucune session ne reste ouverte
 * - Succès : message temporaire ; erreurs signalées par `Page::alert`
 */

use async_trait::async_trait;
use parking_lot::Mutex as SyncMutex;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::{Context, Controller};
use crate::documents::{normalize_name, DocumentEditor, DocumentStore, RuleFileStore, SaveOutcome, Session};
use crate::error::{ConsoleError, Result};
use crate::locale::Labels;
use crate::page::{ids, PageKind};
use crate::render;
use crate::surface::SurfaceKind;
use crate::toast::Notifier;

pub struct RuleFilesController {
    ctx: Context,
    editor: Mutex<DocumentEditor<RuleFileStore>>,
    notifier: Notifier,
    cache: SyncMutex<Vec<String>>,
}

impl RuleFilesController {
    pub fn new(ctx: Context) -> Self {
        let store = RuleFileStore::new(ctx.api.clone(), ctx.labels().new_rule_name);
        let editor = DocumentEditor::new(store, ctx.page.clone(), ids::RULE_JSON_EDITOR, SurfaceKind::Rich);
        let notifier = ctx.notifier();
        Self { ctx, editor: Mutex::new(editor), notifier, cache: SyncMutex::new(Vec::new()) }
    }

    pub fn files(&self) -> Vec<String> {
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

    pub async fn refresh(&self) -> Result<Vec<String>> {
        let labels = self.ctx.labels();
        let page = &self.ctx.page;
        match self.editor.lock().await.store().list().await {
            Ok(files) => {
                page.set_html(ids::RULES_LIST, &render::files_list(&files, labels));
                *self.cache.lock() = files.clone();
                Ok(files)
            }
            Err(err) => {
                warn!("rule files load failed: {err}");
                page.set_html(ids::RULES_LIST, &render::inline_error(labels.files_load_error));
                Err(err)
            }
        }
    }

    pub async fn create_new(&self) {
        let page = &self.ctx.page;
        page.set_text(ids::EDITOR_TITLE, self.ctx.labels().new_file_title);
        page.set_text(ids::RULE_FILENAME, "");
        page.set_visible(ids::FILENAME_GROUP, true);
        page.set_visible(ids::JSON_EDITOR_MODAL, true);
        self.editor.lock().await.open_new();
    }

    pub async fn edit(&self, name: &str) -> Result<()> {
        let labels = self.ctx.labels();
        let page = &self.ctx.page;
        let loaded = match normalize_name(name) {
            Ok(name) => self.editor.lock().await.open_existing(&name).await.map(|_| name),
            Err(err) => Err(err),
        };

        match loaded {
            Ok(name) => {
                page.set_text(ids::EDITOR_TITLE, &labels.editor_title(&name));
                page.set_text(ids::RULE_FILENAME, &name);
                page.set_visible(ids::FILENAME_GROUP, false);
                page.set_visible(ids::JSON_EDITOR_MODAL, true);
                Ok(())
            }
            Err(err) => {
                warn!("rule file {name} load failed: {err}");
                // la modale ne doit jamais désigner un autre fichier que la session
                self.close_editor().await;
                page.alert(&Labels::prefixed(labels.file_load_prefix, &labels.describe(&err)));
                Err(err)
            }
        }
    }

    pub async fn save(&self) -> Result<SaveOutcome> {
        let labels = self.ctx.labels();
        let page = &self.ctx.page;
        let requested = page.text(ids::RULE_FILENAME);
        let confirm = self.ctx.confirm.clone();
        let accept_invalid = move |err: &ConsoleError| confirm.confirm(&labels.confirm_save_invalid(err));

        let outcome = self.editor.lock().await.save(requested.as_deref(), &accept_invalid).await;
        match outcome {
            Ok(SaveOutcome::Saved { ref id, valid_json, .. }) => {
                info!("rule file {id} saved (valid json: {valid_json})");
                self.notifier.success(labels.file_saved);
                self.close_editor().await;
                let _ = self.refresh().await;
                if !valid_json {
                    page.alert(labels.saved_invalid_json);
                }
                outcome
            }
            Ok(SaveOutcome::Cancelled) => outcome,
            Err(err) => {
                let text = match &err {
                    ConsoleError::MissingName => labels.filename_required.to_string(),
                    _ => labels.save_error(&labels.describe(&err)),
                };
                page.alert(&text);
                Err(err)
            }
        }
    }

    /// `Ok(false)` si la confirmation est refusée (aucune requête)
    pub async fn delete(&self, name: &str) -> Result<bool> {
        let labels = self.ctx.labels();
        if !self.ctx.confirm.confirm(&labels.confirm_delete_file(name)) {
            return Ok(false);
        }
        let result = self.editor.lock().await.store().delete(name).await;
        match result {
            Ok(_) => {
                info!("rule file {name} deleted");
                self.notifier.success(labels.file_deleted);
                let _ = self.refresh().await;
                Ok(true)
            }
            Err(err) => {
                warn!("rule file {name} delete failed: {err}");
                self.ctx.page.alert(&labels.delete_error(&labels.describe(&err)));
                Err(err)
            }
        }
    }

    pub async fn close_editor(&self) {
        self.ctx.page.set_visible(ids::JSON_EDITOR_MODAL, false);
        self.editor.lock().await.close();
    }

    /// Clic sur la page ; seul le fond de la modale la ferme
    pub async fn click(&self, target: &str) {
        if target == ids::JSON_EDITOR_MODAL {
            self.close_editor().await;
        }
    }
}

#[async_trait]
impl Controller for RuleFilesController {
    fn kind(&self) -> PageKind {
        PageKind::RuleFiles
    }

    async fn activate(&self) {
        self.ctx.page.set_visible(ids::JSON_EDITOR_MODAL, false);
        let _ = self.refresh().await;
    }

    fn teardown(&self) {
        self.ctx.page.set_visible(ids::JSON_EDITOR_MODAL, false);
        self.notifier.clear();
        match self.editor.try_lock() {
            Ok(mut editor) => editor.close(),
            Err(_) => debug!("editor busy, close skipped on teardown"),
        }
    }
}
