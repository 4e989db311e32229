use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::{Context, Controller};
use crate::documents::{ConfigStore, DocumentEditor, SaveOutcome, CONFIG_ID};
use crate::error::{ConsoleError, Result};
use crate::locale::Labels;
use crate::page::{ids, PageKind};
use crate::toast::Notifier;

/// Éditeur de la configuration JSON du backend
pub struct ConfigController {
    ctx: Context,
    editor: Mutex<DocumentEditor<ConfigStore>>,
    notifier: Notifier,
}

impl ConfigController {
    pub fn new(ctx: Context) -> Self {
        let store = ConfigStore::new(ctx.api.clone());
        let editor = DocumentEditor::new(store, ctx.page.clone(), ids::CONFIG_EDITOR, ctx.config.config_surface);
        let notifier = ctx.notifier();
        Self { ctx, editor: Mutex::new(editor), notifier }
    }

    pub async fn load(&self) -> Result<()> {
        let labels = self.ctx.labels();
        let result = self.editor.lock().await.open_existing(CONFIG_ID).await;
        if let Err(err) = &result {
            warn!("config load failed: {err}");
            self.notifier.error(&Labels::prefixed(labels.config_load_prefix, &labels.describe(err)));
        }
        result
    }

    pub async fn text(&self) -> String {
        self.editor.lock().await.text()
    }

    pub async fn set_text(&self, text: &str) {
        self.editor.lock().await.set_text(text);
    }

    /// Valide puis envoie le texte exact ; JSON invalide => aucune requête
    pub async fn submit(&self) -> Result<()> {
        let labels = self.ctx.labels();
        let outcome = self.editor.lock().await.save(None, &strict).await;
        match outcome {
            Ok(SaveOutcome::Saved { .. }) => {
                self.notifier.success(labels.config_saved);
                Ok(())
            }
            Ok(SaveOutcome::Cancelled) => Ok(()),
            Err(err @ ConsoleError::InvalidJson(_)) => {
                self.notifier.error(&labels.invalid_json(&err));
                Err(err)
            }
            Err(err @ ConsoleError::Server(_)) => {
                self.notifier.error(&labels.describe(&err));
                Err(err)
            }
            Err(err) => {
                warn!("config save failed: {err}");
                self.notifier.error(&labels.save_error(&labels.describe(&err)));
                Err(err)
            }
        }
    }
}

// la configuration n'accepte jamais de JSON invalide
fn strict(_: &ConsoleError) -> bool {
    false
}

#[async_trait]
impl Controller for ConfigController {
    fn kind(&self) -> PageKind {
        PageKind::Config
    }

    async fn activate(&self) {
        let _ = self.load().await;
    }

    fn teardown(&self) {
        self.notifier.clear();
        match self.editor.try_lock() {
            Ok(mut editor) => editor.close(),
            Err(_) => debug!("editor busy, close skipped on teardown"),
        }
    }
}
