/**
 * DOCUMENTS - Éditeur générique de documents JSON
 *
 * RÔLE :
 * Un seul éditeur, paramétré par un `DocumentStore`, sert la configuration,
 * les règles structurées et les fichiers de règles bruts.
 *
 * FONCTIONNEMENT :
 * - `Session` : Idle | CreatingNew | EditingExisting(id)
 * - open_new      : modèle dans la surface, session CreatingNew
 * - open_existing : fetch puis EditingExisting(id), session inchangée si échec
 * - save          : validation (stricte ou permissive), puis create ou update
 *                   ciblant l'identité capturée à l'ouverture
 * - close         : retour à Idle, surface libérée
 *
 * UTILITÉ :
 * - Une sauvegarde ne peut jamais viser une autre identité que celle ouverte
 * - Le JSON invalide est bloqué avant toute requête (mode strict)
 */

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{ConsoleError, Result};
use crate::json;
use crate::models::ApiReply;
use crate::page::Page;
use crate::surface::{self, EditorSurface, SurfaceKind};

pub mod config;
pub mod files;
pub mod rules;

pub use config::{ConfigStore, CONFIG_ID};
pub use files::{normalize_name, RuleFileStore};
pub use rules::RuleStore;

/// Politique de validation du texte avant sauvegarde
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validation {
    /// JSON invalide => aucune requête
    Strict,
    /// JSON invalide accepté après confirmation ; texte vide = valide
    Lenient,
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Élément d'une liste (règle, nom de fichier)
    type Summary: Send;
    /// Document chargé pour l'édition
    type Entry: Send;

    fn validation(&self) -> Validation {
        Validation::Strict
    }

    async fn list(&self) -> Result<Vec<Self::Summary>> {
        Err(ConsoleError::Unsupported("list"))
    }

    async fn fetch(&self, id: &str) -> Result<Self::Entry>;

    /// Texte affiché dans une surface du type donné
    fn render(&self, entry: &Self::Entry, kind: SurfaceKind) -> String;

    fn template(&self, _kind: SurfaceKind) -> String {
        String::new()
    }

    /// Identité visée par une création : saisie de l'utilisateur ou texte
    fn identity_for_create(&self, _text: &str, _requested: Option<&str>) -> Result<String> {
        Err(ConsoleError::Unsupported("create"))
    }

    async fn create(&self, _id: &str, _text: &str) -> Result<ApiReply> {
        Err(ConsoleError::Unsupported("create"))
    }

    async fn update(&self, _id: &str, _text: &str) -> Result<ApiReply> {
        Err(ConsoleError::Unsupported("update"))
    }

    async fn delete(&self, _id: &str) -> Result<ApiReply> {
        Err(ConsoleError::Unsupported("delete"))
    }
}

pub(crate) fn indent_for(kind: SurfaceKind) -> usize {
    match kind {
        SurfaceKind::Plain => json::PLAIN_INDENT,
        SurfaceKind::Rich => json::RICH_INDENT,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Session {
    #[default]
    Idle,
    CreatingNew,
    EditingExisting(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    Saved {
        id: String,
        created: bool,
        /// Faux si le texte envoyé n'était pas du JSON (mode permissif)
        valid_json: bool,
        reply: ApiReply,
    },
    /// L'utilisateur a refusé d'enregistrer du JSON invalide
    Cancelled,
}

pub struct DocumentEditor<S: DocumentStore> {
    store: S,
    page: Arc<dyn Page>,
    element: &'static str,
    kind: SurfaceKind,
    surface: Option<Box<dyn EditorSurface>>,
    session: Session,
}

impl<S: DocumentStore> DocumentEditor<S> {
    pub fn new(store: S, page: Arc<dyn Page>, element: &'static str, kind: SurfaceKind) -> Self {
        Self { store, page, element, kind, surface: None, session: Session::Idle }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn has_surface(&self) -> bool {
        self.surface.is_some()
    }

    fn surface(&mut self) -> &mut Box<dyn EditorSurface> {
        let (kind, page, element) = (self.kind, &self.page, self.element);
        self.surface
            .get_or_insert_with(|| surface::attach(kind, page.clone(), element))
    }

    pub fn open_new(&mut self) {
        let template = self.store.template(self.kind);
        self.surface().set_text(&template);
        self.session = Session::CreatingNew;
        debug!("editor {}: creating new document", self.element);
    }

    pub async fn open_existing(&mut self, id: &str) -> Result<()> {
        let entry = self.store.fetch(id).await?;
        let text = self.store.render(&entry, self.kind);
        self.surface().set_text(&text);
        self.session = Session::EditingExisting(id.to_string());
        debug!("editor {}: editing {id}", self.element);
        Ok(())
    }

    pub fn text(&self) -> String {
        self.surface.as_ref().map(|s| s.text()).unwrap_or_default()
    }

    pub fn set_text(&mut self, text: &str) {
        self.surface().set_text(text);
    }

    /// Enregistre le texte courant. `requested` = identité saisie hors du
    /// texte (nom de fichier) ; `accept_invalid` est consulté en mode
    /// permissif quand le texte n'est pas du JSON.
    pub async fn save(
        &mut self,
        requested: Option<&str>,
        accept_invalid: &(dyn Fn(&ConsoleError) -> bool + Sync),
    ) -> Result<SaveOutcome> {
        if self.session == Session::Idle {
            return Err(ConsoleError::NoSession);
        }
        let text = self.text();

        let validation = self.store.validation();
        if validation == Validation::Strict {
            json::validate(&text)?;
        }

        // nom manquant signalé avant toute question sur le JSON
        let (id, created) = match &self.session {
            Session::EditingExisting(id) => (id.clone(), false),
            _ => (self.store.identity_for_create(&text, requested)?, true),
        };

        let mut valid_json = true;
        if validation == Validation::Lenient && !text.trim().is_empty() {
            if let Err(err) = json::validate(&text) {
                if !accept_invalid(&err) {
                    return Ok(SaveOutcome::Cancelled);
                }
                valid_json = false;
            }
        }

        let reply = if created {
            self.store.create(&id, &text).await?
        } else {
            self.store.update(&id, &text).await?
        };
        info!("editor {}: saved {id} (created: {created})", self.element);
        Ok(SaveOutcome::Saved { id, created, valid_json, reply })
    }

    /// Retour à Idle ; la surface est libérée
    pub fn close(&mut self) {
        if let Some(mut surface) = self.surface.take() {
            surface.dispose();
        }
        self.session = Session::Idle;
    }
}
