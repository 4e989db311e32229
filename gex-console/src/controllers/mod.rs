//! Contrôleurs de page : un par page du tableau de bord, sans état partagé
//! entre eux. Chacun possède ses minuteries, son cache et son éditeur, et
//! libère le tout dans `teardown`.

use async_trait::async_trait;
use std::sync::Arc;

use crate::api::ApiClient;
use crate::config::ConsoleConfig;
use crate::confirm::Confirm;
use crate::locale::Labels;
use crate::page::{Page, PageKind};
use crate::toast::Notifier;

pub mod config_editor;
pub mod logs;
pub mod rule_files;
pub mod rules;
pub mod stats;

pub use config_editor::ConfigController;
pub use logs::LogsController;
pub use rule_files::RuleFilesController;
pub use rules::RulesController;
pub use stats::StatsController;

/// Dépendances communes injectées dans chaque contrôleur
#[derive(Clone)]
pub struct Context {
    pub api: ApiClient,
    pub page: Arc<dyn Page>,
    pub config: ConsoleConfig,
    pub confirm: Arc<dyn Confirm>,
}

impl Context {
    pub fn new(api: ApiClient, page: Arc<dyn Page>, config: ConsoleConfig, confirm: Arc<dyn Confirm>) -> Self {
        Self { api, page, config, confirm }
    }

    pub fn labels(&self) -> &'static Labels {
        self.config.locale.labels()
    }

    pub fn notifier(&self) -> Notifier {
        Notifier::new(self.page.clone(), self.config.intervals.toast())
    }
}

#[async_trait]
pub trait Controller: Send + Sync {
    fn kind(&self) -> PageKind;
    /// Chargement initial et démarrage des minuteries
    async fn activate(&self);
    /// Arrêt des minuteries et libération de l'éditeur
    fn teardown(&self);
}
