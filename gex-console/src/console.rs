/**
 * CONSOLE - Routage entre les pages du tableau de bord
 *
 * RÔLE :
 * Active exactement un contrôleur à la fois, selon la page chargée, et
 * démonte le précédent (minuteries, éditeur) à chaque transition.
 */

use tracing::{debug, info};

use crate::controllers::{
    ConfigController, Context, Controller, LogsController, RuleFilesController, RulesController, StatsController,
};
use crate::page::PageKind;

pub enum ActiveController {
    Stats(StatsController),
    Logs(LogsController),
    Config(ConfigController),
    Rules(RulesController),
    RuleFiles(RuleFilesController),
}

impl ActiveController {
    fn build(kind: PageKind, ctx: Context) -> Self {
        match kind {
            PageKind::Dashboard => ActiveController::Stats(StatsController::new(ctx)),
            PageKind::Logs => ActiveController::Logs(LogsController::new(ctx)),
            PageKind::Config => ActiveController::Config(ConfigController::new(ctx)),
            PageKind::Rules => ActiveController::Rules(RulesController::new(ctx)),
            PageKind::RuleFiles => ActiveController::RuleFiles(RuleFilesController::new(ctx)),
        }
    }

    pub fn controller(&self) -> &dyn Controller {
        match self {
            ActiveController::Stats(c) => c,
            ActiveController::Logs(c) => c,
            ActiveController::Config(c) => c,
            ActiveController::Rules(c) => c,
            ActiveController::RuleFiles(c) => c,
        }
    }
}

pub struct Console {
    ctx: Context,
    active: Option<ActiveController>,
}

impl Console {
    pub fn new(ctx: Context) -> Self {
        Self { ctx, active: None }
    }

    pub fn current(&self) -> Option<PageKind> {
        self.active.as_ref().map(|a| a.controller().kind())
    }

    pub fn active(&self) -> Option<&ActiveController> {
        self.active.as_ref()
    }

    /// Chemin inconnu => rien n'est activé, la page courante reste en place
    pub async fn navigate(&mut self, path: &str) -> Option<PageKind> {
        let Some(kind) = PageKind::from_path(path) else {
            debug!("no controller for {path}");
            return None;
        };
        self.open(kind).await;
        Some(kind)
    }

    pub async fn open(&mut self, kind: PageKind) -> &ActiveController {
        self.close();
        info!("activating {kind:?} page");
        let active = self.active.insert(ActiveController::build(kind, self.ctx.clone()));
        active.controller().activate().await;
        active
    }

    pub fn close(&mut self) {
        if let Some(previous) = self.active.take() {
            debug!("tearing down {:?} page", previous.controller().kind());
            previous.controller().teardown();
        }
    }
}

impl Drop for Console {
    fn drop(&mut self) {
        self.close();
    }
}
