#![allow(dead_code)]

use gex_console::config::{ConsoleConfig, Intervals};
use gex_console::confirm::AutoConfirm;
use gex_console::locale::Locale;
use gex_console::{ApiClient, Context, MemoryPage, PageKind};
use gex_devkit::TestHarness;
use std::sync::Arc;
use std::time::Duration;

/// Délai d'attente des conditions asynchrones (intervalles de 1s)
pub const WAIT_MS: u64 = 2500;

pub fn fast_config(url: &str) -> ConsoleConfig {
    ConsoleConfig {
        base_url: url.to_string(),
        locale: Locale::En,
        request_timeout_secs: 2,
        intervals: Intervals { stats_poll_secs: 1, packets_secs: 1, logs_secs: 1, toast_secs: 1 },
        ..ConsoleConfig::default()
    }
}

pub struct Setup {
    pub harness: TestHarness,
    pub page: Arc<MemoryPage>,
    pub confirm: Arc<AutoConfirm>,
    pub ctx: Context,
}

pub async fn setup(kind: PageKind, answer: bool) -> Setup {
    setup_with(MemoryPage::for_kind(kind), answer, |_| {}).await
}

pub async fn setup_with(page: MemoryPage, answer: bool, tweak: impl FnOnce(&mut ConsoleConfig)) -> Setup {
    let harness = TestHarness::start().await.unwrap();
    let mut config = fast_config(&harness.url());
    tweak(&mut config);
    let api = ApiClient::new(&config.base_url, Duration::from_secs(2)).unwrap();
    let page = Arc::new(page);
    let confirm = Arc::new(AutoConfirm::new(answer));
    let ctx = Context::new(api, page.clone(), config, confirm.clone());
    Setup { harness, page, confirm, ctx }
}
