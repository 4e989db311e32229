//! Messages transitoires affichés dans `message-container`

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::page::{ids, Page};
use crate::render::{self, MessageKind};
use crate::timers::{TimerHandle, TimerSet};

pub struct Notifier {
    page: Arc<dyn Page>,
    ttl: Duration,
    timers: TimerSet,
    pending: Mutex<Option<TimerHandle>>,
}

impl Notifier {
    pub fn new(page: Arc<dyn Page>, ttl: Duration) -> Self {
        Self { page, ttl, timers: TimerSet::new(), pending: Mutex::new(None) }
    }

    pub fn success(&self, text: &str) {
        self.show(MessageKind::Success, text);
    }

    pub fn error(&self, text: &str) {
        self.show(MessageKind::Error, text);
    }

    /// Sans conteneur de messages sur la page, on retombe sur `alert`
    pub fn show(&self, kind: MessageKind, text: &str) {
        if !self.page.set_html(ids::MESSAGE_CONTAINER, &render::message(kind, text)) {
            debug!("no message container, alerting instead");
            self.page.alert(text);
            return;
        }

        let page = self.page.clone();
        let dismiss = self.timers.after(self.ttl, async move {
            page.set_html(ids::MESSAGE_CONTAINER, "");
        });
        if let Some(previous) = self.pending.lock().replace(dismiss) {
            previous.cancel();
        }
    }

    /// Annule l'effacement programmé (changement de page)
    pub fn clear(&self) {
        self.pending.lock().take();
        self.timers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::MemoryPage;
    use tokio::time;

    #[tokio::test(start_paused = true)]
    async fn test_toast_auto_dismiss() {
        let page = Arc::new(MemoryPage::with_elements(&[ids::MESSAGE_CONTAINER]));
        let notifier = Notifier::new(page.clone(), Duration::from_secs(5));

        notifier.success("Saved");
        assert_eq!(
            page.text(ids::MESSAGE_CONTAINER).as_deref(),
            Some("<div class=\"message success\">Saved</div>")
        );
        time::sleep(Duration::from_secs(6)).await;
        assert_eq!(page.text(ids::MESSAGE_CONTAINER).as_deref(), Some(""));
    }

    #[tokio::test(start_paused = true)]
    async fn test_newer_toast_replaces_timer() {
        let page = Arc::new(MemoryPage::with_elements(&[ids::MESSAGE_CONTAINER]));
        let notifier = Notifier::new(page.clone(), Duration::from_secs(5));

        notifier.success("first");
        time::sleep(Duration::from_secs(3)).await;
        notifier.error("second");
        time::sleep(Duration::from_secs(3)).await;
        assert!(page.text(ids::MESSAGE_CONTAINER).unwrap().contains("second"));
        time::sleep(Duration::from_secs(3)).await;
        assert_eq!(page.text(ids::MESSAGE_CONTAINER).as_deref(), Some(""));
    }

    #[tokio::test]
    async fn test_alert_without_container() {
        let page = Arc::new(MemoryPage::new());
        let notifier = Notifier::new(page.clone(), Duration::from_secs(5));
        notifier.error("boom");
        assert_eq!(page.alerts(), vec!["boom".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_keeps_message() {
        let page = Arc::new(MemoryPage::with_elements(&[ids::MESSAGE_CONTAINER]));
        let notifier = Notifier::new(page.clone(), Duration::from_secs(1));
        notifier.success("kept");
        notifier.clear();
        time::sleep(Duration::from_secs(2)).await;
        assert!(page.text(ids::MESSAGE_CONTAINER).unwrap().contains("kept"));
    }
}
