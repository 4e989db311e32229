//! Visionneuse de logs : polling de /api/logs, ou suivi en direct via
//! /ws/logs avec repli unique sur le polling si le flux tombe.

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

use super::{Context, Controller};
use crate::api::WS_LOGS;
use crate::error::Result;
use crate::models::LogEvent;
use crate::page::{ids, PageKind};
use crate::timers::TimerSet;

/// Nombre de lignes conservées en mode suivi (le backend sert les 1000 dernières)
pub const FOLLOW_LINE_CAP: usize = 1000;

pub struct LogsController {
    inner: Arc<Inner>,
}

struct Inner {
    ctx: Context,
    timers: TimerSet,
    polling: AtomicBool,
    lines: Mutex<VecDeque<String>>,
}

impl LogsController {
    pub fn new(ctx: Context) -> Self {
        Self {
            inner: Arc::new(Inner {
                ctx,
                timers: TimerSet::new(),
                polling: AtomicBool::new(false),
                lines: Mutex::new(VecDeque::new()),
            }),
        }
    }

    pub fn is_polling(&self) -> bool {
        self.inner.polling.load(Ordering::SeqCst)
    }

    /// Recharge le texte complet ; en cas d'échec le message d'erreur remplace le contenu
    pub async fn refresh(&self) -> Result<String> {
        self.inner.refresh().await
    }

    /// Applique un événement /ws/logs au tampon de suivi
    pub fn apply(&self, event: LogEvent) {
        self.inner.apply(event);
    }
}

impl Inner {
    async fn refresh(&self) -> Result<String> {
        let page = &self.ctx.page;
        let labels = self.ctx.labels();
        match self.ctx.api.logs().await {
            Ok(text) => {
                self.show(&text);
                Ok(text)
            }
            Err(err) => {
                warn!("logs refresh failed: {err}");
                page.set_text(ids::LOG_CONTAINER, &labels.logs_error(&labels.describe(&err)));
                Err(err)
            }
        }
    }

    fn show(&self, text: &str) {
        let page = &self.ctx.page;
        let shown = if text.is_empty() { self.ctx.labels().logs_empty } else { text };
        if page.set_text(ids::LOG_CONTAINER, shown) {
            page.scroll_to_bottom(ids::LOG_CONTAINER);
        }
    }

    fn apply(&self, event: LogEvent) {
        let text = {
            let mut lines = self.lines.lock();
            match event {
                LogEvent::InitialLogs { lines: initial } => {
                    lines.clear();
                    lines.extend(initial);
                }
                LogEvent::Logs { lines: fresh } => lines.extend(fresh),
            }
            while lines.len() > FOLLOW_LINE_CAP {
                lines.pop_front();
            }
            lines.iter().map(String::as_str).collect::<Vec<_>>().join("\n")
        };
        self.show(&text);
    }

    fn start_polling(self: &Arc<Self>, immediate: bool) {
        if self.polling.swap(true, Ordering::SeqCst) {
            return;
        }
        if immediate {
            let weak = Arc::downgrade(self);
            self.timers.spawn(async move {
                if let Some(inner) = weak.upgrade() {
                    let _ = inner.refresh().await;
                }
            });
        }
        let weak = Arc::downgrade(self);
        self.timers.every(self.ctx.config.intervals.logs(), move || {
            let weak = weak.clone();
            async move {
                if let Some(inner) = weak.upgrade() {
                    let _ = inner.refresh().await;
                }
            }
        });
    }

    async fn follow(weak: Weak<Self>) {
        let Some(api) = weak.upgrade().map(|inner| inner.ctx.api.clone()) else {
            return;
        };

        match api.connect(WS_LOGS).await {
            Ok(mut ws) => {
                info!("following /ws/logs");
                while let Some(msg) = ws.next().await {
                    let Some(inner) = weak.upgrade() else {
                        return;
                    };
                    match msg {
                        Ok(Message::Text(text)) => match serde_json::from_str::<LogEvent>(&text) {
                            Ok(event) => inner.apply(event),
                            Err(e) => debug!("ignoring logs message: {e}"),
                        },
                        Ok(Message::Ping(data)) => {
                            let _ = ws.send(Message::Pong(data)).await;
                        }
                        Ok(Message::Close(_)) => break,
                        Err(e) => {
                            warn!("/ws/logs error: {e}");
                            break;
                        }
                        _ => {}
                    }
                }
            }
            Err(e) => warn!("/ws/logs unavailable: {e}"),
        }

        if let Some(inner) = weak.upgrade() {
            info!("log follow ended, polling /api/logs");
            inner.start_polling(true);
        }
    }
}

#[async_trait]
impl Controller for LogsController {
    fn kind(&self) -> PageKind {
        PageKind::Logs
    }

    async fn activate(&self) {
        let inner = &self.inner;
        if inner.ctx.config.logs_follow {
            inner.timers.spawn(Inner::follow(Arc::downgrade(inner)));
        } else {
            let _ = inner.refresh().await;
            inner.start_polling(false);
        }
    }

    fn teardown(&self) {
        self.inner.timers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiClient;
    use crate::config::ConsoleConfig;
    use crate::confirm::AutoConfirm;
    use crate::locale::Locale;
    use crate::page::{MemoryPage, Page};
    use std::time::Duration;

    fn controller(page: Arc<MemoryPage>) -> LogsController {
        let api = ApiClient::new("http://127.0.0.1:9", Duration::from_millis(200)).unwrap();
        let config = ConsoleConfig { locale: Locale::En, ..ConsoleConfig::default() };
        LogsController::new(Context::new(api, page, config, Arc::new(AutoConfirm::new(true))))
    }

    #[tokio::test]
    async fn test_follow_events() {
        let page = Arc::new(MemoryPage::for_kind(PageKind::Logs));
        let logs = controller(page.clone());

        logs.apply(LogEvent::InitialLogs { lines: vec!["a".into(), "b".into()] });
        assert_eq!(page.text(ids::LOG_CONTAINER).as_deref(), Some("a\nb"));
        logs.apply(LogEvent::Logs { lines: vec!["c".into()] });
        assert_eq!(page.text(ids::LOG_CONTAINER).as_deref(), Some("a\nb\nc"));
        assert_eq!(page.scroll_count(ids::LOG_CONTAINER), 2);

        logs.apply(LogEvent::InitialLogs { lines: vec![] });
        assert_eq!(page.text(ids::LOG_CONTAINER).as_deref(), Some("Logs are empty"));
    }

    #[tokio::test]
    async fn test_follow_buffer_is_capped() {
        let page = Arc::new(MemoryPage::for_kind(PageKind::Logs));
        let logs = controller(page.clone());
        let lines: Vec<String> = (0..FOLLOW_LINE_CAP + 5).map(|i| format!("line {i}")).collect();
        logs.apply(LogEvent::Logs { lines });
        let text = page.text(ids::LOG_CONTAINER).unwrap();
        assert_eq!(text.lines().count(), FOLLOW_LINE_CAP);
        assert!(text.starts_with("line 5\n"));
    }

    #[tokio::test]
    async fn test_refresh_error_replaces_content() {
        let page = Arc::new(MemoryPage::for_kind(PageKind::Logs));
        page.set_text(ids::LOG_CONTAINER, "stale");
        let logs = controller(page.clone());
        assert!(logs.refresh().await.is_err());
        assert!(page.text(ids::LOG_CONTAINER).unwrap().starts_with("Failed to load logs: "));
    }
}
