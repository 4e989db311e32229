/**
 * CONTRÔLEUR STATS - Tableau de bord temps réel
 *
 * RÔLE :
 * Peint les métriques système (CPU/RAM/disque/réseau) et les compteurs de
 * paquets ; redémarre les services du pare-feu.
 *
 * FONCTIONNEMENT :
 * - Abonnement /ws/stats si `stats-grid` est présent sur la page
 * - Échec, erreur ou fermeture du flux => polling /api/stats, installé une
 *   seule fois par contrôleur
 * - /api/packet-stats interrogé à l'activation puis à intervalle fixe
 * - Les tâches ne tiennent qu'un `Weak` : le contrôleur abandonné s'arrête
 */

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

use super::{Context, Controller};
use crate::api::WS_STATS;
use crate::error::Result;
use crate::locale::Labels;
use crate::models::{MetricSnapshot, PacketCounters, RestartReply};
use crate::page::{ids, PageKind};
use crate::render;
use crate::timers::TimerSet;

pub struct StatsController {
    inner: Arc<Inner>,
}

struct Inner {
    ctx: Context,
    timers: TimerSet,
    polling: AtomicBool,
    last_packets: Mutex<Option<PacketCounters>>,
}

impl StatsController {
    pub fn new(ctx: Context) -> Self {
        Self {
            inner: Arc::new(Inner {
                ctx,
                timers: TimerSet::new(),
                polling: AtomicBool::new(false),
                last_packets: Mutex::new(None),
            }),
        }
    }

    /// Vrai une fois le repli HTTP installé
    pub fn is_polling(&self) -> bool {
        self.inner.polling.load(Ordering::SeqCst)
    }

    pub fn active_timers(&self) -> usize {
        self.inner.timers.len()
    }

    pub fn install_fallback(&self) {
        self.inner.install_fallback();
    }

    pub fn paint_snapshot(&self, snapshot: &MetricSnapshot) {
        self.inner.paint_snapshot(snapshot);
    }

    pub async fn refresh_stats(&self) -> Result<MetricSnapshot> {
        let snapshot = self.inner.ctx.api.stats().await?;
        self.inner.paint_snapshot(&snapshot);
        Ok(snapshot)
    }

    pub async fn refresh_packets(&self) -> Result<PacketCounters> {
        self.inner.refresh_packets().await
    }

    pub fn last_packets(&self) -> Option<PacketCounters> {
        *self.inner.last_packets.lock()
    }

    /// Redémarre `service` après confirmation. `Ok(None)` = refusé, aucune requête.
    /// Le résultat est aussi signalé via `Page::alert`.
    pub async fn restart_service(&self, service: &str) -> Result<Option<RestartReply>> {
        let ctx = &self.inner.ctx;
        let labels = ctx.labels();
        if !ctx.confirm.confirm(&labels.confirm_restart(service)) {
            debug!("restart of {service} declined");
            return Ok(None);
        }

        match ctx.api.restart_service(service).await {
            Ok(reply) => {
                info!("service {service} restarted");
                let text = reply
                    .message
                    .as_deref()
                    .filter(|m| !m.is_empty())
                    .unwrap_or(labels.service_restarted);
                ctx.page.alert(text);
                Ok(Some(reply))
            }
            Err(err) => {
                warn!("restart of {service} failed: {err}");
                ctx.page.alert(&Labels::prefixed(labels.error_prefix, &labels.describe(&err)));
                Err(err)
            }
        }
    }
}

impl Inner {
    fn paint_snapshot(&self, snapshot: &MetricSnapshot) {
        let page = &self.ctx.page;
        let readouts = render::snapshot_readouts(snapshot);
        for (id, text) in &readouts.labels {
            page.set_text(id, text);
        }
        for (id, width) in &readouts.bars {
            page.set_width(id, *width);
        }
    }

    async fn refresh_packets(&self) -> Result<PacketCounters> {
        let counters = self.ctx.api.packet_stats().await?;
        for (id, text) in render::packet_readouts(&counters) {
            self.ctx.page.set_text(id, &text);
        }
        *self.last_packets.lock() = Some(counters);
        Ok(counters)
    }

    async fn poll_stats(&self) {
        match self.ctx.api.stats().await {
            Ok(snapshot) => self.paint_snapshot(&snapshot),
            Err(e) => warn!("stats poll failed: {e}"),
        }
    }

    fn install_fallback(self: &Arc<Self>) {
        if self.polling.swap(true, Ordering::SeqCst) {
            return;
        }
        info!("falling back to /api/stats polling");
        let weak = Arc::downgrade(self);
        self.timers.every(self.ctx.config.intervals.stats_poll(), move || {
            let weak = weak.clone();
            async move {
                if let Some(inner) = weak.upgrade() {
                    inner.poll_stats().await;
                }
            }
        });
    }

    async fn stream(weak: Weak<Self>) {
        let Some(api) = weak.upgrade().map(|inner| inner.ctx.api.clone()) else {
            return;
        };

        match api.connect(WS_STATS).await {
            Ok(mut ws) => {
                info!("connected to /ws/stats");
                while let Some(msg) = ws.next().await {
                    let Some(inner) = weak.upgrade() else {
                        return;
                    };
                    match msg {
                        Ok(Message::Text(text)) => match serde_json::from_str::<MetricSnapshot>(&text) {
                            Ok(snapshot) => inner.paint_snapshot(&snapshot),
                            Err(e) => debug!("ignoring stats message: {e}"),
                        },
                        Ok(Message::Ping(data)) => {
                            let _ = ws.send(Message::Pong(data)).await;
                        }
                        Ok(Message::Close(_)) => {
                            info!("/ws/stats closed by server");
                            break;
                        }
                        Err(e) => {
                            warn!("/ws/stats error: {e}");
                            break;
                        }
                        _ => {}
                    }
                }
            }
            Err(e) => warn!("/ws/stats unavailable: {e}"),
        }

        if let Some(inner) = weak.upgrade() {
            inner.install_fallback();
        }
    }
}

#[async_trait]
impl Controller for StatsController {
    fn kind(&self) -> PageKind {
        PageKind::Dashboard
    }

    async fn activate(&self) {
        let inner = &self.inner;
        if inner.ctx.page.exists(ids::STATS_GRID) {
            inner.timers.spawn(Inner::stream(Arc::downgrade(inner)));
        } else {
            debug!("no stats grid on page, skipping /ws/stats");
        }

        if let Err(e) = inner.refresh_packets().await {
            warn!("packet stats failed: {e}");
        }
        let weak = Arc::downgrade(inner);
        inner.timers.every(inner.ctx.config.intervals.packets(), move || {
            let weak = weak.clone();
            async move {
                if let Some(inner) = weak.upgrade() {
                    if let Err(e) = inner.refresh_packets().await {
                        warn!("packet stats failed: {e}");
                    }
                }
            }
        });
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

    fn controller(page: Arc<MemoryPage>, confirm: Arc<AutoConfirm>) -> StatsController {
        let api = ApiClient::new("http://127.0.0.1:9", Duration::from_millis(200)).unwrap();
        let config = ConsoleConfig { locale: Locale::En, ..ConsoleConfig::default() };
        StatsController::new(Context::new(api, page, config, confirm))
    }

    #[tokio::test]
    async fn test_paint_snapshot() {
        let page = Arc::new(MemoryPage::for_kind(PageKind::Dashboard));
        let stats = controller(page.clone(), Arc::new(AutoConfirm::new(true)));
        let snapshot: MetricSnapshot = serde_json::from_str(
            r#"{"cpu":55.55,"ram":10,"disk":20,"speed":{"download":1048576,"upload":1048576}}"#,
        )
        .unwrap();
        stats.paint_snapshot(&snapshot);
        assert_eq!(page.text(ids::CPU_VALUE).as_deref(), Some("55.6%"));
        assert_eq!(page.text(ids::NETWORK_VALUE).as_deref(), Some("2.00 MB/s"));
        assert_eq!(page.width(ids::CPU_PROGRESS), Some(55.55));
        assert_eq!(page.text(ids::RAM_DETAILS).as_deref(), Some(""));
    }

    #[tokio::test]
    async fn test_fallback_installed_once() {
        let page = Arc::new(MemoryPage::for_kind(PageKind::Dashboard));
        let stats = controller(page, Arc::new(AutoConfirm::new(true)));
        stats.install_fallback();
        stats.install_fallback();
        stats.install_fallback();
        assert!(stats.is_polling());
        assert_eq!(stats.active_timers(), 1);
        stats.teardown();
        assert_eq!(stats.active_timers(), 0);
    }

    #[tokio::test]
    async fn test_declined_restart_issues_nothing() {
        let page = Arc::new(MemoryPage::for_kind(PageKind::Dashboard));
        let confirm = Arc::new(AutoConfirm::new(false));
        let stats = controller(page.clone(), confirm.clone());
        assert!(stats.restart_service("nfq").await.unwrap().is_none());
        assert_eq!(confirm.asked(), vec!["Are you sure you want to restart the nfq service?".to_string()]);
        assert!(page.alerts().is_empty());
    }
}
