mod common;

use common::{setup, setup_with, WAIT_MS};
use gex_console::controllers::{Controller, StatsController};
use gex_console::page::ids;
use gex_console::{ConsoleError, MemoryPage, Page, PageKind};
use gex_devkit::{fixtures, WsMode};
use std::time::Duration;

#[tokio::test]
async fn test_stream_paints_then_falls_back_once_closed() {
    let s = setup(PageKind::Dashboard, true).await;
    let backend = &s.harness.backend;
    backend.set_stats_ws(WsMode::SendThenClose(vec![fixtures::snapshot(42.25, 10.0, 20.0, 1_048_576, 1_048_576)
        .to_string()]));
    backend.set_snapshot(fixtures::snapshot(7.0, 10.0, 20.0, 0, 0));

    let stats = StatsController::new(s.ctx.clone());
    stats.activate().await;

    let page = s.page.clone();
    assert!(s.harness.wait_until(WAIT_MS, || page.text(ids::CPU_VALUE).as_deref() == Some("42.3%")).await);
    assert_eq!(s.page.text(ids::NETWORK_VALUE).as_deref(), Some("2.00 MB/s"));
    assert!(s.harness.wait_until(WAIT_MS, || stats.is_polling()).await);

    // le repli prend le relais via /api/stats
    assert!(s.harness.wait_for_request("GET", "/api/stats", WAIT_MS).await.is_some());
    assert!(s.harness.wait_until(WAIT_MS, || page.text(ids::CPU_VALUE).as_deref() == Some("7.0%")).await);
    assert_eq!(s.page.width(ids::CPU_PROGRESS), Some(7.0));
    stats.teardown();
}

#[tokio::test]
async fn test_refused_stream_installs_single_fallback() {
    let s = setup(PageKind::Dashboard, true).await;
    let stats = StatsController::new(s.ctx.clone());
    stats.activate().await;

    assert!(s.harness.wait_until(WAIT_MS, || stats.is_polling()).await);
    stats.install_fallback();
    stats.install_fallback();

    s.harness.reset();
    tokio::time::sleep(Duration::from_millis(2200)).await;
    let polls = s.harness.count("GET", "/api/stats");
    assert!((1..=3).contains(&polls), "expected a single 1s poller, got {polls} polls");
    stats.teardown();
}

#[tokio::test]
async fn test_no_stats_grid_skips_stream() {
    let page = MemoryPage::for_kind(PageKind::Dashboard);
    page.remove(ids::STATS_GRID);
    let s = setup_with(page, true, |_| {}).await;
    s.harness.backend.set_packets(fixtures::packets(10, 7, 3));

    let stats = StatsController::new(s.ctx.clone());
    stats.activate().await;

    // compteurs demandés immédiatement à l'activation
    s.harness.assert_request_sent("GET", "/api/packet-stats").unwrap();
    assert_eq!(s.page.text(ids::PACKETS_TOTAL).as_deref(), Some("10"));
    assert_eq!(s.page.text(ids::PACKETS_BLOCKED).as_deref(), Some("3"));

    assert!(s.harness.wait_for_count("GET", "/api/packet-stats", 2, WAIT_MS).await);
    s.harness.assert_no_request("GET", "/ws/").unwrap();
    assert!(!stats.is_polling());
    stats.teardown();
}

#[tokio::test]
async fn test_detailed_snapshot_over_held_stream() {
    let s = setup(PageKind::Dashboard, true).await;
    let backend = &s.harness.backend;
    backend.set_stats_ws(WsMode::SendThenHold(vec![]));

    let stats = StatsController::new(s.ctx.clone());
    stats.activate().await;
    assert!(s.harness.wait_until(WAIT_MS, || backend.stats_subscribers() > 0).await);

    let gib = 1u64 << 30;
    backend.push_stats(fixtures::detailed_snapshot(12.0, (gib, 4 * gib), (3 * gib, 4 * gib)).to_string());
    let page = s.page.clone();
    assert!(s.harness.wait_until(WAIT_MS, || page.text(ids::RAM_DETAILS).as_deref() == Some("1.0 / 4.0 GiB")).await);
    assert_eq!(s.page.text(ids::DISK_VALUE).as_deref(), Some("75.0%"));
    assert!(!stats.is_polling());
    stats.teardown();
}

#[tokio::test]
async fn test_teardown_stops_polling() {
    let s = setup(PageKind::Dashboard, true).await;
    let stats = StatsController::new(s.ctx.clone());
    stats.activate().await;
    assert!(s.harness.wait_until(WAIT_MS, || stats.is_polling()).await);

    stats.teardown();
    s.harness.reset();
    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert_eq!(s.harness.get_stats().total_requests, 0);
}

#[tokio::test]
async fn test_restart_service() {
    let s = setup(PageKind::Dashboard, false).await;
    let stats = StatsController::new(s.ctx.clone());
    assert!(stats.restart_service("web").await.unwrap().is_none());
    s.harness.assert_no_request("POST", "/api/restart").unwrap();
    assert_eq!(s.confirm.asked(), vec!["Are you sure you want to restart the web service?".to_string()]);

    let s = setup(PageKind::Dashboard, true).await;
    let stats = StatsController::new(s.ctx.clone());
    let reply = stats.restart_service("nfq").await.unwrap().unwrap();
    assert!(reply.success);
    assert_eq!(s.page.alerts(), vec!["Служба nfq перезапущена".to_string()]);

    s.harness.backend.fail_mutations(Some("systemctl failed"));
    let err = stats.restart_service("web").await.unwrap_err();
    assert!(matches!(err, ConsoleError::Server(_)));
    assert_eq!(s.page.alerts().last().map(String::as_str), Some("Error: systemctl failed"));
}
