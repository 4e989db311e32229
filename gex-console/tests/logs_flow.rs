mod common;

use common::{setup, setup_with, WAIT_MS};
use gex_console::controllers::{Controller, LogsController};
use gex_console::page::ids;
use gex_console::{MemoryPage, Page, PageKind};
use gex_devkit::{fixtures, WsMode};

#[tokio::test]
async fn test_polling_refreshes_and_scrolls() {
    let s = setup(PageKind::Logs, true).await;
    s.harness.backend.set_logs("line 1\nline 2");

    let logs = LogsController::new(s.ctx.clone());
    logs.activate().await;
    assert_eq!(s.page.text(ids::LOG_CONTAINER).as_deref(), Some("line 1\nline 2"));
    assert_eq!(s.page.scroll_count(ids::LOG_CONTAINER), 1);
    assert!(logs.is_polling());

    s.harness.backend.set_logs(format!("line 1\nline 2\n{}", fixtures::log_line("blocked 10.0.0.1")));
    let page = s.page.clone();
    assert!(s.harness.wait_until(WAIT_MS, || page.text(ids::LOG_CONTAINER).unwrap_or_default().contains("blocked")).await);
    assert!(s.page.scroll_count(ids::LOG_CONTAINER) >= 2);
    logs.teardown();
}

#[tokio::test]
async fn test_empty_and_failed_logs() {
    let s = setup(PageKind::Logs, true).await;
    let logs = LogsController::new(s.ctx.clone());

    logs.refresh().await.unwrap();
    assert_eq!(s.page.text(ids::LOG_CONTAINER).as_deref(), Some("Logs are empty"));

    s.harness.backend.fail_logs(true);
    assert!(logs.refresh().await.is_err());
    let text = s.page.text(ids::LOG_CONTAINER).unwrap();
    assert!(text.starts_with("Failed to load logs: "), "{text}");
    assert!(text.contains("Не удалось прочитать файл логов"));
}

#[tokio::test]
async fn test_missing_container_paints_nothing() {
    let s = setup_with(MemoryPage::new(), true, |_| {}).await;
    s.harness.backend.set_logs("x");
    let logs = LogsController::new(s.ctx.clone());
    assert_eq!(logs.refresh().await.unwrap(), "x");
    assert!(!s.page.exists(ids::LOG_CONTAINER));
}

#[tokio::test]
async fn test_follow_appends_then_polls_when_stream_ends() {
    let s = setup_with(MemoryPage::for_kind(PageKind::Logs), true, |c| c.logs_follow = true).await;
    let backend = &s.harness.backend;
    backend.set_logs_ws(WsMode::SendThenHold(vec![fixtures::initial_logs(&["a", "b"])]));
    backend.set_logs("from file");

    let logs = LogsController::new(s.ctx.clone());
    logs.activate().await;

    let page = s.page.clone();
    assert!(s.harness.wait_until(WAIT_MS, || page.text(ids::LOG_CONTAINER).as_deref() == Some("a\nb")).await);
    assert!(s.harness.wait_until(WAIT_MS, || backend.logs_subscribers() > 0).await);
    backend.push_logs(fixtures::appended_logs(&["c"]));
    assert!(s.harness.wait_until(WAIT_MS, || page.text(ids::LOG_CONTAINER).as_deref() == Some("a\nb\nc")).await);
    s.harness.assert_no_request("GET", "/api/logs").unwrap();
    assert!(!logs.is_polling());
    logs.teardown();

    // flux refusé : repli immédiat sur /api/logs
    let s = setup_with(MemoryPage::for_kind(PageKind::Logs), true, |c| c.logs_follow = true).await;
    s.harness.backend.set_logs("from file");
    let logs = LogsController::new(s.ctx.clone());
    logs.activate().await;
    assert!(s.harness.wait_for_request("GET", "/api/logs", WAIT_MS).await.is_some());
    let page = s.page.clone();
    assert!(s.harness.wait_until(WAIT_MS, || page.text(ids::LOG_CONTAINER).as_deref() == Some("from file")).await);
    assert!(logs.is_polling());
    logs.teardown();
}
