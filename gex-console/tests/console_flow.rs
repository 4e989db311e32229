mod common;

use common::{setup_with, WAIT_MS};
use gex_console::page::ids;
use gex_console::{ActiveController, Console, MemoryPage, Page, PageKind};
use gex_devkit::fixtures;
use std::time::Duration;

fn all_pages() -> MemoryPage {
    let page = MemoryPage::new();
    for kind in [PageKind::Dashboard, PageKind::Logs, PageKind::Config, PageKind::Rules, PageKind::RuleFiles] {
        for id in kind.elements() {
            page.insert(id);
        }
    }
    page
}

#[tokio::test]
async fn test_navigation_activates_one_controller() {
    let s = setup_with(all_pages(), true, |_| {}).await;
    s.harness.backend.put_rule(fixtures::rule("r1", "ssh", "allow", 22, true));
    let mut console = Console::new(s.ctx.clone());

    assert_eq!(console.navigate("/rules.html?tab=1").await, Some(PageKind::Rules));
    assert!(matches!(console.active(), Some(ActiveController::Rules(_))));
    assert!(s.page.text(ids::RULES_TBODY).unwrap().contains("ssh"));

    assert_eq!(console.navigate("/unknown.html").await, None);
    assert_eq!(console.current(), Some(PageKind::Rules));

    console.navigate("/logs.html").await;
    assert_eq!(console.current(), Some(PageKind::Logs));
    s.harness.assert_request_sent("GET", "/api/logs").unwrap();
}

#[tokio::test]
async fn test_leaving_page_stops_its_timers() {
    let s = setup_with(all_pages(), true, |_| {}).await;
    let mut console = Console::new(s.ctx.clone());

    console.navigate("/logs.html").await;
    assert!(s.harness.wait_for_count("GET", "/api/logs", 2, WAIT_MS).await);

    console.navigate("/config.html").await;
    s.harness.reset();
    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert_eq!(s.harness.count("GET", "/api/logs"), 0);

    console.close();
    assert_eq!(console.current(), None);
}

#[tokio::test]
async fn test_dashboard_route() {
    let s = setup_with(all_pages(), true, |_| {}).await;
    s.harness.backend.set_packets(fixtures::packets(5, 4, 1));
    let mut console = Console::new(s.ctx.clone());

    assert_eq!(console.navigate("/").await, Some(PageKind::Dashboard));
    assert_eq!(s.page.text(ids::PACKETS_PASSED).as_deref(), Some("4"));
    drop(console);

    s.harness.reset();
    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert_eq!(s.harness.count("GET", "/api/packet-stats"), 0);
}
