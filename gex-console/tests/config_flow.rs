mod common;

use common::{setup, setup_with};
use gex_console::controllers::{ConfigController, Controller};
use gex_console::page::ids;
use gex_console::surface::SurfaceKind;
use gex_console::{ConsoleError, MemoryPage, Page, PageKind};
use serde_json::json;

#[tokio::test]
async fn test_load_pretty_prints_config() {
    let s = setup(PageKind::Config, true).await;
    s.harness.backend.set_config(json!({ "port": 8080, "rules": { "dir": "/etc/gex" } }));

    let config = ConfigController::new(s.ctx.clone());
    config.activate().await;
    let expected = "{\n    \"port\": 8080,\n    \"rules\": {\n        \"dir\": \"/etc/gex\"\n    }\n}";
    assert_eq!(config.text().await, expected);
    assert_eq!(s.page.text(ids::CONFIG_EDITOR).as_deref(), Some(expected));
}

#[tokio::test]
async fn test_rich_surface_uses_two_spaces() {
    let s = setup_with(MemoryPage::for_kind(PageKind::Config), true, |c| c.config_surface = SurfaceKind::Rich).await;
    s.harness.backend.set_config(json!({ "a": [1] }));
    let config = ConfigController::new(s.ctx.clone());
    config.load().await.unwrap();
    assert_eq!(config.text().await, "{\n  \"a\": [\n    1\n  ]\n}");
}

#[tokio::test]
async fn test_submit_sends_exact_text() {
    let s = setup(PageKind::Config, true).await;
    let config = ConfigController::new(s.ctx.clone());
    config.load().await.unwrap();

    let text = "{ \"port\":   9090 }";
    config.set_text(text).await;
    config.submit().await.unwrap();

    s.harness.assert_body("POST", "/api/config", text).unwrap();
    assert_eq!(s.harness.backend.config(), json!({ "port": 9090 }));
    let message = s.page.text(ids::MESSAGE_CONTAINER).unwrap();
    assert!(message.contains("message success") && message.contains("Configuration saved"), "{message}");
}

#[tokio::test]
async fn test_invalid_json_never_reaches_backend() {
    let s = setup(PageKind::Config, true).await;
    let config = ConfigController::new(s.ctx.clone());
    config.load().await.unwrap();

    config.set_text("{ \"port\": ").await;
    assert!(matches!(config.submit().await, Err(ConsoleError::InvalidJson(_))));
    s.harness.assert_no_request("POST", "/api/config").unwrap();
    let message = s.page.text(ids::MESSAGE_CONTAINER).unwrap();
    assert!(message.contains("message error") && message.contains("Invalid JSON: "), "{message}");
}

#[tokio::test]
async fn test_server_rejection_is_reported() {
    let s = setup(PageKind::Config, true).await;
    s.harness.backend.fail_mutations(Some("disk full"));
    let config = ConfigController::new(s.ctx.clone());
    config.load().await.unwrap();

    config.set_text("{}").await;
    assert!(config.submit().await.is_err());
    let message = s.page.text(ids::MESSAGE_CONTAINER).unwrap();
    assert!(message.contains("disk full"), "{message}");
}

#[tokio::test]
async fn test_message_disappears_after_toast_delay() {
    let s = setup(PageKind::Config, true).await;
    let config = ConfigController::new(s.ctx.clone());
    config.load().await.unwrap();
    config.set_text("{}").await;
    config.submit().await.unwrap();
    assert!(!s.page.text(ids::MESSAGE_CONTAINER).unwrap().is_empty());

    let page = s.page.clone();
    assert!(s.harness.wait_until(common::WAIT_MS, || page.text(ids::MESSAGE_CONTAINER).unwrap_or_default().is_empty()).await);
}
