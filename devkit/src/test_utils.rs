/*!
Test Harness pour la console GEX

Facilite l'écriture de tests de contrôleurs avec:
- Démarrage automatique du backend simulé
- Attente active sur une condition (polling 50ms)
- Assertions sur les requêtes HTTP reçues par le backend
*/

use crate::backend_stub::{RecordedRequest, StubBackend};
use std::collections::HashMap;
use std::time::Duration;
use anyhow::Result;

/// Harness de test complet : backend simulé + assertions
pub struct TestHarness {
    pub backend: StubBackend,
}

impl TestHarness {
    pub async fn start() -> Result<Self> {
        env_logger::try_init().ok(); // Init logging pour tests
        let backend = StubBackend::start().await?;
        Ok(Self { backend })
    }

    pub fn url(&self) -> String {
        self.backend.url()
    }

    /// Attend qu'une condition devienne vraie ; false au délai dépassé
    pub async fn wait_until<F: FnMut() -> bool>(&self, timeout_ms: u64, mut condition: F) -> bool {
        let start = std::time::Instant::now();

        while start.elapsed() < Duration::from_millis(timeout_ms) {
            if condition() {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }

        condition()
    }

    /// Attend qu'une requête `method path` ait été reçue
    pub async fn wait_for_request(&self, method: &str, path: &str, timeout_ms: u64) -> Option<RecordedRequest> {
        if self.wait_until(timeout_ms, || self.last_request(method, path).is_some()).await {
            log::info!("✅ Received expected request {} {}", method, path);
            return self.last_request(method, path);
        }
        log::warn!("⏰ Timeout waiting for {} {}", method, path);
        None
    }

    /// Attend qu'au moins `count` requêtes `method path` aient été reçues
    pub async fn wait_for_count(&self, method: &str, path: &str, count: usize, timeout_ms: u64) -> bool {
        self.wait_until(timeout_ms, || self.count(method, path) >= count).await
    }

    pub fn requests_to(&self, method: &str, path: &str) -> Vec<RecordedRequest> {
        self.backend
            .requests()
            .into_iter()
            .filter(|r| r.method == method && r.path == path)
            .collect()
    }

    pub fn count(&self, method: &str, path: &str) -> usize {
        self.requests_to(method, path).len()
    }

    pub fn last_request(&self, method: &str, path: &str) -> Option<RecordedRequest> {
        self.requests_to(method, path).pop()
    }

    /// Assert qu'une requête a été envoyée
    pub fn assert_request_sent(&self, method: &str, path: &str) -> Result<RecordedRequest> {
        match self.last_request(method, path) {
            Some(request) => {
                log::info!("✅ Found request {} {}", method, path);
                Ok(request)
            }
            None => anyhow::bail!("Expected request not found: {} {}", method, path),
        }
    }

    /// Assert qu'aucune requête `method` n'a visé un chemin commençant par `prefix`
    pub fn assert_no_request(&self, method: &str, prefix: &str) -> Result<()> {
        let sent: Vec<String> = self
            .backend
            .requests()
            .into_iter()
            .filter(|r| r.method == method && r.path.starts_with(prefix))
            .map(|r| r.path)
            .collect();
        if !sent.is_empty() {
            anyhow::bail!("Unexpected {} requests under {}: {:?}", method, prefix, sent);
        }
        Ok(())
    }

    /// Assert que le corps de la dernière requête est exactement `expected`
    pub fn assert_body(&self, method: &str, path: &str, expected: &str) -> Result<()> {
        let request = self.assert_request_sent(method, path)?;
        if request.body != expected {
            anyhow::bail!(
                "Body mismatch for {} {}: expected {:?}, got {:?}",
                method, path, expected, request.body
            );
        }
        Ok(())
    }

    /// Stats sur les requêtes reçues
    pub fn get_stats(&self) -> TestStats {
        let requests = self.backend.requests();
        let mut route_counts = HashMap::new();

        for request in &requests {
            *route_counts.entry(format!("{} {}", request.method, request.path)).or_insert(0) += 1;
        }

        TestStats { total_requests: requests.len(), route_counts }
    }

    /// Oublie les requêtes reçues
    pub fn reset(&self) {
        self.backend.clear_requests();
        log::info!("🧹 Test harness reset");
    }
}

#[derive(Debug)]
pub struct TestStats {
    pub total_requests: usize,
    pub route_counts: HashMap<String, usize>,
}

impl TestStats {
    pub fn print(&self) {
        println!("📊 Test Statistics:");
        println!("  Total requests: {}", self.total_requests);
        for (route, count) in &self.route_counts {
            println!("    {}: {} requests", route, count);
        }
    }
}
