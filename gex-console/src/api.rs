/**
 * CLIENT API - Accès REST et WebSocket au backend du tableau de bord
 *
 * RÔLE :
 * Une méthode par route du backend (stats, paquets, logs, config, règles,
 * fichiers de règles, redémarrage de services) plus l'ouverture des flux
 * WebSocket /ws/stats et /ws/logs.
 *
 * FONCTIONNEMENT :
 * - Les segments de chemin (id de règle, nom de fichier, service) sont
 *   encodés via `Url::path_segments_mut`
 * - Statut non-2xx : `{error}` JSON => ConsoleError::Server, sinon Http
 * - Réponse `{success: false, error}` => ConsoleError::Server (texte verbatim)
 * - Aucun retry : seules les boucles de polling réessaient
 */

use reqwest::{header, Client, Response, Url};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::debug;

use crate::error::{ConsoleError, Result};
use crate::models::{ApiReply, MetricSnapshot, PacketCounters, RestartReply, Rule, RuleFilesReply};

pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

pub const WS_STATS: &str = "ws/stats";
pub const WS_LOGS: &str = "ws/logs";

#[derive(Clone, Debug)]
pub struct ApiClient {
    http: Client,
    base: Url,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base = Url::parse(base_url).map_err(|e| ConsoleError::Url(format!("{base_url}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(ConsoleError::Url(base_url.to_string()));
        }
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("gex-console/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http, base })
    }

    /// URL de base + segments encodés un par un
    pub fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ConsoleError::Url(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Même hôte, schéma ws/wss
    pub fn ws_url(&self, path: &str) -> Result<Url> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let mut url = self.url(&segments)?;
        let scheme = match url.scheme() {
            "https" | "wss" => "wss",
            _ => "ws",
        };
        url.set_scheme(scheme)
            .map_err(|_| ConsoleError::Url(url.to_string()))?;
        Ok(url)
    }

    pub async fn connect(&self, path: &str) -> Result<WsStream> {
        let url = self.ws_url(path)?;
        debug!("connecting websocket {url}");
        let (stream, _) = connect_async(url.as_str()).await?;
        Ok(stream)
    }

    // ===== Statistiques =====

    pub async fn stats(&self) -> Result<MetricSnapshot> {
        let resp = self.http.get(self.url(&["api", "stats"])?).send().await?;
        read_json(resp).await
    }

    pub async fn packet_stats(&self) -> Result<PacketCounters> {
        let resp = self.http.get(self.url(&["api", "packet-stats"])?).send().await?;
        read_json(resp).await
    }

    pub async fn restart_service(&self, service: &str) -> Result<RestartReply> {
        let resp = self.http.post(self.url(&["api", "restart", service])?).send().await?;
        let reply: RestartReply = read_json(resp).await?;
        if !reply.success {
            return Err(ConsoleError::Server(reply.error.unwrap_or_default()));
        }
        Ok(reply)
    }

    // ===== Logs & configuration =====

    pub async fn logs(&self) -> Result<String> {
        let resp = self.http.get(self.url(&["api", "logs"])?).send().await?;
        read_text(resp).await
    }

    pub async fn config(&self) -> Result<Value> {
        let resp = self.http.get(self.url(&["api", "config"])?).send().await?;
        read_json(resp).await
    }

    /// Envoie le texte saisi tel quel (ordre des clés et mise en forme préservés)
    pub async fn save_config(&self, text: &str) -> Result<ApiReply> {
        let resp = self
            .http
            .post(self.url(&["api", "config"])?)
            .header(header::CONTENT_TYPE, "application/json")
            .body(text.to_string())
            .send()
            .await?;
        checked(read_json(resp).await?)
    }

    // ===== Règles structurées =====

    pub async fn rules(&self) -> Result<Vec<Rule>> {
        let resp = self.http.get(self.url(&["api", "rules"])?).send().await?;
        let rules: Option<Vec<Rule>> = read_json(resp).await?;
        Ok(rules.unwrap_or_default())
    }

    pub async fn rule(&self, id: &str) -> Result<Rule> {
        let resp = self.http.get(self.url(&["api", "rules", id])?).send().await?;
        read_json(resp).await
    }

    pub async fn create_rule(&self, rule: &Rule) -> Result<ApiReply> {
        self.send_json(self.http.post(self.url(&["api", "rules"])?), rule).await
    }

    pub async fn update_rule(&self, id: &str, rule: &Rule) -> Result<ApiReply> {
        self.send_json(self.http.put(self.url(&["api", "rules", id])?), rule).await
    }

    pub async fn delete_rule(&self, id: &str) -> Result<ApiReply> {
        let resp = self.http.delete(self.url(&["api", "rules", id])?).send().await?;
        checked(read_json(resp).await?)
    }

    // ===== Fichiers de règles bruts =====

    pub async fn rule_files(&self) -> Result<Vec<String>> {
        let resp = self.http.get(self.url(&["api", "rules", "files"])?).send().await?;
        let reply: RuleFilesReply = read_json(resp).await?;
        if !reply.success {
            return Err(ConsoleError::Server(reply.error.unwrap_or_default()));
        }
        Ok(reply.files)
    }

    pub async fn rule_file(&self, name: &str) -> Result<String> {
        let resp = self.http.get(self.raw_url(name)?).send().await?;
        read_text(resp).await
    }

    pub async fn create_rule_file(&self, name: &str, text: &str) -> Result<ApiReply> {
        let resp = self.http.post(self.raw_url(name)?).body(text.to_string()).send().await?;
        checked(read_json(resp).await?)
    }

    pub async fn update_rule_file(&self, name: &str, text: &str) -> Result<ApiReply> {
        let resp = self.http.put(self.raw_url(name)?).body(text.to_string()).send().await?;
        checked(read_json(resp).await?)
    }

    pub async fn delete_rule_file(&self, name: &str) -> Result<ApiReply> {
        let resp = self.http.delete(self.raw_url(name)?).send().await?;
        checked(read_json(resp).await?)
    }

    fn raw_url(&self, name: &str) -> Result<Url> {
        self.url(&["api", "rules", "raw", name])
    }

    async fn send_json<T: Serialize>(&self, req: reqwest::RequestBuilder, body: &T) -> Result<ApiReply> {
        let resp = req.json(body).send().await?;
        checked(read_json(resp).await?)
    }
}

async fn read_text(resp: Response) -> Result<String> {
    let status = resp.status();
    let body = resp.text().await?;
    if !status.is_success() {
        return Err(failure(status.as_u16(), body));
    }
    Ok(body)
}

async fn read_json<T: DeserializeOwned>(resp: Response) -> Result<T> {
    let body = read_text(resp).await?;
    serde_json::from_str(&body).map_err(ConsoleError::Decode)
}

fn failure(status: u16, body: String) -> ConsoleError {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(&body) {
        if let Some(Value::String(err)) = map.get("error") {
            return ConsoleError::Server(err.clone());
        }
    }
    ConsoleError::Http { status, body: body.trim().to_string() }
}

fn checked(reply: ApiReply) -> Result<ApiReply> {
    if reply.success {
        Ok(reply)
    } else {
        Err(ConsoleError::Server(reply.error.clone().unwrap_or_default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(base, Duration::from_secs(1)).unwrap()
    }

    #[test]
    fn test_segments_are_encoded() {
        let api = client("http://fw:8080");
        assert_eq!(api.url(&["api", "rules", "a b/c"]).unwrap().as_str(), "http://fw:8080/api/rules/a%20b%2Fc");
        assert_eq!(api.url(&["api", "stats"]).unwrap().as_str(), "http://fw:8080/api/stats");
    }

    #[test]
    fn test_base_with_prefix() {
        let api = client("http://fw:8080/gex/");
        assert_eq!(api.url(&["api", "logs"]).unwrap().as_str(), "http://fw:8080/gex/api/logs");
    }

    #[test]
    fn test_ws_url_scheme() {
        assert_eq!(client("http://fw:8080").ws_url(WS_STATS).unwrap().as_str(), "ws://fw:8080/ws/stats");
        assert_eq!(client("https://fw").ws_url("/ws/logs").unwrap().as_str(), "wss://fw/ws/logs");
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(ApiClient::new("not a url", Duration::from_secs(1)), Err(ConsoleError::Url(_))));
        assert!(matches!(ApiClient::new("mailto:x@y", Duration::from_secs(1)), Err(ConsoleError::Url(_))));
    }

    #[test]
    fn test_failure_mapping() {
        let err = failure(404, r#"{"success":false,"error":"Файл не найден"}"#.into());
        assert_eq!(err.to_string(), "Файл не найден");
        let err = failure(400, "Некорректный JSON\n".into());
        assert!(matches!(err, ConsoleError::Http { status: 400, ref body } if body == "Некорректный JSON"));
    }

    #[test]
    fn test_checked_reply() {
        let ok = ApiReply { success: true, ..ApiReply::default() };
        assert!(checked(ok).is_ok());
        let ko = ApiReply { success: false, error: Some("disk full".into()), ..ApiReply::default() };
        assert_eq!(checked(ko).unwrap_err().to_string(), "disk full");
    }
}
