/*!
Backend GEX simulé pour tests sans serveur réel

Serveur axum en mémoire (127.0.0.1, port aléatoire) exposant toutes les routes
du tableau de bord avec la même sémantique que le backend :
- Règles structurées stockées comme fichiers `<id>.json` (partagés avec /api/rules/raw)
- Id `rule_<secondes>` généré si absent à la création, id du chemin imposé au PUT
- Noms de fichiers contenant `/`, `\` ou `..` refusés
- /ws/stats et /ws/logs pilotables (refus, envoi puis fermeture, envoi puis maintien)

Toutes les requêtes HTTP sont enregistrées (méthode, chemin, corps).
*/

use axum::body::{to_bytes, Body};
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use anyhow::Result;

use crate::fixtures;

/// Lignes servies par /api/logs (comme le backend)
pub const LOG_TAIL: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub body: String,
}

/// Comportement d'un point WebSocket
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum WsMode {
    /// Upgrade refusé (404)
    #[default]
    Refuse,
    /// Envoie les messages puis ferme
    SendThenClose(Vec<String>),
    /// Envoie les messages puis relaie les `push_*` jusqu'à fermeture client
    SendThenHold(Vec<String>),
}

struct BackendState {
    snapshot: Value,
    packets: Value,
    logs: String,
    config: Value,
    files: BTreeMap<String, String>,
    stats_ws: WsMode,
    logs_ws: WsMode,
    fail_mutations: Option<String>,
    fail_file_listing: bool,
    fail_logs: bool,
}

impl Default for BackendState {
    fn default() -> Self {
        Self {
            snapshot: fixtures::snapshot(12.5, 40.0, 63.2, 0, 0),
            packets: fixtures::packets(0, 0, 0),
            logs: String::new(),
            config: json!({}),
            files: BTreeMap::new(),
            stats_ws: WsMode::Refuse,
            logs_ws: WsMode::Refuse,
            fail_mutations: None,
            fail_file_listing: false,
            fail_logs: false,
        }
    }
}

#[derive(Clone)]
struct AppState {
    state: Arc<Mutex<BackendState>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    stats_tx: broadcast::Sender<String>,
    logs_tx: broadcast::Sender<String>,
}

struct ServerGuard(JoinHandle<()>);

impl Drop for ServerGuard {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Backend simulé ; les clones partagent le même serveur
#[derive(Clone)]
pub struct StubBackend {
    app: AppState,
    addr: SocketAddr,
    _server: Arc<ServerGuard>,
}

impl StubBackend {
    pub async fn start() -> Result<Self> {
        let app = AppState {
            state: Arc::new(Mutex::new(BackendState::default())),
            requests: Arc::new(Mutex::new(Vec::new())),
            stats_tx: broadcast::channel(64).0,
            logs_tx: broadcast::channel(64).0,
        };
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let router = build_router(app.clone());
        let server = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                log::error!("❌ [STUB] server stopped: {}", e);
            }
        });
        log::info!("🧪 [STUB] GEX backend listening on http://{}", addr);
        Ok(Self { app, addr, _server: Arc::new(ServerGuard(server)) })
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    // ===== Données servies =====

    pub fn set_snapshot(&self, snapshot: Value) {
        self.app.state.lock().unwrap().snapshot = snapshot;
    }

    pub fn set_packets(&self, packets: Value) {
        self.app.state.lock().unwrap().packets = packets;
    }

    pub fn set_logs<S: Into<String>>(&self, logs: S) {
        self.app.state.lock().unwrap().logs = logs.into();
    }

    pub fn set_config(&self, config: Value) {
        self.app.state.lock().unwrap().config = config;
    }

    pub fn config(&self) -> Value {
        self.app.state.lock().unwrap().config.clone()
    }

    /// Dépose un fichier `<name>.json` (contenu brut)
    pub fn put_file<S: Into<String>>(&self, name: &str, content: S) {
        self.app.state.lock().unwrap().files.insert(name.to_string(), content.into());
    }

    /// Dépose une règle structurée, enregistrée comme le fait le backend
    pub fn put_rule(&self, rule: Value) {
        let id = rule.get("id").and_then(Value::as_str).unwrap_or_default().to_string();
        self.put_file(&id, pretty(&rule));
    }

    pub fn file(&self, name: &str) -> Option<String> {
        self.app.state.lock().unwrap().files.get(name).cloned()
    }

    pub fn file_names(&self) -> Vec<String> {
        self.app.state.lock().unwrap().files.keys().cloned().collect()
    }

    // ===== WebSocket =====

    pub fn set_stats_ws(&self, mode: WsMode) {
        self.app.state.lock().unwrap().stats_ws = mode;
    }

    pub fn set_logs_ws(&self, mode: WsMode) {
        self.app.state.lock().unwrap().logs_ws = mode;
    }

    /// Pousse un message aux clients /ws/stats maintenus ouverts
    pub fn push_stats<S: Into<String>>(&self, message: S) -> usize {
        self.app.stats_tx.send(message.into()).unwrap_or(0)
    }

    pub fn push_logs<S: Into<String>>(&self, message: S) -> usize {
        self.app.logs_tx.send(message.into()).unwrap_or(0)
    }

    pub fn stats_subscribers(&self) -> usize {
        self.app.stats_tx.receiver_count()
    }

    pub fn logs_subscribers(&self) -> usize {
        self.app.logs_tx.receiver_count()
    }

    // ===== Pannes simulées =====

    /// Toute mutation répond 500 `{success: false, error}`
    pub fn fail_mutations<S: Into<String>>(&self, error: Option<S>) {
        self.app.state.lock().unwrap().fail_mutations = error.map(Into::into);
    }

    pub fn fail_file_listing(&self, fail: bool) {
        self.app.state.lock().unwrap().fail_file_listing = fail;
    }

    pub fn fail_logs(&self, fail: bool) {
        self.app.state.lock().unwrap().fail_logs = fail;
    }

    // ===== Requêtes reçues =====

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.app.requests.lock().unwrap().clone()
    }

    pub fn clear_requests(&self) {
        self.app.requests.lock().unwrap().clear();
    }
}

fn build_router(app: AppState) -> Router {
    Router::new()
        .route("/api/stats", get(get_stats))
        .route("/api/packet-stats", get(get_packets))
        .route("/api/restart/{service}", post(restart_service))
        .route("/api/logs", get(get_logs))
        .route("/api/config", get(get_config).post(save_config))
        .route("/api/rules", get(list_rules).post(create_rule))
        .route("/api/rules/files", get(list_files))
        .route("/api/rules/{id}", get(get_rule).put(update_rule).delete(delete_rule))
        .route(
            "/api/rules/raw/{name}",
            get(get_raw).post(save_raw).put(save_raw).delete(delete_raw),
        )
        .route("/ws/stats", get(ws_stats))
        .route("/ws/logs", get(ws_logs))
        .layer(middleware::from_fn_with_state(app.clone(), record))
        .with_state(app)
}

async fn record(State(app): State<AppState>, req: Request, next: Next) -> Response {
    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    if path.starts_with("/ws/") {
        app.requests.lock().unwrap().push(RecordedRequest { method, path, body: String::new() });
        return next.run(req).await;
    }

    let (parts, body) = req.into_parts();
    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(_) => return StatusCode::BAD_REQUEST.into_response(),
    };
    log::debug!("🧪 [STUB] {} {}", method, path);
    app.requests.lock().unwrap().push(RecordedRequest {
        method,
        path,
        body: String::from_utf8_lossy(&bytes).into_owned(),
    });
    next.run(Request::from_parts(parts, Body::from(bytes))).await
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_default()
}

fn failure(status: StatusCode, error: String) -> Response {
    (status, Json(json!({ "success": false, "error": error }))).into_response()
}

fn mutation_failure(app: &AppState) -> Option<Response> {
    let error = app.state.lock().unwrap().fail_mutations.clone()?;
    Some(failure(StatusCode::INTERNAL_SERVER_ERROR, error))
}

fn unix_secs() -> i64 {
    chrono::Utc::now().timestamp()
}

fn valid_name(name: &str) -> bool {
    !(name.contains('/') || name.contains('\\') || name.contains(".."))
}

// ===== Statistiques & services =====

async fn get_stats(State(app): State<AppState>) -> Json<Value> {
    Json(app.state.lock().unwrap().snapshot.clone())
}

async fn get_packets(State(app): State<AppState>) -> Json<Value> {
    Json(app.state.lock().unwrap().packets.clone())
}

async fn restart_service(State(app): State<AppState>, Path(service): Path<String>) -> Response {
    if service != "web" && service != "nfq" {
        return (StatusCode::BAD_REQUEST, "Неизвестная служба").into_response();
    }
    if let Some(error) = app.state.lock().unwrap().fail_mutations.clone() {
        return Json(json!({ "success": false, "service": service, "error": error })).into_response();
    }
    Json(json!({
        "success": true,
        "service": service,
        "message": format!("Служба {} перезапущена", service),
    }))
    .into_response()
}

// ===== Logs & configuration =====

async fn get_logs(State(app): State<AppState>) -> Response {
    let state = app.state.lock().unwrap();
    if state.fail_logs {
        return (StatusCode::INTERNAL_SERVER_ERROR, "Не удалось прочитать файл логов").into_response();
    }
    let lines: Vec<&str> = state.logs.split('\n').collect();
    let tail = &lines[lines.len().saturating_sub(LOG_TAIL)..];
    tail.join("\n").into_response()
}

async fn get_config(State(app): State<AppState>) -> Json<Value> {
    Json(app.state.lock().unwrap().config.clone())
}

async fn save_config(State(app): State<AppState>, body: String) -> Response {
    let Ok(config) = serde_json::from_str::<Map<String, Value>>(&body) else {
        return (StatusCode::BAD_REQUEST, "Некорректный JSON").into_response();
    };
    if let Some(resp) = mutation_failure(&app) {
        return resp;
    }
    app.state.lock().unwrap().config = Value::Object(config);
    Json(json!({ "success": true, "message": "Конфигурация сохранена" })).into_response()
}

// ===== Règles structurées =====

fn parse_rule(text: &str) -> Option<Map<String, Value>> {
    serde_json::from_str::<Map<String, Value>>(text).ok()
}

async fn list_rules(State(app): State<AppState>) -> Json<Value> {
    let state = app.state.lock().unwrap();
    let mut rules: Vec<Map<String, Value>> = state.files.values().filter_map(|t| parse_rule(t)).collect();
    rules.sort_by(|a, b| {
        let id = |r: &Map<String, Value>| r.get("id").and_then(Value::as_str).unwrap_or_default().to_string();
        id(a).cmp(&id(b))
    });
    if rules.is_empty() {
        // le backend encode une liste vide comme `null`
        return Json(Value::Null);
    }
    Json(Value::Array(rules.into_iter().map(Value::Object).collect()))
}

async fn create_rule(State(app): State<AppState>, body: String) -> Response {
    let Some(mut rule) = parse_rule(&body) else {
        return failure(StatusCode::BAD_REQUEST, "Некорректные данные".into());
    };
    if let Some(resp) = mutation_failure(&app) {
        return resp;
    }
    let id = rule.get("id").and_then(Value::as_str).unwrap_or_default().to_string();
    let id = if id.is_empty() { format!("rule_{}", unix_secs()) } else { id };
    rule.insert("id".into(), Value::String(id.clone()));
    let rule = Value::Object(rule);
    app.state.lock().unwrap().files.insert(id, pretty(&rule));
    Json(json!({ "success": true, "message": "Правило создано", "rule": rule })).into_response()
}

async fn get_rule(State(app): State<AppState>, Path(id): Path<String>) -> Response {
    let state = app.state.lock().unwrap();
    match state.files.get(&id).and_then(|t| parse_rule(t)) {
        Some(rule) => Json(Value::Object(rule)).into_response(),
        None => failure(StatusCode::NOT_FOUND, format!("Правило не найдено: {}", id)),
    }
}

async fn update_rule(State(app): State<AppState>, Path(id): Path<String>, body: String) -> Response {
    let Some(mut rule) = parse_rule(&body) else {
        return failure(StatusCode::BAD_REQUEST, "Некорректные данные".into());
    };
    if let Some(resp) = mutation_failure(&app) {
        return resp;
    }
    rule.insert("id".into(), Value::String(id.clone()));
    let rule = Value::Object(rule);
    app.state.lock().unwrap().files.insert(id, pretty(&rule));
    Json(json!({ "success": true, "message": "Правило обновлено", "rule": rule })).into_response()
}

async fn delete_rule(State(app): State<AppState>, Path(id): Path<String>) -> Response {
    if let Some(resp) = mutation_failure(&app) {
        return resp;
    }
    if app.state.lock().unwrap().files.remove(&id).is_none() {
        return failure(StatusCode::INTERNAL_SERVER_ERROR, format!("Ошибка удаления правила: {}", id));
    }
    Json(json!({ "success": true, "message": "Правило удалено" })).into_response()
}

// ===== Fichiers bruts =====

async fn list_files(State(app): State<AppState>) -> Json<Value> {
    let state = app.state.lock().unwrap();
    if state.fail_file_listing {
        return Json(json!({ "success": false, "files": [], "error": "rules directory unavailable" }));
    }
    let files: Vec<&String> = state.files.keys().collect();
    Json(json!({ "success": true, "files": files }))
}

async fn get_raw(State(app): State<AppState>, Path(name): Path<String>) -> Response {
    if !valid_name(&name) {
        return failure(StatusCode::BAD_REQUEST, "Недопустимое имя файла".into());
    }
    match app.state.lock().unwrap().files.get(&name) {
        Some(content) => content.clone().into_response(),
        None => failure(StatusCode::NOT_FOUND, format!("Файл не найден: {}.json", name)),
    }
}

async fn save_raw(State(app): State<AppState>, Path(name): Path<String>, body: String) -> Response {
    if !valid_name(&name) {
        return failure(StatusCode::BAD_REQUEST, "Недопустимое имя файла".into());
    }
    if let Some(resp) = mutation_failure(&app) {
        return resp;
    }
    if !body.is_empty() && serde_json::from_str::<Value>(&body).is_err() {
        log::warn!("⚠️ [STUB] file {} contains invalid JSON but will be saved", name);
    }
    app.state.lock().unwrap().files.insert(name, body);
    Json(json!({ "success": true, "message": "Файл успешно сохранен" })).into_response()
}

async fn delete_raw(State(app): State<AppState>, Path(name): Path<String>) -> Response {
    if !valid_name(&name) {
        return failure(StatusCode::BAD_REQUEST, "Недопустимое имя файла".into());
    }
    if let Some(resp) = mutation_failure(&app) {
        return resp;
    }
    if app.state.lock().unwrap().files.remove(&name).is_none() {
        return failure(StatusCode::INTERNAL_SERVER_ERROR, format!("Ошибка удаления файла: {}.json", name));
    }
    Json(json!({ "success": true, "message": "Файл успешно удален" })).into_response()
}

// ===== WebSocket =====

async fn ws_stats(State(app): State<AppState>, ws: WebSocketUpgrade) -> Response {
    let mode = app.state.lock().unwrap().stats_ws.clone();
    upgrade(ws, mode, app.stats_tx.subscribe())
}

async fn ws_logs(State(app): State<AppState>, ws: WebSocketUpgrade) -> Response {
    let mode = app.state.lock().unwrap().logs_ws.clone();
    upgrade(ws, mode, app.logs_tx.subscribe())
}

fn upgrade(ws: WebSocketUpgrade, mode: WsMode, live: broadcast::Receiver<String>) -> Response {
    match mode {
        WsMode::Refuse => StatusCode::NOT_FOUND.into_response(),
        WsMode::SendThenClose(messages) => ws.on_upgrade(move |socket| async move {
            drop(live);
            serve_socket(socket, messages, None).await;
        }),
        WsMode::SendThenHold(messages) => {
            ws.on_upgrade(move |socket| serve_socket(socket, messages, Some(live)))
        }
    }
}

async fn serve_socket(mut socket: WebSocket, messages: Vec<String>, live: Option<broadcast::Receiver<String>>) {
    for message in messages {
        if socket.send(Message::Text(message.into())).await.is_err() {
            return;
        }
    }

    let Some(mut live) = live else {
        let _ = socket.send(Message::Close(None)).await;
        return;
    };

    loop {
        tokio::select! {
            pushed = live.recv() => match pushed {
                Ok(message) => {
                    if socket.send(Message::Text(message.into())).await.is_err() {
                        return;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => return,
            },
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => return,
                Some(Ok(_)) => {}
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rule_lifecycle() {
        let stub = StubBackend::start().await.unwrap();
        let http = reqwest::Client::new();
        let base = stub.url();

        let listed: Value = http.get(format!("{}/api/rules", base)).send().await.unwrap().json().await.unwrap();
        assert_eq!(listed, Value::Null);

        let reply: Value = http
            .post(format!("{}/api/rules", base))
            .body(r#"{"name":"no id","action":"block"}"#)
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(reply["success"], true);
        let id = reply["rule"]["id"].as_str().unwrap().to_string();
        assert!(id.starts_with("rule_"));

        let reply: Value = http
            .put(format!("{}/api/rules/{}", base, id))
            .body(r#"{"id":"other","name":"renamed"}"#)
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(reply["rule"]["id"], id.as_str());
        assert_eq!(stub.file_names(), vec![id.clone()]);

        let requests = stub.requests();
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[2].method, "PUT");
        assert!(requests[2].body.contains("renamed"));
    }

    #[tokio::test]
    async fn test_raw_files_and_names() {
        let stub = StubBackend::start().await.unwrap();
        let http = reqwest::Client::new();
        let base = stub.url();

        let resp = http.post(format!("{}/api/rules/raw/a%2Fb", base)).body("{}").send().await.unwrap();
        assert_eq!(resp.status(), 400);

        let resp = http.post(format!("{}/api/rules/raw/web", base)).body("not json").send().await.unwrap();
        assert_eq!(resp.status(), 200);
        assert_eq!(stub.file("web").as_deref(), Some("not json"));

        let text = http.get(format!("{}/api/rules/raw/web", base)).send().await.unwrap().text().await.unwrap();
        assert_eq!(text, "not json");

        let listed: Value = http.get(format!("{}/api/rules/files", base)).send().await.unwrap().json().await.unwrap();
        assert_eq!(listed["files"], json!(["web"]));
    }

    #[tokio::test]
    async fn test_logs_tail_and_config() {
        let stub = StubBackend::start().await.unwrap();
        let http = reqwest::Client::new();
        let lines: Vec<String> = (0..1005).map(|i| i.to_string()).collect();
        stub.set_logs(lines.join("\n"));

        let text = http.get(format!("{}/api/logs", stub.url())).send().await.unwrap().text().await.unwrap();
        assert_eq!(text.lines().count(), LOG_TAIL);
        assert!(text.starts_with("5\n"));

        let resp = http.post(format!("{}/api/config", stub.url())).body("{bad").send().await.unwrap();
        assert_eq!(resp.status(), 400);
        assert_eq!(resp.text().await.unwrap(), "Некорректный JSON");
    }
}
