/*!
Constructeurs de messages du backend GEX

Produit les charges utiles JSON telles que le backend les sert :
instantanés de métriques, compteurs de paquets, règles, événements /ws/logs.
*/

use serde_json::{json, Value};

/// Instantané /api/stats ou /ws/stats (débits en octets/s)
pub fn snapshot(cpu: f64, ram: f64, disk: f64, download: u64, upload: u64) -> Value {
    json!({
        "cpu": cpu,
        "ram": ram,
        "disk": disk,
        "speed": { "download": download, "upload": upload },
        "timestamp": chrono::Utc::now().timestamp_millis(),
    })
}

/// Instantané avec les volumes RAM/disque en octets
pub fn detailed_snapshot(cpu: f64, ram: (u64, u64), disk: (u64, u64)) -> Value {
    let mut snap = snapshot(cpu, percent(ram), percent(disk), 0, 0);
    snap["ramUsed"] = json!(ram.0);
    snap["ramTotal"] = json!(ram.1);
    snap["diskUsed"] = json!(disk.0);
    snap["diskTotal"] = json!(disk.1);
    snap
}

fn percent((used, total): (u64, u64)) -> f64 {
    if total == 0 {
        return 0.0;
    }
    used as f64 * 100.0 / total as f64
}

pub fn packets(total: u64, passed: u64, blocked: u64) -> Value {
    json!({ "total": total, "passed": passed, "blocked": blocked })
}

/// Règle structurée ; `dest_port` 0 = tous les ports
pub fn rule(id: &str, name: &str, action: &str, dest_port: i64, enabled: bool) -> Value {
    json!({
        "id": id,
        "name": name,
        "action": action,
        "protocol": "tcp",
        "sourceIP": "",
        "destIP": "",
        "sourcePort": 0,
        "destPort": dest_port,
        "enabled": enabled,
        "description": "",
    })
}

/// Premier message de /ws/logs
pub fn initial_logs(lines: &[&str]) -> String {
    json!({ "type": "initial_logs", "lines": lines }).to_string()
}

/// Lignes ajoutées poussées par /ws/logs
pub fn appended_logs(lines: &[&str]) -> String {
    json!({ "type": "logs", "lines": lines }).to_string()
}

/// Ligne de log horodatée au format du backend
pub fn log_line(message: &str) -> String {
    format!("{} {}", chrono::Local::now().format("%Y/%m/%d %H:%M:%S"), message)
}
