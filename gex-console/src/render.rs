/**
 * RENDU - Gabarits HTML et formats d'affichage de la console
 *
 * RÔLE :
 * Transforme les enregistrements typés (règles, fichiers, métriques, messages)
 * en texte ou en balisage prêt à être injecté dans la page.
 *
 * FONCTIONNEMENT :
 * - Tout texte interpolé passe par `escape_html` (noms et descriptions de
 *   règles viennent de l'utilisateur)
 * - Les boutons portent des attributs data-* au lieu de JS inline
 * - Liste vide => exactement un élément de remplacement
 */

use crate::locale::Labels;
use crate::models::{MetricSnapshot, PacketCounters, Rule};
use crate::page::ids;

pub const ALLOW_COLOR: &str = "#27ae60";
pub const DENY_COLOR: &str = "#e74c3c";
const MIB: f64 = 1_048_576.0;
const GIB: f64 = 1_073_741_824.0;

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Arrondi décimal « au plus proche, moitié vers l'extérieur » : 55.55 -> 55.6
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

pub fn fixed(value: f64, decimals: u32) -> String {
    format!("{:.*}", decimals as usize, round_to(value, decimals))
}

pub fn percent(value: f64) -> String {
    format!("{}%", fixed(value, 1))
}

/// Débit cumulé (download + upload) en MB/s, deux décimales
pub fn throughput(bytes_per_sec: u64) -> String {
    format!("{} MB/s", fixed(bytes_per_sec as f64 / MIB, 2))
}

pub fn usage(used: u64, total: u64) -> String {
    format!("{} / {} GiB", fixed(used as f64 / GIB, 1), fixed(total as f64 / GIB, 1))
}

/// Valeurs à peindre pour un instantané de métriques
#[derive(Debug, Default, PartialEq)]
pub struct Readouts {
    pub labels: Vec<(&'static str, String)>,
    pub bars: Vec<(&'static str, f64)>,
}

pub fn snapshot_readouts(snapshot: &MetricSnapshot) -> Readouts {
    let mut labels = vec![
        (ids::CPU_VALUE, percent(snapshot.cpu)),
        (ids::RAM_VALUE, percent(snapshot.ram)),
        (ids::DISK_VALUE, percent(snapshot.disk)),
        (ids::NETWORK_VALUE, throughput(snapshot.speed.combined())),
    ];
    if let (Some(used), Some(total)) = (snapshot.ram_used, snapshot.ram_total) {
        labels.push((ids::RAM_DETAILS, usage(used, total)));
    }
    if let (Some(used), Some(total)) = (snapshot.disk_used, snapshot.disk_total) {
        labels.push((ids::DISK_DETAILS, usage(used, total)));
    }
    Readouts {
        labels,
        bars: vec![
            (ids::CPU_PROGRESS, snapshot.cpu),
            (ids::RAM_PROGRESS, snapshot.ram),
            (ids::DISK_PROGRESS, snapshot.disk),
        ],
    }
}

pub fn packet_readouts(counters: &PacketCounters) -> [(&'static str, String); 3] {
    [
        (ids::PACKETS_TOTAL, counters.total.to_string()),
        (ids::PACKETS_PASSED, counters.passed.to_string()),
        (ids::PACKETS_BLOCKED, counters.blocked.to_string()),
    ]
}

/// `IP[:port]`, « any » localisé si l'IP est vide, port omis s'il vaut 0
pub fn endpoint(ip: &str, port: i64, labels: &Labels) -> String {
    let host = if ip.is_empty() { labels.any } else { ip };
    if port != 0 {
        format!("{host}:{port}")
    } else {
        host.to_string()
    }
}

pub fn rule_row(rule: &Rule, labels: &Labels) -> String {
    let (color, action) = if rule.action.is_allow() {
        (ALLOW_COLOR, labels.allow)
    } else {
        (DENY_COLOR, labels.block)
    };
    let (badge_class, badge) = if rule.enabled {
        ("status-enabled", labels.enabled)
    } else {
        ("status-disabled", labels.disabled)
    };
    let id = escape_html(&rule.id);

    format!(
        concat!(
            "<tr>",
            "<td>{name}</td>",
            "<td><span style=\"color: {color}\">{action}</span></td>",
            "<td>{protocol}</td>",
            "<td>{source}</td>",
            "<td>{dest}</td>",
            "<td><span class=\"{badge_class}\">{badge}</span></td>",
            "<td>",
            "<button class=\"btn btn-primary\" data-action=\"edit\" data-id=\"{id}\">{edit}</button>",
            "<button class=\"btn btn-restart\" data-action=\"delete\" data-id=\"{id}\">{delete}</button>",
            "</td>",
            "</tr>"
        ),
        name = escape_html(&rule.name),
        color = color,
        action = action,
        protocol = escape_html(&rule.protocol.to_uppercase()),
        source = escape_html(&endpoint(&rule.source_ip, rule.source_port, labels)),
        dest = escape_html(&endpoint(&rule.dest_ip, rule.dest_port, labels)),
        badge_class = badge_class,
        badge = badge,
        id = id,
        edit = labels.edit,
        delete = labels.delete,
    )
}

pub fn rules_table(rules: &[Rule], labels: &Labels) -> String {
    if rules.is_empty() {
        return format!("<tr><td colspan=\"7\">{}</td></tr>", labels.no_rules);
    }
    rules.iter().map(|rule| rule_row(rule, labels)).collect()
}

pub fn files_list(files: &[String], labels: &Labels) -> String {
    if files.is_empty() {
        return format!("<p>{}</p>", labels.no_files);
    }
    files
        .iter()
        .map(|name| {
            let name = escape_html(name);
            format!(
                concat!(
                    "<div class=\"rule-file\">",
                    "<span class=\"rule-file-name\">{name}.json</span>",
                    "<div>",
                    "<button class=\"btn btn-warning\" data-action=\"edit\" data-file=\"{name}\">{edit}</button>",
                    "<button class=\"btn btn-danger\" data-action=\"delete\" data-file=\"{name}\">{delete}</button>",
                    "</div>",
                    "</div>"
                ),
                name = name,
                edit = labels.edit,
                delete = labels.delete,
            )
        })
        .collect()
}

pub fn inline_error(text: &str) -> String {
    format!("<p style=\"color: red;\">{}</p>", escape_html(text))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Success,
    Error,
}

impl MessageKind {
    pub fn class(self) -> &'static str {
        match self {
            MessageKind::Success => "success",
            MessageKind::Error => "error",
        }
    }
}

pub fn message(kind: MessageKind, text: &str) -> String {
    format!("<div class=\"message {}\">{}</div>", kind.class(), escape_html(text))
}
