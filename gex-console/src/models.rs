use serde::{Deserialize, Deserializer, Serialize};
use time::OffsetDateTime;

/// Instantané des métriques système poussé par /ws/stats ou servi par /api/stats
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricSnapshot {
    pub cpu: f64,
    pub ram: f64,
    pub disk: f64,
    #[serde(default)]
    pub speed: Speed,
    #[serde(default)]
    pub ram_used: Option<u64>,
    #[serde(default)]
    pub ram_total: Option<u64>,
    #[serde(default)]
    pub disk_used: Option<u64>,
    #[serde(default)]
    pub disk_total: Option<u64>,
    #[serde(default)]
    pub timestamp: Option<i64>,
}

/// Débits réseau en octets/seconde
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Speed {
    pub download: u64,
    pub upload: u64,
}

impl Speed {
    pub fn combined(&self) -> u64 {
        self.download.saturating_add(self.upload)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacketCounters {
    pub total: u64,
    pub passed: u64,
    pub blocked: u64,
}

/// Action d'une règle ; toute valeur inconnue est conservée telle quelle.
/// Absente ou `null` => `Other("")`, seule une action "allow" explicite autorise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RuleAction {
    Allow,
    Block,
    Other(String),
}

impl Default for RuleAction {
    fn default() -> Self {
        RuleAction::Other(String::new())
    }
}

impl RuleAction {
    pub fn is_allow(&self) -> bool {
        matches!(self, RuleAction::Allow)
    }
}

impl From<String> for RuleAction {
    fn from(value: String) -> Self {
        match value.as_str() {
            "allow" => RuleAction::Allow,
            "block" => RuleAction::Block,
            _ => RuleAction::Other(value),
        }
    }
}

impl From<RuleAction> for String {
    fn from(action: RuleAction) -> Self {
        match action {
            RuleAction::Allow => "allow".into(),
            RuleAction::Block => "block".into(),
            RuleAction::Other(value) => value,
        }
    }
}

/// Règle de pare-feu telle qu'exposée par /api/rules
///
/// L'ordre des champs suit celui du backend pour que la ré-sérialisation
/// reste lisible dans l'éditeur.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    #[serde(default, deserialize_with = "nullable")]
    pub id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub action: RuleAction,
    #[serde(default, deserialize_with = "nullable")]
    pub protocol: String,
    #[serde(rename = "sourceIP", default, deserialize_with = "nullable")]
    pub source_ip: String,
    #[serde(rename = "destIP", default, deserialize_with = "nullable")]
    pub dest_ip: String,
    #[serde(rename = "sourcePort", default, deserialize_with = "nullable")]
    pub source_port: i64,
    #[serde(rename = "destPort", default, deserialize_with = "nullable")]
    pub dest_port: i64,
    #[serde(default, deserialize_with = "nullable")]
    pub enabled: bool,
    #[serde(default, deserialize_with = "nullable")]
    pub description: String,
}

impl Rule {
    /// Modèle pré-rempli d'une nouvelle règle (id synthétique `rule_<millis>`)
    pub fn template(name: &str) -> Self {
        Self {
            id: synthetic_rule_id(),
            name: name.to_string(),
            action: RuleAction::Allow,
            protocol: "tcp".into(),
            source_ip: "0.0.0.0/0".into(),
            enabled: true,
            ..Self::default()
        }
    }
}

pub fn synthetic_rule_id() -> String {
    format!("rule_{}", now_millis())
}

pub fn now_millis() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

// null et absence valent la valeur par défaut, comme côté backend
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Réponse générique `{success, message?, error?}` des mutations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiReply {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub rule: Option<Rule>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RestartReply {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub service: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RuleFilesReply {
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default, deserialize_with = "nullable")]
    pub files: Vec<String>,
    #[serde(default)]
    pub error: Option<String>,
}

fn default_success() -> bool {
    true
}

/// Messages poussés par /ws/logs
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LogEvent {
    InitialLogs {
        #[serde(default)]
        lines: Vec<String>,
    },
    Logs {
        #[serde(default)]
        lines: Vec<String>,
    },
}
