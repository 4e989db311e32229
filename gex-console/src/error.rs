//! Erreurs de la console GEX
//!
//! Trois familles (cf. design) : transport (réseau, HTTP, WebSocket), saisie
//! invalide (JSON tapé par l'utilisateur, nom de fichier) et échecs applicatifs
//! rapportés par le serveur via `{success: false, error}`. Aucune n'est fatale.

/// Erreurs possibles lors des échanges avec le backend ou de l'édition
#[derive(Debug, thiserror::Error)]
pub enum ConsoleError {
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },
    /// Erreur rapportée telle quelle par le serveur
    #[error("{0}")]
    Server(String),
    #[error("{0}")]
    InvalidJson(serde_json::Error),
    #[error("unexpected response payload: {0}")]
    Decode(serde_json::Error),
    #[error("invalid file name: {0:?}")]
    InvalidName(String),
    #[error("file name required")]
    MissingName,
    #[error("no open editor session")]
    NoSession,
    #[error("{0} not supported")]
    Unsupported(&'static str),
    #[error("websocket: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
    #[error("invalid url: {0}")]
    Url(String),
    #[error("config: {0}")]
    Config(#[from] serde_yaml::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConsoleError {
    /// Vrai si la requête n'a jamais atteint le serveur (saisie bloquée côté client)
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            ConsoleError::InvalidJson(_)
                | ConsoleError::InvalidName(_)
                | ConsoleError::MissingName
                | ConsoleError::NoSession
                | ConsoleError::Unsupported(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ConsoleError>;
