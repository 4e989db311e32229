/*!
# GEX Console - Console d'administration du pare-feu GEX

Bibliothèque pilotant le backend du tableau de bord GEX via son API REST et
ses flux WebSocket :
- Statistiques système temps réel (/ws/stats, repli polling /api/stats)
- Compteurs de paquets, logs (polling ou suivi /ws/logs)
- Éditeur de configuration JSON validé côté client
- Règles structurées (/api/rules) et fichiers de règles bruts (/api/rules/raw)

La page affichée est abstraite par le trait [`page::Page`] : les contrôleurs
sont testables sans navigateur et le binaire les pilote via un front-end
terminal.
*/

pub mod api;
pub mod config;
pub mod confirm;
pub mod console;
pub mod controllers;
pub mod documents;
pub mod error;
pub mod json;
pub mod locale;
pub mod models;
pub mod page;
pub mod render;
pub mod surface;
pub mod terminal;
pub mod timers;
pub mod toast;

pub use api::ApiClient;
pub use config::{load_config, ConsoleConfig};
pub use console::{ActiveController, Console};
pub use controllers::{Context, Controller};
pub use error::{ConsoleError, Result};
pub use page::{MemoryPage, Page, PageKind};
