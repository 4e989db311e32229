/**
 * PAGE - Abstraction de la page affichée par la console
 *
 * RÔLE :
 * Les contrôleurs ne manipulent jamais un DOM directement : ils passent par
 * le trait `Page`, adressé par identifiants d'éléments.
 *
 * FONCTIONNEMENT :
 * - Chaque mutation renvoie `false` si l'élément n'existe pas (no-op)
 * - `MemoryPage` : implémentation en mémoire (tests, front-end terminal)
 * - `PageKind` : quelle page est chargée et quels éléments elle porte
 *
 * UTILITÉ :
 * - Contrôleurs testables sans navigateur
 * - Une requête qui revient après un changement de page ne peint rien
 */

use parking_lot::Mutex;
use std::collections::HashMap;

pub mod ids {
    pub const STATS_GRID: &str = "stats-grid";
    pub const CPU_VALUE: &str = "cpu-value";
    pub const RAM_VALUE: &str = "ram-value";
    pub const DISK_VALUE: &str = "disk-value";
    pub const NETWORK_VALUE: &str = "network-value";
    pub const CPU_PROGRESS: &str = "cpu-progress";
    pub const RAM_PROGRESS: &str = "ram-progress";
    pub const DISK_PROGRESS: &str = "disk-progress";
    pub const RAM_DETAILS: &str = "ram-details";
    pub const DISK_DETAILS: &str = "disk-details";
    pub const PACKETS_TOTAL: &str = "packets-total";
    pub const PACKETS_PASSED: &str = "packets-passed";
    pub const PACKETS_BLOCKED: &str = "packets-blocked";
    pub const MESSAGE_CONTAINER: &str = "message-container";
    pub const LOG_CONTAINER: &str = "log-container";
    pub const CONFIG_EDITOR: &str = "config-editor";
    pub const RULES_TBODY: &str = "rules-tbody";
    pub const RULE_EDITOR: &str = "rule-editor";
    pub const RULES_LIST: &str = "rules-list";
    pub const EDITOR_TITLE: &str = "editor-title";
    pub const RULE_FILENAME: &str = "rule-filename";
    pub const FILENAME_GROUP: &str = "filename-group";
    pub const JSON_EDITOR_MODAL: &str = "json-editor-modal";
    pub const RULE_JSON_EDITOR: &str = "rule-json-editor";
}

pub trait Page: Send + Sync {
    fn exists(&self, id: &str) -> bool;
    /// Contenu courant (texte ou balisage), `None` si l'élément manque
    fn text(&self, id: &str) -> Option<String>;
    fn set_text(&self, id: &str, text: &str) -> bool;
    fn set_html(&self, id: &str, html: &str) -> bool;
    /// Largeur d'une barre de progression, en pourcentage brut
    fn set_width(&self, id: &str, percent: f64) -> bool;
    fn set_visible(&self, id: &str, visible: bool) -> bool;
    fn scroll_to_bottom(&self, id: &str) -> bool;
    fn alert(&self, message: &str);
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    pub content: String,
    pub is_html: bool,
    pub width: Option<f64>,
    pub visible: bool,
    pub scrolls: usize,
}

#[derive(Default)]
struct PageState {
    elements: HashMap<String, Element>,
    alerts: Vec<String>,
}

/// Page en mémoire ; les éléments sont visibles à leur création
#[derive(Default)]
pub struct MemoryPage {
    state: Mutex<PageState>,
}

impl MemoryPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_elements(ids: &[&str]) -> Self {
        let page = Self::new();
        for id in ids {
            page.insert(id);
        }
        page
    }

    pub fn for_kind(kind: PageKind) -> Self {
        Self::with_elements(kind.elements())
    }

    pub fn insert(&self, id: &str) {
        self.state
            .lock()
            .elements
            .insert(id.to_string(), Element { visible: true, ..Element::default() });
    }

    pub fn remove(&self, id: &str) -> bool {
        self.state.lock().elements.remove(id).is_some()
    }

    pub fn element(&self, id: &str) -> Option<Element> {
        self.state.lock().elements.get(id).cloned()
    }

    pub fn width(&self, id: &str) -> Option<f64> {
        self.element(id).and_then(|e| e.width)
    }

    pub fn is_visible(&self, id: &str) -> bool {
        self.element(id).map(|e| e.visible).unwrap_or(false)
    }

    pub fn scroll_count(&self, id: &str) -> usize {
        self.element(id).map(|e| e.scrolls).unwrap_or(0)
    }

    pub fn alerts(&self) -> Vec<String> {
        self.state.lock().alerts.clone()
    }

    fn update(&self, id: &str, f: impl FnOnce(&mut Element)) -> bool {
        match self.state.lock().elements.get_mut(id) {
            Some(element) => {
                f(element);
                true
            }
            None => false,
        }
    }
}

impl Page for MemoryPage {
    fn exists(&self, id: &str) -> bool {
        self.state.lock().elements.contains_key(id)
    }

    fn text(&self, id: &str) -> Option<String> {
        self.state.lock().elements.get(id).map(|e| e.content.clone())
    }

    fn set_text(&self, id: &str, text: &str) -> bool {
        self.update(id, |e| {
            e.content = text.to_string();
            e.is_html = false;
        })
    }

    fn set_html(&self, id: &str, html: &str) -> bool {
        self.update(id, |e| {
            e.content = html.to_string();
            e.is_html = true;
        })
    }

    fn set_width(&self, id: &str, percent: f64) -> bool {
        self.update(id, |e| e.width = Some(percent))
    }

    fn set_visible(&self, id: &str, visible: bool) -> bool {
        self.update(id, |e| e.visible = visible)
    }

    fn scroll_to_bottom(&self, id: &str) -> bool {
        self.update(id, |e| e.scrolls += 1)
    }

    fn alert(&self, message: &str) {
        self.state.lock().alerts.push(message.to_string());
    }
}

/// Pages du tableau de bord GEX
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageKind {
    Dashboard,
    Logs,
    Config,
    Rules,
    RuleFiles,
}

impl PageKind {
    /// Déduit la page depuis un chemin d'URL (`/`, `/logs.html?x=1`, ...)
    pub fn from_path(path: &str) -> Option<Self> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let last = path.rsplit('/').next().unwrap_or_default();
        match last {
            "" | "index.html" => Some(PageKind::Dashboard),
            "logs.html" => Some(PageKind::Logs),
            "config.html" => Some(PageKind::Config),
            "rules.html" => Some(PageKind::Rules),
            "rule-files.html" => Some(PageKind::RuleFiles),
            _ => None,
        }
    }

    pub fn elements(self) -> &'static [&'static str] {
        use ids::*;
        match self {
            PageKind::Dashboard => &[
                STATS_GRID,
                CPU_VALUE,
                RAM_VALUE,
                DISK_VALUE,
                NETWORK_VALUE,
                CPU_PROGRESS,
                RAM_PROGRESS,
                DISK_PROGRESS,
                RAM_DETAILS,
                DISK_DETAILS,
                PACKETS_TOTAL,
                PACKETS_PASSED,
                PACKETS_BLOCKED,
                MESSAGE_CONTAINER,
            ],
            PageKind::Logs => &[LOG_CONTAINER, MESSAGE_CONTAINER],
            PageKind::Config => &[CONFIG_EDITOR, MESSAGE_CONTAINER],
            PageKind::Rules => &[RULES_TBODY, RULE_EDITOR, MESSAGE_CONTAINER],
            PageKind::RuleFiles => &[
                RULES_LIST,
                JSON_EDITOR_MODAL,
                EDITOR_TITLE,
                FILENAME_GROUP,
                RULE_FILENAME,
                RULE_JSON_EDITOR,
                MESSAGE_CONTAINER,
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_elements_are_noops() {
        let page = MemoryPage::with_elements(&[ids::CPU_VALUE]);
        assert!(page.set_text(ids::CPU_VALUE, "1.0%"));
        assert!(!page.set_text(ids::RAM_VALUE, "2.0%"));
        assert!(!page.set_width(ids::RAM_PROGRESS, 2.0));
        assert!(!page.scroll_to_bottom(ids::LOG_CONTAINER));
        assert_eq!(page.text(ids::CPU_VALUE).as_deref(), Some("1.0%"));
        assert_eq!(page.text(ids::RAM_VALUE), None);

        assert!(page.remove(ids::CPU_VALUE));
        assert!(!page.set_text(ids::CPU_VALUE, "x"));
    }

    #[test]
    fn test_element_state() {
        let page = MemoryPage::for_kind(PageKind::RuleFiles);
        assert!(page.is_visible(ids::JSON_EDITOR_MODAL));
        page.set_visible(ids::JSON_EDITOR_MODAL, false);
        assert!(!page.is_visible(ids::JSON_EDITOR_MODAL));
        page.set_html(ids::RULES_LIST, "<p>x</p>");
        assert!(page.element(ids::RULES_LIST).unwrap().is_html);
        page.alert("boom");
        assert_eq!(page.alerts(), vec!["boom".to_string()]);
    }

    #[test]
    fn test_page_routing() {
        assert_eq!(PageKind::from_path("/"), Some(PageKind::Dashboard));
        assert_eq!(PageKind::from_path("/index.html"), Some(PageKind::Dashboard));
        assert_eq!(PageKind::from_path("logs.html"), Some(PageKind::Logs));
        assert_eq!(PageKind::from_path("/static/config.html?tab=1"), Some(PageKind::Config));
        assert_eq!(PageKind::from_path("/rules.html#top"), Some(PageKind::Rules));
        assert_eq!(PageKind::from_path("/rule-files.html"), Some(PageKind::RuleFiles));
        assert_eq!(PageKind::from_path("/about.html"), None);
    }
}
