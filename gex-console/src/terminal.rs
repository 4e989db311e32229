//! Front-end terminal : une `Page` en mémoire qui recopie sur la sortie
//! les mises à jour utiles (métriques, compteurs, logs, messages, alertes).

use parking_lot::Mutex;
use std::io::{self, Write};

use crate::locale::Labels;
use crate::models::Rule;
use crate::page::{ids, MemoryPage, Page, PageKind};
use crate::render;

pub struct TerminalPage {
    page: MemoryPage,
    out: Mutex<Box<dyn Write + Send>>,
}

impl TerminalPage {
    pub fn new(kinds: &[PageKind]) -> Self {
        Self::with_writer(kinds, Box::new(io::stdout()))
    }

    pub fn with_writer(kinds: &[PageKind], out: Box<dyn Write + Send>) -> Self {
        let page = MemoryPage::new();
        for kind in kinds {
            for id in kind.elements() {
                page.insert(id);
            }
        }
        Self { page, out: Mutex::new(out) }
    }

    fn print(&self, line: &str) {
        let mut out = self.out.lock();
        let _ = writeln!(out, "{line}");
        let _ = out.flush();
    }

    fn value(&self, id: &str) -> String {
        self.page.text(id).unwrap_or_default()
    }
}

impl Page for TerminalPage {
    fn exists(&self, id: &str) -> bool {
        self.page.exists(id)
    }

    fn text(&self, id: &str) -> Option<String> {
        self.page.text(id)
    }

    fn set_text(&self, id: &str, text: &str) -> bool {
        let previous = self.page.text(id);
        if !self.page.set_text(id, text) {
            return false;
        }
        match id {
            ids::NETWORK_VALUE => self.print(&format!(
                "CPU {} | RAM {} | Disk {} | Net {}",
                self.value(ids::CPU_VALUE),
                self.value(ids::RAM_VALUE),
                self.value(ids::DISK_VALUE),
                text
            )),
            ids::PACKETS_BLOCKED => self.print(&format!(
                "Packets total {} | passed {} | blocked {}",
                self.value(ids::PACKETS_TOTAL),
                self.value(ids::PACKETS_PASSED),
                text
            )),
            ids::LOG_CONTAINER => {
                let fresh = new_suffix(previous.as_deref().unwrap_or_default(), text);
                if !fresh.is_empty() {
                    self.print(fresh);
                }
            }
            _ => {}
        }
        true
    }

    fn set_html(&self, id: &str, html: &str) -> bool {
        if !self.page.set_html(id, html) {
            return false;
        }
        if id == ids::MESSAGE_CONTAINER && !html.is_empty() {
            self.print(&plain_text(html));
        }
        true
    }

    fn set_width(&self, id: &str, percent: f64) -> bool {
        self.page.set_width(id, percent)
    }

    fn set_visible(&self, id: &str, visible: bool) -> bool {
        self.page.set_visible(id, visible)
    }

    fn scroll_to_bottom(&self, id: &str) -> bool {
        self.page.scroll_to_bottom(id)
    }

    fn alert(&self, message: &str) {
        self.page.alert(message);
        self.print(&format!("⚠️  {message}"));
    }
}

/// Partie ajoutée à la fin du texte, ou tout le texte s'il a été remplacé
fn new_suffix<'a>(previous: &str, current: &'a str) -> &'a str {
    match current.strip_prefix(previous) {
        Some(rest) if !previous.is_empty() => rest.trim_start_matches('\n'),
        _ => current,
    }
}

/// Retire les balises et décode les entités produites par `render::escape_html`
pub fn plain_text(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Ligne de tableau texte pour `rules list`
pub fn rule_line(rule: &Rule, labels: &Labels) -> String {
    let action = if rule.action.is_allow() { labels.allow } else { labels.block };
    let state = if rule.enabled { labels.enabled } else { labels.disabled };
    format!(
        "{:<20} {:<24} {:<12} {:<5} {:<22} {:<22} {}",
        rule.id,
        rule.name,
        action,
        rule.protocol.to_uppercase(),
        render::endpoint(&rule.source_ip, rule.source_port, labels),
        render::endpoint(&rule.dest_ip, rule.dest_port, labels),
        state
    )
}
