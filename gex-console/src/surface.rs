//! Surfaces d'édition : zone de texte brute ou éditeur de code attaché à
//! un élément de la page.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::json::{PLAIN_INDENT, RICH_INDENT};
use crate::page::Page;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SurfaceKind {
    #[default]
    Plain,
    Rich,
}

pub trait EditorSurface: Send {
    fn kind(&self) -> SurfaceKind;
    /// Indentation utilisée pour afficher un document JSON
    fn indent(&self) -> usize;
    fn text(&self) -> String;
    fn set_text(&mut self, text: &str);
    /// Libère la surface ; elle ignore ensuite toute écriture
    fn dispose(&mut self);
    fn is_disposed(&self) -> bool;
}

/// Attache une surface du type demandé à l'élément `element`
pub fn attach(kind: SurfaceKind, page: Arc<dyn Page>, element: &str) -> Box<dyn EditorSurface> {
    let plain = PlainSurface::new(page, element);
    match kind {
        SurfaceKind::Plain => Box::new(plain),
        SurfaceKind::Rich => Box::new(RichSurface::attach(plain, RichOptions::default())),
    }
}

/// Lit et écrit directement la valeur de l'élément
pub struct PlainSurface {
    page: Arc<dyn Page>,
    element: String,
    disposed: bool,
}

impl PlainSurface {
    pub fn new(page: Arc<dyn Page>, element: &str) -> Self {
        Self { page, element: element.to_string(), disposed: false }
    }

    pub fn element(&self) -> &str {
        &self.element
    }
}

impl EditorSurface for PlainSurface {
    fn kind(&self) -> SurfaceKind {
        SurfaceKind::Plain
    }

    fn indent(&self) -> usize {
        PLAIN_INDENT
    }

    fn text(&self) -> String {
        self.page.text(&self.element).unwrap_or_default()
    }

    fn set_text(&mut self, text: &str) {
        if !self.disposed {
            self.page.set_text(&self.element, text);
        }
    }

    fn dispose(&mut self) {
        self.disposed = true;
    }

    fn is_disposed(&self) -> bool {
        self.disposed
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RichOptions {
    pub indent_unit: usize,
    pub line_numbers: bool,
    pub match_brackets: bool,
    pub auto_close_brackets: bool,
    pub fold_gutter: bool,
}

impl Default for RichOptions {
    fn default() -> Self {
        Self {
            indent_unit: RICH_INDENT,
            line_numbers: true,
            match_brackets: true,
            auto_close_brackets: true,
            fold_gutter: true,
        }
    }
}

/// Éditeur de code greffé sur l'élément : le texte vit dans un tampon
/// tant que la surface est attachée et revient dans l'élément au `dispose`.
pub struct RichSurface {
    backing: PlainSurface,
    options: RichOptions,
    buffer: String,
}

impl RichSurface {
    pub fn attach(backing: PlainSurface, options: RichOptions) -> Self {
        let buffer = backing.text();
        Self { backing, options, buffer }
    }

    pub fn options(&self) -> &RichOptions {
        &self.options
    }

    pub fn line_count(&self) -> usize {
        self.buffer.lines().count().max(1)
    }
}

impl EditorSurface for RichSurface {
    fn kind(&self) -> SurfaceKind {
        SurfaceKind::Rich
    }

    fn indent(&self) -> usize {
        self.options.indent_unit
    }

    fn text(&self) -> String {
        self.buffer.clone()
    }

    fn set_text(&mut self, text: &str) {
        if !self.backing.is_disposed() {
            self.buffer = text.to_string();
        }
    }

    fn dispose(&mut self) {
        if self.backing.is_disposed() {
            return;
        }
        let text = std::mem::take(&mut self.buffer);
        self.backing.set_text(&text);
        self.backing.dispose();
    }

    fn is_disposed(&self) -> bool {
        self.backing.is_disposed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{ids, MemoryPage};

    fn page() -> Arc<MemoryPage> {
        Arc::new(MemoryPage::with_elements(&[ids::CONFIG_EDITOR]))
    }

    #[test]
    fn test_plain_surface_writes_through() {
        let page = page();
        let mut surface = attach(SurfaceKind::Plain, page.clone(), ids::CONFIG_EDITOR);
        surface.set_text("{}");
        assert_eq!(page.text(ids::CONFIG_EDITOR).as_deref(), Some("{}"));
        assert_eq!(surface.indent(), 4);

        surface.dispose();
        surface.set_text("ignored");
        assert!(surface.is_disposed());
        assert_eq!(page.text(ids::CONFIG_EDITOR).as_deref(), Some("{}"));
    }

    #[test]
    fn test_rich_surface_buffers_until_dispose() {
        let page = page();
        page.set_text(ids::CONFIG_EDITOR, "initial");
        let mut surface = attach(SurfaceKind::Rich, page.clone(), ids::CONFIG_EDITOR);
        assert_eq!(surface.kind(), SurfaceKind::Rich);
        assert_eq!(surface.indent(), 2);
        assert_eq!(surface.text(), "initial");

        surface.set_text("{\n  \"a\": 1\n}");
        assert_eq!(page.text(ids::CONFIG_EDITOR).as_deref(), Some("initial"));

        surface.dispose();
        assert_eq!(page.text(ids::CONFIG_EDITOR).as_deref(), Some("{\n  \"a\": 1\n}"));
        assert!(surface.is_disposed());
        assert_eq!(surface.text(), "");
    }

    #[test]
    fn test_rich_defaults() {
        let surface = RichSurface::attach(PlainSurface::new(page(), ids::CONFIG_EDITOR), RichOptions::default());
        assert_eq!(surface.options().indent_unit, 2);
        assert!(surface.options().line_numbers);
        assert_eq!(surface.line_count(), 1);
    }
}
