use scraper::{ElementRef, Html, Node};

use crate::normalize::clean_line;

const SKIPPED_ELEMENTS: &[&str] = &["head", "script", "style", "noscript", "template"];

const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "body", "br", "caption", "center", "dd", "div",
    "dl", "dt", "fieldset", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr",
    "li", "main", "nav", "ol", "p", "pre", "section", "table", "tbody", "tfoot", "thead", "tr",
    "ul",
];

const CELL_ELEMENTS: &[&str] = &["td", "th"];

/// Flattens a page into its visible text lines, in document order: block
/// elements and table rows break lines, table cells are space separated.
pub fn render_lines(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut renderer = LineRenderer::default();
    renderer.walk(document.root_element());
    renderer.finish()
}

#[derive(Default)]
struct LineRenderer {
    current: String,
    lines: Vec<String>,
}

impl LineRenderer {
    fn walk(&mut self, element: ElementRef<'_>) {
        let name = element.value().name();
        if SKIPPED_ELEMENTS.contains(&name) {
            return;
        }
        let is_block = BLOCK_ELEMENTS.contains(&name);
        if is_block {
            self.flush();
        }
        for child in element.children() {
            match child.value() {
                Node::Text(text) => self.current.push_str(text),
                Node::Element(_) => {
                    if let Some(child_element) = ElementRef::wrap(child) {
                        self.walk(child_element);
                    }
                }
                _ => {}
            }
        }
        if CELL_ELEMENTS.contains(&name) {
            self.current.push(' ');
        }
        if is_block {
            self.flush();
        }
    }

    fn flush(&mut self) {
        let line = clean_line(&self.current);
        self.current.clear();
        if !line.is_empty() {
            self.lines.push(line);
        }
    }

    fn finish(mut self) -> Vec<String> {
        self.flush();
        self.lines
    }
}
