#![allow(dead_code)]

use reflow_core::{
    Document, DocumentId, DocumentMut, EditOrigin, Host, Region, SessionRegistry, TextBuffer,
};
use reflow_core_lang::LanguagePreset;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

/// The C++ program the comment scenarios edit.
pub const FIBONACCI_CPP: &str = concat!(
    "#include <iostream>\n",
    "\n",
    "using namespace std;\n",
    "\n",
    "/**\n",
    " * The \"fibonacci\" function returns the nth number in the\n",
    " * Fibonacci sequence.\n",
    " */\n",
    "int fibonacci(int n) {\n",
    "    // Base case\n",
    "    if (n == 0) {\n",
    "        return 0;\n",
    "    }\n",
    "\n",
    "    // Iterative implementation of \"fibonacci\"\n",
    "    int cur = 1;\n",
    "    int prev = 0;\n",
    "    for (int i = 1; i < n; i++) {\n",
    "        int next = cur + prev;\n",
    "        prev = cur;\n",
    "        cur = next;\n",
    "    }\n",
    "    return cur;\n",
    "}\n",
    "\n",
    "int main() {\n",
    "    cout << \"The 8th Fibonacci number is \" <<\n",
    "        fibonacci(8) << \"\\n\";\n",
    "    return 0;\n",
    "}\n",
);

pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("reflow_core=debug")),
        )
        .with_test_writer()
        .try_init();
}

/// Drives a [`TextBuffer`] the way an editor would: one keystroke at a time, each followed by
/// the modification and selection events.
pub struct Editor {
    pub doc: TextBuffer,
    pub registry: SessionRegistry,
    pub id: DocumentId,
}

impl Editor {
    pub fn plain(text: &str) -> Self {
        Self::open(TextBuffer::new(text))
    }

    pub fn c(text: &str) -> Self {
        Self::open(TextBuffer::with_preset(text, &LanguagePreset::c_family()))
    }

    pub fn open(doc: TextBuffer) -> Self {
        init_logging();
        let mut editor = Self {
            doc,
            registry: SessionRegistry::new(),
            id: DocumentId::new(1),
        };
        editor.selection_modified();
        editor
    }

    pub fn set(&mut self, name: &str, value: impl Into<Value>) {
        self.doc.settings_mut().set(name, value);
        self.registry.on_setting_changed(self.id, &mut self.doc, name);
    }

    pub fn text(&self) -> String {
        self.doc.text()
    }

    pub fn cursor(&self) -> usize {
        self.doc.cursor().expect("single cursor")
    }

    /// Char offset of the first occurrence of `needle`.
    pub fn find(&self, needle: &str) -> usize {
        let text = self.text();
        let byte = text.find(needle).unwrap_or_else(|| panic!("{needle:?} not found"));
        text[..byte].chars().count()
    }

    /// Char offset just past the first occurrence of `needle`.
    pub fn find_end(&self, needle: &str) -> usize {
        self.find(needle) + needle.chars().count()
    }

    /// `len` chars of text starting at `point`.
    pub fn slice(&self, point: usize, len: usize) -> String {
        self.doc.substr(Region::new(point, point + len))
    }

    pub fn move_to(&mut self, point: usize) {
        self.doc.set_cursor(point);
        self.selection_modified();
    }

    /// Type `text` at `point`. A newline copies the current line's indentation.
    pub fn type_at(&mut self, point: usize, text: &str) {
        self.move_to(point);
        for ch in text.chars() {
            let cursor = self.cursor();
            let typed = if ch == '\n' {
                let line = self.doc.line_region(cursor);
                let before = self.doc.substr(Region::new(line.start, cursor));
                let indent: String = before.chars().take_while(|c| c.is_whitespace()).collect();
                format!("\n{indent}")
            } else {
                ch.to_string()
            };
            self.doc.insert(cursor, &typed);
            self.modified();
        }
    }

    /// Press backspace until the cursor, starting at `end`, reaches `start`.
    pub fn backspace(&mut self, start: usize, end: usize) {
        self.move_to(end);
        while self.cursor() > start {
            let cursor = self.cursor();
            self.doc.erase(Region::new(cursor - 1, cursor));
            self.modified();
        }
    }

    /// Press delete `count` times at `point`.
    pub fn delete(&mut self, point: usize, count: usize) {
        self.move_to(point);
        for _ in 0..count {
            let cursor = self.cursor();
            self.doc.erase(Region::new(cursor, cursor + 1));
            self.modified();
        }
    }

    pub fn extend_section(&mut self) {
        assert!(self.registry.extend_section(self.id, &mut self.doc));
        self.selection_modified();
    }

    pub fn toggle(&mut self) -> &'static str {
        self.registry.toggle_disabled(self.id, &mut self.doc)
    }

    fn modified(&mut self) {
        self.registry
            .on_modified(self.id, &mut self.doc, EditOrigin::Typed);
        self.selection_modified();
    }

    fn selection_modified(&mut self) {
        self.registry.on_selection_modified(self.id, &mut self.doc);
    }
}
