use reflow_core::{
    Document, DocumentId, DocumentMut, EditOrigin, Host, SessionRegistry, TextBuffer,
};
use reflow_core_lang::LanguagePreset;

fn main() {
    let mut doc = TextBuffer::with_preset("int x;\n\n", &LanguagePreset::c_family());
    doc.settings_mut().set("wrap_width", 40);

    let mut registry = SessionRegistry::new();
    let id = DocumentId::new(1);
    registry.on_setting_changed(id, &mut doc, "wrap_width");

    // Type a long line comment one key at a time.
    let typed = "// Reflow keeps this comment within forty columns while it is being typed.";
    let mut cursor = doc.text().chars().count();
    doc.set_cursor(cursor);
    registry.on_selection_modified(id, &mut doc);
    for ch in typed.chars() {
        doc.insert(cursor, &ch.to_string());
        registry.on_modified(id, &mut doc, EditOrigin::Typed);
        registry.on_selection_modified(id, &mut doc);
        cursor = doc.cursor().unwrap_or(cursor);
    }

    println!("{}", doc.text());
    assert!(doc.text().lines().all(|line| line.chars().count() <= 40));
}
