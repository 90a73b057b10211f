mod common;

use common::Editor;
use pretty_assertions::assert_eq;
use reflow_core::{
    DISABLED_STATUS, Document, ENABLED_STATUS, EXPLICIT_LINE_BREAK_TAG, EditOrigin, Host,
    SETTINGS_ERROR_NOTICE,
};
use serde_json::json;

const DOC_COMMENT: &str = concat!(
    "/**\n",
    " * The \"fibonacci\" function returns the nth number in the\n",
    " * Fibonacci sequence. The Fibonacci sequence begins with 0\n",
    " * as the 0th number and 1 as the first number. Every\n",
    " * subsequent number is equal to the sum of the two previous\n",
    " * numbers.\n",
    " */\n",
    "int fibonacci(int n);\n",
);

#[test]
fn test_extend_section_in_block_comment() {
    let mut editor = Editor::c(DOC_COMMENT);
    editor.set("rulers", json!([60]));
    editor.set("reflow_enter_extends_section", true);
    assert!(editor.registry.get(editor.id).unwrap().config().enter_extends_section);

    let point = editor.find_end("Fibonacci sequence.");
    editor.delete(point, 1);
    editor.move_to(point);
    editor.extend_section();
    editor.extend_section();

    let expected = concat!(
        "/**\n",
        " * The \"fibonacci\" function returns the nth number in the\n",
        " * Fibonacci sequence.\n",
        " *\n",
        " * The Fibonacci sequence begins with 0 as the 0th number\n",
        " * and 1 as the first number. Every subsequent number is\n",
        " * equal to the sum of the two previous numbers.\n",
        " */\n",
    );
    assert_eq!(editor.slice(0, expected.len()), expected);
    assert_eq!(editor.cursor(), editor.find("The Fibonacci sequence begins"));
}

#[test]
fn test_extend_section_keeps_whitespace_when_not_trimming() {
    let mut editor = Editor::c(DOC_COMMENT);
    editor.set("rulers", json!([60]));
    editor.set("trim_automatic_white_space", false);

    let point = editor.find_end("Fibonacci sequence.");
    editor.delete(point, 1);
    editor.move_to(point);
    editor.extend_section();
    editor.extend_section();

    let expected = concat!(
        " * Fibonacci sequence.\n",
        " * \n",
        " * The Fibonacci sequence begins with 0 as the 0th number\n",
    );
    let start = editor.find(" * Fibonacci sequence.");
    assert_eq!(editor.slice(start, expected.len()), expected);
}

#[test]
fn test_extend_section_outside_sections_keeps_indent() {
    let mut editor = Editor::c("int main() {\n    return 0;\n}\n");
    let point = editor.find_end("return");
    editor.move_to(point);
    editor.extend_section();
    assert_eq!(editor.text(), "int main() {\n    return\n     0;\n}\n");
}

#[test]
fn test_extend_section_in_line_comment() {
    let mut editor = Editor::c("    // alpha beta\nint x;\n");
    let point = editor.find_end("alpha");
    editor.move_to(point);
    editor.extend_section();
    assert_eq!(editor.text(), "    // alpha\n    //  beta\nint x;\n");
    assert_eq!(editor.cursor(), editor.find("//  beta") + 3);
}

#[test]
fn test_moving_the_cursor_forgets_the_typed_line_break() {
    let mut editor = Editor::plain("");
    editor.set(
        "reflow_sections",
        json!([{"selector": "text.plain", "wrap_width": 40}]),
    );
    editor.type_at(0, "one\ntwo");
    assert_eq!(editor.text(), "one\ntwo");
    assert_eq!(editor.doc.tagged_regions(EXPLICIT_LINE_BREAK_TAG).len(), 1);

    // Coming back to the second line later joins it as usual.
    editor.move_to(0);
    assert!(editor.doc.tagged_regions(EXPLICIT_LINE_BREAK_TAG).is_empty());
    editor.type_at(7, "s");
    assert_eq!(editor.text(), "one twos");
}

#[test]
fn test_toggle_disabled() {
    let mut editor = Editor::plain("");
    editor.set(
        "reflow_sections",
        json!([{"selector": "text.plain", "wrap_width": 10}]),
    );

    assert_eq!(editor.toggle(), DISABLED_STATUS);
    assert_eq!(editor.doc.settings().get("reflow_disabled"), Some(&json!(true)));
    editor.type_at(0, "aaaa bbbb cccc");
    assert_eq!(editor.text(), "aaaa bbbb cccc");

    assert_eq!(editor.toggle(), ENABLED_STATUS);
    assert!(!editor.doc.settings().contains("reflow_disabled"));
    editor.type_at(14, "c");
    assert_eq!(editor.text(), "aaaa bbbb\nccccc");
}

#[test]
fn test_undo_and_line_moves_are_left_alone() {
    let mut editor = Editor::plain("aaaa bbbb cccc");
    editor.set(
        "reflow_sections",
        json!([{"selector": "text.plain", "wrap_width": 10}]),
    );
    editor.move_to(14);
    let id = editor.id;
    for origin in [EditOrigin::UndoRedo, EditOrigin::LineMove] {
        assert_eq!(editor.registry.on_modified(id, &mut editor.doc, origin), 0);
    }
    assert_eq!(editor.text(), "aaaa bbbb cccc");

    assert_eq!(editor.registry.fixup_now(id, &mut editor.doc), 1);
    assert_eq!(editor.text(), "aaaa bbbb\ncccc");
}

#[test]
fn test_invalid_settings_notice() {
    let mut editor = Editor::plain("aaaa bbbb cccc");
    editor.set("reflow_sections", json!([{"selector": 7}]));
    assert_eq!(editor.registry.take_notice(editor.id), Some(SETTINGS_ERROR_NOTICE));
    assert_eq!(editor.registry.take_notice(editor.id), None);

    // The broken setting falls back to no sections at all.
    editor.type_at(14, " dddd");
    assert_eq!(editor.text(), "aaaa bbbb cccc dddd");

    editor.set(
        "reflow_sections",
        json!([{"selector": "text.plain", "wrap_width": 10}]),
    );
    assert_eq!(editor.registry.take_notice(editor.id), None);
    editor.type_at(19, "d");
    assert_eq!(editor.text(), "aaaa bbbb\ncccc ddddd");
}

#[test]
fn test_closing_drops_the_session() {
    let mut editor = Editor::plain("");
    assert_eq!(editor.registry.len(), 1);
    assert!(editor.registry.on_close(editor.id));
    assert!(editor.registry.is_empty());
}
