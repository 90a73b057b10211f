mod common;

use common::Editor;
use pretty_assertions::assert_eq;
use reflow_core::{
    DocumentMut, FixupSession, Host, SettingsParser, TextBuffer, fixup, width::str_width,
};
use serde_json::json;

fn plain(text: &str, width: usize) -> Editor {
    let mut editor = Editor::plain(text);
    editor.set(
        "reflow_sections",
        json!([{"selector": "text.plain", "wrap_width": width}]),
    );
    editor
}

/// Run one fixup with `settings` at `cursor` and return the text.
fn fixed(text: &str, cursor: usize, settings: serde_json::Value) -> String {
    let mut doc = TextBuffer::new(text);
    *doc.settings_mut() = serde_json::from_value(settings).unwrap();
    doc.set_cursor(cursor);
    let config = SettingsParser::new(doc.settings()).config().clone();
    fixup(&mut doc, config);
    doc.text()
}

#[test]
fn test_wrap_entire_document() {
    let mut editor = Editor::plain("");
    editor.set("reflow_sections", json!([{"selector": "source | text"}]));
    editor.set("rulers", json!([60]));

    editor.type_at(
        0,
        concat!(
            "Lorem ipsum dolor sit amet, iudicabit interpretaris ius eu, et ",
            "sit iudico aperiri scaevola. Ad solum eleifend sea, ex ius ",
            "graeci alienum accusamus, diam mandamus expetenda quo ei.\n",
        ),
    );
    assert_eq!(
        editor.text(),
        concat!(
            "Lorem ipsum dolor sit amet, iudicabit interpretaris ius eu,\n",
            "et sit iudico aperiri scaevola. Ad solum eleifend sea, ex\n",
            "ius graeci alienum accusamus, diam mandamus expetenda quo\n",
            "ei.\n",
        )
    );

    let point = editor.find_end("aperiri scaevola.");
    editor.type_at(
        point,
        concat!(
            " Vim case eros choro et, te deserunt iudicabit assentior eum, id ",
            "his assum nobis primis.",
        ),
    );
    assert_eq!(
        editor.text(),
        concat!(
            "Lorem ipsum dolor sit amet, iudicabit interpretaris ius eu,\n",
            "et sit iudico aperiri scaevola. Vim case eros choro et, te\n",
            "deserunt iudicabit assentior eum, id his assum nobis primis.\n",
            "Ad solum eleifend sea, ex ius graeci alienum accusamus, diam\n",
            "mandamus expetenda quo ei.\n",
        )
    );
}

#[test]
fn test_lines_never_exceed_width() {
    let mut editor = plain("", 24);
    editor.type_at(
        0,
        "the quick brown fox jumps over the lazy dog and keeps running far away",
    );
    let text = editor.text();
    assert!(text.lines().count() > 1);
    for line in text.lines() {
        assert!(str_width(line, 4) <= 24, "{line:?}");
    }

    // Another fixup finds nothing to do.
    let config = editor
        .registry
        .get(editor.id)
        .unwrap()
        .config()
        .clone();
    assert_eq!(fixup(&mut editor.doc, config), 0);
}

#[test]
fn test_wide_characters_count_double() {
    let text = "漢字 漢字 漢字 漢字";
    let out = fixed(
        text,
        text.chars().count(),
        json!({"reflow_sections": [{"selector": "text.plain", "wrap_width": 10}]}),
    );
    assert_eq!(out, "漢字 漢字\n漢字 漢字");
}

#[test]
fn test_passive_mode_only_joins_at_cursor() {
    let sections = json!([{"selector": "text.plain", "wrap_width": 8}]);
    let text = "aaa bbb ccc\nddd";

    let active = fixed(text, 3, json!({"reflow_sections": sections}));
    assert_eq!(active, "aaa bbb\nccc ddd");

    let passive = fixed(
        text,
        3,
        json!({"reflow_sections": sections, "reflow_passive": true}),
    );
    assert_eq!(passive, "aaa bbb\nccc\nddd");
}

#[test]
fn test_paragraph_indent() {
    let settings = json!({
        "reflow_sections": [{"selector": "text.plain", "wrap_width": 20}],
        "reflow_paragraphs": [{"first_line_regex": "^- ", "indent": "  "}],
    });
    let text = "- alpha beta gamma delta";
    assert_eq!(
        fixed(text, text.len(), settings.clone()),
        "- alpha beta gamma\n  delta"
    );

    assert_eq!(fixed("- alpha\n  beta", 3, settings.clone()), "- alpha beta");
    // A new bullet starts a new paragraph.
    assert_eq!(fixed("- alpha\n- beta", 3, settings), "- alpha\n- beta");
}

#[test]
fn test_single_line_paragraphs() {
    let sections = json!([{"selector": "text.plain", "wrap_width": 40}]);
    let text = "intro\n>>> 1 + 1\n2";

    assert_eq!(
        fixed(text, 2, json!({"reflow_sections": sections})),
        "intro >>> 1 + 1 2"
    );

    let settings = json!({
        "reflow_sections": sections,
        "reflow_paragraphs": [{"first_line_regex": "^>>>( |$)", "single_line": true}],
    });
    assert_eq!(fixed(text, 2, settings.clone()), text);
    assert_eq!(fixed(text, 8, settings), text);
}

#[test]
fn test_space_between_words() {
    let settings = json!({
        "reflow_sections": [{"selector": "text.plain", "wrap_width": 40}],
        "reflow_space_between_words": [{"first_word_regex": "[.?!]$", "space": "  "}],
    });
    assert_eq!(fixed("End.\nNext", 1, settings.clone()), "End.  Next");
    assert_eq!(fixed("One\ntwo", 1, settings), "One two");
}

#[test]
fn test_disabled_session_leaves_text_alone() {
    let mut doc = TextBuffer::new("aaa bbb ccc ddd");
    *doc.settings_mut() = serde_json::from_value(json!({
        "reflow_sections": [{"selector": "text.plain", "wrap_width": 8}],
        "reflow_disabled": true,
    }))
    .unwrap();
    doc.set_cursor(15);
    let mut session = FixupSession::new(doc.settings());
    assert!(!session.has_pending_edit(&doc));
    assert_eq!(session.apply_all(&mut doc), 0);
    assert_eq!(doc.text(), "aaa bbb ccc ddd");
}
