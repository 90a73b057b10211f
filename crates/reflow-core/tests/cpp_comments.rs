mod common;

use common::{Editor, FIBONACCI_CPP};
use pretty_assertions::assert_eq;

fn cpp_with_ruler() -> Editor {
    let mut editor = Editor::c(FIBONACCI_CPP);
    editor.set("rulers", serde_json::json!([60]));
    editor
}

#[test]
fn test_block_comment_typing_and_backspace() {
    let mut editor = cpp_with_ruler();
    let comment_start = editor.find("/**");

    let point = editor.find_end("Fibonacci sequence.");
    editor.type_at(point, "  The function assumes that n >= 0.");
    let expected = concat!(
        "/**\n",
        " * The \"fibonacci\" function returns the nth number in the\n",
        " * Fibonacci sequence.  The function assumes that n >= 0.\n",
        " */\n",
    );
    assert_eq!(editor.slice(comment_start, expected.len()), expected);

    let point = editor.find("The function assumes") - 1;
    editor.type_at(
        point,
        concat!(
            "The Fibonacci sequence begins with 0 as the 0th number and 1 as ",
            "the first number. Every subsequent number is equal to the sum ",
            "of the two previous numbers.",
        ),
    );
    let expected = concat!(
        "/**\n",
        " * The \"fibonacci\" function returns the nth number in the\n",
        " * Fibonacci sequence. The Fibonacci sequence begins with 0\n",
        " * as the 0th number and 1 as the first number. Every\n",
        " * subsequent number is equal to the sum of the two previous\n",
        " * numbers. The function assumes that n >= 0.\n",
        " */\n",
    );
    assert_eq!(editor.slice(comment_start, expected.len()), expected);

    let start = editor.find("The function assumes") - 1;
    editor.backspace(start, start + 34);
    let expected = concat!(
        "/**\n",
        " * The \"fibonacci\" function returns the nth number in the\n",
        " * Fibonacci sequence. The Fibonacci sequence begins with 0\n",
        " * as the 0th number and 1 as the first number. Every\n",
        " * subsequent number is equal to the sum of the two previous\n",
        " * numbers.\n",
        " */\n",
    );
    assert_eq!(editor.slice(comment_start, expected.len()), expected);
}

#[test]
fn test_line_comments_and_paragraphs() {
    let mut editor = Editor::c(FIBONACCI_CPP);
    editor.set("wrap_width", 60);
    editor.set("rulers", serde_json::json!([80]));
    let comment_start = editor.find("// Iterative") - 4;

    let point = editor.find_end("implementation of \"fibonacci\"");
    editor.type_at(
        point,
        concat!(
            ". We maintain two variables: \"cur\", the value of the current ",
            "number in the sequence, and \"prev\", the value of the previous ",
            "number.",
        ),
    );
    let expected = concat!(
        "    // Iterative implementation of \"fibonacci\". We maintain\n",
        "    // two variables: \"cur\", the value of the current number\n",
        "    // in the sequence, and \"prev\", the value of the\n",
        "    // previous number.\n",
        "    int cur = 1;\n",
    );
    assert_eq!(editor.slice(comment_start, expected.len()), expected);

    let point = editor.find_end("previous number.");
    editor.type_at(
        point,
        concat!(
            " Here's what happens at each iteration:\n",
            "//     - The variable \"cur\" gets set to be the value of prev + cur.\n",
            "//\n",
            "//     - The variable \"prev\" gets set to be the old value of ",
            "\"cur\" - the value at the beginning of the iteration.",
        ),
    );
    let expected = concat!(
        "    // Iterative implementation of \"fibonacci\". We maintain\n",
        "    // two variables: \"cur\", the value of the current number\n",
        "    // in the sequence, and \"prev\", the value of the\n",
        "    // previous number. Here's what happens at each\n",
        "    // iteration:\n",
        "    //     - The variable \"cur\" gets set to be the value of\n",
        "    //     prev + cur.\n",
        "    //\n",
        "    //     - The variable \"prev\" gets set to be the old\n",
        "    //     value of \"cur\" - the value at the beginning of\n",
        "    //     the iteration.\n",
        "    int cur = 1;\n",
    );
    assert_eq!(editor.slice(comment_start, expected.len()), expected);
}

#[test]
fn test_trailing_comment_after_code_is_not_wrapped() {
    let mut editor = cpp_with_ruler();
    let line_start = editor.find("int next =") - 8;
    editor.type_at(
        line_start + 30,
        concat!(
            "  // In order to make sure that we use the correct value of ",
            "\"prev\" in the addition, we must create a temporary value \"next\" ",
            "to store the result of the addition, before setting \"prev\" to be ",
            "\"cur\".",
        ),
    );
    let expected = concat!(
        "        int next = cur + prev;  // In order to make sure that we ",
        "use the correct value of \"prev\" in the addition, we must create ",
        "a temporary value \"next\" to store the result of the addition, ",
        "before setting \"prev\" to be \"cur\".\n",
        "        prev = cur;\n",
    );
    assert_eq!(editor.slice(line_start, expected.len()), expected);
}

#[test]
fn test_typed_line_breaks_are_kept() {
    let mut editor = cpp_with_ruler();
    let comment_start = editor.find("/**");

    let point = editor.find_end("Fibonacci sequence.");
    editor.type_at(
        point,
        concat!(
            " The Fibonacci sequence begins with 0 as the 0th number and 1 as ",
            "the first number.\n",
            "* Every subsequent number is equal to the sum ",
            "of the two previous numbers.\n",
            "* The function assumes that n >= 0.",
        ),
    );
    let expected = concat!(
        "/**\n",
        " * The \"fibonacci\" function returns the nth number in the\n",
        " * Fibonacci sequence. The Fibonacci sequence begins with 0\n",
        " * as the 0th number and 1 as the first number.\n",
        " * Every subsequent number is equal to the sum of the two\n",
        " * previous numbers.\n",
        " * The function assumes that n >= 0.\n",
        " */\n",
    );
    assert_eq!(editor.slice(comment_start, expected.len()), expected);
}

#[test]
fn test_block_comment_at_end_of_document() {
    let mut editor = Editor::c("#include <iostream>\n\nusing namespace std;\n\n");
    editor.set("rulers", serde_json::json!([60]));
    let comment_start = editor.text().chars().count();

    editor.type_at(
        comment_start,
        concat!(
            "/**\n",
            " * Lorem ipsum dolor sit amet, iudicabit interpretaris ius eu, ",
            "et sit iudico aperiri scaevola. Ad solum eleifend sea, ex ius ",
            "graeci alienum accusamus, diam mandamus expetenda quo ei.",
        ),
    );
    let expected = concat!(
        "/**\n",
        " * Lorem ipsum dolor sit amet, iudicabit interpretaris ius\n",
        " * eu, et sit iudico aperiri scaevola. Ad solum eleifend\n",
        " * sea, ex ius graeci alienum accusamus, diam mandamus\n",
        " * expetenda quo ei.",
    );
    assert_eq!(editor.slice(comment_start, 1000), expected);
}

#[test]
fn test_passive_mode_keeps_users_line_breaks() {
    let mut editor = cpp_with_ruler();
    editor.set("reflow_passive", true);
    let comment_start = editor.find("/**");

    let point = editor.find_end("Fibonacci sequence.");
    editor.type_at(point, "  The function assumes that n >= 0.");
    let expected = concat!(
        "/**\n",
        " * The \"fibonacci\" function returns the nth number in the\n",
        " * Fibonacci sequence.  The function assumes that n >= 0.\n",
        " */\n",
    );
    assert_eq!(editor.slice(comment_start, expected.len()), expected);

    // Text pushed onto lines reflow split itself is joined back as typing continues.
    let point = editor.find("The function assumes") - 1;
    editor.type_at(
        point,
        concat!(
            "The Fibonacci sequence begins with 0 as the 0th number and 1 as ",
            "the first number. Every subsequent number is equal to the sum ",
            "of the two previous numbers.",
        ),
    );
    let expected = concat!(
        "/**\n",
        " * The \"fibonacci\" function returns the nth number in the\n",
        " * Fibonacci sequence. The Fibonacci sequence begins with 0\n",
        " * as the 0th number and 1 as the first number. Every\n",
        " * subsequent number is equal to the sum of the two previous\n",
        " * numbers. The function assumes that n >= 0.\n",
        " */\n",
    );
    assert_eq!(editor.slice(comment_start, expected.len()), expected);

    // Once the cursor has moved, earlier breaks belong to the user.
    let point = editor.find_end("Fibonacci sequence.") - 1;
    editor.type_at(point, ", defined as follows");
    let expected = concat!(
        "/**\n",
        " * The \"fibonacci\" function returns the nth number in the\n",
        " * Fibonacci sequence, defined as follows. The Fibonacci\n",
        " * sequence begins with 0\n",
        " * as the 0th number and 1 as the first number. Every\n",
        " * subsequent number is equal to the sum of the two previous\n",
        " * numbers. The function assumes that n >= 0.\n",
        " */\n",
    );
    assert_eq!(editor.slice(comment_start, expected.len()), expected);

    let start = editor.find("as follows");
    editor.backspace(start, start + 10);
    editor.type_at(start, "hence");
    let expected = concat!(
        "/**\n",
        " * The \"fibonacci\" function returns the nth number in the\n",
        " * Fibonacci sequence, defined hence. The Fibonacci sequence\n",
        " * begins with 0\n",
        " * as the 0th number and 1 as the first number. Every\n",
        " * subsequent number is equal to the sum of the two previous\n",
        " * numbers. The function assumes that n >= 0.\n",
        " */\n",
    );
    assert_eq!(editor.slice(comment_start, expected.len()), expected);

    // Shortening a line never pulls it up into the line above.
    let point = editor.find("1 as the first");
    editor.delete(point, 1);
    editor.type_at(point, "one");
    let expected = concat!(
        "/**\n",
        " * The \"fibonacci\" function returns the nth number in the\n",
        " * Fibonacci sequence, defined hence. The Fibonacci sequence\n",
        " * begins with 0\n",
        " * as the 0th number and one as the first number. Every\n",
        " * subsequent number is equal to the sum of the two previous\n",
        " * numbers. The function assumes that n >= 0.\n",
        " */\n",
    );
    assert_eq!(editor.slice(comment_start, expected.len()), expected);

    let point = editor.find_end("assumes that n >= 0.");
    editor.type_at(point, " It requires n to be an integer.");
    let expected = concat!(
        "/**\n",
        " * The \"fibonacci\" function returns the nth number in the\n",
        " * Fibonacci sequence, defined hence. The Fibonacci sequence\n",
        " * begins with 0\n",
        " * as the 0th number and one as the first number. Every\n",
        " * subsequent number is equal to the sum of the two previous\n",
        " * numbers. The function assumes that n >= 0. It requires n\n",
        " * to be an integer.\n",
        " */\n",
    );
    assert_eq!(editor.slice(comment_start, expected.len()), expected);
}
