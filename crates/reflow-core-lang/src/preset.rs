//! Ready-made reflow rules for common languages.
//!
//! A preset bundles the comment syntax of a language with the wrappable sections and paragraph
//! rules that suit it. The engine turns presets into settings; hosts can also use them as a
//! starting point for their own configuration.

use crate::CommentSyntax;
use crate::tagger::ScopeTagger;

/// Selector for "plain code" that may sit between two line comments of the same run
/// (indentation and trailing newlines).
pub const CODE_GAP_SELECTOR: &str =
    "source - (comment | constant | entity | invalid | keyword | punctuation | storage | string | variable)";

/// One wrappable section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionPreset {
    /// Line starts in priority order. An empty string means "no line start".
    pub line_starts: Vec<String>,
    /// Scope selector for the section's content.
    pub selector: String,
    /// Scope selector for text that may be combined with the content.
    pub combining_selector: Option<String>,
    /// Section-specific wrap width.
    pub wrap_width: Option<usize>,
}

impl SectionPreset {
    /// A section with a single line start and no combining selector.
    pub fn new(line_start: impl Into<String>, selector: impl Into<String>) -> Self {
        Self {
            line_starts: vec![line_start.into()],
            selector: selector.into(),
            combining_selector: None,
            wrap_width: None,
        }
    }

    /// Set the combining selector.
    pub fn combining(mut self, selector: impl Into<String>) -> Self {
        self.combining_selector = Some(selector.into());
        self
    }

    /// Set the wrap width.
    pub fn wrap_width(mut self, width: usize) -> Self {
        self.wrap_width = Some(width);
        self
    }
}

/// One paragraph rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParagraphPreset {
    /// Pattern that identifies the first line of a paragraph.
    pub first_line_regex: String,
    /// Literal continuation indent.
    pub indent: Option<String>,
    /// Whether the paragraph is a single line that is never joined.
    pub single_line: bool,
}

impl ParagraphPreset {
    /// A paragraph whose continuation lines carry `indent`.
    pub fn indented(first_line_regex: impl Into<String>, indent: impl Into<String>) -> Self {
        Self {
            first_line_regex: first_line_regex.into(),
            indent: Some(indent.into()),
            single_line: false,
        }
    }

    /// A paragraph boundary with no extra indent.
    pub fn boundary(first_line_regex: impl Into<String>) -> Self {
        Self {
            first_line_regex: first_line_regex.into(),
            indent: None,
            single_line: false,
        }
    }

    /// A single-line paragraph.
    pub fn single_line(first_line_regex: impl Into<String>) -> Self {
        Self {
            first_line_regex: first_line_regex.into(),
            indent: None,
            single_line: true,
        }
    }
}

/// Reflow rules for one language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguagePreset {
    /// Language identifier (`c`, `python`, ...).
    pub name: &'static str,
    /// File extensions, without the dot.
    pub extensions: &'static [&'static str],
    /// Scope of untagged text.
    pub base_scope: &'static str,
    /// Suffix appended to generated scope names.
    pub scope_suffix: &'static str,
    /// Comment tokens.
    pub comments: CommentSyntax,
    /// String delimiters.
    pub strings: &'static [&'static str],
    /// Reserved words tagged as `keyword`.
    pub keywords: &'static [&'static str],
    /// Wrappable sections, in priority order.
    pub sections: Vec<SectionPreset>,
    /// Paragraph rules, in priority order.
    pub paragraphs: Vec<ParagraphPreset>,
}

const C_KEYWORDS: &[&str] = &[
    "auto", "break", "case", "char", "class", "const", "continue", "default", "do", "double",
    "else", "enum", "extern", "float", "for", "if", "int", "long", "namespace", "return",
    "short", "signed", "sizeof", "static", "struct", "switch", "typedef", "union", "unsigned",
    "using", "void", "volatile", "while",
];

const PYTHON_KEYWORDS: &[&str] = &[
    "and", "as", "class", "def", "elif", "else", "for", "from", "if", "import", "in", "is",
    "lambda", "not", "or", "pass", "return", "while", "with", "yield",
];

const SHELL_KEYWORDS: &[&str] = &[
    "case", "do", "done", "elif", "else", "esac", "fi", "for", "function", "if", "in", "then",
    "while",
];

impl LanguagePreset {
    /// C, C++, C#, Java, JavaScript and friends: `/* ... */` blocks with `" * "` continuation
    /// lines, and `//` line comments.
    pub fn c_family() -> Self {
        Self {
            name: "c",
            extensions: &["c", "h", "cc", "cpp", "hpp", "cs", "java", "js", "ts", "rs", "go"],
            base_scope: "source.c",
            scope_suffix: "c",
            comments: CommentSyntax::line_and_block("//", "/*", "*/"),
            strings: &["\"", "'"],
            keywords: C_KEYWORDS,
            sections: vec![
                SectionPreset::new(
                    " * ",
                    "comment.block - (punctuation.definition.comment.begin | punctuation.definition.comment.end)",
                ),
                SectionPreset::new("//", "comment.line").combining(CODE_GAP_SELECTOR),
            ],
            paragraphs: Vec::new(),
        }
    }

    /// Python: `#` comments wrapped at 79 columns, docstrings at 72.
    pub fn python() -> Self {
        Self {
            name: "python",
            extensions: &["py", "pyw", "pyi"],
            base_scope: "source.python",
            scope_suffix: "python",
            comments: CommentSyntax::line("#").with_doc_delimiter("\"\"\""),
            strings: &["\"", "'"],
            keywords: PYTHON_KEYWORDS,
            sections: vec![
                SectionPreset::new("", "comment.block - punctuation.definition.comment")
                    .wrap_width(72),
                SectionPreset::new("#", "comment.line")
                    .combining(CODE_GAP_SELECTOR)
                    .wrap_width(79),
            ],
            paragraphs: vec![ParagraphPreset::boundary(r#"^""?$"#)],
        }
    }

    /// Shell scripts and other `#`-commented formats.
    pub fn shell() -> Self {
        Self {
            name: "shell",
            extensions: &["sh", "bash", "zsh", "toml", "yaml", "yml"],
            base_scope: "source.shell",
            scope_suffix: "shell",
            comments: CommentSyntax::line("#"),
            strings: &["\"", "'"],
            keywords: SHELL_KEYWORDS,
            sections: vec![SectionPreset::new("#", "comment.line").combining(CODE_GAP_SELECTOR)],
            paragraphs: Vec::new(),
        }
    }

    /// Prose: the whole document is one wrappable section without a line start.
    pub fn plain_text() -> Self {
        Self {
            name: "text",
            extensions: &["txt", "text"],
            base_scope: "text.plain",
            scope_suffix: "plain",
            comments: CommentSyntax::default(),
            strings: &[],
            keywords: &[],
            sections: vec![SectionPreset::new("", "text.plain")],
            paragraphs: Vec::new(),
        }
    }

    /// All built-in presets.
    pub fn all() -> Vec<Self> {
        vec![
            Self::c_family(),
            Self::python(),
            Self::shell(),
            Self::plain_text(),
        ]
    }

    /// Find a built-in preset by language identifier.
    pub fn by_name(name: &str) -> Option<Self> {
        Self::all().into_iter().find(|preset| preset.name == name)
    }

    /// Find a built-in preset by file extension (case-insensitive, without the dot).
    pub fn for_extension(ext: &str) -> Option<Self> {
        let ext = ext.to_ascii_lowercase();
        Self::all()
            .into_iter()
            .find(|preset| preset.extensions.contains(&ext.as_str()))
    }

    /// Build a scope tagger for this language.
    pub fn tagger(&self) -> Result<ScopeTagger, regex::Error> {
        let mut tagger = ScopeTagger::new(self.base_scope, self.scope_suffix)
            .with_comments(&self.comments)
            .with_strings(self.strings);
        if !self.keywords.is_empty() {
            let pattern = format!(r"\b(?:{})\b", self.keywords.join("|"));
            tagger = tagger.with_token(&pattern, "keyword")?;
        }
        if self.base_scope.starts_with("source.") {
            tagger = tagger
                .with_token(r"\b\d+(?:\.\d+)?\b", "constant.numeric")?
                .with_token(r"[;,(){}\[\]]", "punctuation")?;
        }
        Ok(tagger)
    }
}
