//! Per-document fixup sessions.
//!
//! A [`FixupSession`] owns the parsed settings of one document, the pending edit generator, and
//! the bookkeeping for the explicit line break marker. [`SessionRegistry`] maps document ids to
//! sessions and implements the listener flow a host drives from its editing events.
//!
//! The registry is driven through `&mut self`, and the session applies its own edits directly
//! to the document instead of going back through the registry. A fixup therefore never starts
//! another fixup while it runs.

use crate::classifier::Classifier;
use crate::config::FixupConfig;
use crate::document::{
    Document, DocumentMut, EXPLICIT_LINE_BREAK_TAG, Edit, Host, LineText, Region,
    SPLIT_LINE_BREAK_TAG, char_len,
};
use crate::fixer::{EditGenerator, perform_edit};
use crate::line_start::{i_line_start_i, leading_whitespace, section_indent};
use crate::resolver::find_section;
use crate::settings::{RawSettings, SettingsParser, is_truthy, keys};
use std::collections::HashMap;
use std::sync::Arc;

/// Notice shown to the user once per settings change that contained an error.
pub const SETTINGS_ERROR_NOTICE: &str = "Reflow settings error; see the log";

/// Status text after reflow is turned on.
pub const ENABLED_STATUS: &str = "Reflow enabled";

/// Status text after reflow is turned off.
pub const DISABLED_STATUS: &str = "Reflow disabled";

/// Opaque identity of an open document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(u64);

impl DocumentId {
    /// Wrap a host-assigned id.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// The raw id.
    pub fn get(self) -> u64 {
        self.0
    }
}

/// What caused a document modification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditOrigin {
    /// Typing, deleting, pasting, or any command other than the two below.
    #[default]
    Typed,
    /// Undo or redo. Never triggers a fixup.
    UndoRedo,
    /// Swapping lines up or down. Never triggers a fixup.
    LineMove,
}

/// Reflow state for one document.
#[derive(Debug)]
pub struct FixupSession {
    settings: SettingsParser,
    generator: Option<EditGenerator>,
    first_edit: Option<Edit>,
    notice: Option<&'static str>,
    expected_cursor: Option<usize>,
    expected_len: usize,
}

impl FixupSession {
    /// Create a session, parsing `settings`.
    pub fn new(settings: &RawSettings) -> Self {
        let mut session = Self {
            settings: SettingsParser::new(settings),
            generator: None,
            first_edit: None,
            notice: None,
            expected_cursor: None,
            expected_len: 0,
        };
        session.collect_errors();
        session
    }

    /// The current configuration snapshot.
    pub fn config(&self) -> &Arc<FixupConfig> {
        self.settings.config()
    }

    /// Returns `true` if the `reflow_disabled` setting is truthy.
    pub fn is_disabled(&self) -> bool {
        self.config().disabled
    }

    /// The pending user notice, if any. Taking it clears it.
    pub fn take_notice(&mut self) -> Option<&'static str> {
        self.notice.take()
    }

    /// Returns `true` if a fixup would change the document.
    ///
    /// Starts the edit generator on first use and holds on to its first edit until
    /// [`apply_all`](Self::apply_all) or [`invalidate`](Self::invalidate).
    pub fn has_pending_edit<D: Document + ?Sized>(&mut self, doc: &D) -> bool {
        if self.is_disabled() {
            return false;
        }
        if self.generator.is_none() {
            let mut generator = EditGenerator::new(Arc::clone(self.config()));
            self.first_edit = generator.next_edit(doc);
            self.generator = Some(generator);
        }
        self.first_edit.is_some()
    }

    /// Apply every pending edit to `doc`. Returns the number of edits.
    pub fn apply_all<D: DocumentMut + ?Sized>(&mut self, doc: &mut D) -> usize {
        self.apply_all_with(doc, |doc, edit| perform_edit(doc, edit))
    }

    /// Drain the pending edits through `apply`, which must update `doc` before returning.
    pub fn apply_all_with<D, F>(&mut self, doc: &mut D, mut apply: F) -> usize
    where
        D: Document + ?Sized,
        F: FnMut(&mut D, &Edit),
    {
        if !self.has_pending_edit(doc) {
            return 0;
        }
        let (Some(mut generator), Some(first)) = (self.generator.take(), self.first_edit.take())
        else {
            return 0;
        };

        apply(doc, &first);
        let mut count = 1;
        while let Some(edit) = generator.next_edit(doc) {
            apply(doc, &edit);
            count += 1;
        }
        tracing::debug!(edits = count, "applied reflow edits");
        count
    }

    /// Forget the pending generator. Called on every modification of the document.
    pub fn invalidate(&mut self) {
        self.generator = None;
        self.first_edit = None;
    }

    /// Re-parse the setting `name`. Returns `false` if the parser does not read it.
    pub fn on_setting_changed(&mut self, name: &str, settings: &RawSettings) -> bool {
        let known = self.settings.on_setting_changed(name, settings);
        if known {
            self.collect_errors();
            self.invalidate();
        }
        known
    }

    fn collect_errors(&mut self) {
        if !self.settings.take_errors().is_empty() {
            self.notice = Some(SETTINGS_ERROR_NOTICE);
        }
    }

    /// Remember where the cursor is and how long the document is after an event was handled.
    fn record_state<D: Document + ?Sized>(&mut self, doc: &D) {
        self.expected_cursor = doc.cursor();
        self.expected_len = doc.len_chars();
    }

    /// Mark the last newline of a typed insertion as an explicit line break.
    ///
    /// A modification counts as a typed insertion when the document grew by exactly as much as
    /// the cursor advanced.
    fn detect_explicit_break<D: DocumentMut + ?Sized>(&mut self, doc: &mut D) {
        let (Some(before), Some(after)) = (self.expected_cursor, doc.cursor()) else {
            return;
        };
        if after <= before || doc.len_chars() != self.expected_len + (after - before) {
            return;
        }
        let inserted = doc.substr(Region::new(before, after));
        if let Some(newline) = inserted.rfind('\n') {
            let point = before + char_len(&inserted[..newline]);
            mark_explicit_break(doc, point);
        }
    }

    /// Insert a line break at the cursor that continues the current section.
    ///
    /// In a section whose run reaches the start of the line, the new line repeats the line's
    /// prefix (indent, line start, and following whitespace); elsewhere it repeats the leading
    /// whitespace. Either way the prefix is cut off at the cursor's column. Unless
    /// `trim_automatic_white_space` is off, trailing whitespace before the cursor is dropped
    /// when nothing but the prefix precedes it. The new break is marked explicit. Returns `false` if there is no single cursor.
    pub fn extend_section<D: DocumentMut + ?Sized>(&mut self, doc: &mut D) -> bool {
        let Some(mut point) = doc.cursor() else {
            return false;
        };
        let config = Arc::clone(self.config());
        let line = LineText::at(doc, point);
        let column = line.byte_of(point);

        let section_prefix = find_section(doc, &config, point)
            .filter(|resolved| !resolved.erase_preceding_break)
            .and_then(|resolved| {
                let line_start = resolved.line_start(&config);
                let indent = section_indent(&line.text, line_start)?;
                let classifier = Classifier::new(doc, resolved.section(&config));
                if column < indent.len() + line_start.len()
                    || !classifier.are_combined(point, line.region.start)
                {
                    return None;
                }
                i_line_start_i(&line.text, line_start)
            });
        let prefix = section_prefix.unwrap_or_else(|| leading_whitespace(&line.text, 0));
        let prefix = prefix[..prefix.len().min(column)].to_string();

        let before = &line.text[..column];
        if config.trim_automatic_white_space && before.len() <= prefix.len() {
            let trimmed = before.trim_end();
            if trimmed.len() < before.len() {
                let start = line.point_of(trimmed.len());
                doc.erase(Region::new(start, point));
                point = start;
            }
        }

        let text = format!("\n{prefix}");
        doc.insert(point, &text);
        doc.set_cursor(point + char_len(&text));
        mark_explicit_break(doc, point);
        self.invalidate();
        true
    }
}

fn mark_explicit_break<D: DocumentMut + ?Sized>(doc: &mut D, point: usize) {
    doc.erase_tagged_regions(EXPLICIT_LINE_BREAK_TAG);
    doc.add_tagged_region(EXPLICIT_LINE_BREAK_TAG, Region::new(point, point + 1));
}

fn clear_line_break_tags<D: DocumentMut + ?Sized>(doc: &mut D) {
    doc.erase_tagged_regions(EXPLICIT_LINE_BREAK_TAG);
    doc.erase_tagged_regions(SPLIT_LINE_BREAK_TAG);
}

/// All sessions, keyed by document.
///
/// Sessions are created on first use and dropped by [`on_close`](Self::on_close).
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: HashMap<DocumentId, FixupSession>,
}

impl SessionRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Returns `true` if there are no sessions.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// The session of `id`, if one exists.
    pub fn get(&self, id: DocumentId) -> Option<&FixupSession> {
        self.sessions.get(&id)
    }

    /// The session of `id`, created from the document's settings if needed.
    pub fn session<H: Host + ?Sized>(&mut self, id: DocumentId, doc: &H) -> &mut FixupSession {
        self.sessions
            .entry(id)
            .or_insert_with(|| FixupSession::new(doc.settings()))
    }

    /// The document changed. Runs a fixup unless reflow is disabled or the change came from
    /// undo, redo, or a line move. Returns the number of edits applied.
    pub fn on_modified<H: Host + ?Sized>(
        &mut self,
        id: DocumentId,
        doc: &mut H,
        origin: EditOrigin,
    ) -> usize {
        let session = self.session(id, doc);
        session.invalidate();

        let mut applied = 0;
        if !session.is_disabled() && origin == EditOrigin::Typed {
            session.detect_explicit_break(doc);
            applied = session.apply_all(doc);
            session.invalidate();
        }
        session.record_state(doc);
        applied
    }

    /// The selection changed. A cursor move that no handled modification explains clears the
    /// explicit line break and forgets which line breaks reflow split.
    pub fn on_selection_modified<H: Host + ?Sized>(&mut self, id: DocumentId, doc: &mut H) {
        let session = self.session(id, doc);
        if doc.cursor() != session.expected_cursor {
            clear_line_break_tags(doc);
        }
        session.record_state(doc);
    }

    /// A setting of the document changed.
    pub fn on_setting_changed<H: Host + ?Sized>(&mut self, id: DocumentId, doc: &mut H, name: &str) {
        let session = self.session(id, doc);
        session.on_setting_changed(name, doc.settings());
        if name == keys::DISABLED && session.is_disabled() {
            clear_line_break_tags(doc);
        }
    }

    /// Flip `reflow_disabled` and return the status text to show.
    pub fn toggle_disabled<H: Host + ?Sized>(&mut self, id: DocumentId, doc: &mut H) -> &'static str {
        let status = if doc.settings().get(keys::DISABLED).is_some_and(is_truthy) {
            doc.settings_mut().erase(keys::DISABLED);
            ENABLED_STATUS
        } else {
            doc.settings_mut().set(keys::DISABLED, true);
            DISABLED_STATUS
        };
        self.on_setting_changed(id, doc, keys::DISABLED);
        status
    }

    /// Insert a section-continuing line break at the cursor, then run the modification flow.
    /// Returns `false` if there is no single cursor.
    pub fn extend_section<H: Host + ?Sized>(&mut self, id: DocumentId, doc: &mut H) -> bool {
        if !self.session(id, doc).extend_section(doc) {
            return false;
        }
        self.on_modified(id, doc, EditOrigin::Typed);
        true
    }

    /// Run a fixup now, regardless of the last modification.
    pub fn fixup_now<H: Host + ?Sized>(&mut self, id: DocumentId, doc: &mut H) -> usize {
        let session = self.session(id, doc);
        session.invalidate();
        let applied = session.apply_all(doc);
        session.invalidate();
        session.record_state(doc);
        applied
    }

    /// The pending settings notice of `id`, if any.
    pub fn take_notice(&mut self, id: DocumentId) -> Option<&'static str> {
        self.sessions.get_mut(&id).and_then(FixupSession::take_notice)
    }

    /// The document closed. Returns `true` if it had a session.
    pub fn on_close(&mut self, id: DocumentId) -> bool {
        self.sessions.remove(&id).is_some()
    }
}
