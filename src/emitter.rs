use std::collections::VecDeque;

use crate::chars::{is_alpha, is_blank, is_blankz, is_break, is_breakz, is_printable, is_space};
use crate::event::{Event, EventKind};
use crate::{
    Break, EmitterError, Encoding, ScalarStyle, TagDirective, VersionDirective, WriterError,
    OUTPUT_BUFFER_SIZE,
};

/// The emitter states, symmetric to the parser's.
#[derive(Copy, Clone, Default, PartialEq, Eq, Debug)]
enum State {
    /// Expect STREAM-START.
    #[default]
    StreamStart,
    /// Expect the first DOCUMENT-START or STREAM-END.
    FirstDocumentStart,
    /// Expect DOCUMENT-START or STREAM-END.
    DocumentStart,
    /// Expect the content of a document.
    DocumentContent,
    /// Expect DOCUMENT-END.
    DocumentEnd,
    /// Expect the first item of a flow sequence.
    FlowSequenceFirstItem,
    /// Expect an item of a flow sequence.
    FlowSequenceItem,
    /// Expect the first key of a flow mapping.
    FlowMappingFirstKey,
    /// Expect a key of a flow mapping.
    FlowMappingKey,
    /// Expect a value for a simple key of a flow mapping.
    FlowMappingSimpleValue,
    /// Expect a value of a flow mapping.
    FlowMappingValue,
    /// Expect the first item of a block sequence.
    BlockSequenceFirstItem,
    /// Expect an item of a block sequence.
    BlockSequenceItem,
    /// Expect the first key of a block mapping.
    BlockMappingFirstKey,
    /// Expect the key of a block mapping.
    BlockMappingKey,
    /// Expect a value for a simple key of a block mapping.
    BlockMappingSimpleValue,
    /// Expect a value of a block mapping.
    BlockMappingValue,
    /// Expect nothing.
    End,
}

/// Reference bookkeeping for one document node while dumping.
#[derive(Copy, Clone, Default)]
pub(crate) struct AnchorEntry {
    /// How many times the node is referenced.
    pub(crate) references: i32,
    /// The generated anchor id, or 0.
    pub(crate) anchor: i32,
    /// Has the node already been emitted?
    pub(crate) serialized: bool,
}

/// What the emitter learned about an event before rendering it.
#[derive(Default)]
struct Analysis<'a> {
    anchor: Option<AnchorAnalysis<'a>>,
    tag: Option<TagAnalysis<'a>>,
    scalar: Option<ScalarAnalysis<'a>>,
}

struct AnchorAnalysis<'a> {
    anchor: &'a str,
    alias: bool,
}

struct TagAnalysis<'a> {
    handle: &'a str,
    suffix: &'a str,
}

struct ScalarAnalysis<'a> {
    value: &'a str,
    /// Does the scalar contain line breaks?
    multiline: bool,
    /// May the scalar be written plain in flow context?
    flow_plain_allowed: bool,
    /// May the scalar be written plain in block context?
    block_plain_allowed: bool,
    /// May the scalar be written single-quoted?
    single_quoted_allowed: bool,
    /// May the scalar be written literal or folded?
    block_allowed: bool,
    /// The chosen output style.
    style: ScalarStyle,
}

/// The emitter handle: accepts events and writes YAML bytes to a sink.
///
/// Events are buffered just long enough to make a style decision (one event
/// after DOCUMENT-START, two after SEQUENCE-START, three after
/// MAPPING-START), which is how empty collections get their `[]`/`{}`
/// rendering. Errors are terminal; create a fresh emitter (or call
/// [`Emitter::reset`]) to emit again.
#[non_exhaustive]
pub struct Emitter<'w> {
    pub(crate) output: Option<&'w mut dyn std::io::Write>,
    /// Pending output; always valid UTF-8.
    pub(crate) buffer: String,
    /// Re-encoded output when the target is UTF-16.
    pub(crate) raw_buffer: Vec<u8>,
    pub(crate) encoding: Encoding,
    canonical: bool,
    best_indent: i32,
    best_width: i32,
    unicode: bool,
    line_break: Break,
    states: Vec<State>,
    state: State,
    pub(crate) events: VecDeque<Event>,
    indents: Vec<i32>,
    tag_directives: Vec<TagDirective>,
    indent: i32,
    flow_level: i32,
    mapping_context: bool,
    simple_key_context: bool,
    column: i32,
    /// Was the last written character a whitespace?
    whitespace: bool,
    /// Was the last written character an indentation character?
    indention: bool,
    /// 0 = closed, 1 = an implicit document end was written, 2 = a kept
    /// trailing break requires an explicit `...`.
    open_ended: i32,
    pub(crate) opened: bool,
    pub(crate) closed: bool,
    pub(crate) anchors: Vec<AnchorEntry>,
    pub(crate) last_anchor_id: i32,
}

impl<'w> Default for Emitter<'w> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'w> Emitter<'w> {
    /// Create an emitter.
    pub fn new() -> Emitter<'w> {
        Emitter {
            output: None,
            buffer: String::with_capacity(OUTPUT_BUFFER_SIZE),
            raw_buffer: Vec::new(),
            encoding: Encoding::Any,
            canonical: false,
            best_indent: 0,
            best_width: 0,
            unicode: false,
            line_break: Break::default(),
            states: Vec::with_capacity(16),
            state: State::default(),
            events: VecDeque::with_capacity(16),
            indents: Vec::with_capacity(16),
            tag_directives: Vec::with_capacity(16),
            indent: 0,
            flow_level: 0,
            mapping_context: false,
            simple_key_context: false,
            column: 0,
            whitespace: false,
            indention: false,
            open_ended: 0,
            opened: false,
            closed: false,
            anchors: Vec::new(),
            last_anchor_id: 0,
        }
    }

    /// Reset the emitter state, dropping the output sink.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Write the output to a byte vector. Only UTF-8 output is supported by
    /// this entry point.
    pub fn set_output_string(&mut self, output: &'w mut Vec<u8>) {
        assert!(self.output.is_none(), "output sink already set");
        if self.encoding == Encoding::Any {
            self.encoding = Encoding::Utf8;
        }
        assert!(
            self.encoding == Encoding::Utf8,
            "cannot write UTF-16 into a string output"
        );
        output.clear();
        self.output = Some(output);
    }

    /// Set a generic output sink.
    pub fn set_output(&mut self, output: &'w mut dyn std::io::Write) {
        assert!(self.output.is_none(), "output sink already set");
        self.output = Some(output);
    }

    /// Set the output encoding.
    ///
    /// # Panics
    ///
    /// Panics if the encoding has already been decided.
    pub fn set_encoding(&mut self, encoding: Encoding) {
        assert!(self.encoding == Encoding::Any, "encoding already decided");
        self.encoding = encoding;
    }

    /// Emit in the canonical style described by the YAML specification.
    pub fn set_canonical(&mut self, canonical: bool) {
        self.canonical = canonical;
    }

    /// Set the indentation increment; values outside `[2, 9]` fall back to 2.
    pub fn set_indent(&mut self, indent: i32) {
        self.best_indent = if 1 < indent && indent < 10 { indent } else { 2 };
    }

    /// Set the preferred line width; negative means unlimited.
    pub fn set_width(&mut self, width: i32) {
        self.best_width = if width >= 0 { width } else { -1 };
    }

    /// Allow unescaped non-ASCII characters in the output.
    pub fn set_unicode(&mut self, unicode: bool) {
        self.unicode = unicode;
    }

    /// Set the preferred line break.
    pub fn set_break(&mut self, line_break: Break) {
        self.line_break = line_break;
    }

    /// Accept one event, taking ownership of it, and write whatever output
    /// it settles.
    pub fn emit(&mut self, event: Event) -> Result<(), EmitterError> {
        self.events.push_back(event);
        while let Some(event) = self.next_ready_event() {
            let tag_directives = std::mem::take(&mut self.tag_directives);
            let mut analysis = self.analyze_event(&event, &tag_directives)?;
            self.state_machine(&event, &mut analysis)?;
            // DOCUMENT-START populated the directive list itself; keep that.
            if self.tag_directives.is_empty() {
                self.tag_directives = tag_directives;
            }
        }
        Ok(())
    }

    /// Pop the next event once enough lookahead has accumulated for a style
    /// decision.
    fn next_ready_event(&mut self) -> Option<Event> {
        let first = self.events.front()?;
        let accumulate = match &first.kind {
            EventKind::DocumentStart { .. } => 1,
            EventKind::SequenceStart { .. } => 2,
            EventKind::MappingStart { .. } => 3,
            _ => return self.events.pop_front(),
        };
        if self.events.len() > accumulate {
            return self.events.pop_front();
        }
        // A balanced prefix means the collection closes within the window.
        let mut level = 0;
        for event in &self.events {
            match event.kind {
                EventKind::StreamStart { .. }
                | EventKind::DocumentStart { .. }
                | EventKind::SequenceStart { .. }
                | EventKind::MappingStart { .. } => level += 1,
                EventKind::StreamEnd
                | EventKind::DocumentEnd { .. }
                | EventKind::SequenceEnd
                | EventKind::MappingEnd => level -= 1,
                _ => {}
            }
            if level == 0 {
                return self.events.pop_front();
            }
        }
        None
    }

    fn error<T>(problem: &'static str) -> Result<T, EmitterError> {
        Err(EmitterError::Problem(problem))
    }

    // ------------------------------------------------------------------
    // Low-level writing.
    // ------------------------------------------------------------------

    fn flush_if_full(&mut self) -> Result<(), WriterError> {
        if self.buffer.len() < OUTPUT_BUFFER_SIZE - 5 {
            Ok(())
        } else {
            self.flush()
        }
    }

    fn put(&mut self, ch: char) -> Result<(), WriterError> {
        self.flush_if_full()?;
        self.buffer.push(ch);
        self.column += 1;
        Ok(())
    }

    fn put_break(&mut self) -> Result<(), WriterError> {
        self.flush_if_full()?;
        match self.line_break {
            Break::Cr => self.buffer.push('\r'),
            Break::Any | Break::Ln => self.buffer.push('\n'),
            Break::CrLn => self.buffer.push_str("\r\n"),
        }
        self.column = 0;
        Ok(())
    }

    /// Write a break character from scalar content, keeping LS/PS verbatim.
    fn put_content_break(&mut self, ch: char) -> Result<(), WriterError> {
        if ch == '\n' {
            self.put_break()?;
        } else {
            self.put(ch)?;
            self.column = 0;
        }
        Ok(())
    }

    fn put_str(&mut self, string: &str) -> Result<(), WriterError> {
        for ch in string.chars() {
            self.put(ch)?;
        }
        Ok(())
    }

    fn write_bom(&mut self) -> Result<(), WriterError> {
        self.flush_if_full()?;
        self.buffer.push('\u{feff}');
        Ok(())
    }

    fn write_indent(&mut self) -> Result<(), WriterError> {
        let indent = self.indent.max(0);
        if !self.indention
            || self.column > indent
            || (self.column == indent && !self.whitespace)
        {
            self.put_break()?;
        }
        while self.column < indent {
            self.put(' ')?;
        }
        self.whitespace = true;
        self.indention = true;
        Ok(())
    }

    fn write_indicator(
        &mut self,
        indicator: &str,
        need_whitespace: bool,
        is_whitespace: bool,
        is_indention: bool,
    ) -> Result<(), WriterError> {
        if need_whitespace && !self.whitespace {
            self.put(' ')?;
        }
        self.put_str(indicator)?;
        self.whitespace = is_whitespace;
        self.indention = self.indention && is_indention;
        Ok(())
    }

    // ------------------------------------------------------------------
    // State machine.
    // ------------------------------------------------------------------

    fn state_machine<'a>(
        &mut self,
        event: &'a Event,
        analysis: &mut Analysis<'a>,
    ) -> Result<(), EmitterError> {
        match self.state {
            State::StreamStart => self.emit_stream_start(event),
            State::FirstDocumentStart => self.emit_document_start(event, true),
            State::DocumentStart => self.emit_document_start(event, false),
            State::DocumentContent => {
                self.states.push(State::DocumentEnd);
                self.emit_node(event, false, false, analysis)
            }
            State::DocumentEnd => self.emit_document_end(event),
            State::FlowSequenceFirstItem => self.emit_flow_sequence_item(event, true, analysis),
            State::FlowSequenceItem => self.emit_flow_sequence_item(event, false, analysis),
            State::FlowMappingFirstKey => self.emit_flow_mapping_key(event, true, analysis),
            State::FlowMappingKey => self.emit_flow_mapping_key(event, false, analysis),
            State::FlowMappingSimpleValue => self.emit_flow_mapping_value(event, true, analysis),
            State::FlowMappingValue => self.emit_flow_mapping_value(event, false, analysis),
            State::BlockSequenceFirstItem => self.emit_block_sequence_item(event, true, analysis),
            State::BlockSequenceItem => self.emit_block_sequence_item(event, false, analysis),
            State::BlockMappingFirstKey => self.emit_block_mapping_key(event, true, analysis),
            State::BlockMappingKey => self.emit_block_mapping_key(event, false, analysis),
            State::BlockMappingSimpleValue => self.emit_block_mapping_value(event, true, analysis),
            State::BlockMappingValue => self.emit_block_mapping_value(event, false, analysis),
            State::End => Self::error("expected nothing after STREAM-END"),
        }
    }

    fn emit_stream_start(&mut self, event: &Event) -> Result<(), EmitterError> {
        self.open_ended = 0;
        let EventKind::StreamStart { encoding } = &event.kind else {
            return Self::error("expected STREAM-START");
        };
        if self.encoding == Encoding::Any {
            self.encoding = *encoding;
        }
        if self.encoding == Encoding::Any {
            self.encoding = Encoding::Utf8;
        }
        if self.best_indent < 2 || self.best_indent > 9 {
            self.best_indent = 2;
        }
        if self.best_width >= 0 && self.best_width <= self.best_indent * 2 {
            self.best_width = 80;
        }
        if self.best_width < 0 {
            self.best_width = i32::MAX;
        }
        if self.line_break == Break::Any {
            self.line_break = Break::Ln;
        }
        self.indent = -1;
        self.column = 0;
        self.whitespace = true;
        self.indention = true;
        if self.encoding != Encoding::Utf8 {
            self.write_bom()?;
        }
        self.state = State::FirstDocumentStart;
        Ok(())
    }

    fn emit_document_start(&mut self, event: &Event, first: bool) -> Result<(), EmitterError> {
        match &event.kind {
            EventKind::DocumentStart {
                version_directive,
                tag_directives,
                implicit,
            } => {
                let mut implicit = *implicit;
                if let Some(version_directive) = version_directive {
                    Self::check_version_directive(*version_directive)?;
                }
                for tag_directive in tag_directives {
                    Self::check_tag_directive(tag_directive)?;
                    self.register_tag_directive(tag_directive.clone(), false)?;
                }
                for default in [
                    TagDirective {
                        handle: String::from("!"),
                        prefix: String::from("!"),
                    },
                    TagDirective {
                        handle: String::from("!!"),
                        prefix: String::from("tag:yaml.org,2002:"),
                    },
                ] {
                    self.register_tag_directive(default, true)?;
                }
                if !first || self.canonical {
                    implicit = false;
                }
                if (version_directive.is_some() || !tag_directives.is_empty())
                    && self.open_ended != 0
                {
                    self.write_indicator("...", true, false, false)?;
                    self.write_indent()?;
                }
                self.open_ended = 0;
                if let Some(version_directive) = version_directive {
                    implicit = false;
                    self.write_indicator("%YAML", true, false, false)?;
                    if version_directive.minor == 1 {
                        self.write_indicator("1.1", true, false, false)?;
                    } else {
                        self.write_indicator("1.2", true, false, false)?;
                    }
                    self.write_indent()?;
                }
                if !tag_directives.is_empty() {
                    implicit = false;
                    for tag_directive in tag_directives {
                        self.write_indicator("%TAG", true, false, false)?;
                        self.write_tag_handle(&tag_directive.handle)?;
                        self.write_tag_content(&tag_directive.prefix, true)?;
                        self.write_indent()?;
                    }
                }
                if !implicit {
                    self.write_indent()?;
                    self.write_indicator("---", true, false, false)?;
                    if self.canonical {
                        self.write_indent()?;
                    }
                }
                self.state = State::DocumentContent;
                self.open_ended = 0;
                Ok(())
            }
            EventKind::StreamEnd => {
                if self.open_ended == 2 {
                    self.write_indicator("...", true, false, false)?;
                    self.open_ended = 0;
                    self.write_indent()?;
                }
                self.flush()?;
                self.state = State::End;
                Ok(())
            }
            _ => Self::error("expected DOCUMENT-START or STREAM-END"),
        }
    }

    fn emit_document_end(&mut self, event: &Event) -> Result<(), EmitterError> {
        let EventKind::DocumentEnd { implicit } = &event.kind else {
            return Self::error("expected DOCUMENT-END");
        };
        self.write_indent()?;
        if *implicit {
            if self.open_ended == 0 {
                self.open_ended = 1;
            }
        } else {
            self.write_indicator("...", true, false, false)?;
            self.open_ended = 0;
            self.write_indent()?;
        }
        self.flush()?;
        self.state = State::DocumentStart;
        self.tag_directives.clear();
        Ok(())
    }

    fn emit_flow_sequence_item(
        &mut self,
        event: &Event,
        first: bool,
        analysis: &mut Analysis,
    ) -> Result<(), EmitterError> {
        if first {
            self.write_indicator("[", true, true, false)?;
            self.increase_indent(true, false);
            self.flow_level += 1;
        }
        if matches!(event.kind, EventKind::SequenceEnd) {
            self.flow_level -= 1;
            self.indent = self.indents.pop().expect("emitter indent stack is empty");
            if self.canonical && !first {
                self.write_indicator(",", false, false, false)?;
                self.write_indent()?;
            }
            self.write_indicator("]", false, false, false)?;
            self.state = self.states.pop().expect("emitter state stack is empty");
            return Ok(());
        }
        if !first {
            self.write_indicator(",", false, false, false)?;
        }
        if self.canonical || self.column > self.best_width {
            self.write_indent()?;
        }
        self.states.push(State::FlowSequenceItem);
        self.emit_node(event, false, false, analysis)
    }

    fn emit_flow_mapping_key(
        &mut self,
        event: &Event,
        first: bool,
        analysis: &mut Analysis,
    ) -> Result<(), EmitterError> {
        if first {
            self.write_indicator("{", true, true, false)?;
            self.increase_indent(true, false);
            self.flow_level += 1;
        }
        if matches!(event.kind, EventKind::MappingEnd) {
            self.flow_level -= 1;
            self.indent = self.indents.pop().expect("emitter indent stack is empty");
            if self.canonical && !first {
                self.write_indicator(",", false, false, false)?;
                self.write_indent()?;
            }
            self.write_indicator("}", false, false, false)?;
            self.state = self.states.pop().expect("emitter state stack is empty");
            return Ok(());
        }
        if !first {
            self.write_indicator(",", false, false, false)?;
        }
        if self.canonical || self.column > self.best_width {
            self.write_indent()?;
        }
        if !self.canonical && self.check_simple_key(event, analysis) {
            self.states.push(State::FlowMappingSimpleValue);
            self.emit_node(event, true, true, analysis)
        } else {
            self.write_indicator("?", true, false, false)?;
            self.states.push(State::FlowMappingValue);
            self.emit_node(event, true, false, analysis)
        }
    }

    fn emit_flow_mapping_value(
        &mut self,
        event: &Event,
        simple: bool,
        analysis: &mut Analysis,
    ) -> Result<(), EmitterError> {
        if simple {
            self.write_indicator(":", false, false, false)?;
        } else {
            if self.canonical || self.column > self.best_width {
                self.write_indent()?;
            }
            self.write_indicator(":", true, false, false)?;
        }
        self.states.push(State::FlowMappingKey);
        self.emit_node(event, true, false, analysis)
    }

    fn emit_block_sequence_item(
        &mut self,
        event: &Event,
        first: bool,
        analysis: &mut Analysis,
    ) -> Result<(), EmitterError> {
        if first {
            // A sequence in a mapping value position is written indentless.
            self.increase_indent(false, self.mapping_context && !self.indention);
        }
        if matches!(event.kind, EventKind::SequenceEnd) {
            self.indent = self.indents.pop().expect("emitter indent stack is empty");
            self.state = self.states.pop().expect("emitter state stack is empty");
            return Ok(());
        }
        self.write_indent()?;
        self.write_indicator("-", true, false, true)?;
        self.states.push(State::BlockSequenceItem);
        self.emit_node(event, false, false, analysis)
    }

    fn emit_block_mapping_key(
        &mut self,
        event: &Event,
        first: bool,
        analysis: &mut Analysis,
    ) -> Result<(), EmitterError> {
        if first {
            self.increase_indent(false, false);
        }
        if matches!(event.kind, EventKind::MappingEnd) {
            self.indent = self.indents.pop().expect("emitter indent stack is empty");
            self.state = self.states.pop().expect("emitter state stack is empty");
            return Ok(());
        }
        self.write_indent()?;
        if self.check_simple_key(event, analysis) {
            self.states.push(State::BlockMappingSimpleValue);
            self.emit_node(event, true, true, analysis)
        } else {
            self.write_indicator("?", true, false, true)?;
            self.states.push(State::BlockMappingValue);
            self.emit_node(event, true, false, analysis)
        }
    }

    fn emit_block_mapping_value(
        &mut self,
        event: &Event,
        simple: bool,
        analysis: &mut Analysis,
    ) -> Result<(), EmitterError> {
        if simple {
            self.write_indicator(":", false, false, false)?;
        } else {
            self.write_indent()?;
            self.write_indicator(":", true, false, true)?;
        }
        self.states.push(State::BlockMappingKey);
        self.emit_node(event, true, false, analysis)
    }

    fn emit_node(
        &mut self,
        event: &Event,
        mapping: bool,
        simple_key: bool,
        analysis: &mut Analysis,
    ) -> Result<(), EmitterError> {
        self.mapping_context = mapping;
        self.simple_key_context = simple_key;

        match event.kind {
            EventKind::Alias { .. } => self.emit_alias(&analysis.anchor),
            EventKind::Scalar { .. } => self.emit_scalar(event, analysis),
            EventKind::SequenceStart { .. } => self.emit_sequence_start(analysis),
            EventKind::MappingStart { .. } => self.emit_mapping_start(analysis),
            _ => Self::error("expected SCALAR, SEQUENCE-START, MAPPING-START, or ALIAS"),
        }
    }

    fn emit_alias(&mut self, anchor: &Option<AnchorAnalysis>) -> Result<(), EmitterError> {
        self.process_anchor(anchor)?;
        if self.simple_key_context {
            self.put(' ')?;
        }
        self.state = self.states.pop().expect("emitter state stack is empty");
        Ok(())
    }

    fn emit_scalar<'a>(
        &mut self,
        event: &Event,
        analysis: &mut Analysis<'a>,
    ) -> Result<(), EmitterError> {
        let Analysis {
            anchor,
            tag,
            scalar: Some(scalar),
        } = analysis
        else {
            unreachable!("scalar event without scalar analysis");
        };

        self.select_scalar_style(event, scalar, tag)?;
        self.process_anchor(anchor)?;
        self.process_tag(tag)?;
        self.increase_indent(true, false);
        self.process_scalar(scalar)?;
        self.indent = self.indents.pop().expect("emitter indent stack is empty");
        self.state = self.states.pop().expect("emitter state stack is empty");
        Ok(())
    }

    fn emit_sequence_start(&mut self, analysis: &Analysis) -> Result<(), EmitterError> {
        self.process_anchor(&analysis.anchor)?;
        self.process_tag(&analysis.tag)?;

        // The event's flow style is not taken as a request: block is the
        // default everywhere outside an enclosing flow collection, and only
        // canonical mode or an empty sequence forces the bracketed form.
        self.state = if self.flow_level != 0 || self.canonical || self.next_is_sequence_end() {
            State::FlowSequenceFirstItem
        } else {
            State::BlockSequenceFirstItem
        };
        Ok(())
    }

    fn emit_mapping_start(&mut self, analysis: &Analysis) -> Result<(), EmitterError> {
        self.process_anchor(&analysis.anchor)?;
        self.process_tag(&analysis.tag)?;

        self.state = if self.flow_level != 0 || self.canonical || self.next_is_mapping_end() {
            State::FlowMappingFirstKey
        } else {
            State::BlockMappingFirstKey
        };
        Ok(())
    }

    /// Does the queued lookahead close the sequence immediately?
    fn next_is_sequence_end(&self) -> bool {
        matches!(
            self.events.front().map(|event| &event.kind),
            Some(EventKind::SequenceEnd)
        )
    }

    fn next_is_mapping_end(&self) -> bool {
        matches!(
            self.events.front().map(|event| &event.kind),
            Some(EventKind::MappingEnd)
        )
    }

    /// May this node be written as a simple `key:` instead of an explicit
    /// `? key` form?
    fn check_simple_key(&self, event: &Event, analysis: &Analysis) -> bool {
        let Analysis {
            anchor,
            tag,
            scalar,
        } = analysis;

        let mut length = anchor.as_ref().map_or(0, |a| a.anchor.len())
            + tag.as_ref().map_or(0, |t| t.handle.len() + t.suffix.len());

        match event.kind {
            EventKind::Alias { .. } => {
                length = anchor.as_ref().map_or(0, |a| a.anchor.len());
            }
            EventKind::Scalar { .. } => {
                let scalar = scalar.as_ref().expect("scalar event without analysis");
                if scalar.multiline {
                    return false;
                }
                length += scalar.value.len();
            }
            EventKind::SequenceStart { .. } => {
                if !self.next_is_sequence_end() {
                    return false;
                }
            }
            EventKind::MappingStart { .. } => {
                if !self.next_is_mapping_end() {
                    return false;
                }
            }
            _ => return false,
        }

        length <= 128
    }

    // ------------------------------------------------------------------
    // Style selection and analysis.
    // ------------------------------------------------------------------

    fn select_scalar_style(
        &mut self,
        event: &Event,
        scalar: &mut ScalarAnalysis,
        tag: &mut Option<TagAnalysis>,
    ) -> Result<(), EmitterError> {
        let EventKind::Scalar {
            plain_implicit,
            quoted_implicit,
            style,
            ..
        } = &event.kind
        else {
            unreachable!()
        };

        let no_tag = tag.is_none();
        if no_tag && !*plain_implicit && !*quoted_implicit {
            return Self::error("neither tag nor implicit flags are specified");
        }

        let mut style = *style;
        if style == ScalarStyle::Any {
            style = ScalarStyle::Plain;
        }
        if self.canonical {
            style = ScalarStyle::DoubleQuoted;
        }
        if self.simple_key_context && scalar.multiline {
            style = ScalarStyle::DoubleQuoted;
        }
        if style == ScalarStyle::Plain {
            if (self.flow_level != 0 && !scalar.flow_plain_allowed)
                || (self.flow_level == 0 && !scalar.block_plain_allowed)
            {
                style = ScalarStyle::SingleQuoted;
            }
            if scalar.value.is_empty() && (self.flow_level != 0 || self.simple_key_context) {
                style = ScalarStyle::SingleQuoted;
            }
            if no_tag && !*plain_implicit {
                style = ScalarStyle::SingleQuoted;
            }
        }
        if style == ScalarStyle::SingleQuoted && !scalar.single_quoted_allowed {
            style = ScalarStyle::DoubleQuoted;
        }
        if (style == ScalarStyle::Literal || style == ScalarStyle::Folded)
            && (!scalar.block_allowed || self.flow_level != 0 || self.simple_key_context)
        {
            style = ScalarStyle::DoubleQuoted;
        }
        if no_tag && !*quoted_implicit && style != ScalarStyle::Plain {
            // A non-plain style with no tag needs the `!` shorthand to stay
            // unresolved on re-parse.
            *tag = Some(TagAnalysis {
                handle: "!",
                suffix: "",
            });
        }
        scalar.style = style;
        Ok(())
    }

    fn check_version_directive(version: VersionDirective) -> Result<(), EmitterError> {
        if version.major != 1 || (version.minor != 1 && version.minor != 2) {
            return Self::error("incompatible %YAML directive");
        }
        Ok(())
    }

    fn check_tag_directive(tag_directive: &TagDirective) -> Result<(), EmitterError> {
        if tag_directive.handle.is_empty() {
            return Self::error("tag handle must not be empty");
        }
        if !tag_directive.handle.starts_with('!') {
            return Self::error("tag handle must start with '!'");
        }
        if !tag_directive.handle.ends_with('!') {
            return Self::error("tag handle must end with '!'");
        }
        if tag_directive.handle.len() > 2 {
            let interior = &tag_directive.handle[1..tag_directive.handle.len() - 1];
            for ch in interior.chars() {
                if !is_alpha(ch) {
                    return Self::error("tag handle must contain alphanumerical characters only");
                }
            }
        }
        if tag_directive.prefix.is_empty() {
            return Self::error("tag prefix must not be empty");
        }
        Ok(())
    }

    fn register_tag_directive(
        &mut self,
        value: TagDirective,
        allow_duplicates: bool,
    ) -> Result<(), EmitterError> {
        for tag_directive in &self.tag_directives {
            if value.handle == tag_directive.handle {
                if allow_duplicates {
                    return Ok(());
                }
                return Self::error("duplicate %TAG directive");
            }
        }
        self.tag_directives.push(value);
        Ok(())
    }

    fn analyze_anchor<'a>(
        anchor: &'a str,
        alias: bool,
    ) -> Result<AnchorAnalysis<'a>, EmitterError> {
        if anchor.is_empty() {
            return Self::error(if alias {
                "alias value must not be empty"
            } else {
                "anchor value must not be empty"
            });
        }
        for ch in anchor.chars() {
            if !is_alpha(ch) {
                return Self::error(if alias {
                    "alias value must contain alphanumerical characters only"
                } else {
                    "anchor value must contain alphanumerical characters only"
                });
            }
        }
        Ok(AnchorAnalysis { anchor, alias })
    }

    fn analyze_tag<'a>(
        tag: &'a str,
        tag_directives: &'a [TagDirective],
    ) -> Result<TagAnalysis<'a>, EmitterError> {
        if tag.is_empty() {
            return Self::error("tag value must not be empty");
        }
        for tag_directive in tag_directives {
            let prefix_len = tag_directive.prefix.len();
            if prefix_len < tag.len() && tag_directive.prefix == tag[..prefix_len] {
                return Ok(TagAnalysis {
                    handle: &tag_directive.handle,
                    suffix: &tag[prefix_len..],
                });
            }
        }
        Ok(TagAnalysis {
            handle: "",
            suffix: tag,
        })
    }

    /// Classify the scalar value: which styles can render it, and what
    /// whitespace hazards it contains.
    fn analyze_scalar<'a>(&self, value: &'a str) -> ScalarAnalysis<'a> {
        let mut block_indicators = false;
        let mut flow_indicators = false;
        let mut line_breaks = false;
        let mut special_characters = false;
        let mut leading_space = false;
        let mut leading_break = false;
        let mut trailing_space = false;
        let mut trailing_break = false;
        let mut break_space = false;
        let mut space_break = false;
        let mut previous_space = false;
        let mut previous_break = false;

        if value.is_empty() {
            return ScalarAnalysis {
                value: "",
                multiline: false,
                flow_plain_allowed: false,
                block_plain_allowed: true,
                single_quoted_allowed: true,
                block_allowed: false,
                style: ScalarStyle::Any,
            };
        }

        if value.starts_with("---") || value.starts_with("...") {
            block_indicators = true;
            flow_indicators = true;
        }

        let mut preceded_by_whitespace = true;
        let mut chars = value.chars();
        let mut first = true;
        while let Some(ch) = chars.next() {
            let next = chars.clone().next();
            let followed_by_whitespace = is_blankz(next);

            if first {
                match ch {
                    '#' | ',' | '[' | ']' | '{' | '}' | '&' | '*' | '!' | '|' | '>' | '\''
                    | '"' | '%' | '@' | '`' => {
                        flow_indicators = true;
                        block_indicators = true;
                    }
                    '?' | ':' => {
                        flow_indicators = true;
                        if followed_by_whitespace {
                            block_indicators = true;
                        }
                    }
                    '-' if followed_by_whitespace => {
                        flow_indicators = true;
                        block_indicators = true;
                    }
                    _ => {}
                }
            } else {
                match ch {
                    ',' | '?' | '[' | ']' | '{' | '}' => {
                        flow_indicators = true;
                    }
                    ':' => {
                        flow_indicators = true;
                        if followed_by_whitespace {
                            block_indicators = true;
                        }
                    }
                    '#' if preceded_by_whitespace => {
                        flow_indicators = true;
                        block_indicators = true;
                    }
                    _ => {}
                }
            }

            if !is_printable(ch) || (!ch.is_ascii() && !self.unicode) {
                special_characters = true;
            }
            if is_break(ch) {
                line_breaks = true;
            }

            // One classification per character: a space, a break, or neither.
            if is_space(ch) {
                if first {
                    leading_space = true;
                }
                if next.is_none() {
                    trailing_space = true;
                }
                if previous_break {
                    break_space = true;
                }
                previous_space = true;
                previous_break = false;
            } else if is_break(ch) {
                if first {
                    leading_break = true;
                }
                if next.is_none() {
                    trailing_break = true;
                }
                if previous_space {
                    space_break = true;
                }
                previous_space = false;
                previous_break = true;
            } else {
                previous_space = false;
                previous_break = false;
            }

            preceded_by_whitespace = is_blankz(ch);
            first = false;
        }

        let mut analysis = ScalarAnalysis {
            value,
            multiline: line_breaks,
            flow_plain_allowed: true,
            block_plain_allowed: true,
            single_quoted_allowed: true,
            block_allowed: true,
            style: ScalarStyle::Any,
        };
        if leading_space || leading_break || trailing_space || trailing_break {
            analysis.flow_plain_allowed = false;
            analysis.block_plain_allowed = false;
        }
        if trailing_space {
            analysis.block_allowed = false;
        }
        if break_space {
            analysis.flow_plain_allowed = false;
            analysis.block_plain_allowed = false;
            analysis.single_quoted_allowed = false;
        }
        if space_break || special_characters {
            analysis.flow_plain_allowed = false;
            analysis.block_plain_allowed = false;
            analysis.single_quoted_allowed = false;
            analysis.block_allowed = false;
        }
        if line_breaks {
            analysis.flow_plain_allowed = false;
            analysis.block_plain_allowed = false;
        }
        if flow_indicators {
            analysis.flow_plain_allowed = false;
        }
        if block_indicators {
            analysis.block_plain_allowed = false;
        }
        analysis
    }

    fn analyze_event<'a>(
        &self,
        event: &'a Event,
        tag_directives: &'a [TagDirective],
    ) -> Result<Analysis<'a>, EmitterError> {
        let mut analysis = Analysis::default();
        match &event.kind {
            EventKind::Alias { anchor } => {
                analysis.anchor = Some(Self::analyze_anchor(anchor, true)?);
            }
            EventKind::Scalar {
                anchor,
                tag,
                value,
                plain_implicit,
                quoted_implicit,
                ..
            } => {
                if let Some(anchor) = anchor {
                    analysis.anchor = Some(Self::analyze_anchor(anchor, false)?);
                }
                if let Some(tag) = tag {
                    if self.canonical || (!*plain_implicit && !*quoted_implicit) {
                        analysis.tag = Some(Self::analyze_tag(tag, tag_directives)?);
                    }
                }
                analysis.scalar = Some(self.analyze_scalar(value));
            }
            EventKind::SequenceStart {
                anchor,
                tag,
                implicit,
                ..
            }
            | EventKind::MappingStart {
                anchor,
                tag,
                implicit,
                ..
            } => {
                if let Some(anchor) = anchor {
                    analysis.anchor = Some(Self::analyze_anchor(anchor, false)?);
                }
                if let Some(tag) = tag {
                    if self.canonical || !*implicit {
                        analysis.tag = Some(Self::analyze_tag(tag, tag_directives)?);
                    }
                }
            }
            _ => {}
        }
        Ok(analysis)
    }

    // ------------------------------------------------------------------
    // Rendering.
    // ------------------------------------------------------------------

    fn increase_indent(&mut self, flow: bool, indentless: bool) {
        self.indents.push(self.indent);
        if self.indent < 0 {
            self.indent = if flow { self.best_indent } else { 0 };
        } else if !indentless {
            self.indent += self.best_indent;
        }
    }

    fn process_anchor(&mut self, anchor: &Option<AnchorAnalysis>) -> Result<(), EmitterError> {
        let Some(anchor) = anchor.as_ref() else {
            return Ok(());
        };
        self.write_indicator(if anchor.alias { "*" } else { "&" }, true, false, false)?;
        self.put_str(anchor.anchor)?;
        self.whitespace = false;
        self.indention = false;
        Ok(())
    }

    fn process_tag(&mut self, tag: &Option<TagAnalysis>) -> Result<(), EmitterError> {
        let Some(tag) = tag.as_ref() else {
            return Ok(());
        };
        if tag.handle.is_empty() && tag.suffix.is_empty() {
            return Ok(());
        }
        if tag.handle.is_empty() {
            self.write_indicator("!<", true, false, false)?;
            self.write_tag_content(tag.suffix, false)?;
            self.write_indicator(">", false, false, false)?;
        } else {
            self.write_tag_handle(tag.handle)?;
            if !tag.suffix.is_empty() {
                self.write_tag_content(tag.suffix, false)?;
            }
        }
        Ok(())
    }

    fn process_scalar(&mut self, scalar: &ScalarAnalysis) -> Result<(), EmitterError> {
        match scalar.style {
            ScalarStyle::Plain => {
                self.write_plain_scalar(scalar.value, !self.simple_key_context)
            }
            ScalarStyle::SingleQuoted => {
                self.write_single_quoted_scalar(scalar.value, !self.simple_key_context)
            }
            ScalarStyle::DoubleQuoted => {
                self.write_double_quoted_scalar(scalar.value, !self.simple_key_context)
            }
            ScalarStyle::Literal => self.write_literal_scalar(scalar.value),
            ScalarStyle::Folded => self.write_folded_scalar(scalar.value),
            ScalarStyle::Any => unreachable!("no scalar style was chosen"),
        }
    }

    fn write_tag_handle(&mut self, value: &str) -> Result<(), EmitterError> {
        if !self.whitespace {
            self.put(' ')?;
        }
        self.put_str(value)?;
        self.whitespace = false;
        self.indention = false;
        Ok(())
    }

    fn write_tag_content(
        &mut self,
        value: &str,
        need_whitespace: bool,
    ) -> Result<(), EmitterError> {
        if need_whitespace && !self.whitespace {
            self.put(' ')?;
        }
        for ch in value.chars() {
            if is_alpha(ch)
                || matches!(
                    ch,
                    ';' | '/'
                        | '?'
                        | ':'
                        | '@'
                        | '&'
                        | '='
                        | '+'
                        | '$'
                        | ','
                        | '_'
                        | '.'
                        | '~'
                        | '*'
                        | '\''
                        | '('
                        | ')'
                        | '['
                        | ']'
                )
            {
                self.put(ch)?;
                continue;
            }
            // Everything else is URI-escaped, octet by octet.
            let mut utf8 = [0u8; 4];
            for octet in ch.encode_utf8(&mut utf8).bytes() {
                self.put('%')?;
                let hex = |nibble: u8| {
                    char::from_digit(u32::from(nibble), 16)
                        .expect("nibble out of range")
                        .to_ascii_uppercase()
                };
                self.put(hex(octet >> 4))?;
                self.put(hex(octet & 0x0f))?;
            }
        }
        self.whitespace = false;
        self.indention = false;
        Ok(())
    }

    fn write_plain_scalar(&mut self, value: &str, allow_breaks: bool) -> Result<(), EmitterError> {
        let mut spaces = false;
        let mut breaks = false;
        if !self.whitespace && (!value.is_empty() || self.flow_level != 0) {
            self.put(' ')?;
        }

        let mut chars = value.chars();
        while let Some(ch) = chars.next() {
            let next = chars.clone().next();
            if is_space(ch) {
                if allow_breaks && !spaces && self.column > self.best_width && !is_space(next) {
                    self.write_indent()?;
                } else {
                    self.put(ch)?;
                }
                spaces = true;
            } else if is_break(ch) {
                if !breaks && ch == '\n' {
                    self.put_break()?;
                }
                self.put_content_break(ch)?;
                self.indention = true;
                breaks = true;
            } else {
                if breaks {
                    self.write_indent()?;
                }
                self.put(ch)?;
                self.indention = false;
                spaces = false;
                breaks = false;
            }
        }
        self.whitespace = false;
        self.indention = false;
        Ok(())
    }

    fn write_single_quoted_scalar(
        &mut self,
        value: &str,
        allow_breaks: bool,
    ) -> Result<(), EmitterError> {
        let mut spaces = false;
        let mut breaks = false;
        self.write_indicator("'", true, false, false)?;

        let mut chars = value.chars();
        let mut first = true;
        while let Some(ch) = chars.next() {
            let next = chars.clone().next();
            let last = next.is_none();

            if is_space(ch) {
                if allow_breaks
                    && !spaces
                    && self.column > self.best_width
                    && !first
                    && !last
                    && !is_space(next)
                {
                    self.write_indent()?;
                } else {
                    self.put(ch)?;
                }
                spaces = true;
            } else if is_break(ch) {
                if !breaks && ch == '\n' {
                    self.put_break()?;
                }
                self.put_content_break(ch)?;
                self.indention = true;
                breaks = true;
            } else {
                if breaks {
                    self.write_indent()?;
                }
                if ch == '\'' {
                    self.put('\'')?;
                }
                self.put(ch)?;
                self.indention = false;
                spaces = false;
                breaks = false;
            }
            first = false;
        }
        if breaks {
            self.write_indent()?;
        }
        self.write_indicator("'", false, false, false)?;
        self.whitespace = false;
        self.indention = false;
        Ok(())
    }

    fn write_double_quoted_scalar(
        &mut self,
        value: &str,
        allow_breaks: bool,
    ) -> Result<(), EmitterError> {
        let mut spaces = false;
        self.write_indicator("\"", true, false, false)?;

        let mut chars = value.chars();
        let mut first = true;
        while let Some(ch) = chars.next() {
            let must_escape = !is_printable(ch)
                || (!self.unicode && !ch.is_ascii())
                || ch == '\u{feff}'
                || is_break(ch)
                || ch == '"'
                || ch == '\\';
            if must_escape {
                self.write_double_quoted_escape(ch)?;
                spaces = false;
            } else if is_space(ch) {
                let next = chars.clone().next();
                if allow_breaks
                    && !spaces
                    && self.column > self.best_width
                    && !first
                    && next.is_some()
                {
                    self.write_indent()?;
                    if is_space(next) {
                        self.put('\\')?;
                    }
                } else {
                    self.put(ch)?;
                }
                spaces = true;
            } else {
                self.put(ch)?;
                spaces = false;
            }
            first = false;
        }
        self.write_indicator("\"", false, false, false)?;
        self.whitespace = false;
        self.indention = false;
        Ok(())
    }

    fn write_double_quoted_escape(&mut self, ch: char) -> Result<(), WriterError> {
        self.put('\\')?;
        match ch {
            '\0' => self.put('0')?,
            '\x07' => self.put('a')?,
            '\x08' => self.put('b')?,
            '\x09' => self.put('t')?,
            '\x0a' => self.put('n')?,
            '\x0b' => self.put('v')?,
            '\x0c' => self.put('f')?,
            '\x0d' => self.put('r')?,
            '\x1b' => self.put('e')?,
            '"' => self.put('"')?,
            '\\' => self.put('\\')?,
            '\u{0085}' => self.put('N')?,
            '\u{00a0}' => self.put('_')?,
            '\u{2028}' => self.put('L')?,
            '\u{2029}' => self.put('P')?,
            _ => {
                let (prefix, width) = if ch <= '\u{00ff}' {
                    ('x', 2)
                } else if ch <= '\u{ffff}' {
                    ('u', 4)
                } else {
                    ('U', 8)
                };
                self.put(prefix)?;
                let value = ch as u32;
                for shift in (0..width).rev() {
                    let digit = (value >> (shift * 4)) & 0x0f;
                    let digit = char::from_digit(digit, 16)
                        .expect("digit out of range")
                        .to_ascii_uppercase();
                    self.put(digit)?;
                }
            }
        }
        Ok(())
    }

    /// Write the indentation and chomping indicators of a block scalar.
    fn write_block_scalar_hints(&mut self, value: &str) -> Result<(), EmitterError> {
        let first = value.chars().next();
        if is_space(first) || is_break(first) {
            let hint =
                char::from_digit(self.best_indent as u32, 10).expect("best indent out of range");
            let mut buffer = [0u8; 1];
            self.write_indicator(hint.encode_utf8(&mut buffer), false, false, false)?;
        }
        self.open_ended = 0;

        let mut chomp_hint: Option<&str> = None;
        if value.is_empty() {
            chomp_hint = Some("-");
        } else {
            let mut tail = value.chars().rev();
            let last = tail.next();
            let before_last = tail.next();
            if !is_break(last) {
                chomp_hint = Some("-");
            } else if is_breakz(before_last) {
                chomp_hint = Some("+");
                self.open_ended = 2;
            }
        }
        if let Some(chomp_hint) = chomp_hint {
            self.write_indicator(chomp_hint, false, false, false)?;
        }
        Ok(())
    }

    fn write_literal_scalar(&mut self, value: &str) -> Result<(), EmitterError> {
        self.write_indicator("|", true, false, false)?;
        self.write_block_scalar_hints(value)?;
        self.put_break()?;
        self.indention = true;
        self.whitespace = true;

        let mut breaks = true;
        for ch in value.chars() {
            if is_break(ch) {
                self.put_content_break(ch)?;
                self.indention = true;
                breaks = true;
            } else {
                if breaks {
                    self.write_indent()?;
                }
                self.put(ch)?;
                self.indention = false;
                breaks = false;
            }
        }
        Ok(())
    }

    fn write_folded_scalar(&mut self, value: &str) -> Result<(), EmitterError> {
        self.write_indicator(">", true, false, false)?;
        self.write_block_scalar_hints(value)?;
        self.put_break()?;
        self.indention = true;
        self.whitespace = true;

        let mut breaks = true;
        let mut leading_spaces = true;
        let mut chars = value.chars();
        while let Some(ch) = chars.next() {
            if is_break(ch) {
                // An extra break separates folded non-blank lines.
                if !breaks && !leading_spaces && ch == '\n' {
                    let mut lookahead = chars.clone();
                    let mut next = lookahead.next();
                    while is_break(next) {
                        next = lookahead.next();
                    }
                    if !is_blankz(next) {
                        self.put_break()?;
                    }
                }
                self.put_content_break(ch)?;
                self.indention = true;
                breaks = true;
            } else {
                if breaks {
                    self.write_indent()?;
                    leading_spaces = is_blank(ch);
                }
                if !breaks
                    && is_space(ch)
                    && !is_space(chars.clone().next())
                    && self.column > self.best_width
                {
                    self.write_indent()?;
                } else {
                    self.put(ch)?;
                }
                self.indention = false;
                breaks = false;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{MappingStyle, SequenceStyle};

    fn emit_all(events: Vec<Event>) -> String {
        let mut output = Vec::new();
        let mut emitter = Emitter::new();
        emitter.set_output_string(&mut output);
        for event in events {
            emitter.emit(event).unwrap();
        }
        String::from_utf8(output).unwrap()
    }

    fn document(body: Vec<Event>) -> Vec<Event> {
        let mut events = vec![
            Event::stream_start(Encoding::Utf8),
            Event::document_start(None, &[], true),
        ];
        events.extend(body);
        events.push(Event::document_end(true));
        events.push(Event::stream_end());
        events
    }

    fn plain(value: &str) -> Event {
        Event::scalar(None, None, value, true, true, ScalarStyle::Plain)
    }

    #[test]
    fn block_mapping_output() {
        let output = emit_all(document(vec![
            Event::mapping_start(None, None, true, MappingStyle::Any),
            plain("a"),
            plain("1"),
            plain("b"),
            plain("2"),
            Event::mapping_end(),
        ]));
        assert_eq!(output, "a: 1\nb: 2\n");
    }

    #[test]
    fn flow_styled_events_normalize_to_block() {
        let output = emit_all(document(vec![
            Event::sequence_start(None, None, true, SequenceStyle::Flow),
            plain("a"),
            plain("b"),
            Event::sequence_end(),
        ]));
        assert_eq!(output, "- a\n- b\n");
    }

    #[test]
    fn empty_collections_render_inline() {
        let output = emit_all(document(vec![
            Event::mapping_start(None, None, true, MappingStyle::Any),
            plain("seq"),
            Event::sequence_start(None, None, true, SequenceStyle::Any),
            Event::sequence_end(),
            plain("map"),
            Event::mapping_start(None, None, true, MappingStyle::Any),
            Event::mapping_end(),
            Event::mapping_end(),
        ]));
        assert_eq!(output, "seq: []\nmap: {}\n");
    }

    #[test]
    fn block_sequence_output() {
        let output = emit_all(document(vec![
            Event::sequence_start(None, None, true, SequenceStyle::Any),
            plain("a"),
            plain("b"),
            Event::sequence_end(),
        ]));
        assert_eq!(output, "- a\n- b\n");
    }

    #[test]
    fn multiline_plain_scalar_upgrades_to_single_quoted() {
        let output = emit_all(document(vec![plain(
            "1st non-empty\n2nd non-empty 3rd non-empty",
        )]));
        assert_eq!(output, "'1st non-empty\n\n  2nd non-empty 3rd non-empty'\n");
    }

    #[test]
    fn literal_scalar_output() {
        let clipped = emit_all(document(vec![Event::scalar(
            None,
            None,
            "line1\nline2\n",
            true,
            true,
            ScalarStyle::Literal,
        )]));
        assert_eq!(clipped, "|\n  line1\n  line2\n");

        let stripped = emit_all(document(vec![Event::scalar(
            None,
            None,
            "line1\nline2",
            true,
            true,
            ScalarStyle::Literal,
        )]));
        assert_eq!(stripped, "|-\n  line1\n  line2\n");
    }

    #[test]
    fn canonical_forces_explicit_documents_and_quotes() {
        let mut output = Vec::new();
        let mut emitter = Emitter::new();
        emitter.set_output_string(&mut output);
        emitter.set_canonical(true);
        for event in document(vec![plain("x")]) {
            emitter.emit(event).unwrap();
        }
        assert_eq!(String::from_utf8(output).unwrap(), "---\n\"x\"\n");
    }

    #[test]
    fn anchors_and_aliases_round_out() {
        let output = emit_all(document(vec![
            Event::mapping_start(None, None, true, MappingStyle::Any),
            plain("a"),
            Event::scalar(Some("x"), None, "1", true, true, ScalarStyle::Plain),
            plain("b"),
            Event::alias("x"),
            Event::mapping_end(),
        ]));
        assert_eq!(output, "a: &x 1\nb: *x\n");
    }

    #[test]
    fn non_ascii_is_escaped_unless_unicode() {
        let output = emit_all(document(vec![plain("héllo")]));
        assert_eq!(output, "\"h\\xE9llo\"\n");

        let mut output = Vec::new();
        let mut emitter = Emitter::new();
        emitter.set_output_string(&mut output);
        emitter.set_unicode(true);
        for event in document(vec![plain("héllo")]) {
            emitter.emit(event).unwrap();
        }
        assert_eq!(String::from_utf8(output).unwrap(), "héllo\n");
    }

    #[test]
    fn explicit_document_end_marker() {
        let events = vec![
            Event::stream_start(Encoding::Utf8),
            Event::document_start(None, &[], false),
            plain("x"),
            Event::document_end(false),
            Event::stream_end(),
        ];
        assert_eq!(emit_all(events), "--- x\n...\n");
    }

    #[test]
    fn version_directive_is_echoed() {
        let events = vec![
            Event::stream_start(Encoding::Utf8),
            Event::document_start(Some(VersionDirective { major: 1, minor: 2 }), &[], true),
            plain("x"),
            Event::document_end(true),
            Event::stream_end(),
        ];
        assert_eq!(emit_all(events), "%YAML 1.2\n--- x\n");
    }

    #[test]
    fn crln_break_applies_to_every_line() {
        let mut output = Vec::new();
        let mut emitter = Emitter::new();
        emitter.set_output_string(&mut output);
        emitter.set_break(Break::CrLn);
        for event in document(vec![
            Event::mapping_start(None, None, true, MappingStyle::Any),
            plain("a"),
            plain("1"),
            plain("b"),
            plain("2"),
            Event::mapping_end(),
        ]) {
            emitter.emit(event).unwrap();
        }
        assert_eq!(String::from_utf8(output).unwrap(), "a: 1\r\nb: 2\r\n");
    }

    #[test]
    fn indent_setting_widens_nested_blocks() {
        let mut output = Vec::new();
        let mut emitter = Emitter::new();
        emitter.set_output_string(&mut output);
        emitter.set_indent(4);
        for event in document(vec![
            Event::mapping_start(None, None, true, MappingStyle::Any),
            plain("outer"),
            Event::mapping_start(None, None, true, MappingStyle::Any),
            plain("inner"),
            plain("1"),
            Event::mapping_end(),
            Event::mapping_end(),
        ]) {
            emitter.emit(event).unwrap();
        }
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "outer:\n    inner: 1\n"
        );
    }

    #[test]
    fn narrow_width_wraps_plain_scalars() {
        let mut output = Vec::new();
        let mut emitter = Emitter::new();
        emitter.set_output_string(&mut output);
        emitter.set_width(8);
        for event in document(vec![plain("aaaa bbbb cccc")]) {
            emitter.emit(event).unwrap();
        }
        assert_eq!(String::from_utf8(output).unwrap(), "aaaa bbbb\n  cccc\n");
    }

    #[test]
    fn anchored_collections_carry_their_anchor() {
        let output = emit_all(document(vec![
            Event::mapping_start(None, None, true, MappingStyle::Any),
            plain("base"),
            Event::mapping_start(Some("b"), None, true, MappingStyle::Any),
            plain("x"),
            plain("1"),
            Event::mapping_end(),
            plain("ref"),
            Event::alias("b"),
            Event::mapping_end(),
        ]));
        assert_eq!(output, "base: &b\n  x: 1\nref: *b\n");
    }

    #[test]
    fn reset_allows_reuse_after_an_error() {
        let mut output = Vec::new();
        let mut emitter = Emitter::new();
        emitter.set_output_string(&mut output);
        emitter.emit(Event::stream_start(Encoding::Utf8)).unwrap();
        assert!(emitter.emit(Event::sequence_end()).is_err());
        emitter.reset();

        let mut output = Vec::new();
        emitter.set_output_string(&mut output);
        for event in document(vec![plain("ok")]) {
            emitter.emit(event).unwrap();
        }
        assert_eq!(String::from_utf8(output).unwrap(), "ok\n");
    }

    #[test]
    fn event_out_of_order_is_rejected() {
        let mut output = Vec::new();
        let mut emitter = Emitter::new();
        emitter.set_output_string(&mut output);
        emitter.emit(Event::stream_start(Encoding::Utf8)).unwrap();
        let result = emitter.emit(Event::document_end(true));
        assert!(result.is_err());
    }
}
