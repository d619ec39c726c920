use crate::{
    Encoding, MappingStyle, Mark, ScalarStyle, SequenceStyle, TagDirective, VersionDirective,
};

/// A parsing or emitting event.
///
/// Receiving an event from [`Parser::parse`](crate::Parser::parse) transfers
/// ownership of all its strings to the caller; handing one to
/// [`Emitter::emit`](crate::Emitter::emit) transfers them back.
#[derive(Debug, PartialEq)]
#[non_exhaustive]
pub struct Event {
    /// The event discriminant with payloads.
    pub kind: EventKind,
    /// Where the event begins.
    pub start_mark: Mark,
    /// Where the event ends.
    pub end_mark: Mark,
}

#[derive(Debug, PartialEq)]
pub enum EventKind {
    /// The start of the stream, carrying the detected encoding.
    StreamStart { encoding: Encoding },
    /// The end of the stream.
    StreamEnd,
    /// The start of a document.
    DocumentStart {
        /// The `%YAML` directive, if any.
        version_directive: Option<VersionDirective>,
        /// The `%TAG` directives in effect.
        tag_directives: Vec<TagDirective>,
        /// Was the `---` indicator absent?
        implicit: bool,
    },
    /// The end of a document.
    DocumentEnd {
        /// Was the `...` indicator absent?
        implicit: bool,
    },
    /// A `*name` reference to an anchored node.
    Alias { anchor: String },
    /// A scalar value.
    Scalar {
        anchor: Option<String>,
        tag: Option<String>,
        value: String,
        /// May the tag be omitted for the plain style?
        plain_implicit: bool,
        /// May the tag be omitted for any non-plain style?
        quoted_implicit: bool,
        style: ScalarStyle,
    },
    /// The start of a sequence.
    SequenceStart {
        anchor: Option<String>,
        tag: Option<String>,
        /// May the tag be omitted?
        implicit: bool,
        style: SequenceStyle,
    },
    /// The end of a sequence.
    SequenceEnd,
    /// The start of a mapping.
    MappingStart {
        anchor: Option<String>,
        tag: Option<String>,
        /// May the tag be omitted?
        implicit: bool,
        style: MappingStyle,
    },
    /// The end of a mapping.
    MappingEnd,
}

impl Event {
    /// Make an event from its kind, with zeroed marks.
    pub(crate) fn new(kind: EventKind) -> Self {
        Self {
            kind,
            start_mark: Mark::default(),
            end_mark: Mark::default(),
        }
    }

    pub(crate) fn spanning(kind: EventKind, start_mark: Mark, end_mark: Mark) -> Self {
        Self {
            kind,
            start_mark,
            end_mark,
        }
    }

    /// Create the STREAM-START event.
    pub fn stream_start(encoding: Encoding) -> Self {
        Self::new(EventKind::StreamStart { encoding })
    }

    /// Create the STREAM-END event.
    pub fn stream_end() -> Self {
        Self::new(EventKind::StreamEnd)
    }

    /// Create the DOCUMENT-START event.
    ///
    /// The `implicit` argument is stylistic and may be ignored by the emitter.
    pub fn document_start(
        version_directive: Option<VersionDirective>,
        tag_directives: &[TagDirective],
        implicit: bool,
    ) -> Self {
        Self::new(EventKind::DocumentStart {
            version_directive,
            tag_directives: tag_directives.to_vec(),
            implicit,
        })
    }

    /// Create the DOCUMENT-END event.
    ///
    /// The `implicit` argument is stylistic and may be ignored by the emitter.
    pub fn document_end(implicit: bool) -> Self {
        Self::new(EventKind::DocumentEnd { implicit })
    }

    /// Create an ALIAS event.
    pub fn alias(anchor: &str) -> Self {
        Self::new(EventKind::Alias {
            anchor: String::from(anchor),
        })
    }

    /// Create a SCALAR event.
    ///
    /// Either `tag` must be given or one of the `plain_implicit` and
    /// `quoted_implicit` flags must be set. The `style` argument may be
    /// overridden by the emitter's scalar analysis.
    pub fn scalar(
        anchor: Option<&str>,
        tag: Option<&str>,
        value: &str,
        plain_implicit: bool,
        quoted_implicit: bool,
        style: ScalarStyle,
    ) -> Self {
        Self::new(EventKind::Scalar {
            anchor: anchor.map(String::from),
            tag: tag.map(String::from),
            value: String::from(value),
            plain_implicit,
            quoted_implicit,
            style,
        })
    }

    /// Create a SEQUENCE-START event.
    ///
    /// Either `tag` must be given or the `implicit` flag must be set.
    pub fn sequence_start(
        anchor: Option<&str>,
        tag: Option<&str>,
        implicit: bool,
        style: SequenceStyle,
    ) -> Self {
        Self::new(EventKind::SequenceStart {
            anchor: anchor.map(String::from),
            tag: tag.map(String::from),
            implicit,
            style,
        })
    }

    /// Create a SEQUENCE-END event.
    pub fn sequence_end() -> Self {
        Self::new(EventKind::SequenceEnd)
    }

    /// Create a MAPPING-START event.
    ///
    /// Either `tag` must be given or the `implicit` flag must be set.
    pub fn mapping_start(
        anchor: Option<&str>,
        tag: Option<&str>,
        implicit: bool,
        style: MappingStyle,
    ) -> Self {
        Self::new(EventKind::MappingStart {
            anchor: anchor.map(String::from),
            tag: tag.map(String::from),
            implicit,
            style,
        })
    }

    /// Create a MAPPING-END event.
    pub fn mapping_end() -> Self {
        Self::new(EventKind::MappingEnd)
    }
}
