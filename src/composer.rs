use crate::document::{Document, Node, NodeKind, NodePair};
use crate::event::{Event, EventKind};
use crate::parser::{AliasBinding, Parser};
use crate::{
    ComposerError, Mark, DEFAULT_MAPPING_TAG, DEFAULT_SCALAR_TAG, DEFAULT_SEQUENCE_TAG,
};

impl Document {
    /// Parse the input stream and compose the next document from it.
    ///
    /// Call this function repeatedly to compose every document of a stream.
    /// A returned document with an empty node store means the stream has
    /// ended.
    ///
    /// An application must not alternate calls of [`Document::load`] with
    /// calls of [`Parser::scan`] or [`Parser::parse`] on the same parser.
    pub fn load(parser: &mut Parser) -> Result<Document, ComposerError> {
        let mut document = Document::new(None, &[], false, false);

        if !parser.stream_start_seen() {
            match parser.parse() {
                Ok(Event {
                    kind: EventKind::StreamStart { .. },
                    ..
                }) => (),
                Ok(_) => unreachable!("the first event is always STREAM-START"),
                Err(err) => {
                    parser.clear_aliases();
                    return Err(err.into());
                }
            }
        }
        if parser.stream_end_seen() {
            return Ok(document);
        }

        let event = match parser.parse() {
            Ok(event) => event,
            Err(err) => {
                parser.clear_aliases();
                return Err(err.into());
            }
        };
        if matches!(event.kind, EventKind::StreamEnd) {
            return Ok(document);
        }

        let result = document.compose_document(parser, event);
        // The anchor table does not survive the document.
        parser.clear_aliases();
        result.map(|()| document)
    }

    fn compose_document(
        &mut self,
        parser: &mut Parser,
        event: Event,
    ) -> Result<(), ComposerError> {
        let EventKind::DocumentStart {
            version_directive,
            tag_directives,
            implicit,
        } = event.kind
        else {
            unreachable!("expected a DOCUMENT-START event");
        };
        self.version_directive = version_directive;
        self.tag_directives = tag_directives;
        self.start_implicit = implicit;
        self.start_mark = event.start_mark;

        // Ids of the currently open collection nodes, innermost last.
        let mut open: Vec<i32> = Vec::with_capacity(16);
        self.compose_nodes(parser, &mut open)
    }

    fn compose_nodes(
        &mut self,
        parser: &mut Parser,
        open: &mut Vec<i32>,
    ) -> Result<(), ComposerError> {
        loop {
            let event = parser.parse()?;
            let start_mark = event.start_mark;
            let end_mark = event.end_mark;
            match event.kind {
                EventKind::DocumentEnd { implicit } => {
                    self.end_implicit = implicit;
                    self.end_mark = end_mark;
                    return Ok(());
                }
                EventKind::Alias { anchor } => {
                    self.compose_alias(parser, &anchor, start_mark, open)?;
                }
                EventKind::Scalar {
                    anchor,
                    tag,
                    value,
                    style,
                    ..
                } => {
                    let tag = resolve_default_tag(tag, DEFAULT_SCALAR_TAG);
                    let id = self.push_node(Node {
                        kind: NodeKind::Scalar { value, style },
                        tag,
                        start_mark,
                        end_mark,
                    });
                    self.register_anchor(parser, id, anchor)?;
                    self.attach(open, id);
                }
                EventKind::SequenceStart {
                    anchor, tag, style, ..
                } => {
                    let tag = resolve_default_tag(tag, DEFAULT_SEQUENCE_TAG);
                    let id = self.push_node(Node {
                        kind: NodeKind::Sequence {
                            items: Vec::with_capacity(16),
                            style,
                        },
                        tag,
                        start_mark,
                        end_mark,
                    });
                    self.register_anchor(parser, id, anchor)?;
                    self.attach(open, id);
                    open.push(id);
                }
                EventKind::MappingStart {
                    anchor, tag, style, ..
                } => {
                    let tag = resolve_default_tag(tag, DEFAULT_MAPPING_TAG);
                    let id = self.push_node(Node {
                        kind: NodeKind::Mapping {
                            pairs: Vec::with_capacity(16),
                            style,
                        },
                        tag,
                        start_mark,
                        end_mark,
                    });
                    self.register_anchor(parser, id, anchor)?;
                    self.attach(open, id);
                    open.push(id);
                }
                EventKind::SequenceEnd | EventKind::MappingEnd => {
                    let id = open.pop().expect("no collection is open");
                    self.nodes[id as usize - 1].end_mark = end_mark;
                }
                EventKind::StreamStart { .. }
                | EventKind::StreamEnd
                | EventKind::DocumentStart { .. } => {
                    unreachable!("unexpected event between document markers")
                }
            }
        }
    }

    /// Attach a finished node to the innermost open collection. For mappings,
    /// the first attach of a pair is the key and the second completes it;
    /// duplicate keys are not diagnosed and both pairs are kept in order.
    fn attach(&mut self, open: &[i32], id: i32) {
        let Some(&parent) = open.last() else {
            return;
        };
        match &mut self.nodes[parent as usize - 1].kind {
            NodeKind::Sequence { items, .. } => items.push(id),
            NodeKind::Mapping { pairs, .. } => {
                if let Some(pair) = pairs.last_mut() {
                    if pair.key != 0 && pair.value == 0 {
                        pair.value = id;
                        return;
                    }
                }
                pairs.push(NodePair { key: id, value: 0 });
            }
            _ => unreachable!("parent node is not a collection"),
        }
    }

    fn register_anchor(
        &mut self,
        parser: &mut Parser,
        id: i32,
        anchor: Option<String>,
    ) -> Result<(), ComposerError> {
        let Some(anchor) = anchor else {
            return Ok(());
        };
        let mark = self.nodes[id as usize - 1].start_mark;
        for binding in &parser.aliases {
            if binding.anchor == anchor {
                return Err(ComposerError::ProblemWithContext {
                    context: "found duplicate anchor; first occurrence",
                    context_mark: binding.mark,
                    problem: "second occurrence",
                    mark,
                });
            }
        }
        parser.aliases.push(AliasBinding {
            anchor,
            index: id,
            mark,
        });
        Ok(())
    }

    fn compose_alias(
        &mut self,
        parser: &Parser,
        anchor: &str,
        mark: Mark,
        open: &[i32],
    ) -> Result<(), ComposerError> {
        for binding in &parser.aliases {
            if binding.anchor == anchor {
                let id = binding.index;
                self.attach(open, id);
                return Ok(());
            }
        }
        Err(ComposerError::Problem {
            problem: "found undefined alias",
            mark,
        })
    }
}

/// An absent or non-specific (`!`) tag resolves to the given default.
fn resolve_default_tag(tag: Option<String>, default: &str) -> Option<String> {
    if tag.is_none() || tag.as_deref() == Some("!") {
        Some(String::from(default))
    } else {
        tag
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::NodeKind;

    fn load_one(input: &str) -> Result<Document, ComposerError> {
        let mut bytes = input.as_bytes();
        let mut parser = Parser::new();
        parser.set_input_string(&mut bytes);
        Document::load(&mut parser)
    }

    #[test]
    fn block_sequence_nodes_in_order() {
        let document = load_one("- a\n- b\n- c\n").unwrap();
        let NodeKind::Sequence { items, .. } = &document.get_root_node().unwrap().kind else {
            panic!("root is not a sequence");
        };
        assert_eq!(items, &[2, 3, 4]);
        let values: Vec<&str> = items
            .iter()
            .map(|id| document.get_node(*id).unwrap().as_scalar().unwrap().0)
            .collect();
        assert_eq!(values, ["a", "b", "c"]);
    }

    #[test]
    fn alias_shares_the_anchored_node_id() {
        let document = load_one("a: &x 1\nb: *x\n").unwrap();
        let NodeKind::Mapping { pairs, .. } = &document.get_root_node().unwrap().kind else {
            panic!("root is not a mapping");
        };
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].value, pairs[1].value);
    }

    #[test]
    fn duplicate_anchor_is_rejected() {
        assert!(load_one("a: &x 1\nb: &x 2\n").is_err());
    }

    #[test]
    fn undefined_alias_is_rejected() {
        assert!(load_one("a: *nowhere\n").is_err());
    }

    #[test]
    fn anchors_do_not_leak_across_documents() {
        let mut bytes = "--- &x 1\n--- *x\n".as_bytes();
        let mut parser = Parser::new();
        parser.set_input_string(&mut bytes);
        assert!(Document::load(&mut parser).is_ok());
        assert!(Document::load(&mut parser).is_err());
    }

    #[test]
    fn empty_stream_composes_no_nodes() {
        let document = load_one("").unwrap();
        assert!(document.get_root_node().is_none());
    }

    #[test]
    fn bare_document_marker_composes_an_empty_scalar() {
        let document = load_one("---\n").unwrap();
        let (value, _) = document.get_root_node().unwrap().as_scalar().unwrap();
        assert_eq!(value, "");
        assert!(!document.start_implicit);
    }

    #[test]
    fn duplicate_mapping_keys_are_kept_in_order() {
        let document = load_one("k: 1\nk: 2\n").unwrap();
        let NodeKind::Mapping { pairs, .. } = &document.get_root_node().unwrap().kind else {
            panic!("root is not a mapping");
        };
        assert_eq!(pairs.len(), 2);
    }

    #[test]
    fn multi_document_stream_loads_in_sequence() {
        let mut bytes = "one\n---\ntwo\n".as_bytes();
        let mut parser = Parser::new();
        parser.set_input_string(&mut bytes);
        let first = Document::load(&mut parser).unwrap();
        assert_eq!(first.get_root_node().unwrap().as_scalar().unwrap().0, "one");
        let second = Document::load(&mut parser).unwrap();
        assert_eq!(
            second.get_root_node().unwrap().as_scalar().unwrap().0,
            "two"
        );
        let end = Document::load(&mut parser).unwrap();
        assert!(end.get_root_node().is_none());
    }
}
