use crate::document::{Document, Node, NodeKind};
use crate::emitter::AnchorEntry;
use crate::event::{Event, EventKind};
use crate::{
    Emitter, EmitterError, Encoding, DEFAULT_MAPPING_TAG, DEFAULT_SCALAR_TAG,
    DEFAULT_SEQUENCE_TAG,
};

impl<'w> Emitter<'w> {
    /// Start a YAML stream ahead of [`Emitter::dump`].
    ///
    /// Dumping opens the stream on demand, so calling this is only needed to
    /// force the stream start (and its BOM, for UTF-16 targets) early.
    ///
    /// # Panics
    ///
    /// Panics if the stream was already opened.
    pub fn open(&mut self) -> Result<(), EmitterError> {
        assert!(!self.opened, "emitter stream already opened");
        self.emit(Event::stream_start(Encoding::Any))?;
        self.opened = true;
        Ok(())
    }

    /// Finish the YAML stream. Dumping an empty document does the same.
    ///
    /// # Panics
    ///
    /// Panics if the stream was never opened.
    pub fn close(&mut self) -> Result<(), EmitterError> {
        assert!(self.opened, "emitter stream was not opened");
        if self.closed {
            return Ok(());
        }
        self.emit(Event::stream_end())?;
        self.closed = true;
        Ok(())
    }

    /// Write a whole document, consuming it.
    ///
    /// Nodes referenced more than once are given generated anchors and turn
    /// into aliases on every occurrence after the first. An empty document
    /// closes the stream.
    pub fn dump(&mut self, mut document: Document) -> Result<(), EmitterError> {
        if !self.opened {
            self.open()?;
        }
        if document.nodes.is_empty() {
            return self.close();
        }

        self.anchors = vec![AnchorEntry::default(); document.nodes.len()];
        self.emit(Event::new(EventKind::DocumentStart {
            version_directive: document.version_directive,
            tag_directives: std::mem::take(&mut document.tag_directives),
            implicit: document.start_implicit,
        }))?;
        self.count_references(&document, 1);
        self.dump_node(&mut document, 1)?;
        self.emit(Event::new(EventKind::DocumentEnd {
            implicit: document.end_implicit,
        }))?;

        self.anchors.clear();
        self.last_anchor_id = 0;
        Ok(())
    }

    /// Walk the tree once, counting references. The second reference to a
    /// node assigns it an anchor id.
    fn count_references(&mut self, document: &Document, id: i32) {
        let slot = id as usize - 1;
        self.anchors[slot].references += 1;
        match self.anchors[slot].references {
            1 => match &document.nodes[slot].kind {
                NodeKind::Sequence { items, .. } => {
                    for &item in items {
                        self.count_references(document, item);
                    }
                }
                NodeKind::Mapping { pairs, .. } => {
                    for pair in pairs {
                        self.count_references(document, pair.key);
                        self.count_references(document, pair.value);
                    }
                }
                _ => {}
            },
            2 => {
                self.last_anchor_id += 1;
                self.anchors[slot].anchor = self.last_anchor_id;
            }
            _ => {}
        }
    }

    fn generate_anchor(anchor_id: i32) -> String {
        format!("id{anchor_id:03}")
    }

    fn dump_node(&mut self, document: &mut Document, id: i32) -> Result<(), EmitterError> {
        let slot = id as usize - 1;
        let anchor_id = self.anchors[slot].anchor;
        let anchor = if anchor_id == 0 {
            None
        } else {
            Some(Self::generate_anchor(anchor_id))
        };
        if self.anchors[slot].serialized {
            return self.dump_alias(anchor.expect("an aliased node must carry an anchor"));
        }
        self.anchors[slot].serialized = true;

        let node = std::mem::take(&mut document.nodes[slot]);
        match node.kind {
            NodeKind::Scalar { .. } => self.dump_scalar(node, anchor),
            NodeKind::Sequence { .. } => self.dump_sequence(document, node, anchor),
            NodeKind::Mapping { .. } => self.dump_mapping(document, node, anchor),
            NodeKind::Empty => unreachable!("a document node was dumped twice"),
        }
    }

    fn dump_alias(&mut self, anchor: String) -> Result<(), EmitterError> {
        self.emit(Event::new(EventKind::Alias { anchor }))
    }

    fn dump_scalar(&mut self, node: Node, anchor: Option<String>) -> Result<(), EmitterError> {
        let implicit = node.tag.as_deref() == Some(DEFAULT_SCALAR_TAG);
        let NodeKind::Scalar { value, style } = node.kind else {
            unreachable!()
        };
        self.emit(Event::new(EventKind::Scalar {
            anchor,
            tag: node.tag,
            value,
            plain_implicit: implicit,
            quoted_implicit: implicit,
            style,
        }))
    }

    fn dump_sequence(
        &mut self,
        document: &mut Document,
        node: Node,
        anchor: Option<String>,
    ) -> Result<(), EmitterError> {
        let implicit = node.tag.as_deref() == Some(DEFAULT_SEQUENCE_TAG);
        let NodeKind::Sequence { items, style } = node.kind else {
            unreachable!()
        };
        self.emit(Event::new(EventKind::SequenceStart {
            anchor,
            tag: node.tag,
            implicit,
            style,
        }))?;
        for item in items {
            self.dump_node(document, item)?;
        }
        self.emit(Event::new(EventKind::SequenceEnd))
    }

    fn dump_mapping(
        &mut self,
        document: &mut Document,
        node: Node,
        anchor: Option<String>,
    ) -> Result<(), EmitterError> {
        let implicit = node.tag.as_deref() == Some(DEFAULT_MAPPING_TAG);
        let NodeKind::Mapping { pairs, style } = node.kind else {
            unreachable!()
        };
        self.emit(Event::new(EventKind::MappingStart {
            anchor,
            tag: node.tag,
            implicit,
            style,
        }))?;
        for pair in pairs {
            self.dump_node(document, pair.key)?;
            self.dump_node(document, pair.value)?;
        }
        self.emit(Event::new(EventKind::MappingEnd))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{MappingStyle, Parser, ScalarStyle, SequenceStyle};

    fn dump_to_string(document: Document) -> String {
        let mut output = Vec::new();
        let mut emitter = Emitter::new();
        emitter.set_output_string(&mut output);
        emitter.dump(document).unwrap();
        emitter.close().unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn hand_built_document_dumps_as_block_yaml() {
        let mut document = Document::new(None, &[], true, true);
        let root = document.add_mapping(None, MappingStyle::Any);
        let key = document.add_scalar(None, "numbers", ScalarStyle::Any);
        let seq = document.add_sequence(None, SequenceStyle::Any);
        let one = document.add_scalar(None, "1", ScalarStyle::Any);
        let two = document.add_scalar(None, "2", ScalarStyle::Any);
        document.append_sequence_item(seq, one);
        document.append_sequence_item(seq, two);
        document.append_mapping_pair(root, key, seq);

        assert_eq!(dump_to_string(document), "numbers:\n- 1\n- 2\n");
    }

    #[test]
    fn shared_nodes_get_generated_anchors() {
        let mut bytes = "a: &x 1\nb: *x\n".as_bytes();
        let mut parser = Parser::new();
        parser.set_input_string(&mut bytes);
        let document = Document::load(&mut parser).unwrap();

        assert_eq!(dump_to_string(document), "a: &id001 1\nb: *id001\n");
    }

    #[test]
    fn empty_document_closes_the_stream() {
        let mut output = Vec::new();
        let mut emitter = Emitter::new();
        emitter.set_output_string(&mut output);
        emitter.dump(Document::new(None, &[], true, true)).unwrap();
        assert!(String::from_utf8(output).unwrap().is_empty());
    }
}
