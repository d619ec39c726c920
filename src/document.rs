use crate::{
    MappingStyle, Mark, ScalarStyle, SequenceStyle, TagDirective, VersionDirective,
    DEFAULT_MAPPING_TAG, DEFAULT_SCALAR_TAG, DEFAULT_SEQUENCE_TAG,
};

/// A composed YAML document.
///
/// All nodes live in a single store owned by the document; nodes refer to each
/// other through one-based integer ids, with 0 meaning "no node". The first
/// node pushed into the store is the root. Aliased subtrees share ids, which
/// gives the tree DAG shape without shared ownership.
#[derive(Clone, Debug, Default)]
#[non_exhaustive]
pub struct Document {
    /// The node store; ids are indices plus one.
    pub nodes: Vec<Node>,
    /// The `%YAML` directive, if any.
    pub version_directive: Option<VersionDirective>,
    /// The tag directives in effect.
    pub tag_directives: Vec<TagDirective>,
    /// Was the document started without an explicit `---`?
    pub start_implicit: bool,
    /// Was the document ended without an explicit `...`?
    pub end_implicit: bool,
    /// Where the document begins.
    pub start_mark: Mark,
    /// Where the document ends.
    pub end_mark: Mark,
}

/// One element of a document.
#[derive(Clone, Debug, Default)]
#[non_exhaustive]
pub struct Node {
    /// The node content.
    pub kind: NodeKind,
    /// The resolved tag.
    pub tag: Option<String>,
    /// Where the node begins.
    pub start_mark: Mark,
    /// Where the node ends.
    pub end_mark: Mark,
}

/// Node content.
#[derive(Clone, Debug, Default)]
pub enum NodeKind {
    /// The placeholder left behind when a node's content has been moved out,
    /// e.g. while a document is being dumped.
    #[default]
    Empty,
    /// A scalar node.
    Scalar {
        /// The scalar value.
        value: String,
        /// The scalar style.
        style: ScalarStyle,
    },
    /// A sequence node; items are node ids in order.
    Sequence {
        /// The item node ids.
        items: Vec<i32>,
        /// The sequence style.
        style: SequenceStyle,
    },
    /// A mapping node; pairs are (key, value) node ids in order.
    Mapping {
        /// The key/value pairs.
        pairs: Vec<NodePair>,
        /// The mapping style.
        style: MappingStyle,
    },
}

/// A key/value entry of a mapping node.
#[derive(Copy, Clone, Default, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub struct NodePair {
    /// The node id of the key.
    pub key: i32,
    /// The node id of the value.
    pub value: i32,
}

impl Node {
    /// The scalar payload, if this is a scalar node.
    pub fn as_scalar(&self) -> Option<(&str, ScalarStyle)> {
        if let NodeKind::Scalar { value, style } = &self.kind {
            Some((value, *style))
        } else {
            None
        }
    }
}

impl Document {
    /// Create an empty document.
    pub fn new(
        version_directive: Option<VersionDirective>,
        tag_directives: &[TagDirective],
        start_implicit: bool,
        end_implicit: bool,
    ) -> Document {
        Document {
            nodes: Vec::with_capacity(16),
            version_directive,
            tag_directives: tag_directives.to_vec(),
            start_implicit,
            end_implicit,
            start_mark: Mark::default(),
            end_mark: Mark::default(),
        }
    }

    /// Get a node by id, or `None` if `id` is out of range.
    pub fn get_node(&self, id: i32) -> Option<&Node> {
        if id < 1 {
            return None;
        }
        self.nodes.get(id as usize - 1)
    }

    /// Get a node by id for mutation, or `None` if `id` is out of range.
    pub fn get_node_mut(&mut self, id: i32) -> Option<&mut Node> {
        if id < 1 {
            return None;
        }
        self.nodes.get_mut(id as usize - 1)
    }

    /// The root node, by convention the node with id 1.
    ///
    /// An empty document produced by the parser signifies the end of the
    /// stream; it has no root.
    pub fn get_root_node(&self) -> Option<&Node> {
        self.nodes.first()
    }

    /// Create a SCALAR node and attach it to the document.
    ///
    /// Without a tag, the node resolves to `!!str`. Returns the node id.
    #[must_use]
    pub fn add_scalar(&mut self, tag: Option<&str>, value: &str, style: ScalarStyle) -> i32 {
        self.push_node(Node {
            kind: NodeKind::Scalar {
                value: String::from(value),
                style,
            },
            tag: Some(String::from(tag.unwrap_or(DEFAULT_SCALAR_TAG))),
            start_mark: Mark::default(),
            end_mark: Mark::default(),
        })
    }

    /// Create an empty SEQUENCE node and attach it to the document.
    ///
    /// Without a tag, the node resolves to `!!seq`. Returns the node id.
    #[must_use]
    pub fn add_sequence(&mut self, tag: Option<&str>, style: SequenceStyle) -> i32 {
        self.push_node(Node {
            kind: NodeKind::Sequence {
                items: Vec::with_capacity(16),
                style,
            },
            tag: Some(String::from(tag.unwrap_or(DEFAULT_SEQUENCE_TAG))),
            start_mark: Mark::default(),
            end_mark: Mark::default(),
        })
    }

    /// Create an empty MAPPING node and attach it to the document.
    ///
    /// Without a tag, the node resolves to `!!map`. Returns the node id.
    #[must_use]
    pub fn add_mapping(&mut self, tag: Option<&str>, style: MappingStyle) -> i32 {
        self.push_node(Node {
            kind: NodeKind::Mapping {
                pairs: Vec::with_capacity(16),
                style,
            },
            tag: Some(String::from(tag.unwrap_or(DEFAULT_MAPPING_TAG))),
            start_mark: Mark::default(),
            end_mark: Mark::default(),
        })
    }

    pub(crate) fn push_node(&mut self, node: Node) -> i32 {
        self.nodes.push(node);
        self.nodes.len() as i32
    }

    /// Append an item to a SEQUENCE node.
    ///
    /// # Panics
    ///
    /// Panics if `sequence` is not the id of a sequence node or `item` is not
    /// a valid node id.
    pub fn append_sequence_item(&mut self, sequence: i32, item: i32) {
        assert!(item > 0 && item as usize <= self.nodes.len());
        let node = self
            .get_node_mut(sequence)
            .expect("sequence id out of range");
        let NodeKind::Sequence { items, .. } = &mut node.kind else {
            panic!("node is not a sequence");
        };
        items.push(item);
    }

    /// Append a key/value pair to a MAPPING node.
    ///
    /// # Panics
    ///
    /// Panics if `mapping` is not the id of a mapping node or either of `key`
    /// and `value` is not a valid node id.
    pub fn append_mapping_pair(&mut self, mapping: i32, key: i32, value: i32) {
        assert!(key > 0 && key as usize <= self.nodes.len());
        assert!(value > 0 && value as usize <= self.nodes.len());
        let node = self.get_node_mut(mapping).expect("mapping id out of range");
        let NodeKind::Mapping { pairs, .. } = &mut node.kind else {
            panic!("node is not a mapping");
        };
        pairs.push(NodePair { key, value });
    }

    /// Find the value of the first pair of a mapping node whose key is a
    /// scalar equal to `key`. Pairs are searched in document order.
    pub fn lookup_mapping_key(&self, mapping: i32, key: &str) -> Option<i32> {
        let node = self.get_node(mapping)?;
        let NodeKind::Mapping { pairs, .. } = &node.kind else {
            return None;
        };
        for pair in pairs {
            if let Some((value, _)) = self.get_node(pair.key)?.as_scalar() {
                if value == key {
                    return Some(pair.value);
                }
            }
        }
        None
    }

    /// The id of the item at `index` of a sequence node.
    pub fn lookup_sequence_index(&self, sequence: i32, index: usize) -> Option<i32> {
        let node = self.get_node(sequence)?;
        let NodeKind::Sequence { items, .. } = &node.kind else {
            return None;
        };
        items.get(index).copied()
    }

    /// Walk a path of mapping keys and decimal sequence indices from the
    /// root, returning the id of the node it resolves to.
    ///
    /// ```
    /// # use yamlet::{Document, Parser};
    /// let mut parser = Parser::new();
    /// let mut input = "a:\n  - x\n  - y\n".as_bytes();
    /// parser.set_input_string(&mut input);
    /// let document = Document::load(&mut parser).unwrap();
    /// let id = document.lookup_path(["a", "1"]).unwrap();
    /// let (value, _) = document.get_node(id).unwrap().as_scalar().unwrap();
    /// assert_eq!(value, "y");
    /// ```
    pub fn lookup_path<'a>(&self, path: impl IntoIterator<Item = &'a str>) -> Option<i32> {
        if self.nodes.is_empty() {
            return None;
        }
        let mut current = 1;
        for step in path {
            let node = self.get_node(current)?;
            current = match &node.kind {
                NodeKind::Mapping { .. } => self.lookup_mapping_key(current, step)?,
                NodeKind::Sequence { .. } => {
                    let index: usize = step.parse().ok()?;
                    self.lookup_sequence_index(current, index)?
                }
                _ => return None,
            };
        }
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn sample() -> Document {
        // fruits:
        //   - apple
        //   - pear
        // count: 2
        let mut document = Document::new(None, &[], true, true);
        let root = document.add_mapping(None, MappingStyle::Block);
        let fruits_key = document.add_scalar(None, "fruits", ScalarStyle::Plain);
        let fruits = document.add_sequence(None, SequenceStyle::Block);
        let apple = document.add_scalar(None, "apple", ScalarStyle::Plain);
        let pear = document.add_scalar(None, "pear", ScalarStyle::Plain);
        document.append_sequence_item(fruits, apple);
        document.append_sequence_item(fruits, pear);
        document.append_mapping_pair(root, fruits_key, fruits);
        let count_key = document.add_scalar(None, "count", ScalarStyle::Plain);
        let count = document.add_scalar(None, "2", ScalarStyle::Plain);
        document.append_mapping_pair(root, count_key, count);
        document
    }

    #[test]
    fn ids_are_one_based_and_root_is_first() {
        let document = sample();
        assert_eq!(document.get_root_node().unwrap().tag.as_deref(), Some(crate::MAP_TAG));
        assert!(document.get_node(0).is_none());
        assert!(document.get_node(document.nodes.len() as i32 + 1).is_none());
    }

    #[test]
    fn default_tags_are_assigned() {
        let document = sample();
        assert_eq!(
            document.get_node(2).unwrap().tag.as_deref(),
            Some(crate::STR_TAG)
        );
        assert_eq!(
            document.get_node(3).unwrap().tag.as_deref(),
            Some(crate::SEQ_TAG)
        );
    }

    #[test]
    fn mapping_lookup_by_scalar_key() {
        let document = sample();
        let count = document.lookup_mapping_key(1, "count").unwrap();
        assert_eq!(
            document.get_node(count).unwrap().as_scalar().unwrap().0,
            "2"
        );
        assert!(document.lookup_mapping_key(1, "missing").is_none());
    }

    #[test]
    fn sequence_lookup_by_index() {
        let document = sample();
        let fruits = document.lookup_mapping_key(1, "fruits").unwrap();
        let pear = document.lookup_sequence_index(fruits, 1).unwrap();
        assert_eq!(
            document.get_node(pear).unwrap().as_scalar().unwrap().0,
            "pear"
        );
        assert!(document.lookup_sequence_index(fruits, 2).is_none());
    }

    #[test]
    fn path_lookup_mixes_keys_and_indices() {
        let document = sample();
        let id = document.lookup_path(["fruits", "0"]).unwrap();
        assert_eq!(
            document.get_node(id).unwrap().as_scalar().unwrap().0,
            "apple"
        );
        assert!(document.lookup_path(["fruits", "7"]).is_none());
        assert!(document.lookup_path(["fruits", "apple"]).is_none());
        assert!(document.lookup_path(["count", "x"]).is_none());
    }
}
