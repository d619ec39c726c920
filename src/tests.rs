use pretty_assertions::assert_eq;

use crate::{Document, Emitter, Event, EventKind, NodeKind, Parser};

fn parse_events(input: &[u8]) -> Vec<Event> {
    let mut bytes = input;
    let mut parser = Parser::new();
    parser.set_input_string(&mut bytes);
    let mut events = Vec::new();
    loop {
        let event = parser.parse().unwrap();
        let done = matches!(event.kind, EventKind::StreamEnd);
        events.push(event);
        if done {
            return events;
        }
    }
}

fn emit_events(events: Vec<Event>) -> String {
    let mut output = Vec::new();
    let mut emitter = Emitter::new();
    emitter.set_output_string(&mut output);
    for event in events {
        emitter.emit(event).unwrap();
    }
    String::from_utf8(output).unwrap()
}

fn load_one(input: &str) -> Document {
    let mut bytes = input.as_bytes();
    let mut parser = Parser::new();
    parser.set_input_string(&mut bytes);
    Document::load(&mut parser).unwrap()
}

fn dump_one(document: Document) -> String {
    let mut output = Vec::new();
    let mut emitter = Emitter::new();
    emitter.set_output_string(&mut output);
    emitter.dump(document).unwrap();
    emitter.close().unwrap();
    String::from_utf8(output).unwrap()
}

/// Structural equality for documents: same node kinds, same scalar values,
/// same child ids in the same order. Marks and styles are not compared.
fn assert_same_shape(left: &Document, right: &Document) {
    assert_eq!(left.nodes.len(), right.nodes.len());
    for (a, b) in left.nodes.iter().zip(&right.nodes) {
        match (&a.kind, &b.kind) {
            (NodeKind::Scalar { value: va, .. }, NodeKind::Scalar { value: vb, .. }) => {
                assert_eq!(va, vb);
            }
            (NodeKind::Sequence { items: ia, .. }, NodeKind::Sequence { items: ib, .. }) => {
                assert_eq!(ia, ib);
            }
            (NodeKind::Mapping { pairs: pa, .. }, NodeKind::Mapping { pairs: pb, .. }) => {
                assert_eq!(pa, pb);
            }
            (a, b) => panic!("node kinds differ: {a:?} vs {b:?}"),
        }
        assert_eq!(a.tag, b.tag);
    }
}

#[test]
fn flow_mapping_emits_block_by_default() {
    let events = parse_events(b"{a: 1, b: 2}\n");
    assert_eq!(emit_events(events), "a: 1\nb: 2\n");
}

#[test]
fn nested_flow_input_normalizes_to_block_collections() {
    let events = parse_events(b"{f: [1, 2]}\n");
    assert_eq!(emit_events(events), "f:\n- 1\n- 2\n");
}

#[test]
fn one_round_trip_reaches_a_fixed_point() {
    for input in [
        "a: 1\nb: 2\n",
        "- a\n- b\n- c\n",
        "s: |-\n  line1\n  line2\n",
        "%YAML 1.2\n---\nhello\n",
        "{f: [1, 2]}\n",
        "? [a, b]\n: value\n",
        "text: 'quoted # not a comment'\n",
        "one\n---\ntwo\n",
    ] {
        let first = emit_events(parse_events(input.as_bytes()));
        let second = emit_events(parse_events(first.as_bytes()));
        assert_eq!(first, second, "round trip diverged for {input:?}");
    }
}

#[test]
fn documents_survive_dump_and_reload() {
    for input in [
        "a: 1\nb: 2\n",
        "- a\n- b\n- c\n",
        "a: &x 1\nb: *x\n",
        "base: &b {x: 1}\nref: *b\n",
        "outer:\n  inner:\n    - 1\n    - 2\n",
    ] {
        let original = load_one(input);
        let reloaded = load_one(&dump_one(original.clone()));
        assert_same_shape(&original, &reloaded);
    }
}

#[test]
fn block_scalar_chomping_strips_trailing_breaks() {
    let document = load_one("s: |-\n  line1\n  line2\n\n");
    let id = document.lookup_path(["s"]).unwrap();
    let (value, _) = document.get_node(id).unwrap().as_scalar().unwrap();
    assert_eq!(value, "line1\nline2");
}

#[test]
fn explicit_document_records_its_version() {
    let document = load_one("%YAML 1.2\n---\nhello\n");
    assert!(!document.start_implicit);
    let version = document.version_directive.unwrap();
    assert_eq!((version.major, version.minor), (1, 2));
    let (value, _) = document.get_root_node().unwrap().as_scalar().unwrap();
    assert_eq!(value, "hello");
}

#[test]
fn path_lookup_walks_nested_collections() {
    let document = load_one(
        "fruit:\n  - name: apple\n    varieties:\n      - name: macintosh\n",
    );
    let id = document
        .lookup_path(["fruit", "0", "varieties", "0", "name"])
        .unwrap();
    let (value, _) = document.get_node(id).unwrap().as_scalar().unwrap();
    assert_eq!(value, "macintosh");
    assert!(document.lookup_path(["fruit", "1"]).is_none());
}

#[test]
fn utf16_input_parses_like_utf8() {
    let utf8 = "a: 1\n";
    let mut utf16 = vec![0xff, 0xfe];
    for unit in utf8.encode_utf16() {
        utf16.extend(unit.to_le_bytes());
    }

    let mut bytes = utf16.as_slice();
    let mut parser = Parser::new();
    parser.set_input_string(&mut bytes);
    let from_utf16 = Document::load(&mut parser).unwrap();
    let from_utf8 = load_one(utf8);
    assert_same_shape(&from_utf8, &from_utf16);
}

#[test]
fn key_order_is_preserved() {
    let document = load_one("z: 1\na: 2\nm: 3\n");
    let NodeKind::Mapping { pairs, .. } = &document.get_root_node().unwrap().kind else {
        panic!("root is not a mapping");
    };
    let keys: Vec<&str> = pairs
        .iter()
        .map(|pair| document.get_node(pair.key).unwrap().as_scalar().unwrap().0)
        .collect();
    assert_eq!(keys, ["z", "a", "m"]);
}

#[test]
fn emitted_output_is_valid_parser_input() {
    let input = "servers:\n  - host: alpha\n    port: 8080\n  - host: beta\n    port: 9090\n";
    let output = emit_events(parse_events(input.as_bytes()));
    let document = load_one(&output);
    let id = document
        .lookup_path(["servers", "1", "host"])
        .unwrap();
    assert_eq!(
        document.get_node(id).unwrap().as_scalar().unwrap().0,
        "beta"
    );
}
