use tson::prelude::*;

fn parse(input: &[u8]) -> (Tree, NodeId) { read_from(input).unwrap() }

fn atom_bytes(tree: &Tree, id: NodeId) -> Vec<u8> {
    tree.value(id).as_bytes().expect("a string datum").as_ref().to_vec()
}

#[test]
fn literal_example() {
    let (tree, root) = parse(b"(add 1 2.5 \"a \\\"b\\\"\")");

    let forms = tree.children(root);
    assert_eq!(forms.len(), 1);

    let form = forms[0];
    assert_eq!(tree.schema(form).tag(), Tag::Seq);

    let kids = tree.children(form);
    assert_eq!(kids.len(), 4);

    assert_eq!(atom_bytes(&tree, kids[0]), b"add");
    assert_eq!(tree.value(kids[1]).as_i64(), Some(1));
    assert_eq!(tree.value(kids[2]).as_f64(), Some(2.5));
    assert_eq!(atom_bytes(&tree, kids[3]), b"a \"b\"");
}

#[test]
fn nested_lists() {
    let mut parser = Parser::new();
    parser.feed(b"(a (b c) d)").unwrap();
    assert_eq!(parser.depth(), 0);

    let (tree, root) = parser.finish();
    let form = tree.child(root, 0).unwrap();
    let kids = tree.children(form);
    assert_eq!(kids.len(), 3);

    assert_eq!(atom_bytes(&tree, kids[0]), b"a");
    assert_eq!(atom_bytes(&tree, kids[2]), b"d");

    let inner = kids[1];
    assert_eq!(tree.schema(inner).tag(), Tag::Seq);
    let inner_kids = tree.children(inner);
    assert_eq!(inner_kids.len(), 2);
    assert_eq!(atom_bytes(&tree, inner_kids[0]), b"b");
    assert_eq!(atom_bytes(&tree, inner_kids[1]), b"c");
}

#[test]
fn unbalanced_close_fails() {
    let mut parser = Parser::new();
    match parser.feed(b"(a))") {
        Err(ParseError::UnbalancedClose { offset }) => assert_eq!(offset, 3),
        other => panic!("expected an unbalanced close, got {:?}", other),
    }
}

#[test]
fn top_level_forms_make_a_forest() {
    let (tree, root) = parse(b"a (b) \"c\" 4\n");
    let forms = tree.children(root);
    assert_eq!(forms.len(), 4);
    assert_eq!(atom_bytes(&tree, forms[0]), b"a");
    assert_eq!(tree.schema(forms[1]).tag(), Tag::Seq);
    assert_eq!(atom_bytes(&tree, forms[2]), b"c");
    assert_eq!(tree.value(forms[3]).as_i64(), Some(4));
}

#[test]
fn comments_run_to_end_of_line() {
    let (tree, root) = parse(b"(a ; not (parsed) \"at all\"\n b)");
    let form = tree.child(root, 0).unwrap();
    let kids = tree.children(form);
    assert_eq!(kids.len(), 2);
    assert_eq!(atom_bytes(&tree, kids[0]), b"a");
    assert_eq!(atom_bytes(&tree, kids[1]), b"b");
}

#[test]
fn number_classification() {
    let (tree, root) = parse(b"1 -2 +3 2.5 -0.5 1x .5 + ");
    let forms = tree.children(root);
    assert_eq!(forms.len(), 8);

    assert_eq!(tree.value(forms[0]).as_i64(), Some(1));
    assert_eq!(tree.value(forms[1]).as_i64(), Some(-2));
    assert_eq!(tree.value(forms[2]).as_i64(), Some(3));
    assert_eq!(tree.value(forms[3]).as_f64(), Some(2.5));
    assert_eq!(tree.value(forms[4]).as_f64(), Some(-0.5));
    // a leading digit forces numeric parsing; garbage parses as zero
    assert_eq!(tree.value(forms[5]).as_i64(), Some(0));
    // a leading dot is not a number
    assert_eq!(atom_bytes(&tree, forms[6]), b".5");
    assert_eq!(tree.value(forms[7]).as_i64(), Some(0));
}

#[test]
fn empty_quoted_string() {
    let (tree, root) = parse(b"\"\"");
    let forms = tree.children(root);
    assert_eq!(forms.len(), 1);
    assert_eq!(atom_bytes(&tree, forms[0]), b"");
}

#[test]
fn escaped_backslash() {
    let (tree, root) = parse(b"\"a\\\\b\"");
    assert_eq!(atom_bytes(&tree, tree.child(root, 0).unwrap()), b"a\\b");
}

#[test]
fn quote_mid_token_is_part_of_the_atom() {
    let (tree, root) = parse(b"a\"b ");
    assert_eq!(atom_bytes(&tree, tree.child(root, 0).unwrap()), b"a\"b");
}

#[test]
fn crlf_separates_atoms_and_ends_comments() {
    let (tree, root) = parse(b"a\r\nb ; c\r\nd\r\n");
    let forms = tree.children(root);
    assert_eq!(forms.len(), 3);
    assert_eq!(atom_bytes(&tree, forms[0]), b"a");
    assert_eq!(atom_bytes(&tree, forms[1]), b"b");
    assert_eq!(atom_bytes(&tree, forms[2]), b"d");
}

#[test]
fn every_chunk_split_parses_identically() {
    let input: &[u8] = b"(add 1 2.5 \"a \\\"b\\\"\" (nested \"x y\") tail) 42";
    let (whole, whole_root) = parse(input);

    for split in 0..=input.len() {
        let mut parser = Parser::new();
        parser.feed(&input[..split]).unwrap();
        parser.feed(&input[split..]).unwrap();
        let (tree, root) = parser.finish();
        assert!(
            whole.deep_eq(whole_root, &tree, root),
            "split at {} diverged",
            split
        );
    }
}

#[test]
fn byte_at_a_time_parses_identically() {
    let input: &[u8] = b"(a (b c) \"d e\" -7 0.125)";
    let (whole, whole_root) = parse(input);

    let mut parser = Parser::new();
    for byte in input {
        parser.feed(std::slice::from_ref(byte)).unwrap();
    }
    let (tree, root) = parser.finish();
    assert!(whole.deep_eq(whole_root, &tree, root));
}

#[test]
fn unterminated_token_is_dropped_at_eof() {
    let mut parser = Parser::new();
    parser.feed(b"(a b").unwrap();
    assert_eq!(parser.depth(), 1);

    let (tree, root) = parser.finish();
    let form = tree.child(root, 0).unwrap();
    // the open list holds only the closed atom; `b` never ended
    let kids = tree.children(form);
    assert_eq!(kids.len(), 1);
    assert_eq!(atom_bytes(&tree, kids[0]), b"a");
}

#[test]
fn unterminated_string_is_dropped_at_eof() {
    let mut parser = Parser::new();
    parser.feed(b"\"abc").unwrap();
    let (tree, root) = parser.finish();
    assert!(tree.children(root).is_empty());
}

#[test]
fn unterminated_comment_consumes_the_rest() {
    let mut parser = Parser::new();
    parser.feed(b"; all of this (and \"this\") is comment").unwrap();
    let (tree, root) = parser.finish();
    assert!(tree.children(root).is_empty());
}

#[test]
fn long_atoms_widen_their_string_tag() {
    let long = vec![b'q'; 300];
    let mut input = long.clone();
    input.push(b' ');

    let (tree, root) = parse(&input);
    let atom = tree.child(root, 0).unwrap();
    assert_eq!(tree.schema(atom).tag(), Tag::Str16);
    assert_eq!(atom_bytes(&tree, atom), long);
}

#[test]
fn parsed_trees_carry_correct_sizes() {
    // text trees keep the same size bookkeeping as hand-built ones
    let (tree, root) = parse(b"(x 1)");
    let form = tree.child(root, 0).unwrap();
    let kids = tree.children(form);

    let sum: usize = kids.iter().map(|&k| tree.packsz(k)).sum();
    assert_eq!(tree.packsz(form), Tag::Seq.expect_size() + sum);
    assert_eq!(tree.packsz(root), Tag::Seq.expect_size() + tree.packsz(form));
}
