use blockwright_core::{BlockRegistry, BlockTree, NodeId};

fn literal(registry: &BlockRegistry, tree: &mut BlockTree, text: &str) -> NodeId {
    let id = registry.create_block(tree, "expr-string").expect("string block");
    tree.set_parameter_literal(id, 0, text).expect("set text");
    id
}

#[test]
fn concatenation_grows_and_folds_left() {
    let registry = BlockRegistry::with_builtins();
    let mut tree = BlockTree::new();
    let concat = registry.create_block(&mut tree, "expr-combine-strings").expect("concat");
    assert_eq!(tree.get(concat).expect("node").parameters().len(), 2);

    assert!(tree.increase_size(concat));
    assert!(tree.increase_size(concat));
    assert_eq!(tree.get(concat).expect("node").parameters().len(), 4);

    for (slot, text) in ["a", "b", "c", "d"].iter().enumerate() {
        let operand = literal(&registry, &mut tree, text);
        tree.set_parameter_block(concat, slot, operand).expect("place operand");
    }
    assert!(tree.get(concat).expect("node").is_valid());
    assert_eq!(tree.emit_source(concat), r#"((("a"+"b")+"c")+"d")"#);
}

#[test]
fn growable_bounds_are_no_ops() {
    let registry = BlockRegistry::with_builtins();
    let mut tree = BlockTree::new();
    let concat = registry.create_block(&mut tree, "expr-combine-strings").expect("concat");

    assert!(!tree.decrease_size(concat));
    for _ in 0..8 {
        assert!(tree.increase_size(concat));
    }
    assert!(!tree.increase_size(concat));
    assert_eq!(tree.get(concat).expect("node").parameters().len(), 10);

    // dropping an operand frees the block it held
    let operand = literal(&registry, &mut tree, "x");
    tree.set_parameter_block(concat, 9, operand).expect("place operand");
    assert!(tree.decrease_size(concat));
    assert!(!tree.contains(operand));
    assert_eq!(tree.get(concat).expect("node").parameters().len(), 9);
}

#[test]
fn empty_slots_emit_null() {
    let registry = BlockRegistry::with_builtins();
    let mut tree = BlockTree::new();
    let concat = registry.create_block(&mut tree, "expr-combine-strings").expect("concat");
    tree.update(concat);
    assert!(tree.get(concat).expect("node").is_valid());
    assert_eq!(tree.emit_source(concat), "(null+null)");
}

#[test]
fn else_needs_a_preceding_branch() {
    let registry = BlockRegistry::with_builtins();
    let mut tree = BlockTree::new();
    let otherwise = registry.create_block(&mut tree, "stat-else-statement").expect("else");
    tree.append_root(otherwise).expect("append else");
    let node = tree.get(otherwise).expect("node");
    assert_eq!(
        node.invalid_message(),
        Some("Else blocks must directly follow an if or else-if block")
    );
    assert!(!tree.is_compilable());

    let branch = registry.create_block(&mut tree, "stat-if-statement").expect("if");
    tree.insert_root(0, branch).expect("insert if");
    assert!(tree.get(otherwise).expect("node").is_valid());
    assert!(tree.is_compilable());

    tree.remove(branch).expect("remove if");
    assert!(!tree.get(otherwise).expect("node").is_valid());
}

#[test]
fn else_after_a_loop_is_invalid() {
    let registry = BlockRegistry::with_builtins();
    let mut tree = BlockTree::new();
    let looped = registry.create_block(&mut tree, "stat-while-loop").expect("while");
    let otherwise = registry.create_block(&mut tree, "stat-else-if-statement").expect("else if");
    tree.append_root(looped).expect("append while");
    tree.append_root(otherwise).expect("append else if");
    assert!(tree.get(looped).expect("node").is_valid());
    assert!(!tree.get(otherwise).expect("node").is_valid());
    assert_eq!(tree.invalid_nodes(), vec![otherwise]);
}

#[test]
fn moved_else_follows_its_new_neighbour() {
    let registry = BlockRegistry::with_builtins();
    let mut tree = BlockTree::new();
    let looped = registry.create_block(&mut tree, "stat-while-loop").expect("while");
    let branch = registry.create_block(&mut tree, "stat-if-statement").expect("if");
    let otherwise = registry.create_block(&mut tree, "stat-else-statement").expect("else");
    tree.append_root(looped).expect("append while");
    tree.append_child(looped, branch).expect("append if");
    tree.append_root(otherwise).expect("append else");
    assert!(!tree.get(otherwise).expect("node").is_valid());

    tree.move_node(otherwise, Some(looped), 1).expect("move behind the if");
    assert!(tree.get(otherwise).expect("node").is_valid());
    assert_eq!(tree.get(looped).expect("node").children(), &[branch, otherwise]);
    assert_eq!(tree.roots(), &[looped]);

    tree.move_node(otherwise, Some(looped), 0).expect("move to the head");
    assert_eq!(tree.get(looped).expect("node").children(), &[otherwise, branch]);
    assert_eq!(
        tree.get(otherwise).expect("node").invalid_message(),
        Some("Else blocks must directly follow an if or else-if block")
    );
}

#[test]
fn slot_type_mismatch_is_reported() {
    let registry = BlockRegistry::with_builtins();
    let mut tree = BlockTree::new();
    let negate = registry.create_block(&mut tree, "expr-negate-boolean").expect("negate");
    let text = literal(&registry, &mut tree, "yes");
    tree.set_parameter_block(negate, 0, text).expect("place");
    assert_eq!(
        tree.get(negate).expect("node").invalid_message(),
        Some("Parameter 1 expects boolean but got String")
    );

    let flag = registry.create_block(&mut tree, "expr-boolean").expect("boolean");
    tree.set_parameter_block(negate, 0, flag).expect("replace");
    assert!(!tree.contains(text));
    assert!(tree.get(negate).expect("node").is_valid());
    assert_eq!(tree.emit_source(negate), "(!true)");
}

#[test]
fn number_literals_must_parse() {
    let registry = BlockRegistry::with_builtins();
    let mut tree = BlockTree::new();
    let number = registry.create_block(&mut tree, "expr-number").expect("number");
    tree.set_parameter_literal(number, 0, "2.5").expect("set");
    assert!(tree.get(number).expect("node").is_valid());
    assert_eq!(tree.emit_source(number), "2.5");

    tree.set_parameter_literal(number, 0, "abc").expect("set");
    assert_eq!(tree.get(number).expect("node").invalid_message(), Some("'abc' is not a number"));
}

#[test]
fn event_value_outside_a_handler_is_invalid() {
    let registry = BlockRegistry::with_builtins();
    let mut tree = BlockTree::new();
    let branch = registry.create_block(&mut tree, "stat-if-statement").expect("if");
    tree.append_root(branch).expect("append");
    let event = registry.create_block(&mut tree, "expr-event").expect("event");
    tree.set_parameter_block(branch, 0, event).expect("place");

    assert!(tree.get(branch).expect("node").is_valid());
    assert_eq!(
        tree.get(event).expect("node").invalid_message(),
        Some("The event value is only available inside an event handler")
    );
    let diagnostics = tree.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].block_id, "expr-event");
}

#[test]
fn negated_conditions_and_bodies_emit() {
    let registry = BlockRegistry::with_builtins();
    let mut tree = BlockTree::new();
    let branch = registry.create_block(&mut tree, "stat-if-statement").expect("if");
    let flag = registry.create_block(&mut tree, "expr-boolean").expect("boolean");
    tree.append_root(branch).expect("append if");
    tree.set_parameter_block(branch, 0, flag).expect("condition");
    tree.select_choice(flag, 0, "false").expect("select");
    tree.select_choice(branch, 1, "true").expect("negate");

    let inner = registry.create_block(&mut tree, "stat-while-loop").expect("while");
    tree.append_child(branch, inner).expect("append body");
    let otherwise = registry.create_block(&mut tree, "stat-else-statement").expect("else");
    tree.append_root(otherwise).expect("append else");

    assert_eq!(tree.emit_source(branch), "if (!false) {while (null) {}}");
    assert_eq!(tree.emit_source(otherwise), "else {}");
    assert!(tree.select_choice(branch, 1, "maybe").is_err());
}

#[test]
fn structural_edits_are_checked() {
    let registry = BlockRegistry::with_builtins();
    let mut tree = BlockTree::new();

    let text = literal(&registry, &mut tree, "x");
    assert!(tree.append_root(text).is_err());

    let outer = registry.create_block(&mut tree, "stat-if-statement").expect("outer");
    let inner = registry.create_block(&mut tree, "stat-while-loop").expect("inner");
    tree.append_root(outer).expect("append outer");
    tree.append_child(outer, inner).expect("append inner");
    assert!(tree.append_root(inner).is_err());

    // a refused move leaves the block where it was
    assert!(tree.move_node(outer, Some(inner), 0).is_err());
    assert_eq!(tree.roots(), &[outer]);
    assert!(tree.is_ancestor(outer, inner));

    tree.move_node(inner, None, 0).expect("move to top");
    assert_eq!(tree.roots(), &[inner, outer]);
    assert!(tree.get(outer).expect("node").children().is_empty());
}

#[test]
fn removal_frees_the_whole_subtree() {
    let registry = BlockRegistry::with_builtins();
    let mut tree = BlockTree::new();
    let branch = registry.create_block(&mut tree, "stat-if-statement").expect("if");
    let flag = registry.create_block(&mut tree, "expr-boolean").expect("boolean");
    let body = registry.create_block(&mut tree, "stat-while-loop").expect("while");
    tree.append_root(branch).expect("append");
    tree.set_parameter_block(branch, 0, flag).expect("condition");
    tree.append_child(branch, body).expect("body");
    assert_eq!(tree.len(), 3);

    tree.remove(branch).expect("remove");
    assert!(tree.is_empty());
    assert!(tree.roots().is_empty());
    assert_eq!(tree.emit_source(branch), "");
}

#[test]
fn removed_ids_stay_dead_when_slots_are_reused() {
    let registry = BlockRegistry::with_builtins();
    let mut tree = BlockTree::new();
    let old = registry.create_block(&mut tree, "stat-while-loop").expect("while");
    tree.append_root(old).expect("append");
    tree.remove(old).expect("remove");

    let fresh = registry.create_block(&mut tree, "stat-else-statement").expect("else");
    assert_eq!(fresh.index(), old.index());
    assert_ne!(fresh, old);
    assert!(tree.get(old).is_none());
    assert!(tree.append_root(old).is_err());
    assert!(tree.remove(old).is_err());
    assert_eq!(tree.get(fresh).expect("node").definition().id(), "stat-else-statement");
}
