use std::collections::BTreeSet;

use blockwright_core::blocks::record::{self, Deserializer, ParameterRecord};
use blockwright_core::{
    BlockRecord, BlockRegistry, BlockTree, BlockwrightErrorExt, Catalog, CatalogEntry, Localization,
    registry_from_catalog,
};

fn sample_program() -> Vec<BlockRecord> {
    vec![
        BlockRecord::new("stat-if-statement")
            .with_block(BlockRecord::new("expr-negate-boolean").with_block(BlockRecord::new("expr-boolean").with_value("false")))
            .with_value("true")
            .with_child(BlockRecord::new("stat-while-loop").with_empty()),
        BlockRecord::new("stat-else-statement"),
    ]
}

#[test]
fn records_survive_a_round_trip() {
    let registry = BlockRegistry::with_builtins();
    let mut tree = BlockTree::new();
    let mut deserializer = Deserializer::new(&registry);
    let roots = deserializer.deserialize_forest(&mut tree, &sample_program());
    assert!(deserializer.diagnostics().is_empty());
    assert_eq!(roots.len(), 2);
    assert_eq!(tree.len(), 5);
    assert!(tree.is_compilable());

    let saved = record::serialize_forest(&tree);
    let mut copy = BlockTree::new();
    Deserializer::new(&registry).deserialize_forest(&mut copy, &saved);
    assert_eq!(record::serialize_forest(&copy), saved);
    assert_eq!(copy.emit_source(copy.roots()[0]), "if (!(!false)) {while (null) {}}");
}

fn plugin_catalog() -> Catalog {
    let mut catalog = Catalog::new();
    catalog.insert_if_absent(CatalogEntry::event("join".into(), "org.bukkit.event.player.PlayerJoinEvent"));
    catalog.insert_if_absent(CatalogEntry::method(
        "get-player".into(),
        "org.bukkit.event.player.PlayerJoinEvent",
        "getPlayer",
        Vec::new(),
        Some("org.bukkit.entity.Player".into()),
        false,
    ));
    catalog.insert_if_absent(CatalogEntry::method(
        "send-message".into(),
        "org.bukkit.entity.Player",
        "sendMessage",
        vec!["java.lang.String".into()],
        None,
        false,
    ));
    catalog.insert_if_absent(CatalogEntry::method(
        "store".into(),
        "org.example.Store",
        "keep",
        vec![
            "java.util.List".into(),
            "org.bukkit.configuration.ConfigurationSection".into(),
            "java.lang.Number".into(),
            "org.bukkit.ChatColor".into(),
        ],
        None,
        true,
    ));
    catalog.insert_if_absent(CatalogEntry::field(
        "red".into(),
        "org.bukkit.ChatColor",
        "RED",
        "org.bukkit.ChatColor".into(),
        true,
    ));
    catalog.insert_if_absent(CatalogEntry::constructor(
        "new-file".into(),
        "java.io.File",
        vec!["java.lang.String".into()],
    ));
    catalog
}

fn text(value: &str) -> BlockRecord {
    BlockRecord::new("expr-string").with_value(value)
}

/// One handler whose body reaches every block kind, with the concatenation
/// grown past its minimum.
fn every_kind_program() -> Vec<BlockRecord> {
    let greeting = BlockRecord::new("expr-colored-string").with_block(
        BlockRecord::new("expr-combine-strings")
            .with_block(text("Hello "))
            .with_empty()
            .with_block(text("!")),
    );
    let send = BlockRecord::new("send-message")
        .with_block(BlockRecord::new("get-player").with_block(BlockRecord::new("expr-event")))
        .with_block(greeting);
    let store = BlockRecord::new("store")
        .with_block(
            BlockRecord::new("expr-directory-files").with_block(BlockRecord::new("new-file").with_block(text("plugins"))),
        )
        .with_block(BlockRecord::new("expr-new-config"))
        .with_block(BlockRecord::new("expr-number").with_value("42"))
        .with_block(BlockRecord::new("red"));
    let branch = BlockRecord::new("stat-if-statement")
        .with_block(BlockRecord::new("expr-negate-boolean").with_block(BlockRecord::new("expr-boolean").with_value("false")))
        .with_value("true")
        .with_child(BlockRecord::new("stat-while-loop").with_empty().with_child(store));
    let middle = BlockRecord::new("stat-else-if-statement")
        .with_block(BlockRecord::new("expr-boolean").with_value("true"))
        .with_value("false");
    vec![
        BlockRecord::new("join")
            .with_child(send)
            .with_child(branch)
            .with_child(middle)
            .with_child(BlockRecord::new("stat-else-statement")),
    ]
}

fn collect_ids(record: &BlockRecord, ids: &mut BTreeSet<String>) {
    ids.insert(record.id.clone());
    for param in &record.parameters {
        if let ParameterRecord::Block(nested) = param {
            collect_ids(nested, ids);
        }
    }
    for child in record.children.iter().flatten() {
        collect_ids(child, ids);
    }
}

#[test]
fn every_block_kind_survives_a_round_trip() {
    let registry = registry_from_catalog(&plugin_catalog(), &Localization::new());
    let mut tree = BlockTree::new();
    let mut deserializer = Deserializer::new(&registry);
    deserializer.deserialize_forest(&mut tree, &every_kind_program());
    assert!(deserializer.diagnostics().is_empty(), "{:?}", deserializer.diagnostics());
    assert!(tree.is_compilable(), "{:?}", tree.diagnostics());

    let saved = record::serialize_forest(&tree);
    let mut ids = BTreeSet::new();
    saved.iter().for_each(|root| collect_ids(root, &mut ids));
    let kinds: BTreeSet<String> = registry.definitions().map(|d| d.id().to_string()).collect();
    assert_eq!(ids, kinds);

    let mut copy = BlockTree::new();
    let mut reloaded = Deserializer::new(&registry);
    reloaded.deserialize_forest(&mut copy, &saved);
    assert!(reloaded.diagnostics().is_empty());
    assert_eq!(copy.len(), tree.len());
    assert_eq!(record::serialize_forest(&copy), saved);
    assert_eq!(copy.emit_source(copy.roots()[0]), tree.emit_source(tree.roots()[0]));
}

#[test]
fn empty_slots_persist_as_null() {
    let value = serde_json::to_value(BlockRecord::new("stat-while-loop").with_empty()).expect("encode");
    assert_eq!(value, serde_json::json!({ "id": "stat-while-loop", "parameters": [null] }));

    let decoded: BlockRecord =
        serde_json::from_value(serde_json::json!({ "id": "expr-string", "parameters": ["hi"] })).expect("decode");
    assert_eq!(decoded, BlockRecord::new("expr-string").with_value("hi"));
}

#[test]
fn failing_records_are_dropped_with_diagnostics() {
    let registry = BlockRegistry::with_builtins();
    let mut tree = BlockTree::new();
    let records = vec![
        BlockRecord::new("no-such-block"),
        BlockRecord::new("stat-while-loop")
            .with_empty()
            // wrong parameter count: only this child goes
            .with_child(BlockRecord::new("stat-if-statement").with_empty())
            .with_child(BlockRecord::new("stat-while-loop").with_empty()),
        // a broken nested parameter fails its whole owner
        BlockRecord::new("expr-negate-boolean").with_block(BlockRecord::new("missing")),
    ];

    let mut deserializer = Deserializer::new(&registry);
    let roots = deserializer.deserialize_forest(&mut tree, &records);
    assert_eq!(roots.len(), 1);
    assert_eq!(tree.len(), 2);
    assert_eq!(tree.get(roots[0]).expect("root").children().len(), 1);

    let messages: Vec<String> = deserializer.diagnostics().iter().map(|d| d.message()).collect();
    assert_eq!(messages.len(), 3);
    assert!(messages[0].contains("Unknown block id"), "{}", messages[0]);
    assert!(messages[1].contains("Expected 2 parameters but found 1"), "{}", messages[1]);
    assert!(messages[2].contains("missing"), "{}", messages[2]);
}

#[test]
fn growable_records_restore_their_length() {
    let registry = BlockRegistry::with_builtins();
    let mut tree = BlockTree::new();
    let record = BlockRecord::new("expr-combine-strings")
        .with_block(BlockRecord::new("expr-string").with_value("a"))
        .with_empty()
        .with_block(BlockRecord::new("expr-string").with_value("c"));
    let id = registry.create_block_from_record(&mut tree, &record).expect("rehydrate");
    assert_eq!(tree.get(id).expect("node").parameters().len(), 3);
    assert_eq!(tree.emit_source(id), r#"(("a"+null)+"c")"#);

    let too_short = BlockRecord::new("expr-combine-strings").with_empty();
    let err = registry.create_block_from_record(&mut tree, &too_short).expect_err("below the minimum");
    assert!(err.message().contains("Expected 2 to 10 parameters but found 1"));
    assert_eq!(tree.len(), 3);
}

#[test]
fn trees_save_and_load_from_disk() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("program.json");
    let registry = BlockRegistry::with_builtins();

    let mut tree = BlockTree::new();
    Deserializer::new(&registry).deserialize_forest(&mut tree, &sample_program());
    record::save_tree(&tree, &path).expect("save");

    let mut loaded = BlockTree::new();
    let dropped = record::load_tree(&path, &registry, &mut loaded).expect("load");
    assert!(dropped.is_empty());
    assert_eq!(record::serialize_forest(&loaded), record::serialize_forest(&tree));

    assert!(record::load_tree(dir.path().join("absent.json"), &registry, &mut loaded).is_err());
}
