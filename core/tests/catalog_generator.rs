use std::fs;

use blockwright_core::catalog::{EntryKind, hash};
use blockwright_core::{ApiSchema, BlockGenerator, Catalog, Localization};

const PLAYER_API: &str = r#"
    public abstract class org.bukkit.event.Event { }
    public class org.example.PlayerJoinEvent extends org.bukkit.event.Event {
        public new(org.example.Player player);
        public org.example.Player getPlayer();
    }
    public class org.example.Player {
        public java.lang.String getName();
        public void sendMessage(java.lang.String message);
        public static int count();
        public static org.example.Player find(java.lang.String[] names);
        private void secret();
        @Deprecated public void legacy();
        public int level;
        public static final int MAX;
        public static class org.example.Player$Stats {
            public int kills;
        }
    }
    @Deprecated public class org.example.Old {
        public new();
    }
"#;

fn player_schema() -> ApiSchema {
    ApiSchema::parse(PLAYER_API, "player.api").expect("parse schema")
}

#[test]
fn zero_argument_constructor_gets_one_entry() {
    let dir = tempfile::tempdir().expect("tempdir");
    let schema = ApiSchema::parse("public class org.example.Foo { public new(); }", "foo.api").expect("parse");
    let mut generator = BlockGenerator::new(dir.path(), "blocks.json", "lang.properties").expect("open");
    assert_eq!(generator.generate(&schema, "org.example"), 1);
    generator.write_files().expect("write");

    let id = hash("public org.example.Foo()");
    let raw = fs::read_to_string(dir.path().join("blocks.json")).expect("read blocks");
    let entries: Vec<serde_json::Value> = serde_json::from_str(&raw).expect("json array");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0], serde_json::json!({ "id": id, "class": "org.example.Foo" }));

    let labels = fs::read_to_string(dir.path().join("lang.properties")).expect("read labels");
    assert_eq!(labels, format!("{}.title=New Foo", id));
}

#[test]
fn constructor_labels_name_only_their_parameters() {
    let dir = tempfile::tempdir().expect("tempdir");
    let schema = ApiSchema::parse(
        "public class org.example.Foo { public new(); public new(int size); }",
        "foo.api",
    )
    .expect("parse");
    let mut generator = BlockGenerator::new(dir.path(), "blocks.json", "lang.properties").expect("open");
    assert_eq!(generator.generate(&schema, "org.example"), 2);

    let labels = generator.localization();
    let empty = hash("public org.example.Foo()");
    let sized = hash("public org.example.Foo(int)");
    assert!(!labels.contains(&format!("{}.parameters", empty)));
    assert_eq!(labels.get(&format!("{}.parameters", sized)), Some("size"));
    assert_eq!(labels.get(&format!("{}.title", sized)), Some("New Foo"));
}

#[test]
fn members_become_entries_with_labels() {
    let dir = tempfile::tempdir().expect("tempdir");
    let schema = player_schema();
    let mut generator = BlockGenerator::new(dir.path(), "blocks.json", "lang.properties").expect("open");
    generator.set_category("Player");
    generator.generate(&schema, "org.example");

    let catalog = generator.catalog();
    let labels = generator.localization();

    let get_name = hash("public java.lang.String org.example.Player.getName()");
    let entry = catalog.get(&get_name).expect("getName entry");
    assert_eq!(entry.kind(), EntryKind::Method);
    assert_eq!(entry.method.as_deref(), Some("getName"));
    assert_eq!(entry.return_type.as_deref(), Some("java.lang.String"));
    assert!(!entry.is_static);
    assert_eq!(labels.get(&format!("{}.title", get_name)), Some("Player_getName"));
    assert_eq!(labels.get(&format!("{}.parameters", get_name)), Some("Player"));
    assert_eq!(labels.get(&format!("{}.category", get_name)), Some("Player"));

    let send = hash("public void org.example.Player.sendMessage(java.lang.String)");
    assert_eq!(catalog.get(&send).expect("sendMessage").return_type, None);
    assert_eq!(labels.get(&format!("{}.parameters", send)), Some("Player,message"));

    let count = hash("public static int org.example.Player.count()");
    assert!(catalog.get(&count).expect("count").is_static);
    assert!(!labels.contains(&format!("{}.parameters", count)));

    let find = hash("public static org.example.Player org.example.Player.find(java.lang.String[])");
    assert_eq!(catalog.get(&find).expect("find").parameters, vec!["[Ljava.lang.String;".to_string()]);
    assert_eq!(labels.get(&format!("{}.parameters", find)), Some("names"));

    let level = hash("public int org.example.Player.level");
    assert_eq!(catalog.get(&level).expect("level").field.as_deref(), Some("level"));
    assert_eq!(labels.get(&format!("{}.parameters", level)), Some("Player"));

    let max = hash("public static final int org.example.Player.MAX");
    assert!(catalog.contains(&max));
    assert!(!labels.contains(&format!("{}.parameters", max)));

    // nested classes are walked, hidden members and deprecated classes are not
    assert!(catalog.contains(&hash("public int org.example.Player$Stats.kills")));
    assert!(!catalog.contains(&hash("private void org.example.Player.secret()")));
    assert!(!catalog.contains(&hash("public void org.example.Player.legacy()")));
    assert!(!catalog.contains(&hash("public org.example.Old()")));
    assert_eq!(generator.report().classes_skipped, 1);
}

#[test]
fn event_classes_only_produce_the_event_entry() {
    let dir = tempfile::tempdir().expect("tempdir");
    let schema = player_schema();
    let mut generator = BlockGenerator::new(dir.path(), "blocks.json", "lang.properties").expect("open");
    assert_eq!(generator.generate_class(&schema, "org.example.PlayerJoinEvent").expect("generate"), 1);

    let id = hash("class org.example.PlayerJoinEvent");
    let entry = generator.catalog().get(&id).expect("event entry");
    assert_eq!(entry.kind(), EntryKind::Event);
    assert_eq!(entry.event.as_deref(), Some("org.example.PlayerJoinEvent"));
    assert!(!generator.catalog().contains(&hash("public org.example.PlayerJoinEvent(org.example.Player)")));
    assert!(generator.localization().is_empty());
}

#[test]
fn regeneration_is_additive_and_idempotent() {
    let dir = tempfile::tempdir().expect("tempdir");
    let schema = player_schema();

    let mut first = BlockGenerator::new(dir.path(), "blocks.json", "lang.properties").expect("open");
    let added = first.generate(&schema, "org.example");
    assert!(added > 0);
    first.write_files().expect("write");
    let blocks_before = fs::read_to_string(dir.path().join("blocks.json")).expect("read");
    let labels_before = fs::read_to_string(dir.path().join("lang.properties")).expect("read");

    let mut second = BlockGenerator::new(dir.path(), "blocks.json", "lang.properties").expect("reopen");
    assert_eq!(second.generate(&schema, "org.example"), 0);
    second.write_files().expect("write");
    assert_eq!(fs::read_to_string(dir.path().join("blocks.json")).expect("read"), blocks_before);
    assert_eq!(fs::read_to_string(dir.path().join("lang.properties")).expect("read"), labels_before);

    // a shrunken API never prunes what was generated before
    let smaller = ApiSchema::parse(
        "public class org.example.Player { public boolean isOnline(); }",
        "smaller.api",
    )
    .expect("parse");
    let mut third = BlockGenerator::new(dir.path(), "blocks.json", "lang.properties").expect("reopen");
    assert_eq!(third.generate(&smaller, "org.example"), 1);
    third.write_files().expect("write");

    let catalog = Catalog::load(dir.path().join("blocks.json")).expect("load catalog");
    assert_eq!(catalog.len(), added + 1);
    assert!(catalog.contains(&hash("public boolean org.example.Player.isOnline()")));
    assert!(catalog.contains(&hash("public java.lang.String org.example.Player.getName()")));
}

#[test]
fn existing_labels_are_never_overwritten() {
    let dir = tempfile::tempdir().expect("tempdir");
    let id = hash("public org.example.Foo()");
    fs::write(dir.path().join("lang.properties"), format!("{}.title=Make a Foo\n", id)).expect("seed labels");

    let schema = ApiSchema::parse("public class org.example.Foo { public new(); }", "foo.api").expect("parse");
    let mut generator = BlockGenerator::new(dir.path(), "blocks.json", "lang.properties").expect("open");
    generator.set_category("Examples");
    generator.generate(&schema, "org.example");
    generator.write_files().expect("write");

    let labels = Localization::load(dir.path().join("lang.properties")).expect("load labels");
    assert_eq!(labels.get(&format!("{}.title", id)), Some("Make a Foo"));
    assert_eq!(labels.get(&format!("{}.category", id)), Some("Examples"));
}

#[test]
fn blacklist_and_plugin_module_apply() {
    let dir = tempfile::tempdir().expect("tempdir");
    let schema = player_schema();
    let mut generator = BlockGenerator::new(dir.path(), "blocks.json", "lang.properties").expect("open");
    generator.add_to_blacklist("getName");
    generator.add_to_blacklist("public int org.example.Player.level");
    generator.add_to_blacklist("class org.example.Player$Stats");
    generator.set_plugin_module("VAULT");
    generator.generate_class(&schema, "org.example.Player").expect("generate class");

    let catalog = generator.catalog();
    assert!(!catalog.contains(&hash("public java.lang.String org.example.Player.getName()")));
    assert!(!catalog.contains(&hash("public int org.example.Player.level")));
    let count = catalog
        .get(&hash("public static int org.example.Player.count()"))
        .expect("count");
    assert_eq!(count.plugin_module.as_deref(), Some("VAULT"));

    // explicit classes skip package walking, so the nested class is untouched
    assert!(!catalog.contains(&hash("public int org.example.Player$Stats.kills")));
    assert!(generator.generate_class(&schema, "org.example.Missing").is_err());
}
