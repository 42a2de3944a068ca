use std::fs;

use blockwright_core::catalog::hash;
use blockwright_core::{Catalog, GeneratorConfig, Localization, run_generator};

const SERVER_API: &str = r#"
public class org.example.Server {
    public static void broadcast(java.lang.String message);
}
public class org.example.hook.Economy {
    public double balance(java.lang.String player);
}
"#;

fn write_project(dir: &std::path::Path, jobs: &str) -> std::path::PathBuf {
    fs::create_dir_all(dir.join("api")).expect("api dir");
    fs::write(dir.join("api").join("server.api"), SERVER_API).expect("write schema");
    let config = format!(
        r#"{{
            "output_dir": "out",
            "schemas": ["api/*.api"],
            "jobs": {}
        }}"#,
        jobs
    );
    let path = dir.join("generator.json");
    fs::write(&path, config).expect("write config");
    path
}

#[test]
fn config_jobs_fill_both_stores() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_project(
        dir.path(),
        r#"[
            { "package": "org.example", "category": "Server" },
            { "classes": ["org.example.hook.Economy"], "plugin_module": "vault" }
        ]"#,
    );

    let config = GeneratorConfig::load_from_file(&path).expect("load config");
    assert_eq!(config.output_dir, dir.path().join("out"));
    let report = run_generator(&config).expect("run");
    assert_eq!(report.entries_added, 2);
    assert_eq!(report.classes_scanned, 2);

    let catalog = Catalog::load(dir.path().join("out").join("blocks.json")).expect("catalog");
    let labels = Localization::load(dir.path().join("out").join("lang.properties")).expect("labels");

    let broadcast = hash("public static void org.example.Server.broadcast(java.lang.String)");
    assert!(catalog.contains(&broadcast));
    assert_eq!(labels.get(&format!("{}.category", broadcast)), Some("Server"));

    let balance = hash("public double org.example.hook.Economy.balance(java.lang.String)");
    let entry = catalog.get(&balance).expect("balance");
    assert_eq!(entry.plugin_module.as_deref(), Some("VAULT"));
    // the category of the first job does not leak into the second
    assert!(!labels.contains(&format!("{}.category", balance)));
    assert_eq!(labels.get(&format!("{}.parameters", balance)), Some("Economy,player"));
}

#[test]
fn rerunning_a_config_adds_nothing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_project(dir.path(), r#"[{ "package": "org.example" }]"#);
    let config = GeneratorConfig::load_from_file(&path).expect("load config");

    assert_eq!(run_generator(&config).expect("first run").entries_added, 1);
    let report = run_generator(&config).expect("second run");
    assert_eq!(report.entries_added, 0);
    assert_eq!(report.labels_added, 0);
}

#[test]
fn invalid_configs_are_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let empty_job = write_project(dir.path(), "[{}]");
    assert!(GeneratorConfig::load_from_file(&empty_job).is_err());

    let unknown_module = write_project(dir.path(), r#"[{ "package": "org.example", "plugin_module": "MAGIC" }]"#);
    assert!(GeneratorConfig::load_from_file(&unknown_module).is_err());

    fs::write(dir.path().join("broken.json"), "{ not json").expect("write");
    assert!(GeneratorConfig::load_from_file(dir.path().join("broken.json")).is_err());
}
