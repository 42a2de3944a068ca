use blockwright_core::blocks::record::load_tree;
use blockwright_core::catalog::hash;
use blockwright_core::config::{ConfigError, run_generator_with};
use blockwright_core::error::worst_level;
use blockwright_core::{
    ApiSchema, BlockTree, BlockwrightErrorExt, Catalog, GeneratorConfig, Localization, TypeHierarchy,
    emit_program, registry_from_catalog,
};
use clap::{Arg, ArgAction, ArgMatches, Command};
use log::{debug, info};
use std::fs;
use std::io::Write;
use std::path::PathBuf;

mod report;

use report::FormatStyle;

fn main() {
    let cli = Command::new("blockwright")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Generate block catalogs and emit plugin source from block programs")
        .arg_required_else_help(true);

    let cli = setup_cli(cli);
    let matches = cli.get_matches();
    init_logging(matches.get_count("verbose"));
    let code = dispatch_commands(&matches);
    let _ = std::io::stdout().flush();
    std::process::exit(code);
}

/// Default filter is `warn`; each `-v` raises it one step. `RUST_LOG` wins.
fn init_logging(verbosity: u8) {
    let default = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default)).init();
}

fn setup_cli(cli: Command) -> Command {
    cli.arg(
        Arg::new("verbose")
            .help("Increase log output (repeat for more)")
            .short('v')
            .long("verbose")
            .action(ArgAction::Count)
            .global(true),
    )
    .subcommand(
        Command::new("generate")
            .about("Run the catalog generator described by a config file")
            .arg(
                Arg::new("config")
                    .help("The generator config (JSON)")
                    .required(true)
                    .index(1),
            )
            .arg(
                Arg::new("output")
                    .help("Override the config's output directory")
                    .short('o')
                    .long("output")
                    .value_parser(clap::value_parser!(PathBuf))
                    .value_name("DIR"),
            ),
    )
    .subcommand(
        Command::new("emit")
            .about("Emit the plugin main class for a saved block program")
            .arg(
                Arg::new("tree")
                    .help("The saved block program (JSON)")
                    .required(true)
                    .index(1),
            )
            .arg(
                Arg::new("catalog")
                    .help("Catalog the program's blocks come from")
                    .long("catalog")
                    .required(true)
                    .value_parser(clap::value_parser!(PathBuf))
                    .value_name("FILE"),
            )
            .arg(
                Arg::new("lang")
                    .help("Localization labels for the catalog")
                    .long("lang")
                    .value_parser(clap::value_parser!(PathBuf))
                    .value_name("FILE"),
            )
            .arg(
                Arg::new("schema")
                    .help("API schema files used for type checks")
                    .long("schema")
                    .action(ArgAction::Append)
                    .value_name("GLOB"),
            )
            .arg(
                Arg::new("package")
                    .help("Package of the generated main class")
                    .long("package")
                    .default_value("com.example.plugin")
                    .value_name("PACKAGE"),
            )
            .arg(
                Arg::new("output")
                    .help("Write the source here instead of stdout")
                    .short('o')
                    .long("output")
                    .value_parser(clap::value_parser!(PathBuf))
                    .value_name("FILE"),
            ),
    )
    .subcommand(
        Command::new("catalog")
            .about("List catalog entries")
            .arg(
                Arg::new("blocks")
                    .help("The catalog file")
                    .required(true)
                    .index(1),
            )
            .arg(
                Arg::new("lang")
                    .help("Localization labels for titles")
                    .long("lang")
                    .value_parser(clap::value_parser!(PathBuf))
                    .value_name("FILE"),
            )
            .arg(
                Arg::new("filter")
                    .help("Only show entries whose id, title or member contains TEXT")
                    .long("filter")
                    .value_name("TEXT"),
            )
            .arg(
                Arg::new("json")
                    .help("Print the listing as JSON instead of a table")
                    .long("json")
                    .action(ArgAction::SetTrue),
            ),
    )
    .subcommand(
        Command::new("hash")
            .about("Print the catalog id of a signature string")
            .arg(
                Arg::new("signature")
                    .help("Reflective signature, e.g. 'public org.example.Foo()'")
                    .required(true)
                    .index(1),
            ),
    )
}

/// Runs the selected subcommand and returns the process exit code.
fn dispatch_commands(matches: &ArgMatches) -> i32 {
    let style = FormatStyle::default();
    let result = match matches.subcommand() {
        Some(("generate", sub_m)) => run_generate(sub_m, &style),
        Some(("emit", sub_m)) => run_emit(sub_m, &style),
        Some(("catalog", sub_m)) => run_catalog(sub_m),
        Some(("hash", sub_m)) => {
            let signature = sub_m.get_one::<String>("signature").map(String::as_str).unwrap_or_default();
            println!("{}", hash(signature));
            Ok(0)
        }
        _ => {
            eprintln!("No valid subcommand was used. Use --help for more information.");
            Ok(1)
        }
    };
    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}", style.diagnostic(e.as_ref()));
            1
        }
    }
}

fn run_generate(sub_m: &ArgMatches, style: &FormatStyle) -> Result<i32, Box<dyn BlockwrightErrorExt>> {
    let path = sub_m.get_one::<String>("config").map(String::as_str).unwrap_or_default();
    let mut config = GeneratorConfig::load_from_file(path)?;
    debug!("{} generator jobs from {}", config.jobs.len(), path);
    if let Some(output) = sub_m.get_one::<PathBuf>("output") {
        config.output_dir = output.clone();
    }

    let progress = report::job_progress(config.jobs.len());
    let summary = run_generator_with(&config, |_, job, added| {
        progress.set_message(format!("{} (+{})", job.describe(), added));
        progress.inc(1);
    });
    progress.finish_and_clear();
    let summary = summary?;

    println!("{}", style.title.apply_to("Catalog generation"));
    println!("{}", report::summary_table(&summary));
    println!(
        "{} {}",
        style.success.apply_to("Wrote"),
        config.output_dir.join(&config.blocks_file).display()
    );
    Ok(0)
}

fn run_emit(sub_m: &ArgMatches, style: &FormatStyle) -> Result<i32, Box<dyn BlockwrightErrorExt>> {
    let tree_path = sub_m.get_one::<String>("tree").map(String::as_str).unwrap_or_default();
    let catalog = match sub_m.get_one::<PathBuf>("catalog") {
        Some(path) => Catalog::load(path)?,
        None => Catalog::new(),
    };
    let labels = match sub_m.get_one::<PathBuf>("lang") {
        Some(path) => Localization::load(path)?,
        None => Localization::new(),
    };
    let registry = registry_from_catalog(&catalog, &labels);

    let mut hierarchy = TypeHierarchy::with_builtins();
    if let Some(patterns) = sub_m.get_many::<String>("schema") {
        let mut schema = ApiSchema::new();
        for pattern in patterns {
            schema.add_glob(pattern)?;
        }
        hierarchy.extend_from_schema(&schema);
    }
    let mut tree = BlockTree::with_hierarchy(hierarchy);

    let dropped = load_tree(tree_path, &registry, &mut tree)?;
    info!("loaded {} root blocks from {}", tree.roots().len(), tree_path);
    for error in &dropped {
        eprintln!("{}", style.diagnostic(error.as_ref()));
    }
    if let Some(level) = worst_level(&dropped) {
        let summary = format!("{} block record(s) dropped while loading {}", dropped.len(), tree_path);
        eprintln!("{}", style.for_level(level).apply_to(summary));
    }
    for diagnostic in tree.diagnostics() {
        eprintln!("{}", style.diagnostic(&diagnostic));
    }

    let package = sub_m.get_one::<String>("package").map(String::as_str).unwrap_or("com.example.plugin");
    let program = emit_program(&tree, package);
    match sub_m.get_one::<PathBuf>("output") {
        Some(path) => fs::write(path, &program.source).map_err(|e| {
            ConfigError::boxed(format!("write output: {}", e), "blockwright.cli.emit", Some(path))
        })?,
        None => print!("{}", program.source),
    }

    if !program.modules.is_empty() {
        eprintln!("{}", style.info.apply_to("Plugin modules:"));
        for module in &program.modules {
            eprintln!("  {} (ships {})", module, module.support_classes().join(", "));
        }
    }
    if !program.compilable {
        eprintln!("{}", style.error.apply_to("Program has invalid blocks and will not compile"));
        Ok(2)
    } else if !dropped.is_empty() {
        eprintln!("{}", style.error.apply_to("Program is incomplete: some saved blocks could not be loaded"));
        Ok(2)
    } else {
        Ok(0)
    }
}

fn run_catalog(sub_m: &ArgMatches) -> Result<i32, Box<dyn BlockwrightErrorExt>> {
    let path = sub_m.get_one::<String>("blocks").map(String::as_str).unwrap_or_default();
    let catalog = Catalog::load(path)?;
    let labels = match sub_m.get_one::<PathBuf>("lang") {
        Some(path) => Localization::load(path)?,
        None => Localization::new(),
    };
    let filter = sub_m.get_one::<String>("filter");
    let rows: Vec<report::CatalogRow> = catalog
        .iter()
        .filter(|entry| filter.is_none_or(|f| report::matches_filter(entry, &labels, f)))
        .map(|entry| report::CatalogRow::new(entry, &labels))
        .collect();
    debug!("listing {} of {} catalog entries", rows.len(), catalog.len());

    if sub_m.get_flag("json") {
        let json = serde_json::to_string_pretty(&rows).map_err(|e| {
            ConfigError::boxed(format!("encode listing: {}", e), "blockwright.cli.catalog", None)
        })?;
        println!("{}", json);
    } else {
        println!("{}", report::catalog_table(&rows));
    }
    Ok(0)
}
