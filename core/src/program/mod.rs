//! file: core/src/program/mod.rs
//! description: assembles a block tree into a complete plugin main class.
//!
//! Root event handlers become listener methods of the main class; every other
//! root block runs on enable. Catalog blocks may tag a plugin module, and each
//! module used anywhere in the tree injects its own setup code.

use std::collections::BTreeSet;
use std::fmt;

use log::warn;

use crate::blocks::{BlockKind, BlockTree};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PluginModule {
    Bstats,
    Database,
    Duration,
    ReflectionUtil,
    Worldguard,
    Vault,
    Gui,
    PlaceholderApi,
    Variables,
}

impl PluginModule {
    pub const ALL: [PluginModule; 9] = [
        PluginModule::Bstats,
        PluginModule::Database,
        PluginModule::Duration,
        PluginModule::ReflectionUtil,
        PluginModule::Worldguard,
        PluginModule::Vault,
        PluginModule::Gui,
        PluginModule::PlaceholderApi,
        PluginModule::Variables,
    ];

    /// Tag written in the `plugin-module` key of catalog entries. Always upper
    /// case; `from_tag` still reads older mixed-case tags.
    pub fn tag(self) -> &'static str {
        match self {
            PluginModule::Bstats => "BSTATS",
            PluginModule::Database => "DATABASE",
            PluginModule::Duration => "DURATION",
            PluginModule::ReflectionUtil => "REFLECTION_UTIL",
            PluginModule::Worldguard => "WORLDGUARD",
            PluginModule::Vault => "VAULT",
            PluginModule::Gui => "GUI",
            PluginModule::PlaceholderApi => "PLACEHOLDERAPI",
            PluginModule::Variables => "VARIABLES",
        }
    }

    /// Case-insensitive tag lookup.
    pub fn from_tag(tag: &str) -> Option<PluginModule> {
        PluginModule::ALL
            .iter()
            .copied()
            .find(|m| m.tag().eq_ignore_ascii_case(tag.trim()))
    }

    /// Support classes the module ships with the generated plugin.
    pub fn support_classes(self) -> &'static [&'static str] {
        match self {
            PluginModule::Bstats => &["org.bstats.bukkit.Metrics"],
            PluginModule::Database => &["DatabaseManager"],
            PluginModule::Duration => &["Duration"],
            PluginModule::ReflectionUtil => &["ReflectionUtil"],
            PluginModule::Worldguard => &["WorldGuardHook"],
            PluginModule::Vault => &["VaultHook"],
            PluginModule::Gui => &["GuiManager", "GuiIdentifier"],
            PluginModule::PlaceholderApi => &["ExpansionHandler", "PapiExpansion", "PlaceholderEvent"],
            PluginModule::Variables => &["VariableManager"],
        }
    }

    /// Inject the module's setup code into the main class.
    pub fn insert_into(self, main: &mut MainClass) {
        match self {
            PluginModule::Gui => {
                main.append_enable("getServer().getPluginManager().registerEvents(GuiManager.getInstance(), this);");
            }
            PluginModule::PlaceholderApi => {
                main.append_enable(
                    "if (Bukkit.getPluginManager().getPlugin(\"PlaceholderAPI\") != null) {ExpansionHandler.register(this);}",
                );
            }
            PluginModule::Variables => {
                main.prepend_enable("VariableManager.loadVariables(this);");
                main.append_disable("VariableManager.saveVariables();");
            }
            _ => {}
        }
    }
}

impl fmt::Display for PluginModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

const CREATE_LIST: &str = "    public static List<Object> createList(Object obj) {
        List<Object> list = new ArrayList<>();
        if (obj == null) {
            return list;
        }
        if (obj.getClass().isArray()) {
            int length = java.lang.reflect.Array.getLength(obj);
            for (int i = 0; i < length; i++) {
                list.add(java.lang.reflect.Array.get(obj, i));
            }
        } else if (obj instanceof Collection) {
            list.addAll((Collection<?>) obj);
        } else {
            list.add(obj);
        }
        return list;
    }
";

/// The generated plugin's main class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MainClass {
    pub package: String,
    pub name: String,
    pub enable_body: String,
    pub disable_body: String,
    pub members: Vec<String>,
}

impl MainClass {
    pub fn new(package: &str) -> Self {
        MainClass {
            package: package.to_string(),
            name: "PluginMain".to_string(),
            enable_body: String::new(),
            disable_body: String::new(),
            members: Vec::new(),
        }
    }

    pub fn append_enable(&mut self, source: &str) {
        self.enable_body.push_str(source);
    }

    pub fn prepend_enable(&mut self, source: &str) {
        self.enable_body.insert_str(0, source);
    }

    pub fn append_disable(&mut self, source: &str) {
        self.disable_body.push_str(source);
    }

    pub fn add_member(&mut self, source: String) {
        self.members.push(source);
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        if !self.package.is_empty() {
            out.push_str(&format!("package {};\n\n", self.package));
        }
        out.push_str("import org.bukkit.*;\n");
        out.push_str("import org.bukkit.event.*;\n");
        out.push_str("import org.bukkit.plugin.java.JavaPlugin;\n");
        out.push_str("import java.util.*;\n\n");
        out.push_str(&format!("public class {} extends JavaPlugin implements Listener {{\n\n", self.name));
        out.push_str(&format!("    private static {} instance;\n\n", self.name));
        out.push_str("    @Override\n    public void onEnable() {\n");
        out.push_str("        instance = this;\n");
        out.push_str("        getServer().getPluginManager().registerEvents(this, this);\n");
        if !self.enable_body.is_empty() {
            out.push_str(&format!("        {}\n", self.enable_body));
        }
        out.push_str("    }\n\n");
        out.push_str("    @Override\n    public void onDisable() {\n");
        if !self.disable_body.is_empty() {
            out.push_str(&format!("        {}\n", self.disable_body));
        }
        out.push_str("    }\n\n");
        out.push_str(&format!("    public static {} getInstance() {{\n        return instance;\n    }}\n\n", self.name));
        out.push_str(CREATE_LIST);
        for member in &self.members {
            out.push_str(&format!("\n    {}\n", member));
        }
        out.push_str("}\n");
        out
    }
}

/// Result of assembling a tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramSource {
    pub source: String,
    pub modules: Vec<PluginModule>,
    pub compilable: bool,
}

/// Plugin modules tagged by any node of the tree, in declaration order.
pub fn collect_modules(tree: &BlockTree) -> Vec<PluginModule> {
    let mut modules = BTreeSet::new();
    for id in tree.ids() {
        let Some(tag) = tree.get(id).and_then(|n| n.definition().plugin_module()) else {
            continue;
        };
        match PluginModule::from_tag(tag) {
            Some(module) => {
                modules.insert(module);
            }
            None => warn!("unknown plugin module '{}' on block {}", tag, id),
        }
    }
    modules.into_iter().collect()
}

/// Render the whole tree as the plugin's main class.
pub fn emit_program(tree: &BlockTree, package: &str) -> ProgramSource {
    let mut main = MainClass::new(package);
    for root in tree.roots() {
        let Some(node) = tree.get(*root) else { continue };
        let source = tree.emit_source(*root);
        if node.definition().kind() == BlockKind::EventHandler {
            main.add_member(source);
        } else {
            main.append_enable(&source);
        }
    }
    let modules = collect_modules(tree);
    for module in &modules {
        module.insert_into(&mut main);
    }
    ProgramSource {
        source: main.render(),
        modules,
        compilable: tree.is_compilable(),
    }
}
