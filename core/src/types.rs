//! file: core/src/types.rs
//! description: target-platform type descriptors and compatibility checks.
//!
//! A `TypeDescriptor` names a platform class by its binary name (the form the
//! catalog stores, e.g. `java.lang.String`, `int`, `[Ljava.lang.String;`).
//! Compatibility between an expected type and a value type goes through a
//! `TypeHierarchy` so that e.g. a `java.util.List` slot accepts an
//! `java.util.ArrayList` value.

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

const OBJECT_NAME: &str = "java.lang.Object";
const ANY_NAME: &str = "?";

const NUMERIC: &[&str] = &[
    "byte",
    "short",
    "int",
    "long",
    "float",
    "double",
    "java.lang.Byte",
    "java.lang.Short",
    "java.lang.Integer",
    "java.lang.Long",
    "java.lang.Float",
    "java.lang.Double",
    "java.lang.Number",
];

const BOXES: &[(&str, &str)] = &[
    ("boolean", "java.lang.Boolean"),
    ("char", "java.lang.Character"),
    ("byte", "java.lang.Byte"),
    ("short", "java.lang.Short"),
    ("int", "java.lang.Integer"),
    ("long", "java.lang.Long"),
    ("float", "java.lang.Float"),
    ("double", "java.lang.Double"),
];

lazy_static! {
    /// Direct supertypes of well-known platform classes. Schema files can add more.
    static ref BUILTIN_SUPERTYPES: HashMap<&'static str, Vec<&'static str>> = {
        let mut m = HashMap::new();
        m.insert("java.lang.String", vec!["java.lang.CharSequence", "java.lang.Comparable"]);
        m.insert("java.util.Collection", vec!["java.lang.Iterable"]);
        m.insert("java.util.List", vec!["java.util.Collection"]);
        m.insert("java.util.Set", vec!["java.util.Collection"]);
        m.insert("java.util.Queue", vec!["java.util.Collection"]);
        m.insert("java.util.Deque", vec!["java.util.Queue"]);
        m.insert("java.util.ArrayList", vec!["java.util.List"]);
        m.insert("java.util.LinkedList", vec!["java.util.List", "java.util.Deque"]);
        m.insert("java.util.concurrent.CopyOnWriteArrayList", vec!["java.util.List"]);
        m.insert("java.util.HashSet", vec!["java.util.Set"]);
        m.insert("java.util.LinkedHashSet", vec!["java.util.HashSet"]);
        m.insert("java.util.TreeSet", vec!["java.util.Set"]);
        m.insert("java.util.HashMap", vec!["java.util.Map"]);
        m.insert("java.util.LinkedHashMap", vec!["java.util.HashMap"]);
        m.insert("java.util.TreeMap", vec!["java.util.Map"]);
        m.insert("org.bukkit.configuration.file.YamlConfiguration", vec!["org.bukkit.configuration.file.FileConfiguration"]);
        m.insert("org.bukkit.configuration.file.FileConfiguration", vec!["org.bukkit.configuration.MemoryConfiguration"]);
        m.insert("org.bukkit.configuration.MemoryConfiguration", vec!["org.bukkit.configuration.MemorySection", "org.bukkit.configuration.Configuration"]);
        m.insert("org.bukkit.configuration.MemorySection", vec!["org.bukkit.configuration.ConfigurationSection"]);
        m.insert("org.bukkit.configuration.Configuration", vec!["org.bukkit.configuration.ConfigurationSection"]);
        m
    };
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeDescriptor {
    qualified_name: String,
}

impl TypeDescriptor {
    pub fn of(qualified_name: impl Into<String>) -> Self {
        TypeDescriptor { qualified_name: qualified_name.into() }
    }

    /// Expected-type sentinel: accepts a value of any type.
    pub fn object() -> Self {
        Self::of(OBJECT_NAME)
    }

    /// Value-type sentinel: accepted by any expected type.
    pub fn any() -> Self {
        Self::of(ANY_NAME)
    }

    pub fn string() -> Self {
        Self::of("java.lang.String")
    }

    pub fn boolean() -> Self {
        Self::of("boolean")
    }

    pub fn number() -> Self {
        Self::of("java.lang.Number")
    }

    pub fn list() -> Self {
        Self::of("java.util.List")
    }

    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    pub fn is_object(&self) -> bool {
        self.qualified_name == OBJECT_NAME
    }

    pub fn is_any(&self) -> bool {
        self.qualified_name == ANY_NAME
    }

    pub fn is_string(&self) -> bool {
        self.qualified_name == "java.lang.String"
    }

    pub fn is_numeric(&self) -> bool {
        NUMERIC.contains(&self.qualified_name.as_str())
    }

    /// Name as written in Java source: nested `$` separators become `.` and
    /// JVM array descriptors (`[Ljava.lang.String;`, `[[I`) become `T[]`.
    pub fn source_name(&self) -> String {
        let (component, dims) = split_array_descriptor(&self.qualified_name);
        let mut out = component.replace('$', ".");
        for _ in 0..dims {
            out.push_str("[]");
        }
        out
    }

    /// Unqualified class name, e.g. `Inner` for `a.b.Outer$Inner`.
    pub fn simple_name(&self) -> String {
        let (component, dims) = split_array_descriptor(&self.qualified_name);
        let start = component.rfind(['.', '$']).map(|i| i + 1).unwrap_or(0);
        let mut out = component[start..].to_string();
        for _ in 0..dims {
            out.push_str("[]");
        }
        out
    }

    /// Whether a slot of this (expected) type can hold a value of type `value`.
    pub fn accepts(&self, value: &TypeDescriptor, hierarchy: &TypeHierarchy) -> bool {
        if self == value || self.is_object() || value.is_any() {
            return true;
        }
        if self.is_numeric() && value.is_numeric() {
            return true;
        }
        if boxed_equivalent(&self.qualified_name, &value.qualified_name) {
            return true;
        }
        hierarchy.is_subtype(&value.qualified_name, &self.qualified_name)
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.qualified_name)
    }
}

fn boxed_equivalent(a: &str, b: &str) -> bool {
    BOXES
        .iter()
        .any(|(prim, boxed)| (a == *prim && b == *boxed) || (a == *boxed && b == *prim))
}

fn split_array_descriptor(name: &str) -> (String, usize) {
    let dims = name.chars().take_while(|c| *c == '[').count();
    if dims == 0 {
        return (name.to_string(), 0);
    }
    let rest = &name[dims..];
    let component = match rest {
        "Z" => "boolean".to_string(),
        "B" => "byte".to_string(),
        "C" => "char".to_string(),
        "S" => "short".to_string(),
        "I" => "int".to_string(),
        "J" => "long".to_string(),
        "F" => "float".to_string(),
        "D" => "double".to_string(),
        other => other
            .strip_prefix('L')
            .and_then(|s| s.strip_suffix(';'))
            .unwrap_or(other)
            .to_string(),
    };
    (component, dims)
}

/// Direct-supertype table used for compatibility widening.
#[derive(Debug, Clone, Default)]
pub struct TypeHierarchy {
    supertypes: HashMap<String, Vec<String>>,
}

impl TypeHierarchy {
    /// An empty hierarchy: only exact matches and sentinels are compatible.
    pub fn new() -> Self {
        Self::default()
    }

    /// Hierarchy seeded with well-known JDK and platform relations.
    pub fn with_builtins() -> Self {
        let mut h = Self::new();
        for (sub, sups) in BUILTIN_SUPERTYPES.iter() {
            h.register(sub, sups.iter().copied());
        }
        h
    }

    pub fn register<I, S>(&mut self, subtype: &str, supertypes: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entry = self.supertypes.entry(subtype.to_string()).or_default();
        for sup in supertypes {
            let sup = sup.into();
            if !entry.contains(&sup) {
                entry.push(sup);
            }
        }
    }

    /// Record the `extends`/`implements` relations declared in a schema.
    pub fn extend_from_schema(&mut self, schema: &crate::schema::ApiSchema) {
        for class in schema.classes() {
            let sups: Vec<String> = class
                .superclass
                .iter()
                .chain(class.interfaces.iter())
                .cloned()
                .collect();
            if !sups.is_empty() {
                self.register(&class.name, sups);
            }
        }
    }

    pub fn is_subtype(&self, sub: &str, sup: &str) -> bool {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut queue: VecDeque<&str> = VecDeque::new();
        queue.push_back(sub);
        while let Some(current) = queue.pop_front() {
            if current == sup {
                return true;
            }
            if !seen.insert(current) {
                continue;
            }
            if let Some(parents) = self.supertypes.get(current) {
                queue.extend(parents.iter().map(String::as_str));
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_accepts_registered_subtypes() {
        let h = TypeHierarchy::with_builtins();
        let list = TypeDescriptor::list();
        assert!(list.accepts(&TypeDescriptor::of("java.util.ArrayList"), &h));
        assert!(list.accepts(&TypeDescriptor::of("java.util.LinkedList"), &h));
        assert!(!list.accepts(&TypeDescriptor::of("java.util.HashSet"), &h));
        assert!(!TypeDescriptor::of("java.util.ArrayList").accepts(&list, &h));
    }

    #[test]
    fn sentinels_bridge_in_both_directions() {
        let h = TypeHierarchy::new();
        assert!(TypeDescriptor::object().accepts(&TypeDescriptor::of("org.example.Foo"), &h));
        assert!(TypeDescriptor::of("org.example.Foo").accepts(&TypeDescriptor::any(), &h));
        assert!(!TypeDescriptor::of("org.example.Foo").accepts(&TypeDescriptor::object(), &h));
    }

    #[test]
    fn numbers_and_boxes_are_interchangeable() {
        let h = TypeHierarchy::new();
        assert!(TypeDescriptor::of("int").accepts(&TypeDescriptor::number(), &h));
        assert!(TypeDescriptor::boolean().accepts(&TypeDescriptor::of("java.lang.Boolean"), &h));
        assert!(!TypeDescriptor::boolean().accepts(&TypeDescriptor::of("int"), &h));
    }

    #[test]
    fn source_and_simple_names() {
        let t = TypeDescriptor::of("[Lorg.example.Outer$Inner;");
        assert_eq!(t.source_name(), "org.example.Outer.Inner[]");
        assert_eq!(t.simple_name(), "Inner[]");
        assert_eq!(TypeDescriptor::of("[[I").source_name(), "int[][]");
        assert_eq!(TypeDescriptor::of("int").simple_name(), "int");
    }

    #[test]
    fn hierarchy_walk_survives_cycles() {
        let mut h = TypeHierarchy::new();
        h.register("a.A", ["a.B"]);
        h.register("a.B", ["a.A"]);
        assert!(!h.is_subtype("a.A", "a.C"));
        assert!(h.is_subtype("a.B", "a.A"));
    }
}
