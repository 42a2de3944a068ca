//! file: core/src/schema/model.rs
//! description: parsed API declarations and their signature strings.
//!
//! The `signature()` methods render members exactly the way the JVM's
//! reflective `toString` does (`public static int a.b.C.m(int,java.lang.String[])`).
//! Catalog ids are hashes of these strings, so the spelling must not drift.

use std::fmt;

use crate::location::Location;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Modifier {
    Public,
    Protected,
    Private,
    Abstract,
    Static,
    Final,
    Transient,
    Volatile,
    Synchronized,
    Native,
    Default,
}

impl Modifier {
    pub fn from_keyword(keyword: &str) -> Option<Modifier> {
        let modifier = match keyword {
            "public" => Modifier::Public,
            "protected" => Modifier::Protected,
            "private" => Modifier::Private,
            "abstract" => Modifier::Abstract,
            "static" => Modifier::Static,
            "final" => Modifier::Final,
            "transient" => Modifier::Transient,
            "volatile" => Modifier::Volatile,
            "synchronized" => Modifier::Synchronized,
            "native" => Modifier::Native,
            "default" => Modifier::Default,
            _ => return None,
        };
        Some(modifier)
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Modifier::Public => "public",
            Modifier::Protected => "protected",
            Modifier::Private => "private",
            Modifier::Abstract => "abstract",
            Modifier::Static => "static",
            Modifier::Final => "final",
            Modifier::Transient => "transient",
            Modifier::Volatile => "volatile",
            Modifier::Synchronized => "synchronized",
            Modifier::Native => "native",
            Modifier::Default => "default",
        }
    }
}

/// Modifier set, always rendered in canonical order whatever the source order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Modifiers(Vec<Modifier>);

impl Modifiers {
    pub fn new<I: IntoIterator<Item = Modifier>>(modifiers: I) -> Self {
        let mut list: Vec<Modifier> = modifiers.into_iter().collect();
        list.sort();
        list.dedup();
        Modifiers(list)
    }

    pub fn contains(&self, modifier: Modifier) -> bool {
        self.0.contains(&modifier)
    }

    pub fn is_public(&self) -> bool {
        self.contains(Modifier::Public)
    }

    pub fn is_static(&self) -> bool {
        self.contains(Modifier::Static)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `"public static "` style prefix; empty when there are no modifiers.
    fn prefix(&self) -> String {
        if self.0.is_empty() {
            String::new()
        } else {
            format!("{} ", self)
        }
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let words: Vec<&str> = self.0.iter().map(|m| m.keyword()).collect();
        write!(f, "{}", words.join(" "))
    }
}

const PRIMITIVE_DESCRIPTORS: &[(&str, &str)] = &[
    ("boolean", "Z"),
    ("byte", "B"),
    ("char", "C"),
    ("short", "S"),
    ("int", "I"),
    ("long", "J"),
    ("float", "F"),
    ("double", "D"),
];

/// A type as written in the schema: element name plus array depth.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeRef {
    pub name: String,
    pub dims: usize,
}

impl TypeRef {
    pub fn new(name: &str, dims: usize) -> Self {
        TypeRef { name: name.to_string(), dims }
    }

    pub fn is_void(&self) -> bool {
        self.dims == 0 && self.name == "void"
    }

    /// Reflective type name: `java.lang.String[]`, `org.Outer$Inner`.
    pub fn type_name(&self) -> String {
        format!("{}{}", self.name, "[]".repeat(self.dims))
    }

    /// Binary class name: `int`, `[I`, `[Ljava.lang.String;`.
    pub fn binary_name(&self) -> String {
        if self.dims == 0 {
            return self.name.clone();
        }
        let element = PRIMITIVE_DESCRIPTORS
            .iter()
            .find(|(name, _)| *name == self.name)
            .map(|(_, descriptor)| descriptor.to_string())
            .unwrap_or_else(|| format!("L{};", self.name));
        format!("{}{}", "[".repeat(self.dims), element)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassKind {
    Class,
    Interface,
    Enum,
    Annotation,
}

impl ClassKind {
    pub fn from_keyword(keyword: &str) -> Option<ClassKind> {
        match keyword {
            "class" => Some(ClassKind::Class),
            "interface" => Some(ClassKind::Interface),
            "enum" => Some(ClassKind::Enum),
            "@interface" => Some(ClassKind::Annotation),
            _ => None,
        }
    }

    pub fn is_interface(self) -> bool {
        matches!(self, ClassKind::Interface | ClassKind::Annotation)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiParameter {
    pub type_ref: TypeRef,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConstructor {
    pub modifiers: Modifiers,
    pub deprecated: bool,
    pub parameters: Vec<ApiParameter>,
    pub throws: Vec<TypeRef>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiMethod {
    pub modifiers: Modifiers,
    pub deprecated: bool,
    pub return_type: TypeRef,
    pub name: String,
    pub parameters: Vec<ApiParameter>,
    pub throws: Vec<TypeRef>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiField {
    pub modifiers: Modifiers,
    pub deprecated: bool,
    pub type_ref: TypeRef,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiClass {
    pub name: String,
    pub kind: ClassKind,
    pub modifiers: Modifiers,
    pub deprecated: bool,
    pub anonymous: bool,
    pub superclass: Option<String>,
    pub interfaces: Vec<String>,
    pub constructors: Vec<ApiConstructor>,
    pub methods: Vec<ApiMethod>,
    pub fields: Vec<ApiField>,
    /// Declared member classes, by name.
    pub nested: Vec<String>,
    pub location: Location,
}

fn parameter_types(parameters: &[ApiParameter]) -> String {
    parameters
        .iter()
        .map(|p| p.type_ref.type_name())
        .collect::<Vec<_>>()
        .join(",")
}

fn throws_suffix(throws: &[TypeRef]) -> String {
    if throws.is_empty() {
        String::new()
    } else {
        let names: Vec<String> = throws.iter().map(TypeRef::type_name).collect();
        format!(" throws {}", names.join(","))
    }
}

/// Parameter names, defaulting to `arg0, arg1, ...` where the schema omits them.
pub fn parameter_names(parameters: &[ApiParameter]) -> Vec<String> {
    parameters
        .iter()
        .enumerate()
        .map(|(i, p)| p.name.clone().unwrap_or_else(|| format!("arg{}", i)))
        .collect()
}

impl ApiClass {
    /// Package part of the class name.
    pub fn package(&self) -> &str {
        self.name.rsplit_once('.').map(|(package, _)| package).unwrap_or("")
    }

    /// Text after the last `.` or `$`.
    pub fn simple_name(&self) -> &str {
        self.name.rsplit(['.', '$']).next().unwrap_or(&self.name)
    }

    /// Top-level classes have no `$` in their own name.
    pub fn is_top_level(&self) -> bool {
        let own = self.name.rsplit_once('.').map(|(_, own)| own).unwrap_or(&self.name);
        !own.contains('$')
    }

    /// `class a.b.C` or `interface a.b.C`.
    pub fn signature(&self) -> String {
        let word = if self.kind.is_interface() { "interface" } else { "class" };
        format!("{} {}", word, self.name)
    }

    pub fn constructor_signature(&self, constructor: &ApiConstructor) -> String {
        format!(
            "{}{}({}){}",
            constructor.modifiers.prefix(),
            self.name,
            parameter_types(&constructor.parameters),
            throws_suffix(&constructor.throws)
        )
    }

    pub fn method_signature(&self, method: &ApiMethod) -> String {
        format!(
            "{}{} {}.{}({}){}",
            method.modifiers.prefix(),
            method.return_type.type_name(),
            self.name,
            method.name,
            parameter_types(&method.parameters),
            throws_suffix(&method.throws)
        )
    }

    pub fn field_signature(&self, field: &ApiField) -> String {
        format!("{}{} {}.{}", field.modifiers.prefix(), field.type_ref.type_name(), self.name, field.name)
    }
}
