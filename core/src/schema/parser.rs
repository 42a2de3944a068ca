//! file: core/src/schema/parser.rs
//! description: builds `ApiClass` declarations from `.api` source text.
//!
//! Each helper consumes one grammar rule and returns the matching model
//! type. Nested class declarations are flattened: the outer class records
//! their names and the declarations themselves land next to it.

use pest::Parser;
use pest::iterators::Pair;
use pest_derive::Parser;

use crate::error::{BlockwrightErrorExt, Level};
use crate::location::{Location, Span};
use crate::schema::err::SchemaError;
use crate::schema::model::{
    ApiClass, ApiConstructor, ApiField, ApiMethod, ApiParameter, ClassKind, Modifier, Modifiers, TypeRef,
};

#[derive(Parser)]
#[grammar = "schema/api.pest"]
pub struct ApiParser;

/// Parse a whole schema file into a flat list of classes, outer before nested.
pub fn parse_classes(source: &str, file: &str) -> Result<Vec<ApiClass>, Box<dyn BlockwrightErrorExt>> {
    let mut pairs = ApiParser::parse(Rule::schema, source).map_err(|e| syntax_error(e, file))?;
    let mut classes = Vec::new();
    if let Some(schema) = pairs.next() {
        for pair in schema.into_inner() {
            if pair.as_rule() == Rule::class_decl {
                parse_class(pair, file, None, &mut classes)?;
            }
        }
    }
    Ok(classes)
}

fn syntax_error(error: pest::error::Error<Rule>, file: &str) -> Box<dyn BlockwrightErrorExt> {
    let (line, column) = match error.line_col {
        pest::error::LineColLocation::Pos(pos) => pos,
        pest::error::LineColLocation::Span(start, _) => start,
    };
    let message = match &error.variant {
        pest::error::ErrorVariant::ParsingError { positives, .. } if !positives.is_empty() => {
            format!("Syntax error, expected one of {:?}", positives)
        }
        _ => format!("Syntax error: {}", error.variant.message()),
    };
    Box::new(SchemaError::with(
        Level::Error,
        message,
        "blockwright.schema.parser.parse",
        Some(Location::new(file.to_string(), line, column)),
        None,
    ))
}

fn is_deprecation(annotation: &Pair<'_, Rule>) -> bool {
    annotation
        .clone()
        .into_inner()
        .find(|p| p.as_rule() == Rule::qualified_name)
        .map(|name| matches!(name.as_str(), "Deprecated" | "java.lang.Deprecated"))
        .unwrap_or(false)
}

fn parse_type_ref(pair: Pair<'_, Rule>) -> TypeRef {
    let mut name = "";
    let mut dims = 0;
    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::qualified_name => name = inner.as_str(),
            Rule::array_dims => dims = inner.as_str().matches('[').count(),
            _ => {}
        }
    }
    TypeRef::new(name, dims)
}

fn parse_type_list(pair: Pair<'_, Rule>) -> Vec<TypeRef> {
    pair.into_inner()
        .filter(|p| p.as_rule() == Rule::type_list)
        .flat_map(|list| list.into_inner())
        .filter(|p| p.as_rule() == Rule::type_ref)
        .map(parse_type_ref)
        .collect()
}

fn parse_params(pair: Pair<'_, Rule>) -> Vec<ApiParameter> {
    pair.into_inner()
        .filter(|p| p.as_rule() == Rule::param)
        .map(|param| {
            let mut type_ref = TypeRef::new("", 0);
            let mut name = None;
            for inner in param.into_inner() {
                match inner.as_rule() {
                    Rule::type_ref => type_ref = parse_type_ref(inner),
                    Rule::ident => name = Some(inner.as_str().to_string()),
                    _ => {}
                }
            }
            ApiParameter { type_ref, name }
        })
        .collect()
}

struct Prelude {
    deprecated: bool,
    modifiers: Modifiers,
}

fn member_prelude<'i>(pairs: &[Pair<'i, Rule>]) -> Prelude {
    let deprecated = pairs
        .iter()
        .any(|p| p.as_rule() == Rule::annotation && is_deprecation(p));
    let modifiers = Modifiers::new(
        pairs
            .iter()
            .filter(|p| p.as_rule() == Rule::modifier)
            .filter_map(|p| Modifier::from_keyword(p.as_str())),
    );
    Prelude { deprecated, modifiers }
}

fn parse_member(pair: Pair<'_, Rule>, class: &mut ApiClass) {
    let inner: Vec<Pair<'_, Rule>> = pair.into_inner().collect();
    let prelude = member_prelude(&inner);
    let Some(body) = inner
        .into_iter()
        .find(|p| p.as_rule() == Rule::member_body)
        .and_then(|b| b.into_inner().next())
    else {
        return;
    };

    let rule = body.as_rule();
    let mut return_type = TypeRef::new("void", 0);
    let mut name = String::new();
    let mut parameters = Vec::new();
    let mut throws = Vec::new();
    for part in body.into_inner() {
        match part.as_rule() {
            Rule::type_ref => return_type = parse_type_ref(part),
            Rule::ident => name = part.as_str().to_string(),
            Rule::param_list => parameters = parse_params(part),
            Rule::throws_clause => throws = parse_type_list(part),
            _ => {}
        }
    }

    match rule {
        Rule::constructor_decl => class.constructors.push(ApiConstructor {
            modifiers: prelude.modifiers,
            deprecated: prelude.deprecated,
            parameters,
            throws,
        }),
        Rule::method_decl => class.methods.push(ApiMethod {
            modifiers: prelude.modifiers,
            deprecated: prelude.deprecated,
            return_type,
            name,
            parameters,
            throws,
        }),
        Rule::field_decl => class.fields.push(ApiField {
            modifiers: prelude.modifiers,
            deprecated: prelude.deprecated,
            type_ref: return_type,
            name,
        }),
        _ => {}
    }
}

fn parse_class(
    pair: Pair<'_, Rule>,
    file: &str,
    outer: Option<&str>,
    out: &mut Vec<ApiClass>,
) -> Result<(), Box<dyn BlockwrightErrorExt>> {
    const ISSUER: &str = "blockwright.schema.parser.parse_class";
    let location = Location::of_pair(&pair, file);
    let span = Span::of_pair(&pair, file);
    let inner: Vec<Pair<'_, Rule>> = pair.into_inner().collect();
    let prelude = member_prelude(&inner);

    let mut class = ApiClass {
        name: String::new(),
        kind: ClassKind::Class,
        modifiers: prelude.modifiers,
        deprecated: prelude.deprecated,
        anonymous: false,
        superclass: None,
        interfaces: Vec::new(),
        constructors: Vec::new(),
        methods: Vec::new(),
        fields: Vec::new(),
        nested: Vec::new(),
        location: location.clone(),
    };
    let mut extends = Vec::new();
    let mut implements = Vec::new();
    let mut nested_decls = Vec::new();

    for part in inner {
        match part.as_rule() {
            Rule::anonymous => class.anonymous = true,
            Rule::class_kind => class.kind = ClassKind::from_keyword(part.as_str()).unwrap_or(ClassKind::Class),
            Rule::qualified_name => class.name = part.as_str().to_string(),
            Rule::extends_clause => extends = parse_type_list(part),
            Rule::implements_clause => implements = parse_type_list(part),
            Rule::member => parse_member(part, &mut class),
            Rule::nested_ref => {
                if let Some(name) = part.into_inner().find(|p| p.as_rule() == Rule::qualified_name) {
                    class.nested.push(name.as_str().to_string());
                }
            }
            Rule::class_decl => nested_decls.push(part),
            _ => {}
        }
    }

    if let Some(outer) = outer {
        let prefix = format!("{}$", outer);
        if !class.name.starts_with(&prefix) || class.name.len() == prefix.len() {
            return Err(Box::new(SchemaError::with(
                Level::Error,
                format!("Nested class '{}' must be named '{}<Name>'", class.name, prefix),
                ISSUER,
                Some(location),
                Some(span),
            )));
        }
    }

    if class.kind.is_interface() {
        class.interfaces = extends.iter().chain(implements.iter()).map(TypeRef::type_name).collect();
    } else {
        if extends.len() > 1 {
            return Err(Box::new(SchemaError::with(
                Level::Error,
                format!("Class '{}' can only extend one class", class.name),
                ISSUER,
                Some(location),
                Some(span),
            )));
        }
        class.superclass = extends.first().map(TypeRef::type_name);
        class.interfaces = implements.iter().map(TypeRef::type_name).collect();
    }

    let name = class.name.clone();
    let index = out.len();
    out.push(class);
    for decl in nested_decls {
        let before = out.len();
        parse_class(decl, file, Some(&name), out)?;
        let nested_name = out[before].name.clone();
        out[index].nested.push(nested_name);
    }
    Ok(())
}
