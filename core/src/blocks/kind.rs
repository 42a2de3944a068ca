//! file: core/src/blocks/kind.rs
//! description: closed set of block kinds and their dispatch tables.
//!
//! Every block kind maps to one emission function and one validation
//! function. New kinds add a variant here and an arm in each table.

use std::fmt;

use super::emit::{self, EmitContext};
use super::validate::{self, ValidateContext};

pub type EmitFn = fn(&EmitContext<'_>) -> String;
pub type ValidateFn = fn(&ValidateContext<'_>) -> Result<(), String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    StringLiteral,
    NumberLiteral,
    BooleanLiteral,
    CombineStrings,
    NegateBoolean,
    ColoredString,
    DirectoryFiles,
    NewConfig,
    EventInstance,

    IfStatement,
    ElseIfStatement,
    ElseStatement,
    WhileLoop,

    Constructor,
    MethodCall,
    FieldAccess,
    EventHandler,
}

/// Where a block may be placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockRole {
    /// Produces a value; lives in a parameter slot.
    Expression,
    /// Lives in a sequence.
    Statement,
    /// Lives in a sequence and owns a child sequence.
    Container,
}

impl BlockRole {
    pub fn is_sequence_member(self) -> bool {
        matches!(self, BlockRole::Statement | BlockRole::Container)
    }
}

impl BlockKind {
    pub fn emitter(self) -> EmitFn {
        match self {
            BlockKind::StringLiteral | BlockKind::NumberLiteral | BlockKind::BooleanLiteral => {
                emit::first_argument
            }
            BlockKind::CombineStrings => emit::combine_strings,
            BlockKind::NegateBoolean => emit::negate_boolean,
            BlockKind::ColoredString => emit::colored_string,
            BlockKind::DirectoryFiles => emit::directory_files,
            BlockKind::NewConfig => emit::new_config,
            BlockKind::EventInstance => emit::event_instance,
            BlockKind::IfStatement => emit::if_statement,
            BlockKind::ElseIfStatement => emit::else_if_statement,
            BlockKind::ElseStatement => emit::else_statement,
            BlockKind::WhileLoop => emit::while_loop,
            BlockKind::Constructor => emit::constructor,
            BlockKind::MethodCall => emit::method_call,
            BlockKind::FieldAccess => emit::field_access,
            BlockKind::EventHandler => emit::event_handler,
        }
    }

    pub fn validator(self) -> ValidateFn {
        match self {
            BlockKind::NumberLiteral => validate::number_literal,
            BlockKind::EventInstance => validate::inside_event_handler,
            BlockKind::ElseIfStatement | BlockKind::ElseStatement => validate::follows_if_branch,
            BlockKind::EventHandler => validate::top_level_only,
            _ => validate::always_valid,
        }
    }

    /// Kinds an else/else-if may directly follow.
    pub fn opens_branch(self) -> bool {
        matches!(self, BlockKind::IfStatement | BlockKind::ElseIfStatement)
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BlockKind::StringLiteral => "StringLiteral",
            BlockKind::NumberLiteral => "NumberLiteral",
            BlockKind::BooleanLiteral => "BooleanLiteral",
            BlockKind::CombineStrings => "CombineStrings",
            BlockKind::NegateBoolean => "NegateBoolean",
            BlockKind::ColoredString => "ColoredString",
            BlockKind::DirectoryFiles => "DirectoryFiles",
            BlockKind::NewConfig => "NewConfig",
            BlockKind::EventInstance => "EventInstance",
            BlockKind::IfStatement => "IfStatement",
            BlockKind::ElseIfStatement => "ElseIfStatement",
            BlockKind::ElseStatement => "ElseStatement",
            BlockKind::WhileLoop => "WhileLoop",
            BlockKind::Constructor => "Constructor",
            BlockKind::MethodCall => "MethodCall",
            BlockKind::FieldAccess => "FieldAccess",
            BlockKind::EventHandler => "EventHandler",
        };
        write!(f, "{}", name)
    }
}
