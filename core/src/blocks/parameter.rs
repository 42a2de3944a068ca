//! file: core/src/blocks/parameter.rs
//! description: typed parameter slots and the bounded parameter list.
//!
//! A `Parameter` is one hole in a block: a literal typed by the user, an
//! expression slot that may hold a nested block, or a choice among fixed
//! options. `ParameterList` keeps a block's parameters inside the
//! `[min, max]` bounds its definition declares; every mutation checks them.

use crate::blocks::NodeId;
use crate::types::TypeDescriptor;

/// Shape of one parameter as declared by a definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterSpec {
    Literal { expected: TypeDescriptor, default: String },
    Expression { expected: TypeDescriptor },
    Choice { options: Vec<String> },
}

impl ParameterSpec {
    pub fn literal(expected: TypeDescriptor, default: &str) -> Self {
        ParameterSpec::Literal { expected, default: default.to_string() }
    }

    pub fn expression(expected: TypeDescriptor) -> Self {
        ParameterSpec::Expression { expected }
    }

    pub fn choice(options: &[&str]) -> Self {
        ParameterSpec::Choice {
            options: options.iter().map(|o| o.to_string()).collect(),
        }
    }

    pub fn expected_type(&self) -> TypeDescriptor {
        match self {
            ParameterSpec::Literal { expected, .. } | ParameterSpec::Expression { expected } => {
                expected.clone()
            }
            ParameterSpec::Choice { .. } => TypeDescriptor::string(),
        }
    }

    /// Fresh parameter carrying the spec's default value.
    pub fn instantiate(&self) -> Parameter {
        let value = match self {
            ParameterSpec::Literal { default, .. } => ParameterValue::Literal(default.clone()),
            ParameterSpec::Expression { .. } => ParameterValue::Expression(None),
            ParameterSpec::Choice { options } => ParameterValue::Choice {
                options: options.clone(),
                selected: 0,
            },
        };
        Parameter { expected_type: self.expected_type(), value }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterValue {
    Literal(String),
    /// Expression slot; the nested node (if any) is owned by this parameter.
    Expression(Option<NodeId>),
    Choice { options: Vec<String>, selected: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    expected_type: TypeDescriptor,
    value: ParameterValue,
}

impl Parameter {
    pub fn expected_type(&self) -> &TypeDescriptor {
        &self.expected_type
    }

    pub fn value(&self) -> &ParameterValue {
        &self.value
    }

    /// Nested block held by an expression slot.
    pub fn nested(&self) -> Option<NodeId> {
        match self.value {
            ParameterValue::Expression(nested) => nested,
            _ => None,
        }
    }

    /// Currently selected option of a choice parameter.
    pub fn selected(&self) -> Option<&str> {
        match &self.value {
            ParameterValue::Choice { options, selected } => options.get(*selected).map(String::as_str),
            _ => None,
        }
    }

    pub(crate) fn value_mut(&mut self) -> &mut ParameterValue {
        &mut self.value
    }
}

/// Ordered parameters of one node, bounded to `[min, max]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterList {
    items: Vec<Parameter>,
    min: usize,
    max: usize,
    growth: Option<ParameterSpec>,
}

impl ParameterList {
    /// A list whose length never changes.
    pub fn fixed(items: Vec<Parameter>) -> Self {
        let len = items.len();
        ParameterList { items, min: len, max: len, growth: None }
    }

    /// A list that grows by appending `growth` parameters, filled to `min` up front.
    pub fn growable(items: Vec<Parameter>, growth: ParameterSpec, min: usize, max: usize) -> Self {
        let mut list = ParameterList {
            min: min.max(items.len()),
            max: max.max(min).max(items.len()),
            items,
            growth: Some(growth),
        };
        while list.items.len() < list.min {
            if !list.increase() {
                break;
            }
        }
        list
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Inclusive `(min, max)` bounds.
    pub fn bounds(&self) -> (usize, usize) {
        (self.min, self.max)
    }

    pub fn is_growable(&self) -> bool {
        self.growth.is_some() && self.min < self.max
    }

    pub fn get(&self, index: usize) -> Option<&Parameter> {
        self.items.get(index)
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut Parameter> {
        self.items.get_mut(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Parameter> {
        self.items.iter()
    }

    /// Nested blocks held by every expression slot, in order.
    pub fn nested_nodes(&self) -> Vec<NodeId> {
        self.items.iter().filter_map(Parameter::nested).collect()
    }

    /// Append one growth parameter; `false` (and no change) at the upper bound.
    pub fn increase(&mut self) -> bool {
        match &self.growth {
            Some(spec) if self.items.len() < self.max => {
                self.items.push(spec.instantiate());
                true
            }
            _ => false,
        }
    }

    /// Drop the last parameter; `None` (and no change) at the lower bound.
    pub fn decrease(&mut self) -> Option<Parameter> {
        if self.growth.is_some() && self.items.len() > self.min {
            self.items.pop()
        } else {
            None
        }
    }

    /// Grow or shrink to exactly `len`, returning the removed parameters.
    /// Fails without touching the list when `len` is outside the bounds.
    pub fn resize(&mut self, len: usize) -> Result<Vec<Parameter>, (usize, usize)> {
        if len < self.min || len > self.max {
            return Err(self.bounds());
        }
        while self.items.len() < len {
            if !self.increase() {
                return Err(self.bounds());
            }
        }
        let removed = self.items.split_off(len);
        Ok(removed)
    }
}

impl<'a> IntoIterator for &'a ParameterList {
    type Item = &'a Parameter;
    type IntoIter = std::slice::Iter<'a, Parameter>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn concat_list() -> ParameterList {
        ParameterList::growable(Vec::new(), ParameterSpec::expression(TypeDescriptor::string()), 2, 10)
    }

    #[test]
    fn growable_list_starts_at_min() {
        let list = concat_list();
        assert_eq!(list.len(), 2);
        assert_eq!(list.bounds(), (2, 10));
        assert!(list.is_growable());
    }

    #[test]
    fn increase_and_decrease_stop_at_bounds() {
        let mut list = concat_list();
        assert!(list.decrease().is_none());
        assert_eq!(list.len(), 2);
        for _ in 0..20 {
            list.increase();
        }
        assert_eq!(list.len(), 10);
        assert!(!list.increase());
        assert!(list.decrease().is_some());
        assert_eq!(list.len(), 9);
    }

    #[test]
    fn fixed_list_never_changes() {
        let mut list = ParameterList::fixed(vec![ParameterSpec::choice(&["a", "b"]).instantiate()]);
        assert!(!list.increase());
        assert!(list.decrease().is_none());
        assert_eq!(list.resize(2), Err((1, 1)));
        assert_eq!(list.get(0).and_then(Parameter::selected), Some("a"));
    }

    #[test]
    fn resize_rejects_out_of_range_without_change() {
        let mut list = concat_list();
        assert_eq!(list.resize(11), Err((2, 10)));
        assert_eq!(list.resize(1), Err((2, 10)));
        assert_eq!(list.len(), 2);
        assert!(list.resize(5).is_ok());
        assert_eq!(list.len(), 5);
        assert_eq!(list.resize(3).map(|removed| removed.len()), Ok(2));
    }
}
