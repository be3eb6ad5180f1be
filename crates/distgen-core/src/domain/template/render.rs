//! Tree evaluation against a set of bindings.

use std::collections::BTreeSet;

use super::ast::{Condition, Expr, Node, Operand};
use crate::domain::{
    entities::bindings::Bindings, error::DomainError, value_objects::MissingVariablePolicy,
};

pub(crate) struct Evaluator<'b> {
    bindings: &'b Bindings,
    policy: MissingVariablePolicy,
    unresolved: BTreeSet<String>,
}

impl<'b> Evaluator<'b> {
    pub(crate) fn new(bindings: &'b Bindings, policy: MissingVariablePolicy) -> Self {
        Self {
            bindings,
            policy,
            unresolved: BTreeSet::new(),
        }
    }

    /// Names referenced but not bound, sorted.
    pub(crate) fn into_unresolved(self) -> Vec<String> {
        self.unresolved.into_iter().collect()
    }

    pub(crate) fn render(&mut self, nodes: &[Node], out: &mut String) -> Result<(), DomainError> {
        for node in nodes {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::Output { expr, source } => match self.evaluate(expr)? {
                    Some(value) => out.push_str(&value),
                    None if self.policy == MissingVariablePolicy::Preserve => out.push_str(source),
                    None => {}
                },
                Node::If {
                    branches,
                    otherwise,
                } => {
                    let mut chosen = otherwise.as_deref();
                    for branch in branches {
                        if self.test(&branch.condition)? {
                            chosen = Some(branch.body.as_slice());
                            break;
                        }
                    }
                    if let Some(body) = chosen {
                        self.render(body, out)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn test(&mut self, condition: &Condition) -> Result<bool, DomainError> {
        Ok(match condition {
            Condition::Truthy(expr) => self.evaluate(expr)?.is_some_and(|v| !v.is_empty()),
            Condition::Equals(lhs, rhs) => self.compare(lhs, rhs)?,
            Condition::NotEquals(lhs, rhs) => !self.compare(lhs, rhs)?,
            Condition::Not(inner) => !self.test(inner)?,
            // Short-circuits: the right side is not evaluated (or reported) when the left decides.
            Condition::And(lhs, rhs) => self.test(lhs)? && self.test(rhs)?,
            Condition::Or(lhs, rhs) => self.test(lhs)? || self.test(rhs)?,
        })
    }

    fn compare(&mut self, lhs: &Expr, rhs: &Expr) -> Result<bool, DomainError> {
        let lhs = self.evaluate(lhs)?.unwrap_or_default();
        let rhs = self.evaluate(rhs)?.unwrap_or_default();
        Ok(lhs == rhs)
    }

    fn evaluate(&mut self, expr: &Expr) -> Result<Option<String>, DomainError> {
        let mut value = match &expr.base {
            Operand::Literal(text) => Some(text.clone()),
            Operand::Variable(name) => self.bindings.get(name).map(str::to_owned),
        };
        for filter in &expr.filters {
            value = filter.apply(value);
        }

        if let (None, Operand::Variable(name)) = (&value, &expr.base) {
            if self.policy == MissingVariablePolicy::Strict {
                return Err(DomainError::UnresolvedVariable { name: name.clone() });
            }
            self.unresolved.insert(name.clone());
        }

        Ok(value)
    }
}
