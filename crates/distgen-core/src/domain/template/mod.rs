//! The template language.
//!
//! A deliberately small subset of Jinja/Nunjucks syntax, enough for
//! network-specific contract sources:
//!
//! | Syntax | Meaning |
//! |--------|---------|
//! | `{{ network }}` | bound value, inserted verbatim (no escaping) |
//! | `{{ "text" }}` | string literal |
//! | `{{ network \| upper }}` | filters: `upper`, `lower`, `capitalize`, `trim`, `default("x")` |
//! | `{# note #}` | comment, renders nothing |
//! | `{% if network == "mainnet" %}…{% elif … %}…{% else %}…{% endif %}` | conditional text |
//! | `{% raw %}…{% endraw %}` | verbatim text, directives inside are not interpreted |
//! | `{%- if … -%}`, `{{- network -}}` | a `-` inside a delimiter trims the whitespace next to it |
//!
//! Conditions are `expr`, `expr == expr` and `expr != expr`, combined with
//! `not`, `and`, `or` (binding in that order) and parentheses. A value is
//! truthy when it is bound and non-empty.
//!
//! Only opening delimiters are significant, so the `}}` that closes nested
//! Solidity blocks never needs escaping. Inside a directive a closer within a
//! quoted string belongs to the string: `{{ "}}" }}` renders `}}`.

mod ast;
mod lexer;
mod parser;
mod render;

use std::collections::BTreeSet;

use tracing::trace;

use crate::domain::{
    entities::{bindings::Bindings, rendered::RenderedOutput},
    error::DomainError,
    value_objects::MissingVariablePolicy,
};

use ast::{Condition, Expr, Node, Operand};

/// Words that combine conditions and so cannot name a variable.
pub(crate) const KEYWORDS: [&str; 3] = ["not", "and", "or"];

/// A parsed template.
///
/// Parsing validates every directive up front, so a `Template` that exists
/// can always be rendered (barring unbound variables under
/// [`MissingVariablePolicy::Strict`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    nodes: Vec<Node>,
}

impl Template {
    /// Parse template source.
    ///
    /// # Errors
    ///
    /// [`DomainError::TemplateSyntax`] with the line and column of the first
    /// malformed directive.
    pub fn parse(source: &str) -> Result<Self, DomainError> {
        let nodes = parser::parse(source)?;
        trace!(nodes = nodes.len(), "template parsed");
        Ok(Self { nodes })
    }

    /// Render against `bindings`.
    ///
    /// Pure: the same template, bindings and policy always produce the same
    /// output.
    pub fn render(
        &self,
        bindings: &Bindings,
        policy: MissingVariablePolicy,
    ) -> Result<RenderedOutput, DomainError> {
        let mut evaluator = render::Evaluator::new(bindings, policy);
        let mut text = String::new();
        evaluator.render(&self.nodes, &mut text)?;
        Ok(RenderedOutput::new(text, evaluator.into_unresolved()))
    }

    /// Every variable name the template refers to, in any branch.
    pub fn variables(&self) -> BTreeSet<&str> {
        let mut names = BTreeSet::new();
        collect_nodes(&self.nodes, &mut names);
        names
    }

    /// `true` if the template contains no directives besides comments and raw blocks.
    pub fn is_static(&self) -> bool {
        self.nodes.iter().all(|node| matches!(node, Node::Text(_)))
    }
}

fn collect_nodes<'t>(nodes: &'t [Node], names: &mut BTreeSet<&'t str>) {
    for node in nodes {
        match node {
            Node::Text(_) => {}
            Node::Output { expr, .. } => collect_expr(expr, names),
            Node::If {
                branches,
                otherwise,
            } => {
                for branch in branches {
                    collect_condition(&branch.condition, names);
                    collect_nodes(&branch.body, names);
                }
                if let Some(body) = otherwise {
                    collect_nodes(body, names);
                }
            }
        }
    }
}

fn collect_condition<'t>(condition: &'t Condition, names: &mut BTreeSet<&'t str>) {
    match condition {
        Condition::Truthy(expr) => collect_expr(expr, names),
        Condition::Equals(lhs, rhs) | Condition::NotEquals(lhs, rhs) => {
            collect_expr(lhs, names);
            collect_expr(rhs, names);
        }
        Condition::Not(inner) => collect_condition(inner, names),
        Condition::And(lhs, rhs) | Condition::Or(lhs, rhs) => {
            collect_condition(lhs, names);
            collect_condition(rhs, names);
        }
    }
}

fn collect_expr<'t>(expr: &'t Expr, names: &mut BTreeSet<&'t str>) {
    if let Operand::Variable(name) = &expr.base {
        names.insert(name.as_str());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn network(name: &str) -> Bindings {
        Bindings::new().with("network", name)
    }

    fn render(source: &str, bindings: &Bindings) -> String {
        Template::parse(source)
            .unwrap()
            .render(bindings, MissingVariablePolicy::Empty)
            .unwrap()
            .into_string()
    }

    // ========================================================================
    // Substitution
    // ========================================================================

    #[test]
    fn substitutes_bound_variable() {
        assert_eq!(
            render("distributor for {{ network }}", &network("rinkeby")),
            "distributor for rinkeby"
        );
    }

    #[test]
    fn whitespace_inside_delimiters_is_optional() {
        assert_eq!(render("{{network}}/{{  network  }}", &network("bsc")), "bsc/bsc");
    }

    #[test]
    fn repeated_placeholders_substitute_identically() {
        assert_eq!(
            render("{{ network }} and {{ network }}", &network("testnet")),
            "testnet and testnet"
        );
    }

    #[test]
    fn static_template_is_unchanged() {
        let source = "pragma solidity =0.6.11;\ncontract MerkleDistributor { }\n";
        let template = Template::parse(source).unwrap();
        assert!(template.is_static());
        assert_eq!(render(source, &network("mainnet")), source);
        assert_eq!(render(source, &Bindings::new()), source);
    }

    #[test]
    fn values_are_inserted_verbatim() {
        let bindings = Bindings::new().with("network", "<main & \"net\">");
        assert_eq!(render("{{ network }}", &bindings), "<main & \"net\">");
    }

    #[test]
    fn rendering_is_deterministic() {
        let template =
            Template::parse("{% if network == 'mainnet' %}0x1{% else %}0x2{% endif %} {{ a }}{{ b }}")
                .unwrap();
        let bindings = network("mainnet").with("a", "x").with("b", "y");

        let first = template.render(&bindings, MissingVariablePolicy::Empty).unwrap();
        let second = template.render(&bindings, MissingVariablePolicy::Empty).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.as_str(), "0x1 xy");
    }

    #[test]
    fn filters_and_literals() {
        assert_eq!(
            render("{{ network | upper }}-{{ 'v' | upper }}{{ missing | default(\"1\") }}", &network("goerli")),
            "GOERLI-V1"
        );
    }

    // ========================================================================
    // Conditionals
    // ========================================================================

    const ADDRESS_TEMPLATE: &str = "\
address constant TOKEN = {% if network == \"mainnet\" %}0xAAA\
{% elif network == \"testnet\" %}0xBBB\
{% else %}0x000{% endif %};";

    #[test]
    fn selects_branch_by_network() {
        assert_eq!(render(ADDRESS_TEMPLATE, &network("mainnet")), "address constant TOKEN = 0xAAA;");
        assert_eq!(render(ADDRESS_TEMPLATE, &network("testnet")), "address constant TOKEN = 0xBBB;");
        assert_eq!(render(ADDRESS_TEMPLATE, &network("local")), "address constant TOKEN = 0x000;");
    }

    #[test]
    fn negated_and_inequality_conditions() {
        let source = "{% if network != 'mainnet' %}test{% endif %}{% if not debug %}!{% endif %}";
        assert_eq!(render(source, &network("rinkeby")), "test!");
        assert_eq!(render(source, &network("mainnet").with("debug", "1")), "");
    }

    #[test]
    fn empty_value_is_falsy() {
        assert_eq!(render("{% if network %}set{% else %}unset{% endif %}", &network("")), "unset");
    }

    #[test]
    fn comments_and_raw_blocks() {
        let source = "a{# dropped #}b{% raw %}{{ network }}{% endraw %}c";
        assert_eq!(render(source, &network("mainnet")), "ab{{ network }}c");
    }

    // ========================================================================
    // Missing variables
    // ========================================================================

    #[test]
    fn unbound_renders_empty_and_is_reported() {
        let template = Template::parse("[{{ token }}][{{ network }}][{{ owner }}]").unwrap();
        let rendered = template
            .render(&network("mainnet"), MissingVariablePolicy::Empty)
            .unwrap();

        assert_eq!(rendered.as_str(), "[][mainnet][]");
        assert_eq!(rendered.unresolved(), ["owner", "token"]);
        assert!(!rendered.is_complete());
    }

    #[test]
    fn preserve_keeps_placeholder_text() {
        let template = Template::parse("{{ network }} {{ token | upper }}").unwrap();
        let rendered = template
            .render(&network("mainnet"), MissingVariablePolicy::Preserve)
            .unwrap();
        assert_eq!(rendered.as_str(), "mainnet {{ token | upper }}");
    }

    #[test]
    fn strict_rejects_unbound() {
        let template = Template::parse("{{ network }} {{ token }}").unwrap();
        let err = template
            .render(&network("mainnet"), MissingVariablePolicy::Strict)
            .unwrap_err();
        assert_eq!(err, DomainError::UnresolvedVariable { name: "token".into() });
    }

    #[test]
    fn default_filter_counts_as_resolved() {
        let template = Template::parse("{{ token | default('0x0') }}").unwrap();
        let rendered = template
            .render(&Bindings::new(), MissingVariablePolicy::Strict)
            .unwrap();
        assert_eq!(rendered.as_str(), "0x0");
        assert!(rendered.is_complete());
    }

    // ========================================================================
    // Syntax errors & introspection
    // ========================================================================

    #[test]
    fn unterminated_placeholder_is_a_syntax_error() {
        let err = Template::parse("{{ network").unwrap_err();
        assert!(matches!(err, DomainError::TemplateSyntax { line: 1, column: 1, .. }));
    }

    #[test]
    fn variables_lists_all_branches() {
        let template =
            Template::parse("{{ a }}{% if b == c %}{{ d }}{% else %}{{ e | default('x') }}{% endif %}{{ 'lit' }}")
                .unwrap();
        let names: Vec<_> = template.variables().into_iter().collect();
        assert_eq!(names, ["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn and_or_conditions() {
        let source = "{% if network == \"testnet\" or network == \"qa\" %}t{% else %}p{% endif %}";
        assert_eq!(render(source, &network("qa")), "t");
        assert_eq!(render(source, &network("mainnet")), "p");

        let source = "{% if network == 'mainnet' and not debug %}live{% endif %}";
        assert_eq!(render(source, &network("mainnet")), "live");
        assert_eq!(render(source, &network("mainnet").with("debug", "1")), "");
        assert_eq!(render(source, &network("goerli")), "");
    }

    #[test]
    fn or_short_circuits_before_strict_check() {
        let template = Template::parse("{% if network or token %}ok{% endif %}").unwrap();
        let rendered = template
            .render(&network("mainnet"), MissingVariablePolicy::Strict)
            .unwrap();
        assert_eq!(rendered.as_str(), "ok");

        let err = template
            .render(&Bindings::new().with("network", ""), MissingVariablePolicy::Strict)
            .unwrap_err();
        assert_eq!(err, DomainError::UnresolvedVariable { name: "token".into() });
    }

    #[test]
    fn whitespace_control_trims_around_tags() {
        let source = "contract D {\n    {%- if network == \"x\" -%}\n    uint a;\n    {%- endif %}\n}";
        assert_eq!(render(source, &network("x")), "contract D {uint a;\n}");
        assert_eq!(render(source, &network("y")), "contract D {\n}");
    }

    #[test]
    fn closer_inside_string_literal() {
        assert_eq!(render("{{ \"}}\" }}", &Bindings::new()), "}}");
    }

    #[test]
    fn variables_walk_combined_conditions() {
        let template = Template::parse("{% if a and (b or not c) %}{% endif %}").unwrap();
        let names: Vec<_> = template.variables().into_iter().collect();
        assert_eq!(names, ["a", "b", "c"]);
    }
}
