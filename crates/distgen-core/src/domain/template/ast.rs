//! Parsed template tree.

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Node {
    Text(String),
    Output {
        expr: Expr,
        /// Original `{{ ... }}` text, emitted under the preserve policy.
        source: String,
    },
    If {
        branches: Vec<Branch>,
        otherwise: Option<Vec<Node>>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Branch {
    pub condition: Condition,
    pub body: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Expr {
    pub base: Operand,
    pub filters: Vec<Filter>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Operand {
    Variable(String),
    Literal(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Filter {
    Upper,
    Lower,
    Capitalize,
    Trim,
    Default(String),
}

impl Filter {
    /// `None` is an unbound value; only `default` can turn it into a value.
    pub(crate) fn apply(&self, value: Option<String>) -> Option<String> {
        match self {
            Self::Upper => value.map(|v| v.to_uppercase()),
            Self::Lower => value.map(|v| v.to_lowercase()),
            Self::Capitalize => value.map(|v| capitalize(&v)),
            Self::Trim => value.map(|v| v.trim().to_owned()),
            Self::Default(fallback) => value.or_else(|| Some(fallback.clone())),
        }
    }
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => {
            let mut out = String::with_capacity(value.len());
            out.extend(first.to_uppercase());
            out.push_str(&chars.as_str().to_lowercase());
            out
        }
        None => String::new(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Condition {
    Truthy(Expr),
    Equals(Expr, Expr),
    NotEquals(Expr, Expr),
    Not(Box<Condition>),
    And(Box<Condition>, Box<Condition>),
    Or(Box<Condition>, Box<Condition>),
}
