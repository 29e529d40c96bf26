use std::{collections::BTreeMap, fmt::Display};

use tracing::warn;

/// Named values substituted into `:param` placeholders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteParams(BTreeMap<String, String>);

impl RouteParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a parameter. Anything `Display` works, so ids can be passed as numbers.
    pub fn with(mut self, name: impl Into<String>, value: impl Display) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Display) {
        self.0.insert(name.into(), value.to_string());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Display, const N: usize> From<[(K, V); N]> for RouteParams {
    fn from(pairs: [(K, V); N]) -> Self {
        let mut params = RouteParams::new();
        for (name, value) in pairs {
            params.insert(name, value);
        }
        params
    }
}

fn is_param_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

enum Segment<'t> {
    Literal(&'t str),
    Placeholder(&'t str),
}

/// Splits `template` into literal text and `:identifier` placeholders.
fn walk_template<'t>(template: &'t str, mut visit: impl FnMut(Segment<'t>)) {
    let mut rest = template;

    while let Some(colon) = rest.find(':') {
        let after = &rest[colon + 1..];
        let name_len = after
            .find(|c: char| !is_param_char(c))
            .unwrap_or(after.len());

        if name_len == 0 {
            // a lone ':' is plain text
            visit(Segment::Literal(&rest[..colon + 1]));
            rest = after;
            continue;
        }

        visit(Segment::Literal(&rest[..colon]));
        visit(Segment::Placeholder(&after[..name_len]));
        rest = &after[name_len..];
    }

    visit(Segment::Literal(rest));
}

/// Names of the placeholders of `template`, in order of appearance.
pub fn placeholders(template: &str) -> Vec<&str> {
    let mut names = vec![];
    walk_template(template, |segment| {
        if let Segment::Placeholder(name) = segment {
            names.push(name);
        }
    });
    names
}

/// Substitutes `:param` placeholders of `template` with values from `params`.
///
/// A placeholder without a value is kept as-is (`/posts/:id`) and reported with a
/// warning, so a broken link stays visible instead of failing. Values are inserted
/// verbatim: no URL encoding is applied.
pub fn interpolate(template: &str, params: &RouteParams) -> String {
    let mut out = String::with_capacity(template.len());

    walk_template(template, |segment| match segment {
        Segment::Literal(literal) => out.push_str(literal),
        Segment::Placeholder(name) => match params.get(name) {
            Some(value) => out.push_str(value),
            None => {
                warn!(
                    param = name,
                    path = template,
                    "missing parameter '{}' for path '{}'",
                    name,
                    template
                );
                out.push(':');
                out.push_str(name);
            }
        },
    });

    out
}

/// Converts `/posts/:id` into the `/posts/{id}` syntax understood by the path matcher.
pub(crate) fn to_matcher_syntax(template: &str) -> String {
    let mut out = String::with_capacity(template.len() + 2);

    walk_template(template, |segment| match segment {
        Segment::Literal(literal) => out.push_str(literal),
        Segment::Placeholder(name) => {
            out.push('{');
            out.push_str(name);
            out.push('}');
        }
    });

    out
}
