//! Parse boundary between the grammar library and the stanza parser.
//!
//! The grammar library hands back a generic block-structured tree; this
//! module converts it exactly once into our own tagged types. Everything
//! downstream matches on [`Literal`] tags and never touches grammar
//! library types again.

use hashictl_core::{Error, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write as _;

/// A literal value carried by a stanza attribute.
///
/// Values keep the type they were written with; downstream decoding
/// matches on the tag and fails with an unexpected-type error instead of
/// coercing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Literal {
    String(String),
    Int(i64),
    Bool(bool),
    List(Vec<Literal>),
}

impl Literal {
    /// Short type tag used in unexpected-type errors
    pub fn type_name(&self) -> &'static str {
        match self {
            Literal::String(_) => "string",
            Literal::Int(_) => "int",
            Literal::Bool(_) => "bool",
            Literal::List(_) => "list",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Literal::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Literal::Int(i) => Some(*i),
            _ => None,
        }
    }
}

/// A single `key = value` entry inside a stanza body
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub key: String,
    pub value: Literal,
}

/// A named block: positional string keys plus a body of attributes and
/// nested stanzas.
#[derive(Debug, Clone, PartialEq)]
pub struct Stanza {
    pub name: String,
    pub keys: Vec<String>,
    pub attrs: Vec<Attribute>,
    pub blocks: Vec<Stanza>,
}

/// A parsed configuration file: the ordered list of top-level stanzas
#[derive(Debug, Clone, Default)]
pub struct Document {
    pub stanzas: Vec<Stanza>,
}

impl Document {
    /// Parse raw configuration text into a stanza tree.
    ///
    /// `file` is only used to annotate errors.
    pub fn parse(content: &str, file: &str) -> Result<Document> {
        let body = hcl::parse(content).map_err(|e| Error::parse(file, e.to_string()))?;

        let (attrs, stanzas) = convert_body(body, file)?;
        if let Some(attr) = attrs.first() {
            return Err(Error::unexpected_key(&attr.key, format!("file root of {file}")));
        }

        Ok(Document { stanzas })
    }
}

impl Stanza {
    /// Iterate over nested stanzas with the given block name
    pub fn blocks_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Stanza> {
        self.blocks.iter().filter(move |b| b.name == name)
    }

    /// Look up a body attribute by key
    pub fn attr(&self, key: &str) -> Option<&Literal> {
        self.attrs
            .iter()
            .find(|a| a.key == key)
            .map(|a| &a.value)
    }

    /// Look up a body attribute that must be a string when present
    pub fn attr_str(&self, key: &str, context: &str) -> Result<Option<String>> {
        match self.attr(key) {
            None => Ok(None),
            Some(Literal::String(s)) => Ok(Some(s.clone())),
            Some(other) => Err(Error::unexpected_type(
                format!("{context} -> {key}"),
                "string",
                other.type_name(),
            )),
        }
    }

    /// Look up a body attribute that must be an integer when present
    pub fn attr_int(&self, key: &str, context: &str) -> Result<Option<i64>> {
        match self.attr(key) {
            None => Ok(None),
            Some(Literal::Int(i)) => Ok(Some(*i)),
            Some(other) => Err(Error::unexpected_type(
                format!("{context} -> {key}"),
                "int",
                other.type_name(),
            )),
        }
    }

    /// Look up a body attribute that must be a list of strings when present
    pub fn attr_string_list(&self, key: &str, context: &str) -> Result<Option<Vec<String>>> {
        let Some(value) = self.attr(key) else {
            return Ok(None);
        };

        let Literal::List(items) = value else {
            return Err(Error::unexpected_type(
                format!("{context} -> {key}"),
                "list of strings",
                value.type_name(),
            ));
        };

        let mut out = Vec::with_capacity(items.len());
        for item in items {
            match item {
                Literal::String(s) => out.push(s.clone()),
                other => {
                    return Err(Error::unexpected_type(
                        format!("{context} -> {key}"),
                        "list of strings",
                        other.type_name(),
                    ))
                }
            }
        }

        Ok(Some(out))
    }

    /// Decode the body attributes key-for-key into an opaque data map,
    /// each value keeping its literal type. Nested blocks are rejected.
    pub fn to_data_map(&self, context: &str) -> Result<BTreeMap<String, Literal>> {
        if let Some(block) = self.blocks.first() {
            return Err(Error::unexpected_key(&block.name, context.to_string()));
        }

        Ok(self
            .attrs
            .iter()
            .map(|a| (a.key.clone(), a.value.clone()))
            .collect())
    }

    /// Decode the body as a flat string-to-string map
    pub fn to_string_map(&self, context: &str) -> Result<BTreeMap<String, String>> {
        if let Some(block) = self.blocks.first() {
            return Err(Error::unexpected_key(&block.name, context.to_string()));
        }

        let mut out = BTreeMap::new();
        for attr in &self.attrs {
            match &attr.value {
                Literal::String(s) => {
                    out.insert(attr.key.clone(), s.clone());
                }
                other => {
                    return Err(Error::unexpected_type(
                        format!("{context} -> {}", attr.key),
                        "string",
                        other.type_name(),
                    ))
                }
            }
        }

        Ok(out)
    }

    /// Check the body for unrecognized attribute/block names.
    ///
    /// All violations in the body are collected into one aggregate error
    /// so a typo on line one does not mask a typo on line ten. The parsed
    /// tree carries no source spans, so errors locate a violation by its
    /// breadcrumb context path rather than a line number.
    pub fn validate_keys(&self, valid: &[&str], context: &str) -> Result<()> {
        let mut errors = Vec::new();

        for attr in &self.attrs {
            if !valid.contains(&attr.key.as_str()) {
                errors.push(Error::unexpected_key(&attr.key, context.to_string()));
            }
        }
        for block in &self.blocks {
            if !valid.contains(&block.name.as_str()) {
                errors.push(Error::unexpected_key(&block.name, context.to_string()));
            }
        }

        Error::aggregate_result(errors)
    }

    /// Pretty-print the stanza body back to canonical block syntax.
    ///
    /// This text, not the decoded tree, is what gets shipped to the
    /// remote policy engine.
    pub fn body_to_text(&self) -> String {
        let mut out = String::new();
        for attr in &self.attrs {
            write_attribute(&mut out, attr, 0);
        }
        for block in &self.blocks {
            write_stanza(&mut out, block, 0);
        }
        out
    }
}

fn write_stanza(out: &mut String, stanza: &Stanza, indent: usize) {
    let pad = "  ".repeat(indent);
    let _ = write!(out, "{pad}{}", stanza.name);
    for key in &stanza.keys {
        let _ = write!(out, " {}", quote(key));
    }
    out.push_str(" {\n");
    for attr in &stanza.attrs {
        write_attribute(out, attr, indent + 1);
    }
    for block in &stanza.blocks {
        write_stanza(out, block, indent + 1);
    }
    let _ = writeln!(out, "{pad}}}");
}

fn write_attribute(out: &mut String, attr: &Attribute, indent: usize) {
    let pad = "  ".repeat(indent);
    let _ = writeln!(out, "{pad}{} = {}", attr.key, format_literal(&attr.value));
}

fn format_literal(value: &Literal) -> String {
    match value {
        Literal::String(s) => quote(s),
        Literal::Int(i) => i.to_string(),
        Literal::Bool(b) => b.to_string(),
        Literal::List(items) => {
            let parts: Vec<String> = items.iter().map(format_literal).collect();
            format!("[{}]", parts.join(", "))
        }
    }
}

fn quote(s: &str) -> String {
    // serde_json string quoting matches the grammar's escape rules
    serde_json::to_string(s).unwrap_or_else(|_| format!("\"{s}\""))
}

/// Canonically format raw configuration text through the grammar library
pub fn canonical_format(content: &str, file: &str) -> Result<String> {
    let body = hcl::parse(content)
        .map_err(|e| Error::template(file, format!("could not format rendered output: {e}")))?;
    let formatted = hcl::to_string(&body)
        .map_err(|e| Error::template(file, format!("could not format rendered output: {e}")))?;
    Ok(formatted.trim().to_string())
}

fn convert_body(body: hcl::Body, context: &str) -> Result<(Vec<Attribute>, Vec<Stanza>)> {
    let mut attrs = Vec::new();
    let mut blocks = Vec::new();

    for structure in body.into_inner() {
        match structure {
            hcl::Structure::Attribute(attr) => {
                let key = attr.key.as_str().to_string();
                let value = expr_to_literal(attr.expr, &format!("{context} -> {key}"))?;
                attrs.push(Attribute { key, value });
            }
            hcl::Structure::Block(block) => {
                let name = block.identifier.as_str().to_string();
                let keys: Vec<String> = block
                    .labels
                    .iter()
                    .map(|label| label.as_str().to_string())
                    .collect();
                let child_context = format!("{context} -> {name}");
                let (attrs_inner, blocks_inner) = convert_body(block.body, &child_context)?;
                blocks.push(Stanza {
                    name,
                    keys,
                    attrs: attrs_inner,
                    blocks: blocks_inner,
                });
            }
        }
    }

    Ok((attrs, blocks))
}

fn expr_to_literal(expr: hcl::Expression, context: &str) -> Result<Literal> {
    match expr {
        hcl::Expression::String(s) => Ok(Literal::String(s)),
        hcl::Expression::Bool(b) => Ok(Literal::Bool(b)),
        hcl::Expression::Number(n) => n
            .as_i64()
            .map(Literal::Int)
            .ok_or_else(|| Error::unexpected_type(context.to_string(), "int", "float")),
        hcl::Expression::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(expr_to_literal(item, context)?);
            }
            Ok(Literal::List(out))
        }
        hcl::Expression::Null => Err(Error::unexpected_type(
            context.to_string(),
            "string, int, bool or list",
            "null",
        )),
        other => Err(Error::unexpected_type(
            context.to_string(),
            "string, int, bool or list",
            expression_kind(&other),
        )),
    }
}

fn expression_kind(expr: &hcl::Expression) -> &'static str {
    match expr {
        hcl::Expression::Object(_) => "object",
        hcl::Expression::TemplateExpr(_) => "template expression",
        hcl::Expression::Variable(_) => "variable reference",
        hcl::Expression::FuncCall(_) => "function call",
        _ => "expression",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_blocks_and_literals() {
        let content = r#"
environment "prod" {
  application "api" {
    secret "db" {
      username = "app"
      port     = 5432
      replica  = true
      hosts    = ["a", "b"]
    }
  }
}"#;
        let doc = Document::parse(content, "test.hcl").unwrap();
        assert_eq!(doc.stanzas.len(), 1);

        let env = &doc.stanzas[0];
        assert_eq!(env.name, "environment");
        assert_eq!(env.keys, vec!["prod"]);

        let app = &env.blocks[0];
        let secret = &app.blocks[0];
        let data = secret.to_data_map("secret").unwrap();
        assert_eq!(data["username"], Literal::String("app".into()));
        assert_eq!(data["port"], Literal::Int(5432));
        assert_eq!(data["replica"], Literal::Bool(true));
        assert_eq!(
            data["hosts"],
            Literal::List(vec![
                Literal::String("a".into()),
                Literal::String("b".into())
            ])
        );
    }

    #[test]
    fn collects_every_invalid_key() {
        let content = r#"
environment "prod" {
  bogus "x" {}
  wrong = 1
  application "api" {}
}"#;
        let doc = Document::parse(content, "test.hcl").unwrap();
        let env = &doc.stanzas[0];
        let err = env
            .validate_keys(&["application"], "environment \"prod\"")
            .unwrap_err();

        let text = err.to_string();
        assert!(text.contains("bogus"), "missing 'bogus' in: {text}");
        assert!(text.contains("wrong"), "missing 'wrong' in: {text}");
    }

    #[test]
    fn body_round_trips_to_canonical_text() {
        let content = r#"
policy "reader" {
  path "secret/*" {
    capabilities = ["read", "list"]
  }
}"#;
        let doc = Document::parse(content, "test.hcl").unwrap();
        let raw = doc.stanzas[0].body_to_text();
        assert_eq!(
            raw,
            "path \"secret/*\" {\n  capabilities = [\"read\", \"list\"]\n}\n"
        );
    }

    #[test]
    fn rejects_float_literals() {
        let content = "environment \"x\" {\n  kv \"a\" {\n    value = 1.5\n  }\n}";
        let err = Document::parse(content, "test.hcl").unwrap_err();
        assert!(err.to_string().contains("int"));
    }
}
