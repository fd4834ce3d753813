//! Parser adapter: YAML text to `Node`, or a located failure.
//!
//! Deserialization goes through `serde_yaml`'s event-driven deserializer with
//! our own visitor instead of `serde_yaml::Value`. `Value`'s mapping type
//! rejects repeated keys, while workflow validation needs to see them, so the
//! visitor records every pair. The visitor also enforces a nesting limit and
//! resolves `<<` merge keys.

use crate::models::document::{Mapping, Node, Scalar};
use serde::de::{self, DeserializeSeed, Deserializer, EnumAccess, MapAccess, SeqAccess, VariantAccess, Visitor};
use std::cell::Cell;
use std::fmt;
use thiserror::Error;

/// Deepest mapping/sequence nesting accepted in a document.
pub const MAX_DEPTH: usize = 64;

const MERGE_KEY: &str = "<<";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The text is not well-formed YAML. `line` is 1-based, 0 when unknown.
    #[error("{message}")]
    Syntax { line: usize, message: String },

    #[error("document nesting exceeds {limit} levels")]
    TooComplex { line: usize, limit: usize },
}

impl ParseError {
    pub fn line(&self) -> usize {
        match self {
            ParseError::Syntax { line, .. } | ParseError::TooComplex { line, .. } => *line,
        }
    }
}

/// Parse one YAML document.
///
/// An empty document parses to `Scalar::Null`; multi-document streams are a
/// syntax error.
pub fn parse_document(text: &str) -> Result<Node, ParseError> {
    if is_blank_document(text) {
        return Ok(Node::Scalar(Scalar::Null));
    }
    let tripped = Cell::new(false);
    let seed = NodeSeed {
        depth: 0,
        tripped: &tripped,
    };
    let de = serde_yaml::Deserializer::from_str(text);
    seed.deserialize(de).map_err(|e| {
        let line = e.location().map(|loc| loc.line()).unwrap_or(0);
        if tripped.get() {
            ParseError::TooComplex {
                line,
                limit: MAX_DEPTH,
            }
        } else {
            ParseError::Syntax {
                line,
                message: e.to_string(),
            }
        }
    })
}

fn is_blank_document(text: &str) -> bool {
    text.lines().all(|line| {
        let t = line.trim();
        t.is_empty() || t.starts_with('#')
    })
}

struct NodeSeed<'a> {
    depth: usize,
    tripped: &'a Cell<bool>,
}

impl<'a> NodeSeed<'a> {
    fn nested<E: de::Error>(&self) -> Result<NodeSeed<'a>, E> {
        if self.depth >= MAX_DEPTH {
            self.tripped.set(true);
            return Err(E::custom(format!(
                "document nesting exceeds {} levels",
                MAX_DEPTH
            )));
        }
        Ok(NodeSeed {
            depth: self.depth + 1,
            tripped: self.tripped,
        })
    }

    fn same(&self) -> NodeSeed<'a> {
        NodeSeed {
            depth: self.depth,
            tripped: self.tripped,
        }
    }
}

impl<'de> DeserializeSeed<'de> for NodeSeed<'_> {
    type Value = Node;

    fn deserialize<D>(self, deserializer: D) -> Result<Node, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(self)
    }
}

impl<'de> Visitor<'de> for NodeSeed<'_> {
    type Value = Node;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("any YAML value")
    }

    fn visit_bool<E>(self, v: bool) -> Result<Node, E>
    where
        E: de::Error,
    {
        Ok(Node::Scalar(Scalar::Bool(v)))
    }

    fn visit_i64<E>(self, v: i64) -> Result<Node, E>
    where
        E: de::Error,
    {
        Ok(Node::Scalar(Scalar::Int(v.into())))
    }

    fn visit_u64<E>(self, v: u64) -> Result<Node, E>
    where
        E: de::Error,
    {
        Ok(Node::Scalar(Scalar::Int(v.into())))
    }

    fn visit_i128<E>(self, v: i128) -> Result<Node, E>
    where
        E: de::Error,
    {
        Ok(Node::Scalar(Scalar::Int(v)))
    }

    fn visit_f64<E>(self, v: f64) -> Result<Node, E>
    where
        E: de::Error,
    {
        Ok(Node::Scalar(Scalar::Float(v)))
    }

    fn visit_str<E>(self, v: &str) -> Result<Node, E>
    where
        E: de::Error,
    {
        Ok(Node::Scalar(Scalar::Str(v.to_owned())))
    }

    fn visit_string<E>(self, v: String) -> Result<Node, E>
    where
        E: de::Error,
    {
        Ok(Node::Scalar(Scalar::Str(v)))
    }

    fn visit_unit<E>(self) -> Result<Node, E>
    where
        E: de::Error,
    {
        Ok(Node::Scalar(Scalar::Null))
    }

    fn visit_none<E>(self) -> Result<Node, E>
    where
        E: de::Error,
    {
        Ok(Node::Scalar(Scalar::Null))
    }

    fn visit_some<D>(self, deserializer: D) -> Result<Node, D::Error>
    where
        D: Deserializer<'de>,
    {
        self.same().deserialize(deserializer)
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Node, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let child = self.nested::<A::Error>()?;
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element_seed(child.same())? {
            items.push(item);
        }
        Ok(Node::Sequence(items))
    }

    fn visit_map<A>(self, mut map: A) -> Result<Node, A::Error>
    where
        A: MapAccess<'de>,
    {
        let child = self.nested::<A::Error>()?;
        let mut mapping = Mapping::new();
        let mut merged = Vec::new();
        while let Some(key) = map.next_key_seed(child.same())? {
            let value = map.next_value_seed(child.same())?;
            if key.as_str() == Some(MERGE_KEY) {
                merge_sources(value, &mut merged)?;
                continue;
            }
            mapping.push(key.to_string(), value);
        }
        Ok(Node::Mapping(mapping.with_merged(merged)))
    }

    // Tagged values (`!tag value`) arrive as single-variant enums; the tag
    // carries no meaning for workflows, keep the value.
    fn visit_enum<A>(self, data: A) -> Result<Node, A::Error>
    where
        A: EnumAccess<'de>,
    {
        let (_tag, variant) = data.variant::<String>()?;
        variant.newtype_variant_seed(self.same())
    }
}

/// Collect the mappings named by a `<<` value: one mapping or a list of them.
fn merge_sources<E: de::Error>(value: Node, out: &mut Vec<Mapping>) -> Result<(), E> {
    match value {
        Node::Mapping(m) => out.push(m),
        Node::Sequence(items) => {
            for item in items {
                match item {
                    Node::Mapping(m) => out.push(m),
                    other => {
                        return Err(E::custom(format!(
                            "merge key list must hold mappings, found {}",
                            other.kind_name()
                        )))
                    }
                }
            }
        }
        other => {
            return Err(E::custom(format!(
                "merge key must reference a mapping, found {}",
                other.kind_name()
            )))
        }
    }
    Ok(())
}

/// Split text into physical lines the way the linter counts them.
pub fn split_lines(text: &str) -> Vec<&str> {
    text.lines().collect()
}
