//! In-memory document tree produced by the parser adapter.
//!
//! A `Node` is a mapping, a sequence, or a scalar. Mappings keep every
//! key/value pair in source order, duplicates included, so rules that care
//! about repeated keys (permission scopes) can still see them. Lookups follow
//! the usual loader convention and return the last value written for a key.

use std::collections::{HashMap, HashSet};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
/// A parsed YAML node.
pub enum Node {
    Mapping(Mapping),
    Sequence(Vec<Node>),
    Scalar(Scalar),
}

#[derive(Debug, Clone, PartialEq)]
/// Leaf value. `Int` is wide enough for both signed and unsigned YAML integers.
pub enum Scalar {
    Null,
    Bool(bool),
    Int(i128),
    Float(f64),
    Str(String),
}

#[derive(Debug, Clone, Default, PartialEq)]
/// Ordered key/value pairs, duplicates preserved.
pub struct Mapping {
    pairs: Vec<(String, Node)>,
}

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a pair without collapsing an earlier pair with the same key.
    pub fn push(&mut self, key: String, value: Node) {
        self.pairs.push((key, value));
    }

    /// Last value written for `key`.
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.pairs
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == key)
    }

    /// Every pair in source order, including repeated keys.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Distinct keys with their effective (last written) value, ordered by
    /// where the winning pair appears in the source.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
        let last = self.last_indices();
        self.pairs
            .iter()
            .enumerate()
            .filter(move |(i, (k, _))| last.get(k.as_str()) == Some(i))
            .map(|(_, (k, v))| (k.as_str(), v))
    }

    /// Distinct keys in effective order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.iter().map(|(k, _)| k)
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.last_indices().len()
    }

    fn last_indices(&self) -> HashMap<&str, usize> {
        self.pairs
            .iter()
            .enumerate()
            .map(|(i, (k, _))| (k.as_str(), i))
            .collect()
    }

    /// Fold YAML merge sources (`<<`) in beneath this mapping's own pairs.
    /// Explicit keys win over merged ones, and earlier sources win over
    /// later ones.
    pub fn with_merged(self, sources: Vec<Mapping>) -> Mapping {
        if sources.is_empty() {
            return self;
        }
        let mut taken: HashSet<String> = self.pairs.iter().map(|(k, _)| k.clone()).collect();
        let mut pairs = Vec::new();
        for source in &sources {
            for (k, v) in source.iter() {
                if taken.insert(k.to_string()) {
                    pairs.push((k.to_string(), v.clone()));
                }
            }
        }
        pairs.extend(self.pairs);
        Mapping { pairs }
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl Node {
    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Node::Mapping(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Node]> {
        match self {
            Node::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::Scalar(Scalar::Str(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Node::Scalar(Scalar::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i128> {
        match self {
            Node::Scalar(Scalar::Int(n)) => Some(*n),
            _ => None,
        }
    }

    /// Short shape name used in diagnostics ("mapping", "string", ...).
    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::Mapping(_) => "mapping",
            Node::Sequence(_) => "sequence",
            Node::Scalar(Scalar::Null) => "null",
            Node::Scalar(Scalar::Bool(_)) => "boolean",
            Node::Scalar(Scalar::Int(_)) => "integer",
            Node::Scalar(Scalar::Float(_)) => "float",
            Node::Scalar(Scalar::Str(_)) => "string",
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => f.write_str("null"),
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Int(n) => write!(f, "{}", n),
            Scalar::Float(x) => write!(f, "{}", x),
            Scalar::Str(s) => f.write_str(s),
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Scalar(s) => s.fmt(f),
            Node::Sequence(_) => f.write_str("[...]"),
            Node::Mapping(_) => f.write_str("{...}"),
        }
    }
}
