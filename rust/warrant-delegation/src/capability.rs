//! Raw capabilities as they appear inside a delegation.

use ipld_core::ipld::Ipld;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt};

/// Caveats (`nb`) narrowing a capability: caveat name to value.
pub type Caveats = BTreeMap<String, Ipld>;

/// An ability (`can`) over a resource (`with`), narrowed by caveats (`nb`).
///
/// Caveats absent from `nb` are unconstrained; present ones are upper
/// bounds a claim must not exceed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Capability {
    /// Slash-delimited ability, possibly ending in a `*` segment.
    pub can: String,

    /// Resource URI, possibly ending in a `*` segment.
    pub with: String,

    /// Caveats.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub nb: Caveats,
}

impl Capability {
    /// Creates an unconstrained capability.
    pub fn new(can: impl Into<String>, with: impl Into<String>) -> Self {
        Self {
            can: can.into(),
            with: with.into(),
            nb: Caveats::new(),
        }
    }

    /// Adds (or replaces) a single caveat.
    #[must_use]
    pub fn with_caveat(mut self, key: impl Into<String>, value: impl Into<Ipld>) -> Self {
        self.nb.insert(key.into(), value.into());
        self
    }

    /// Replaces all caveats.
    #[must_use]
    pub fn with_caveats(mut self, nb: Caveats) -> Self {
        self.nb = nb;
        self
    }

    /// The ability (`can`).
    #[must_use]
    pub fn ability(&self) -> &str {
        &self.can
    }

    /// The resource (`with`).
    #[must_use]
    pub fn resource(&self) -> &str {
        &self.with
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{\"can\":\"{}\",\"with\":\"{}\"", self.can, self.with)?;
        if !self.nb.is_empty() {
            write!(f, ",\"nb\":{}", DisplayCaveats(&self.nb))?;
        }
        f.write_str("}")
    }
}

/// Renders caveats as compact JSON-like text for diagnostics.
#[derive(Debug, Clone, Copy)]
pub struct DisplayCaveats<'a>(pub &'a Caveats);

impl fmt::Display for DisplayCaveats<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (index, (key, value)) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str(",")?;
            }
            write!(f, "\"{key}\":{}", DisplayIpld(value))?;
        }
        f.write_str("}")
    }
}

/// Renders an [`Ipld`] value as compact JSON-like text for diagnostics.
#[derive(Debug, Clone, Copy)]
pub struct DisplayIpld<'a>(pub &'a Ipld);

impl fmt::Display for DisplayIpld<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Ipld::Null => f.write_str("null"),
            Ipld::Bool(value) => write!(f, "{value}"),
            Ipld::Integer(value) => write!(f, "{value}"),
            Ipld::Float(value) => write!(f, "{value}"),
            Ipld::String(value) => write!(f, "{value:?}"),
            Ipld::Bytes(bytes) => write!(f, "<{} bytes>", bytes.len()),
            Ipld::Link(cid) => write!(f, "{{\"/\":\"{cid}\"}}"),
            Ipld::List(items) => {
                f.write_str("[")?;
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", DisplayIpld(item))?;
                }
                f.write_str("]")
            }
            Ipld::Map(map) => write!(f, "{}", DisplayCaveats(map)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_displays_as_compact_json() {
        let capability = Capability::new("store/add", "did:key:zAlice")
            .with_caveat("size", 50)
            .with_caveat("link", "bafy");
        assert_eq!(
            capability.to_string(),
            r#"{"can":"store/add","with":"did:key:zAlice","nb":{"link":"bafy","size":50}}"#
        );
    }

    #[test]
    fn it_omits_empty_caveats() {
        let capability = Capability::new("store/list", "did:key:zAlice");
        assert_eq!(
            capability.to_string(),
            r#"{"can":"store/list","with":"did:key:zAlice"}"#
        );
    }
}
