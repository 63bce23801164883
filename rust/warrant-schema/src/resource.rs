//! Readers for capability resources (`with`).

use crate::{error::SchemaError, reader::Reader};
use url::Url;
use warrant_principal::Did;

/// Reads a resource as a [`Did`], optionally of one method only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DidReader {
    method: Option<String>,
}

/// Reads any `did:` resource.
#[must_use]
pub fn did() -> DidReader {
    DidReader::default()
}

impl DidReader {
    /// Only accept DIDs of this method, e.g. `"key"` or `"web"`.
    #[must_use]
    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }
}

impl Reader<Did, str> for DidReader {
    fn read(&self, input: &str) -> Result<Did, SchemaError> {
        let did: Did = input.parse().map_err(|_| {
            SchemaError::message(format!("Expected a did: URI instead got {input:?}"))
        })?;
        match &self.method {
            Some(method) if did.method() != method => Err(SchemaError::message(format!(
                "Expected a did:{method}: URI instead got {input:?}"
            ))),
            _ => Ok(did),
        }
    }
}

/// Reads a resource as a [`Url`], optionally of one scheme only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UriReader {
    protocol: Option<String>,
}

/// Reads any URI resource.
#[must_use]
pub fn uri() -> UriReader {
    UriReader::default()
}

impl UriReader {
    /// Only accept URIs with this protocol, e.g. `"file:"` or `"mailto:"`.
    #[must_use]
    pub fn protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocol = Some(protocol.into());
        self
    }
}

impl Reader<Url, str> for UriReader {
    fn read(&self, input: &str) -> Result<Url, SchemaError> {
        let url = Url::parse(input)
            .map_err(|e| SchemaError::message(format!("Invalid URI {input:?}: {e}")))?;
        match &self.protocol {
            Some(protocol) if protocol.trim_end_matches(':') != url.scheme() => {
                Err(SchemaError::message(format!(
                    "Expected {protocol} URI instead got {input}"
                )))
            }
            _ => Ok(url),
        }
    }
}

/// Reads any resource verbatim.
#[must_use]
pub fn string() -> impl Reader<String, str> + Clone {
    |input: &str| -> Result<String, SchemaError> { Ok(input.to_string()) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_reads_dids() {
        let did = did().read("did:key:zAlice").unwrap();
        assert_eq!(did.method(), "key");
        assert!(super::did().read("mailto:alice@web.mail").is_err());
    }

    #[test]
    fn it_restricts_did_methods() {
        let reader = did().method("key");
        assert!(reader.read("did:key:zAlice").is_ok());
        assert_eq!(
            reader.read("did:web:web3.storage").unwrap_err().to_string(),
            "Expected a did:key: URI instead got \"did:web:web3.storage\""
        );
    }

    #[test]
    fn it_restricts_uri_protocols() {
        let reader = uri().protocol("file:");
        assert_eq!(
            reader.read("file:///home/alice/").unwrap().path(),
            "/home/alice/"
        );
        assert_eq!(
            reader.read("mailto:alice@web.mail").unwrap_err().to_string(),
            "Expected file: URI instead got mailto:alice@web.mail"
        );
        assert!(uri().read("not a uri").is_err());
    }

    #[test]
    fn it_reads_strings_verbatim() {
        assert_eq!(string().read("ucan:*").unwrap(), "ucan:*");
    }
}
