//! DAG-CBOR encoding and content addressing.

use crate::error::DelegationError;
use ipld_core::{
    cid::{Cid, multihash::Multihash},
    codec::Codec,
};
use serde::{Serialize, de::DeserializeOwned};
use serde_ipld_dagcbor::codec::DagCborCodec;
use sha2::{Digest, Sha256};

/// Multicodec code for SHA2-256.
const SHA2_256: u64 = 0x12;

/// Multicodec code for DAG-CBOR.
pub(crate) const DAG_CBOR: u64 = <DagCborCodec as Codec<()>>::CODE;

pub(crate) fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, DelegationError> {
    serde_ipld_dagcbor::to_vec(value).map_err(|e| DelegationError::Encode(e.to_string()))
}

pub(crate) fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, DelegationError> {
    serde_ipld_dagcbor::from_slice(bytes).map_err(|e| DelegationError::Decode(e.to_string()))
}

/// CIDv1 of a DAG-CBOR block, hashed with SHA2-256.
pub(crate) fn cid_of(bytes: &[u8]) -> Result<Cid, DelegationError> {
    let digest = Sha256::digest(bytes);
    let hash = Multihash::<64>::wrap(SHA2_256, &digest)
        .map_err(|e| DelegationError::Hash(e.to_string()))?;
    Ok(Cid::new_v1(DAG_CBOR, hash))
}
