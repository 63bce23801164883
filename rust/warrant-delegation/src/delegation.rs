//! Signed delegations.

pub mod builder;
pub mod store;

use crate::{
    capability::{Capability, Caveats},
    codec::{cid_of, decode, encode},
    error::{DelegationError, SignatureVerificationError},
    proof::Proof,
    time::{TimeError, TimeRange, Timestamp},
};
use ipld_core::cid::Cid;
use serde::{Deserialize, Serialize};
use serde_bytes::{ByteBuf, Bytes};
use std::{
    collections::{BTreeMap, HashSet},
    fmt::Debug,
    sync::Arc,
};
use warrant_principal::{Did, Resolver, Verifier};

/// An issuer's signed grant of capabilities to an audience.
///
/// A delegation is immutable once sealed. Its [`cid`](Delegation::cid) is
/// the CIDv1 of its DAG-CBOR encoding `[signature, payload]`, which is what
/// other delegations cite in their `proofs`. Proofs may also be attached
/// inline, in which case [`Delegation::proofs`] yields them already
/// resolved.
#[derive(Clone)]
pub struct Delegation {
    payload: DelegationPayload,
    signature: Vec<u8>,
    bytes: Vec<u8>,
    cid: Cid,
    blocks: BTreeMap<Cid, Arc<Delegation>>,
}

/// The unsigned content of a [`Delegation`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DelegationPayload {
    #[serde(rename = "iss")]
    pub(crate) issuer: Did,

    #[serde(rename = "aud")]
    pub(crate) audience: Did,

    #[serde(rename = "att")]
    pub(crate) capabilities: Vec<Capability>,

    #[serde(rename = "prf", default)]
    pub(crate) proofs: Vec<Cid>,

    #[serde(rename = "exp", default, skip_serializing_if = "Option::is_none")]
    pub(crate) expiration: Option<Timestamp>,

    #[serde(rename = "nbf", default, skip_serializing_if = "Option::is_none")]
    pub(crate) not_before: Option<Timestamp>,

    #[serde(rename = "fct", default, skip_serializing_if = "Vec::is_empty")]
    pub(crate) facts: Vec<Caveats>,

    #[serde(rename = "nnc", default, skip_serializing_if = "Option::is_none")]
    pub(crate) nonce: Option<String>,
}

impl DelegationPayload {
    /// Encode this payload as the bytes that get signed.
    ///
    /// # Errors
    ///
    /// Returns [`DelegationError::Encode`] if DAG-CBOR encoding fails.
    pub fn encode(&self) -> Result<Vec<u8>, DelegationError> {
        encode(self)
    }
}

impl Delegation {
    /// Creates a blank [`DelegationBuilder`][builder::DelegationBuilder].
    #[must_use]
    pub fn builder() -> builder::DelegationBuilder {
        builder::DelegationBuilder::new()
    }

    /// Seal a signed payload, attaching any inline proofs it cites.
    pub(crate) fn seal(
        payload: DelegationPayload,
        signature: Vec<u8>,
        attached: impl IntoIterator<Item = Arc<Delegation>>,
    ) -> Result<Self, DelegationError> {
        let bytes = encode(&(Bytes::new(&signature), &payload))?;
        let cid = cid_of(&bytes)?;
        let mut delegation = Self {
            payload,
            signature,
            bytes,
            cid,
            blocks: BTreeMap::new(),
        };
        for proof in attached {
            delegation.attach(proof);
        }
        Ok(delegation)
    }

    /// Getter for the `issuer` field.
    #[must_use]
    pub const fn issuer(&self) -> &Did {
        &self.payload.issuer
    }

    /// Getter for the `audience` field.
    #[must_use]
    pub const fn audience(&self) -> &Did {
        &self.payload.audience
    }

    /// Getter for the delegated capabilities.
    #[must_use]
    pub fn capabilities(&self) -> &[Capability] {
        &self.payload.capabilities
    }

    /// CIDs of the cited proofs, in citation order.
    #[must_use]
    pub fn proof_links(&self) -> &[Cid] {
        &self.payload.proofs
    }

    /// The cited proofs in citation order: attached ones as
    /// [`Proof::Delegation`], the rest as [`Proof::Link`].
    #[must_use]
    pub fn proofs(&self) -> Vec<Proof> {
        self.payload
            .proofs
            .iter()
            .map(|cid| match self.blocks.get(cid) {
                Some(delegation) => Proof::Delegation(delegation.clone()),
                None => Proof::Link(*cid),
            })
            .collect()
    }

    /// Getter for the `expiration` field.
    #[must_use]
    pub const fn expiration(&self) -> Option<Timestamp> {
        self.payload.expiration
    }

    /// Getter for the `not_before` field.
    #[must_use]
    pub const fn not_before(&self) -> Option<Timestamp> {
        self.payload.not_before
    }

    /// Getter for the `facts` field.
    #[must_use]
    pub fn facts(&self) -> &[Caveats] {
        &self.payload.facts
    }

    /// Getter for the `nonce` field.
    #[must_use]
    pub fn nonce(&self) -> Option<&str> {
        self.payload.nonce.as_deref()
    }

    /// Getter for the raw signature bytes.
    #[must_use]
    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    /// Getter for the unsigned payload.
    #[must_use]
    pub const fn payload(&self) -> &DelegationPayload {
        &self.payload
    }

    /// The content address of this delegation.
    #[must_use]
    pub const fn cid(&self) -> &Cid {
        &self.cid
    }

    /// The DAG-CBOR encoding this delegation is addressed by.
    #[must_use]
    pub fn to_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The validity window declared by this delegation.
    #[must_use]
    pub const fn time_range(&self) -> TimeRange {
        TimeRange::new(self.payload.not_before, self.payload.expiration)
    }

    /// Checks this delegation's time bounds against `now`.
    ///
    /// # Errors
    ///
    /// Returns [`TimeError`] when `now` is past the expiration or before
    /// the not-before bound.
    pub fn validate_time(&self, now: Timestamp) -> Result<(), TimeError> {
        self.time_range().check(now)
    }

    /// Attach an inline proof. Delegations not cited in `proofs` are ignored.
    pub fn attach(&mut self, proof: Arc<Delegation>) {
        if self.payload.proofs.contains(proof.cid()) {
            self.blocks.insert(*proof.cid(), proof);
        }
    }

    /// Inline proofs attached to this delegation, keyed by CID.
    #[must_use]
    pub fn blocks(&self) -> &BTreeMap<Cid, Arc<Delegation>> {
        &self.blocks
    }

    /// Decode a single delegation block. Inline proofs are not restored;
    /// use [`Delegation::import`] for archives.
    ///
    /// # Errors
    ///
    /// Returns [`DelegationError::Decode`] if the bytes are not a
    /// `[signature, payload]` DAG-CBOR tuple.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DelegationError> {
        let (signature, payload): (ByteBuf, DelegationPayload) = decode(bytes)?;
        Ok(Self {
            payload,
            signature: signature.into_vec(),
            bytes: bytes.to_vec(),
            cid: cid_of(bytes)?,
            blocks: BTreeMap::new(),
        })
    }

    /// Encode this delegation together with every attached proof,
    /// transitively, as a DAG-CBOR list of blocks. Proofs precede the
    /// delegations citing them and the root comes last.
    ///
    /// # Errors
    ///
    /// Returns [`DelegationError::Encode`] if DAG-CBOR encoding fails.
    pub fn export(&self) -> Result<Vec<u8>, DelegationError> {
        let mut seen = HashSet::new();
        let mut blocks = Vec::new();
        self.collect_blocks(&mut seen, &mut blocks);
        encode(&blocks)
    }

    fn collect_blocks<'a>(&'a self, seen: &mut HashSet<Cid>, blocks: &mut Vec<&'a Bytes>) {
        if !seen.insert(self.cid) {
            return;
        }
        for proof in self.blocks.values() {
            proof.collect_blocks(seen, blocks);
        }
        blocks.push(Bytes::new(&self.bytes));
    }

    /// Decode an archive produced by [`Delegation::export`], re-attaching
    /// every inline proof.
    ///
    /// # Errors
    ///
    /// Returns [`DelegationError::Decode`] for malformed blocks and
    /// [`DelegationError::EmptyArchive`] when there is no root.
    pub fn import(bytes: &[u8]) -> Result<Self, DelegationError> {
        let blocks: Vec<ByteBuf> = decode(bytes)?;
        let mut decoded: BTreeMap<Cid, Arc<Delegation>> = BTreeMap::new();
        let mut root = None;
        for block in blocks {
            let mut delegation = Self::from_bytes(&block)?;
            for link in delegation.payload.proofs.clone() {
                if let Some(proof) = decoded.get(&link) {
                    delegation.attach(proof.clone());
                }
            }
            let delegation = Arc::new(delegation);
            decoded.insert(delegation.cid, delegation.clone());
            root = Some(delegation);
        }
        let root = root.ok_or(DelegationError::EmptyArchive)?;
        Ok(Arc::unwrap_or_clone(root))
    }

    /// Verify the signature of this delegation against its issuer.
    ///
    /// The resolver resolves the issuer DID to a verifier, which then
    /// checks the signature over the encoded payload.
    ///
    /// # Errors
    ///
    /// Returns a [`SignatureVerificationError`] if the issuer can not be
    /// resolved or the signature does not verify.
    pub async fn verify_signature<R: Resolver>(
        &self,
        resolver: &R,
    ) -> Result<(), SignatureVerificationError<R::Error>> {
        let payload = self.payload.encode()?;
        let verifier = resolver
            .resolve(self.issuer())
            .await
            .map_err(SignatureVerificationError::Resolution)?;
        verifier
            .verify(&payload, &self.signature)
            .await
            .map_err(SignatureVerificationError::Verification)
    }
}

impl PartialEq for Delegation {
    fn eq(&self, other: &Self) -> bool {
        self.cid == other.cid
    }
}

impl Eq for Delegation {}

impl Debug for Delegation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Delegation")
            .field("cid", &self.cid)
            .field("issuer", &self.payload.issuer)
            .field("audience", &self.payload.audience)
            .field("capabilities", &self.payload.capabilities)
            .field("proofs", &self.payload.proofs)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use testresult::TestResult;
    use warrant_credentials::{Ed25519KeyResolver, Ed25519Signer};
    use warrant_principal::Principal;

    async fn signer(seed: u8) -> Ed25519Signer {
        Ed25519Signer::import([seed; 32]).await.unwrap()
    }

    #[tokio::test]
    async fn it_round_trips_through_bytes() -> TestResult {
        let alice = signer(1).await;
        let bob = signer(2).await;
        let delegation = Delegation::builder()
            .audience(&bob)
            .capability(Capability::new("store/add", alice.did().as_str()).with_caveat("size", 100))
            .expiration(2_000_000_000)
            .not_before(1_000)
            .nonce("abc")
            .sign(&alice)
            .await?;

        let decoded = Delegation::from_bytes(delegation.to_bytes())?;
        assert_eq!(decoded.cid(), delegation.cid());
        assert_eq!(decoded.payload(), delegation.payload());
        assert_eq!(decoded.signature(), delegation.signature());
        assert_eq!(decoded.issuer(), &alice.did());
        assert_eq!(decoded.audience(), &bob.did());
        assert_eq!(decoded.nonce(), Some("abc"));
        Ok(())
    }

    #[tokio::test]
    async fn it_verifies_the_issuer_signature() -> TestResult {
        let alice = signer(3).await;
        let bob = signer(4).await;
        let delegation = Delegation::builder()
            .audience(&bob)
            .capability(Capability::new("store/list", alice.did().as_str()))
            .sign(&alice)
            .await?;
        delegation.verify_signature(&Ed25519KeyResolver).await?;

        let forged = Delegation::seal(
            DelegationPayload {
                issuer: bob.did(),
                ..delegation.payload().clone()
            },
            delegation.signature().to_vec(),
            [],
        )?;
        assert!(matches!(
            forged.verify_signature(&Ed25519KeyResolver).await,
            Err(SignatureVerificationError::Verification(_))
        ));
        Ok(())
    }

    #[tokio::test]
    async fn it_yields_attached_proofs_inline_and_others_as_links() -> TestResult {
        let alice = signer(5).await;
        let bob = signer(6).await;
        let carol = signer(7).await;
        let root = Delegation::builder()
            .audience(&bob)
            .capability(Capability::new("store/*", alice.did().as_str()))
            .sign(&alice)
            .await?;
        let detached = Delegation::builder()
            .audience(&bob)
            .capability(Capability::new("upload/*", alice.did().as_str()))
            .sign(&alice)
            .await?;

        let child = Delegation::builder()
            .audience(&carol)
            .capability(Capability::new("store/add", alice.did().as_str()))
            .proof(root.clone())
            .proof(*detached.cid())
            .sign(&bob)
            .await?;

        let proofs = child.proofs();
        assert_eq!(proofs.len(), 2);
        assert_eq!(proofs[0].delegation().map(|d| d.cid()), Some(root.cid()));
        assert_eq!(proofs[1], Proof::Link(*detached.cid()));
        Ok(())
    }

    #[tokio::test]
    async fn it_exports_and_imports_the_whole_dag() -> TestResult {
        let alice = signer(8).await;
        let bob = signer(9).await;
        let carol = signer(10).await;
        let root = Arc::new(
            Delegation::builder()
                .audience(&bob)
                .capability(Capability::new("store/*", alice.did().as_str()))
                .sign(&alice)
                .await?,
        );
        let middle = Arc::new(
            Delegation::builder()
                .audience(&carol)
                .capability(Capability::new("store/add", alice.did().as_str()))
                .proof(&root)
                .sign(&bob)
                .await?,
        );
        let leaf = Delegation::builder()
            .audience(&alice)
            .capability(Capability::new("store/add", alice.did().as_str()))
            .proof(&middle)
            .proof(&root)
            .sign(&carol)
            .await?;

        let archive = leaf.export()?;
        let imported = Delegation::import(&archive)?;
        assert_eq!(imported.cid(), leaf.cid());

        let proofs = imported.proofs();
        let middle_proof = proofs[0]
            .delegation()
            .cloned()
            .expect("middle proof is attached");
        assert_eq!(middle_proof.cid(), middle.cid());
        let nested = middle_proof.proofs();
        assert_eq!(nested[0].delegation().map(|d| d.cid()), Some(root.cid()));
        Ok(())
    }

    #[test]
    fn it_rejects_empty_archives() {
        let archive = encode(&Vec::<ByteBuf>::new()).unwrap();
        assert!(matches!(
            Delegation::import(&archive),
            Err(DelegationError::EmptyArchive)
        ));
    }

    #[tokio::test]
    async fn it_validates_time_bounds() -> TestResult {
        let alice = signer(11).await;
        let delegation = Delegation::builder()
            .audience(&alice)
            .capability(Capability::new("store/add", alice.did().as_str()))
            .not_before(100)
            .expiration(200)
            .sign(&alice)
            .await?;
        assert_eq!(delegation.validate_time(150), Ok(()));
        assert_eq!(
            delegation.validate_time(201),
            Err(TimeError::Expired { expiration: 200 })
        );
        assert_eq!(
            delegation.validate_time(50),
            Err(TimeError::NotValidBefore { not_before: 100 })
        );
        Ok(())
    }
}
