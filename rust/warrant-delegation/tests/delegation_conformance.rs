//! Encoding and addressing behaviour of delegations across a chain.

use pretty_assertions::assert_eq;
use std::sync::Arc;
use testresult::TestResult;
use warrant_credentials::{Ed25519KeyResolver, Ed25519Signer};
use warrant_delegation::{Capability, Delegation, DelegationStore, Invocation, Ipld, Proof};
use warrant_principal::Principal;

async fn signer(seed: u8) -> Ed25519Signer {
    Ed25519Signer::import([seed; 32]).await.unwrap()
}

#[tokio::test]
async fn the_same_delegation_has_the_same_cid() -> TestResult {
    let alice = signer(1).await;
    let bob = signer(2).await;
    let build = || {
        Delegation::builder()
            .audience(&bob)
            .capability(Capability::new("store/add", alice.did().as_str()).with_caveat("size", 10))
            .expiration(1_900_000_000)
    };
    let first = build().sign(&alice).await?;
    let second = build().sign(&alice).await?;
    // Ed25519 signatures are deterministic.
    assert_eq!(first.cid(), second.cid());
    assert_eq!(first, second);

    let nonced = build().nonce("1").sign(&alice).await?;
    assert_ne!(first.cid(), nonced.cid());
    Ok(())
}

#[tokio::test]
async fn caveats_survive_encoding() -> TestResult {
    let alice = signer(3).await;
    let mut nested = std::collections::BTreeMap::new();
    nested.insert("bytes".to_string(), Ipld::Bytes(vec![1, 2, 3]));
    let capability = Capability::new("file/write", "file:///home/alice/")
        .with_caveat("size", 1024)
        .with_caveat("public", true)
        .with_caveat("tags", Ipld::List(vec!["a".into(), "b".into()]))
        .with_caveat("meta", Ipld::Map(nested));
    let delegation = Delegation::builder()
        .audience(&alice)
        .capability(capability.clone())
        .sign(&alice)
        .await?;

    let decoded = Delegation::from_bytes(delegation.to_bytes())?;
    assert_eq!(decoded.capabilities(), &[capability]);
    Ok(())
}

#[tokio::test]
async fn an_invocation_wraps_a_single_capability() -> TestResult {
    let alice = signer(4).await;
    let service = signer(5).await;
    let root = Arc::new(
        Delegation::builder()
            .audience(&alice)
            .capability(Capability::new("store/*", service.did().as_str()))
            .sign(&service)
            .await?,
    );
    let invocation = Delegation::builder()
        .audience(&service)
        .capability(Capability::new("store/add", service.did().as_str()))
        .proof(&root)
        .invoke(&alice)
        .await?;

    assert_eq!(invocation.capability().can, "store/add");
    assert_eq!(invocation.proofs(), vec![Proof::Delegation(root.clone())]);
    invocation.verify_signature(&Ed25519KeyResolver).await?;

    let store = DelegationStore::new();
    store.insert(invocation.delegation().clone());
    assert!(store.contains(root.cid()));

    let reimported = Invocation::try_from(Delegation::import(&invocation.export()?)?)?;
    assert_eq!(reimported, invocation);
    Ok(())
}
