//! Resolving signer DIDs back to verifiers.

use testresult::TestResult;
use warrant_credentials::{Ed25519KeyResolver, Ed25519Signer};
use warrant_principal::{Principal, Resolver, Signer, Verifier, did};

#[tokio::test]
async fn it_verifies_through_the_resolved_did() -> TestResult {
    let alice = Ed25519Signer::import([20u8; 32]).await?;
    let payload = b"{\"can\":\"store/add\"}";
    let signature = alice.sign(payload).await?;

    let verifier = Ed25519KeyResolver.resolve(&alice.did()).await?;
    assert_eq!(verifier.did(), alice.did());
    verifier.verify(payload, &signature).await?;
    Ok(())
}

#[tokio::test]
async fn it_fails_on_non_key_dids() {
    let result = Ed25519KeyResolver.resolve(&did!("web:web3.storage")).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn it_composes_with_other_resolvers() -> TestResult {
    let alice = Ed25519Signer::import([21u8; 32]).await?;
    let resolver = Ed25519KeyResolver.or(Ed25519KeyResolver);
    let verifier = resolver.resolve(&alice.did()).await?;
    let signature = alice.sign(b"hello").await?;
    verifier.verify(b"hello", &signature).await?;
    Ok(())
}
