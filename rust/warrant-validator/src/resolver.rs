//! Resolving linked proofs.

use crate::error::Failure;
use ipld_core::cid::Cid;
use std::{
    collections::{HashMap, HashSet},
    fmt,
    sync::Arc,
};
use thiserror::Error;
use warrant_common::{ConditionalSend, ConditionalSync, SharedCell, join_ordered};
use warrant_delegation::{Delegation, DelegationStore};

/// A linked proof could not be fetched.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Proof {link} could not be resolved: {reason}")]
pub struct UnavailableProof {
    /// The link that was looked up.
    pub link: Cid,
    /// Why it failed.
    pub reason: String,
}

impl From<UnavailableProof> for Failure {
    fn from(error: UnavailableProof) -> Self {
        Failure::UnavailableProof {
            link: error.link,
            cause: Some(error.reason),
        }
    }
}

/// Fetches delegations cited by CID but not attached inline.
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
pub trait ProofResolver: ConditionalSend + ConditionalSync {
    /// Fetch the delegation addressed by `link`.
    async fn resolve(&self, link: &Cid) -> Result<Arc<Delegation>, UnavailableProof>;
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
impl ProofResolver for DelegationStore {
    async fn resolve(&self, link: &Cid) -> Result<Arc<Delegation>, UnavailableProof> {
        self.get(link).map_err(|missing| UnavailableProof {
            link: *link,
            reason: missing.to_string(),
        })
    }
}

/// Memoizes a [`ProofResolver`] by CID.
///
/// Clones share the cache. Failed lookups are not cached.
#[derive(Clone, Default)]
pub struct ProofCache {
    resolver: Option<Arc<dyn ProofResolver>>,
    resolved: Arc<SharedCell<HashMap<Cid, Arc<Delegation>>>>,
}

impl ProofCache {
    /// A cache in front of `resolver`.
    pub fn new(resolver: impl ProofResolver + 'static) -> Self {
        Self {
            resolver: Some(Arc::new(resolver)),
            resolved: Arc::default(),
        }
    }

    /// A previously resolved delegation.
    pub fn cached(&self, link: &Cid) -> Option<Arc<Delegation>> {
        self.resolved.read().get(link).cloned()
    }

    /// Number of cached delegations.
    pub fn len(&self) -> usize {
        self.resolved.read().len()
    }

    /// Whether nothing was resolved yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolve `link`, from the cache when possible.
    ///
    /// # Errors
    ///
    /// [`Failure::UnavailableProof`] when there is no resolver, the
    /// resolver fails, or it returns a delegation with another CID.
    pub async fn resolve(&self, link: &Cid) -> Result<Arc<Delegation>, Failure> {
        if let Some(delegation) = self.cached(link) {
            tracing::trace!(%link, "proof cache hit");
            return Ok(delegation);
        }
        let Some(resolver) = &self.resolver else {
            return Err(Failure::UnavailableProof {
                link: *link,
                cause: None,
            });
        };
        tracing::trace!(%link, "resolving proof");
        let delegation = resolver.resolve(link).await?;
        if delegation.cid() != link {
            return Err(Failure::UnavailableProof {
                link: *link,
                cause: Some(format!("resolver returned {}", delegation.cid())),
            });
        }
        self.resolved.write().insert(*link, delegation.clone());
        Ok(delegation)
    }

    /// Resolve every distinct link concurrently, at most once each.
    pub async fn resolve_all(&self, links: &[Cid]) -> HashMap<Cid, Result<Arc<Delegation>, Failure>> {
        let mut seen = HashSet::new();
        let unique = links
            .iter()
            .filter(|link| seen.insert(**link))
            .copied()
            .collect::<Vec<_>>();
        let mut lookups = Vec::with_capacity(unique.len());
        for link in &unique {
            lookups.push(self.resolve(link));
        }
        let results = join_ordered(lookups).await;
        unique.into_iter().zip(results).collect()
    }
}

impl fmt::Debug for ProofCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProofCache")
            .field("resolver", &self.resolver.is_some())
            .field("resolved", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use testresult::TestResult;
    use warrant_credentials::Ed25519Signer;
    use warrant_delegation::Capability;
    use warrant_principal::Principal;

    struct Counting {
        store: DelegationStore,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait::async_trait]
    impl ProofResolver for Counting {
        async fn resolve(&self, link: &Cid) -> Result<Arc<Delegation>, UnavailableProof> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.store.resolve(link).await
        }
    }

    async fn delegation() -> Result<Delegation, Box<dyn std::error::Error>> {
        let alice = Ed25519Signer::import([1u8; 32]).await?;
        let bob = Ed25519Signer::import([2u8; 32]).await?;
        Ok(Delegation::builder()
            .audience(&bob)
            .capability(Capability::new("store/add", alice.did().as_str()))
            .sign(&alice)
            .await?)
    }

    #[tokio::test]
    async fn it_resolves_each_link_once() -> TestResult {
        let store = DelegationStore::new();
        let link = store.insert(delegation().await?);
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = ProofCache::new(Counting {
            store,
            calls: calls.clone(),
        });

        let resolved = cache.resolve_all(&[link, link]).await;
        assert_eq!(resolved.len(), 1);
        let first = cache.resolve(&link).await?;
        let second = cache.resolve(&link).await?;
        assert_eq!(first, second);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        Ok(())
    }

    #[tokio::test]
    async fn it_reports_missing_proofs() -> TestResult {
        let link = *delegation().await?.cid();
        let cache = ProofCache::new(DelegationStore::new());
        let result = cache.resolve(&link).await;
        assert!(matches!(
            result,
            Err(Failure::UnavailableProof { cause: Some(_), .. })
        ));
        assert!(cache.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn it_is_unavailable_without_a_resolver() -> TestResult {
        let link = *delegation().await?.cid();
        let result = ProofCache::default().resolve(&link).await;
        assert_eq!(
            result.err(),
            Some(Failure::UnavailableProof { link, cause: None })
        );
        Ok(())
    }
}
