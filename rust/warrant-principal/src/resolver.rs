//! DID-to-verifier resolution.

use std::future::Future;

use crate::{
    did::Did,
    principal::Principal,
    signature::{Error, Verifier},
};
use warrant_common::{ConditionalSend, ConditionalSync};

/// Resolves a DID to a [`Verifier`].
///
/// Given a DID string, looks up or derives the public key material
/// needed to verify signatures. Async to support network-based
/// DID methods (e.g. did:web, did:plc).
pub trait Resolver: ConditionalSend + ConditionalSync {
    /// The verifier produced for resolved DIDs.
    type Verifier: Verifier + ConditionalSend + ConditionalSync;

    /// Error type for resolution failures.
    type Error: std::error::Error + ConditionalSend + ConditionalSync + 'static;

    /// Resolve a DID to a verifier.
    fn resolve(
        &self,
        did: &Did,
    ) -> impl Future<Output = Result<Self::Verifier, Self::Error>> + ConditionalSend;

    /// Combine with another resolver that handles DIDs this one can not.
    ///
    /// ```ignore
    /// let resolver = key_resolver.or(web_resolver);
    /// ```
    fn or<R>(self, other: R) -> CompositeResolver<Self, R>
    where
        Self: Sized,
        R: Resolver,
    {
        CompositeResolver(self, other)
    }
}

/// A resolver that combines two inner resolvers. The left resolver is
/// tried first; the right one only sees DIDs the left one failed on.
///
/// Built via [`Resolver::or`].
#[derive(Debug, Clone, Copy)]
pub struct CompositeResolver<L, R>(pub L, pub R);

/// Both halves of a [`CompositeResolver`] failed.
#[derive(Debug, thiserror::Error)]
#[error("{left}; {right}")]
pub struct CompositeResolveError<L: std::error::Error, R: std::error::Error> {
    /// Failure from the left resolver.
    pub left: L,
    /// Failure from the right resolver.
    pub right: R,
}

/// Verifier produced by a [`CompositeResolver`].
#[derive(Debug, Clone)]
pub enum CompositeVerifier<L, R> {
    /// Resolved by the left resolver.
    Left(L),
    /// Resolved by the right resolver.
    Right(R),
}

impl<L: Principal, R: Principal> Principal for CompositeVerifier<L, R> {
    fn did(&self) -> Did {
        match self {
            Self::Left(verifier) => verifier.did(),
            Self::Right(verifier) => verifier.did(),
        }
    }
}

impl<L, R> Verifier for CompositeVerifier<L, R>
where
    L: Verifier + ConditionalSync,
    R: Verifier + ConditionalSync,
{
    async fn verify(&self, payload: &[u8], signature: &[u8]) -> Result<(), Error> {
        match self {
            Self::Left(verifier) => verifier.verify(payload, signature).await,
            Self::Right(verifier) => verifier.verify(payload, signature).await,
        }
    }
}

impl<L: Resolver, R: Resolver> Resolver for CompositeResolver<L, R> {
    type Verifier = CompositeVerifier<L::Verifier, R::Verifier>;
    type Error = CompositeResolveError<L::Error, R::Error>;

    async fn resolve(&self, did: &Did) -> Result<Self::Verifier, Self::Error> {
        match self.0.resolve(did).await {
            Ok(verifier) => Ok(CompositeVerifier::Left(verifier)),
            Err(left) => match self.1.resolve(did).await {
                Ok(verifier) => Ok(CompositeVerifier::Right(verifier)),
                Err(right) => Err(CompositeResolveError { left, right }),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use testresult::TestResult;

    /// Accepts any signature equal to the payload, for DIDs of one method.
    #[derive(Debug, Clone)]
    struct EchoResolver(&'static str);

    #[derive(Debug, Clone)]
    struct EchoVerifier(Did);

    impl Principal for EchoVerifier {
        fn did(&self) -> Did {
            self.0.clone()
        }
    }

    impl Verifier for EchoVerifier {
        async fn verify(&self, payload: &[u8], signature: &[u8]) -> Result<(), Error> {
            if payload == signature {
                Ok(())
            } else {
                Err(Error::new())
            }
        }
    }

    #[derive(Debug, thiserror::Error)]
    #[error("unsupported method {0}")]
    struct Unsupported(String);

    impl Resolver for EchoResolver {
        type Verifier = EchoVerifier;
        type Error = Unsupported;

        async fn resolve(&self, did: &Did) -> Result<EchoVerifier, Unsupported> {
            if did.method() == self.0 {
                Ok(EchoVerifier(did.clone()))
            } else {
                Err(Unsupported(did.method().to_string()))
            }
        }
    }

    #[tokio::test]
    async fn it_falls_back_to_the_right_resolver() -> TestResult {
        let resolver = EchoResolver("key").or(EchoResolver("web"));

        let key = resolver.resolve(&crate::did!("key:zAlice")).await?;
        assert!(matches!(key, CompositeVerifier::Left(_)));

        let web = resolver.resolve(&crate::did!("web:example.com")).await?;
        assert!(matches!(web, CompositeVerifier::Right(_)));
        web.verify(b"hi", b"hi").await?;
        assert!(web.verify(b"hi", b"ho").await.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn it_reports_both_failures() {
        let resolver = EchoResolver("key").or(EchoResolver("web"));
        let error = resolver
            .resolve(&crate::did!("plc:abc"))
            .await
            .err()
            .map(|e| e.to_string());
        assert_eq!(
            error.as_deref(),
            Some("unsupported method plc; unsupported method plc")
        );
    }
}
