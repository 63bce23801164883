//! Boxed futures that are `Send` wherever the target allows it.
//!
//! Recursive async code (like walking a delegation chain) has to box its
//! futures. On native targets those boxes must be `Send` so callers can
//! drive them from a multi-threaded runtime, while on `wasm32` nothing is
//! `Send` and a local box is the only option.

use std::future::Future;

/// A pinned, boxed future that is `Send` on native targets.
#[cfg(not(target_arch = "wasm32"))]
pub type BoxedFuture<'a, T> = futures::future::BoxFuture<'a, T>;

/// A pinned, boxed future that is `Send` on native targets.
#[cfg(target_arch = "wasm32")]
pub type BoxedFuture<'a, T> = futures::future::LocalBoxFuture<'a, T>;

/// Box a future into a [`BoxedFuture`].
#[cfg(not(target_arch = "wasm32"))]
pub fn boxed<'a, F>(future: F) -> BoxedFuture<'a, F::Output>
where
    F: Future + Send + 'a,
{
    Box::pin(future)
}

/// Box a future into a [`BoxedFuture`].
#[cfg(target_arch = "wasm32")]
pub fn boxed<'a, F>(future: F) -> BoxedFuture<'a, F::Output>
where
    F: Future + 'a,
{
    Box::pin(future)
}

/// Drive all futures concurrently and collect their outputs in input order.
///
/// Results are never reordered by completion time, which keeps anything
/// aggregated from them deterministic.
pub async fn join_ordered<I>(futures: I) -> Vec<<I::Item as Future>::Output>
where
    I: IntoIterator,
    I::Item: Future,
{
    futures::future::join_all(futures).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn it_preserves_input_order() {
        let outputs = join_ordered((0..5u64).map(|n| async move {
            tokio::task::yield_now().await;
            n * 2
        }))
        .await;
        assert_eq!(outputs, vec![0, 2, 4, 6, 8]);
    }

    #[tokio::test]
    async fn it_boxes_recursive_futures() {
        fn depth(n: u32) -> BoxedFuture<'static, u32> {
            boxed(async move { if n == 0 { 0 } else { 1 + depth(n - 1).await } })
        }
        assert_eq!(depth(4).await, 4);
    }
}
