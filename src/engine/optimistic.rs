//! Optimistic local mutation with exact rollback.
//!
//! A [`Mutation`] is applied to the shared state before the remote call is
//! made. Applying it hands back its inverse; if the remote call fails the
//! inverse is applied under the same lock, restoring the prior state.

use parking_lot::Mutex;
use std::future::Future;

/// A reversible change to some state `S`
pub trait Mutation<S>: Sized {
    /// Apply the change and return the mutation that undoes it.
    /// `None` means the change was a no-op and nothing needs undoing.
    fn apply(self, state: &mut S) -> Option<Self>;
}

/// What happened to an optimistic command
#[derive(Debug, PartialEq)]
pub enum Optimistic<E> {
    /// The mutation was a no-op, so no remote call was made
    Noop,
    Committed,
    /// The remote call failed and the local change was undone
    RolledBack(E),
}

/// Apply `mutation` locally, run `remote`, and undo on failure.
///
/// The lock is never held across the remote await. `remote` is only built
/// (and so only sent) when the mutation actually changed something.
pub async fn run_optimistic<S, M, F, Fut, E>(
    state: &Mutex<S>,
    mutation: M,
    remote: F,
) -> Optimistic<E>
where
    M: Mutation<S>,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<(), E>>,
{
    let inverse = { mutation.apply(&mut state.lock()) };
    let Some(inverse) = inverse else {
        return Optimistic::Noop;
    };

    match remote().await {
        Ok(()) => Optimistic::Committed,
        Err(err) => {
            inverse.apply(&mut state.lock());
            Optimistic::RolledBack(err)
        }
    }
}
