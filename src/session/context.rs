//! Ambient session context
//!
//! Task-local storage for "the current session". The owning scope installs a
//! session for the duration of its future and the slot clears when that
//! future completes, so concurrent tasks never observe each other's session.

use std::future::Future;

use super::Session;

tokio::task_local! {
    static AMBIENT_SESSION: Session;
}

/// The session installed by the nearest enclosing scope, if any
pub fn current() -> Option<Session> {
    AMBIENT_SESSION.try_with(|s| s.clone()).ok()
}

/// Run `fut` with `session` installed as the ambient session. The slot is
/// restored on completion, error, and panic alike.
pub(crate) async fn with_ambient<F>(session: Session, fut: F) -> F::Output
where
    F: Future,
{
    AMBIENT_SESSION.scope(session, fut).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    fn dummy_session() -> Session {
        Session {
            inner: Arc::new(Mutex::new(None)),
        }
    }

    #[tokio::test]
    async fn current_is_empty_outside_a_scope() {
        assert!(current().is_none());
    }

    #[tokio::test]
    async fn scope_installs_and_clears() {
        let session = dummy_session();
        with_ambient(session, async {
            assert!(current().is_some());
        })
        .await;
        assert!(current().is_none());
    }

    #[tokio::test]
    async fn tasks_do_not_observe_each_other() {
        let session = dummy_session();
        with_ambient(session, async {
            let other = tokio::spawn(async { current().is_none() });
            assert!(other.await.unwrap());
            assert!(current().is_some());
        })
        .await;
    }
}
