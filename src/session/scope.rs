//! Scoped session acquisition
//!
//! Every operation funnels through [`with_session`]. Reused sessions carry
//! no new transaction boundary; owned sessions commit on success, roll back
//! on failure, and are released exactly once on every path.

use std::future::Future;

use super::{context, Session};
use crate::database;
use crate::error::OrmResult;

/// Acquire a session and run `f` against it.
///
/// If `explicit` is supplied, or an ambient session is installed, it is
/// reused as-is: commit and rollback remain the outer scope's
/// responsibility. Otherwise a new session is opened from the process-wide
/// pool, installed as the ambient session for the duration of `f`, committed
/// when `f` returns `Ok`, and rolled back when it returns `Err`. A scope
/// abandoned mid-flight (cancellation, panic) releases through the
/// transaction's drop guard, which rolls back.
pub async fn with_session<F, Fut, R>(explicit: Option<Session>, f: F) -> OrmResult<R>
where
    F: FnOnce(Session) -> Fut,
    Fut: Future<Output = OrmResult<R>>,
{
    if let Some(session) = explicit.or_else(context::current) {
        tracing::debug!("reusing enclosing session");
        return f(session).await;
    }

    let session = Session::begin(database::pool()?).await?;
    let result = context::with_ambient(session.clone(), f(session.clone())).await;
    match result {
        Ok(value) => {
            session.commit().await?;
            Ok(value)
        }
        Err(err) => {
            tracing::warn!(error = %err, "rolling back session scope");
            // best effort: the triggering fault is what propagates
            session.rollback().await.ok();
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OrmError;

    // No pool is initialized in unit tests, so an owned scope must fail with
    // a configuration fault before any I/O is attempted.
    #[tokio::test]
    async fn owned_scope_requires_initialized_provider() {
        let result = with_session(None, |_session| async { Ok(()) }).await;
        assert!(matches!(result, Err(OrmError::Configuration(_))));
    }
}
