use rocket::http::Status;

use super::{BoxPredicate, Context, Predicate, Verdict};

pub const NO_CONDITIONS_PASSED: &str = "No conditions passed";

/// Succeeds iff every predicate does. Predicates run in order and the first
/// refusal is returned unchanged; later predicates are not evaluated.
pub fn and(predicates: Vec<BoxPredicate>) -> BoxPredicate {
    Box::new(All(predicates))
}

/// Succeeds iff some predicate does, stopping at the first that does.
/// Refusals of the failing predicates are discarded; if all of them refuse,
/// the reply is a generic 500 "No conditions passed".
pub fn or(predicates: Vec<BoxPredicate>) -> BoxPredicate {
    Box::new(Any(predicates))
}

struct All(Vec<BoxPredicate>);

#[rocket::async_trait]
impl Predicate for All {
    async fn check(&self, ctx: &Context<'_>) -> Verdict {
        for predicate in &self.0 {
            if let refusal @ Verdict::Respond(_) = predicate.check(ctx).await {
                return refusal;
            }
        }
        Verdict::Continue
    }
}

struct Any(Vec<BoxPredicate>);

#[rocket::async_trait]
impl Predicate for Any {
    async fn check(&self, ctx: &Context<'_>) -> Verdict {
        for predicate in &self.0 {
            if predicate.check(ctx).await.is_continue() {
                return Verdict::Continue;
            }
        }
        Verdict::respond(Status::InternalServerError, NO_CONDITIONS_PASSED)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    use super::*;

    use crate::config::Config;
    use crate::model::api::Reply;
    use crate::store::MemoryStore;

    /// Returns a fixed verdict and counts how often it was asked.
    struct Fixed {
        verdict: Verdict,
        calls: Arc<AtomicUsize>,
    }

    #[rocket::async_trait]
    impl Predicate for Fixed {
        async fn check(&self, _ctx: &Context<'_>) -> Verdict {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.verdict.clone()
        }
    }

    fn pass(calls: &Arc<AtomicUsize>) -> BoxPredicate {
        Box::new(Fixed {
            verdict: Verdict::Continue,
            calls: calls.clone(),
        })
    }

    fn fail(calls: &Arc<AtomicUsize>, status: Status, error: &str) -> BoxPredicate {
        Box::new(Fixed {
            verdict: Verdict::respond(status, error),
            calls: calls.clone(),
        })
    }

    fn counters<const N: usize>() -> [Arc<AtomicUsize>; N] {
        std::array::from_fn(|_| Arc::new(AtomicUsize::new(0)))
    }

    fn count(calls: &Arc<AtomicUsize>) -> usize {
        calls.load(Ordering::SeqCst)
    }

    async fn run(predicate: BoxPredicate) -> Verdict {
        let store = MemoryStore::new();
        let config = Config::example();
        let ctx = Context {
            user: None,
            store: &store,
            config: &config,
        };
        predicate.check(&ctx).await
    }

    #[rocket::async_test]
    async fn and_continues_when_all_continue() {
        let [a, b, c] = counters();
        let verdict = run(and(vec![pass(&a), pass(&b), pass(&c)])).await;
        assert_eq!(verdict, Verdict::Continue);
        assert_eq!((count(&a), count(&b), count(&c)), (1, 1, 1));
    }

    #[rocket::async_test]
    async fn and_reports_first_failure_and_stops() {
        let [a, b, c, d] = counters();
        let verdict = run(and(vec![
            pass(&a),
            fail(&b, Status::Unauthorized, "first"),
            fail(&c, Status::Forbidden, "second"),
            pass(&d),
        ]))
        .await;
        assert_eq!(
            verdict,
            Verdict::Respond(Reply::failure(Status::Unauthorized, "first"))
        );
        assert_eq!((count(&a), count(&b), count(&c), count(&d)), (1, 1, 0, 0));
    }

    #[rocket::async_test]
    async fn empty_and_continues() {
        assert_eq!(run(and(vec![])).await, Verdict::Continue);
    }

    #[rocket::async_test]
    async fn or_stops_at_first_success() {
        let [a, b, c] = counters();
        let verdict = run(or(vec![
            fail(&a, Status::Forbidden, "nope"),
            pass(&b),
            pass(&c),
        ]))
        .await;
        assert_eq!(verdict, Verdict::Continue);
        assert_eq!((count(&a), count(&b), count(&c)), (1, 1, 0));
    }

    #[rocket::async_test]
    async fn or_exhaustion_is_generic() {
        let [a, b] = counters();
        let verdict = run(or(vec![
            fail(&a, Status::Unauthorized, "not logged in"),
            fail(&b, Status::Forbidden, "not an admin"),
        ]))
        .await;
        assert_eq!(
            verdict,
            Verdict::Respond(Reply::failure(
                Status::InternalServerError,
                NO_CONDITIONS_PASSED
            ))
        );
        assert_eq!((count(&a), count(&b)), (1, 1));
    }

    #[rocket::async_test]
    async fn empty_or_fails() {
        assert!(!run(or(vec![])).await.is_continue());
    }

    #[rocket::async_test]
    async fn combinators_nest() {
        let [a, b, c, d] = counters();
        // and(or(fail, pass), fail) reports the outer failure.
        let verdict = run(and(vec![
            or(vec![fail(&a, Status::Forbidden, "a"), pass(&b)]),
            fail(&c, Status::NotFound, "c"),
            pass(&d),
        ]))
        .await;
        assert_eq!(verdict, Verdict::Respond(Reply::failure(Status::NotFound, "c")));
        assert_eq!((count(&a), count(&b), count(&c), count(&d)), (1, 1, 1, 0));

        // or(and(pass, fail), pass) succeeds through the second branch.
        let [e, f, g] = counters();
        let verdict = run(or(vec![
            and(vec![pass(&e), fail(&f, Status::Forbidden, "f")]),
            pass(&g),
        ]))
        .await;
        assert_eq!(verdict, Verdict::Continue);
        assert_eq!((count(&e), count(&f), count(&g)), (1, 1, 1));
    }
}
