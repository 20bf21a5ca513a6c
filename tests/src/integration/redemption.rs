//! # Credit-Code Redemption Properties
//!
//! The two invariants the transaction protects, exercised end to end:
//!
//! - At most one grant per `(user, code)` pair, no matter how often the
//!   same user retries.
//! - `used` never exceeds `total`, no matter how many distinct users race
//!   on the last slots.

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tokio_util::sync::CancellationToken;

    use sync_gateway::{DomainCode, GatewayError, MethodOutcome};
    use sync_store::Filter;
    use sync_types::{collections, fields, Identity};

    use crate::integration::{gateway, seed_code, seed_user};

    async fn redeem(
        gw: &sync_gateway::SyncGateway,
        user: &str,
        code: &str,
    ) -> Result<MethodOutcome, GatewayError> {
        gw.call(
            "redeemCreditCode",
            &Identity::user(user),
            json!({ "creditCode": code }),
            &CancellationToken::new(),
        )
        .await
    }

    #[tokio::test]
    async fn test_redemption_grants_credits_once() {
        let (gw, store) = gateway();
        seed_user(&store, "u1", false).await;
        seed_code(&store, "WELCOME10", 10, 100).await;

        let outcome = redeem(&gw, "u1", "WELCOME10").await.unwrap();
        assert!(outcome.is_success());

        let user = store
            .find_one(collections::USERS, &Filter::id("u1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.i64_field(fields::CREDITS_FREE), Some(10));
        assert!(user.contains_in_array(fields::REDEEMED_CODES, &json!("WELCOME10")));

        // Second attempt by the same user is a domain error, not a second
        // grant.
        let repeat = redeem(&gw, "u1", "WELCOME10").await.unwrap();
        assert_eq!(repeat, MethodOutcome::domain(DomainCode::AlreadyRedeemed));

        let user = store
            .find_one(collections::USERS, &Filter::id("u1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.i64_field(fields::CREDITS_FREE), Some(10));

        let code = store
            .find_one(
                collections::CREDIT_CODES,
                &Filter::new().eq(fields::CODE_NAME, "WELCOME10"),
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(code.i64_field(fields::CODE_USED), Some(1));
    }

    /// Sequential single-slot story: first caller wins, their retry is
    /// idempotent, and the next caller finds the quota spent.
    #[tokio::test]
    async fn test_single_slot_code_lifecycle() {
        let (gw, store) = gateway();
        seed_user(&store, "u1", false).await;
        seed_user(&store, "u2", false).await;
        seed_code(&store, "WELCOME1", 10, 1).await;

        assert!(redeem(&gw, "u1", "WELCOME1").await.unwrap().is_success());
        assert_eq!(
            redeem(&gw, "u1", "WELCOME1").await.unwrap(),
            MethodOutcome::domain(DomainCode::AlreadyRedeemed)
        );
        assert_eq!(
            redeem(&gw, "u2", "WELCOME1").await.unwrap(),
            MethodOutcome::domain(DomainCode::MaximumReached)
        );

        let code = store
            .find_one(
                collections::CREDIT_CODES,
                &Filter::new().eq(fields::CODE_NAME, "WELCOME1"),
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(code.i64_field(fields::CODE_USED), Some(1));

        // The loser was unwound and can still redeem other codes.
        let u2 = store
            .find_one(collections::USERS, &Filter::id("u2"))
            .await
            .unwrap()
            .unwrap();
        assert!(!u2.contains_in_array(fields::REDEEMED_CODES, &json!("WELCOME1")));
    }

    #[tokio::test]
    async fn test_unknown_code_is_domain_error() {
        let (gw, store) = gateway();
        seed_user(&store, "u1", false).await;

        let outcome = redeem(&gw, "u1", "NOPE").await.unwrap();
        assert_eq!(outcome, MethodOutcome::domain(DomainCode::NoSuchCode));
    }

    #[tokio::test]
    async fn test_anonymous_redemption_is_fatal() {
        let (gw, store) = gateway();
        seed_code(&store, "WELCOME10", 10, 100).await;

        let err = gw
            .call(
                "redeemCreditCode",
                &Identity::Anonymous,
                json!({ "creditCode": "WELCOME10" }),
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::NotAuthenticated));
    }

    /// Distinct users racing on a single remaining slot: exactly one wins,
    /// the quota is never exceeded, and every loser's reservation is rolled
    /// back.
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_redemption_respects_quota() {
        let (gw, store) = gateway();
        seed_code(&store, "LAST-ONE", 25, 1).await;
        for i in 0..4 {
            seed_user(&store, &format!("u{i}"), false).await;
        }

        let mut handles = Vec::new();
        for i in 0..4 {
            let gw = std::sync::Arc::clone(&gw);
            handles.push(tokio::spawn(async move {
                redeem(&gw, &format!("u{i}"), "LAST-ONE").await
            }));
        }

        let mut successes = 0;
        let mut exhausted = 0;
        for handle in handles {
            match handle.await.unwrap().unwrap() {
                MethodOutcome::Success(_) => successes += 1,
                MethodOutcome::Error(DomainCode::MaximumReached) => exhausted += 1,
                other => panic!("unexpected outcome: {other:?}"),
            }
        }
        assert_eq!(successes, 1);
        assert_eq!(exhausted, 3);

        let code = store
            .find_one(
                collections::CREDIT_CODES,
                &Filter::new().eq(fields::CODE_NAME, "LAST-ONE"),
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(code.i64_field(fields::CODE_USED), Some(1));

        // Exactly one user holds the grant; every loser was unwound.
        let mut granted = 0;
        for i in 0..4 {
            let user = store
                .find_one(collections::USERS, &Filter::id(&format!("u{i}")))
                .await
                .unwrap()
                .unwrap();
            if user.contains_in_array(fields::REDEEMED_CODES, &json!("LAST-ONE")) {
                granted += 1;
                assert_eq!(user.i64_field(fields::CREDITS_FREE), Some(25));
            } else {
                assert_eq!(user.i64_field(fields::CREDITS_FREE), Some(0));
            }
        }
        assert_eq!(granted, 1);
    }

    /// Wider race: more contenders than slots. The sum of grants equals the
    /// quota exactly.
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_oversubscribed_code_fills_exactly() {
        let (gw, store) = gateway();
        seed_code(&store, "LIMITED", 5, 3).await;
        for i in 0..8 {
            seed_user(&store, &format!("w{i}"), false).await;
        }

        let mut handles = Vec::new();
        for i in 0..8 {
            let gw = std::sync::Arc::clone(&gw);
            // Jitter so arrivals interleave differently on every run.
            let delay = rand::Rng::gen_range(&mut rand::thread_rng(), 0..5u64);
            handles.push(tokio::spawn(async move {
                tokio::time::sleep(std::time::Duration::from_millis(delay)).await;
                redeem(&gw, &format!("w{i}"), "LIMITED").await
            }));
        }
        let mut successes = 0;
        for handle in handles {
            if handle.await.unwrap().unwrap().is_success() {
                successes += 1;
            }
        }
        assert_eq!(successes, 3);

        let code = store
            .find_one(
                collections::CREDIT_CODES,
                &Filter::new().eq(fields::CODE_NAME, "LIMITED"),
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(code.i64_field(fields::CODE_USED), Some(3));
    }

    #[tokio::test]
    async fn test_cancelled_call_writes_nothing() {
        let (gw, store) = gateway();
        seed_user(&store, "u1", false).await;
        seed_code(&store, "WELCOME10", 10, 100).await;

        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = gw
            .call(
                "redeemCreditCode",
                &Identity::user("u1"),
                json!({ "creditCode": "WELCOME10" }),
                &cancel,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Cancelled));

        let user = store
            .find_one(collections::USERS, &Filter::id("u1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.i64_field(fields::CREDITS_FREE), Some(0));
        assert!(!user.contains_in_array(fields::REDEEMED_CODES, &json!("WELCOME10")));
    }
}
