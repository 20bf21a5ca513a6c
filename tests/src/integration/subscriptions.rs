//! # Subscription Properties
//!
//! Fail-soft behavior, authorization gating, redaction, and watermark
//! convergence, exercised through the full engine rather than against
//! individual publication functions.

#[cfg(test)]
mod tests {
    use serde_json::json;

    use sync_types::{collections, Identity, WatermarkMap};

    use crate::integration::{doc, gateway, seed_code, seed_user};

    #[tokio::test]
    async fn test_unknown_publication_fails_soft() {
        let (gw, _store) = gateway();
        let groups = gw
            .subscribe(
                "doesNotExist",
                &Identity::user("u1"),
                json!(null),
                &WatermarkMap::new(),
            )
            .await
            .unwrap();
        assert!(groups.is_empty());
    }

    #[tokio::test]
    async fn test_user_publication_redacts_credentials() {
        let (gw, store) = gateway();
        seed_user(&store, "u1", false).await;

        let groups = gw
            .subscribe("user", &Identity::user("u1"), json!(null), &WatermarkMap::new())
            .await
            .unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].collection, collections::USERS);
        assert_eq!(groups[0].entries.len(), 1);

        let me = &groups[0].entries[0];
        assert_eq!(me.id(), Some("u1"));
        assert!(!me.contains_field("password"));
        assert!(!me.contains_field("services"));
        assert!(me.contains_field("displayName"));
    }

    #[tokio::test]
    async fn test_user_publication_anonymous_is_empty() {
        let (gw, store) = gateway();
        seed_user(&store, "u1", false).await;

        let groups = gw
            .subscribe("user", &Identity::Anonymous, json!(null), &WatermarkMap::new())
            .await
            .unwrap();
        assert!(groups.is_empty());
    }

    /// A second poll with the watermark from the first converges to an
    /// empty delta until the document changes again.
    #[tokio::test]
    async fn test_watermark_convergence() {
        let (gw, store) = gateway();
        seed_user(&store, "u1", false).await;
        let identity = Identity::user("u1");

        let groups = gw
            .subscribe("user", &identity, json!(null), &WatermarkMap::new())
            .await
            .unwrap();
        let revision = groups[0].entries[0].revision();
        assert!(revision.as_u64() > 0);

        let mut watermarks = WatermarkMap::new();
        watermarks.set(collections::USERS, revision);
        let groups = gw
            .subscribe("user", &identity, json!(null), &watermarks)
            .await
            .unwrap();
        assert!(groups.is_empty(), "unchanged document must not be resent");

        // A write bumps the revision past the watermark; the delta
        // reappears.
        store
            .update_one(
                collections::USERS,
                &sync_store::Filter::id("u1"),
                &sync_store::UpdateOps::new().set("displayName", json!("Renamed")),
            )
            .await
            .unwrap();
        let groups = gw
            .subscribe("user", &identity, json!(null), &watermarks)
            .await
            .unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].entries[0].str_field("displayName"), Some("Renamed"));
    }

    #[tokio::test]
    async fn test_all_credit_codes_requires_admin() {
        let (gw, store) = gateway();
        seed_user(&store, "root", true).await;
        seed_user(&store, "u1", false).await;
        seed_code(&store, "WELCOME10", 10, 100).await;

        for identity in [Identity::Anonymous, Identity::user("u1")] {
            let groups = gw
                .subscribe("allCreditCodes", &identity, json!(null), &WatermarkMap::new())
                .await
                .unwrap();
            assert!(groups.is_empty(), "non-admin must see nothing");
        }

        let groups = gw
            .subscribe(
                "allCreditCodes",
                &Identity::user("root"),
                json!(null),
                &WatermarkMap::new(),
            )
            .await
            .unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].collection, collections::CREDIT_CODES);
        assert_eq!(groups[0].entries[0].str_field("name"), Some("WELCOME10"));
    }

    #[tokio::test]
    async fn test_users_and_credits_projects_and_excludes_self() {
        let (gw, store) = gateway();
        seed_user(&store, "root", true).await;
        seed_user(&store, "u1", false).await;
        seed_user(&store, "u2", false).await;

        let groups = gw
            .subscribe(
                "usersAndCredits",
                &Identity::user("root"),
                json!(null),
                &WatermarkMap::new(),
            )
            .await
            .unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].entries.len(), 2, "the admin's own row is excluded");
        for entry in &groups[0].entries {
            assert_ne!(entry.id(), Some("root"));
            assert!(entry.contains_field("displayName"));
            assert!(entry.contains_field("credits"));
            // Projection keeps only the console fields.
            assert!(!entry.contains_field("authToken"));
            assert!(!entry.contains_field("password"));
        }
    }

    #[tokio::test]
    async fn test_orders_scoped_to_caller() {
        let (gw, store) = gateway();
        seed_user(&store, "u1", false).await;
        seed_user(&store, "u2", false).await;
        store
            .insert_one(
                collections::ORDERS,
                doc(json!({ "_id": "o1", "userId": "u1", "item": "widget" })),
            )
            .await
            .unwrap();
        store
            .insert_one(
                collections::ORDERS,
                doc(json!({ "_id": "o2", "userId": "u2", "item": "gadget" })),
            )
            .await
            .unwrap();

        let groups = gw
            .subscribe("orders", &Identity::user("u1"), json!(null), &WatermarkMap::new())
            .await
            .unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].collection, collections::ORDERS);
        assert_eq!(groups[0].entries.len(), 1);
        assert_eq!(groups[0].entries[0].id(), Some("o1"));
    }

    #[tokio::test]
    async fn test_accounts_is_public() {
        let (gw, store) = gateway();
        store
            .insert_one(
                collections::ACCOUNTS,
                doc(json!({ "_id": "acct-1", "name": "Main" })),
            )
            .await
            .unwrap();

        let groups = gw
            .subscribe("accounts", &Identity::Anonymous, json!(null), &WatermarkMap::new())
            .await
            .unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].collection, collections::ACCOUNTS);
        assert_eq!(groups[0].entries[0].id(), Some("acct-1"));
    }
}
