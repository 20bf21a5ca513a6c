//! Built-in publication definitions.
//!
//! Every user-scoped definition applies its own identity filter — that
//! scoping *is* the authorization boundary, the engine does not add it.
//! Privileged definitions go through one shared `require_admin` guard
//! instead of each re-reading the administrator flag.

use serde_json::json;
use std::sync::Arc;

use sync_store::{DocumentStore, Filter, Projection, StoreError};
use sync_types::{collections, fields, Identity};

use crate::domain::types::{ChangeGroup, PublicationOutput};
use crate::methods;
use crate::registry::{PublicationCx, Registry};

/// Registers the built-in publications and methods.
pub fn register_builtins(registry: &mut Registry) {
    registry.publish_collection("accounts", collections::ACCOUNTS, accounts);
    registry.publish_collection("orders", collections::ORDERS, orders);
    registry.publish("user", user);
    registry.publish_collection("allCreditCodes", collections::CREDIT_CODES, all_credit_codes);
    registry.publish("usersAndCredits", users_and_credits);
    registry.method("redeemCreditCode", methods::redeem_credit_code);
}

/// True when the identity is an administrator. One guard for every
/// privileged view; failure means "publish nothing", never an error.
pub async fn require_admin(
    store: &Arc<dyn DocumentStore>,
    identity: &Identity,
) -> Result<bool, StoreError> {
    let Some(user_id) = identity.user_id() else {
        return Ok(false);
    };
    let user = store
        .find_one(collections::USERS, &Filter::id(user_id.as_str()))
        .await?;
    Ok(user
        .as_ref()
        .and_then(|u| u.bool_field(fields::ADMIN))
        .unwrap_or(false))
}

/// `accounts` — public, unscoped.
async fn accounts(cx: PublicationCx) -> Result<PublicationOutput, StoreError> {
    let docs = cx
        .store
        .find(collections::ACCOUNTS, &Filter::new(), None)
        .await?;
    Ok(PublicationOutput::Docs(docs))
}

/// `orders` — the caller's own orders.
async fn orders(cx: PublicationCx) -> Result<PublicationOutput, StoreError> {
    let Some(user_id) = cx.identity.user_id() else {
        return Ok(PublicationOutput::empty());
    };
    let docs = cx
        .store
        .find(
            collections::ORDERS,
            &Filter::new().eq(fields::USER_ID, user_id.as_str()),
            None,
        )
        .await?;
    Ok(PublicationOutput::Docs(docs))
}

/// `user` — the caller's own user document. A single-document view: the
/// engine's watermark pass withholds it when unchanged, and redaction
/// strips the credential fields.
async fn user(cx: PublicationCx) -> Result<PublicationOutput, StoreError> {
    let Some(user_id) = cx.identity.user_id() else {
        return Ok(PublicationOutput::empty());
    };
    let Some(doc) = cx
        .store
        .find_one(collections::USERS, &Filter::id(user_id.as_str()))
        .await?
    else {
        return Ok(PublicationOutput::empty());
    };
    Ok(PublicationOutput::Groups(vec![ChangeGroup::new(
        collections::USERS,
        vec![doc],
    )]))
}

/// `allCreditCodes` — admin-only full view of the code table.
async fn all_credit_codes(cx: PublicationCx) -> Result<PublicationOutput, StoreError> {
    if !require_admin(&cx.store, &cx.identity).await? {
        return Ok(PublicationOutput::empty());
    }
    let docs = cx
        .store
        .find(collections::CREDIT_CODES, &Filter::new(), None)
        .await?;
    Ok(PublicationOutput::Docs(docs))
}

/// `usersAndCredits` — admin-only bulk view of every *other* user. Scale
/// path: the watermark filter is pushed into the store query instead of
/// post-filtering the whole collection, and a projection keeps the
/// payload to the fields the admin console renders.
async fn users_and_credits(cx: PublicationCx) -> Result<PublicationOutput, StoreError> {
    let Some(me) = cx.identity.user_id() else {
        return Ok(PublicationOutput::empty());
    };
    if !require_admin(&cx.store, &cx.identity).await? {
        return Ok(PublicationOutput::empty());
    }

    let watermark = cx.watermarks.for_collection(collections::USERS);
    let projection = Projection::fields(["emails", "displayName", "credits", fields::ADMIN]);
    let docs = cx
        .store
        .find(
            collections::USERS,
            &Filter::new()
                .ne(fields::ID, me.as_str())
                .gt(fields::UPDATED_AT, json!(watermark.as_u64())),
            Some(&projection),
        )
        .await?;

    if docs.is_empty() {
        Ok(PublicationOutput::empty())
    } else {
        Ok(PublicationOutput::Groups(vec![ChangeGroup::new(
            collections::USERS,
            docs,
        )]))
    }
}
