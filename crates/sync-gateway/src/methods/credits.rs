//! # Credit-Code Redemption
//!
//! Converts a shared, capped counter into per-identity credit grants:
//! at most once per `(user, code)` pair, and never beyond the code's
//! global quota.
//!
//! Naive read-then-write (read code, check quota, write user, write code)
//! is unsafe here: two concurrent redemptions at `used == total - 1` can
//! both pass the check before either write lands. Every contended write
//! below is therefore a store-level atomic conditional update — never an
//! in-process lock, because multiple gateway instances may run behind the
//! same store.
//!
//! ## Sequencing
//!
//! 1. Existence check — unknown code returns `NO_SUCH_CODE` before any
//!    write.
//! 2. Idempotency reservation — append the code name to the user's
//!    redeemed set, conditioned on it not being there. "Already present"
//!    is observable as a missed update and returns `ALREADY_REDEEMED`
//!    with no further writes.
//! 3. Conditional quota increment — `used += 1` conditioned on
//!    `used < total` in the same store operation. A miss means the quota
//!    is gone: the reservation from step 2 is rolled back and the caller
//!    gets `MAXIMUM_REACHED`. A failed rollback is a fatal error; the
//!    final state is not guessed at.
//! 4. Credit grant — only after the increment landed. A crash between 3
//!    and 4 (incremented but uncredited) is the one tolerated partial
//!    state, reconciled by an external recovery sweep.

use tracing::{info, warn};

use sync_store::{Filter, UpdateOps};
use sync_types::{collections, fields, CreditCode};

use crate::domain::error::{DomainCode, GatewayError};
use crate::domain::types::MethodOutcome;
use crate::registry::MethodCx;

/// `redeemCreditCode` — params `{ "creditCode": "<name>" }`.
pub async fn redeem_credit_code(cx: MethodCx) -> Result<MethodOutcome, GatewayError> {
    let user_id = cx
        .identity
        .user_id()
        .ok_or(GatewayError::NotAuthenticated)?
        .clone();
    let code_name = cx.str_param("creditCode")?.to_string();

    // 1. Existence check, before any write.
    let Some(code_doc) = cx
        .store
        .find_one(
            collections::CREDIT_CODES,
            &Filter::new().eq(fields::CODE_NAME, code_name.as_str()),
        )
        .await?
    else {
        return Ok(MethodOutcome::domain(DomainCode::NoSuchCode));
    };
    let code = CreditCode::try_from(&code_doc)
        .map_err(|e| GatewayError::InvalidParams(format!("malformed credit code: {e}")))?;

    // A disconnected caller gets no writes at all.
    if cx.cancel.is_cancelled() {
        return Err(GatewayError::Cancelled);
    }

    // 2. Idempotency reservation. The NotContains condition makes "already
    // redeemed" a missed update instead of a silent no-op append.
    let reservation = cx
        .store
        .update_one(
            collections::USERS,
            &Filter::id(user_id.as_str())
                .not_contains(fields::REDEEMED_CODES, code_name.as_str()),
            &UpdateOps::new().add_to_set(fields::REDEEMED_CODES, code_name.as_str()),
        )
        .await?;
    if reservation.missed() {
        return Ok(MethodOutcome::domain(DomainCode::AlreadyRedeemed));
    }

    // Cancellation checkpoint: past this point the quota counter gets
    // touched, so a cancelled caller is unwound now rather than left with
    // a reservation and no grant.
    if cx.cancel.is_cancelled() {
        release_reservation(&cx, user_id.as_str(), &code_name).await?;
        return Err(GatewayError::Cancelled);
    }

    // 3. Conditional quota increment: one atomic compare-and-update.
    let increment = cx
        .store
        .update_one(
            collections::CREDIT_CODES,
            &Filter::new()
                .eq(fields::CODE_NAME, code_name.as_str())
                .lt_field(fields::CODE_USED, fields::CODE_TOTAL),
            &UpdateOps::new().inc(fields::CODE_USED, 1),
        )
        .await?;
    if increment.missed() {
        warn!(code = %code_name, user = %user_id, "Redemption lost the quota race");
        release_reservation(&cx, user_id.as_str(), &code_name).await?;
        return Ok(MethodOutcome::domain(DomainCode::MaximumReached));
    }

    // 4. Grant. The increment has landed; finish even if the caller has
    // since disconnected, otherwise the debit would be silently dropped.
    cx.store
        .update_one(
            collections::USERS,
            &Filter::id(user_id.as_str()),
            &UpdateOps::new().inc(fields::CREDITS_FREE, code.credits),
        )
        .await?;

    info!(code = %code_name, user = %user_id, credits = code.credits, "Credit code redeemed");
    Ok(MethodOutcome::success_with("credits", code.credits))
}

/// Roll back the step-2 reservation. Failure here is fatal: the user would
/// otherwise be left marked as having redeemed a code that granted
/// nothing.
async fn release_reservation(
    cx: &MethodCx,
    user_id: &str,
    code_name: &str,
) -> Result<(), GatewayError> {
    cx.store
        .update_one(
            collections::USERS,
            &Filter::id(user_id),
            &UpdateOps::new().pull(fields::REDEEMED_CODES, code_name),
        )
        .await
        .map_err(|source| GatewayError::RollbackFailed {
            code: code_name.to_string(),
            source,
        })?;
    Ok(())
}
