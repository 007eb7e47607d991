use crate::core::library::{IneligibleReason, LibraryError, LibraryResult};
use crate::members::Member;
use crate::policies::domain::model::PolicySnapshot;

// Checks run in a fixed order and stop at the first failure so the caller learns
// exactly one reason. Nothing here is cached, callers evaluate it on every loan attempt.
pub(crate) fn evaluate(member: &dyn Member, active_loans: i64,
                       policy: &PolicySnapshot) -> Option<IneligibleReason> {
    if !member.is_active() {
        return Some(IneligibleReason::NotActive);
    }
    if member.is_sanctioned() {
        return Some(IneligibleReason::Sanctioned);
    }
    if member.has_overdue() {
        return Some(IneligibleReason::HasOverdue);
    }
    if !policy.is_within_concurrency_cap(active_loans) {
        return Some(IneligibleReason::AtLoanLimit);
    }
    None
}

pub(crate) fn is_eligible_for_loan(member: &dyn Member, active_loans: i64, policy: &PolicySnapshot) -> bool {
    evaluate(member, active_loans, policy).is_none()
}

pub(crate) fn check_eligibility(member: &dyn Member, active_loans: i64, policy: &PolicySnapshot) -> LibraryResult<()> {
    match evaluate(member, active_loans, policy) {
        Some(reason) => Err(LibraryError::ineligible(member.external_id(), reason)),
        None => Ok(()),
    }
}
