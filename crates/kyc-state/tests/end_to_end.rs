//! # Ledger End-to-End
//!
//! Drives a deployed ledger through complete lending flows using only the
//! public `submit`/`query` surface.

use kyc_core::{ErrorKind, LoanId, Principal};
use kyc_state::{
    Call, CallValue, KycStatus, Ledger, LoanStatus, Outcome, Query, QueryResult, ScriptStep,
};

const OWNER: &str = "ST2CY5V39NHDPWSXMW9QDT3HC3GD6Q6XX4CFRK9AG";
const USER: &str = "ST2JHG361ZXG51QTKY2NQCVBPPRRE2KZB1HR05NNC";
const VERIFIER: &str = "ST2REHHS5J3CERCRBEPMGH7921Q6PYKAADT7JP2VB";

fn p(s: &str) -> Principal {
    Principal::new(s).unwrap()
}

#[test]
fn register_verify_apply_approve() {
    let mut ledger = Ledger::deploy(p(OWNER));

    assert!(ledger.submit(p(USER), Call::RegisterIdentity).outcome.is_ok());
    assert!(ledger
        .submit(
            p(OWNER),
            Call::AddAuthorizedVerifier {
                verifier: p(VERIFIER)
            }
        )
        .outcome
        .is_ok());

    let applied = ledger.submit(p(USER), Call::ApplyForLoan { amount: 10_000 });
    assert_eq!(
        applied.outcome,
        Outcome::Ok {
            value: CallValue::LoanId(LoanId(0))
        }
    );
    match ledger.query(&Query::GetLoanApplication { id: LoanId(0) }) {
        QueryResult::LoanApplication(Some(app)) => {
            assert_eq!(app.status, LoanStatus::Pending);
            assert_eq!(app.amount, 10_000);
            assert_eq!(app.applicant, p(USER));
        }
        other => panic!("expected pending application, got {other:?}"),
    }

    let approved = ledger.submit(p(VERIFIER), Call::ApproveLoan { id: LoanId(0) });
    assert!(approved.outcome.is_ok());
    let app = ledger.loans().get_loan_application(LoanId(0)).unwrap();
    assert_eq!(app.status, LoanStatus::Approved);
    assert_eq!(app.approved_by.as_ref(), Some(&p(VERIFIER)));

    let again = ledger.submit(p(VERIFIER), Call::ApproveLoan { id: LoanId(0) });
    assert_eq!(again.outcome.error_kind(), Some(ErrorKind::InvalidState));
    match again.outcome {
        Outcome::Err { code, .. } => assert_eq!(code, 401),
        Outcome::Ok { .. } => unreachable!(),
    }
}

#[test]
fn verifier_updates_identity_fields() {
    let mut ledger = Ledger::deploy(p(OWNER));
    ledger.submit(p(USER), Call::RegisterIdentity);
    ledger.submit(
        p(OWNER),
        Call::AddAuthorizedVerifier {
            verifier: p(VERIFIER),
        },
    );
    let status = ledger.submit(
        p(VERIFIER),
        Call::UpdateKycStatus {
            subject: p(USER),
            status: KycStatus::Verified,
        },
    );
    let score = ledger.submit(
        p(VERIFIER),
        Call::UpdateCreditScore {
            subject: p(USER),
            score: 750,
        },
    );
    assert!(status.outcome.is_ok());
    assert!(score.outcome.is_ok());

    let record = ledger.identity().get_identity(&p(USER)).unwrap();
    assert_eq!(record.kyc_status, KycStatus::Verified);
    assert_eq!(record.credit_score.map(|s| s.value()), Some(750));
    assert_eq!(record.last_updated, score.block_height);
}

#[test]
fn failures_are_journaled_without_touching_state() {
    let mut ledger = Ledger::deploy(p(OWNER));
    ledger.submit(p(USER), Call::RegisterIdentity);
    let before = ledger.state_digest().unwrap();

    let attempts = [
        (p(USER), Call::RegisterIdentity, ErrorKind::AlreadyRegistered),
        (
            p(USER),
            Call::AddAuthorizedVerifier { verifier: p(USER) },
            ErrorKind::Unauthorized,
        ),
        (
            p(OWNER),
            Call::UpdateCreditScore {
                subject: p(USER),
                score: 900,
            },
            ErrorKind::Unauthorized,
        ),
        (p(USER), Call::ApplyForLoan { amount: 0 }, ErrorKind::InvalidAmount),
        (p(USER), Call::RejectLoan { id: LoanId(3) }, ErrorKind::NotFound),
    ];
    for (caller, call, expected) in attempts {
        let receipt = ledger.submit(caller, call);
        assert_eq!(receipt.outcome.error_kind(), Some(expected));
    }

    assert_eq!(ledger.state_digest().unwrap(), before);
    assert_eq!(ledger.receipts().len(), 6);
    assert_eq!(ledger.block_height().value(), 6);
    assert_eq!(ledger.loans().next_loan_id(), LoanId(0));
}

#[test]
fn yaml_script_drives_ledger() {
    let script = format!(
        r#"
- sender: {USER}
  op: register-identity
- sender: {OWNER}
  op: add-authorized-verifier
  verifier: {VERIFIER}
- sender: {USER}
  op: apply-for-loan
  amount: 2500
- sender: {VERIFIER}
  op: reject-loan
  id: 0
"#
    );
    let steps: Vec<ScriptStep> = serde_yaml::from_str(&script).unwrap();

    let mut ledger = Ledger::deploy(p(OWNER));
    for step in steps {
        assert!(ledger.submit(step.sender, step.call).outcome.is_ok());
    }
    let app = ledger.loans().get_loan_application(LoanId(0)).unwrap();
    assert_eq!(app.status, LoanStatus::Rejected);
    assert_eq!(app.approved_by.as_ref(), Some(&p(VERIFIER)));
}
