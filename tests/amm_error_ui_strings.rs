use staple_engine_core::amm::error::SimError;
use staple_engine_core::amm::error_catalog::SimErrorCode;

#[test]
fn no_newlines_or_tabs() {
    let err =
        SimError::new(SimErrorCode::InsufficientState).with_context("origem", "linha1\nlinha2\ttab");
    let user = err.to_user_string();
    assert!(!user.contains('\n'));
    assert!(!user.contains('\t'));
}

#[test]
fn truncate_long_context_values() {
    let long_value = "a".repeat(1024);
    let err = SimError::new(SimErrorCode::CalculationOverflow).with_context("detalhe", long_value);
    let user = err.to_user_string();
    assert!(user.len() < 512);
}

#[test]
fn unknown_placeholder_is_left_as_is() {
    // contexto sem `field`: o placeholder fica literal
    let err = SimError::new(SimErrorCode::InsufficientState).with_context("outro", "x");
    assert_eq!(err.to_user_string(), "[STP-0003] {field} deve ser > 0");
}

#[test]
fn stage_placeholder_from_context() {
    let err = SimError::new(SimErrorCode::NegativeResult).with_context("stage", "fee_out");
    assert_eq!(err.to_user_string(), "[STP-0007] saída negativa em fee_out");
}
