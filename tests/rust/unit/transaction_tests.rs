use rdfmap::source::{DataSourceError, TransactionState, TransactionTracker};

#[test]
fn test_sequence_of_transactions() {
    let mut tx = TransactionTracker::new();
    for _ in 0..3 {
        tx.begin().unwrap();
        assert!(tx.state().is_active());
        tx.commit().unwrap();
        assert!(!tx.state().is_active());
    }
    tx.begin().unwrap();
    tx.rollback().unwrap();
    assert_eq!(tx.state(), TransactionState::RolledBack);
}

#[test]
fn test_illegal_transitions() {
    let mut tx = TransactionTracker::new();
    assert!(matches!(
        tx.commit(),
        Err(DataSourceError::TransactionState {
            operation: "commit",
            state: TransactionState::NoTransaction
        })
    ));
    assert!(tx.rollback().is_err());

    tx.begin().unwrap();
    let err = tx.begin().unwrap_err();
    assert_eq!(
        err.to_string(),
        "Cannot begin a transaction while it is active"
    );
    assert_eq!(tx.state(), TransactionState::Active);
}
