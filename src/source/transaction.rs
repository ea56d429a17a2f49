//! Transaction and connection state machines shared by every backend.
//!
//! ```text
//!                 begin
//!  NoTransaction ───────► Active ──commit──► Committed
//!        ▲                  │                    │
//!        │               rollback                │ begin
//!        │                  ▼                    ▼
//!        │              RolledBack ──begin──► Active
//! ```
//!
//! `Committed` and `RolledBack` are resting states: they behave exactly like
//! `NoTransaction` but remember how the last transaction ended.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use log::info;
use serde::Serialize;

use super::errors::DataSourceError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum TransactionState {
    #[default]
    NoTransaction,
    Active,
    Committed,
    RolledBack,
}

impl TransactionState {
    pub fn is_active(self) -> bool {
        self == TransactionState::Active
    }
}

impl fmt::Display for TransactionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TransactionState::NoTransaction => "not started",
            TransactionState::Active => "active",
            TransactionState::Committed => "committed",
            TransactionState::RolledBack => "rolled back",
        };
        write!(f, "{}", s)
    }
}

/// Owns the transaction state of one source and enforces legal transitions.
#[derive(Debug, Default)]
pub struct TransactionTracker {
    state: TransactionState,
}

impl TransactionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> TransactionState {
        self.state
    }

    pub fn begin(&mut self) -> Result<(), DataSourceError> {
        if self.state.is_active() {
            return Err(self.illegal("begin"));
        }
        self.state = TransactionState::Active;
        info!("transaction started");
        Ok(())
    }

    pub fn commit(&mut self) -> Result<(), DataSourceError> {
        if !self.state.is_active() {
            return Err(self.illegal("commit"));
        }
        self.state = TransactionState::Committed;
        info!("transaction committed");
        Ok(())
    }

    pub fn rollback(&mut self) -> Result<(), DataSourceError> {
        if !self.state.is_active() {
            return Err(self.illegal("rollback"));
        }
        self.state = TransactionState::RolledBack;
        info!("transaction rolled back");
        Ok(())
    }

    fn illegal(&self, operation: &'static str) -> DataSourceError {
        DataSourceError::TransactionState {
            operation,
            state: self.state,
        }
    }
}

/// Connected/disconnected flag with idempotent transitions.
#[derive(Debug, Default)]
pub struct ConnectionState {
    connected: AtomicBool,
}

impl ConnectionState {
    /// Returns true when this call changed the state.
    pub fn connect(&self) -> bool {
        !self.connected.swap(true, Ordering::SeqCst)
    }

    /// Returns true when this call changed the state.
    pub fn disconnect(&self) -> bool {
        self.connected.swap(false, Ordering::SeqCst)
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    pub fn ensure_connected(&self) -> Result<(), DataSourceError> {
        if self.is_connected() {
            Ok(())
        } else {
            Err(DataSourceError::NotConnected)
        }
    }
}
