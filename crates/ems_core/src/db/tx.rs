//! Scoped transaction helper.
//!
//! # Invariants
//! - `Ok` from the body commits; `Err` rolls back before the error is
//!   returned.
//! - The connection is back in autocommit mode when the helper returns,
//!   whichever path was taken (including failed commit or rollback).

use log::{debug, error, warn};
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::fmt::Display;
use std::time::Instant;

/// Runs `body` inside an IMMEDIATE transaction on `conn`.
///
/// A rollback failure is logged; the body's original error is returned.
pub fn with_transaction<T, E, F>(conn: &mut Connection, op: &'static str, body: F) -> Result<T, E>
where
    F: FnOnce(&Transaction<'_>) -> Result<T, E>,
    E: From<rusqlite::Error> + Display,
{
    let started_at = Instant::now();
    let outcome = {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        match body(&tx) {
            Ok(value) => tx.commit().map(|()| value).map_err(E::from),
            Err(err) => {
                match tx.rollback() {
                    Ok(()) => warn!(
                        "event=tx_rollback module=db status=ok op={op} duration_ms={} reason={err}",
                        started_at.elapsed().as_millis()
                    ),
                    Err(rollback_err) => error!(
                        "event=tx_rollback module=db status=error op={op} error={rollback_err}"
                    ),
                }
                Err(err)
            }
        }
    };

    restore_autocommit(conn, op);
    if outcome.is_ok() {
        debug!(
            "event=tx_commit module=db status=ok op={op} duration_ms={}",
            started_at.elapsed().as_millis()
        );
    }
    outcome
}

fn restore_autocommit(conn: &Connection, op: &str) {
    if conn.is_autocommit() {
        return;
    }
    if let Err(err) = conn.execute_batch("ROLLBACK;") {
        error!("event=tx_restore module=db status=error op={op} error={err}");
    }
}
