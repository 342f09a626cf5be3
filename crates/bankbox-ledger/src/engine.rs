//! The transaction engine: validate-then-mutate application of monetary
//! operations.
//!
//! Every operation follows the same discipline: resolve the sender, take
//! the per-player processing guard, validate *everything*, and only then
//! touch balances. A request that fails leaves the ledger byte-for-byte
//! untouched — there is no partial application to roll back.
//!
//! The guard exists to reject *logically* concurrent requests from the
//! same sender (a double-tap, an eager client retry) as
//! [`LedgerError::Busy`]. True parallelism is already excluded by the
//! caller, which drives the engine from behind a single lock.

use bankbox_protocol::{ConnectionId, TransactionKind, TransactionRequest};

use crate::{LedgerError, ProcessingState, Room};

/// Validates and applies one transaction from the player bound to
/// `sender` in `room`.
///
/// On success the room's ledger is updated and a history entry appended
/// (evicting the oldest past the cap). On failure nothing changes. The
/// processing guard is released on both paths.
///
/// # Errors
///
/// - [`LedgerError::SenderNotFound`] — no player bound to `sender`
/// - [`LedgerError::Busy`] — the sender already has a request in flight
/// - [`LedgerError::InvalidAmount`] — amount not a positive integer
/// - [`LedgerError::ReceiverNotFound`] — P2P target missing or unknown
/// - [`LedgerError::InsufficientFunds`] — balance below the amount
pub fn apply(
    room: &mut Room,
    sender: ConnectionId,
    request: &TransactionRequest,
) -> Result<(), LedgerError> {
    let sender_idx = room
        .player_index_by_connection(sender)
        .ok_or(LedgerError::SenderNotFound(sender))?;

    if room.players()[sender_idx].processing.is_processing() {
        return Err(LedgerError::Busy);
    }
    room.players_mut()[sender_idx].processing = ProcessingState::Processing;

    let result = dispatch(room, sender_idx, request);

    // Unconditional release: a guard that survived a failed validation
    // would wedge the player for the rest of the session.
    room.players_mut()[sender_idx].processing = ProcessingState::Idle;

    match &result {
        Ok(()) => tracing::debug!(
            code = %room.code(),
            sender = %room.players()[sender_idx].name,
            kind = %request.kind,
            "transaction applied"
        ),
        Err(e) => tracing::debug!(
            code = %room.code(),
            %sender,
            kind = %request.kind,
            error = %e,
            "transaction rejected"
        ),
    }

    result
}

/// The per-kind validation and mutation. Validation fully precedes
/// mutation in every arm.
fn dispatch(
    room: &mut Room,
    sender_idx: usize,
    request: &TransactionRequest,
) -> Result<(), LedgerError> {
    // The parse check applies to every kind; for BANK_GO the parsed value
    // is then discarded in favor of the room's configured reward.
    let amount = request
        .amount
        .as_positive()
        .ok_or(LedgerError::InvalidAmount)?;

    match request.kind {
        TransactionKind::P2p => {
            let target =
                request.target_id.ok_or(LedgerError::ReceiverNotFound)?;
            let receiver_idx = room
                .player_index_by_connection(target)
                .ok_or(LedgerError::ReceiverNotFound)?;
            if room.players()[sender_idx].balance < amount {
                return Err(LedgerError::InsufficientFunds);
            }

            room.players_mut()[sender_idx].balance -= amount;
            room.players_mut()[receiver_idx].balance += amount;
            let entry = format!(
                "{} paid ${} to {}",
                room.players()[sender_idx].name,
                amount,
                room.players()[receiver_idx].name
            );
            room.push_history(entry);
        }

        TransactionKind::BankLoan => {
            // Loans are always granted: the bank mints the money, so there
            // is nothing to check against.
            let player = &mut room.players_mut()[sender_idx];
            player.balance += amount;
            player.debt += amount;
            let entry = format!(
                "{} took a loan of ${amount}",
                room.players()[sender_idx].name
            );
            room.push_history(entry);
        }

        TransactionKind::BankPay => {
            if room.players()[sender_idx].balance < amount {
                return Err(LedgerError::InsufficientFunds);
            }

            let player = &mut room.players_mut()[sender_idx];
            player.balance -= amount;
            // Overpayment is absorbed by the bank, not refunded; debt
            // stays at zero rather than going negative.
            player.debt -= player.debt.min(amount);
            let entry = format!(
                "{} paid ${amount} to the bank",
                room.players()[sender_idx].name
            );
            room.push_history(entry);
        }

        TransactionKind::BankGo => {
            // The client-supplied amount is never trusted here; the room's
            // fixed reward is applied instead.
            let reward = room.settings().go_reward;
            room.players_mut()[sender_idx].balance += reward;
            let entry = format!(
                "{} passed GO (+${reward})",
                room.players()[sender_idx].name
            );
            room.push_history(entry);
        }
    }

    Ok(())
}

// =========================================================================
// Tests
// =========================================================================
