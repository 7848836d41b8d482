//! The Ledger: unified API for the Drip stream ledger.
//!
//! The Ledger brings together the store, the treasury, the clock and the
//! notification and authorization seams. Every mutation of a stream runs
//! under that stream's lock; reads go straight to the store.

use std::sync::Arc;

use drip_core::{AccountId, Accrual, Amount, Stream, StreamId, StreamParams, Timestamp};
use drip_store::{Store, StoreExt, StreamFilter};
use tokio::sync::OwnedMutexGuard;

use crate::auth::{Action, Authorizer, OwnerAuthorizer};
use crate::clock::Clock;
use crate::config::LedgerConfig;
use crate::error::{LedgerError, Result};
use crate::locks::StreamLocks;
use crate::observer::{LedgerEvent, NoopObserver, Observer, StreamCreated};
use crate::treasury::Treasury;

/// The main Ledger struct.
///
/// Provides a unified API for:
/// - Creating streams (optionally funding them into escrow)
/// - Pausing and resuming accrual
/// - Withdrawing accrued balance through the treasury
/// - Querying raw records and derived accrual views
pub struct Ledger<S: Store> {
    /// The storage backend.
    store: Arc<S>,
    /// Moves balances on the ledger's instruction.
    treasury: Arc<dyn Treasury>,
    /// Source of "now".
    clock: Arc<dyn Clock>,
    /// Notified after each committed mutation.
    observer: Arc<dyn Observer>,
    /// Consulted before each mutation of an existing stream.
    authorizer: Arc<dyn Authorizer>,
    /// Configuration.
    config: LedgerConfig,
    /// One write lock per stream id.
    locks: StreamLocks,
}

impl<S: Store> Ledger<S> {
    /// Create a new ledger.
    ///
    /// Starts with [`OwnerAuthorizer`] and no observer.
    pub fn new(
        store: S,
        treasury: Arc<dyn Treasury>,
        clock: Arc<dyn Clock>,
        config: LedgerConfig,
    ) -> Self {
        Self {
            store: Arc::new(store),
            treasury,
            clock,
            observer: Arc::new(NoopObserver),
            authorizer: Arc::new(OwnerAuthorizer),
            config,
            locks: StreamLocks::new(),
        }
    }

    /// Replace the observer.
    pub fn with_observer(mut self, observer: Arc<dyn Observer>) -> Self {
        self.observer = observer;
        self
    }

    /// Replace the authorizer.
    pub fn with_authorizer(mut self, authorizer: Arc<dyn Authorizer>) -> Self {
        self.authorizer = authorizer;
        self
    }

    /// Get the store reference.
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Current clock reading.
    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Stream Registry
    // ─────────────────────────────────────────────────────────────────────────

    /// Create a new stream from `params.sender` to `params.recipient`.
    ///
    /// With `fund_on_create`, the deposit is pulled from the sender into the
    /// escrow account first; no id is allocated if that transfer fails.
    pub async fn create_stream(&self, params: StreamParams) -> Result<StreamId> {
        let draft = params.validate().map_err(LedgerError::from_validation)?;

        if self.config.fund_on_create {
            if let Err(e) = self
                .treasury
                .transfer(
                    &params.asset,
                    &params.sender,
                    &self.config.escrow_account,
                    params.deposit,
                )
                .await
            {
                tracing::warn!(sender = %params.sender, error = %e, "stream funding rejected");
                return Err(e.into());
            }
        }

        let stream = match self.store.insert_stream(&draft).await {
            Ok(stream) => stream,
            Err(e) => {
                if self.config.fund_on_create {
                    self.refund_deposit(&params).await;
                }
                return Err(e.into());
            }
        };

        tracing::info!(
            stream = %stream.id,
            sender = %stream.sender,
            recipient = %stream.recipient,
            asset = %stream.asset,
            deposit = %stream.deposit,
            duration = stream.duration,
            "created stream"
        );

        self.observer.on_event(&LedgerEvent::Created(StreamCreated {
            id: stream.id,
            start_time: stream.start_time,
            deposit: stream.deposit,
            duration: stream.duration,
            rate_per_second: stream.rate_per_second,
            is_running: stream.is_running,
        }));

        Ok(stream.id)
    }

    /// Get the raw stream record.
    pub async fn get_stream(&self, id: StreamId) -> Result<Stream> {
        Ok(self.store.load_stream(id).await?)
    }

    /// Get the accrual view of a stream at the current clock reading.
    pub async fn get_accrual_view(&self, id: StreamId) -> Result<Accrual> {
        let stream = self.store.load_stream(id).await?;
        let view = stream.accrual(self.clock.now());
        tracing::debug!(
            stream = %id,
            at = view.computed_at,
            duration_elapsed = view.duration_elapsed,
            balance_accrued = %view.balance_accrued,
            "computed accrual"
        );
        Ok(view)
    }

    /// List stream ids matching `filter`, in ascending order.
    pub async fn list_streams(&self, filter: &StreamFilter) -> Result<Vec<StreamId>> {
        Ok(self.store.list_streams(filter).await?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Pause Controller
    // ─────────────────────────────────────────────────────────────────────────

    /// Stop accrual, banking the running segment.
    pub async fn pause_stream(&self, caller: &AccountId, id: StreamId) -> Result<()> {
        let (guard, mut stream) = self.lock_stream(id).await?;
        self.authorize(caller, Action::Pause, &stream)?;

        let now = self.clock.now();
        stream
            .pause(now)
            .map_err(|e| LedgerError::from_core(id, e))?;
        self.store.update_stream(&stream).await?;
        drop(guard);

        tracing::info!(
            stream = %id,
            at = now,
            accumulated_elapsed = stream.accumulated_elapsed,
            "paused stream"
        );
        self.observer.on_event(&LedgerEvent::Paused {
            id,
            at: now,
            duration_elapsed: stream.accumulated_elapsed,
        });
        Ok(())
    }

    /// Resume accrual from the current clock reading.
    pub async fn start_stream(&self, caller: &AccountId, id: StreamId) -> Result<()> {
        let (guard, mut stream) = self.lock_stream(id).await?;
        self.authorize(caller, Action::Resume, &stream)?;

        let now = self.clock.now();
        stream
            .resume(now)
            .map_err(|e| LedgerError::from_core(id, e))?;
        self.store.update_stream(&stream).await?;
        drop(guard);

        tracing::info!(stream = %id, at = now, stop_time = stream.stop_time, "resumed stream");
        self.observer.on_event(&LedgerEvent::Resumed {
            id,
            at: now,
            stop_time: stream.stop_time,
        });
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Withdrawal Processor
    // ─────────────────────────────────────────────────────────────────────────

    /// Pay `amount` of accrued balance out of escrow to `payout_target`.
    ///
    /// The booking is committed before the treasury is called, so anything
    /// the treasury does in the meantime (including calling back into this
    /// ledger) sees the reduced withdrawable balance. If the transfer fails
    /// the booking is reversed and the stream ends up as it started.
    ///
    /// Between the booking and its reversal, other readers see the booked
    /// `withdrawn`, and a concurrent withdrawal may be refused with
    /// `InsufficientAccrued` for an amount that becomes available again once
    /// the reversal lands. If the reversal itself cannot be stored, its store
    /// error is returned and the booking stays in place.
    pub async fn withdraw(
        &self,
        caller: &AccountId,
        id: StreamId,
        amount: Amount,
        payout_target: &AccountId,
    ) -> Result<()> {
        let (guard, mut stream) = self.lock_stream(id).await?;
        self.authorize(caller, Action::Withdraw, &stream)?;

        let now = self.clock.now();
        stream
            .reserve_withdrawal(amount, now)
            .map_err(|e| LedgerError::from_core(id, e))?;
        self.store.update_stream(&stream).await?;
        drop(guard);

        tracing::debug!(stream = %id, amount = %amount, "withdrawal reserved");

        if let Err(e) = self
            .treasury
            .transfer(
                &stream.asset,
                &self.config.escrow_account,
                payout_target,
                amount,
            )
            .await
        {
            self.release_reservation(id, amount).await?;
            tracing::warn!(
                stream = %id,
                amount = %amount,
                error = %e,
                "withdrawal rolled back"
            );
            return Err(e.into());
        }

        tracing::info!(
            stream = %id,
            amount = %amount,
            to = %payout_target,
            "withdrew from stream"
        );
        self.observer.on_event(&LedgerEvent::Withdrawn {
            id,
            amount,
            to: payout_target.clone(),
            total_withdrawn: stream.withdrawn,
        });
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internal
    // ─────────────────────────────────────────────────────────────────────────

    /// Lock `id` and load it under the lock.
    ///
    /// Unknown ids are rejected before a lock entry is created for them.
    async fn lock_stream(&self, id: StreamId) -> Result<(OwnedMutexGuard<()>, Stream)> {
        self.store.load_stream(id).await?;

        let guard = self.locks.acquire(id).await;
        let stream = self.store.load_stream(id).await?;
        Ok((guard, stream))
    }

    fn authorize(&self, caller: &AccountId, action: Action, stream: &Stream) -> Result<()> {
        if !self.config.enforce_authorization
            || self.authorizer.is_authorized(caller, action, stream)
        {
            return Ok(());
        }

        tracing::warn!(stream = %stream.id, %caller, %action, "caller not authorized");
        Err(LedgerError::NotAuthorized {
            caller: caller.clone(),
            action,
            id: stream.id,
        })
    }

    /// Undo a withdrawal booking after a failed transfer.
    async fn release_reservation(&self, id: StreamId, amount: Amount) -> Result<()> {
        let (_guard, mut stream) = self.lock_stream(id).await?;
        stream
            .release_withdrawal(amount)
            .map_err(|e| LedgerError::from_core(id, e))?;

        if let Err(e) = self.store.update_stream(&stream).await {
            tracing::error!(stream = %id, amount = %amount, error = %e, "failed to release withdrawal");
            return Err(e.into());
        }
        Ok(())
    }

    /// Return a deposit pulled for a stream that could not be stored.
    async fn refund_deposit(&self, params: &StreamParams) {
        if let Err(e) = self
            .treasury
            .transfer(
                &params.asset,
                &self.config.escrow_account,
                &params.sender,
                params.deposit,
            )
            .await
        {
            tracing::error!(sender = %params.sender, error = %e, "failed to refund deposit");
        } else {
            tracing::warn!(sender = %params.sender, deposit = %params.deposit, "refunded deposit");
        }
    }
}
