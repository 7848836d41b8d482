//! Test fixtures and helpers.
//!
//! Common setup code for integration tests: a settable clock, treasuries that
//! fail or call back into the ledger on demand, an observer that records what
//! it sees, and a ready-made ledger wired to all of them.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError, Weak};

use async_trait::async_trait;
use drip::{
    AccountId, Amount, AssetId, Clock, Ledger, LedgerConfig, LedgerEvent, LedgerError,
    MemoryTreasury, Observer, StreamId, StreamParams, Timestamp, TransferError, Treasury,
};
use drip_store::{MemoryStore, Store};

/// Fixed starting time for fixtures.
pub const T0: Timestamp = 1_700_000_000;

/// Balance minted to the fixture's sender.
pub const SENDER_FUNDS: Amount = 1_000_000_000;

// ─────────────────────────────────────────────────────────────────────────────
// Clock
// ─────────────────────────────────────────────────────────────────────────────

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: AtomicU64::new(start),
        }
    }

    pub fn set(&self, now: Timestamp) {
        self.now.store(now, Ordering::SeqCst);
    }

    pub fn advance(&self, secs: u64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        self.now.load(Ordering::SeqCst)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Observer
// ─────────────────────────────────────────────────────────────────────────────

/// Records every event it is handed.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<LedgerEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events seen so far, oldest first.
    pub fn events(&self) -> Vec<LedgerEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn clear(&self) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl Observer for RecordingObserver {
    fn on_event(&self, event: &LedgerEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Treasuries
// ─────────────────────────────────────────────────────────────────────────────

/// A [`MemoryTreasury`] that can be switched into rejecting every transfer.
#[derive(Debug, Default)]
pub struct FailingTreasury {
    inner: MemoryTreasury,
    failing: AtomicBool,
    attempts: AtomicU64,
}

impl FailingTreasury {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inner(&self) -> &MemoryTreasury {
        &self.inner
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of transfers attempted, successful or not.
    pub fn attempts(&self) -> u64 {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Treasury for FailingTreasury {
    async fn transfer(
        &self,
        asset: &AssetId,
        from: &AccountId,
        to: &AccountId,
        amount: Amount,
    ) -> Result<(), TransferError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(TransferError::Rejected("treasury offline".to_string()));
        }
        self.inner.transfer(asset, from, to, amount).await
    }
}

/// What a [`ReentrantTreasury`] saw when it called back into the ledger.
#[derive(Debug)]
pub struct ReentryOutcome {
    /// `withdrawn` as read from the ledger during the outer transfer.
    pub observed_withdrawn: Amount,
    /// Result of the nested withdrawal.
    pub result: Result<(), LedgerError>,
}

/// A treasury that, during its first payout, tries to withdraw again from the
/// same stream before completing the outer transfer.
pub struct ReentrantTreasury {
    inner: MemoryTreasury,
    ledger: OnceLock<Weak<Ledger<MemoryStore>>>,
    target: Mutex<Option<(StreamId, AccountId, Amount)>>,
    outcome: Mutex<Option<ReentryOutcome>>,
}

impl ReentrantTreasury {
    pub fn new() -> Self {
        Self {
            inner: MemoryTreasury::new(),
            ledger: OnceLock::new(),
            target: Mutex::new(None),
            outcome: Mutex::new(None),
        }
    }

    pub fn inner(&self) -> &MemoryTreasury {
        &self.inner
    }

    /// Point the treasury at the ledger it should call back into.
    pub fn attach(&self, ledger: &Arc<Ledger<MemoryStore>>) {
        let _ = self.ledger.set(Arc::downgrade(ledger));
    }

    /// Arm a single nested withdrawal of `amount` from `id` by `caller`.
    pub fn arm(&self, id: StreamId, caller: AccountId, amount: Amount) {
        *self.target.lock().unwrap_or_else(PoisonError::into_inner) = Some((id, caller, amount));
    }

    /// Take the outcome of the nested call, if one happened.
    pub fn take_outcome(&self) -> Option<ReentryOutcome> {
        self.outcome
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

impl Default for ReentrantTreasury {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Treasury for ReentrantTreasury {
    async fn transfer(
        &self,
        asset: &AssetId,
        from: &AccountId,
        to: &AccountId,
        amount: Amount,
    ) -> Result<(), TransferError> {
        let target = self
            .target
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let ledger = self.ledger.get().and_then(Weak::upgrade);

        if let (Some((id, caller, nested_amount)), Some(ledger)) = (target, ledger) {
            let observed_withdrawn = ledger
                .get_stream(id)
                .await
                .map(|s| s.withdrawn)
                .map_err(|e| TransferError::Rejected(e.to_string()))?;
            let result = ledger.withdraw(&caller, id, nested_amount, &caller).await;

            *self.outcome.lock().unwrap_or_else(PoisonError::into_inner) = Some(ReentryOutcome {
                observed_withdrawn,
                result,
            });
        }

        self.inner.transfer(asset, from, to, amount).await
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Ledger fixture
// ─────────────────────────────────────────────────────────────────────────────

/// A ledger over `S` with a manual clock, a funded sender and a recording
/// observer.
pub struct TestFixture<S: Store = MemoryStore> {
    pub ledger: Arc<Ledger<S>>,
    pub treasury: Arc<MemoryTreasury>,
    pub clock: Arc<ManualClock>,
    pub observer: Arc<RecordingObserver>,
}

impl TestFixture<MemoryStore> {
    /// Memory-backed fixture with the default config.
    pub fn new() -> Self {
        Self::with_store(MemoryStore::new(), LedgerConfig::default())
    }

    pub fn with_config(config: LedgerConfig) -> Self {
        Self::with_store(MemoryStore::new(), config)
    }
}

impl Default for TestFixture<MemoryStore> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Store> TestFixture<S> {
    pub fn with_store(store: S, config: LedgerConfig) -> Self {
        let treasury = Arc::new(MemoryTreasury::new());
        treasury.mint(&asset(), &sender(), SENDER_FUNDS);

        let clock = Arc::new(ManualClock::new(T0));
        let observer = Arc::new(RecordingObserver::new());
        let ledger = Ledger::new(store, treasury.clone(), clock.clone(), config)
            .with_observer(observer.clone());

        Self {
            ledger: Arc::new(ledger),
            treasury,
            clock,
            observer,
        }
    }

    /// Parameters for a sender-to-recipient stream starting now.
    pub fn params(&self, deposit: Amount, duration: u64) -> StreamParams {
        StreamParams::new(sender(), recipient(), asset(), deposit, duration, self.clock.now())
    }

    /// Create a stream starting now.
    pub async fn create(&self, deposit: Amount, duration: u64) -> drip::Result<StreamId> {
        self.ledger.create_stream(self.params(deposit, duration)).await
    }

    pub fn advance(&self, secs: u64) {
        self.clock.advance(secs);
    }

    pub fn escrow(&self) -> &AccountId {
        &self.ledger.config().escrow_account
    }

    /// Treasury balance of `account` in the fixture asset.
    pub fn balance(&self, account: &AccountId) -> Amount {
        self.treasury.balance(&asset(), account)
    }
}

/// The account that funds fixture streams.
pub fn sender() -> AccountId {
    AccountId::from("alice")
}

/// The account fixture streams pay out to.
pub fn recipient() -> AccountId {
    AccountId::from("bob")
}

/// The fixture asset.
pub fn asset() -> AssetId {
    AssetId::from("DAI")
}
