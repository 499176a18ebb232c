//! Storage layer for the booking engine.
//!
//! [`MemoryStore`] is the bundled backing store. Every multi-step
//! mutation in the engine runs through [`MemoryStore::unit_of_work`],
//! which provides the begin / read-write / commit-or-abort-all boundary
//! the correctness argument rests on: a unit observes and mutates a
//! private snapshot, and the snapshot replaces the live data only when
//! the unit returns `Ok`. Units are serialized by a single writer lock,
//! which is this store's transaction-isolation mechanism; a durable
//! backend would supply the same contract with database transactions.

use crate::error::{Error, Result};
use crate::types::{
    Account, AccountId, Booking, BookingId, Payment, PaymentId, Showtime, ShowtimeId, SeatId,
};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Mutex, PoisonError};

/// All persistent state, visible to a unit of work as one snapshot
#[derive(Clone, Debug, Default)]
pub struct StoreData {
    /// Accounts by id
    pub accounts: HashMap<AccountId, Account>,
    /// Showtimes with their read-only seat layouts
    pub showtimes: HashMap<ShowtimeId, Showtime>,
    /// Bookings by id
    pub bookings: HashMap<BookingId, Booking>,
    /// Payments by id
    pub payments: HashMap<PaymentId, Payment>,
    /// Inventory ledger: per showtime, the ordered set of seat claims
    pub claims: HashMap<ShowtimeId, BTreeMap<SeatId, BookingId>>,
    /// Every ticket number ever issued, for uniqueness checks
    pub issued_tickets: HashSet<String>,
}

impl StoreData {
    /// Looks up an account by contact email
    #[must_use]
    pub fn account_by_email(&self, email: &str) -> Option<&Account> {
        self.accounts.values().find(|account| account.email == email)
    }

    /// Booking lookup that reports absence as [`Error::BookingNotFound`]
    ///
    /// # Errors
    ///
    /// Returns `BookingNotFound` if no booking has this id.
    pub fn booking(&self, id: BookingId) -> Result<&Booking> {
        self.bookings.get(&id).ok_or(Error::BookingNotFound(id))
    }

    /// Mutable booking lookup that reports absence as [`Error::BookingNotFound`]
    ///
    /// # Errors
    ///
    /// Returns `BookingNotFound` if no booking has this id.
    pub fn booking_mut(&mut self, id: BookingId) -> Result<&mut Booking> {
        self.bookings.get_mut(&id).ok_or(Error::BookingNotFound(id))
    }

    /// Showtime lookup that reports absence as [`Error::ShowtimeNotFound`]
    ///
    /// # Errors
    ///
    /// Returns `ShowtimeNotFound` if no showtime has this id.
    pub fn showtime(&self, id: ShowtimeId) -> Result<&Showtime> {
        self.showtimes.get(&id).ok_or(Error::ShowtimeNotFound(id))
    }
}

/// In-memory store with serialized units of work.
///
/// Cheap to clone via `Arc`; request handlers and the reclaimer share
/// one instance and never coordinate through any other lock.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<StoreData>,
}

impl MemoryStore {
    /// Creates an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `f` as one atomic unit of work.
    ///
    /// `f` receives a private snapshot of the store. If it returns `Ok`
    /// the snapshot is committed wholesale; if it returns `Err` every
    /// write it made is discarded. Units are serialized: the
    /// read-check-write sequence inside `f` is atomic with respect to
    /// every other unit.
    ///
    /// # Errors
    ///
    /// Propagates the error returned by `f`; the store is unchanged in
    /// that case.
    pub fn unit_of_work<T>(&self, f: impl FnOnce(&mut StoreData) -> Result<T>) -> Result<T> {
        // A poisoned lock cannot expose partial writes: the live data is
        // only ever replaced by a fully committed snapshot.
        let mut live = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let mut snapshot = live.clone();
        let value = f(&mut snapshot)?;
        *live = snapshot;
        Ok(value)
    }

    /// Runs `f` against a read-only view of the committed state.
    pub fn read<T>(&self, f: impl FnOnce(&StoreData) -> T) -> T {
        let live = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&live)
    }

    /// Seeds a showtime and its seat layout (read-only input to the engine).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if a showtime with this id is
    /// already present.
    pub fn insert_showtime(&self, showtime: Showtime) -> Result<()> {
        self.unit_of_work(|data| {
            if data.showtimes.contains_key(&showtime.id) {
                return Err(Error::Validation(format!(
                    "showtime {} already exists",
                    showtime.id
                )));
            }
            data.showtimes.insert(showtime.id, showtime);
            Ok(())
        })
    }
}
