//! Domain types for the seat-booking engine.
//!
//! This module contains the value objects and entities shared by every
//! component: identifiers, money, seat metadata, bookings, payments, and
//! the typed payment instrument. Constructors validate shape up front so
//! malformed values never reach a unit of work.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Identifiers
// ============================================================================

/// Unique identifier for a showtime
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ShowtimeId(Uuid);

impl ShowtimeId {
    /// Creates a new random `ShowtimeId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `ShowtimeId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ShowtimeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ShowtimeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a seat within a showtime layout
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SeatId(Uuid);

impl SeatId {
    /// Creates a new random `SeatId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `SeatId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SeatId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SeatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a booking
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BookingId(Uuid);

impl BookingId {
    /// Creates a new random `BookingId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `BookingId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for BookingId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BookingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for an account (registered or guest)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId(Uuid);

impl AccountId {
    /// Creates a new random `AccountId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create an `AccountId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a payment record
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PaymentId(Uuid);

impl PaymentId {
    /// Creates a new random `PaymentId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `PaymentId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for PaymentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PaymentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Money Value Object (cents-based to avoid floating point errors)
// ============================================================================

/// Represents money in cents to avoid floating-point arithmetic errors.
///
/// The unsigned representation makes the `amount >= 0` constraint
/// structural rather than checked.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Money(u64);

impl Money {
    /// Creates a `Money` value from cents
    #[must_use]
    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    /// Returns the amount in cents
    #[must_use]
    pub const fn cents(&self) -> u64 {
        self.0
    }

    /// Checks if the amount is zero
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Adds two money amounts with overflow checking
    #[must_use]
    pub const fn checked_add(self, other: Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(result) => Some(Self(result)),
            None => None,
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}.{:02}", self.0 / 100, self.0 % 100)
    }
}

// ============================================================================
// Seats and Showtimes (read-only layout input)
// ============================================================================

/// Category of a seat in the layout
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SeatKind {
    /// Standard seat
    Regular,
    /// Premium seat
    Vip,
    /// Wheelchair-accessible seat
    Accessible,
}

impl fmt::Display for SeatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Regular => write!(f, "REGULAR"),
            Self::Vip => write!(f, "VIP"),
            Self::Accessible => write!(f, "ACCESSIBLE"),
        }
    }
}

/// One seat in a showtime layout
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seat {
    /// Unique seat identifier
    pub id: SeatId,
    /// Row label (e.g. "A")
    pub row: String,
    /// Seat number within the row
    pub number: u32,
    /// Seat category
    pub kind: SeatKind,
    /// Price for this seat
    pub price: Money,
}

impl Seat {
    /// Creates a new layout `Seat`
    #[must_use]
    pub const fn new(id: SeatId, row: String, number: u32, kind: SeatKind, price: Money) -> Self {
        Self {
            id,
            row,
            number,
            kind,
            price,
        }
    }
}

/// A showtime with its pre-generated seat layout.
///
/// The layout is read-only input to the booking engine: this system
/// never creates, reorders, or reprices seats.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Showtime {
    /// Unique showtime identifier
    pub id: ShowtimeId,
    /// Film title
    pub film: String,
    /// Screen name (e.g. "Screen 3")
    pub screen: String,
    /// Scheduled start time
    pub starts_at: DateTime<Utc>,
    /// Ordered seat layout
    pub seats: Vec<Seat>,
}

impl Showtime {
    /// Creates a new `Showtime`
    #[must_use]
    pub const fn new(
        id: ShowtimeId,
        film: String,
        screen: String,
        starts_at: DateTime<Utc>,
        seats: Vec<Seat>,
    ) -> Self {
        Self {
            id,
            film,
            screen,
            starts_at,
            seats,
        }
    }

    /// Looks up a layout seat by id
    #[must_use]
    pub fn seat(&self, id: SeatId) -> Option<&Seat> {
        self.seats.iter().find(|seat| seat.id == id)
    }
}

/// One seat picked in a booking request
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatSelection {
    /// Layout seat being claimed
    pub seat_id: SeatId,
    /// Row label, echoed from the layout
    pub row: String,
    /// Seat number, echoed from the layout
    pub number: u32,
    /// Seat category, echoed from the layout
    #[serde(rename = "seat_type")]
    pub kind: SeatKind,
}

// ============================================================================
// Booking
// ============================================================================

/// Lifecycle status of a booking.
///
/// `Temporary` is the only non-terminal state; transition rules live in
/// [`crate::state_machine`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    /// Time-bounded hold awaiting payment
    Temporary,
    /// Paid and confirmed (terminal)
    Completed,
    /// Abandoned, expired, or explicitly cancelled (terminal)
    Cancelled,
}

impl BookingStatus {
    /// Whether this status admits no further transitions
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Temporary => write!(f, "temporary"),
            Self::Completed => write!(f, "completed"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Payment progress recorded on the booking itself
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentProgress {
    /// No payment attempt has succeeded or failed yet
    Pending,
    /// Payment captured
    Completed,
    /// Last payment attempt failed, or the hold was abandoned
    Failed,
}

/// One reservation attempt and its lifecycle state
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    /// Unique booking identifier
    pub id: BookingId,
    /// Account that owns the booking
    pub account_id: AccountId,
    /// Showtime the seats belong to
    pub showtime_id: ShowtimeId,
    /// Ordered seat selections
    pub seats: Vec<SeatSelection>,
    /// Total amount to pay
    pub total_amount: Money,
    /// Current lifecycle status
    pub status: BookingStatus,
    /// Payment progress
    pub payment_status: PaymentProgress,
    /// Ticket number, assigned only on completion, globally unique
    pub ticket_number: Option<String>,
    /// Hold deadline, present only while `status` is `Temporary`
    pub expires_at: Option<DateTime<Utc>>,
    /// When the booking was created
    pub created_at: DateTime<Utc>,
}

impl Booking {
    /// Whether this booking is a hold whose deadline has passed
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.status == BookingStatus::Temporary
            && self.expires_at.is_some_and(|deadline| deadline <= now)
    }

    /// Whether this booking holds an *active* claim on its seats: either
    /// confirmed, or a hold whose deadline is still in the future.
    #[must_use]
    pub fn holds_active_claim(&self, now: DateTime<Utc>) -> bool {
        match self.status {
            BookingStatus::Completed => true,
            BookingStatus::Temporary => !self.is_expired(now),
            BookingStatus::Cancelled => false,
        }
    }
}

// ============================================================================
// Payment
// ============================================================================

/// Settlement status of a payment record
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Initiated, not yet settled
    Pending,
    /// Captured
    Completed,
    /// Rejected
    Failed,
}

/// Masked summary of the card used for a payment.
///
/// Only the last four digits and expiry components are ever stored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardSummary {
    /// Last four digits of the card number
    pub last_four: String,
    /// Expiry month component
    pub expiry_month: u32,
    /// Expiry year component (two digits)
    pub expiry_year: u32,
}

/// Payment record, one-to-one with a completed booking.
///
/// Created only by the payment finalizer; immutable after creation
/// except `status` on reconciliation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    /// Unique payment identifier
    pub id: PaymentId,
    /// Booking this payment settled
    pub booking_id: BookingId,
    /// Amount charged
    pub amount: Money,
    /// Masked card summary
    pub card: CardSummary,
    /// Settlement status
    pub status: PaymentStatus,
    /// Globally unique gateway transaction identifier
    pub transaction_id: String,
    /// When the payment was processed
    pub processed_at: DateTime<Utc>,
}

// ============================================================================
// Accounts and guest identity
// ============================================================================

/// Constant placeholder credential assigned to guest accounts.
///
/// Guests never authenticate with it; keeping it constant means guest
/// creation can never be blocked by a duplicate-credential conflict.
pub const GUEST_PLACEHOLDER_CREDENTIAL: &str = "guest-no-login";

/// A customer account, registered or guest
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Unique account identifier
    pub id: AccountId,
    /// Display name
    pub name: String,
    /// Contact email; guest accounts are keyed by this
    pub email: String,
    /// Contact phone
    pub phone: String,
    /// Opaque credential; guests carry [`GUEST_PLACEHOLDER_CREDENTIAL`]
    pub credential: String,
    /// Whether this account was created through the guest flow
    pub is_guest: bool,
}

/// Guest contact details supplied when no authenticated identity exists
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestContact {
    /// Guest name
    pub name: String,
    /// Contact email, used as the lookup key
    pub email: String,
    /// Contact phone
    pub phone: String,
}

impl GuestContact {
    /// Validates the contact shape before it enters any transaction.
    ///
    /// # Errors
    ///
    /// Returns a reason string if the name is empty or the email is not
    /// a plausible address.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("guest name must not be empty".to_string());
        }
        if self.email.trim().is_empty() {
            return Err("guest email must not be empty".to_string());
        }
        if !self.email.contains('@') {
            return Err(format!("'{}' is not a valid email address", self.email));
        }
        Ok(())
    }
}

/// The identity attached to a booking request
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BookingIdentity {
    /// An authenticated account id, used as-is
    Registered(AccountId),
    /// Guest contact details, resolved-or-created by email
    Guest(GuestContact),
}

// ============================================================================
// Payment instrument
// ============================================================================

/// Raw card details as submitted by a client
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct CardDetails {
    /// Card number (expected: exactly 16 digits)
    pub number: String,
    /// Expiry in `MM/YY` form
    pub expiry: String,
    /// Card verification value (expected: exactly 3 digits)
    pub cvv: String,
}

impl CardDetails {
    /// Validates the instrument shape and produces the masked summary
    /// stored on the payment record.
    ///
    /// # Errors
    ///
    /// Returns the specific validation reason: wrong card-number length
    /// or non-digit characters, malformed expiry, or a bad CVV.
    pub fn validate(&self) -> Result<CardSummary, String> {
        let number = self.number.trim();
        if number.len() != 16 || !number.chars().all(|c| c.is_ascii_digit()) {
            return Err("card number must be exactly 16 digits".to_string());
        }

        let cvv = self.cvv.trim();
        if cvv.len() != 3 || !cvv.chars().all(|c| c.is_ascii_digit()) {
            return Err("CVV must be exactly 3 digits".to_string());
        }

        let (month, year) = self
            .expiry
            .trim()
            .split_once('/')
            .ok_or_else(|| "expiry must be in MM/YY format".to_string())?;
        let month: u32 = month
            .parse()
            .map_err(|_| "expiry month must be numeric".to_string())?;
        let year: u32 = year
            .parse()
            .map_err(|_| "expiry year must be numeric".to_string())?;

        Ok(CardSummary {
            last_four: number[number.len() - 4..].to_string(),
            expiry_month: month,
            expiry_year: year,
        })
    }
}
