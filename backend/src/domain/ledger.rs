//! Ledger entities: orders, points, withdrawals and balances.
//!
//! Amounts are held as integer hundredths of a point so that balance
//! arithmetic is exact. Adapters convert to and from decimal JSON numbers at
//! the boundary.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use super::UserId;

/// Validation errors returned when parsing an [`OrderNumber`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderNumberValidationError {
    #[error("order number must not be empty")]
    Empty,
    #[error("order number must contain only ASCII digits")]
    NonDigit,
    #[error("order number must be at most {max} digits, got {length}")]
    TooLong { length: usize, max: usize },
    #[error("order number fails the Luhn checksum")]
    Checksum,
}

/// Longest order number the ledger columns can hold.
pub const ORDER_NUMBER_MAX_LEN: usize = 64;

/// Purchase order number validated with the Luhn checksum.
///
/// # Examples
/// ```
/// use loyalty_backend::domain::OrderNumber;
///
/// let number = OrderNumber::new(" 79927398713 ").expect("Luhn-valid");
/// assert_eq!(number.as_str(), "79927398713");
/// assert!(OrderNumber::new("79927398710").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OrderNumber(String);

impl OrderNumber {
    pub fn new(raw: impl AsRef<str>) -> Result<Self, OrderNumberValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(OrderNumberValidationError::Empty);
        }
        if !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(OrderNumberValidationError::NonDigit);
        }
        if trimmed.len() > ORDER_NUMBER_MAX_LEN {
            return Err(OrderNumberValidationError::TooLong {
                length: trimmed.len(),
                max: ORDER_NUMBER_MAX_LEN,
            });
        }
        if !luhn_valid(trimmed) {
            return Err(OrderNumberValidationError::Checksum);
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

fn luhn_valid(digits: &str) -> bool {
    let sum: u32 = digits
        .bytes()
        .rev()
        .enumerate()
        .map(|(index, byte)| {
            let digit = u32::from(byte - b'0');
            if index % 2 == 1 {
                let doubled = digit * 2;
                if doubled > 9 { doubled - 9 } else { doubled }
            } else {
                digit
            }
        })
        .sum();
    sum % 10 == 0
}

impl fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderNumber {
    type Err = OrderNumberValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Error returned when a stored or remote status string is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown order status: {0}")]
pub struct UnknownOrderStatus(pub String);

/// Lifecycle of an uploaded order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderStatus {
    New,
    Processing,
    Invalid,
    Processed,
}

impl OrderStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "NEW",
            Self::Processing => "PROCESSING",
            Self::Invalid => "INVALID",
            Self::Processed => "PROCESSED",
        }
    }

}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = UnknownOrderStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NEW" => Ok(Self::New),
            "PROCESSING" => Ok(Self::Processing),
            "INVALID" => Ok(Self::Invalid),
            "PROCESSED" => Ok(Self::Processed),
            other => Err(UnknownOrderStatus(other.to_owned())),
        }
    }
}

/// Statuses the poller may write; once reached they are never revisited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TerminalStatus {
    Processed,
    Invalid,
}

impl From<TerminalStatus> for OrderStatus {
    fn from(value: TerminalStatus) -> Self {
        match value {
            TerminalStatus::Processed => Self::Processed,
            TerminalStatus::Invalid => Self::Invalid,
        }
    }
}

/// Errors raised while converting a decimal amount into [`Points`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PointsError {
    #[error("amount must be a finite number")]
    NotFinite,
    #[error("amount is out of range")]
    OutOfRange,
}

/// Fixed-point loyalty amount in hundredths of a point.
///
/// # Examples
/// ```
/// use loyalty_backend::domain::Points;
///
/// let amount = Points::try_from_decimal(729.98).expect("finite");
/// assert_eq!(amount.hundredths(), 72_998);
/// assert_eq!(amount.to_string(), "729.98");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Points(i64);

// Keeps every representable value exactly convertible through f64.
const MAX_HUNDREDTHS: f64 = 9_007_199_254_740_991.0;

impl Points {
    pub const ZERO: Self = Self(0);

    pub const fn from_hundredths(hundredths: i64) -> Self {
        Self(hundredths)
    }

    /// Whole points, for fixtures and tests.
    pub const fn from_whole(points: i64) -> Self {
        Self(points * 100)
    }

    pub const fn hundredths(self) -> i64 {
        self.0
    }

    /// Round a decimal amount half away from zero to the nearest hundredth.
    pub fn try_from_decimal(value: f64) -> Result<Self, PointsError> {
        if !value.is_finite() {
            return Err(PointsError::NotFinite);
        }
        let scaled = (value * 100.0).round();
        if scaled.abs() > MAX_HUNDREDTHS {
            return Err(PointsError::OutOfRange);
        }
        Ok(Self(scaled as i64))
    }

    pub fn to_decimal(self) -> f64 {
        self.0 as f64 / 100.0
    }

    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }
}

impl fmt::Display for Points {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let magnitude = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", magnitude / 100, magnitude % 100)
    }
}

/// An order as recorded in the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub number: OrderNumber,
    pub user_id: UserId,
    pub status: OrderStatus,
    /// Present only once the order is `PROCESSED`.
    pub accrual: Option<Points>,
    pub uploaded_at: DateTime<Utc>,
}

/// Outcome of a successful order upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderIntake {
    /// Newly recorded in status `NEW`.
    Accepted,
    /// The same user already uploaded this number; nothing changed.
    AlreadyOwned,
}

/// Terminal verdict from the accrual authority, ready to fold into the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccrualUpdate {
    pub number: OrderNumber,
    pub status: TerminalStatus,
    pub accrual: Points,
}

impl AccrualUpdate {
    pub fn processed(number: OrderNumber, accrual: Points) -> Self {
        Self {
            number,
            status: TerminalStatus::Processed,
            accrual,
        }
    }

    /// `INVALID` orders never earn points.
    pub fn invalid(number: OrderNumber) -> Self {
        Self {
            number,
            status: TerminalStatus::Invalid,
            accrual: Points::ZERO,
        }
    }
}

/// A committed spend of points against an order reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Withdrawal {
    pub order: OrderNumber,
    pub user_id: UserId,
    pub amount: Points,
    pub processed_at: DateTime<Utc>,
}

/// Request to spend points; validated by the service before reaching storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithdrawalRequest {
    pub user_id: UserId,
    pub order: OrderNumber,
    pub amount: Points,
}

/// Derived balance computed from one consistent snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Balance {
    pub current: Points,
    pub withdrawn: Points,
}
