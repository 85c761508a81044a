//! Unified error codes for the storefront
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication / session errors
//! - 2xxx: Permission errors
//! - 4xxx: Order errors
//! - 6xxx: Product / catalog errors
//! - 7xxx: Shipping / postal errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// Codes are represented as u16 values for efficient serialization and
/// stable comparison across crates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (email/password)
    InvalidCredentials = 1002,
    /// Session has expired
    SessionExpired = 1005,
    /// Authenticated identity has no usable profile
    ProfileIncomplete = 1010,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Admin role required
    AdminRequired = 2003,
    /// Backend row policy rejected the operation
    RowPolicyDenied = 2004,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Order is not in the Pendente status
    OrderNotPending = 4002,
    /// Cart is empty
    OrderEmpty = 4003,
    /// No shipping option selected
    ShippingNotSelected = 4004,
    /// Delivery address is incomplete
    AddressIncomplete = 4005,
    /// Order line items failed after the header was written
    OrderPartialWrite = 4006,
    /// Not enough stock to authorize the order
    InsufficientStock = 4007,

    // ==================== 6xxx: Product ====================
    /// Product not found
    ProductNotFound = 6001,
    /// Requested quantity exceeds the stock snapshot
    StockExceeded = 6002,
    /// Product requires at least one image
    ImageRequired = 6003,

    // ==================== 7xxx: Shipping ====================
    /// Postal code is not eight digits
    PostalCodeInvalid = 7001,
    /// Postal code was not found by the lookup service
    PostalCodeNotFound = 7002,
    /// Postal lookup service failed
    PostalLookupFailed = 7003,

    // ==================== 9xxx: System ====================
    /// Internal error
    InternalError = 9001,
    /// Backend (row store / RPC) error
    BackendError = 9002,
    /// Object storage error
    StorageError = 9003,
    /// Network error
    NetworkError = 9004,
}

impl ErrorCode {
    /// Numeric value of this code
    pub fn code(&self) -> u16 {
        *self as u16
    }

    /// Default human-readable message for this code
    pub fn message(&self) -> &'static str {
        match self {
            Self::Unknown => "Unknown error",
            Self::ValidationFailed => "Validation failed",
            Self::NotFound => "Resource not found",
            Self::InvalidRequest => "Invalid request",
            Self::InvalidFormat => "Invalid format",
            Self::RequiredField => "Required field missing",

            Self::NotAuthenticated => "Not authenticated",
            Self::InvalidCredentials => "Invalid email or password",
            Self::SessionExpired => "Session expired",
            Self::ProfileIncomplete => "Signup data incomplete, profile cannot be created",

            Self::PermissionDenied => "Permission denied",
            Self::AdminRequired => "Administrator role required",
            Self::RowPolicyDenied => "Backend access policy rejected the operation",

            Self::OrderNotFound => "Order not found",
            Self::OrderNotPending => "Order is no longer pending",
            Self::OrderEmpty => "Cart is empty",
            Self::ShippingNotSelected => "No shipping option selected",
            Self::AddressIncomplete => "Delivery address is incomplete",
            Self::OrderPartialWrite => "Order items could not be saved",
            Self::InsufficientStock => "Insufficient stock",

            Self::ProductNotFound => "Product not found",
            Self::StockExceeded => "Requested quantity exceeds available stock",
            Self::ImageRequired => "At least one product image is required",

            Self::PostalCodeInvalid => "Postal code must have exactly 8 digits",
            Self::PostalCodeNotFound => "Postal code not found",
            Self::PostalLookupFailed => "Postal lookup failed",

            Self::InternalError => "Internal error",
            Self::BackendError => "Backend error",
            Self::StorageError => "Storage error",
            Self::NetworkError => "Network error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> u16 {
        code.code()
    }
}

impl TryFrom<u16> for ErrorCode {
    type Error = String;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        let code = match value {
            1 => Self::Unknown,
            2 => Self::ValidationFailed,
            3 => Self::NotFound,
            5 => Self::InvalidRequest,
            6 => Self::InvalidFormat,
            7 => Self::RequiredField,

            1001 => Self::NotAuthenticated,
            1002 => Self::InvalidCredentials,
            1005 => Self::SessionExpired,
            1010 => Self::ProfileIncomplete,

            2001 => Self::PermissionDenied,
            2003 => Self::AdminRequired,
            2004 => Self::RowPolicyDenied,

            4001 => Self::OrderNotFound,
            4002 => Self::OrderNotPending,
            4003 => Self::OrderEmpty,
            4004 => Self::ShippingNotSelected,
            4005 => Self::AddressIncomplete,
            4006 => Self::OrderPartialWrite,
            4007 => Self::InsufficientStock,

            6001 => Self::ProductNotFound,
            6002 => Self::StockExceeded,
            6003 => Self::ImageRequired,

            7001 => Self::PostalCodeInvalid,
            7002 => Self::PostalCodeNotFound,
            7003 => Self::PostalLookupFailed,

            9001 => Self::InternalError,
            9002 => Self::BackendError,
            9003 => Self::StorageError,
            9004 => Self::NetworkError,

            other => return Err(format!("unknown error code: {}", other)),
        };
        Ok(code)
    }
}
