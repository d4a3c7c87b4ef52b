//! Typed request and notification bodies.
//!
//! Bodies are digested in their serialized form, so their shape must be stable: fields serialize in declaration order,
//! unset optional values are left out, and nested objects are always present (as `{}` when empty).
use std::{collections::BTreeMap, fmt::Display};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

// Largest integer an f64 holds exactly
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// A monetary amount in major currency units.
///
/// Whole amounts serialize as JSON integers (`1000`, never `1000.0`) so that every encoder in the chain agrees on the
/// bytes being digested.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd)]
pub struct Amount(f64);

impl Amount {
    pub fn new(value: f64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    fn as_whole(&self) -> Option<i64> {
        (self.0.is_finite() && self.0.fract() == 0.0 && self.0.abs() < MAX_EXACT_INTEGER).then(|| self.0 as i64)
    }
}

impl From<f64> for Amount {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

impl From<i64> for Amount {
    fn from(value: i64) -> Self {
        Self(value as f64)
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.as_whole() {
            Some(v) => write!(f, "{v}"),
            None => write!(f, "{}", self.0),
        }
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        match self.as_whole() {
            Some(v) => s.serialize_i64(v),
            None => s.serialize_f64(self.0),
        }
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        // Gateways are not consistent about quoting amounts in notifications
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawAmount {
            Number(f64),
            Text(String),
        }
        match RawAmount::deserialize(d)? {
            RawAmount::Number(v) => Ok(Self(v)),
            RawAmount::Text(s) => s
                .trim()
                .parse::<f64>()
                .map(Self)
                .map_err(|e| serde::de::Error::custom(format!("Invalid amount '{s}'. {e}"))),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomerInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// The body of a payment-order (payment initiation) request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentOrderRequest {
    pub order_id: String,
    pub amount: Amount,
    pub currency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub customer: CustomerInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fail_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancel_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipn_url: Option<String>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl PaymentOrderRequest {
    pub fn new<S: Into<String>>(order_id: S, amount: Amount, currency: S) -> Self {
        Self { order_id: order_id.into(), amount, currency: currency.into(), ..Default::default() }
    }
}

/// What the gateway answers to a payment-order request. Only the fields this crate acts on are typed; everything else
/// is kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentOrderResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub payment_url: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PaymentStatus {
    Success,
    Failed,
    Cancelled,
    Pending,
    Unknown(String),
}

impl From<String> for PaymentStatus {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "success" | "successful" | "paid" | "completed" => Self::Success,
            "failed" | "failure" | "declined" => Self::Failed,
            "cancelled" | "canceled" => Self::Cancelled,
            "pending" | "processing" => Self::Pending,
            _ => Self::Unknown(value),
        }
    }
}

impl From<PaymentStatus> for String {
    fn from(value: PaymentStatus) -> Self {
        value.to_string()
    }
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => f.write_str("SUCCESS"),
            Self::Failed => f.write_str("FAILED"),
            Self::Cancelled => f.write_str("CANCELLED"),
            Self::Pending => f.write_str("PENDING"),
            Self::Unknown(s) => f.write_str(s),
        }
    }
}

/// An instant payment notification: the gateway's asynchronous report of a transaction's final status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IpnNotification {
    pub order_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    pub status: PaymentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Amount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
