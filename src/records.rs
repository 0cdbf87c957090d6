//! Client Records

use std::fmt::{Display, Formatter, Result as FmtResult};

use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::normalize::is_valid_registration;

/// Opaque record identifier, used as the merge key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Borrow the identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for RecordId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A single client entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Unique identifier, never reassigned.
    pub id: RecordId,

    /// Creation instant.
    #[serde(with = "timestamp")]
    pub created_at: Timestamp,

    /// Client name, never empty.
    pub name: String,

    /// Client phone number, never empty.
    pub phone: String,

    /// Agreed price, never negative.
    #[serde(default, with = "price")]
    pub price: Decimal,

    /// Vehicle description.
    #[serde(default)]
    pub car: String,

    /// Uppercased registration plate.
    #[serde(default)]
    pub reg: String,

    /// Instant of the last edit, if any.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "timestamp::optional"
    )]
    pub updated_at: Option<Timestamp>,
}

/// Fixed-width UTC text for an instant, always with millisecond precision.
pub fn iso_timestamp(timestamp: Timestamp) -> String {
    format!("{timestamp:.3}")
}

impl Record {
    /// Price in its shortest textual form (`50`, `12.5`).
    pub fn price_text(&self) -> String {
        self.price.normalize().to_string()
    }
}

/// Reasons manual input is refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Name was empty after trimming.
    #[error("Enter client name")]
    MissingName,

    /// Phone was empty after trimming.
    #[error("Enter phone number")]
    MissingPhone,

    /// Registration does not follow the plate grammar.
    #[error("Invalid registration {0:?}, expected e.g. 231-D-12345")]
    InvalidRegistration(String),

    /// Price below zero.
    #[error("Price cannot be negative")]
    NegativePrice,
}

/// User-supplied fields for adding or editing a record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFields {
    /// Client name
    pub name: String,

    /// Client phone number
    pub phone: String,

    /// Price, zero when omitted
    pub price: Option<Decimal>,

    /// Vehicle
    pub car: String,

    /// Registration plate
    pub reg: String,
}

/// Fields that passed validation, trimmed and normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ValidFields {
    pub(crate) name: String,
    pub(crate) phone: String,
    pub(crate) price: Decimal,
    pub(crate) car: String,
    pub(crate) reg: String,
}

impl RecordFields {
    /// Trim, uppercase the registration and check required fields.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for a blank name or phone, a malformed
    /// registration or a negative price.
    pub(crate) fn validate(&self) -> Result<ValidFields, ValidationError> {
        let name = self.name.trim();
        let phone = self.phone.trim();
        let reg = self.reg.trim().to_uppercase();
        let price = self.price.unwrap_or(Decimal::ZERO);

        if name.is_empty() {
            return Err(ValidationError::MissingName);
        }

        if phone.is_empty() {
            return Err(ValidationError::MissingPhone);
        }

        if !is_valid_registration(&reg) {
            return Err(ValidationError::InvalidRegistration(reg));
        }

        if price < Decimal::ZERO {
            return Err(ValidationError::NegativePrice);
        }

        Ok(ValidFields {
            name: name.to_string(),
            phone: phone.to_string(),
            price,
            car: self.car.trim().to_string(),
            reg,
        })
    }
}

impl From<&Record> for RecordFields {
    fn from(record: &Record) -> Self {
        Self {
            name: record.name.clone(),
            phone: record.phone.clone(),
            price: Some(record.price),
            car: record.car.clone(),
            reg: record.reg.clone(),
        }
    }
}

/// Prices travel as exact JSON numbers in their shortest form.
mod price {
    use rust_decimal::Decimal;
    use serde::{Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(
        price: &Decimal,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        rust_decimal::serde::arbitrary_precision::serialize(&price.normalize(), serializer)
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Decimal, D::Error> {
        rust_decimal::serde::arbitrary_precision::deserialize(deserializer)
    }
}

/// Instants are stored as `YYYY-MM-DDTHH:MM:SS.sssZ` so stored text sorts
/// chronologically.
mod timestamp {
    use jiff::Timestamp;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::iso_timestamp;

    pub(super) fn serialize<S: Serializer>(
        timestamp: &Timestamp,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&iso_timestamp(*timestamp))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Timestamp, D::Error> {
        Timestamp::deserialize(deserializer)
    }

    pub(super) mod optional {
        use jiff::Timestamp;
        use serde::{Deserialize, Deserializer, Serializer};

        use super::super::iso_timestamp;

        pub(crate) fn serialize<S: Serializer>(
            timestamp: &Option<Timestamp>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match timestamp {
                Some(timestamp) => serializer.serialize_str(&iso_timestamp(*timestamp)),
                None => serializer.serialize_none(),
            }
        }

        pub(crate) fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<Timestamp>, D::Error> {
            Option::<Timestamp>::deserialize(deserializer)
        }
    }
}
