//! Record Normalizer
//!
//! Maps loosely-typed rows from CSV or JSON files onto [`Record`]s. Each
//! canonical field accepts an ordered list of aliases, and the first alias
//! holding a non-blank value wins.

use std::{borrow::Cow, str::FromStr, sync::LazyLock};

use jiff::{
    Timestamp,
    civil::{Date, DateTime},
    tz::TimeZone,
};
use regex::Regex;
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::{
    csv::CsvRow,
    effects::{Clock, IdGenerator},
    records::{Record, RecordId},
};

#[expect(clippy::expect_used, reason = "pattern is a compile-time constant")]
static REGISTRATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{1,3}\s*-\s*[A-Za-z]{1,2}\s*-\s*[0-9]{1,6}$")
        .expect("registration pattern compiles")
});

/// Whether a registration follows `<1-3 digits>-<1-2 letters>-<1-6 digits>`.
///
/// Whitespace is tolerated around each hyphen, and an empty value is valid.
pub fn is_valid_registration(reg: &str) -> bool {
    let reg = reg.trim();

    reg.is_empty() || REGISTRATION.is_match(reg)
}

/// Canonical record fields read during import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// Record identifier
    Id,
    /// Creation timestamp
    CreatedAt,
    /// Last edit timestamp
    UpdatedAt,
    /// Client name
    Name,
    /// Client phone
    Phone,
    /// Price
    Price,
    /// Vehicle
    Car,
    /// Registration plate
    Reg,
}

impl Field {
    /// Source keys accepted for this field, in priority order.
    pub const fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::Id => &["id", "ID"],
            Self::CreatedAt => &["createdAt", "date", "CreatedAt", "Date"],
            Self::UpdatedAt => &["updatedAt", "UpdatedAt"],
            Self::Name => &["name", "Name"],
            Self::Phone => &["phone", "Phone"],
            Self::Price => &["price", "Price"],
            Self::Car => &["car", "Car", "make", "Make"],
            Self::Reg => &["reg", "Reg", "registration", "Registration"],
        }
    }
}

/// Loosely-typed source of field values.
pub trait RawFields {
    /// Textual value stored under `key`, if any.
    fn raw(&self, key: &str) -> Option<Cow<'_, str>>;

    /// Integral number stored under `key`, for sources that keep numbers
    /// typed.
    fn integer(&self, _key: &str) -> Option<i64> {
        None
    }

    /// First non-blank value among the field's aliases, as stored.
    fn resolve_verbatim(&self, field: Field) -> Option<String> {
        field.aliases().iter().find_map(|alias| {
            let value = self.raw(alias)?;

            (!value.trim().is_empty()).then(|| value.into_owned())
        })
    }

    /// First non-blank value among the field's aliases, trimmed.
    fn resolve(&self, field: Field) -> Option<String> {
        self.resolve_verbatim(field)
            .map(|value| value.trim().to_string())
    }

    /// First alias holding an integral number, read as epoch milliseconds.
    fn resolve_epoch_millis(&self, field: Field) -> Option<Timestamp> {
        field
            .aliases()
            .iter()
            .find_map(|alias| self.integer(alias))
            .and_then(|millis| Timestamp::from_millisecond(millis).ok())
    }
}

impl RawFields for CsvRow {
    fn raw(&self, key: &str) -> Option<Cow<'_, str>> {
        self.get(key).map(|value| Cow::Borrowed(value.as_str()))
    }
}

impl RawFields for Map<String, Value> {
    fn raw(&self, key: &str) -> Option<Cow<'_, str>> {
        match self.get(key)? {
            Value::String(value) => Some(Cow::Borrowed(value)),
            Value::Number(value) => Some(Cow::Owned(value.to_string())),
            Value::Bool(value) => Some(Cow::Owned(value.to_string())),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    fn integer(&self, key: &str) -> Option<i64> {
        self.get(key)?.as_i64()
    }
}

/// Why an input row produced no record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    /// No name under any alias.
    #[error("row has no name")]
    MissingName,

    /// No phone under any alias.
    #[error("row has no phone")]
    MissingPhone,
}

/// Map a raw row onto a record.
///
/// Timestamps are text, or epoch milliseconds when the source holds a typed
/// integer; missing or unreadable ones fall back to `clock`. A source id is
/// kept exactly as given, and rows without one receive an id from `ids`.
/// Price problems never reject a row; they coerce to zero.
///
/// # Errors
///
/// Returns a [`NormalizeError`] when the name or phone is blank.
pub fn normalize<R: RawFields + ?Sized>(
    raw: &R,
    clock: &dyn Clock,
    ids: &dyn IdGenerator,
) -> Result<Record, NormalizeError> {
    let created_at = raw
        .resolve(Field::CreatedAt)
        .and_then(|value| parse_timestamp(&value))
        .or_else(|| raw.resolve_epoch_millis(Field::CreatedAt))
        .unwrap_or_else(|| clock.now());

    let name = raw.resolve(Field::Name).ok_or(NormalizeError::MissingName)?;
    let phone = raw
        .resolve(Field::Phone)
        .ok_or(NormalizeError::MissingPhone)?;

    let price = raw
        .resolve(Field::Price)
        .and_then(|value| parse_price(&value))
        .unwrap_or(Decimal::ZERO);

    let id = raw
        .resolve_verbatim(Field::Id)
        .map_or_else(|| ids.generate(), RecordId::from);

    Ok(Record {
        id,
        created_at,
        name,
        phone,
        price,
        car: raw.resolve(Field::Car).unwrap_or_default(),
        reg: raw
            .resolve(Field::Reg)
            .map(|reg| reg.to_uppercase())
            .unwrap_or_default(),
        updated_at: raw
            .resolve(Field::UpdatedAt)
            .and_then(|value| parse_timestamp(&value))
            .or_else(|| raw.resolve_epoch_millis(Field::UpdatedAt)),
    })
}

/// Read an instant from RFC 3339 text or an extended-format civil date-time
/// or date (as UTC).
pub fn parse_timestamp(value: &str) -> Option<Timestamp> {
    let value = value.trim();

    // bare digit runs like `2024` or `20240101` are not dates
    if !value.contains('-') {
        return None;
    }

    if let Ok(timestamp) = value.parse::<Timestamp>() {
        return Some(timestamp);
    }

    if let Ok(datetime) = value.parse::<DateTime>() {
        return datetime
            .to_zoned(TimeZone::UTC)
            .ok()
            .map(|zoned| zoned.timestamp());
    }

    value
        .parse::<Date>()
        .ok()
        .and_then(|date| date.to_zoned(TimeZone::UTC).ok())
        .map(|zoned| zoned.timestamp())
}

/// Parse a non-negative price; anything else is `None`.
pub fn parse_price(value: &str) -> Option<Decimal> {
    let value = value.trim();

    let price = Decimal::from_str(value)
        .or_else(|_| Decimal::from_scientific(value))
        .ok()?;

    (price >= Decimal::ZERO).then_some(price)
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use testresult::TestResult;

    use crate::effects::{FixedClock, SequentialIds};

    use super::*;

    fn effects() -> Result<(FixedClock, SequentialIds), jiff::Error> {
        Ok((
            FixedClock("2025-06-01T12:00:00Z".parse()?),
            SequentialIds::new("new"),
        ))
    }

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[test]
    fn registration_grammar() {
        assert!(is_valid_registration(""));
        assert!(is_valid_registration("12-KE-3456"));
        assert!(is_valid_registration("231-D-12345"));
        assert!(is_valid_registration("1 - d - 1"));
        assert!(!is_valid_registration("231D12345"));
        assert!(!is_valid_registration("1234-D-1"));
        assert!(!is_valid_registration("12-ABC-1"));
        assert!(!is_valid_registration("12-KE-1234567"));
    }

    #[test]
    fn normalizes_canonical_keys() -> TestResult {
        let (clock, ids) = effects()?;
        let raw = object(json!({
            "id": "id-7",
            "createdAt": "2024-01-01T00:00:00.000Z",
            "name": " Bob ",
            "phone": "0851112222",
            "price": "50",
            "car": "Golf",
            "reg": "231-d-12345",
        }));

        let record = normalize(&raw, &clock, &ids)?;

        assert_eq!(record.id.as_str(), "id-7");
        assert_eq!(record.created_at, "2024-01-01T00:00:00Z".parse()?);
        assert_eq!(record.name, "Bob");
        assert_eq!(record.price, Decimal::new(50, 0));
        assert_eq!(record.car, "Golf");
        assert_eq!(record.reg, "231-D-12345");
        assert_eq!(record.updated_at, None);

        Ok(())
    }

    #[test]
    fn falls_back_through_aliases() -> TestResult {
        let (clock, ids) = effects()?;
        let raw = object(json!({
            "Date": "2023-05-06",
            "Name": "Cara",
            "Phone": 871234567,
            "Price": 12.5,
            "car": "",
            "Make": "Honda",
            "Registration": "12-ke-3456",
        }));

        let record = normalize(&raw, &clock, &ids)?;

        assert_eq!(record.created_at, "2023-05-06T00:00:00Z".parse()?);
        assert_eq!(record.phone, "871234567");
        assert_eq!(record.price, Decimal::new(125, 1));
        assert_eq!(record.car, "Honda");
        assert_eq!(record.reg, "12-KE-3456");
        assert_eq!(record.id.as_str(), "new-1");

        Ok(())
    }

    #[test]
    fn missing_timestamp_uses_clock() -> TestResult {
        let (clock, ids) = effects()?;
        let raw = object(json!({ "name": "A", "phone": "1", "date": "yesterday" }));

        let record = normalize(&raw, &clock, &ids)?;

        assert_eq!(record.created_at, clock.0);

        Ok(())
    }

    #[test]
    fn bad_prices_become_zero() -> TestResult {
        let (clock, ids) = effects()?;

        for price in [json!("abc"), json!(""), json!(-5), json!(null)] {
            let raw = object(json!({ "name": "A", "phone": "1", "price": price }));

            assert_eq!(normalize(&raw, &clock, &ids)?.price, Decimal::ZERO);
        }

        Ok(())
    }

    #[test]
    fn rejects_blank_name_or_phone() -> TestResult {
        let (clock, ids) = effects()?;

        let no_name = object(json!({ "name": "   ", "phone": "1" }));
        let no_phone = object(json!({ "name": "A", "Phone": null }));

        assert_eq!(
            normalize(&no_name, &clock, &ids),
            Err(NormalizeError::MissingName)
        );
        assert_eq!(
            normalize(&no_phone, &clock, &ids),
            Err(NormalizeError::MissingPhone)
        );

        Ok(())
    }

    #[test]
    fn csv_rows_normalize() -> TestResult {
        let (clock, ids) = effects()?;
        let rows = crate::csv::parse("Name,Phone,registration\nDan,0861,1-a-1");
        let row = rows.first().ok_or("no row")?;

        let record = normalize(row, &clock, &ids)?;

        assert_eq!(record.name, "Dan");
        assert_eq!(record.reg, "1-A-1");
        assert_eq!(record.car, "");

        Ok(())
    }

    #[test]
    fn updated_at_is_carried_over() -> TestResult {
        let (clock, ids) = effects()?;
        let raw = object(json!({
            "name": "A",
            "phone": "1",
            "updatedAt": "2024-02-02T02:02:02.002Z",
        }));

        let record = normalize(&raw, &clock, &ids)?;

        assert_eq!(record.updated_at, Some("2024-02-02T02:02:02.002Z".parse()?));

        Ok(())
    }

    #[test]
    fn numeric_json_timestamps_are_epoch_milliseconds() -> TestResult {
        let (clock, ids) = effects()?;
        let raw = object(json!({ "name": "A", "phone": "1", "createdAt": 1_704_067_200_000_i64 }));

        let record = normalize(&raw, &clock, &ids)?;

        assert_eq!(record.created_at, "2024-01-01T00:00:00Z".parse()?);

        Ok(())
    }

    #[test]
    fn digit_strings_are_not_dates() -> TestResult {
        let (clock, ids) = effects()?;

        assert_eq!(parse_timestamp("2024"), None);
        assert_eq!(parse_timestamp("20240101"), None);
        assert_eq!(parse_timestamp("1704067200000"), None);

        let rows = crate::csv::parse("date,name,phone\n20240101,Dan,0861");
        let row = rows.first().ok_or("no row")?;

        assert_eq!(normalize(row, &clock, &ids)?.created_at, clock.0);

        Ok(())
    }

    #[test]
    fn source_ids_are_kept_verbatim() -> TestResult {
        let (clock, ids) = effects()?;
        let padded = object(json!({ "id": " a ", "name": "A", "phone": "1" }));
        let blank = object(json!({ "id": "   ", "name": "A", "phone": "1" }));

        assert_eq!(normalize(&padded, &clock, &ids)?.id.as_str(), " a ");
        assert_eq!(normalize(&blank, &clock, &ids)?.id.as_str(), "new-1");

        Ok(())
    }
}
