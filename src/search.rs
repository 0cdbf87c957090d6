//! Search Filter

use crate::records::Record;

/// Case-insensitive substring match over a record's textual fields.
///
/// The query is trimmed first; an empty query matches everything.
pub fn matches(record: &Record, query: &str) -> bool {
    let query = query.trim();

    if query.is_empty() {
        return true;
    }

    let haystack = format!(
        "{} {} {} {} {}",
        record.name,
        record.phone,
        record.car,
        record.reg,
        record.price_text()
    )
    .to_lowercase();

    haystack.contains(&query.to_lowercase())
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use testresult::TestResult;

    use crate::records::RecordId;

    use super::*;

    fn with_car(car: &str) -> Result<Record, jiff::Error> {
        Ok(Record {
            id: RecordId::from(car),
            created_at: "2024-01-01T00:00:00Z".parse()?,
            name: "Alice Byrne".to_string(),
            phone: "0871234567".to_string(),
            price: Decimal::new(1250, 2),
            car: car.to_string(),
            reg: "12-KE-3456".to_string(),
            updated_at: None,
        })
    }

    #[test]
    fn matches_vehicle_case_insensitively() -> TestResult {
        assert!(matches(&with_car("VW Golf")?, "golf"));
        assert!(!matches(&with_car("Civic")?, "golf"));

        Ok(())
    }

    #[test]
    fn empty_query_matches_everything() -> TestResult {
        assert!(matches(&with_car("Civic")?, ""));
        assert!(matches(&with_car("Civic")?, "   "));

        Ok(())
    }

    #[test]
    fn matches_other_fields() -> TestResult {
        let record = with_car("Civic")?;

        assert!(matches(&record, "BYRNE"));
        assert!(matches(&record, "087123"));
        assert!(matches(&record, "ke-34"));
        assert!(matches(&record, "12.5"));
        assert!(!matches(&record, "12.50"));

        Ok(())
    }
}
