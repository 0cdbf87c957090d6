//! End-to-end archive workflows against the public API.
//!
//! Each test drives a repository the way the command line does: records are
//! added or imported, persisted through a store slot and reloaded.

use jiff::Timestamp;
use rust_decimal::Decimal;
use testresult::TestResult;

use client_archive::{
    merge::merge,
    normalize::is_valid_registration,
    prelude::*,
    store::{FileSlot, MemorySlot, Store},
};

fn repository(slot: MemorySlot) -> Result<RecordRepository<MemorySlot>, jiff::Error> {
    let now: Timestamp = "2025-03-01T12:00:00.000Z".parse()?;

    Ok(RecordRepository::with_sources(
        slot,
        Box::new(FixedClock(now)),
        Box::new(SequentialIds::new("client")),
    ))
}

#[test]
fn adding_alice_fills_defaults() -> TestResult {
    let mut repository = repository(MemorySlot::default())?;

    let alice = repository.add(&RecordFields {
        name: "Alice".to_string(),
        phone: "0871234567".to_string(),
        ..RecordFields::default()
    })?;

    assert_eq!(repository.len(), 1);
    assert_eq!(alice.price, Decimal::ZERO);
    assert_eq!(alice.car, "");
    assert_eq!(alice.reg, "");
    assert_eq!(alice.id.as_str(), "client-1");
    assert_eq!(alice.created_at, "2025-03-01T12:00:00Z".parse::<Timestamp>()?);
    assert_eq!(alice.updated_at, None);

    Ok(())
}

#[test]
fn importing_bob_from_csv_into_empty_collection() -> TestResult {
    let mut repository = repository(MemorySlot::default())?;

    let summary = repository.import(
        ImportFormat::Csv,
        "createdAt,name,phone,price,car,reg\n\
         2024-01-01T00:00:00.000Z,Bob,0851112222,50,Golf,231-D-12345",
    )?;

    assert_eq!(
        summary,
        ImportSummary {
            imported: 1,
            rejected: 0,
            total: 1,
        }
    );

    let bob = repository.records().first().ok_or("expected Bob")?;

    assert_eq!(bob.name, "Bob");
    assert_eq!(bob.price, Decimal::new(50, 0));
    assert_eq!(bob.reg, "231-D-12345");
    assert_eq!(bob.created_at, "2024-01-01T00:00:00Z".parse::<Timestamp>()?);

    Ok(())
}

#[test]
fn registration_grammar() {
    assert!(is_valid_registration("12-KE-3456"));
    assert!(is_valid_registration("231-D-12345"));
    assert!(is_valid_registration(""));
    assert!(!is_valid_registration("231D12345"));
}

#[test]
fn searching_for_golf() -> TestResult {
    let mut repository = repository(MemorySlot::default())?;

    for car in ["VW Golf", "Civic"] {
        repository.add(&RecordFields {
            name: "Client".to_string(),
            phone: "0870000000".to_string(),
            car: car.to_string(),
            ..RecordFields::default()
        })?;
    }

    let found: Vec<&str> = repository
        .list("golf")
        .into_iter()
        .map(|record| record.car.as_str())
        .collect();

    assert_eq!(found, ["VW Golf"]);

    Ok(())
}

#[test]
fn corrupted_store_opens_empty() -> TestResult {
    let store = Store::new(MemorySlot::with_blob("not json"));

    assert!(store.load().is_empty());

    let repository = repository(MemorySlot::with_blob("not json"))?;

    assert!(repository.is_empty());

    Ok(())
}

#[test]
fn merging_the_same_import_twice_is_stable() -> TestResult {
    let mut repository = repository(MemorySlot::default())?;
    let text = r#"[
        {"id": "a", "createdAt": "2024-01-01T00:00:00.000Z", "name": "Ann", "phone": "1"},
        {"id": "b", "createdAt": "2024-02-01T00:00:00.000Z", "name": "Ben", "phone": "2"}
    ]"#;

    repository.import(ImportFormat::Json, text)?;
    let once = repository.records().to_vec();

    let summary = repository.import(ImportFormat::Json, text)?;

    assert_eq!(summary.total, 2);
    assert_eq!(repository.records(), once.as_slice());
    assert_eq!(merge(once.clone(), once.clone()), once);

    Ok(())
}

#[test]
fn file_store_survives_reopen() -> TestResult {
    let dir = tempfile::tempdir()?;

    let mut first = RecordRepository::open(FileSlot::in_dir(dir.path(), DEFAULT_KEY));
    let added = first.add(&RecordFields {
        name: "Alice".to_string(),
        phone: "0871234567".to_string(),
        price: Some(Decimal::new(1250, 2)),
        car: "VW Golf".to_string(),
        reg: "12-ke-3456".to_string(),
    })?;

    let reopened = RecordRepository::open(FileSlot::in_dir(dir.path(), DEFAULT_KEY));
    let loaded = reopened.get(&added.id).ok_or("record not persisted")?;

    assert_eq!(loaded, &added);
    assert_eq!(loaded.reg, "12-KE-3456");

    Ok(())
}

#[test]
fn export_then_import_into_fresh_archive() -> TestResult {
    let mut source = repository(MemorySlot::default())?;

    source.add(&RecordFields {
        name: "Smith, John".to_string(),
        phone: "0851112222".to_string(),
        price: Some(Decimal::new(75, 0)),
        car: "Yaris \"Hybrid\"".to_string(),
        reg: "191-D-1".to_string(),
    })?;

    let csv = source.export(ExportFormat::Csv)?;

    let mut target = repository(MemorySlot::default())?;
    target.import(ImportFormat::Csv, &csv)?;

    let copy = target.records().first().ok_or("expected a record")?;
    let original = source.records().first().ok_or("expected a record")?;

    assert_eq!(copy.name, original.name);
    assert_eq!(copy.car, original.car);
    assert_eq!(copy.price, original.price);
    assert_eq!(copy.created_at, original.created_at);

    Ok(())
}
