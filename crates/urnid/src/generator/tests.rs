use super::*;
use crate::mock::{FixedTime, MockStore, NoSleep, StepTime, at};
use crate::{Error, IdentityHandle, StructureType, TimeSource};

const PREFIX: &str = "urn:nbn:de:gbv:NN";

fn increment(checksum: bool, store: MockStore) -> UrnGenerator<MockStore, FixedTime, NoSleep> {
    UrnGenerator::from_components(
        GeneratorConfig::new(GenerationMethod::Increment).with_checksum(checksum),
        store,
        FixedTime(at(2026, 1, 1, 12, 0, 0)),
        NoSleep::default(),
    )
}

fn timestamp<'a>(
    store: MockStore,
    clock: &'a StepTime,
    sleep: &'a NoSleep,
) -> UrnGenerator<MockStore, &'a StepTime, &'a NoSleep> {
    UrnGenerator::from_components(
        GeneratorConfig::new(GenerationMethod::Timestamp).with_process_id(7),
        store,
        clock,
        sleep,
    )
}

#[test]
fn increment_uses_the_row_id() {
    let generator = increment(false, MockStore::starting_at(42));
    let handle = generator
        .allocate(Some("PPN1"), &StructureType::new("Chapter"))
        .unwrap();
    assert_eq!(handle, IdentityHandle::fresh(42));
    assert_eq!(
        generator.next_urn(PREFIX, None, &handle).unwrap(),
        "urn:nbn:de:gbv:NN-42"
    );
}

#[test]
fn increment_appends_check_digit() {
    let generator = increment(true, MockStore::default());
    let urn = generator
        .synthesize(PREFIX, None, &IdentityHandle::fresh(42))
        .unwrap();
    assert_eq!(urn, "urn:nbn:de:gbv:NN-425");
}

#[test]
fn infix_sits_between_prefix_and_body() {
    let generator = increment(true, MockStore::default());
    let handle = IdentityHandle::fresh(7);
    assert_eq!(
        generator.synthesize(PREFIX, Some("abc"), &handle).unwrap(),
        "urn:nbn:de:gbv:NN-abc-78"
    );
    // separators are not doubled and an empty infix is dropped
    assert_eq!(
        generator.synthesize("urn:nbn:de:gbv:NN-", Some("-abc-"), &handle).unwrap(),
        "urn:nbn:de:gbv:NN-abc-78"
    );
    assert_eq!(
        generator.synthesize(PREFIX, Some(""), &handle).unwrap(),
        generator.synthesize(PREFIX, None, &handle).unwrap()
    );
}

#[test]
fn increment_skips_duplicate_check() {
    let store = MockStore {
        always_duplicate: true,
        ..MockStore::default()
    };
    let generator = increment(false, store);
    let urn = generator
        .next_urn(PREFIX, None, &IdentityHandle::fresh(3))
        .unwrap();
    assert_eq!(urn, "urn:nbn:de:gbv:NN-3");
    assert_eq!(generator.store().duplicate_checks.get(), 0);
}

#[test]
fn timestamp_body_follows_the_clock() {
    let generator = UrnGenerator::from_components(
        GeneratorConfig::new(GenerationMethod::Timestamp).with_checksum(true),
        MockStore::default(),
        FixedTime(at(2026, 1, 1, 12, 0, 0)),
        NoSleep::default(),
    );
    let urn = generator
        .next_urn(PREFIX, None, &IdentityHandle::fresh(1))
        .unwrap();
    assert_eq!(urn, "urn:nbn:de:gbv:NN-202601011200001");
}

#[test]
fn timestamp_duplicates_exhaust_after_four_attempts() {
    let clock = StepTime::new(at(2026, 1, 1, 12, 0, 0));
    let sleep = NoSleep::default();
    let store = MockStore {
        always_duplicate: true,
        ..MockStore::default()
    };
    let generator = timestamp(store, &clock, &sleep);

    let err = generator
        .next_urn(PREFIX, None, &IdentityHandle::fresh(1))
        .unwrap_err();
    match err {
        Error::DuplicateExhausted { urn, attempts } => {
            assert_eq!(attempts, DUPLICATE_RETRIES + 1);
            assert_eq!(urn, "urn:nbn:de:gbv:NN-20260101120003");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(clock.readings.get(), 4);
    assert_eq!(generator.store().duplicate_checks.get(), 4);
    assert_eq!(*sleep.slept.borrow(), vec![DUPLICATE_BACKOFF; 3]);
}

#[test]
fn timestamp_duplicate_resolves_after_one_wait() {
    let clock = StepTime::new(at(2026, 1, 1, 12, 0, 0));
    let sleep = NoSleep::default();
    let store =
        MockStore::default().with_row(5, "PPN1", "Monograph", Some("urn:nbn:de:gbv:NN-20260101120000"));
    let generator = timestamp(store, &clock, &sleep);

    let urn = generator
        .next_urn(PREFIX, None, &IdentityHandle::fresh(6))
        .unwrap();
    assert_eq!(urn, "urn:nbn:de:gbv:NN-20260101120001");
    assert_eq!(sleep.slept.borrow().len(), 1);
}

#[test]
fn unsupported_character_fails_with_checksum_enabled() {
    let generator = increment(true, MockStore::default());
    let err = generator
        .synthesize("urn:nbn:de:gbv:NN", Some("a b"), &IdentityHandle::fresh(1))
        .unwrap_err();
    assert!(matches!(err, Error::Checksum(_)));

    // without a check digit any character is passed through
    let plain = increment(false, MockStore::default());
    assert!(plain.synthesize(PREFIX, Some("a b"), &IdentityHandle::fresh(1)).is_ok());
}

#[test]
fn write_back_and_remove_go_through_the_store() {
    let generator = increment(false, MockStore::starting_at(10));
    let handle = generator
        .allocate(None, &StructureType::new("Chapter"))
        .unwrap();
    assert!(generator.write_back(&handle, "urn:nbn:de:gbv:NN-10"));
    assert_eq!(generator.store().urn_of(10).as_deref(), Some("urn:nbn:de:gbv:NN-10"));
    assert!(generator.remove(10));
    assert!(!generator.store().contains(10));
}

#[test]
fn step_time_advances_per_reading() {
    let clock = StepTime::new(at(2026, 1, 1, 0, 0, 59));
    assert_eq!(clock.now(), at(2026, 1, 1, 0, 0, 59));
    assert_eq!(clock.now(), at(2026, 1, 1, 0, 1, 0));
}
