//! In-process stand-ins for the store, the resolver and the clock.

use core::cell::{Cell, RefCell};
use core::time::Duration;
use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};

use crate::{
    Error, IdentityHandle, IdentityRecord, IdentityStore, Registrar, Result, SleepProvider,
    StructureType, TimeSource,
};

#[derive(Default)]
pub(crate) struct MockStore {
    pub rows: RefCell<BTreeMap<i64, IdentityRecord>>,
    pub next_id: Cell<i64>,
    pub always_duplicate: bool,
    pub fail_write_back: bool,
    pub allocations: Cell<usize>,
    pub duplicate_checks: Cell<usize>,
    pub removed: RefCell<Vec<i64>>,
}

impl MockStore {
    pub fn starting_at(id: i64) -> Self {
        let store = Self::default();
        store.next_id.set(id);
        store
    }

    pub fn with_row(self, id: i64, work_id: &str, structure_type: &str, urn: Option<&str>) -> Self {
        self.rows.borrow_mut().insert(
            id,
            IdentityRecord {
                id,
                work_id: work_id.to_owned(),
                structure_type: structure_type.to_owned(),
                urn: urn.map(str::to_owned),
            },
        );
        self
    }

    pub fn urn_of(&self, id: i64) -> Option<String> {
        self.rows.borrow().get(&id).and_then(|r| r.urn.clone())
    }

    pub fn contains(&self, id: i64) -> bool {
        self.rows.borrow().contains_key(&id)
    }
}

impl IdentityStore for MockStore {
    fn allocate(&self, work_id: Option<&str>, structure: &StructureType) -> Result<IdentityHandle> {
        self.allocations.set(self.allocations.get() + 1);
        let work_id = work_id.unwrap_or("");

        if structure.is_singleton_scoped() {
            let rows = self.rows.borrow();
            let matching: Vec<_> = rows
                .values()
                .filter(|r| r.work_id == work_id && r.structure_type == structure.name)
                .collect();
            match matching.as_slice() {
                [] => {}
                [row] => return Ok(IdentityHandle::existing(row.id, row.urn.clone())),
                _ => {
                    return Err(Error::InconsistentStore {
                        work_id: work_id.to_owned(),
                        structure_type: structure.name.clone(),
                        rows: matching.len(),
                    });
                }
            }
        }

        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.rows.borrow_mut().insert(
            id,
            IdentityRecord {
                id,
                work_id: work_id.to_owned(),
                structure_type: structure.name.clone(),
                urn: None,
            },
        );
        Ok(IdentityHandle::fresh(id))
    }

    fn write_back(&self, handle: &IdentityHandle, urn: &str) -> bool {
        if handle.is_existing || self.fail_write_back {
            return false;
        }
        match self.rows.borrow_mut().get_mut(&handle.id) {
            Some(row) => {
                row.urn = Some(urn.to_owned());
                true
            }
            None => false,
        }
    }

    fn remove(&self, id: i64) -> bool {
        self.removed.borrow_mut().push(id);
        self.rows.borrow_mut().remove(&id).is_some()
    }

    fn find_by_urn_value(&self, urn: &str) -> Result<bool> {
        self.duplicate_checks.set(self.duplicate_checks.get() + 1);
        Ok(self.always_duplicate
            || self
                .rows
                .borrow()
                .values()
                .any(|r| r.urn.as_deref() == Some(urn)))
    }
}

/// How the mock resolver answers.
#[derive(Clone, Debug)]
pub(crate) enum Reply {
    /// Accept and echo the requested URN.
    Accept,
    /// Accept but report another URN.
    Return(String),
    Reject(u16),
}

pub(crate) struct MockRegistrar {
    pub reply: Reply,
    pub registered: RefCell<Vec<(String, Vec<String>)>>,
    pub replaced: RefCell<Vec<(String, Vec<String>)>>,
}

impl MockRegistrar {
    pub fn new(reply: Reply) -> Self {
        Self {
            reply,
            registered: RefCell::default(),
            replaced: RefCell::default(),
        }
    }

    pub fn calls(&self) -> usize {
        self.registered.borrow().len() + self.replaced.borrow().len()
    }

    fn rejection(status: u16) -> Error {
        Error::Registration {
            status,
            detail: "Errorcode: URN_ALREADY_EXISTS: rejected by mock".into(),
        }
    }
}

impl Registrar for MockRegistrar {
    fn register(&self, urn: &str, target_urls: &[String]) -> Result<String> {
        self.registered
            .borrow_mut()
            .push((urn.to_owned(), target_urls.to_vec()));
        match &self.reply {
            Reply::Accept => Ok(urn.to_owned()),
            Reply::Return(other) => Ok(other.clone()),
            Reply::Reject(status) => Err(Self::rejection(*status)),
        }
    }

    fn replace_targets(&self, urn: &str, target_urls: &[String]) -> Result<bool> {
        self.replaced
            .borrow_mut()
            .push((urn.to_owned(), target_urls.to_vec()));
        match &self.reply {
            Reply::Reject(status) => Err(Self::rejection(*status)),
            _ => Ok(true),
        }
    }
}

pub(crate) fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, mo, d)
        .unwrap()
        .and_hms_opt(h, mi, s)
        .unwrap()
}

/// A clock that advances one second per reading.
pub(crate) struct StepTime {
    pub start: NaiveDateTime,
    pub readings: Cell<u32>,
}

impl StepTime {
    pub fn new(start: NaiveDateTime) -> Self {
        Self {
            start,
            readings: Cell::new(0),
        }
    }
}

impl TimeSource for StepTime {
    fn now(&self) -> NaiveDateTime {
        let n = self.readings.get();
        self.readings.set(n + 1);
        self.start + chrono::Duration::seconds(i64::from(n))
    }
}

/// A clock frozen at one instant.
pub(crate) struct FixedTime(pub NaiveDateTime);

impl TimeSource for FixedTime {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// Records requested sleeps instead of blocking.
#[derive(Default)]
pub(crate) struct NoSleep {
    pub slept: RefCell<Vec<Duration>>,
}

impl SleepProvider for NoSleep {
    fn sleep_for(&self, dur: Duration) {
        self.slept.borrow_mut().push(dur);
    }
}
