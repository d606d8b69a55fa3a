//! Capability catalogue
//!
//! A capability is the permission bit a protected route requires. The set is
//! fixed when the router is built.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Capability(&'static str);

impl Capability {
    pub const fn new(key: &'static str) -> Self {
        Self(key)
    }

    /// Key looked up in a principal's permission set
    pub fn key(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

pub const USERS_CREATE: Capability = Capability::new("users_create");
pub const USERS_UPDATE: Capability = Capability::new("users_update");
pub const USERS_DELETE: Capability = Capability::new("users_delete");

pub const EMPLOYEES_CREATE: Capability = Capability::new("employees_create");
pub const EMPLOYEES_UPDATE: Capability = Capability::new("employees_update");
pub const EMPLOYEES_DELETE: Capability = Capability::new("employees_delete");
pub const EMPLOYEES_IMPORT: Capability = Capability::new("employees_import");

pub const LINES_CREATE: Capability = Capability::new("lines_create");
pub const LINES_UPDATE: Capability = Capability::new("lines_update");
pub const LINES_DELETE: Capability = Capability::new("lines_delete");
pub const LINES_IMPORT: Capability = Capability::new("lines_import");

pub const DEVICES_CREATE: Capability = Capability::new("devices_create");
pub const DEVICES_UPDATE: Capability = Capability::new("devices_update");
pub const DEVICES_DELETE: Capability = Capability::new("devices_delete");
pub const DEVICES_IMPORT: Capability = Capability::new("devices_import");

pub const RECORDS_CREATE: Capability = Capability::new("records_create");
pub const RECORDS_UPDATE: Capability = Capability::new("records_update");
pub const RECORDS_DELETE: Capability = Capability::new("records_delete");

pub const MAINTENANCE_CREATE: Capability = Capability::new("maintenance_create");
pub const MAINTENANCE_UPDATE: Capability = Capability::new("maintenance_update");
pub const MAINTENANCE_DELETE: Capability = Capability::new("maintenance_delete");

pub const LINE_RECORDS_CREATE: Capability = Capability::new("line_records_create");

pub const COMPANY_UPDATE: Capability = Capability::new("company_update");

/// Every capability a route can require
pub const ALL: &[Capability] = &[
    USERS_CREATE,
    USERS_UPDATE,
    USERS_DELETE,
    EMPLOYEES_CREATE,
    EMPLOYEES_UPDATE,
    EMPLOYEES_DELETE,
    EMPLOYEES_IMPORT,
    LINES_CREATE,
    LINES_UPDATE,
    LINES_DELETE,
    LINES_IMPORT,
    DEVICES_CREATE,
    DEVICES_UPDATE,
    DEVICES_DELETE,
    DEVICES_IMPORT,
    RECORDS_CREATE,
    RECORDS_UPDATE,
    RECORDS_DELETE,
    MAINTENANCE_CREATE,
    MAINTENANCE_UPDATE,
    MAINTENANCE_DELETE,
    LINE_RECORDS_CREATE,
    COMPANY_UPDATE,
];

/// Look up a catalogue entry by key
pub fn find(key: &str) -> Option<Capability> {
    ALL.iter().copied().find(|c| c.key() == key)
}
