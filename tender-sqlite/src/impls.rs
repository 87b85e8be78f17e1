//! Port implementations for the SQLite database.

use crate::Db;
use tender_core::ports::Repository;

mod audit;
mod directory;
mod evaluation;
mod offer;
mod report;
mod tender;

impl Repository for Db {
    type Error = sqlx::Error;
}
