use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{Connection, OpenFlags, OptionalExtension, params};

const ABSTRACT_QUERY: &str = "SELECT abstract FROM pmid2abstract WHERE pmid = ?1";

pub trait ReferenceTexts {
    fn abstract_text(&self, pmid: i64) -> Result<Option<String>>;
}

impl ReferenceTexts for HashMap<i64, String> {
    fn abstract_text(&self, pmid: i64) -> Result<Option<String>> {
        Ok(self.get(&pmid).cloned())
    }
}

pub struct SqliteAbstractStore {
    connection: Connection,
}

impl SqliteAbstractStore {
    pub fn open(path: &Path) -> Result<Self> {
        let connection = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .with_context(|| format!("failed to open {}", path.display()))?;
        Ok(Self::from_connection(connection))
    }

    pub fn from_connection(connection: Connection) -> Self {
        Self { connection }
    }

    pub fn close(self) -> Result<()> {
        self.connection
            .close()
            .map_err(|(_, err)| err)
            .context("failed to close abstract store")
    }
}

impl ReferenceTexts for SqliteAbstractStore {
    fn abstract_text(&self, pmid: i64) -> Result<Option<String>> {
        let mut statement = self
            .connection
            .prepare_cached(ABSTRACT_QUERY)
            .context("failed to prepare abstract lookup")?;
        statement
            .query_row(params![pmid], |row| row.get(0))
            .optional()
            .with_context(|| format!("failed to look up abstract for pmid {pmid}"))
    }
}
