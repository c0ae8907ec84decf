#![allow(dead_code)]

use std::net::TcpListener;
use std::sync::{Arc, Mutex};

use rest_autolog::{LogEntry, LogSink};
use tracing::Level;

pub const API_VERSION: &str = "2023-01-01";

pub const STORAGE_ACCOUNT_PATH: &str = "/subscriptions/sub_id/resourceGroups/rg_name/providers/Microsoft.Storage/storageAccounts/account_name";

pub const RESOURCE_GROUPS_PATH: &str = "/subscriptions/sub_id/resourceGroups";

#[derive(Debug, Clone)]
pub struct Record {
    pub level: Level,
    pub message: String,
    pub entry: LogEntry,
}

/// Keeps every entry in memory so tests can assert on it.
#[derive(Debug, Default)]
pub struct RecordingSink {
    records: Mutex<Vec<Record>>,
}

impl RecordingSink {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn records(&self) -> Vec<Record> {
        self.records.lock().unwrap().clone()
    }

    /// The only record, failing the test if there is not exactly one.
    pub fn single(&self) -> Record {
        let records = self.records();
        assert_eq!(records.len(), 1, "expected one record, got {records:?}");
        records.into_iter().next().unwrap()
    }
}

impl LogSink for RecordingSink {
    fn log(&self, level: Level, message: &str, entry: &LogEntry) {
        self.records.lock().unwrap().push(Record {
            level,
            message: message.to_string(),
            entry: entry.clone(),
        });
    }
}

/// An address nothing listens on.
pub fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}
