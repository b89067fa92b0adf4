//! Local SQLite analytics store.
//!
//! Accepts the same two record kinds the REST API does, and answers the
//! read queries behind the analytics report.

mod connection;
mod helpers;
mod migrations;
mod repositories;

use chrono::Utc;

pub use connection::Database;

use crate::{
    models::{PageViewRecord, SessionRecord},
    sink::AnalyticsSink,
};

impl AnalyticsSink for Database {
    fn insert_session(&self, record: SessionRecord) {
        let created_at = Utc::now();
        self.submit("session insert", move |conn| {
            repositories::insert_session_row(conn, &record, created_at)
        });
    }

    fn insert_page_view(&self, record: PageViewRecord) {
        let created_at = Utc::now();
        self.submit("page view insert", move |conn| {
            repositories::insert_page_view_row(conn, &record, created_at)
        });
    }
}
