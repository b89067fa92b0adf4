use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::{params, Row};

use crate::{
    analytics::{LabelCount, RecentSession},
    db::{
        connection::Database,
        helpers::{format_datetime, parse_datetime, to_u64},
    },
    models::SessionRecord,
};

fn row_to_recent_session(row: &Row) -> Result<RecentSession> {
    let created_at: String = row.get("created_at")?;
    let referrer_source: Option<String> = row.get("referrer_source")?;
    let device_type: Option<String> = row.get("device_type")?;

    Ok(RecentSession {
        session_id: row.get("session_id")?,
        landing_page: row.get("landing_page")?,
        referrer_source: referrer_source.unwrap_or_else(|| "unknown".into()),
        device_type: device_type.unwrap_or_else(|| "unknown".into()),
        created_at: parse_datetime(&created_at, "created_at")?,
    })
}

fn row_to_label_count(row: &Row) -> Result<LabelCount> {
    let count: i64 = row.get("count")?;
    Ok(LabelCount {
        label: row.get("label")?,
        count: to_u64(count, "count")?,
    })
}

impl Database {
    /// Sessions are write-once; a repeated id is ignored.
    pub async fn insert_session(
        &self,
        record: &SessionRecord,
        created_at: DateTime<Utc>,
    ) -> Result<()> {
        let record = record.clone();
        self.execute(move |conn| insert_session_row(conn, &record, created_at))
            .await
    }

    pub async fn count_sessions_since(&self, since: DateTime<Utc>) -> Result<u64> {
        self.execute(move |conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM tps_sessions WHERE created_at >= ?1",
                params![format_datetime(since)],
                |row| row.get(0),
            )?;
            to_u64(count, "count")
        })
        .await
    }

    /// Session count per referrer source, most common first.
    pub async fn referrer_source_counts(&self) -> Result<Vec<LabelCount>> {
        self.label_counts("referrer_source").await
    }

    /// Session count per device type, most common first.
    pub async fn device_type_counts(&self) -> Result<Vec<LabelCount>> {
        self.label_counts("device_type").await
    }

    async fn label_counts(&self, column: &'static str) -> Result<Vec<LabelCount>> {
        self.execute(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT COALESCE({column}, 'unknown') AS label, COUNT(*) AS count
                 FROM tps_sessions
                 GROUP BY label
                 ORDER BY count DESC, label ASC"
            ))?;

            let mut rows = stmt.query([])?;
            let mut counts = Vec::new();
            while let Some(row) = rows.next()? {
                counts.push(row_to_label_count(row)?);
            }

            Ok(counts)
        })
        .await
    }

    pub async fn list_recent_sessions(&self, limit: usize) -> Result<Vec<RecentSession>> {
        let limit = limit as i64;
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT session_id, landing_page, referrer_source, device_type, created_at
                 FROM tps_sessions
                 ORDER BY created_at DESC
                 LIMIT ?1",
            )?;

            let mut rows = stmt.query(params![limit])?;
            let mut sessions = Vec::new();
            while let Some(row) = rows.next()? {
                sessions.push(row_to_recent_session(row)?);
            }

            Ok(sessions)
        })
        .await
    }
}

pub(crate) fn insert_session_row(
    conn: &rusqlite::Connection,
    record: &SessionRecord,
    created_at: DateTime<Utc>,
) -> Result<()> {
    conn.execute(
        "INSERT OR IGNORE INTO tps_sessions (session_id, landing_page, referrer, referrer_source, search_query, device_type, screen_width, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            record.session_id,
            record.landing_page,
            record.referrer,
            record.referrer_source.as_str(),
            record.search_query,
            record.device_type.as_str(),
            record.screen_width,
            format_datetime(created_at),
        ],
    )?;
    Ok(())
}
