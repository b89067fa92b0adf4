use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::{params, Row};

use crate::{
    analytics::PageViewRow,
    db::{
        connection::Database,
        helpers::{format_datetime, to_i64, to_u64},
    },
    models::PageViewRecord,
};

fn row_to_page_view(row: &Row) -> Result<PageViewRow> {
    let time_on_page_ms: Option<i64> = row.get("time_on_page_ms")?;
    let scroll_depth: Option<i64> = row.get("scroll_depth")?;

    Ok(PageViewRow {
        page_path: row.get("page_path")?,
        time_on_page_ms: time_on_page_ms
            .map(|ms| to_u64(ms, "time_on_page_ms"))
            .transpose()?,
        scroll_depth: scroll_depth
            .map(|depth| to_u64(depth, "scroll_depth"))
            .transpose()?,
    })
}

impl Database {
    pub async fn insert_page_view(
        &self,
        record: &PageViewRecord,
        created_at: DateTime<Utc>,
    ) -> Result<()> {
        let record = record.clone();
        self.execute(move |conn| insert_page_view_row(conn, &record, created_at))
            .await
    }

    /// Page views recorded at or after `since`, or all of them.
    pub async fn list_page_views_since(
        &self,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<PageViewRow>> {
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT page_path, time_on_page_ms, scroll_depth
                 FROM tps_page_views
                 WHERE ?1 IS NULL OR created_at >= ?1
                 ORDER BY created_at ASC, id ASC",
            )?;

            let mut rows = stmt.query(params![since.map(format_datetime)])?;
            let mut page_views = Vec::new();
            while let Some(row) = rows.next()? {
                page_views.push(row_to_page_view(row)?);
            }

            Ok(page_views)
        })
        .await
    }
}

pub(crate) fn insert_page_view_row(
    conn: &rusqlite::Connection,
    record: &PageViewRecord,
    created_at: DateTime<Utc>,
) -> Result<()> {
    conn.execute(
        "INSERT INTO tps_page_views (session_id, page_path, page_type, time_on_page_ms, scroll_depth, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            record.session_id,
            record.page_path,
            record.page_type.as_str(),
            to_i64(record.time_on_page_ms)?,
            record.scroll_depth,
            format_datetime(created_at),
        ],
    )?;
    Ok(())
}
