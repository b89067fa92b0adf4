use std::{collections::HashMap, fmt::Write as _};

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};

use crate::db::Database;

use super::types::{
    DashboardReport, LabelCount, PageViewRow, PeriodReport, PeriodStats, RecentSession, TopPage,
};

pub const REPORT_PERIODS: &[(&str, i64)] = &[("Today", 1), ("Last 7 days", 7), ("Last 30 days", 30)];
pub const TOP_PAGES_LIMIT: usize = 30;
pub const RECENT_SESSIONS_LIMIT: usize = 20;

/// Averages over a set of page views. Missing measurements count as zero.
pub fn summarize(sessions: u64, rows: &[PageViewRow]) -> PeriodStats {
    let page_views = rows.len() as u64;
    if page_views == 0 {
        return PeriodStats {
            sessions,
            ..PeriodStats::default()
        };
    }

    let mut paths: Vec<&str> = rows.iter().map(|row| row.page_path.as_str()).collect();
    paths.sort_unstable();
    paths.dedup();

    let total_time: u64 = rows.iter().map(|row| row.time_on_page_ms.unwrap_or(0)).sum();
    let total_scroll: u64 = rows.iter().map(|row| row.scroll_depth.unwrap_or(0)).sum();

    PeriodStats {
        sessions,
        page_views,
        unique_pages: paths.len() as u64,
        avg_time_ms: total_time as f64 / page_views as f64,
        avg_scroll_depth: total_scroll as f64 / page_views as f64,
    }
}

/// Most viewed paths, ties broken by path so the order is stable.
pub fn top_pages(rows: &[PageViewRow], limit: usize) -> Vec<TopPage> {
    #[derive(Default)]
    struct Totals {
        views: u64,
        time: u64,
        scroll: u64,
    }

    let mut by_path: HashMap<&str, Totals> = HashMap::new();
    for row in rows {
        let totals = by_path.entry(row.page_path.as_str()).or_default();
        totals.views += 1;
        totals.time += row.time_on_page_ms.unwrap_or(0);
        totals.scroll += row.scroll_depth.unwrap_or(0);
    }

    let mut pages: Vec<TopPage> = by_path
        .into_iter()
        .map(|(path, totals)| TopPage {
            path: path.to_string(),
            views: totals.views,
            avg_time_ms: totals.time as f64 / totals.views as f64,
            avg_scroll_depth: totals.scroll as f64 / totals.views as f64,
        })
        .collect();

    pages.sort_by(|a, b| b.views.cmp(&a.views).then_with(|| a.path.cmp(&b.path)));
    pages.truncate(limit);
    pages
}

pub async fn period_stats(db: &Database, since: DateTime<Utc>) -> Result<PeriodStats> {
    let sessions = db.count_sessions_since(since).await?;
    let rows = db.list_page_views_since(Some(since)).await?;
    Ok(summarize(sessions, &rows))
}

pub async fn build_dashboard(db: &Database, now: DateTime<Utc>) -> Result<DashboardReport> {
    let mut periods = Vec::with_capacity(REPORT_PERIODS.len());
    for (label, days) in REPORT_PERIODS {
        let stats = period_stats(db, now - Duration::days(*days)).await?;
        periods.push(PeriodReport {
            label: (*label).to_string(),
            stats,
        });
    }

    let all_page_views = db.list_page_views_since(None).await?;

    Ok(DashboardReport {
        generated_at: now,
        periods,
        traffic_sources: db.referrer_source_counts().await?,
        top_pages: top_pages(&all_page_views, TOP_PAGES_LIMIT),
        devices: db.device_type_counts().await?,
        recent_sessions: db.list_recent_sessions(RECENT_SESSIONS_LIMIT).await?,
    })
}

/// `850ms`, `4.2s`, `2m 5s`.
pub fn format_ms(ms: f64) -> String {
    if ms < 1000.0 {
        return format!("{}ms", ms.round());
    }
    let secs = ms / 1000.0;
    if secs < 60.0 {
        return format!("{secs:.1}s");
    }
    let minutes = (secs / 60.0).floor();
    let remainder = (secs % 60.0).round();
    format!("{minutes}m {remainder}s")
}

/// Share of `total`, one decimal. `0%` when there is nothing to divide by.
pub fn pct(n: u64, total: u64) -> String {
    if total == 0 {
        return "0%".to_string();
    }
    format!("{:.1}%", n as f64 / total as f64 * 100.0)
}

fn render_breakdown(out: &mut String, title: &str, rows: &[LabelCount], empty: &str) {
    let total: u64 = rows.iter().map(|row| row.count).sum();
    let _ = writeln!(out, "\n{title}");
    if rows.is_empty() {
        let _ = writeln!(out, "  {empty}");
        return;
    }
    for row in rows {
        let _ = writeln!(
            out,
            "  {:<14} {:>6}  {:>6}",
            row.label,
            row.count,
            pct(row.count, total)
        );
    }
}

fn render_recent(out: &mut String, sessions: &[RecentSession]) {
    let _ = writeln!(out, "\nRecent Sessions (last {RECENT_SESSIONS_LIMIT})");
    if sessions.is_empty() {
        let _ = writeln!(out, "  No sessions yet");
        return;
    }
    for session in sessions {
        let short_id: String = session.session_id.chars().take(8).collect();
        let _ = writeln!(
            out,
            "  {}  {:<32} {:<12} {:<8} {}",
            session.created_at.format("%Y-%m-%d %H:%M"),
            session.landing_page,
            session.referrer_source,
            session.device_type,
            short_id
        );
    }
}

/// Plain-text rendering of the dashboard for terminals and logs.
pub fn render_text(report: &DashboardReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Analytics Dashboard ({} UTC)",
        report.generated_at.format("%Y-%m-%d %H:%M:%S")
    );

    for period in &report.periods {
        let stats = &period.stats;
        let _ = writeln!(
            out,
            "\n{}\n  sessions {}  page views {}  unique pages {}  avg time {}  avg scroll {}%",
            period.label,
            stats.sessions,
            stats.page_views,
            stats.unique_pages,
            format_ms(stats.avg_time_ms),
            stats.avg_scroll_depth.round()
        );
    }

    render_breakdown(
        &mut out,
        "Traffic Sources (all time)",
        &report.traffic_sources,
        "No session data yet",
    );

    let _ = writeln!(out, "\nTop Pages (all time, top {TOP_PAGES_LIMIT})");
    if report.top_pages.is_empty() {
        let _ = writeln!(out, "  No page view data yet");
    }
    for page in &report.top_pages {
        let _ = writeln!(
            out,
            "  {:<40} {:>6}  {:>8}  {:>4}%",
            page.path,
            page.views,
            format_ms(page.avg_time_ms),
            page.avg_scroll_depth.round()
        );
    }

    render_breakdown(
        &mut out,
        "Device Breakdown (all time)",
        &report.devices,
        "No session data yet",
    );
    render_recent(&mut out, &report.recent_sessions);

    out
}
