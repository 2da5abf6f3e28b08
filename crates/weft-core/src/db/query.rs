//! Analytics queries over the projected graph.
//!
//! A fixed set of read-only queries: organization evolution, role
//! interaction rankings, collaboration listings, overtime detection,
//! project durations, handover timing, utilization heatmap data, and a
//! node/edge export for diagramming.
//!
//! All functions take a shared `&Connection` reference and return
//! `anyhow::Result<T>` with typed serde structs (never raw rows). Every
//! listing is deterministically ordered, with ascending identifier
//! columns as the tie-break.

use anyhow::{Context, Result, bail};
use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Organization evolution counters for one phase (a month or a range).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrgSnapshot {
    /// Human-readable phase label: a month, or `"<start> to <end>"`.
    pub phase: String,
    /// Distinct people with work events in the phase.
    pub active_users: usize,
    /// Distinct current roles among those people.
    pub active_roles: usize,
    /// Sum of collaboration weight in the phase.
    pub total_interactions: usize,
}

/// One ranked role-pair interaction edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleInteraction {
    pub role_a: String,
    pub role_b: String,
    pub weight: usize,
}

/// One person-pair collaboration edge within a month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserCollaboration {
    pub user_a: String,
    pub role_a: String,
    pub user_b: String,
    pub role_b: String,
    pub weight: usize,
    pub month: String,
}

/// A diagram node (one per role).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BpmnNode {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// A diagram edge (one per interaction, weight as label).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BpmnEdge {
    pub source: String,
    pub target: String,
    pub label: String,
    pub weight: usize,
}

/// Node/edge lists for the role-interaction diagram.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BpmnGraph {
    pub nodes: Vec<BpmnNode>,
    pub edges: Vec<BpmnEdge>,
}

/// Collaboration-weight total for one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyInteractions {
    pub month: String,
    pub total_interactions: usize,
}

/// A person ranked by off-hours activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OvertimeRisk {
    pub name: String,
    pub role: String,
    pub overtime_count: usize,
}

/// Whole-day span between a case's first and last work event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectDuration {
    pub case_id: String,
    pub duration_days: i64,
}

/// Average lag between two roles' consecutive steps on shared cases.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HandoverFlow {
    pub source_role: String,
    pub target_role: String,
    pub avg_duration_hours: f64,
}

/// Work-event count for one (day-of-week, hour) slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UtilizationSlot {
    /// 1 = Monday … 7 = Sunday.
    pub weekday: usize,
    pub hour: usize,
    pub count: usize,
}

// ---------------------------------------------------------------------------
// Tuning constants
// ---------------------------------------------------------------------------

/// Work before this hour counts as overtime.
const OVERTIME_MORNING_CUTOFF: u32 = 7;
/// Work after this hour counts as overtime.
const OVERTIME_EVENING_CUTOFF: u32 = 18;

const OVERTIME_LIMIT: usize = 5;
const DURATION_LIMIT: usize = 10;
const HANDOVER_LIMIT: usize = 20;

const MICROS_PER_DAY: i64 = 86_400_000_000;
const MICROS_PER_HOUR: f64 = 3_600_000_000.0;

// ---------------------------------------------------------------------------
// Organization evolution
// ---------------------------------------------------------------------------

/// Aggregate activity counters over an inclusive month range.
///
/// # Errors
///
/// Returns an error if the range is malformed or a query fails.
pub fn organization_snapshot(
    conn: &Connection,
    start_month: &str,
    end_month: &str,
) -> Result<OrgSnapshot> {
    validate_month(start_month)?;
    validate_month(end_month)?;

    let active_users: usize = conn
        .query_row(
            "SELECT COUNT(DISTINCT person) FROM work_events
             WHERE month BETWEEN ?1 AND ?2",
            params![start_month, end_month],
            |row| row.get(0),
        )
        .context("count active users")?;

    let active_roles: usize = conn
        .query_row(
            "SELECT COUNT(DISTINCT p.role)
             FROM work_events w
             JOIN persons p ON p.name = w.person
             WHERE w.month BETWEEN ?1 AND ?2",
            params![start_month, end_month],
            |row| row.get(0),
        )
        .context("count active roles")?;

    let total_interactions: usize = conn
        .query_row(
            "SELECT COALESCE(SUM(weight), 0) FROM collaborations
             WHERE month BETWEEN ?1 AND ?2",
            params![start_month, end_month],
            |row| row.get(0),
        )
        .context("sum collaboration weight")?;

    Ok(OrgSnapshot {
        phase: format!("{start_month} to {end_month}"),
        active_users,
        active_roles,
        total_interactions,
    })
}

/// Per-month snapshots across an inclusive range, in ascending month
/// order. Months with no activity are present and zero-filled.
///
/// # Errors
///
/// Returns an error if the range is malformed or a query fails.
pub fn organization_trend(
    conn: &Connection,
    start_month: &str,
    end_month: &str,
) -> Result<Vec<OrgSnapshot>> {
    use std::collections::HashMap;

    let months = month_range(start_month, end_month)?;

    let mut activity: HashMap<String, (usize, usize)> = HashMap::new();
    {
        let mut stmt = conn
            .prepare(
                "SELECT w.month, COUNT(DISTINCT w.person), COUNT(DISTINCT p.role)
                 FROM work_events w
                 JOIN persons p ON p.name = w.person
                 WHERE w.month BETWEEN ?1 AND ?2
                 GROUP BY w.month",
            )
            .context("prepare trend activity query")?;
        let rows = stmt
            .query_map(params![start_month, end_month], |row| {
                Ok((row.get::<_, String>(0)?, row.get(1)?, row.get(2)?))
            })
            .context("run trend activity query")?;
        for row in rows {
            let (month, users, roles) = row.context("read trend activity row")?;
            activity.insert(month, (users, roles));
        }
    }

    let mut weights: HashMap<String, usize> = HashMap::new();
    {
        let mut stmt = conn
            .prepare(
                "SELECT month, SUM(weight) FROM collaborations
                 WHERE month BETWEEN ?1 AND ?2
                 GROUP BY month",
            )
            .context("prepare trend weight query")?;
        let rows = stmt
            .query_map(params![start_month, end_month], |row| {
                Ok((row.get::<_, String>(0)?, row.get(1)?))
            })
            .context("run trend weight query")?;
        for row in rows {
            let (month, total) = row.context("read trend weight row")?;
            weights.insert(month, total);
        }
    }

    Ok(months
        .into_iter()
        .map(|month| {
            let (active_users, active_roles) =
                activity.get(&month).copied().unwrap_or_default();
            let total_interactions = weights.get(&month).copied().unwrap_or_default();
            OrgSnapshot {
                phase: month,
                active_users,
                active_roles,
                total_interactions,
            }
        })
        .collect())
}

// ---------------------------------------------------------------------------
// Role interactions
// ---------------------------------------------------------------------------

/// Ranked role-pair interactions, strongest first.
///
/// `limit = None` returns the full ranking; `Some(0)` returns nothing.
/// Ties break on ascending role names.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn role_interactions(
    conn: &Connection,
    limit: Option<usize>,
) -> Result<Vec<RoleInteraction>> {
    let sql = "SELECT role_a, role_b, total_weight FROM interactions
               ORDER BY total_weight DESC, role_a ASC, role_b ASC
               LIMIT ?1";
    let limit = limit.map_or(-1_i64, |n| i64::try_from(n).unwrap_or(i64::MAX));

    let mut stmt = conn.prepare(sql).context("prepare role interactions")?;
    let rows = stmt
        .query_map(params![limit], |row| {
            Ok(RoleInteraction {
                role_a: row.get(0)?,
                role_b: row.get(1)?,
                weight: row.get(2)?,
            })
        })
        .context("run role interactions")?;
    rows.collect::<Result<Vec<_>, _>>()
        .context("read role interactions")
}

/// Person-pair collaborations for one month, strongest first.
///
/// # Errors
///
/// Returns an error if the month is malformed or the query fails.
pub fn user_collaboration(conn: &Connection, month: &str) -> Result<Vec<UserCollaboration>> {
    validate_month(month)?;

    let mut stmt = conn
        .prepare(
            "SELECT c.person_a, pa.role, c.person_b, pb.role, c.weight
             FROM collaborations c
             JOIN persons pa ON pa.name = c.person_a
             JOIN persons pb ON pb.name = c.person_b
             WHERE c.month = ?1
             ORDER BY c.weight DESC, c.person_a ASC, c.person_b ASC",
        )
        .context("prepare user collaboration")?;
    let rows = stmt
        .query_map(params![month], |row| {
            Ok(UserCollaboration {
                user_a: row.get(0)?,
                role_a: row.get(1)?,
                user_b: row.get(2)?,
                role_b: row.get(3)?,
                weight: row.get(4)?,
                month: month.to_string(),
            })
        })
        .context("run user collaboration")?;
    rows.collect::<Result<Vec<_>, _>>()
        .context("read user collaboration")
}

// ---------------------------------------------------------------------------
// Diagram export
// ---------------------------------------------------------------------------

/// Role nodes plus interaction edges for diagram rendering.
///
/// # Errors
///
/// Returns an error if a query fails.
pub fn bpmn_export(conn: &Connection) -> Result<BpmnGraph> {
    let nodes = all_roles(conn)?
        .into_iter()
        .map(|name| BpmnNode {
            label: name.clone(),
            id: name,
            kind: "Role".to_string(),
        })
        .collect();

    let mut stmt = conn
        .prepare(
            "SELECT role_a, role_b, total_weight FROM interactions
             ORDER BY role_a ASC, role_b ASC",
        )
        .context("prepare diagram edges")?;
    let edges = stmt
        .query_map([], |row| {
            let weight: usize = row.get(2)?;
            Ok(BpmnEdge {
                source: row.get(0)?,
                target: row.get(1)?,
                label: weight.to_string(),
                weight,
            })
        })
        .context("run diagram edges")?
        .collect::<Result<Vec<_>, _>>()
        .context("read diagram edges")?;

    Ok(BpmnGraph { nodes, edges })
}

// ---------------------------------------------------------------------------
// Monthly totals
// ---------------------------------------------------------------------------

/// Collaboration-weight totals per month, ascending, optionally
/// restricted to one `YYYY` year.
///
/// # Errors
///
/// Returns an error if the year is malformed or the query fails.
pub fn monthly_interactions(
    conn: &Connection,
    year: Option<&str>,
) -> Result<Vec<MonthlyInteractions>> {
    if let Some(year) = year {
        if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
            bail!("invalid year '{year}': expected YYYY");
        }
    }

    let sql = "SELECT month, SUM(weight) FROM collaborations
               WHERE ?1 IS NULL OR month LIKE ?1 || '-%'
               GROUP BY month
               ORDER BY month ASC";
    let mut stmt = conn.prepare(sql).context("prepare monthly interactions")?;
    let rows = stmt
        .query_map(params![year], |row| {
            Ok(MonthlyInteractions {
                month: row.get(0)?,
                total_interactions: row.get(1)?,
            })
        })
        .context("run monthly interactions")?;
    rows.collect::<Result<Vec<_>, _>>()
        .context("read monthly interactions")
}

// ---------------------------------------------------------------------------
// Overtime
// ---------------------------------------------------------------------------

/// Top people by work events outside 07:00–18:59, with their current
/// role. Ties break on ascending name.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn overtime_risk(conn: &Connection) -> Result<Vec<OvertimeRisk>> {
    let mut stmt = conn
        .prepare(
            "SELECT w.person, p.role, COUNT(*) AS overtime_count
             FROM work_events w
             JOIN persons p ON p.name = w.person
             WHERE w.hour < ?1 OR w.hour > ?2
             GROUP BY w.person, p.role
             ORDER BY overtime_count DESC, w.person ASC
             LIMIT ?3",
        )
        .context("prepare overtime risk")?;
    let rows = stmt
        .query_map(
            params![
                OVERTIME_MORNING_CUTOFF,
                OVERTIME_EVENING_CUTOFF,
                i64::try_from(OVERTIME_LIMIT).unwrap_or(i64::MAX)
            ],
            |row| {
                Ok(OvertimeRisk {
                    name: row.get(0)?,
                    role: row.get(1)?,
                    overtime_count: row.get(2)?,
                })
            },
        )
        .context("run overtime risk")?;
    rows.collect::<Result<Vec<_>, _>>()
        .context("read overtime risk")
}

// ---------------------------------------------------------------------------
// Project durations
// ---------------------------------------------------------------------------

/// Longest cases by whole-day span between first and last work event.
/// Ties break on ascending case id.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn project_durations(conn: &Connection) -> Result<Vec<ProjectDuration>> {
    let mut stmt = conn
        .prepare(
            "SELECT case_id, (MAX(ts_us) - MIN(ts_us)) / ?1 AS duration_days
             FROM work_events
             GROUP BY case_id
             ORDER BY duration_days DESC, case_id ASC
             LIMIT ?2",
        )
        .context("prepare project durations")?;
    let rows = stmt
        .query_map(
            params![MICROS_PER_DAY, i64::try_from(DURATION_LIMIT).unwrap_or(i64::MAX)],
            |row| {
                Ok(ProjectDuration {
                    case_id: row.get(0)?,
                    duration_days: row.get(1)?,
                })
            },
        )
        .context("run project durations")?;
    rows.collect::<Result<Vec<_>, _>>()
        .context("read project durations")
}

/// Mean of all per-case whole-day durations, rounded to one decimal.
/// `0.0` when the graph holds no work events.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn average_project_duration(conn: &Connection) -> Result<f64> {
    let avg: Option<f64> = conn
        .query_row(
            "SELECT AVG(duration_days) FROM (
                 SELECT (MAX(ts_us) - MIN(ts_us)) / ?1 AS duration_days
                 FROM work_events
                 GROUP BY case_id
             )",
            params![MICROS_PER_DAY],
            |row| row.get(0),
        )
        .optional()
        .context("average project duration")?
        .flatten();

    Ok(avg.map_or(0.0, round_one_decimal))
}

// ---------------------------------------------------------------------------
// Handover flow
// ---------------------------------------------------------------------------

/// Slowest role-to-role handovers: consecutive work events per case in
/// time order, counted only where the acting persons' current roles
/// differ. Average lag in hours, rounded to one decimal; ties break on
/// ascending role names.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn handover_flow(conn: &Connection) -> Result<Vec<HandoverFlow>> {
    let mut stmt = conn
        .prepare(
            "WITH steps AS (
                 SELECT p.role AS role,
                        w.ts_us,
                        LEAD(p.role) OVER win AS next_role,
                        LEAD(w.ts_us) OVER win AS next_ts_us
                 FROM work_events w
                 JOIN persons p ON p.name = w.person
                 WINDOW win AS (PARTITION BY w.case_id ORDER BY w.ts_us, w.event_id)
             )
             SELECT role,
                    next_role,
                    AVG((next_ts_us - ts_us) / ?1) AS avg_hours
             FROM steps
             WHERE next_role IS NOT NULL AND next_role <> role
             GROUP BY role, next_role
             ORDER BY avg_hours DESC, role ASC, next_role ASC
             LIMIT ?2",
        )
        .context("prepare handover flow")?;
    let rows = stmt
        .query_map(
            params![MICROS_PER_HOUR, i64::try_from(HANDOVER_LIMIT).unwrap_or(i64::MAX)],
            |row| {
                Ok(HandoverFlow {
                    source_role: row.get(0)?,
                    target_role: row.get(1)?,
                    avg_duration_hours: row.get(2)?,
                })
            },
        )
        .context("run handover flow")?;
    let mut flows = rows
        .collect::<Result<Vec<_>, _>>()
        .context("read handover flow")?;
    for flow in &mut flows {
        flow.avg_duration_hours = round_one_decimal(flow.avg_duration_hours);
    }
    Ok(flows)
}

// ---------------------------------------------------------------------------
// Utilization
// ---------------------------------------------------------------------------

/// Work-event counts per (day-of-week, hour) slot, ascending.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn resource_utilization(conn: &Connection) -> Result<Vec<UtilizationSlot>> {
    let mut stmt = conn
        .prepare(
            "SELECT weekday, hour, COUNT(*) FROM work_events
             GROUP BY weekday, hour
             ORDER BY weekday ASC, hour ASC",
        )
        .context("prepare resource utilization")?;
    let rows = stmt
        .query_map([], |row| {
            Ok(UtilizationSlot {
                weekday: row.get(0)?,
                hour: row.get(1)?,
                count: row.get(2)?,
            })
        })
        .context("run resource utilization")?;
    rows.collect::<Result<Vec<_>, _>>()
        .context("read resource utilization")
}

// ---------------------------------------------------------------------------
// Node listings
// ---------------------------------------------------------------------------

/// All role names, ascending.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn all_roles(conn: &Connection) -> Result<Vec<String>> {
    list_names(conn, "SELECT name FROM roles ORDER BY name ASC")
}

/// All person names, ascending.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn all_users(conn: &Connection) -> Result<Vec<String>> {
    list_names(conn, "SELECT name FROM persons ORDER BY name ASC")
}

/// Earliest and latest month buckets present in the event graph, or
/// `None` when no work events are loaded.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn month_bounds(conn: &Connection) -> Result<Option<(String, String)>> {
    let bounds: (Option<String>, Option<String>) = conn
        .query_row("SELECT MIN(month), MAX(month) FROM work_events", [], |row| {
            Ok((row.get(0)?, row.get(1)?))
        })
        .context("query month bounds")?;
    Ok(match bounds {
        (Some(min), Some(max)) => Some((min, max)),
        _ => None,
    })
}

fn list_names(conn: &Connection, sql: &str) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(sql).context("prepare name listing")?;
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .context("run name listing")?;
    rows.collect::<Result<Vec<_>, _>>()
        .context("read name listing")
}

// ---------------------------------------------------------------------------
// Month helpers
// ---------------------------------------------------------------------------

fn validate_month(month: &str) -> Result<(i32, u32)> {
    let parsed = month
        .split_once('-')
        .and_then(|(y, m)| Some((y.parse::<i32>().ok()?, m.parse::<u32>().ok()?)));
    match parsed {
        Some((year, m)) if month.len() == 7 && (1..=12).contains(&m) => Ok((year, m)),
        _ => bail!("invalid month '{month}': expected YYYY-MM"),
    }
}

/// Inclusive list of `YYYY-MM` buckets from `start` to `end`; empty when
/// `start` sorts after `end`.
fn month_range(start: &str, end: &str) -> Result<Vec<String>> {
    let (mut year, mut month) = validate_month(start)?;
    let (end_year, end_month) = validate_month(end)?;

    let mut out = Vec::new();
    while (year, month) <= (end_year, end_month) {
        out.push(format!("{year:04}-{month:02}"));
        month += 1;
        if month > 12 {
            month = 1;
            year += 1;
        }
    }
    Ok(out)
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema;

    fn seeded_conn() -> Connection {
        let conn = Connection::open_in_memory().expect("open in-memory store");
        schema::init(&conn).expect("create schema");
        conn.execute_batch(
            "INSERT INTO persons (name, role) VALUES
                 ('Alice', 'Developer'), ('Bob', 'Tester'), ('Carol', 'Analyst');
             INSERT INTO roles (name) VALUES ('Developer'), ('Tester'), ('Analyst');
             INSERT INTO cases (case_id) VALUES ('c1'), ('c2');
             INSERT INTO collaborations (person_a, person_b, month, weight) VALUES
                 ('Alice', 'Bob', '2019-01', 3),
                 ('Alice', 'Carol', '2019-01', 3),
                 ('Bob', 'Carol', '2019-03', 1);
             INSERT INTO interactions (role_a, role_b, total_weight) VALUES
                 ('Developer', 'Tester', 3),
                 ('Analyst', 'Developer', 3),
                 ('Analyst', 'Tester', 1);",
        )
        .expect("seed");
        conn
    }

    #[test]
    fn role_interactions_rank_with_name_tie_break() {
        let conn = seeded_conn();
        let ranked = role_interactions(&conn, None).expect("query");
        let pairs: Vec<(&str, &str)> = ranked
            .iter()
            .map(|i| (i.role_a.as_str(), i.role_b.as_str()))
            .collect();
        // Equal weights order by role_a then role_b.
        assert_eq!(
            pairs,
            vec![
                ("Analyst", "Developer"),
                ("Developer", "Tester"),
                ("Analyst", "Tester"),
            ]
        );
    }

    #[test]
    fn role_interactions_limit_zero_is_empty() {
        let conn = seeded_conn();
        assert!(role_interactions(&conn, Some(0)).expect("query").is_empty());
        assert_eq!(role_interactions(&conn, Some(2)).expect("query").len(), 2);
    }

    #[test]
    fn user_collaboration_orders_by_weight_then_names() {
        let conn = seeded_conn();
        let rows = user_collaboration(&conn, "2019-01").expect("query");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].user_a, "Alice");
        assert_eq!(rows[0].user_b, "Bob");
        assert_eq!(rows[1].user_b, "Carol");
        assert!(rows.iter().all(|r| r.month == "2019-01"));
    }

    #[test]
    fn trend_zero_fills_quiet_months() {
        let conn = seeded_conn();
        let trend = organization_trend(&conn, "2019-01", "2019-03").expect("query");
        let phases: Vec<&str> = trend.iter().map(|t| t.phase.as_str()).collect();
        assert_eq!(phases, vec!["2019-01", "2019-02", "2019-03"]);
        assert_eq!(trend[0].total_interactions, 6);
        assert_eq!(trend[1].total_interactions, 0);
        assert_eq!(trend[1].active_users, 0);
        assert_eq!(trend[2].total_interactions, 1);
    }

    #[test]
    fn monthly_interactions_respects_year_filter() {
        let conn = seeded_conn();
        conn.execute(
            "INSERT INTO collaborations (person_a, person_b, month, weight)
             VALUES ('Alice', 'Bob', '2020-01', 9)",
            [],
        )
        .expect("insert");

        let all = monthly_interactions(&conn, None).expect("query");
        assert_eq!(all.len(), 3);

        let filtered = monthly_interactions(&conn, Some("2019")).expect("query");
        let months: Vec<&str> = filtered.iter().map(|m| m.month.as_str()).collect();
        assert_eq!(months, vec!["2019-01", "2019-03"]);

        assert!(monthly_interactions(&conn, Some("19")).is_err());
    }

    #[test]
    fn snapshot_on_empty_range_is_zero() {
        let conn = seeded_conn();
        let snap = organization_snapshot(&conn, "2024-01", "2024-12").expect("query");
        assert_eq!(snap.active_users, 0);
        assert_eq!(snap.active_roles, 0);
        assert_eq!(snap.total_interactions, 0);
        assert_eq!(snap.phase, "2024-01 to 2024-12");
    }

    #[test]
    fn average_duration_on_empty_graph_is_zero() {
        let conn = Connection::open_in_memory().expect("open");
        schema::init(&conn).expect("schema");
        let avg = average_project_duration(&conn).expect("query");
        assert!((avg - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn bpmn_export_lists_all_roles_even_without_edges() {
        let conn = seeded_conn();
        conn.execute("INSERT INTO roles (name) VALUES ('Idle')", [])
            .expect("insert");
        let graph = bpmn_export(&conn).expect("query");
        assert_eq!(graph.nodes.len(), 4);
        assert_eq!(graph.edges.len(), 3);
        assert!(graph.nodes.iter().all(|n| n.kind == "Role"));
        assert_eq!(graph.edges[0].label, graph.edges[0].weight.to_string());
    }

    #[test]
    fn month_range_is_inclusive_and_handles_year_wrap() {
        let range = month_range("2019-11", "2020-02").expect("range");
        assert_eq!(range, vec!["2019-11", "2019-12", "2020-01", "2020-02"]);
        assert!(month_range("2020-02", "2019-11").expect("range").is_empty());
        assert!(month_range("2019-13", "2020-01").is_err());
        assert!(month_range("junk", "2020-01").is_err());
    }
}
