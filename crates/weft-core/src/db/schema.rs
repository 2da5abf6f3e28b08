//! Canonical graph schema for weft.
//!
//! The property graph is normalized for queryability and deterministic
//! projection:
//! - node tables (`persons`, `roles`, `cases`) carry identity plus the
//!   one mutable attribute (`persons.role`, last-write-wins on reload)
//! - `work_events` models the WORKED_ON relationship, one row per
//!   accepted log row, never deduplicated
//! - `collaborations` and `interactions` hold the projected edges under
//!   canonical key order (`person_a < person_b`; lexicographic role pair)

/// Schema DDL, applied idempotently at open.
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS persons (
    name TEXT PRIMARY KEY,
    role TEXT NOT NULL DEFAULT ''
) WITHOUT ROWID;

CREATE TABLE IF NOT EXISTS roles (
    name TEXT PRIMARY KEY
) WITHOUT ROWID;

CREATE TABLE IF NOT EXISTS cases (
    case_id TEXT PRIMARY KEY
) WITHOUT ROWID;

CREATE TABLE IF NOT EXISTS work_events (
    event_id INTEGER PRIMARY KEY AUTOINCREMENT,
    person TEXT NOT NULL REFERENCES persons(name),
    case_id TEXT NOT NULL REFERENCES cases(case_id),
    activity TEXT NOT NULL DEFAULT '',
    ts_us INTEGER NOT NULL,
    month TEXT NOT NULL CHECK (length(month) = 7),
    hour INTEGER NOT NULL CHECK (hour BETWEEN 0 AND 23),
    weekday INTEGER NOT NULL CHECK (weekday BETWEEN 1 AND 7),
    source_file TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS collaborations (
    person_a TEXT NOT NULL REFERENCES persons(name),
    person_b TEXT NOT NULL REFERENCES persons(name),
    month TEXT NOT NULL,
    weight INTEGER NOT NULL CHECK (weight > 0),
    PRIMARY KEY (person_a, person_b, month),
    CHECK (person_a < person_b)
) WITHOUT ROWID;

CREATE TABLE IF NOT EXISTS interactions (
    role_a TEXT NOT NULL REFERENCES roles(name),
    role_b TEXT NOT NULL REFERENCES roles(name),
    total_weight INTEGER NOT NULL CHECK (total_weight > 0),
    PRIMARY KEY (role_a, role_b),
    CHECK (role_a <> role_b)
) WITHOUT ROWID;

CREATE INDEX IF NOT EXISTS idx_work_events_case_month
    ON work_events(case_id, month, person);

CREATE INDEX IF NOT EXISTS idx_work_events_month_person
    ON work_events(month, person);

CREATE INDEX IF NOT EXISTS idx_work_events_case_ts
    ON work_events(case_id, ts_us, event_id);

CREATE INDEX IF NOT EXISTS idx_work_events_hour
    ON work_events(hour, person);

CREATE INDEX IF NOT EXISTS idx_collaborations_month
    ON collaborations(month);
"#;

/// Indexes expected by the projection and analytics read paths.
pub const REQUIRED_INDEXES: &[&str] = &[
    "idx_work_events_case_month",
    "idx_work_events_month_person",
    "idx_work_events_case_ts",
    "idx_work_events_hour",
    "idx_collaborations_month",
];

/// Create all tables and indexes if absent.
///
/// # Errors
///
/// Returns an error if any DDL statement fails.
pub fn init(conn: &rusqlite::Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)
}

#[cfg(test)]
mod tests {
    use super::{REQUIRED_INDEXES, init};
    use rusqlite::Connection;

    fn seeded_conn() -> rusqlite::Result<Connection> {
        let conn = Connection::open_in_memory()?;
        init(&conn)?;

        conn.execute_batch(
            "INSERT INTO persons (name, role) VALUES ('Alice', 'Developer'), ('Bob', 'Tester');
             INSERT INTO roles (name) VALUES ('Developer'), ('Tester');
             INSERT INTO cases (case_id) VALUES ('case-1');
             INSERT INTO work_events (person, case_id, activity, ts_us, month, hour, weekday, source_file)
             VALUES ('Alice', 'case-1', 'Commit', 1556110800000000, '2019-04', 15, 3, 'log.csv'),
                    ('Bob', 'case-1', 'Test', 1556114400000000, '2019-04', 16, 3, 'log.csv');",
        )?;
        Ok(conn)
    }

    fn query_plan_details(conn: &Connection, sql: &str) -> rusqlite::Result<Vec<String>> {
        let mut stmt = conn.prepare(&format!("EXPLAIN QUERY PLAN {sql}"))?;
        let details = stmt
            .query_map([], |row| row.get::<_, String>(3))?
            .collect::<Result<Vec<_>, _>>();
        details
    }

    #[test]
    fn all_required_indexes_exist() -> rusqlite::Result<()> {
        let conn = seeded_conn()?;
        for name in REQUIRED_INDEXES {
            let found: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'index' AND name = ?1)",
                [name],
                |row| row.get(0),
            )?;
            assert!(found, "missing index {name}");
        }
        Ok(())
    }

    #[test]
    fn query_plan_uses_case_month_index_for_co_occurrence() -> rusqlite::Result<()> {
        let conn = seeded_conn()?;
        let details = query_plan_details(
            &conn,
            "SELECT w2.person
             FROM work_events w1
             JOIN work_events w2
               ON w2.case_id = w1.case_id
              AND w2.month = w1.month
              AND w2.person > w1.person",
        )?;

        assert!(
            details
                .iter()
                .any(|detail| detail.contains("idx_work_events_case_month")),
            "expected co-occurrence index in plan, got: {details:?}"
        );
        Ok(())
    }

    #[test]
    fn canonical_pair_order_is_enforced() -> rusqlite::Result<()> {
        let conn = seeded_conn()?;
        let err = conn.execute(
            "INSERT INTO collaborations (person_a, person_b, month, weight)
             VALUES ('Bob', 'Alice', '2019-04', 1)",
            [],
        );
        assert!(err.is_err(), "reversed pair must violate CHECK (person_a < person_b)");
        Ok(())
    }

    #[test]
    fn same_role_interaction_is_rejected() -> rusqlite::Result<()> {
        let conn = seeded_conn()?;
        let err = conn.execute(
            "INSERT INTO interactions (role_a, role_b, total_weight)
             VALUES ('Developer', 'Developer', 1)",
            [],
        );
        assert!(err.is_err(), "self-pair must violate CHECK (role_a <> role_b)");
        Ok(())
    }
}
