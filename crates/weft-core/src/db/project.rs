//! Two-pass relationship projection over the loaded graph.
//!
//! Run strictly after all desired file loads: projecting early yields an
//! incomplete graph. Both passes are single `INSERT … SELECT` statements
//! with upsert-or-accumulate conflict handling, so concurrent projection
//! runs cannot interleave partial weights.
//!
//! # Pass 1 — collaboration
//!
//! Every unordered pair of distinct people with work events on the same
//! case in the same month gains one weight unit per event-pair
//! co-occurrence, keyed `(min(name), max(name), month)`.
//!
//! # Pass 2 — interaction
//!
//! Collaboration weights roll up to the endpoints' *current* roles,
//! keyed by the lexicographic role pair; same-role pairs are excluded.
//! Canonical key order means each undirected edge contributes exactly
//! once per run.
//!
//! # Re-runs
//!
//! Projection is cumulative, not idempotent: running it twice without a
//! clear doubles every weight. The supported idempotent path is
//! clear + load + project.

use anyhow::{Context, Result};
use rusqlite::Connection;
use serde::Serialize;

const COLLABORATION_SQL: &str = "
INSERT INTO collaborations (person_a, person_b, month, weight)
SELECT w1.person, w2.person, w1.month, COUNT(*)
FROM work_events w1
JOIN work_events w2
  ON w2.case_id = w1.case_id
 AND w2.month = w1.month
 AND w2.person > w1.person
GROUP BY w1.person, w2.person, w1.month
ON CONFLICT (person_a, person_b, month)
DO UPDATE SET weight = weight + excluded.weight";

const INTERACTION_SQL: &str = "
INSERT INTO interactions (role_a, role_b, total_weight)
SELECT MIN(pa.role, pb.role), MAX(pa.role, pb.role), SUM(c.weight)
FROM collaborations c
JOIN persons pa ON pa.name = c.person_a
JOIN persons pb ON pb.name = c.person_b
WHERE pa.role <> pb.role
GROUP BY MIN(pa.role, pb.role), MAX(pa.role, pb.role)
ON CONFLICT (role_a, role_b)
DO UPDATE SET total_weight = total_weight + excluded.total_weight";

/// Edge counts touched by a projection run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProjectionStats {
    /// Collaboration edges inserted or re-weighted.
    pub collaborations: usize,
    /// Interaction edges inserted or re-weighted.
    pub interactions: usize,
}

/// Derives COLLABORATED_IN and INTERACTS_WITH edges from work events.
pub struct Projector<'conn> {
    conn: &'conn Connection,
}

impl<'conn> Projector<'conn> {
    /// Create a projector backed by the given connection.
    #[must_use]
    pub const fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Run both projection passes in one transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if either pass fails; the transaction rolls back
    /// and no weights change.
    pub fn run(&self) -> Result<ProjectionStats> {
        let tx = self
            .conn
            .unchecked_transaction()
            .context("begin projection transaction")?;

        let collaborations = tx
            .execute(COLLABORATION_SQL, [])
            .context("project collaboration edges")?;
        let interactions = tx
            .execute(INTERACTION_SQL, [])
            .context("project interaction edges")?;

        tx.commit().context("commit projection transaction")?;

        let stats = ProjectionStats {
            collaborations,
            interactions,
        };
        tracing::info!(
            collaborations = stats.collaborations,
            interactions = stats.interactions,
            "graph projected"
        );
        Ok(stats)
    }
}
