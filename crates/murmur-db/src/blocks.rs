//! Block relations between users.
//!
//! A block is directional: `blocker` suppresses interaction with `blockee`.
//! The `(blocker_id, blockee_id)` unique index guarantees at most one row per
//! ordered pair, so concurrent duplicate requests resolve in the store.

use anyhow::Result;
use tracing::debug;

use crate::Database;
use crate::queries::{OptionalExt, is_unique_violation};

impl Database {
    /// Record that `blocker_id` blocks `blockee_id`.
    /// Returns `false` if the pair is already blocked; no second row is written.
    pub fn block_user(&self, id: &str, blocker_id: &str, blockee_id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT INTO blocks (id, blocker_id, blockee_id) VALUES (?1, ?2, ?3)",
                (id, blocker_id, blockee_id),
            );

            match inserted {
                Ok(_) => Ok(true),
                Err(e) if is_unique_violation(&e) => {
                    debug!("Block {} -> {} already exists", blocker_id, blockee_id);
                    Ok(false)
                }
                Err(e) => Err(e.into()),
            }
        })
    }

    /// Remove the block `blocker_id` -> `blockee_id`.
    /// Returns `false` if there was nothing to remove.
    pub fn unblock_user(&self, blocker_id: &str, blockee_id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let existing: Option<String> = conn
                .query_row(
                    "SELECT id FROM blocks WHERE blocker_id = ?1 AND blockee_id = ?2",
                    [blocker_id, blockee_id],
                    |row| row.get(0),
                )
                .optional()?;

            let Some(block_id) = existing else {
                return Ok(false);
            };

            conn.execute("DELETE FROM blocks WHERE id = ?1", [&block_id])?;
            Ok(true)
        })
    }

    /// Whether `blocker_id` has blocked `blockee_id`. The reverse pair is not consulted.
    pub fn is_blocked(&self, blocker_id: &str, blockee_id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let found: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM blocks WHERE blocker_id = ?1 AND blockee_id = ?2)",
                [blocker_id, blockee_id],
                |row| row.get(0),
            )?;
            Ok(found)
        })
    }
}
