//! Repository for the `groups` table.

use petkare_core::types::DbId;
use sqlx::PgPool;

use crate::models::group::{Group, NewGroup};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, scientific_name, created_at, updated_at";

/// Provides lookup and get-or-create operations for groups.
pub struct GroupRepo;

impl GroupRepo {
    /// Find a group by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Group>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM groups WHERE id = $1");
        sqlx::query_as::<_, Group>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Fetch every group whose ID is in `ids`, in ID order.
    pub async fn find_by_ids(pool: &PgPool, ids: &[DbId]) -> Result<Vec<Group>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM groups WHERE id = ANY($1) ORDER BY id");
        sqlx::query_as::<_, Group>(&query)
            .bind(ids)
            .fetch_all(pool)
            .await
    }

    /// Case-insensitive lookup by scientific name.
    pub async fn find_by_scientific_name(
        pool: &PgPool,
        scientific_name: &str,
    ) -> Result<Option<Group>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM groups \
             WHERE LOWER(scientific_name) = LOWER($1) \
             ORDER BY id LIMIT 1"
        );
        sqlx::query_as::<_, Group>(&query)
            .bind(scientific_name)
            .fetch_optional(pool)
            .await
    }

    /// Return the group matching `input.scientific_name` (ignoring case),
    /// inserting it with the given casing if none exists.
    pub async fn find_or_create(pool: &PgPool, input: &NewGroup) -> Result<Group, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let group = Self::find_or_create_inner(&mut tx, input).await?;
        tx.commit().await?;
        Ok(group)
    }

    /// Get-or-create within an existing transaction.
    ///
    /// A concurrent insert of the same name is absorbed by `ON CONFLICT DO
    /// NOTHING` followed by a re-read.
    pub async fn find_or_create_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        input: &NewGroup,
    ) -> Result<Group, sqlx::Error> {
        let select = format!(
            "SELECT {COLUMNS} FROM groups \
             WHERE LOWER(scientific_name) = LOWER($1) \
             ORDER BY id LIMIT 1"
        );

        let existing = sqlx::query_as::<_, Group>(&select)
            .bind(&input.scientific_name)
            .fetch_optional(&mut **tx)
            .await?;
        if let Some(group) = existing {
            return Ok(group);
        }

        let insert = format!(
            "INSERT INTO groups (scientific_name) VALUES ($1) \
             ON CONFLICT DO NOTHING \
             RETURNING {COLUMNS}"
        );
        let created = sqlx::query_as::<_, Group>(&insert)
            .bind(&input.scientific_name)
            .fetch_optional(&mut **tx)
            .await?;

        match created {
            Some(group) => {
                tracing::debug!(group_id = group.id, scientific_name = %group.scientific_name, "Group created");
                Ok(group)
            }
            None => {
                sqlx::query_as::<_, Group>(&select)
                    .bind(&input.scientific_name)
                    .fetch_one(&mut **tx)
                    .await
            }
        }
    }
}
