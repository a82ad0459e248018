//! Repository for the `traits` table and trait lookups through `pet_traits`.

use petkare_core::types::DbId;
use sqlx::PgPool;

use crate::models::traits::{NewTrait, Trait, TraitLink};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, created_at, updated_at";

/// Provides lookup and get-or-create operations for traits.
pub struct TraitRepo;

impl TraitRepo {
    /// Exact (case-sensitive) lookup by name. Returns the oldest match.
    ///
    /// Used by the pet list filter, which matches trait names verbatim.
    pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<Trait>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM traits WHERE name = $1 ORDER BY id LIMIT 1");
        sqlx::query_as::<_, Trait>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// Case-insensitive lookup by name.
    pub async fn find_by_name_ci(pool: &PgPool, name: &str) -> Result<Option<Trait>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM traits WHERE LOWER(name) = LOWER($1) ORDER BY id LIMIT 1"
        );
        sqlx::query_as::<_, Trait>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// Return the trait matching `input.name` (ignoring case), inserting it
    /// with the given casing if none exists.
    pub async fn find_or_create(pool: &PgPool, input: &NewTrait) -> Result<Trait, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let item = Self::find_or_create_inner(&mut tx, input).await?;
        tx.commit().await?;
        Ok(item)
    }

    /// Get-or-create within an existing transaction.
    pub async fn find_or_create_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        input: &NewTrait,
    ) -> Result<Trait, sqlx::Error> {
        let select = format!(
            "SELECT {COLUMNS} FROM traits WHERE LOWER(name) = LOWER($1) ORDER BY id LIMIT 1"
        );

        let existing = sqlx::query_as::<_, Trait>(&select)
            .bind(&input.name)
            .fetch_optional(&mut **tx)
            .await?;
        if let Some(item) = existing {
            return Ok(item);
        }

        let insert = format!(
            "INSERT INTO traits (name) VALUES ($1) \
             ON CONFLICT DO NOTHING \
             RETURNING {COLUMNS}"
        );
        let created = sqlx::query_as::<_, Trait>(&insert)
            .bind(&input.name)
            .fetch_optional(&mut **tx)
            .await?;

        match created {
            Some(item) => {
                tracing::debug!(trait_id = item.id, name = %item.name, "Trait created");
                Ok(item)
            }
            None => {
                sqlx::query_as::<_, Trait>(&select)
                    .bind(&input.name)
                    .fetch_one(&mut **tx)
                    .await
            }
        }
    }

    /// All traits linked to any of `pet_ids`, ordered by pet then link order.
    pub async fn list_for_pets(
        pool: &PgPool,
        pet_ids: &[DbId],
    ) -> Result<Vec<TraitLink>, sqlx::Error> {
        sqlx::query_as::<_, TraitLink>(
            "SELECT pt.pet_id, t.id, t.name, t.created_at, t.updated_at \
             FROM pet_traits pt \
             JOIN traits t ON t.id = pt.trait_id \
             WHERE pt.pet_id = ANY($1) \
             ORDER BY pt.pet_id, pt.id",
        )
        .bind(pet_ids)
        .fetch_all(pool)
        .await
    }
}
