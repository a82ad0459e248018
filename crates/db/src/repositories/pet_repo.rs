//! Repository for the `pets` and `pet_traits` tables.

use std::collections::{HashMap, HashSet};

use petkare_core::types::DbId;
use sqlx::PgPool;

use crate::models::group::Group;
use crate::models::pet::{CreatePet, Pet, PetDetail, UpdatePet};
use crate::models::traits::{NewTrait, Trait};
use crate::repositories::{GroupRepo, TraitRepo};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, age, weight, sex, group_id, created_at, updated_at";

/// Same columns qualified with the `p` alias, for joins.
const PREFIXED_COLUMNS: &str =
    "p.id, p.name, p.age, p.weight, p.sex, p.group_id, p.created_at, p.updated_at";

/// Provides CRUD operations for pets and their trait links.
pub struct PetRepo;

impl PetRepo {
    /// Create a pet together with its group and traits in one transaction.
    ///
    /// The group and every trait go through get-or-create, so names that
    /// differ only in case resolve to the same row. Repeated trait names
    /// produce a single link.
    pub async fn create(pool: &PgPool, input: &CreatePet) -> Result<PetDetail, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let group = GroupRepo::find_or_create_inner(&mut tx, &input.group).await?;

        let insert_query = format!(
            "INSERT INTO pets (name, age, weight, sex, group_id) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        let pet = sqlx::query_as::<_, Pet>(&insert_query)
            .bind(&input.name)
            .bind(input.age)
            .bind(input.weight)
            .bind(&input.sex)
            .bind(group.id)
            .fetch_one(&mut *tx)
            .await?;

        let traits = Self::link_traits_inner(&mut tx, pet.id, &input.traits).await?;

        tx.commit().await?;
        Ok(PetDetail::new(pet, group, traits))
    }

    /// Find a pet row by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Pet>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM pets WHERE id = $1");
        sqlx::query_as::<_, Pet>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a pet by ID with its group and traits resolved.
    pub async fn find_detail(pool: &PgPool, id: DbId) -> Result<Option<PetDetail>, sqlx::Error> {
        match Self::find_by_id(pool, id).await? {
            Some(pet) => Ok(Self::hydrate(pool, vec![pet]).await?.pop()),
            None => Ok(None),
        }
    }

    /// Count pets, optionally only those linked to `trait_id`.
    pub async fn count(pool: &PgPool, trait_id: Option<DbId>) -> Result<i64, sqlx::Error> {
        match trait_id {
            Some(trait_id) => {
                sqlx::query_scalar::<_, i64>(
                    "SELECT COUNT(*) FROM pet_traits WHERE trait_id = $1",
                )
                .bind(trait_id)
                .fetch_one(pool)
                .await
            }
            None => {
                sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM pets")
                    .fetch_one(pool)
                    .await
            }
        }
    }

    /// List one page of pets ordered by ID, optionally only those linked to
    /// `trait_id`.
    pub async fn list(
        pool: &PgPool,
        trait_id: Option<DbId>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Pet>, sqlx::Error> {
        match trait_id {
            Some(trait_id) => {
                let query = format!(
                    "SELECT {PREFIXED_COLUMNS} \
                     FROM pets p \
                     JOIN pet_traits pt ON pt.pet_id = p.id \
                     WHERE pt.trait_id = $1 \
                     ORDER BY p.id \
                     LIMIT $2 OFFSET $3"
                );
                sqlx::query_as::<_, Pet>(&query)
                    .bind(trait_id)
                    .bind(limit)
                    .bind(offset)
                    .fetch_all(pool)
                    .await
            }
            None => {
                let query = format!("SELECT {COLUMNS} FROM pets ORDER BY id LIMIT $1 OFFSET $2");
                sqlx::query_as::<_, Pet>(&query)
                    .bind(limit)
                    .bind(offset)
                    .fetch_all(pool)
                    .await
            }
        }
    }

    /// Resolve groups and traits for a batch of pets, preserving input order.
    ///
    /// Issues one query for groups and one for traits regardless of batch size.
    pub async fn hydrate(pool: &PgPool, pets: Vec<Pet>) -> Result<Vec<PetDetail>, sqlx::Error> {
        if pets.is_empty() {
            return Ok(Vec::new());
        }

        let pet_ids: Vec<DbId> = pets.iter().map(|p| p.id).collect();
        let group_ids: Vec<DbId> = pets
            .iter()
            .map(|p| p.group_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();

        let groups: HashMap<DbId, Group> = GroupRepo::find_by_ids(pool, &group_ids)
            .await?
            .into_iter()
            .map(|g| (g.id, g))
            .collect();

        let mut traits_by_pet: HashMap<DbId, Vec<Trait>> = HashMap::new();
        for link in TraitRepo::list_for_pets(pool, &pet_ids).await? {
            traits_by_pet
                .entry(link.pet_id)
                .or_default()
                .push(link.trait_row);
        }

        pets.into_iter()
            .map(|pet| -> Result<PetDetail, sqlx::Error> {
                let group = groups
                    .get(&pet.group_id)
                    .cloned()
                    .ok_or(sqlx::Error::RowNotFound)?;
                let traits = traits_by_pet.remove(&pet.id).unwrap_or_default();
                Ok(PetDetail::new(pet, group, traits))
            })
            .collect()
    }

    /// Apply a partial update in one transaction.
    ///
    /// Scalar fields overwrite when present. A present `group` is resolved
    /// through get-or-create and replaces the pet's group. A present
    /// `traits` list replaces every existing link.
    ///
    /// Returns `None` if no pet with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdatePet,
    ) -> Result<Option<PetDetail>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let lock_query = format!("SELECT {COLUMNS} FROM pets WHERE id = $1 FOR UPDATE");
        let existing = sqlx::query_as::<_, Pet>(&lock_query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        if existing.is_none() {
            return Ok(None);
        }

        let group_id = match &input.group {
            Some(group) => Some(GroupRepo::find_or_create_inner(&mut tx, group).await?.id),
            None => None,
        };

        let update_query = format!(
            "UPDATE pets SET \
                name = COALESCE($2, name), \
                age = COALESCE($3, age), \
                weight = COALESCE($4, weight), \
                sex = COALESCE($5, sex), \
                group_id = COALESCE($6, group_id) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Pet>(&update_query)
            .bind(id)
            .bind(&input.name)
            .bind(input.age)
            .bind(input.weight)
            .bind(&input.sex)
            .bind(group_id)
            .fetch_one(&mut *tx)
            .await?;

        if let Some(traits) = &input.traits {
            sqlx::query("DELETE FROM pet_traits WHERE pet_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            Self::link_traits_inner(&mut tx, id, traits).await?;
        }

        tx.commit().await?;
        Self::find_detail(pool, id).await
    }

    /// Delete a pet by ID. Its trait links cascade; groups and traits stay.
    ///
    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM pets WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    /// Get-or-create each trait and link it to the pet within an existing
    /// transaction. Returns the distinct linked traits in input order.
    async fn link_traits_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        pet_id: DbId,
        traits: &[NewTrait],
    ) -> Result<Vec<Trait>, sqlx::Error> {
        let mut linked: Vec<Trait> = Vec::with_capacity(traits.len());

        for input in traits {
            let item = TraitRepo::find_or_create_inner(tx, input).await?;
            if linked.iter().any(|t| t.id == item.id) {
                continue;
            }

            sqlx::query(
                "INSERT INTO pet_traits (pet_id, trait_id) VALUES ($1, $2) \
                 ON CONFLICT DO NOTHING",
            )
            .bind(pet_id)
            .bind(item.id)
            .execute(&mut **tx)
            .await?;

            linked.push(item);
        }

        Ok(linked)
    }
}
