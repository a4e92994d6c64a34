//! Application-level delete policy.
//!
//! Storage foreign-key actions only fire when a row is physically removed.
//! Soft deletes therefore walk the registry's association graph themselves,
//! inside one transaction:
//!
//! - `HasMany` + CASCADE: soft-delete live children of soft-delete entities
//!   (recursively), remove children of hard-delete entities.
//! - `HasMany` + SET NULL: clear the child's foreign key.
//! - `BelongsToMany`: remove the link rows.
//! - `ScopedHasMany`: untouched; the polymorphic link has no constraint.

use sqlx::{PgPool, Postgres, Transaction};
use taskforge_core::types::DbId;

use crate::schema::{definition, Association, EntityDef, EntityName, FkAction, Lifecycle};

/// Delete a row according to its entity's lifecycle.
///
/// Returns `true` if a live row was deleted.
pub async fn delete(pool: &PgPool, entity: EntityName, id: DbId) -> Result<bool, sqlx::Error> {
    match definition(entity).lifecycle {
        Lifecycle::SoftDelete => soft_delete(pool, entity, id).await,
        Lifecycle::HardDelete => purge(pool, entity, id).await,
    }
}

/// Soft-delete a row and apply the delete policy to its dependents.
///
/// Returns `false` (and changes nothing) if no live row matched. For
/// hard-delete entities this is equivalent to [`purge`].
pub async fn soft_delete(pool: &PgPool, entity: EntityName, id: DbId) -> Result<bool, sqlx::Error> {
    let def = definition(entity);
    if !def.is_soft_delete() {
        return purge(pool, entity, id).await;
    }

    let mut tx = pool.begin().await?;

    let query = format!(
        "UPDATE {} SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        def.table
    );
    let result = sqlx::query(&query).bind(id).execute(&mut *tx).await?;
    if result.rows_affected() == 0 {
        return Ok(false);
    }

    let touched = apply_delete_policy(&mut tx, def, vec![id]).await?;
    tx.commit().await?;

    tracing::info!(entity = %entity, id, dependents = touched, "Soft-deleted with cascade");
    Ok(true)
}

/// Clear `deleted_at` on a single row. Dependents deleted by the cascade
/// stay deleted.
pub async fn restore(pool: &PgPool, entity: EntityName, id: DbId) -> Result<bool, sqlx::Error> {
    let def = definition(entity);
    if !def.is_soft_delete() {
        return Ok(false);
    }
    let query = format!(
        "UPDATE {} SET deleted_at = NULL WHERE id = $1 AND deleted_at IS NOT NULL",
        def.table
    );
    let result = sqlx::query(&query).bind(id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}

/// Permanently remove a row, live or soft-deleted. Storage foreign-key
/// actions handle the dependents.
pub async fn purge(pool: &PgPool, entity: EntityName, id: DbId) -> Result<bool, sqlx::Error> {
    let query = format!("DELETE FROM {} WHERE id = $1", definition(entity).table);
    let result = sqlx::query(&query).bind(id).execute(pool).await?;
    let removed = result.rows_affected() > 0;
    if removed {
        tracing::info!(entity = %entity, id, "Purged");
    }
    Ok(removed)
}

/// Walk the association graph from `root` rows, returning how many
/// dependent rows were modified.
async fn apply_delete_policy(
    tx: &mut Transaction<'_, Postgres>,
    root: &'static EntityDef,
    root_ids: Vec<DbId>,
) -> Result<u64, sqlx::Error> {
    let mut touched = 0;
    let mut pending: Vec<(&'static EntityDef, Vec<DbId>)> = vec![(root, root_ids)];

    while let Some((def, ids)) = pending.pop() {
        for assoc in def.associations {
            match *assoc {
                Association::HasMany {
                    target,
                    foreign_key,
                    on_delete,
                    ..
                } => {
                    let child = definition(target);
                    match (on_delete, child.lifecycle) {
                        (FkAction::Cascade, Lifecycle::SoftDelete) => {
                            let query = format!(
                                "UPDATE {} SET deleted_at = NOW() \
                                 WHERE {foreign_key} = ANY($1) AND deleted_at IS NULL \
                                 RETURNING id",
                                child.table
                            );
                            let child_ids: Vec<DbId> = sqlx::query_scalar(&query)
                                .bind(&ids)
                                .fetch_all(&mut **tx)
                                .await?;
                            touched += child_ids.len() as u64;
                            if !child_ids.is_empty() {
                                pending.push((child, child_ids));
                            }
                        }
                        (FkAction::Cascade, Lifecycle::HardDelete) => {
                            let query = format!(
                                "DELETE FROM {} WHERE {foreign_key} = ANY($1)",
                                child.table
                            );
                            let result = sqlx::query(&query).bind(&ids).execute(&mut **tx).await?;
                            touched += result.rows_affected();
                        }
                        (FkAction::SetNull, _) => {
                            let query = format!(
                                "UPDATE {} SET {foreign_key} = NULL WHERE {foreign_key} = ANY($1)",
                                child.table
                            );
                            let result = sqlx::query(&query).bind(&ids).execute(&mut **tx).await?;
                            touched += result.rows_affected();
                        }
                        (FkAction::NoAction, _) => {}
                    }
                }
                Association::BelongsToMany {
                    through,
                    foreign_key,
                    on_delete: FkAction::Cascade,
                    ..
                } => {
                    let query = format!(
                        "DELETE FROM {} WHERE {foreign_key} = ANY($1)",
                        through.table()
                    );
                    let result = sqlx::query(&query).bind(&ids).execute(&mut **tx).await?;
                    touched += result.rows_affected();
                }
                _ => {}
            }
        }
    }

    Ok(touched)
}
