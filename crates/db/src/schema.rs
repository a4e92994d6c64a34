//! Schema registry.
//!
//! A static table of [`EntityDef`]s describes every entity: its table,
//! lifecycle (soft or hard delete), unique and indexed columns, and the
//! association graph with its foreign-key actions. [`SchemaRegistry::declare`]
//! pairs each definition with the pool and hands out one [`EntityHandle`] per
//! entity for downstream query code.
//!
//! The SQL migrations under `db/migrations` are the physical layout; the
//! definitions here must agree with them (see `tests/schema_conventions.rs`).

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use taskforge_core::error::CoreError;
use taskforge_core::types::DbId;

use crate::{cascade, DbPool};

// ---------------------------------------------------------------------------
// Entity names
// ---------------------------------------------------------------------------

/// Name of a registered entity. Discriminants index into [`definitions`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum EntityName {
    User = 0,
    Team = 1,
    Project = 2,
    Task = 3,
    TimeEntry = 4,
    Notification = 5,
    Comment = 6,
    Role = 7,
    Permission = 8,
    UserRole = 9,
    RolePermission = 10,
}

impl EntityName {
    /// Every entity, in declaration order.
    pub const ALL: [EntityName; 11] = [
        EntityName::User,
        EntityName::Team,
        EntityName::Project,
        EntityName::Task,
        EntityName::TimeEntry,
        EntityName::Notification,
        EntityName::Comment,
        EntityName::Role,
        EntityName::Permission,
        EntityName::UserRole,
        EntityName::RolePermission,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EntityName::User => "User",
            EntityName::Team => "Team",
            EntityName::Project => "Project",
            EntityName::Task => "Task",
            EntityName::TimeEntry => "TimeEntry",
            EntityName::Notification => "Notification",
            EntityName::Comment => "Comment",
            EntityName::Role => "Role",
            EntityName::Permission => "Permission",
            EntityName::UserRole => "UserRole",
            EntityName::RolePermission => "RolePermission",
        }
    }
}

impl fmt::Display for EntityName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityName {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityName::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| CoreError::Validation(format!("unknown entity: {s}")))
    }
}

// ---------------------------------------------------------------------------
// Definitions
// ---------------------------------------------------------------------------

/// What a delete does to a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Delete sets `deleted_at`; all default queries exclude the row.
    SoftDelete,
    /// Delete removes the row.
    HardDelete,
}

/// Referential action on a foreign key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FkAction {
    Cascade,
    SetNull,
    NoAction,
}

impl FkAction {
    /// Spelling used by `information_schema.referential_constraints`.
    pub fn as_sql(self) -> &'static str {
        match self {
            FkAction::Cascade => "CASCADE",
            FkAction::SetNull => "SET NULL",
            FkAction::NoAction => "NO ACTION",
        }
    }
}

/// Join storage of a many-to-many association.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Through {
    /// A registered junction entity.
    Entity(EntityName),
    /// A bare link table that is not itself a registered entity.
    Table(&'static str),
}

impl Through {
    pub fn table(self) -> &'static str {
        match self {
            Through::Entity(name) => definition(name).table,
            Through::Table(table) => table,
        }
    }
}

/// One edge of the association graph, seen from the owning entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Association {
    /// `target.foreign_key` references this entity.
    HasMany {
        target: EntityName,
        foreign_key: &'static str,
        on_delete: FkAction,
        on_update: FkAction,
    },
    /// This entity's `foreign_key` references `target`. `enforced` is false
    /// when no database constraint backs the column.
    BelongsTo {
        target: EntityName,
        foreign_key: &'static str,
        alias: Option<&'static str>,
        enforced: bool,
    },
    /// Link rows in `through` pair `foreign_key` (this entity) with
    /// `other_key` (the target).
    BelongsToMany {
        target: EntityName,
        through: Through,
        foreign_key: &'static str,
        other_key: &'static str,
        on_delete: FkAction,
    },
    /// `target.foreign_key` references this entity only when the target's
    /// `scope` column equals `scope`. Never backed by a constraint.
    ScopedHasMany {
        target: EntityName,
        foreign_key: &'static str,
        scope: &'static str,
    },
}

/// Static description of one entity.
#[derive(Debug)]
pub struct EntityDef {
    pub name: EntityName,
    pub table: &'static str,
    pub lifecycle: Lifecycle,
    /// Columns unique among live rows.
    pub unique: &'static [&'static str],
    /// Plain b-tree indexes, each given as its key columns in order.
    pub indexed: &'static [&'static [&'static str]],
    pub associations: &'static [Association],
}

impl EntityDef {
    pub fn is_soft_delete(&self) -> bool {
        self.lifecycle == Lifecycle::SoftDelete
    }
}

use Association::{BelongsTo, BelongsToMany, HasMany, ScopedHasMany};
use FkAction::{Cascade, SetNull};

static ENTITIES: [EntityDef; 11] = [
    EntityDef {
        name: EntityName::User,
        table: "users",
        lifecycle: Lifecycle::SoftDelete,
        unique: &["email"],
        indexed: &[&["is_active"]],
        associations: &[
            BelongsToMany {
                target: EntityName::Team,
                through: Through::Table("user_teams"),
                foreign_key: "user_id",
                other_key: "team_id",
                on_delete: Cascade,
            },
            HasMany {
                target: EntityName::Task,
                foreign_key: "assignee_id",
                on_delete: SetNull,
                on_update: Cascade,
            },
            HasMany {
                target: EntityName::TimeEntry,
                foreign_key: "user_id",
                on_delete: Cascade,
                on_update: Cascade,
            },
            HasMany {
                target: EntityName::Notification,
                foreign_key: "user_id",
                on_delete: Cascade,
                on_update: Cascade,
            },
            HasMany {
                target: EntityName::Comment,
                foreign_key: "user_id",
                on_delete: Cascade,
                on_update: Cascade,
            },
            BelongsToMany {
                target: EntityName::Role,
                through: Through::Entity(EntityName::UserRole),
                foreign_key: "user_id",
                other_key: "role_id",
                on_delete: Cascade,
            },
        ],
    },
    EntityDef {
        name: EntityName::Team,
        table: "teams",
        lifecycle: Lifecycle::SoftDelete,
        unique: &[],
        indexed: &[],
        associations: &[
            BelongsToMany {
                target: EntityName::User,
                through: Through::Table("user_teams"),
                foreign_key: "team_id",
                other_key: "user_id",
                on_delete: Cascade,
            },
            HasMany {
                target: EntityName::Project,
                foreign_key: "team_id",
                on_delete: Cascade,
                on_update: Cascade,
            },
            ScopedHasMany {
                target: EntityName::UserRole,
                foreign_key: "resource_id",
                scope: "team",
            },
        ],
    },
    EntityDef {
        name: EntityName::Project,
        table: "projects",
        lifecycle: Lifecycle::SoftDelete,
        unique: &[],
        indexed: &[&["team_id"], &["status"], &["start_date"]],
        associations: &[
            BelongsTo {
                target: EntityName::Team,
                foreign_key: "team_id",
                alias: None,
                enforced: true,
            },
            HasMany {
                target: EntityName::Task,
                foreign_key: "project_id",
                on_delete: Cascade,
                on_update: Cascade,
            },
            ScopedHasMany {
                target: EntityName::UserRole,
                foreign_key: "resource_id",
                scope: "project",
            },
        ],
    },
    EntityDef {
        name: EntityName::Task,
        table: "tasks",
        lifecycle: Lifecycle::SoftDelete,
        unique: &[],
        indexed: &[
            &["project_id"],
            &["assignee_id"],
            &["status"],
            &["priority"],
            &["due_date"],
        ],
        associations: &[
            BelongsTo {
                target: EntityName::Project,
                foreign_key: "project_id",
                alias: None,
                enforced: true,
            },
            BelongsTo {
                target: EntityName::User,
                foreign_key: "assignee_id",
                alias: Some("assignee"),
                enforced: true,
            },
            HasMany {
                target: EntityName::TimeEntry,
                foreign_key: "task_id",
                on_delete: Cascade,
                on_update: Cascade,
            },
            HasMany {
                target: EntityName::Comment,
                foreign_key: "task_id",
                on_delete: Cascade,
                on_update: Cascade,
            },
        ],
    },
    EntityDef {
        name: EntityName::TimeEntry,
        table: "time_entries",
        lifecycle: Lifecycle::SoftDelete,
        unique: &[],
        indexed: &[&["user_id"], &["task_id"], &["start_time"]],
        associations: &[
            BelongsTo {
                target: EntityName::User,
                foreign_key: "user_id",
                alias: None,
                enforced: true,
            },
            BelongsTo {
                target: EntityName::Task,
                foreign_key: "task_id",
                alias: None,
                enforced: true,
            },
        ],
    },
    EntityDef {
        name: EntityName::Notification,
        table: "notifications",
        lifecycle: Lifecycle::HardDelete,
        unique: &[],
        indexed: &[&["user_id"], &["is_read"], &["type"]],
        associations: &[BelongsTo {
            target: EntityName::User,
            foreign_key: "user_id",
            alias: None,
            enforced: true,
        }],
    },
    EntityDef {
        name: EntityName::Comment,
        table: "comments",
        lifecycle: Lifecycle::SoftDelete,
        unique: &[],
        indexed: &[&["user_id"], &["task_id"]],
        associations: &[
            BelongsTo {
                target: EntityName::User,
                foreign_key: "user_id",
                alias: None,
                enforced: true,
            },
            BelongsTo {
                target: EntityName::Task,
                foreign_key: "task_id",
                alias: None,
                enforced: true,
            },
        ],
    },
    EntityDef {
        name: EntityName::Role,
        table: "roles",
        lifecycle: Lifecycle::SoftDelete,
        unique: &["name"],
        indexed: &[],
        associations: &[
            BelongsToMany {
                target: EntityName::Permission,
                through: Through::Entity(EntityName::RolePermission),
                foreign_key: "role_id",
                other_key: "permission_id",
                on_delete: Cascade,
            },
            BelongsToMany {
                target: EntityName::User,
                through: Through::Entity(EntityName::UserRole),
                foreign_key: "role_id",
                other_key: "user_id",
                on_delete: Cascade,
            },
        ],
    },
    EntityDef {
        name: EntityName::Permission,
        table: "permissions",
        lifecycle: Lifecycle::SoftDelete,
        unique: &["name"],
        indexed: &[],
        associations: &[BelongsToMany {
            target: EntityName::Role,
            through: Through::Entity(EntityName::RolePermission),
            foreign_key: "permission_id",
            other_key: "role_id",
            on_delete: Cascade,
        }],
    },
    EntityDef {
        name: EntityName::UserRole,
        table: "user_roles",
        lifecycle: Lifecycle::HardDelete,
        unique: &[],
        indexed: &[&["user_id"], &["role_id"], &["scope", "resource_id"]],
        associations: &[
            BelongsTo {
                target: EntityName::User,
                foreign_key: "user_id",
                alias: None,
                enforced: true,
            },
            BelongsTo {
                target: EntityName::Role,
                foreign_key: "role_id",
                alias: None,
                enforced: true,
            },
            BelongsTo {
                target: EntityName::Team,
                foreign_key: "resource_id",
                alias: None,
                enforced: false,
            },
            BelongsTo {
                target: EntityName::Project,
                foreign_key: "resource_id",
                alias: None,
                enforced: false,
            },
        ],
    },
    EntityDef {
        name: EntityName::RolePermission,
        table: "role_permissions",
        lifecycle: Lifecycle::HardDelete,
        unique: &[],
        indexed: &[&["role_id"], &["permission_id"]],
        associations: &[
            BelongsTo {
                target: EntityName::Role,
                foreign_key: "role_id",
                alias: None,
                enforced: true,
            },
            BelongsTo {
                target: EntityName::Permission,
                foreign_key: "permission_id",
                alias: None,
                enforced: true,
            },
        ],
    },
];

/// All entity definitions, in [`EntityName::ALL`] order.
pub fn definitions() -> &'static [EntityDef] {
    &ENTITIES
}

/// Definition of a single entity.
pub fn definition(name: EntityName) -> &'static EntityDef {
    &ENTITIES[name as usize]
}

/// Link tables that back a many-to-many association without being
/// registered entities themselves.
pub fn link_tables() -> Vec<&'static str> {
    let mut tables: Vec<&'static str> = ENTITIES
        .iter()
        .flat_map(|def| def.associations.iter())
        .filter_map(|assoc| match assoc {
            BelongsToMany {
                through: Through::Table(table),
                ..
            } => Some(*table),
            _ => None,
        })
        .collect();
    tables.sort_unstable();
    tables.dedup();
    tables
}

// ---------------------------------------------------------------------------
// Handles
// ---------------------------------------------------------------------------

/// A declared entity bound to the pool.
///
/// Typed CRUD lives in [`crate::repositories`]; the handle offers the
/// operations every entity shares, honouring its lifecycle.
#[derive(Debug, Clone)]
pub struct EntityHandle {
    def: &'static EntityDef,
    pool: DbPool,
}

impl EntityHandle {
    pub fn name(&self) -> EntityName {
        self.def.name
    }

    pub fn table(&self) -> &'static str {
        self.def.table
    }

    pub fn definition(&self) -> &'static EntityDef {
        self.def
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// Whether a live row with `id` exists.
    pub async fn exists(&self, id: DbId) -> Result<bool, sqlx::Error> {
        let query = format!(
            "SELECT EXISTS (SELECT 1 FROM {} WHERE id = $1{})",
            self.def.table,
            live_filter(self.def, " AND ")
        );
        sqlx::query_scalar(&query)
            .bind(id)
            .fetch_one(&self.pool)
            .await
    }

    /// Number of live rows.
    pub async fn count(&self) -> Result<i64, sqlx::Error> {
        let query = format!(
            "SELECT COUNT(*) FROM {}{}",
            self.def.table,
            live_filter(self.def, " WHERE ")
        );
        sqlx::query_scalar(&query).fetch_one(&self.pool).await
    }

    /// Delete according to the entity's lifecycle: soft delete with
    /// application-level cascade, or hard delete.
    pub async fn delete(&self, id: DbId) -> Result<bool, sqlx::Error> {
        cascade::delete(&self.pool, self.def.name, id).await
    }

    /// Clear `deleted_at`. Always `false` for hard-delete entities.
    pub async fn restore(&self, id: DbId) -> Result<bool, sqlx::Error> {
        cascade::restore(&self.pool, self.def.name, id).await
    }

    /// Remove the row permanently; storage foreign-key actions apply.
    pub async fn purge(&self, id: DbId) -> Result<bool, sqlx::Error> {
        cascade::purge(&self.pool, self.def.name, id).await
    }
}

fn live_filter(def: &EntityDef, joiner: &str) -> String {
    if def.is_soft_delete() {
        format!("{joiner}deleted_at IS NULL")
    } else {
        String::new()
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Mapping from entity name to its handle.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    handles: BTreeMap<EntityName, EntityHandle>,
}

impl SchemaRegistry {
    /// Declare every entity against `pool`.
    ///
    /// Performs no I/O and cannot fail; calling it again yields an
    /// equivalent registry.
    pub fn declare(pool: &DbPool) -> Self {
        let handles: BTreeMap<EntityName, EntityHandle> = definitions()
            .iter()
            .map(|def| {
                (
                    def.name,
                    EntityHandle {
                        def,
                        pool: pool.clone(),
                    },
                )
            })
            .collect();
        tracing::debug!(entities = handles.len(), "Schema registry declared");
        Self { handles }
    }

    /// Handle for `name`. Every [`EntityName`] is present after `declare`.
    pub fn get(&self, name: EntityName) -> &EntityHandle {
        &self.handles[&name]
    }

    /// Handle by entity name string (e.g. `"TimeEntry"`).
    pub fn lookup(&self, name: &str) -> Option<&EntityHandle> {
        name.parse::<EntityName>()
            .ok()
            .and_then(|name| self.handles.get(&name))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&EntityName, &EntityHandle)> {
        self.handles.iter()
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Declared tables (entities plus link tables) absent from the
    /// `public` schema.
    pub async fn missing_tables(&self) -> Result<Vec<&'static str>, sqlx::Error> {
        let existing: Vec<String> = sqlx::query_scalar(
            "SELECT table_name::text FROM information_schema.tables
             WHERE table_schema = 'public' AND table_type = 'BASE TABLE'",
        )
        .fetch_all(self.pool())
        .await?;

        let declared = self
            .handles
            .values()
            .map(|handle| handle.table())
            .chain(link_tables());
        Ok(declared
            .filter(|table| !existing.iter().any(|t| t == table))
            .collect())
    }

    fn pool(&self) -> &DbPool {
        // Every handle shares the pool passed to `declare`.
        self.get(EntityName::User).pool()
    }
}
