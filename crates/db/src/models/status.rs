//! Closed tag sets backed by PostgreSQL `ENUM` types.
//!
//! Each enum maps one-to-one onto the type created in
//! `20261001000002_create_enum_types.sql`. Any tag may follow any other;
//! sequencing belongs to the caller.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use taskforge_core::error::CoreError;

macro_rules! define_tag_enum {
    (
        $(#[$meta:meta])*
        $name:ident as $pg_type:literal {
            $( $(#[$vmeta:meta])* $variant:ident = $tag:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
        #[sqlx(type_name = $pg_type, rename_all = "snake_case")]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            /// Every tag, in declaration order.
            pub const ALL: &'static [$name] = &[$( $name::$variant ),+];

            /// The stored tag.
            pub fn as_str(self) -> &'static str {
                match self {
                    $( $name::$variant => $tag ),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $tag => Ok($name::$variant), )+
                    other => Err(CoreError::Validation(format!(
                        concat!("unknown ", $pg_type, ": {}"),
                        other
                    ))),
                }
            }
        }
    };
}

define_tag_enum! {
    /// Project lifecycle status.
    #[derive(Default)]
    ProjectStatus as "project_status" {
        #[default]
        Active = "active",
        Completed = "completed",
        Archived = "archived",
    }
}

define_tag_enum! {
    /// Task workflow status.
    #[derive(Default)]
    TaskStatus as "task_status" {
        #[default]
        Todo = "todo",
        InProgress = "in_progress",
        Review = "review",
        Completed = "completed",
    }
}

define_tag_enum! {
    /// Task priority.
    #[derive(Default)]
    TaskPriority as "task_priority" {
        Low = "low",
        #[default]
        Medium = "medium",
        High = "high",
    }
}

define_tag_enum! {
    /// Category of a notification.
    NotificationType as "notification_type" {
        Task = "task",
        Project = "project",
        Team = "team",
        System = "system",
    }
}
