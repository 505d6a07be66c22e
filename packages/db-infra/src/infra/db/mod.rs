pub mod core;

pub use core::{
    bootstrap_db, build_admin_pool, orchestrate_migration, orchestrate_migration_internal,
};
