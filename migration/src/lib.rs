pub use sea_orm_migration::prelude::*;

mod m20220101_000001_create_table;
mod m20250107_000001_add_created_at_indexes;
mod m20250301_000001_add_insertion_seq;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20220101_000001_create_table::Migration),
            Box::new(m20250107_000001_add_created_at_indexes::Migration),
            Box::new(m20250301_000001_add_insertion_seq::Migration),
        ]
    }
}
