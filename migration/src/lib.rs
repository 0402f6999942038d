pub use sea_orm_migration::prelude::*;

mod m20260302_000001_create_users_table;
mod m20260302_000002_create_categories_table;
mod m20260302_000003_create_provider_profiles_table;
mod m20260302_000004_create_provider_ads_table;
mod m20260302_000005_create_reviews_table;
mod m20260415_000001_add_geocode_tracking_to_provider_ads;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260302_000001_create_users_table::Migration),
            Box::new(m20260302_000002_create_categories_table::Migration),
            Box::new(m20260302_000003_create_provider_profiles_table::Migration),
            Box::new(m20260302_000004_create_provider_ads_table::Migration),
            Box::new(m20260302_000005_create_reviews_table::Migration),
            Box::new(m20260415_000001_add_geocode_tracking_to_provider_ads::Migration),
        ]
    }
}
