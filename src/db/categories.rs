use sea_orm::*;

use crate::models::categories;

/// Every category, grouped by label and then by name.
pub async fn get_all_categories(db: &DatabaseConnection) -> Result<Vec<categories::Model>, DbErr> {
    categories::Entity::find()
        .order_by_asc(categories::Column::GroupLabel)
        .order_by_asc(categories::Column::Name)
        .all(db)
        .await
}
