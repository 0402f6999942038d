use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// SeaORM entity for the `reviews` table. Only read and aggregated here.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reviews")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub reviewer_id: i32,
    pub reviewed_id: i32,
    pub rating: i32,
    #[sea_orm(column_type = "Text", nullable)]
    pub comment: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::ReviewerId",
        to = "super::users::Column::Id"
    )]
    Reviewer,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reviewer.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// ── DTOs ──

/// Average rating and number of reviews for one user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RatingSummary {
    pub average: f64,
    pub count: u64,
}

impl RatingSummary {
    pub fn from_ratings(ratings: &[i32]) -> Self {
        if ratings.is_empty() {
            return Self::default();
        }
        let total: i64 = ratings.iter().map(|r| i64::from(*r)).sum();
        Self {
            average: total as f64 / ratings.len() as f64,
            count: ratings.len() as u64,
        }
    }
}

/// A review with the reviewer's display name, newest first on profile pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewView {
    pub id: i32,
    pub rating: i32,
    pub comment: Option<String>,
    pub reviewer_name: Option<String>,
    pub created_at: DateTimeUtc,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_of_no_reviews_is_zero() {
        assert_eq!(RatingSummary::from_ratings(&[]), RatingSummary::default());
    }

    #[test]
    fn summary_averages_ratings() {
        let s = RatingSummary::from_ratings(&[5, 4, 3]);
        assert_eq!(s.count, 3);
        assert!((s.average - 4.0).abs() < f64::EPSILON);
    }
}
