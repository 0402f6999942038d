use sea_orm::*;
use std::collections::HashMap;

use crate::models::reviews::{self, RatingSummary, ReviewView};
use crate::models::users;

/// Rating aggregates for many users in one query.
pub async fn rating_summaries(
    db: &DatabaseConnection,
    user_ids: Vec<i32>,
) -> Result<HashMap<i32, RatingSummary>, DbErr> {
    if user_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = reviews::Entity::find()
        .filter(reviews::Column::ReviewedId.is_in(user_ids))
        .all(db)
        .await?;

    let mut ratings: HashMap<i32, Vec<i32>> = HashMap::new();
    for review in rows {
        ratings.entry(review.reviewed_id).or_default().push(review.rating);
    }

    Ok(ratings
        .into_iter()
        .map(|(id, r)| (id, RatingSummary::from_ratings(&r)))
        .collect())
}

/// Latest reviews received by a user, with the reviewer's name.
pub async fn latest_reviews(
    db: &DatabaseConnection,
    user_id: i32,
    limit: u64,
) -> Result<Vec<ReviewView>, DbErr> {
    let rows = reviews::Entity::find()
        .filter(reviews::Column::ReviewedId.eq(user_id))
        .order_by_desc(reviews::Column::CreatedAt)
        .limit(limit)
        .find_also_related(users::Entity)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(review, reviewer)| ReviewView {
            id: review.id,
            rating: review.rating,
            comment: review.comment,
            reviewer_name: reviewer.map(|u| u.name),
            created_at: review.created_at,
        })
        .collect())
}
