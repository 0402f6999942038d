use std::cmp::Ordering;

use crate::models::ads::{PublicAd, PublicAdsQuery};
use crate::validation::geo::Coordinates;
use crate::validation::text::{contains_normalized, normalize_text};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Recent,
    Rating,
    Distance,
}

impl SortOrder {
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(normalize_text).as_deref() {
            Some("rating" | "avaliacao") => SortOrder::Rating,
            Some("distance" | "distancia") => SortOrder::Distance,
            _ => SortOrder::Recent,
        }
    }
}

/// Listing filters applied after the page has been loaded.
#[derive(Debug, Clone, Default)]
pub struct ListingFilter {
    pub category: Option<String>,
    pub city: Option<String>,
    pub min_rating: Option<f64>,
    pub search: Option<String>,
    pub origin: Option<Coordinates>,
    pub radius_km: Option<f64>,
    pub sort: SortOrder,
}

impl From<&PublicAdsQuery> for ListingFilter {
    fn from(q: &PublicAdsQuery) -> Self {
        Self {
            category: q.category.clone().filter(|c| !c.trim().is_empty()),
            city: q.city.clone().filter(|c| !c.trim().is_empty()),
            min_rating: q.min_rating,
            search: q.search.clone().filter(|s| !s.trim().is_empty()),
            origin: Coordinates::from_parts(q.lat, q.lon),
            radius_km: q.radius_km.filter(|r| *r > 0.0),
            sort: SortOrder::parse(q.sort.as_deref()),
        }
    }
}

impl ListingFilter {
    /// Distance from the client's origin, when both ends are known.
    pub fn distance_to(&self, ad: &PublicAd) -> Option<f64> {
        let origin = self.origin?;
        let target = Coordinates::from_parts(ad.latitude, ad.longitude)?;
        Some(origin.distance_km(&target))
    }

    /// Radius rule: with an origin and a radius, a listing must be within the
    /// client's radius AND, if it declares one, within its own service radius.
    /// Listings without coordinates cannot satisfy a radius filter.
    pub fn within_reach(&self, ad: &PublicAd) -> bool {
        let (Some(_), Some(radius)) = (self.origin, self.radius_km) else {
            return true;
        };
        let Some(distance) = self.distance_to(ad) else {
            return false;
        };

        let service_ok = ad
            .service_radius_km
            .is_none_or(|service| distance <= f64::from(service));

        distance <= radius && service_ok
    }

    pub fn matches(&self, ad: &PublicAd) -> bool {
        if let Some(category) = &self.category {
            if normalize_text(&ad.category) != normalize_text(category) {
                return false;
            }
        }

        if let Some(city) = &self.city {
            if ad.city.as_deref().map(normalize_text) != Some(normalize_text(city)) {
                return false;
            }
        }

        if let Some(min) = self.min_rating {
            if ad.ratings_avg < min {
                return false;
            }
        }

        if let Some(term) = &self.search {
            let haystack = [
                ad.title.as_str(),
                ad.description.as_str(),
                ad.category.as_str(),
                ad.service_function.as_str(),
                ad.city.as_deref().unwrap_or_default(),
                ad.neighborhood.as_deref().unwrap_or_default(),
            ]
            .join(" ");
            if !contains_normalized(&haystack, term) {
                return false;
            }
        }

        self.within_reach(ad)
    }

    /// Filter, annotate with `distance_km`, and sort.
    pub fn apply(&self, ads: Vec<PublicAd>) -> Vec<PublicAd> {
        let mut kept: Vec<PublicAd> = ads
            .into_iter()
            .filter(|ad| self.matches(ad))
            .map(|mut ad| {
                ad.distance_km = self.distance_to(&ad);
                ad
            })
            .collect();

        match self.sort {
            SortOrder::Recent => kept.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            SortOrder::Rating => kept.sort_by(|a, b| {
                b.ratings_avg
                    .partial_cmp(&a.ratings_avg)
                    .unwrap_or(Ordering::Equal)
                    .then(b.ratings_count.cmp(&a.ratings_count))
            }),
            SortOrder::Distance => kept.sort_by(|a, b| match (a.distance_km, b.distance_km) {
                (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }),
        }

        kept
    }
}
