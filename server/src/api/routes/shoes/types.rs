//! Shoe API types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::data::types::ShoeWithMileage;
use crate::utils::time::ts_to_datetime;

/// Shoe DTO with derived total mileage
#[derive(Debug, Serialize, ToSchema)]
pub struct ShoeDto {
    pub id: String,
    pub name: String,
    pub brand: Option<String>,
    pub base_distance_km: f64,
    /// base distance plus the sum of logged-run distances; recomputed on
    /// every read
    pub total_distance_km: f64,
    pub retired: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ShoeWithMileage> for ShoeDto {
    fn from(row: ShoeWithMileage) -> Self {
        Self {
            id: row.shoe.id,
            name: row.shoe.name,
            brand: row.shoe.brand,
            base_distance_km: row.shoe.base_distance_km,
            total_distance_km: row.total_distance_km,
            retired: row.shoe.retired,
            created_at: ts_to_datetime(row.shoe.created_at),
            updated_at: ts_to_datetime(row.shoe.updated_at),
        }
    }
}

/// Request body for adding a shoe
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateShoeRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    #[validate(length(max = 100, message = "Brand must be at most 100 characters"))]
    pub brand: Option<String>,

    #[validate(range(min = 0.0, max = 10000.0, message = "Base distance must be 0-10000 km"))]
    #[serde(default)]
    pub base_distance_km: f64,
}

/// Request body for updating a shoe
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateShoeRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,

    #[validate(length(max = 100, message = "Brand must be at most 100 characters"))]
    pub brand: Option<String>,

    pub retired: Option<bool>,
}
