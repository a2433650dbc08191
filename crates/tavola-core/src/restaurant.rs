//! Records served by the backend's restaurant endpoints.
//!
//! Field names follow the backend's camelCase JSON. Most fields default when
//! missing, the listing, detail and admin endpoints each return a slightly
//! different subset.

use serde::{Deserialize, Serialize};

use crate::serde_util::{null_as_default, string_or_number};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub cuisine: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub address: Address,
    #[serde(default, deserialize_with = "null_as_default")]
    pub location: GeoPoint,
    #[serde(default, deserialize_with = "null_as_default")]
    pub rating: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub rating_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub opening_hours: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub images: Vec<String>,
    /// The admin endpoint calls this `isOpened`.
    #[serde(default, alias = "isOpened", deserialize_with = "null_as_default")]
    pub opened: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub contact_information: ContactInformation,
    #[serde(default)]
    pub manager: Option<Manager>,
}

impl Restaurant {
    pub fn status_label(&self) -> &'static str {
        if self.opened { "Open" } else { "Closed" }
    }

    /// `4.5 (12 reviews)`
    pub fn rating_summary(&self) -> String {
        format!("{:.1} ({} reviews)", self.rating, self.rating_count)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(default, deserialize_with = "null_as_default")]
    pub street: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub city: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub state: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub country: String,
    #[serde(default, alias = "pincode", deserialize_with = "string_or_number")]
    pub zip_code: String,
}

impl Address {
    /// Non-empty parts joined with `, `.
    pub fn one_line(&self) -> String {
        [
            self.street.as_str(),
            self.city.as_str(),
            self.state.as_str(),
            self.country.as_str(),
            self.zip_code.as_str(),
        ]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
    }

    /// `City, Country` as shown on listing cards.
    pub fn city_country(&self) -> String {
        format!("{}, {}", self.city, self.country)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactInformation {
    #[serde(default, deserialize_with = "string_or_number")]
    pub phone_number: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
}

/// GeoJSON point, `coordinates` are `[longitude, latitude]`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub coordinates: Vec<f64>,
}

impl GeoPoint {
    pub fn coordinates_label(&self) -> String {
        self.coordinates
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manager {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub phone: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub role: String,
}

/// A menu entry as returned by `api/restaurant/menu/{id}`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dish {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_veg: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub kcal: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub price: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_available: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckoutRestaurant {
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub slug: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckoutItem {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub quantity: u32,
}

impl CheckoutItem {
    pub fn line_total(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckoutData {
    pub restaurant: CheckoutRestaurant,
    #[serde(default, deserialize_with = "null_as_default")]
    pub items: Vec<CheckoutItem>,
    pub total: f64,
}

/// Format an amount the way every page shows prices.
pub fn format_price(amount: f64) -> String {
    format!("${amount:.2}")
}
