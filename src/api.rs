// This file contains the records exchanged with the catalog API
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A food, as returned by the catalog
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Food {
    /// Unique ID, given by the server
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Unit price, sent as a JSON number
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(default)]
    pub image_url: String,
    /// Optional add-ons. Some foods don't have the field at all
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extras: Option<Vec<Extra>>,
    /// Any other field sent by the server (category, thumbnail_url...), kept as-is
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

/// An extra that can be added to a food
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Extra {
    pub id: u32,
    pub name: String,
    /// Price of one unit of this extra
    #[serde(with = "rust_decimal::serde::float")]
    pub value: Decimal,
    /// Number of units selected. Absent in catalog responses
    #[serde(default)]
    pub quantity: u32,
}

/// An entry of the favorites list.
///
/// Only the id is guaranteed to be there, the rest of the food record is carried along.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Favorite {
    pub id: u32,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// Body of new order request
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct NewOrder {
    /// Id of the ordered food
    pub product_id: u32,
    pub name: String,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub image_url: String,
    /// Display string of the unit price, as shown when the order was placed
    #[serde(default)]
    pub formatted_price: String,
    /// Number of units of the food
    #[serde(default = "one")]
    pub quantity: u32,
    /// All the extras of the food, with the selected quantities
    #[serde(default)]
    pub extras: Vec<Extra>,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

/// A stored order, as returned by the API
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Order {
    /// Unique ID, given by the server on creation
    pub id: u32,
    #[serde(flatten)]
    pub order: NewOrder,
}

fn one() -> u32 {
    1
}

/// Keys owned by the typed fields of `NewOrder`, never copied from a food's attributes
pub const ORDER_RESERVED_KEYS: &[&str] = &[
    "id",
    "product_id",
    "name",
    "description",
    "price",
    "image_url",
    "formatted_price",
    "quantity",
    "extras",
];
