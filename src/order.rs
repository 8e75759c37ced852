//! State of an order in progress: the food being looked at, its extras, the quantities
//! picked by the user and whether the food is a favorite.
//!
//! `OrderState` holds the data and the pure operations on it. `FoodDetails` drives it
//! against a `RemoteCatalog`.

use crate::api::{Extra, Favorite, Food, NewOrder, Order, ORDER_RESERVED_KEYS};
use crate::catalog::RemoteCatalog;
use crate::errors::Error;
use crate::price::PriceFormatter;
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

/// Lifecycle of an order screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    Loading,
    /// Food loaded, quantities can be changed
    Ready,
    Submitting,
    /// Terminal
    Submitted,
    /// The food could not be fetched
    Error,
}

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("Failed to fetch from the catalog: {0}")]
    Fetch(#[source] Error),
    #[error("Failed to submit to the catalog: {0}")]
    Submit(#[source] Error),
    #[error("No food loaded")]
    NotLoaded,
    #[error("Operation not allowed in phase {0:?}")]
    InvalidPhase(Phase),
}

/// The food on display, without its extras (those belong to `OrderState`)
#[derive(Debug, Clone, PartialEq)]
pub struct FoodItem {
    pub id: u32,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub image_url: String,
    pub formatted_price: String,
    /// Fields of the catalog record this crate doesn't interpret
    pub attributes: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtraItem {
    pub id: u32,
    pub name: String,
    pub unit_value: Decimal,
    pub quantity: u32,
}

impl ExtraItem {
    /// Build an extra from the catalog, with nothing selected yet.
    ///
    /// Quantities sent by the server are ignored: the catalog lists what can be added,
    /// not what was ordered before.
    pub fn available(extra: Extra) -> Self {
        ExtraItem {
            id: extra.id,
            name: extra.name,
            unit_value: extra.value,
            quantity: 0,
        }
    }

    /// Price of the selected units, `None` if it doesn't fit in a `Decimal`
    pub fn subtotal(&self) -> Option<Decimal> {
        self.unit_value.checked_mul(Decimal::from(self.quantity))
    }

    fn to_extra(&self) -> Extra {
        Extra {
            id: self.id,
            name: self.name.clone(),
            value: self.unit_value,
            quantity: self.quantity,
        }
    }
}

/// Whether `food_id` is in the favorites list
pub fn is_favorite_in(favorites: &[Favorite], food_id: u32) -> bool {
    favorites.iter().any(|favorite| favorite.id == food_id)
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderState {
    food: Option<FoodItem>,
    extras: Vec<ExtraItem>,
    food_quantity: u32,
    is_favorite: bool,
    phase: Phase,
}

impl Default for OrderState {
    fn default() -> Self {
        OrderState {
            food: None,
            extras: Vec::new(),
            food_quantity: 1,
            is_favorite: false,
            phase: Phase::Uninitialized,
        }
    }
}

impl OrderState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh state for a food coming from the catalog, ready to be edited
    pub fn from_food(food: Food, formatter: &PriceFormatter) -> Self {
        let extras = food
            .extras
            .unwrap_or_default()
            .into_iter()
            .map(ExtraItem::available)
            .collect();

        OrderState {
            food: Some(FoodItem {
                id: food.id,
                formatted_price: formatter.format(food.price),
                name: food.name,
                description: food.description,
                price: food.price,
                image_url: food.image_url,
                attributes: food.attributes,
            }),
            extras,
            food_quantity: 1,
            is_favorite: false,
            phase: Phase::Ready,
        }
    }

    pub fn food(&self) -> Option<&FoodItem> {
        self.food.as_ref()
    }

    pub fn extras(&self) -> &[ExtraItem] {
        &self.extras
    }

    pub fn extra(&self, extra_id: u32) -> Option<&ExtraItem> {
        self.extras.iter().find(|extra| extra.id == extra_id)
    }

    pub fn food_quantity(&self) -> u32 {
        self.food_quantity
    }

    pub fn is_favorite(&self) -> bool {
        self.is_favorite
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    fn extra_mut(&mut self, extra_id: u32) -> Option<&mut ExtraItem> {
        if self.phase != Phase::Ready {
            return None;
        }
        self.extras.iter_mut().find(|extra| extra.id == extra_id)
    }

    /// Add one unit of an extra. Unknown ids are ignored.
    ///
    /// Returns whether anything changed. This holds for every mutation below, all of
    /// which are no-ops outside of `Phase::Ready`. Increments that would push the total
    /// out of `Decimal` range are refused.
    pub fn increment_extra(&mut self, extra_id: u32) -> bool {
        if self
            .checked_total_for(self.food_quantity, Some(extra_id))
            .is_none()
        {
            return false;
        }
        match self.extra_mut(extra_id) {
            Some(extra) => {
                extra.quantity += 1;
                true
            }
            None => false,
        }
    }

    /// Remove one unit of an extra, never going below 0
    pub fn decrement_extra(&mut self, extra_id: u32) -> bool {
        match self.extra_mut(extra_id) {
            Some(extra) if extra.quantity > 0 => {
                extra.quantity -= 1;
                true
            }
            _ => false,
        }
    }

    pub fn increment_food(&mut self) -> bool {
        if self.phase != Phase::Ready {
            return false;
        }
        let Some(quantity) = self.food_quantity.checked_add(1) else {
            return false;
        };
        if self.checked_total_for(quantity, None).is_none() {
            return false;
        }
        self.food_quantity = quantity;
        true
    }

    /// Remove one unit of the food, never going below 1
    pub fn decrement_food(&mut self) -> bool {
        if self.phase != Phase::Ready || self.food_quantity <= 1 {
            return false;
        }
        self.food_quantity -= 1;
        true
    }

    /// Total for the given food quantity, with one more unit of `bumped_extra` if set.
    ///
    /// `None` when the amount overflows.
    fn checked_total_for(
        &self,
        food_quantity: u32,
        bumped_extra: Option<u32>,
    ) -> Option<Decimal> {
        let Some(food) = &self.food else {
            return Some(Decimal::ZERO);
        };
        let mut sum = food.price;
        for extra in &self.extras {
            let subtotal = if bumped_extra == Some(extra.id) {
                ExtraItem {
                    quantity: extra.quantity.checked_add(1)?,
                    ..extra.clone()
                }
                .subtotal()?
            } else {
                extra.subtotal()?
            };
            sum = sum.checked_add(subtotal)?;
        }
        sum.checked_mul(Decimal::from(food_quantity))
    }

    /// `(price + Σ extra quantity × unit value) × food quantity`, 0 with no food.
    ///
    /// `None` when the amount doesn't fit in a `Decimal`.
    pub fn checked_total(&self) -> Option<Decimal> {
        self.checked_total_for(self.food_quantity, None)
    }

    /// Same as `checked_total`, saturating at `Decimal::MAX`
    pub fn total(&self) -> Decimal {
        self.checked_total().unwrap_or(Decimal::MAX)
    }

    /// The food as a catalog record, with the current extras.
    ///
    /// This is what gets stored as a favorite.
    pub fn food_record(&self) -> Option<Food> {
        let food = self.food.as_ref()?;
        let mut attributes = food.attributes.clone();
        attributes.insert(
            "formatted_price".to_string(),
            Value::from(food.formatted_price.clone()),
        );

        Some(Food {
            id: food.id,
            name: food.name.clone(),
            description: food.description.clone(),
            price: food.price,
            image_url: food.image_url.clone(),
            extras: (!self.extras.is_empty())
                .then(|| self.extras.iter().map(ExtraItem::to_extra).collect()),
            attributes,
        })
    }

    /// Payload for the order creation call.
    ///
    /// The food id travels as `product_id`, there is no `id` key. Every extra is sent,
    /// including the ones left at 0.
    pub fn order_payload(&self) -> Result<NewOrder, OrderError> {
        let food = self.food.as_ref().ok_or(OrderError::NotLoaded)?;
        let attributes = food
            .attributes
            .iter()
            .filter(|(key, _)| !ORDER_RESERVED_KEYS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        Ok(NewOrder {
            product_id: food.id,
            name: food.name.clone(),
            description: food.description.clone(),
            price: food.price,
            image_url: food.image_url.clone(),
            formatted_price: food.formatted_price.clone(),
            quantity: self.food_quantity,
            extras: self.extras.iter().map(ExtraItem::to_extra).collect(),
            attributes,
        })
    }
}

/// One food details screen: an `OrderState` driven against a remote catalog.
///
/// Every call takes `&mut self`, so operations on one screen never overlap.
pub struct FoodDetails<C: RemoteCatalog> {
    catalog: C,
    formatter: PriceFormatter,
    state: OrderState,
}

impl<C: RemoteCatalog> FoodDetails<C> {
    pub fn new(catalog: C) -> Self {
        Self::with_formatter(catalog, PriceFormatter::default())
    }

    pub fn with_formatter(catalog: C, formatter: PriceFormatter) -> Self {
        FoodDetails {
            catalog,
            formatter,
            state: OrderState::new(),
        }
    }

    pub fn state(&self) -> &OrderState {
        &self.state
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn formatter(&self) -> &PriceFormatter {
        &self.formatter
    }

    /// Load the food, then its favorite status.
    ///
    /// The favorite lookup needs the food id, so it only starts once the food is there.
    pub fn load(&mut self, food_id: u32) -> Result<&OrderState, OrderError> {
        self.load_food(food_id)?;
        self.load_favorite_status()?;
        Ok(&self.state)
    }

    /// Fetch a food and reset the order around it
    pub fn load_food(&mut self, food_id: u32) -> Result<&OrderState, OrderError> {
        if self.state.phase == Phase::Submitted {
            return Err(OrderError::InvalidPhase(Phase::Submitted));
        }

        self.state.phase = Phase::Loading;
        match self.catalog.fetch_food(food_id) {
            Ok(food) => {
                self.state = OrderState::from_food(food, &self.formatter);
                info!(food_id, extras = self.state.extras.len(), "food loaded");
                Ok(&self.state)
            }
            Err(err) => {
                // the previous food must not stay usable
                self.state = OrderState {
                    phase: Phase::Error,
                    ..OrderState::default()
                };
                warn!(food_id, "failed to load food: {}", err);
                Err(OrderError::Fetch(err))
            }
        }
    }

    /// Check the favorites list for the loaded food and update the flag
    pub fn load_favorite_status(&mut self) -> Result<bool, OrderError> {
        let food_id = self.state.food.as_ref().ok_or(OrderError::NotLoaded)?.id;
        let favorites = self.catalog.fetch_favorites().map_err(OrderError::Fetch)?;

        self.state.is_favorite = is_favorite_in(&favorites, food_id);
        debug!(food_id, is_favorite = self.state.is_favorite, "favorite status loaded");
        Ok(self.state.is_favorite)
    }

    pub fn increment_extra(&mut self, extra_id: u32) -> bool {
        self.state.increment_extra(extra_id)
    }

    pub fn decrement_extra(&mut self, extra_id: u32) -> bool {
        self.state.decrement_extra(extra_id)
    }

    pub fn increment_food(&mut self) -> bool {
        self.state.increment_food()
    }

    pub fn decrement_food(&mut self) -> bool {
        self.state.decrement_food()
    }

    /// Flip the favorite flag, then tell the catalog.
    ///
    /// The local flag is flipped first and is not restored if the remote call fails:
    /// the error is returned but the screen keeps showing the new value.
    pub fn toggle_favorite(&mut self) -> Result<bool, OrderError> {
        let record = self.state.food_record().ok_or(OrderError::NotLoaded)?;

        self.state.is_favorite = !self.state.is_favorite;
        let result = if self.state.is_favorite {
            self.catalog.add_favorite(&record)
        } else {
            self.catalog.remove_favorite(record.id)
        };

        match result {
            Ok(()) => Ok(self.state.is_favorite),
            Err(err) => {
                warn!(
                    food_id = record.id,
                    is_favorite = self.state.is_favorite,
                    "favorite not saved, keeping local value: {}",
                    err
                );
                Err(OrderError::Submit(err))
            }
        }
    }

    /// Formatted total of the order
    pub fn total(&self) -> String {
        self.formatter.format(self.state.total())
    }

    /// Send the order. On failure the state goes back to `Ready` with quantities intact.
    pub fn finish_order(&mut self) -> Result<Order, OrderError> {
        if self.state.phase != Phase::Ready {
            return Err(match self.state.food {
                None => OrderError::NotLoaded,
                Some(_) => OrderError::InvalidPhase(self.state.phase),
            });
        }
        let payload = self.state.order_payload()?;

        self.state.phase = Phase::Submitting;
        match self.catalog.create_order(&payload) {
            Ok(order) => {
                self.state.phase = Phase::Submitted;
                info!(order_id = order.id, total = %self.total(), "order submitted");
                Ok(order)
            }
            Err(err) => {
                self.state.phase = Phase::Ready;
                warn!("failed to submit order: {}", err);
                Err(OrderError::Submit(err))
            }
        }
    }
}
