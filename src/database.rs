pub mod sqlite;

use crate::api::{Food, NewOrder, Order};
use crate::errors::Result;

/// Trait hiding the catalog storage
///
/// The mock backs unit tests, the SQLite implementation backs the server. Both must
/// report missing records with `Error::NotFound`.
pub trait Database {
    /// Create a new empty database
    fn new() -> Result<Self>
    where
        Self: Sized;

    /// Insert or replace a food of the catalog
    fn insert_food(&mut self, food: &Food) -> Result<()>;

    /// Retrieve a food by id
    fn get_food(&self, food_id: u32) -> Result<Food>;

    /// All the foods, ordered by id
    fn list_foods(&self) -> Result<Vec<Food>>;

    /// All the favorite foods, in the order they were added
    fn get_favorites(&self) -> Result<Vec<Food>>;

    /// Mark a food as favorite, storing the record as sent by the client.
    ///
    /// Adding a food twice replaces the stored record.
    fn add_favorite(&mut self, food: &Food) -> Result<Food>;

    /// Remove a favorite, returning the removed record
    fn remove_favorite(&mut self, food_id: u32) -> Result<Food>;

    /// Store a new order and return it with its id
    fn insert_order(&mut self, order: &NewOrder) -> Result<Order>;

    /// Retrieve an order by id
    fn get_order(&self, order_id: u32) -> Result<Order>;
}

pub mod mock {

    use super::*;
    use crate::errors::Error;

    /// In-memory store, ids of orders start at 1
    pub struct MockDB {
        foods: Vec<Food>,
        favorites: Vec<Food>,
        orders: Vec<Order>,
        next_order_id: u32,
    }

    impl Database for MockDB {
        fn new() -> Result<Self> {
            Ok(MockDB {
                foods: Vec::new(),
                favorites: Vec::new(),
                orders: Vec::new(),
                next_order_id: 1,
            })
        }

        fn insert_food(&mut self, food: &Food) -> Result<()> {
            self.foods.retain(|f| f.id != food.id);
            self.foods.push(food.clone());
            self.foods.sort_by_key(|f| f.id);
            Ok(())
        }

        fn get_food(&self, food_id: u32) -> Result<Food> {
            self.foods
                .iter()
                .find(|f| f.id == food_id)
                .cloned()
                .ok_or_else(|| Error::NotFound(format!("No food with id {}", food_id)))
        }

        fn list_foods(&self) -> Result<Vec<Food>> {
            Ok(self.foods.clone())
        }

        fn get_favorites(&self) -> Result<Vec<Food>> {
            Ok(self.favorites.clone())
        }

        fn add_favorite(&mut self, food: &Food) -> Result<Food> {
            match self.favorites.iter_mut().find(|f| f.id == food.id) {
                Some(existing) => *existing = food.clone(),
                None => self.favorites.push(food.clone()),
            }
            Ok(food.clone())
        }

        fn remove_favorite(&mut self, food_id: u32) -> Result<Food> {
            let position = self
                .favorites
                .iter()
                .position(|f| f.id == food_id)
                .ok_or_else(|| Error::NotFound(format!("Food {} is not a favorite", food_id)))?;
            Ok(self.favorites.remove(position))
        }

        fn insert_order(&mut self, order: &NewOrder) -> Result<Order> {
            let order = Order {
                id: self.next_order_id,
                order: order.clone(),
            };
            self.next_order_id += 1;
            self.orders.push(order.clone());
            Ok(order)
        }

        fn get_order(&self, order_id: u32) -> Result<Order> {
            self.orders
                .iter()
                .find(|o| o.id == order_id)
                .cloned()
                .ok_or_else(|| Error::NotFound(format!("No order with id {}", order_id)))
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::database::test_data::{ao_molho, new_order, veggie};

        #[test]
        fn test_mock_foods() {
            let mut db = MockDB::new().unwrap();
            db.insert_food(&veggie()).unwrap();
            db.insert_food(&ao_molho()).unwrap();

            let foods = db.list_foods().unwrap();
            assert_eq!(foods.len(), 2);
            assert_eq!(foods[0].name, "Ao molho");
            assert_eq!(db.get_food(2).unwrap().name, "Veggie");
            assert!(matches!(db.get_food(3), Err(Error::NotFound(_))));

            let mut renamed = veggie();
            renamed.name = "Veggie deluxe".to_string();
            db.insert_food(&renamed).unwrap();
            assert_eq!(db.list_foods().unwrap().len(), 2);
            assert_eq!(db.get_food(2).unwrap().name, "Veggie deluxe");
        }

        #[test]
        fn test_mock_favorites() {
            let mut db = MockDB::new().unwrap();
            db.add_favorite(&veggie()).unwrap();
            db.add_favorite(&ao_molho()).unwrap();
            db.add_favorite(&veggie()).unwrap();

            let ids: Vec<_> = db.get_favorites().unwrap().iter().map(|f| f.id).collect();
            assert_eq!(ids, vec![2, 1]);

            assert_eq!(db.remove_favorite(2).unwrap().id, 2);
            assert!(db.remove_favorite(2).is_err());
            assert_eq!(db.get_favorites().unwrap().len(), 1);
        }

        #[test]
        fn test_mock_orders() {
            let mut db = MockDB::new().unwrap();
            let first = db.insert_order(&new_order(1)).unwrap();
            let second = db.insert_order(&new_order(2)).unwrap();

            assert_eq!(first.id, 1);
            assert_eq!(second.id, 2);
            assert_eq!(db.get_order(2).unwrap().order.product_id, 2);
            assert!(db.get_order(3).is_err());
        }
    }
}

/// Records shared by the store and endpoint tests
#[cfg(test)]
pub(crate) mod test_data {
    use crate::api::{Extra, Food, NewOrder};
    use rust_decimal::Decimal;
    use serde_json::Map;
    use std::str::FromStr;

    pub fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    pub fn bacon() -> Extra {
        Extra {
            id: 4,
            name: "Bacon".to_string(),
            value: dec("1.5"),
            quantity: 0,
        }
    }

    pub fn ao_molho() -> Food {
        let mut attributes = Map::new();
        attributes.insert("category".to_string(), 1.into());
        Food {
            id: 1,
            name: "Ao molho".to_string(),
            description: "Macarrão ao molho branco, fughi e cheiro verde das montanhas."
                .to_string(),
            price: dec("19.9"),
            image_url: "https://example.com/ao_molho.png".to_string(),
            extras: Some(vec![bacon()]),
            attributes,
        }
    }

    pub fn veggie() -> Food {
        Food {
            id: 2,
            name: "Veggie".to_string(),
            description: "Salada verde".to_string(),
            price: dec("21"),
            image_url: "https://example.com/veggie.png".to_string(),
            extras: None,
            attributes: Map::new(),
        }
    }

    pub fn new_order(product_id: u32) -> NewOrder {
        NewOrder {
            product_id,
            name: "Ao molho".to_string(),
            description: String::new(),
            price: dec("19.9"),
            image_url: String::new(),
            formatted_price: "R$ 19,90".to_string(),
            quantity: 1,
            extras: vec![Extra {
                quantity: 1,
                ..bacon()
            }],
            attributes: Map::new(),
        }
    }
}
