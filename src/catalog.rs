//! Client side of the catalog API.

use crate::api::{Favorite, Food, NewOrder, Order};
use crate::errors::{Error, Result};
use crate::http::{HttpClient, Response};
use crate::routes::{self, paths};
use serde::de::DeserializeOwned;

/// The remote calls the order screen depends on.
///
/// Calls are blocking and sequential. No timeout and no retry are applied here.
pub trait RemoteCatalog {
    /// `GET /foods/{id}`
    fn fetch_food(&mut self, food_id: u32) -> Result<Food>;

    /// `GET /favorites`
    fn fetch_favorites(&mut self) -> Result<Vec<Favorite>>;

    /// `POST /favorites` with the full food record
    fn add_favorite(&mut self, food: &Food) -> Result<()>;

    /// `DELETE /favorites/{id}`
    fn remove_favorite(&mut self, food_id: u32) -> Result<()>;

    /// `POST /orders`
    fn create_order(&mut self, order: &NewOrder) -> Result<Order>;
}

/// `RemoteCatalog` over HTTP, opening one connection per call
pub struct HttpCatalog {
    address: String,
}

impl HttpCatalog {
    /// `address` is a `<host>:<port>` pair
    pub fn new(address: &str) -> Self {
        HttpCatalog {
            address: address.to_string(),
        }
    }

    fn send(&self, method: &str, endpoint: &str, body: &str) -> Result<Response> {
        let response = HttpClient::new(&self.address)?.send(method, endpoint, body)?;
        match response.status {
            None => Err(Error::NoResponse),
            Some(_) if response.is_success() => Ok(response),
            Some(code) => Err(Error::Status(code)),
        }
    }

    fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        let response = self.send("GET", endpoint, "")?;
        Ok(serde_json::from_str(&response.body)?)
    }
}

impl RemoteCatalog for HttpCatalog {
    fn fetch_food(&mut self, food_id: u32) -> Result<Food> {
        self.get(&routes::food_by_id(food_id))
    }

    fn fetch_favorites(&mut self) -> Result<Vec<Favorite>> {
        let response = self.send("GET", paths::FAVORITES, "")?;
        if response.body.trim().is_empty() {
            return Ok(Vec::new());
        }
        let favorites: Option<Vec<Favorite>> = serde_json::from_str(&response.body)?;
        Ok(favorites.unwrap_or_default())
    }

    fn add_favorite(&mut self, food: &Food) -> Result<()> {
        self.send("POST", paths::FAVORITES, &serde_json::to_string(food)?)?;
        Ok(())
    }

    fn remove_favorite(&mut self, food_id: u32) -> Result<()> {
        self.send("DELETE", &routes::favorite_by_id(food_id), "")?;
        Ok(())
    }

    fn create_order(&mut self, order: &NewOrder) -> Result<Order> {
        let response = self.send("POST", paths::ORDERS, &serde_json::to_string(order)?)?;
        Ok(serde_json::from_str(&response.body)?)
    }
}

/// In-memory catalog recording every call, for the order tests
#[cfg(test)]
pub(crate) mod fake {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    pub enum Call {
        FetchFood(u32),
        FetchFavorites,
        AddFavorite(u32),
        RemoveFavorite(u32),
        CreateOrder(NewOrder),
    }

    #[derive(Default)]
    pub struct FakeCatalog {
        pub foods: Vec<Food>,
        pub favorites: Vec<Favorite>,
        pub calls: Vec<Call>,
        /// Make every read fail
        pub fail_reads: bool,
        /// Make every write fail
        pub fail_writes: bool,
    }

    impl FakeCatalog {
        pub fn with_foods(foods: Vec<Food>) -> Self {
            FakeCatalog {
                foods,
                ..Default::default()
            }
        }

        fn read(&self) -> Result<()> {
            if self.fail_reads {
                Err(Error::Status(500))
            } else {
                Ok(())
            }
        }

        fn write(&self) -> Result<()> {
            if self.fail_writes {
                Err(Error::ConnectionReset)
            } else {
                Ok(())
            }
        }
    }

    impl RemoteCatalog for FakeCatalog {
        fn fetch_food(&mut self, food_id: u32) -> Result<Food> {
            self.calls.push(Call::FetchFood(food_id));
            self.read()?;
            self.foods
                .iter()
                .find(|f| f.id == food_id)
                .cloned()
                .ok_or(Error::Status(404))
        }

        fn fetch_favorites(&mut self) -> Result<Vec<Favorite>> {
            self.calls.push(Call::FetchFavorites);
            self.read()?;
            Ok(self.favorites.clone())
        }

        fn add_favorite(&mut self, food: &Food) -> Result<()> {
            self.calls.push(Call::AddFavorite(food.id));
            self.write()?;
            self.favorites.push(Favorite {
                id: food.id,
                fields: Default::default(),
            });
            Ok(())
        }

        fn remove_favorite(&mut self, food_id: u32) -> Result<()> {
            self.calls.push(Call::RemoveFavorite(food_id));
            self.write()?;
            self.favorites.retain(|f| f.id != food_id);
            Ok(())
        }

        fn create_order(&mut self, order: &NewOrder) -> Result<Order> {
            self.calls.push(Call::CreateOrder(order.clone()));
            self.write()?;
            Ok(Order {
                id: 1,
                order: order.clone(),
            })
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::database::mock::MockDB;
    use crate::database::test_data::{ao_molho, new_order, veggie};
    use crate::database::Database;
    use crate::endpoints::{create_http_router, handle_request};
    use crate::http::HttpServer;
    use std::sync::{Arc, Mutex};

    /// Start a catalog server on a fixed loopback port, seeded with two foods
    fn spawn_server(addr: &'static str) {
        let mut db = MockDB::new().unwrap();
        db.insert_food(&ao_molho()).unwrap();
        db.insert_food(&veggie()).unwrap();
        let db = Arc::new(Mutex::new(db));
        let router = Arc::new(create_http_router().unwrap());
        let server = HttpServer::new(addr).expect("Failed to bind test server");

        std::thread::spawn(move || {
            server.serve(move |request| {
                let mut db = db.lock().unwrap();
                handle_request(&router, request, &mut *db)
            })
        });
    }

    #[test]
    fn test_http_catalog_round_trip() {
        // Fixed port, may collide with another process on a busy machine
        static ADDR: &str = "127.0.0.1:18433";
        spawn_server(ADDR);
        let mut catalog = HttpCatalog::new(ADDR);

        let food = catalog.fetch_food(1).unwrap();
        assert_eq!(food, ao_molho());
        assert!(matches!(catalog.fetch_food(99), Err(Error::Status(404))));

        assert!(catalog.fetch_favorites().unwrap().is_empty());
        catalog.add_favorite(&food).unwrap();
        let favorites = catalog.fetch_favorites().unwrap();
        assert_eq!(favorites.len(), 1);
        assert_eq!(favorites[0].id, 1);

        catalog.remove_favorite(1).unwrap();
        assert!(catalog.fetch_favorites().unwrap().is_empty());
        assert!(matches!(
            catalog.remove_favorite(1),
            Err(Error::Status(404))
        ));

        let order = catalog.create_order(&new_order(2)).unwrap();
        assert_eq!(order.id, 1);
        assert_eq!(order.order, new_order(2));
        assert!(matches!(
            catalog.create_order(&new_order(42)),
            Err(Error::Status(400))
        ));
    }

    #[test]
    fn test_unreachable_catalog() {
        // Nothing listens on the discard port
        let mut catalog = HttpCatalog::new("127.0.0.1:9");
        assert!(matches!(catalog.fetch_food(1), Err(Error::Io(_))));
    }
}
