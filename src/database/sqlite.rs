use crate::api::{Food, NewOrder, Order};
use crate::database::Database;
use crate::errors::{Error, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// Contains the SQL queries used to interact with the database
///
/// Records are stored as their JSON bodies, keyed by id.
pub mod sql_queries {
    pub const CREATE_TABLES: &str = "
        CREATE TABLE IF NOT EXISTS foods (id INTEGER PRIMARY KEY, body TEXT NOT NULL);
        CREATE TABLE IF NOT EXISTS favorites (
            position INTEGER PRIMARY KEY AUTOINCREMENT,
            food_id INTEGER NOT NULL UNIQUE,
            body TEXT NOT NULL
        );
        CREATE TABLE IF NOT EXISTS orders (id INTEGER PRIMARY KEY AUTOINCREMENT, body TEXT NOT NULL);
    ";

    pub const UPSERT_FOOD: &str = "INSERT OR REPLACE INTO foods (id, body) VALUES (?1, ?2)";
    pub const SELECT_FOOD: &str = "SELECT body FROM foods WHERE id = ?1";
    pub const SELECT_FOODS: &str = "SELECT body FROM foods ORDER BY id";

    pub const UPSERT_FAVORITE: &str = "INSERT INTO favorites (food_id, body) VALUES (?1, ?2)
         ON CONFLICT(food_id) DO UPDATE SET body = excluded.body";
    pub const SELECT_FAVORITE: &str = "SELECT body FROM favorites WHERE food_id = ?1";
    pub const SELECT_FAVORITES: &str = "SELECT body FROM favorites ORDER BY position";
    pub const DELETE_FAVORITE: &str = "DELETE FROM favorites WHERE food_id = ?1";

    pub const INSERT_ORDER: &str = "INSERT INTO orders (body) VALUES (?1)";
    pub const SELECT_ORDER: &str = "SELECT body FROM orders WHERE id = ?1";
}

pub struct SQLiteConnection {
    conn: Connection,
}

impl SQLiteConnection {
    /// Open (or create) a database file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::with_connection(Connection::open(path)?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(sql_queries::CREATE_TABLES)?;
        Ok(SQLiteConnection { conn })
    }

    /// Run a query expected to return at most one JSON body
    fn select_one<T>(&self, query: &str, id: u32, missing: impl FnOnce() -> String) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let body: Option<String> = self
            .conn
            .prepare_cached(query)?
            .query_row(params![id], |row| row.get(0))
            .optional()?;
        let body = body.ok_or_else(|| Error::NotFound(missing()))?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Run a query returning a list of JSON bodies
    fn select_all<T>(&self, query: &str) -> Result<Vec<T>>
    where
        T: serde::de::DeserializeOwned,
    {
        let mut stmt = self.conn.prepare_cached(query)?;
        let bodies = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        bodies
            .iter()
            .map(|body| serde_json::from_str(body).map_err(Error::from))
            .collect()
    }
}

impl Database for SQLiteConnection {
    fn new() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn insert_food(&mut self, food: &Food) -> Result<()> {
        let body = serde_json::to_string(food)?;
        self.conn
            .prepare_cached(sql_queries::UPSERT_FOOD)?
            .execute(params![food.id, body])?;
        Ok(())
    }

    fn get_food(&self, food_id: u32) -> Result<Food> {
        self.select_one(sql_queries::SELECT_FOOD, food_id, || {
            format!("No food with id {}", food_id)
        })
    }

    fn list_foods(&self) -> Result<Vec<Food>> {
        self.select_all(sql_queries::SELECT_FOODS)
    }

    fn get_favorites(&self) -> Result<Vec<Food>> {
        self.select_all(sql_queries::SELECT_FAVORITES)
    }

    fn add_favorite(&mut self, food: &Food) -> Result<Food> {
        let body = serde_json::to_string(food)?;
        self.conn
            .prepare_cached(sql_queries::UPSERT_FAVORITE)?
            .execute(params![food.id, body])?;
        Ok(food.clone())
    }

    fn remove_favorite(&mut self, food_id: u32) -> Result<Food> {
        let tx = self.conn.transaction()?;
        let body: Option<String> = tx
            .query_row(sql_queries::SELECT_FAVORITE, params![food_id], |row| {
                row.get(0)
            })
            .optional()?;
        let body =
            body.ok_or_else(|| Error::NotFound(format!("Food {} is not a favorite", food_id)))?;
        tx.execute(sql_queries::DELETE_FAVORITE, params![food_id])?;
        tx.commit()?;

        Ok(serde_json::from_str(&body)?)
    }

    fn insert_order(&mut self, order: &NewOrder) -> Result<Order> {
        let body = serde_json::to_string(order)?;
        self.conn
            .prepare_cached(sql_queries::INSERT_ORDER)?
            .execute(params![body])?;
        let id = u32::try_from(self.conn.last_insert_rowid())
            .map_err(|_| Error::BadRequest("Order id out of range".to_string()))?;

        Ok(Order {
            id,
            order: order.clone(),
        })
    }

    fn get_order(&self, order_id: u32) -> Result<Order> {
        let order: NewOrder = self.select_one(sql_queries::SELECT_ORDER, order_id, || {
            format!("No order with id {}", order_id)
        })?;
        Ok(Order { id: order_id, order })
    }
}
