pub mod api;
pub mod catalog;
pub mod cli;
pub mod database;
pub mod endpoints;
pub mod errors;
pub mod http;
pub mod order;
pub mod price;
pub mod routes;
pub mod threadpool;
