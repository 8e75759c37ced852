use common::api::Food;
use common::cli::{default_address, init_tracing, validate_address};
use common::database::sqlite::SQLiteConnection;
use common::database::Database;
use common::endpoints::{create_http_router, handle_request};
use common::errors::Result;
use common::http::{HttpServer, Response};
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use tracing::{error, info};

/// Foods served when the server starts
const SEED_CATALOG: &str = include_str!("../../data/catalog.json");

/// Insert the seed foods, replacing any stored food with the same id
fn seed(db: &mut dyn Database) -> Result<usize> {
    let foods: Vec<Food> = serde_json::from_str(SEED_CATALOG)?;
    for food in &foods {
        db.insert_food(food)?;
    }
    Ok(foods.len())
}

/// `server [<host>:<port>] [<sqlite path>]`
fn run(
    mut args: impl Iterator<Item = String>,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    args.next(); // Skip the program name
    let mut address = default_address()?;
    let mut db_path = None;
    for arg in args {
        match validate_address(&arg) {
            Ok(valid) => address = valid.to_string(),
            Err(_) => db_path = Some(arg),
        }
    }

    let mut db = match &db_path {
        Some(path) => SQLiteConnection::open(path)?,
        None => SQLiteConnection::new()?,
    };
    let seeded = seed(&mut db)?;

    let db = Arc::new(Mutex::new(db));
    let router = Arc::new(create_http_router()?);
    let server = HttpServer::new(&address)?;
    info!(
        address = %server.local_addr()?,
        database = db_path.as_deref().unwrap_or(":memory:"),
        foods = seeded,
        "catalog server listening"
    );

    server.serve(move |request| match db.lock() {
        Ok(mut db) => handle_request(&router, request, &mut *db),
        Err(_) => {
            error!("database lock poisoned");
            Response::internal_server_error()
        }
    });
    Ok(())
}

fn main() -> ExitCode {
    init_tracing();

    match run(std::env::args()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            ExitCode::FAILURE
        }
    }
}
