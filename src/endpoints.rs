use crate::api::{Food, NewOrder};
use crate::database::Database;
use crate::errors::{Error, Result};
use crate::http::{Request, Response};
use crate::routes::*;
use tracing::{info, warn};

/// Build the router serving the catalog API
pub fn create_http_router() -> Result<HttpRouter> {
    let mut router = HttpRouter::new()?;

    router.add_route("GET", endpoints::FOODS, list_foods);
    router.add_route("GET", endpoints::FOOD_BY_ID, get_food);
    router.add_route("GET", endpoints::FAVORITES, get_favorites);
    router.add_route("POST", endpoints::FAVORITES, post_favorite);
    router.add_route("DELETE", endpoints::FAVORITE_BY_ID, delete_favorite);
    router.add_route("POST", endpoints::ORDERS, post_order);
    router.add_route("GET", endpoints::ORDER_BY_ID, get_order);

    Ok(router)
}

/// Route a request and turn handler errors into HTTP statuses
pub fn handle_request(router: &HttpRouter, request: Request, db: &mut dyn Database) -> Response {
    let method = request.method.clone();
    let path = request.path.clone();

    match router.route(request, db) {
        Ok(response) => response,
        Err(err) => {
            let status = match err {
                Error::NotFound(_) => 404,
                Error::BadRequest(_) | Error::Json(_) => 400,
                _ => 500,
            };
            warn!(%method, %path, status, "request failed: {}", err);
            Response::error(status)
        }
    }
}

fn parse_body<T: serde::de::DeserializeOwned>(request: &Request) -> Result<T> {
    serde_json::from_str(&request.body).map_err(|err| Error::BadRequest(err.to_string()))
}

fn list_foods(_: Request, _: HttpParams, db: &mut dyn Database) -> Result<Response> {
    Response::json(200, &db.list_foods()?)
}

fn get_food(_: Request, params: HttpParams, db: &mut dyn Database) -> Result<Response> {
    let food_id = id_param(&params, params::FOOD_ID)?;
    Response::json(200, &db.get_food(food_id)?)
}

fn get_favorites(_: Request, _: HttpParams, db: &mut dyn Database) -> Result<Response> {
    Response::json(200, &db.get_favorites()?)
}

fn post_favorite(request: Request, _: HttpParams, db: &mut dyn Database) -> Result<Response> {
    let food: Food = parse_body(&request)?;
    let favorite = db.add_favorite(&food)?;
    info!(food_id = favorite.id, "favorite added");
    Response::json(201, &favorite)
}

fn delete_favorite(_: Request, params: HttpParams, db: &mut dyn Database) -> Result<Response> {
    let food_id = id_param(&params, params::FOOD_ID)?;
    let removed = db.remove_favorite(food_id)?;
    info!(food_id, "favorite removed");
    Response::json(200, &removed)
}

fn post_order(request: Request, _: HttpParams, db: &mut dyn Database) -> Result<Response> {
    let order: NewOrder = parse_body(&request)?;
    match db.get_food(order.product_id) {
        Ok(_) => {}
        Err(Error::NotFound(_)) => {
            return Err(Error::BadRequest(format!(
                "Unknown product {}",
                order.product_id
            )))
        }
        Err(err) => return Err(err),
    }
    if order.quantity == 0 {
        return Err(Error::BadRequest("Quantity must be at least 1".to_string()));
    }

    let created = db.insert_order(&order)?;
    info!(order_id = created.id, product_id = order.product_id, "order created");
    Response::json(201, &created)
}

fn get_order(_: Request, params: HttpParams, db: &mut dyn Database) -> Result<Response> {
    let order_id = id_param(&params, params::ORDER_ID)?;
    Response::json(200, &db.get_order(order_id)?)
}
