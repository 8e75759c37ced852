use std::collections::HashMap;

use crate::database::Database;
use crate::errors::{Error, Result};
use crate::http::{Request, Response};
use matchit::Router;

/// Utility macro generating a constant for the HTTP endpoint, and associate it with
/// an identifier. Matchit requires both
macro_rules! make_paths {
    ($($name:ident: $path:expr,)*) => {
        pub mod paths {
            $(
                pub const $name: &str = $path;
            )*
        }
        pub mod endpoints {
            $(
                pub const $name: &str = stringify!($name);
            )*
        }
    }
}

make_paths! {
    FOODS: "/foods",
    FOOD_BY_ID: "/foods/{food_id}",
    FAVORITES: "/favorites",
    FAVORITE_BY_ID: "/favorites/{food_id}",
    ORDERS: "/orders",
    ORDER_BY_ID: "/orders/{order_id}",
}

/// Utility to add a list of paths to the router automatically
macro_rules! add_path {
    ($router:ident $(, $path:ident)*) => {
        $(
            $router.insert(paths::$path, endpoints::$path)?;
        )*
    }
}

/// Names of the parameters in the HTTP paths, used to extract them
/// from the parameters inside of request handling
pub mod params {
    /// Key of food ids in HTTP paths
    pub const FOOD_ID: &str = "food_id";

    /// Key of order ids in HTTP paths
    pub const ORDER_ID: &str = "order_id";
}

/// Return the HTTP path for a food based on its id
pub fn food_by_id(food_id: u32) -> String {
    paths::FOOD_BY_ID.replace("{food_id}", &food_id.to_string())
}

/// Return the HTTP path for a favorite based on the id of its food
pub fn favorite_by_id(food_id: u32) -> String {
    paths::FAVORITE_BY_ID.replace("{food_id}", &food_id.to_string())
}

/// Return the HTTP path for an order based on its id
pub fn order_by_id(order_id: u32) -> String {
    paths::ORDER_BY_ID.replace("{order_id}", &order_id.to_string())
}

// used in tests only
#[allow(unused_macros)]
/// Utility to create easily hashmaps of parameters for testing
macro_rules! make_params {
    () => {
        std::collections::HashMap::new()
    };
    ($name:ident: $value:expr $(, $name2:ident: $value2:expr)* ) => {
        {
            let mut map = std::collections::HashMap::new();
            map.insert($crate::routes::params::$name.to_string(), $value.to_string());
            $(
                map.insert($crate::routes::params::$name2.to_string(), $value2.to_string());
            )*
            map
        }
    }
}

#[allow(unused_imports)]
pub(crate) use make_params;

/// Create a new router with the paths defined in this module
///
/// Errors from this functions are programming errors, most likely stemming from a
/// misuse of matchit
fn new_router() -> Result<Router<&'static str>> {
    let mut router = Router::new();
    add_path!(
        router,
        FOODS,
        FOOD_BY_ID,
        FAVORITES,
        FAVORITE_BY_ID,
        ORDERS,
        ORDER_BY_ID
    );
    Ok(router)
}

/// Type of the object containing the HTTP path parameters passed to handlers
pub type HttpParams = HashMap<String, String>;
/// Type of the function that handles HTTP requests
pub type HttpHandler = fn(Request, HttpParams, &mut dyn Database) -> Result<Response>;

/// Extract a numeric path parameter
pub fn id_param(params: &HttpParams, name: &str) -> Result<u32> {
    params
        .get(name)
        .ok_or_else(|| Error::BadRequest(format!("Missing {}", name)))
        .and_then(|id| {
            id.parse::<u32>()
                .map_err(|err| Error::BadRequest(format!("Invalid {}: {}", name, err)))
        })
}

/// The router is in charge of taking in raw HTTP requests and to dispatch them to
/// the appropriate handler function.
pub struct HttpRouter {
    routes: Router<&'static str>,
    handlers: HashMap<&'static str, HashMap<&'static str, HttpHandler>>,
}

impl HttpRouter {
    /// Creates a new router with no handler attached.
    ///
    /// Errors in this function are programming errors.
    pub fn new() -> Result<Self> {
        let routes = new_router()?;
        Ok(HttpRouter {
            routes,
            handlers: HashMap::new(),
        })
    }

    /// Attach a handler to a method on one of the endpoints
    pub fn add_route(&mut self, method: &'static str, route: &'static str, handler: HttpHandler) {
        let method_to_handler = self.handlers.entry(route).or_default();
        method_to_handler.insert(method, handler);
    }

    /// Sends a request to the appropriate handler if it exists
    ///
    /// If no route is defined for this request, return Error::NotFound. Checking that the
    /// parameters and the body are correct is the responsibility of the handler.
    pub fn route(&self, request: Request, db: &mut dyn Database) -> Result<Response> {
        let route = self
            .routes
            .at(&request.path)
            .map_err(|err| Error::NotFound(err.to_string()))?;
        let method_to_handler = self.handlers.get(route.value).ok_or_else(|| {
            Error::NotFound(format!(
                "No method associated to this route: {}",
                route.value
            ))
        })?;
        let handler = method_to_handler
            .get(request.method.as_str())
            .ok_or_else(|| {
                Error::NotFound(format!(
                    "No handler for {} {}",
                    request.method.as_str(),
                    route.value
                ))
            })?;

        let params: HttpParams = route
            .params
            .iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        handler(request, params, db)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::database::mock::MockDB;

    #[test]
    fn test_routes() {
        let router = new_router().unwrap();
        assert_eq!(*router.at("/foods").unwrap().value, endpoints::FOODS);
        assert_eq!(*router.at("/foods/1").unwrap().value, endpoints::FOOD_BY_ID);
        assert_eq!(*router.at("/favorites").unwrap().value, endpoints::FAVORITES);
        assert_eq!(
            *router.at("/favorites/3").unwrap().value,
            endpoints::FAVORITE_BY_ID
        );
        assert_eq!(*router.at("/orders").unwrap().value, endpoints::ORDERS);
        assert_eq!(*router.at("/orders/9").unwrap().value, endpoints::ORDER_BY_ID);
    }

    #[test]
    fn test_path_helpers() {
        assert_eq!(food_by_id(12), "/foods/12");
        assert_eq!(favorite_by_id(3), "/favorites/3");
        assert_eq!(order_by_id(9), "/orders/9");
    }

    #[test]
    fn test_missing_routes() {
        let router = new_router().unwrap();
        assert!(router.at("/missing").is_err());
        assert!(router.at("/foods/1/extras").is_err());
    }

    #[test]
    fn test_id_param() {
        let params = make_params!(FOOD_ID: "1", ORDER_ID: "nope");
        assert_eq!(id_param(&params, params::FOOD_ID).unwrap(), 1);
        assert!(matches!(
            id_param(&params, params::ORDER_ID),
            Err(Error::BadRequest(_))
        ));
        assert!(id_param(&make_params!(), params::FOOD_ID).is_err());
    }

    #[test]
    fn test_router_dispatch() {
        let mut db = MockDB::new().unwrap();

        let mut router = HttpRouter::new().unwrap();
        router.add_route("GET", endpoints::FAVORITES, |_, _, _| {
            Ok(Response::ok_with_body("get_favorites".to_string()))
        });
        router.add_route("POST", endpoints::FAVORITES, |_, _, _| {
            Ok(Response::ok_with_body("post_favorites".to_string()))
        });
        router.add_route("DELETE", endpoints::FAVORITE_BY_ID, |_, params, _| {
            Ok(Response::ok_with_body(params[params::FOOD_ID].clone()))
        });

        let response = router.route(Request::get(paths::FAVORITES), &mut db).unwrap();
        assert_eq!(response.body, "get_favorites");

        let response = router
            .route(Request::post(paths::FAVORITES, String::new()), &mut db)
            .unwrap();
        assert_eq!(response.body, "post_favorites");

        assert!(router
            .route(Request::delete(paths::FAVORITES), &mut db)
            .is_err());

        let response = router
            .route(Request::delete(&favorite_by_id(42)), &mut db)
            .unwrap();
        assert_eq!(response.body, "42");
    }
}
