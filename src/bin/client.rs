use common::catalog::HttpCatalog;
use common::cli::*;
use common::order::{FoodDetails, OrderState};
use common::price::PriceFormatter;
use std::process::ExitCode;
use tracing::error;

type BoxedError = Box<dyn std::error::Error>;

#[derive(Debug, PartialEq)]
enum Action {
    Show,
    Order,
    Favorite,
}

#[derive(Debug)]
struct CLIOptions {
    target: String,
    action: Action,
    food_id: u32,
    quantity: u32,
    extras: Vec<u32>,
}

fn parse_action(action: &str) -> Result<Action, CLIError> {
    match action.to_ascii_lowercase().as_str() {
        "show" => Ok(Action::Show),
        "order" => Ok(Action::Order),
        "favorite" => Ok(Action::Favorite),
        _ => Err(CLIError::InvalidParameter(action.to_string())),
    }
}

/// `client [<host>:<port>] <show|order|favorite> <food_id> [-q <quantity>] [<extra_id>...]`
fn parse_cli_args<I>(mut args: I, default_target: String) -> Result<CLIOptions, CLIError>
where
    I: Iterator<Item = String>,
{
    args.next(); // Skip the program name
    let maybe_target = args
        .next()
        .ok_or(CLIError::MissingParameter("target or action"))?;

    let (target, action) = match validate_address(&maybe_target) {
        Ok(target) => (
            target.to_string(),
            parse_action(&args.next().ok_or(CLIError::MissingParameter("action"))?)?,
        ),
        Err(_) => (default_target, parse_action(&maybe_target)?),
    };

    let food_id = parse_id(&args.next().ok_or(CLIError::MissingParameter("food id"))?)?;

    let mut quantity = 1;
    let mut extras = Vec::new();
    while let Some(arg) = args.next() {
        if arg == "-q" || arg == "--quantity" {
            let value = args.next().ok_or(CLIError::MissingParameter("quantity"))?;
            quantity = parse_id(&value)?;
            if quantity == 0 {
                return Err(CLIError::InvalidParameter(value));
            }
        } else {
            extras.push(parse_id(&arg)?);
        }
    }

    if action != Action::Order && (quantity != 1 || !extras.is_empty()) {
        return Err(CLIError::InvalidParameter(
            "quantities only apply to orders".to_string(),
        ));
    }

    Ok(CLIOptions {
        target,
        action,
        food_id,
        quantity,
        extras,
    })
}

fn print_state(state: &OrderState, formatter: &PriceFormatter) {
    let Some(food) = state.food() else {
        println!("No food loaded");
        return;
    };

    let favorite = if state.is_favorite() { " [favorite]" } else { "" };
    println!("{} (#{}){}", food.name, food.id, favorite);
    if !food.description.is_empty() {
        println!("{}", food.description);
    }
    println!("Price: {}", food.formatted_price);

    if !state.extras().is_empty() {
        println!("Extras:");
        for extra in state.extras() {
            println!(
                "  [{}] {} {} x {}",
                extra.id,
                extra.name,
                formatter.format(extra.unit_value),
                extra.quantity
            );
        }
    }
    println!("Quantity: {}", state.food_quantity());
    println!("Total: {}", formatter.format(state.total()));
}

fn run(options: CLIOptions) -> Result<(), BoxedError> {
    let mut details = FoodDetails::new(HttpCatalog::new(&options.target));
    details.load(options.food_id)?;

    match options.action {
        Action::Show => print_state(details.state(), details.formatter()),
        Action::Favorite => {
            let is_favorite = details.toggle_favorite()?;
            println!(
                "{} {} favorites",
                if is_favorite { "Added to" } else { "Removed from" },
                details.state().food().map(|f| f.name.as_str()).unwrap_or("")
            );
        }
        Action::Order => {
            for _ in 1..options.quantity {
                details.increment_food();
            }
            for extra_id in &options.extras {
                if !details.increment_extra(*extra_id) {
                    return Err(
                        CLIError::InvalidParameter(format!("unknown extra {}", extra_id)).into(),
                    );
                }
            }
            print_state(details.state(), details.formatter());

            let order = details.finish_order()?;
            println!("Order #{} placed", order.id);
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    init_tracing();

    let options = default_address()
        .and_then(|default_target| parse_cli_args(std::env::args(), default_target));
    let options = match options {
        Ok(options) => options,
        Err(err) => {
            eprintln!("{}", err);
            eprintln!(
                "Usage: client [<host>:<port>] <show|order|favorite> <food_id> [-q <quantity>] [<extra_id>...]"
            );
            return ExitCode::FAILURE;
        }
    };

    match run(options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn parse(args: &[&str]) -> Result<CLIOptions, CLIError> {
        parse_cli_args(
            args.iter().map(|s| s.to_string()),
            DEFAULT_ADDRESS.to_string(),
        )
    }

    #[test]
    fn test_parse_show() {
        let options = parse(&["client", "show", "1"]).unwrap();
        assert_eq!(options.target, DEFAULT_ADDRESS);
        assert_eq!(options.action, Action::Show);
        assert_eq!(options.food_id, 1);
    }

    #[test]
    fn test_parse_order_with_target() {
        let options = parse(&[
            "client",
            "10.0.2.2:3333",
            "order",
            "1",
            "4",
            "-q",
            "2",
            "4",
        ])
        .unwrap();
        assert_eq!(options.target, "10.0.2.2:3333");
        assert_eq!(options.action, Action::Order);
        assert_eq!(options.quantity, 2);
        assert_eq!(options.extras, vec![4, 4]);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            parse(&["client"]),
            Err(CLIError::MissingParameter(_))
        ));
        assert!(matches!(
            parse(&["client", "show"]),
            Err(CLIError::MissingParameter("food id"))
        ));
        assert!(parse(&["client", "eat", "1"]).is_err());
        assert!(parse(&["client", "order", "1", "-q", "0"]).is_err());
        assert!(parse(&["client", "order", "1", "-q"]).is_err());
        assert!(parse(&["client", "show", "1", "4"]).is_err());
    }
}
