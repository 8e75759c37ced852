use rust_decimal::{Decimal, RoundingStrategy};

/// Turns amounts into currency strings.
///
/// Defaults to Brazilian real conventions: `R$ 1.234,50`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceFormatter {
    pub symbol: String,
    pub decimal_separator: char,
    pub group_separator: char,
}

impl Default for PriceFormatter {
    fn default() -> Self {
        PriceFormatter {
            symbol: "R$".to_string(),
            decimal_separator: ',',
            group_separator: '.',
        }
    }
}

impl PriceFormatter {
    pub fn new(symbol: &str, decimal_separator: char, group_separator: char) -> Self {
        PriceFormatter {
            symbol: symbol.to_string(),
            decimal_separator,
            group_separator,
        }
    }

    /// Format an amount with two decimal places, rounding half away from zero
    pub fn format(&self, amount: Decimal) -> String {
        let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };
        let digits = format!("{:.2}", rounded.abs());
        let (units, cents) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));

        format!(
            "{}{} {}{}{}",
            sign,
            self.symbol,
            self.group(units),
            self.decimal_separator,
            cents
        )
    }

    /// Insert the group separator every three digits, from the right
    fn group(&self, units: &str) -> String {
        let mut grouped = String::with_capacity(units.len() + units.len() / 3);
        for (i, digit) in units.chars().enumerate() {
            if i > 0 && (units.len() - i) % 3 == 0 {
                grouped.push(self.group_separator);
            }
            grouped.push(digit);
        }
        grouped
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_default_format() {
        let formatter = PriceFormatter::default();
        assert_eq!(formatter.format(dec("21.4")), "R$ 21,40");
        assert_eq!(formatter.format(dec("48.80")), "R$ 48,80");
        assert_eq!(formatter.format(Decimal::ZERO), "R$ 0,00");
    }

    #[test]
    fn test_grouping() {
        let formatter = PriceFormatter::default();
        assert_eq!(formatter.format(dec("1234.5")), "R$ 1.234,50");
        assert_eq!(formatter.format(dec("999")), "R$ 999,00");
        assert_eq!(formatter.format(dec("1000000")), "R$ 1.000.000,00");
    }

    #[test]
    fn test_rounding() {
        let formatter = PriceFormatter::default();
        assert_eq!(formatter.format(dec("0.005")), "R$ 0,01");
        assert_eq!(formatter.format(dec("19.994")), "R$ 19,99");
        assert_eq!(formatter.format(dec("-3.5")), "-R$ 3,50");
    }

    #[test]
    fn test_custom_locale() {
        let formatter = PriceFormatter::new("$", '.', ',');
        assert_eq!(formatter.format(dec("1234.5")), "$ 1,234.50");
    }
}
