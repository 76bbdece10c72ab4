//! Currency display in fixed en-US conventions.
//!
//! The locale never changes with the currency: `,` groups thousands, `.`
//! separates decimals and the symbol precedes the number. Only the symbol
//! and the number of fraction digits depend on the currency code.

use std::str::FromStr;

use campus_config::DEFAULT_CURRENCY;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::{FormsError, Result};

/// Symbol and fraction digits for codes with a narrow en-US symbol.
const SYMBOLS: &[(&str, &str, u32)] = &[
    ("USD", "$", 2),
    ("EUR", "€", 2),
    ("GBP", "£", 2),
    ("JPY", "¥", 0),
    ("INR", "₹", 2),
    ("CAD", "CA$", 2),
    ("AUD", "A$", 2),
    ("MXN", "MX$", 2),
    ("BRL", "R$", 2),
    ("CNY", "CN¥", 2),
    ("KRW", "₩", 0),
    ("ILS", "₪", 2),
    ("VND", "₫", 0),
    ("NZD", "NZ$", 2),
    ("HKD", "HK$", 2),
    ("TWD", "NT$", 2),
    ("PHP", "₱", 2),
    ("XAF", "FCFA", 0),
];

/// How a currency code is displayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyStyle {
    pub code: String,
    pub prefix: String,
    pub fraction_digits: u32,
}

impl CurrencyStyle {
    /// Look up `code` (case-insensitive). Codes without a symbol render as
    /// the code followed by a no-break space.
    pub fn for_code(code: &str) -> Result<Self> {
        let code = code.trim();
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(FormsError::InvalidCurrencyCode(code.to_string()));
        }
        let code = code.to_ascii_uppercase();
        let style = match SYMBOLS.iter().find(|(c, _, _)| *c == code) {
            Some(&(_, symbol, digits)) => Self {
                prefix: symbol.to_string(),
                fraction_digits: digits,
                code,
            },
            None => Self {
                prefix: format!("{code}\u{a0}"),
                fraction_digits: 2,
                code,
            },
        };
        Ok(style)
    }
}

/// Format `amount` in `currency` (default USD).
///
/// Rounds half away from zero on the shortest decimal form of `amount`, so
/// `1.005` becomes `$1.01`.
pub fn format_currency(amount: f64, currency: Option<&str>) -> Result<String> {
    if !amount.is_finite() {
        return Err(FormsError::NonFiniteAmount(amount));
    }
    let style = CurrencyStyle::for_code(currency.unwrap_or(DEFAULT_CURRENCY))?;

    let exact = Decimal::from_str(&amount.to_string())
        .ok()
        .or_else(|| Decimal::from_f64(amount))
        .ok_or(FormsError::AmountOutOfRange(amount))?;
    let mut rounded =
        exact.round_dp_with_strategy(style.fraction_digits, RoundingStrategy::MidpointAwayFromZero);
    // en-US keeps the sign of negative amounts that round to zero.
    let negative = amount.is_sign_negative();
    rounded.set_sign_positive(true);
    rounded.rescale(style.fraction_digits);

    let digits = rounded.to_string();
    let (whole, fraction) = match digits.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (digits.as_str(), None),
    };

    let mut out = String::with_capacity(digits.len() + style.prefix.len() + 8);
    if negative {
        out.push('-');
    }
    out.push_str(&style.prefix);
    out.push_str(&group_thousands(whole));
    if let Some(fraction) = fraction {
        out.push('.');
        out.push_str(fraction);
    }
    Ok(out)
}

fn group_thousands(whole: &str) -> String {
    let len = whole.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
