//! Currency conversion abstractions

use crate::core::asset::AssetRecord;
use crate::core::cost::CostRecord;
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const BASE_CURRENCY: &str = "USD";

/// Multipliers from USD to each currency code. USD is always 1.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRateTable(BTreeMap<String, f64>);

impl ExchangeRateTable {
    pub fn new(rates: BTreeMap<String, f64>) -> Self {
        let mut rates = rates;
        rates.insert(BASE_CURRENCY.to_string(), 1.0);
        Self(rates)
    }

    /// Table that only knows USD; used until real rates arrive.
    pub fn usd_only() -> Self {
        Self::new(BTreeMap::new())
    }

    /// Multiplier for `code`. Unknown codes are treated as USD.
    pub fn rate_for(&self, code: &str) -> f64 {
        self.0.get(&code.to_uppercase()).copied().unwrap_or(1.0)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.0.contains_key(&code.to_uppercase())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &f64)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Approximate offline rates used when the live source is unreachable.
pub fn fallback_rates() -> ExchangeRateTable {
    let rates = [
        ("USD", 1.0),
        ("EUR", 0.92),
        ("GBP", 0.79),
        ("JPY", 149.5),
        ("CAD", 1.36),
        ("AUD", 1.55),
        ("CHF", 0.88),
        ("CNY", 7.24),
        ("INR", 83.1),
        ("KRW", 1330.0),
        ("BRL", 4.97),
        ("MXN", 17.15),
        ("SGD", 1.34),
        ("HKD", 7.82),
        ("SEK", 10.45),
        ("NOK", 10.62),
        ("NZD", 1.63),
        ("ZAR", 18.65),
    ];
    ExchangeRateTable::new(
        rates
            .into_iter()
            .map(|(code, rate)| (code.to_string(), rate))
            .collect(),
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrencyOption {
    pub code: &'static str,
    pub symbol: &'static str,
    pub name: &'static str,
    pub fraction_digits: usize,
}

const fn option(code: &'static str, symbol: &'static str, name: &'static str) -> CurrencyOption {
    CurrencyOption {
        code,
        symbol,
        name,
        fraction_digits: 2,
    }
}

pub const CURRENCY_OPTIONS: [CurrencyOption; 18] = [
    option("USD", "$", "US Dollar"),
    option("INR", "₹", "Indian Rupee"),
    option("EUR", "€", "Euro"),
    option("GBP", "£", "British Pound"),
    CurrencyOption {
        code: "JPY",
        symbol: "¥",
        name: "Japanese Yen",
        fraction_digits: 0,
    },
    option("CAD", "CA$", "Canadian Dollar"),
    option("AUD", "A$", "Australian Dollar"),
    option("CHF", "CHF", "Swiss Franc"),
    option("CNY", "¥", "Chinese Yuan"),
    CurrencyOption {
        code: "KRW",
        symbol: "₩",
        name: "Korean Won",
        fraction_digits: 0,
    },
    option("BRL", "R$", "Brazilian Real"),
    option("MXN", "MX$", "Mexican Peso"),
    option("SGD", "S$", "Singapore Dollar"),
    option("HKD", "HK$", "Hong Kong Dollar"),
    option("SEK", "kr", "Swedish Krona"),
    option("NOK", "kr", "Norwegian Krone"),
    option("NZD", "NZ$", "New Zealand Dollar"),
    option("ZAR", "R", "South African Rand"),
];

pub fn currency_option(code: &str) -> Option<&'static CurrencyOption> {
    CURRENCY_OPTIONS
        .iter()
        .find(|c| c.code.eq_ignore_ascii_case(code))
}

/// Codes requested from the live rate source.
pub fn supported_codes() -> Vec<&'static str> {
    CURRENCY_OPTIONS
        .iter()
        .map(|c| c.code)
        .filter(|c| *c != BASE_CURRENCY)
        .collect()
}

/// Formats an amount with the currency's symbol, thousands separators and
/// fraction digits, e.g. `$1,234.50`, `-€3.10`, `¥1,235`, `CHF 12.00`.
pub fn format_currency(amount: f64, code: &str) -> String {
    let (symbol, digits) = match currency_option(code) {
        Some(option) => (option.symbol.to_string(), option.fraction_digits),
        None => (code.to_uppercase(), 2),
    };
    let amount = if amount.is_finite() { amount } else { 0.0 };

    let fixed = format!("{:.*}", digits, amount.abs());
    let (integer, fraction) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let mut grouped = String::new();
    for (i, ch) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if let Some(fraction) = fraction {
        grouped.push('.');
        grouped.push_str(fraction);
    }

    let is_zero = fixed.chars().all(|c| c == '0' || c == '.');
    let sign = if amount < 0.0 && !is_zero { "-" } else { "" };
    let separator = if symbol.ends_with(|c: char| c.is_ascii_alphabetic()) {
        " "
    } else {
        ""
    };
    format!("{sign}{symbol}{separator}{grouped}")
}

/// Copy of `record` with every monetary field multiplied by `rate`.
pub fn convert(record: &CostRecord, rate: f64) -> CostRecord {
    let mut converted = record.clone();
    if rate == 1.0 {
        return converted;
    }
    for field in converted.monetary_mut() {
        *field *= rate;
    }
    converted
}

/// Copy of `asset` with its monetary fields multiplied by `rate`.
pub fn convert_asset(asset: &AssetRecord, rate: f64) -> AssetRecord {
    let mut converted = asset.clone();
    if rate == 1.0 {
        return converted;
    }
    converted.scale_costs(rate);
    converted
}

/// Outcome of a rates lookup. `is_live` is false when the offline table had to
/// be used; `is_cached` marks a table served from the local cache.
#[derive(Debug, Clone, PartialEq)]
pub struct RatesResult {
    pub rates: ExchangeRateTable,
    pub is_live: bool,
    pub is_cached: bool,
}

#[async_trait]
pub trait CurrencyRateProvider: Send + Sync {
    /// Fetches multipliers from `base` to each of `codes`.
    async fn fetch_rates(&self, base: &str, codes: &[&str]) -> Result<ExchangeRateTable>;
}
