//! Fixed currency set supported by the catalog API.
//!
//! Static configuration, not protocol: the set of codes the price endpoint
//! accepts plus display metadata for message formatting.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    #[default]
    Rub,
    Byn,
    Kzt,
    Amd,
    Kgs,
    Uzs,
    Tjs,
}

impl Currency {
    pub const ALL: [Currency; 7] = [
        Currency::Rub,
        Currency::Byn,
        Currency::Kzt,
        Currency::Amd,
        Currency::Kgs,
        Currency::Uzs,
        Currency::Tjs,
    ];

    /// Lowercase code used in API query strings and the subscribers table
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Rub => "rub",
            Currency::Byn => "byn",
            Currency::Kzt => "kzt",
            Currency::Amd => "amd",
            Currency::Kgs => "kgs",
            Currency::Uzs => "uzs",
            Currency::Tjs => "tjs",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Rub => "₽",
            Currency::Byn => "Br",
            Currency::Kzt => "₸",
            Currency::Amd => "֏",
            Currency::Kgs => "с",
            Currency::Uzs => "soʻm",
            Currency::Tjs => "SM",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Currency::Rub => "Российский рубль",
            Currency::Byn => "Белорусский рубль",
            Currency::Kzt => "Казахстанский тенге",
            Currency::Amd => "Армянский драм",
            Currency::Kgs => "Киргизский сом",
            Currency::Uzs => "Узбекский сум",
            Currency::Tjs => "Таджикский сомони",
        }
    }

    /// Parse a stored/submitted code. Unknown codes are rejected, not
    /// defaulted: a typo in a settings request is a user error.
    pub fn from_code(code: &str) -> Option<Currency> {
        Currency::ALL.iter().copied().find(|c| c.code() == code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_round_trip() {
        for currency in Currency::ALL {
            assert_eq!(Currency::from_code(currency.code()), Some(currency));
        }
    }

    #[test]
    fn unknown_code_rejected() {
        assert_eq!(Currency::from_code("usd"), None);
        assert_eq!(Currency::from_code(""), None);
        assert_eq!(Currency::from_code("RUB"), None);
    }

    #[test]
    fn primary_currency_is_default() {
        assert_eq!(Currency::default(), Currency::Rub);
    }
}
