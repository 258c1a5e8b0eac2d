//! Single-base amount conversion across all supported currencies

use super::currency::CurrencyCode;
use super::error::QuoteError;
use super::rates::Rates;

/// Holds one base quantity from which every currency's amount is derived.
///
/// Editing any currency rewrites the base, so all displayed amounts stay
/// mutually consistent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Converter {
    base_amount: f64,
    active: CurrencyCode,
}

impl Default for Converter {
    fn default() -> Self {
        Self {
            base_amount: 100.0,
            active: CurrencyCode::Usd,
        }
    }
}

impl Converter {
    pub fn base_amount(&self) -> f64 {
        self.base_amount
    }

    /// The currency that was edited last.
    pub fn active(&self) -> CurrencyCode {
        self.active
    }

    /// Sets the amount held in `code`. State is left untouched on error.
    pub fn set_amount(
        &mut self,
        rates: &Rates,
        code: CurrencyCode,
        value: f64,
    ) -> Result<(), QuoteError> {
        let rate = rates.get(code);
        if !rate.is_finite() || rate <= 0.0 {
            return Err(QuoteError::InvalidRate { code, value: rate });
        }
        self.active = code;
        self.base_amount = value / rate;
        Ok(())
    }

    pub fn amount(&self, rates: &Rates, code: CurrencyCode) -> f64 {
        self.base_amount * rates.get(code)
    }
}

/// Parses a user-entered amount. Anything that is not a finite number becomes 0.
pub fn parse_amount(text: &str) -> f64 {
    text.trim()
        .replace(',', "")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Formats an amount for display with thousands separators and at most two
/// fractional digits, dropping trailing zeros.
pub fn format_amount(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    let text = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = text.split_once('.').unwrap_or((&text, ""));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let frac = frac_part.trim_end_matches('0');
    let sign = if rounded < 0.0 { "-" } else { "" };
    if frac.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{frac}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_default_state() {
        let converter = Converter::default();
        let rates = Rates::fallback();
        assert_eq!(converter.active(), CurrencyCode::Usd);
        assert_eq!(converter.amount(&rates, CurrencyCode::Usd), 100.0);
        assert!((converter.amount(&rates, CurrencyCode::Twd) - 3250.0).abs() < EPS);
    }

    #[test]
    fn test_all_amounts_share_one_base() {
        let rates = Rates::fallback();
        let mut converter = Converter::default();
        converter
            .set_amount(&rates, CurrencyCode::Vnd, 1_000_000.0)
            .unwrap();

        let base = converter.base_amount();
        for a in CurrencyCode::ALL {
            for b in CurrencyCode::ALL {
                let lhs = converter.amount(&rates, a) / rates.get(a);
                let rhs = converter.amount(&rates, b) / rates.get(b);
                assert!((lhs - rhs).abs() < EPS * base.max(1.0));
            }
        }
    }

    #[test]
    fn test_set_then_get_returns_entered_value() {
        let rates = Rates::fallback();
        let mut converter = Converter::default();
        for code in CurrencyCode::ALL {
            for value in [0.01, 1.0, 1234.56, 98_765_432.1] {
                converter.set_amount(&rates, code, value).unwrap();
                assert_eq!(converter.active(), code);
                let back = converter.amount(&rates, code);
                assert!((back - value).abs() <= value * 1e-12, "{code} {value} {back}");
            }
        }
    }

    #[test]
    fn test_edit_in_one_currency_updates_others() {
        let rates = Rates::fallback();
        let mut converter = Converter::default();
        converter.set_amount(&rates, CurrencyCode::Twd, 325.0).unwrap();
        assert!((converter.amount(&rates, CurrencyCode::Usd) - 10.0).abs() < EPS);
        assert!((converter.amount(&rates, CurrencyCode::Vnd) - 254_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_parse_amount_coerces_invalid_input_to_zero() {
        assert_eq!(parse_amount("1000"), 1000.0);
        assert_eq!(parse_amount(" 12.5 "), 12.5);
        assert_eq!(parse_amount("780,000"), 780_000.0);
        assert_eq!(parse_amount(""), 0.0);
        assert_eq!(parse_amount("abc"), 0.0);
        assert_eq!(parse_amount("NaN"), 0.0);
        assert_eq!(parse_amount("inf"), 0.0);
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(100.0), "100");
        assert_eq!(format_amount(1234.5), "1,234.5");
        assert_eq!(format_amount(781_538.461_5), "781,538.46");
        assert_eq!(format_amount(0.004), "0");
        assert_eq!(format_amount(-1.97), "-1.97");
        assert_eq!(format_amount(2_540_000.0), "2,540,000");
    }
}
