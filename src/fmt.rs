/// Two decimals with comma thousands separators: 1,234.56
pub fn number(val: f64) -> String {
    let fixed = format!("{:.2}", val.abs());
    let (int_part, dec_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let digits = int_part.as_bytes();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, d) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(char::from(*d));
    }
    // Rounds-to-zero negatives print unsigned.
    let sign = if val < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{sign}{grouped}.{dec_part}")
}

/// Currency amount, e.g. `R$ 1,234.56`.
pub fn money(val: f64, symbol: &str) -> String {
    format!("{symbol} {}", number(val))
}

/// Signed percentage with one decimal: +25.0%
pub fn percent(val: f64) -> String {
    format!("{val:+.1}%")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_formatting() {
        assert_eq!(number(1234.56), "1,234.56");
        assert_eq!(number(-500.0), "-500.00");
        assert_eq!(number(0.0), "0.00");
        assert_eq!(number(1000000.99), "1,000,000.99");
        assert_eq!(number(-0.001), "0.00");
    }

    #[test]
    fn test_money_and_percent() {
        assert_eq!(money(1500.0, "R$"), "R$ 1,500.00");
        assert_eq!(percent(25.0), "+25.0%");
        assert_eq!(percent(-3.24), "-3.2%");
        assert_eq!(percent(0.0), "+0.0%");
    }
}
