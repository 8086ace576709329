use crate::models::ReportKind;

fn with_thousands(int_part: &str) -> String {
    let mut with_commas = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_commas.push(',');
        }
        with_commas.push(c);
    }
    with_commas.chars().rev().collect()
}

/// Format a float as soles with thousands separators: S/ 1,234.56
pub fn money(val: f64) -> String {
    let cents = format!("{:.2}", val.abs());
    let negative = val < 0.0 && cents != "0.00";
    let (int_part, dec_part) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));
    let sign = if negative { "-" } else { "" };
    format!("{sign}S/ {}.{dec_part}", with_thousands(int_part))
}

/// Counts and quantities: no decimals when integral, otherwise up to two.
pub fn quantity(val: f64) -> String {
    if val.fract() == 0.0 {
        let sign = if val < 0.0 { "-" } else { "" };
        format!("{sign}{}", with_thousands(&format!("{:.0}", val.abs())))
    } else {
        let s = format!("{val:.2}");
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

pub fn report_value(val: f64, kind: ReportKind) -> String {
    if kind.is_money() {
        money(val)
    } else {
        quantity(val)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_formatting() {
        assert_eq!(money(1234.56), "S/ 1,234.56");
        assert_eq!(money(-500.00), "-S/ 500.00");
        assert_eq!(money(0.0), "S/ 0.00");
        assert_eq!(money(-0.001), "S/ 0.00");
        assert_eq!(money(1000000.99), "S/ 1,000,000.99");
        assert_eq!(money(99.99999999999999), "S/ 100.00");
    }

    #[test]
    fn test_quantity_formatting() {
        assert_eq!(quantity(3.0), "3");
        assert_eq!(quantity(12500.0), "12,500");
        assert_eq!(quantity(-4.0), "-4");
        assert_eq!(quantity(2.5), "2.5");
        assert_eq!(quantity(0.25), "0.25");
    }

    #[test]
    fn test_report_value_by_kind() {
        assert_eq!(report_value(100.0, ReportKind::NetAmount), "S/ 100.00");
        assert_eq!(report_value(100.0, ReportKind::OrderCount), "100");
    }
}
