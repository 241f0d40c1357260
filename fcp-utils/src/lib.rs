//! Shared utility functions for FCP crates.

/// Period distance and labels
pub mod periods {
    use chrono::NaiveDate;
    use fcp_core::Period;

    const MONTHS_SHORT: [&str; 12] = [
        "Jan", "Fev", "Mar", "Abr", "Mai", "Jun", "Jul", "Ago", "Set", "Out", "Nov", "Dez",
    ];

    const MONTHS_FULL: [&str; 12] = [
        "Janeiro",
        "Fevereiro",
        "Março",
        "Abril",
        "Maio",
        "Junho",
        "Julho",
        "Agosto",
        "Setembro",
        "Outubro",
        "Novembro",
        "Dezembro",
    ];

    /// Number of months from `start` to `end` (negative if `end` precedes `start`).
    pub fn months_between(start: Period, end: Period) -> i64 {
        end.ordinal() - start.ordinal()
    }

    fn month_index(period: &Period) -> usize {
        (period.month as usize).saturating_sub(1).min(11)
    }

    /// Short label, e.g. "Jan/2023"
    pub fn format_period(period: &Period) -> String {
        format!("{}/{}", MONTHS_SHORT[month_index(period)], period.year)
    }

    /// Long label, e.g. "Janeiro de 2023"
    pub fn format_period_full(period: &Period) -> String {
        format!("{} de {}", MONTHS_FULL[month_index(period)], period.year)
    }

    /// Format a date as "YYYY-MM-DD" (file name stamps)
    pub fn format_date_iso(date: &NaiveDate) -> String {
        date.format("%Y-%m-%d").to_string()
    }

    /// Format a date as "DD/MM/YYYY"
    pub fn format_date_br(date: &NaiveDate) -> String {
        date.format("%d/%m/%Y").to_string()
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        fn p(s: &str) -> Period {
            s.parse().unwrap()
        }

        #[test]
        fn test_months_between() {
            assert_eq!(months_between(p("2024-12"), p("2026-11")), 23);
            assert_eq!(months_between(p("2024-12"), p("2024-10")), -2);
            assert_eq!(months_between(p("2023-11"), p("2024-01")), 2);
        }

        #[test]
        fn test_labels() {
            assert_eq!(format_period(&p("2023-03")), "Mar/2023");
            assert_eq!(format_period_full(&p("2023-03")), "Março de 2023");
            let date = NaiveDate::from_ymd_opt(2025, 1, 9).unwrap();
            assert_eq!(format_date_iso(&date), "2025-01-09");
            assert_eq!(format_date_br(&date), "09/01/2025");
        }
    }
}

/// Number formatting (pt-BR conventions)
pub mod numbers {
    /// Fixed decimals with a decimal comma and no grouping, e.g. "1234,50".
    /// Non-finite values render as "-".
    pub fn format_decimal_comma(value: f64, decimals: usize) -> String {
        if !value.is_finite() {
            return "-".to_string();
        }
        format!("{:.*}", decimals, value).replace('.', ",")
    }

    /// Currency in reais, e.g. "R$ 1.234,50". Non-finite values render as "-".
    pub fn format_currency(value: f64) -> String {
        if !value.is_finite() {
            return "-".to_string();
        }
        let fixed = format!("{:.2}", value.abs());
        let (integer, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
        let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
        for (i, digit) in integer.chars().enumerate() {
            if i > 0 && (integer.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(digit);
        }
        let sign = if value < 0.0 { "-" } else { "" };
        format!("{sign}R$ {grouped},{fraction}")
    }

    /// Signed percentage from a ratio, e.g. 0.123 -> "+12.3%".
    pub fn format_percent(ratio: f64, decimals: usize) -> String {
        if !ratio.is_finite() {
            return "-".to_string();
        }
        let sign = if ratio > 0.0 { "+" } else { "" };
        format!("{sign}{:.*}%", decimals, ratio * 100.0)
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_format_decimal_comma() {
            assert_eq!(format_decimal_comma(1234.5, 2), "1234,50");
            assert_eq!(format_decimal_comma(f64::NAN, 2), "-");
        }

        #[test]
        fn test_format_currency() {
            assert_eq!(format_currency(1234.5), "R$ 1.234,50");
            assert_eq!(format_currency(12.0), "R$ 12,00");
            assert_eq!(format_currency(1234567.891), "R$ 1.234.567,89");
            assert_eq!(format_currency(-5.0), "-R$ 5,00");
        }

        #[test]
        fn test_format_percent() {
            assert_eq!(format_percent(0.123, 1), "+12.3%");
            assert_eq!(format_percent(-0.05, 1), "-5.0%");
            assert_eq!(format_percent(0.0, 1), "0.0%");
        }
    }
}
