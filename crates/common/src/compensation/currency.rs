//! Rupee formatting for compensation figures

const LAKH: f64 = 100_000.0;
const CRORE: f64 = 10_000_000.0;

/// Group digits the Indian way: last three, then pairs (12,34,567)
fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }

    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();

    format!("{},{}", groups.join(","), tail)
}

/// Full amount in whole rupees, e.g. `Rs 12,34,567`
pub fn format_inr(amount: f64) -> String {
    let rounded = amount.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    let digits = format!("{:.0}", rounded.abs());
    format!("Rs {}{}", sign, group_indian(&digits))
}

/// Compact amount in lakhs/crores, falling back to [`format_inr`]
pub fn format_inr_compact(amount: f64) -> String {
    if amount >= CRORE {
        format!("Rs {:.1}Cr", amount / CRORE)
    } else if amount >= LAKH {
        format!("Rs {:.1}L", amount / LAKH)
    } else {
        format_inr(amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_inr() {
        assert_eq!(format_inr(0.0), "Rs 0");
        assert_eq!(format_inr(999.0), "Rs 999");
        assert_eq!(format_inr(1000.0), "Rs 1,000");
        assert_eq!(format_inr(99_999.4), "Rs 99,999");
        assert_eq!(format_inr(1_234_567.0), "Rs 12,34,567");
        assert_eq!(format_inr(-45_000.0), "Rs -45,000");
    }

    #[test]
    fn test_format_inr_compact() {
        assert_eq!(format_inr_compact(45_000.0), "Rs 45,000");
        assert_eq!(format_inr_compact(1_250_000.0), "Rs 12.5L");
        assert_eq!(format_inr_compact(25_000_000.0), "Rs 2.5Cr");
    }
}
