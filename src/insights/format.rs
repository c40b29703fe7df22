pub fn format_duration(total_minutes: f64) -> String {
    let safe_minutes = if total_minutes.is_finite() {
        total_minutes.round().max(0.0) as u64
    } else {
        0
    };
    let hours = safe_minutes / 60;
    let minutes = safe_minutes % 60;
    match (hours, minutes) {
        (0, minutes) => format!("{minutes} min"),
        (hours, 0) => format!("{hours} hr"),
        (hours, minutes) => format!("{hours} hr {minutes} min"),
    }
}

pub fn format_number(value: f64) -> String {
    format_decimal(value, 0)
}

pub fn format_decimal(value: f64, fraction_digits: u32) -> String {
    let safe_value = if value.is_finite() { value } else { 0.0 };
    let scale = 10u64.pow(fraction_digits);
    let scaled = (safe_value.abs() * scale as f64).round() as u64;
    let whole = scaled / scale;
    let fraction = scaled % scale;

    let mut formatted = String::new();
    if safe_value < 0.0 && scaled > 0 {
        formatted.push('-');
    }
    formatted.push_str(&group_thousands(whole));
    if fraction_digits > 0 {
        formatted.push('.');
        formatted.push_str(&format!("{:0width$}", fraction, width = fraction_digits as usize));
    }
    formatted
}

pub fn format_kilometers(distance_km: f64) -> String {
    format!("{} km", format_decimal(distance_km.max(0.0), 1))
}

/// Formats a fraction (`0.25`) as a percentage (`25.0%`).
pub fn format_percentage(value: f64) -> String {
    let safe_value = if value.is_finite() { value } else { 0.0 };
    format!("{}%", format_decimal(safe_value * 100.0, 1))
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_uses_hours_and_minutes() {
        assert_eq!(format_duration(45.0), "45 min");
        assert_eq!(format_duration(60.0), "1 hr");
        assert_eq!(format_duration(125.0), "2 hr 5 min");
        assert_eq!(format_duration(0.0), "0 min");
    }

    #[test]
    fn duration_rounds_and_floors_at_zero() {
        assert_eq!(format_duration(21.43), "21 min");
        assert_eq!(format_duration(-10.0), "0 min");
        assert_eq!(format_duration(f64::NAN), "0 min");
    }

    #[test]
    fn decimal_groups_thousands() {
        assert_eq!(format_decimal(8580.0, 1), "8,580.0");
        assert_eq!(format_decimal(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_decimal(999.0, 0), "999");
        assert_eq!(format_number(520.0), "520");
        assert_eq!(format_number(1651.65), "1,652");
    }

    #[test]
    fn decimal_rounds_half_away_from_zero() {
        assert_eq!(format_decimal(2.5, 0), "3");
        assert_eq!(format_decimal(0.25, 1), "0.3");
        assert_eq!(format_decimal(-2.5, 0), "-3");
    }

    #[test]
    fn decimal_handles_non_finite_and_negative_zero() {
        assert_eq!(format_decimal(f64::INFINITY, 1), "0.0");
        assert_eq!(format_decimal(-0.01, 1), "0.0");
    }

    #[test]
    fn kilometers_and_percentages() {
        assert_eq!(format_kilometers(16.5), "16.5 km");
        assert_eq!(format_kilometers(-3.0), "0.0 km");
        assert_eq!(format_percentage(15.0 / 45.0), "33.3%");
        assert_eq!(format_percentage(f64::NAN), "0.0%");
    }
}
