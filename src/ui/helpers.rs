pub fn format_hours(minutes: i64) -> String {
    format!("{:.2}h", minutes as f64 / 60.0)
}

pub fn clamp_name(value: &str, width: usize) -> String {
    let value_len = value.chars().count();
    if value_len <= width {
        return format!("{value:<width$}", width = width);
    }
    let trimmed = value
        .chars()
        .take(width.saturating_sub(2))
        .collect::<String>();
    format!("{trimmed}..")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hours_render_with_two_decimals() {
        assert_eq!(format_hours(510), "8.50h");
        assert_eq!(format_hours(0), "0.00h");
    }

    #[test]
    fn long_names_are_clamped_with_ellipsis() {
        assert_eq!(clamp_name("Standup", 10), "Standup   ");
        assert_eq!(clamp_name("A very long session title", 10), "A very l..");
    }
}
