//! Number formatting for metric cards

const SUFFIXES: [&str; 5] = ["", "K", "M", "B", "T"];

/// Formats a counter as a signed delta: `"+n"` when positive, otherwise `"0"`.
///
/// ```
/// use nodes_admin_lib::format::number_value;
///
/// assert_eq!(number_value(5), "+5");
/// assert_eq!(number_value(0), "0");
/// assert_eq!(number_value(-3), "0");
/// ```
pub fn number_value(n: i64) -> String {
    if n > 0 {
        format!("+{}", n)
    } else {
        "0".to_string()
    }
}

/// Formats a byte count in compact notation with a narrow byte unit.
///
/// Values below ten in the chosen scale keep one decimal; larger ones are
/// rounded to whole units.
///
/// ```
/// use nodes_admin_lib::format::compact_bytes;
///
/// assert_eq!(compact_bytes(999), "999B");
/// assert_eq!(compact_bytes(1_500), "1.5KB");
/// assert_eq!(compact_bytes(12_000_000), "12MB");
/// ```
pub fn compact_bytes(n: u64) -> String {
    format!("{}B", compact(n))
}

/// Compact English notation (`999`, `1.5K`, `12M`, `3B`).
pub fn compact(n: u64) -> String {
    if n < 1000 {
        return n.to_string();
    }

    let mut scale = 0;
    let mut value = n as f64;
    while value >= 1000.0 && scale < SUFFIXES.len() - 1 {
        value /= 1000.0;
        scale += 1;
    }

    let mut rounded = round_compact(value);
    if rounded >= 1000.0 && scale < SUFFIXES.len() - 1 {
        scale += 1;
        rounded = round_compact(rounded / 1000.0);
    }

    let text = if rounded < 10.0 && rounded.fract() != 0.0 {
        format!("{:.1}", rounded)
    } else {
        format!("{:.0}", rounded)
    };
    format!("{}{}", text, SUFFIXES[scale])
}

fn round_compact(value: f64) -> f64 {
    if value < 10.0 {
        (value * 10.0).round() / 10.0
    } else {
        value.round()
    }
}
