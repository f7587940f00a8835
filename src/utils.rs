/// Round to two decimal places, the precision recorded in check logs and
/// reports.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Log file name for an endpoint: lowercased, spaces replaced with
/// underscores.
pub fn log_file_name(name: &str) -> String {
    format!("{}.log", name.to_lowercase().replace(' ', "_"))
}

/// Display name derived from a log file stem: underscores back to spaces,
/// each word capitalized.
pub fn display_name(stem: &str) -> String {
    stem.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
