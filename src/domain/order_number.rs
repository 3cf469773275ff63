use chrono::Utc;
use rand::distributions::Alphanumeric;
use rand::Rng;

const SUFFIX_LEN: usize = 6;

/// Generate a human-readable order number: `ORD-YYYYMMDD-XXXXXX`.
///
/// The identifier space is not collision-free; callers must treat a
/// unique-constraint violation as a signal to regenerate and retry.
pub fn generate() -> String {
    let date = Utc::now().format("%Y%m%d");
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SUFFIX_LEN)
        .map(|b| (b as char).to_ascii_uppercase())
        .collect();
    format!("ORD-{date}-{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn has_expected_shape() {
        let number = generate();
        let parts: Vec<&str> = number.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "ORD");
        assert_eq!(parts[1].len(), 8);
        assert!(parts[1].chars().all(|c| c.is_ascii_digit()));
        assert_eq!(parts[2].len(), SUFFIX_LEN);
        assert!(parts[2]
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }

    #[test]
    fn consecutive_numbers_differ() {
        // 36^6 possible suffixes; two consecutive draws matching would be
        // a one-in-two-billion fluke.
        assert_ne!(generate(), generate());
    }
}
