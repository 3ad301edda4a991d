use rand::Rng;

/// Twelve-digit public reference printed on every listing. Uniqueness is
/// enforced by the database; a collision fails the insert and the whole
/// submission, which at 10^12 codes is not a case worth retrying for.
pub fn generate_announcement_code() -> String {
    let mut rng = rand::rng();
    format!(
        "{:06}{:06}",
        rng.random_range(0..1_000_000u32),
        rng.random_range(0..1_000_000u32)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn announcement_codes_are_twelve_digits() {
        for _ in 0..50 {
            let code = generate_announcement_code();
            assert_eq!(code.len(), 12);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }
}
