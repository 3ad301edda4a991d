use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2,
};
use rand::distr::Alphanumeric;
use rand::Rng;

pub const GENERATED_PASSWORD_LEN: usize = 12;

/// Random first password for accounts created on the fly during a listing
/// submission. The plain value is only ever sent to the new user by email.
pub fn generate() -> String {
    let mut rng = rand::rng();
    (0..GENERATED_PASSWORD_LEN)
        .map(|_| rng.sample(Alphanumeric) as char)
        .collect()
}

pub fn hash(password: &str) -> Result<String, String> {
    let salt = SaltString::generate(&mut OsRng);
    let hashed = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| format!("Failed to hash password: {}", e))?;

    Ok(hashed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use argon2::password_hash::PasswordHash;
    use argon2::PasswordVerifier;

    #[test]
    fn generated_passwords_are_alphanumeric_and_sized() {
        let password = generate();
        assert_eq!(password.len(), GENERATED_PASSWORD_LEN);
        assert!(password.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn hash_verifies_against_the_original() {
        let password = generate();
        let hashed = hash(&password).unwrap();

        let parsed = PasswordHash::new(&hashed).unwrap();
        assert!(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok());
    }
}
