// ============================
// crates/backend-lib/src/auth/password.rs
// ============================
//! Password hashing, verification and policy checks.
use scrypt::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Scrypt,
};
use zeroize::Zeroize;

/// Minimum password length; checked before any semantic rule
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// The fixed special-character set the policy accepts
pub const SPECIAL_CHARS: &str = "@$!%*?&";

/// Hash a password using scrypt
pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Scrypt.hash_password(plain.as_bytes(), &salt)?.to_string();
    Ok(hash)
}

/// Verify a password against a hash
pub fn verify_password(hash: &str, plain: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };
    Scrypt
        .verify_password(plain.as_bytes(), &parsed_hash)
        .is_ok()
}

/// Securely hash a password and zeroize the original
pub fn hash_password_secure(plain: &mut String) -> anyhow::Result<String> {
    let hash = hash_password(plain)?;
    plain.zeroize();
    Ok(hash)
}

/// Check a candidate password against the account policy.
///
/// A too-short password is rejected on its own; otherwise every violated
/// rule is collected so the caller can report them together.
pub fn validate_password_policy(password: &str) -> Result<(), Vec<String>> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(vec![format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters long."
        )]);
    }

    let mut reasons = Vec::new();

    if !password.chars().any(|c| c.is_ascii_digit()) {
        reasons.push("Password must contain at least one digit.".to_string());
    }
    if !password.chars().any(char::is_lowercase) {
        reasons.push("Password must contain at least one lowercase letter.".to_string());
    }
    if !password.chars().any(char::is_uppercase) {
        reasons.push("Password must contain at least one uppercase letter.".to_string());
    }
    if !password.chars().any(|c| SPECIAL_CHARS.contains(c)) {
        reasons.push(
            "Password must contain at least one special character (e.g. @$!%*?&).".to_string(),
        );
    }
    // Kept as its own rule even though the case rules above imply it.
    if password == password.to_lowercase() || password == password.to_uppercase() {
        reasons.push("Password must contain both uppercase and lowercase letters.".to_string());
    }

    if reasons.is_empty() {
        Ok(())
    } else {
        Err(reasons)
    }
}
