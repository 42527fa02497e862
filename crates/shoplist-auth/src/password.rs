//! Password hashing with Argon2id

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use tracing::warn;

use crate::error::AuthError;

/// Valid Argon2id hash with the default cost parameters that no password
/// matches. Verified against whenever there is no usable stored hash.
const DUMMY_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$dGltaW5nX2F0dGFja19wcmV2ZW50aW9u$K8rI5T7VdQ8xkO0GqK5K2w";

/// Hash a password into a PHC string with a fresh random salt
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::PasswordHash(e.to_string()))
}

/// Whether Argon2 can run a full verification against this hash
fn is_argon2(hash: &PasswordHash<'_>) -> bool {
    argon2::Algorithm::new(hash.algorithm.as_str()).is_ok()
        && hash.salt.is_some()
        && hash.hash.is_some()
        && argon2::Params::try_from(hash).is_ok()
}

/// Hash to run the Argon2 check against, and whether a match may count
///
/// A stored value that is not a usable Argon2 hash is swapped for
/// [`DUMMY_HASH`] so the rejection costs the same as a wrong password.
fn hash_to_check(hash: &str) -> Option<(PasswordHash<'_>, bool)> {
    match PasswordHash::new(hash) {
        Ok(parsed) if is_argon2(&parsed) => return Some((parsed, true)),
        Ok(parsed) => warn!("Stored password hash uses unsupported scheme: {}", parsed.algorithm),
        Err(e) => warn!("Stored password hash could not be parsed: {}", e),
    }

    PasswordHash::new(DUMMY_HASH).ok().map(|dummy| (dummy, false))
}

/// Verify a password against a stored PHC string
///
/// A hash that cannot be parsed never matches.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let Some((parsed, genuine)) = hash_to_check(hash) else {
        return false;
    };

    let matches = Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok();

    genuine && matches
}

/// Verify against the stored hash, or burn an equivalent verification when
/// there is no stored hash. Returns `false` in the latter case.
pub fn verify_password_or_dummy(password: &str, hash: Option<&str>) -> bool {
    match hash {
        Some(hash) => verify_password(password, hash),
        None => {
            let _ = verify_password(password, DUMMY_HASH);
            false
        }
    }
}
