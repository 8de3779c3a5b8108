// Password hashing with bcrypt; the work factor comes from configuration

use bcrypt::{hash, verify, BcryptError};

/// Hashes a password
///
/// # Example
/// ```
/// use comptoir_api::auth::password::{hash_password, verify_password};
///
/// let hash = hash_password("correct horse", 4).expect("valid hash");
/// assert!(verify_password("correct horse", &hash).unwrap());
/// ```
pub fn hash_password(password: &str, cost: u32) -> Result<String, BcryptError> {
    hash(password, cost)
}

/// Checks a password against a stored hash; a malformed hash is an error
pub fn verify_password(password: &str, hash: &str) -> Result<bool, BcryptError> {
    verify(password, hash)
}
