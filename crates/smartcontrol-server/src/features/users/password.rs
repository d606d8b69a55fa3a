//! bcrypt hashing off the async executor

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("Password task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub async fn hash(password: String) -> Result<String, PasswordError> {
    let hashed = tokio::task::spawn_blocking(move || bcrypt::hash(password, bcrypt::DEFAULT_COST))
        .await??;
    Ok(hashed)
}

/// `Ok(false)` for a mismatch and for a stored value that is not a bcrypt hash
pub async fn verify(password: String, stored_hash: String) -> Result<bool, PasswordError> {
    let outcome = tokio::task::spawn_blocking(move || bcrypt::verify(password, &stored_hash)).await?;
    match outcome {
        Ok(matches) => Ok(matches),
        Err(e) => {
            tracing::warn!(error = %e, "Stored password is not a valid bcrypt hash");
            Ok(false)
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hash_then_verify() {
        let hashed = hash("s3cret".into()).await.unwrap();
        assert!(hashed.starts_with("$2"));
        assert!(verify("s3cret".into(), hashed.clone()).await.unwrap());
        assert!(!verify("wrong".into(), hashed).await.unwrap());
    }

    #[tokio::test]
    async fn test_plaintext_stored_value_never_matches() {
        assert!(!verify("admin".into(), "admin".into()).await.unwrap());
    }
}
