//! Key limits shared by both engines.
//!
//! The LSM engine cannot store an empty key or one longer than
//! [`MAX_KEY_SIZE`], so every writable transaction checks keys on `put` and
//! `delete` and both engines accept exactly the same set. Reads take any key;
//! one that could never have been written is simply absent.

use super::{StorageError, StorageResult};

/// Longest key a store accepts, in bytes.
pub const MAX_KEY_SIZE: usize = u16::MAX as usize;

/// Check that `key` can be written.
///
/// # Errors
///
/// Returns [`StorageError::InvalidKey`] if the key is empty or longer than
/// [`MAX_KEY_SIZE`].
pub fn validate_key(key: &[u8]) -> StorageResult<()> {
    if key.is_empty() || key.len() > MAX_KEY_SIZE {
        return Err(StorageError::InvalidKey { len: key.len() });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_bounds() {
        assert!(validate_key(b"k").is_ok());
        assert!(validate_key(&vec![0u8; MAX_KEY_SIZE]).is_ok());

        assert!(matches!(validate_key(b""), Err(StorageError::InvalidKey { len: 0 })));
        let long = vec![0u8; MAX_KEY_SIZE + 1];
        assert!(matches!(
            validate_key(&long),
            Err(StorageError::InvalidKey { len }) if len == MAX_KEY_SIZE + 1
        ));
    }
}
