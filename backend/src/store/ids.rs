//! Identifier conversion at the storage boundary.
//!
//! Ids are `Uuid` everywhere in the application and 16-byte `BYTEA` values in
//! the database, in RFC 4122 byte order.

use uuid::Uuid;

use crate::error::{AppError, AppResult};

pub fn to_bytes(id: Uuid) -> Vec<u8> {
    id.as_bytes().to_vec()
}

pub fn from_bytes(bytes: &[u8]) -> AppResult<Uuid> {
    Uuid::from_slice(bytes).map_err(|_| {
        AppError::Internal(format!(
            "Stored identifier has {} bytes, expected 16",
            bytes.len()
        ))
    })
}
