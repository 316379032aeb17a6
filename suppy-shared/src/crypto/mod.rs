//! Cryptography helpers
//!
//! - [`cipher`]: authenticated encryption of client system passwords

pub mod cipher;
