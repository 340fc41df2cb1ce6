//! Password hashing for account credentials and journal locks.
//!
//! Account passwords, the per-user default journal-lock password and custom
//! per-entry lock passwords are stored only as salted Argon2id hashes in PHC
//! string format. Verification always goes through [`verify_password`];
//! nothing in the crate compares plaintext.
//!
//! # Example
//!
//! ```
//! use entryit::crypto::{hash_password, verify_password};
//!
//! let hash = hash_password("alicepw1!")?;
//! assert!(verify_password("alicepw1!", &hash)?);
//! assert!(!verify_password("wrong", &hash)?);
//! # Ok::<(), entryit::AppError>(())
//! ```

pub mod password;

pub use self::password::{hash_password, verify_password};
