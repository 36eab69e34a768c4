//! Utility functions for common operations.
//!
//! - **URL validation**: syntactic checks for discovery targets, plus an
//!   optional guard against localhost and private-network hosts
//!
//! # Examples
//!
//! ```
//! use feedscout::util::{validate_public_url, validate_url};
//!
//! // Any absolute http(s) URL with a host
//! let url = validate_url("https://example.com/blog/post").unwrap();
//!
//! // Same, but refusing to point at the local network
//! assert!(validate_public_url("http://10.0.0.1/").is_err());
//! ```

mod url_validator;

pub use url_validator::{validate_public_url, validate_url, UrlValidationError};
