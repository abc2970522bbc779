//! Utility functions for common operations.
//!
//! - **Chunking**: fixed-size grouping for grid rows
//! - **Text processing**: entity decoding, control-char stripping and
//!   Unicode-aware truncation for terminal cells
//! - **URL validation**: scheme check before opening media in a browser
//!
//! # Examples
//!
//! ```
//! use snack_tv::util::{chunk, decode_html, truncate_to_width, validate_url_for_open};
//!
//! let rows = chunk(&[1, 2, 3, 4, 5], 4).unwrap();
//! assert_eq!(rows.len(), 2);
//!
//! assert_eq!(decode_html("Fish &amp; Chips"), "Fish & Chips");
//! assert_eq!(truncate_to_width("Long video title", 9), "Long v...");
//! assert!(validate_url_for_open("file:///etc/passwd").is_err());
//! ```

mod chunk;
mod text;
mod url_validator;

pub use chunk::{chunk, ChunkError};
pub use text::{decode_html, display_width, strip_control_chars, truncate_to_width};
pub use url_validator::{validate_url_for_open, UrlValidationError};
