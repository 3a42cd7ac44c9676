//! Text helpers shared by extraction and rendering.
//!
//! - **Tag stripping**: the `<...>` filter applied to description fallbacks
//! - **HTML escaping**: opt-in hardening applied at render time only
//!
//! # Examples
//!
//! ```
//! use rssagg::util::{escape_html, strip_tags};
//!
//! assert_eq!(strip_tags("<b>Breaking</b>"), "Breaking");
//! assert_eq!(escape_html("Tom & Jerry"), "Tom &amp; Jerry");
//! ```

mod text;

pub use text::{escape_html, strip_tags};
