//! Post-render HTML transformations.
//!
//! - [`anchors`] — wraps the content of `id`-carrying headings in a
//!   self-referencing `<a class="header">` link.
//! - [`strip`] — removes marker-classed tables (changelogs) from a fragment.
//!
//! Both are total functions of their input: they never fail, and anything
//! they do not recognize passes through.

pub mod anchors;
pub mod strip;

pub use anchors::{DEFAULT_ANCHOR_CLASS, HeadingAnchorizer, anchorize};
pub use strip::{DEFAULT_MARKER_CLASS, TableStripper, strip_tables};
