//! Dotted-path handling for tree navigation.
//!
//! Paths address descendant places relative to some starting place, with one
//! dot-separated segment per tree level: `"user.profile.name"` names the child
//! `user`, its child `profile`, and its child `name`.
//!
//! Segmentation is normalizing: empty components are filtered out, so leading,
//! trailing or doubled dots do not produce empty-named places and a path made
//! entirely of dots (or the empty string) addresses the starting place itself.
//!
//! # Examples
//!
//! ```
//! use placetree::path::segments;
//!
//! let parts: Vec<&str> = segments("user.profile.name").collect();
//! assert_eq!(parts, ["user", "profile", "name"]);
//!
//! assert_eq!(segments("").count(), 0);
//! assert_eq!(segments("...").count(), 0);
//! let parts: Vec<&str> = segments(".user..profile.").collect();
//! assert_eq!(parts, ["user", "profile"]);
//! ```

/// Iterate the non-empty segments of a dotted path, in tree order.
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('.').filter(|segment| !segment.is_empty())
}
