//! Tags naming objective and constraint streams.
//!
//! Every dataset and model tracked by an
//! [`AskTellOptimizer`](crate::AskTellOptimizer) is keyed by a [`Tag`]. The
//! reserved [`OBJECTIVE`] tag marks the primary objective and is the key
//! used whenever a bare dataset or model is supplied without an explicit
//! mapping.
//!
//! Batched acquisition rules route per-batch-element data through
//! [`LocalizedTag`], a tag qualified with a local index. Localized tags are
//! encoded into plain tags as `<base>@@<index>`; the encoding is canonical,
//! so any tag of that shape *is* a localized tag.

use core::fmt;
use std::borrow::Cow;

/// Separator between the base tag and the local index in the string
/// encoding of a [`LocalizedTag`].
const SEPARATOR: &str = "@@";

/// Identifier naming one objective or constraint's dataset and model pair.
///
/// Tags compare, hash, and order by their string content, so they can key
/// any mapping type.
///
/// # Examples
///
/// ```
/// use asktell::{Tag, OBJECTIVE};
///
/// let constraint = Tag::new("CONSTRAINT");
/// assert_ne!(constraint, OBJECTIVE);
/// assert_eq!(constraint.as_str(), "CONSTRAINT");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct Tag(Cow<'static, str>);

/// The reserved tag marking the primary objective.
///
/// Single-dataset construction and the default acquisition rule operate on
/// this tag.
pub const OBJECTIVE: Tag = Tag(Cow::Borrowed("OBJECTIVE"));

impl Tag {
    /// Creates a tag from a string.
    #[must_use]
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    /// Returns the tag's string content.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Tag {
    fn from(name: &str) -> Self {
        Self(Cow::Owned(name.to_owned()))
    }
}

impl From<String> for Tag {
    fn from(name: String) -> Self {
        Self(Cow::Owned(name))
    }
}

/// A [`Tag`] qualified with an optional batch-local index.
///
/// `LocalizedTag(base, Some(i))` names the slice of data belonging to batch
/// element `i` of `base`; `local_index == None` is an unlocalized view of a
/// plain tag. The string encoding is `<base>@@<index>` and round-trips
/// exactly through [`from_tag`](Self::from_tag) and
/// [`to_tag`](Self::to_tag).
///
/// # Examples
///
/// ```
/// use asktell::{LocalizedTag, OBJECTIVE};
///
/// let local = LocalizedTag::new(OBJECTIVE, 3);
/// let tag = local.to_tag();
/// assert_eq!(tag.as_str(), "OBJECTIVE@@3");
/// assert_eq!(LocalizedTag::from_tag(&tag), local);
///
/// let plain = LocalizedTag::from_tag(&OBJECTIVE);
/// assert_eq!(plain.local_index, None);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LocalizedTag {
    /// The base tag.
    pub global: Tag,
    /// The batch-local index, if any.
    pub local_index: Option<usize>,
}

impl LocalizedTag {
    /// Creates a localized tag for batch element `local_index` of `global`.
    #[must_use]
    pub fn new(global: impl Into<Tag>, local_index: usize) -> Self {
        Self {
            global: global.into(),
            local_index: Some(local_index),
        }
    }

    /// Parses a plain tag into its localized form.
    ///
    /// A tag of the shape `<base>@@<index>` (non-empty base, all-digit
    /// index) parses to `Some(index)`; anything else is an unlocalized view
    /// of the whole tag.
    #[must_use]
    pub fn from_tag(tag: &Tag) -> Self {
        if let Some((base, index)) = tag.as_str().rsplit_once(SEPARATOR) {
            if !base.is_empty() && !index.is_empty() && index.bytes().all(|b| b.is_ascii_digit()) {
                if let Ok(local_index) = index.parse() {
                    return Self {
                        global: Tag::from(base),
                        local_index: Some(local_index),
                    };
                }
            }
        }
        Self {
            global: tag.clone(),
            local_index: None,
        }
    }

    /// Formats this localized tag back into a plain tag.
    #[must_use]
    pub fn to_tag(&self) -> Tag {
        match self.local_index {
            Some(index) => Tag::from(format!("{}{SEPARATOR}{index}", self.global)),
            None => self.global.clone(),
        }
    }

    /// Returns `true` if this tag carries a local index.
    #[must_use]
    pub fn is_local(&self) -> bool {
        self.local_index.is_some()
    }
}

impl fmt::Display for LocalizedTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.local_index {
            Some(index) => write!(f, "{}{SEPARATOR}{index}", self.global),
            None => fmt::Display::fmt(&self.global, f),
        }
    }
}
