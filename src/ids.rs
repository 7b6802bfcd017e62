//! Newtype identifiers used across the crate.
//!
//! All identifiers are process-wide, monotonically assigned, non-negative
//! integers minted by [`crate::innovation::InnovationRegistry`]. Wrapping
//! them keeps a stray `node_id == link_id` comparison from compiling.

use std::fmt;

macro_rules! id_type {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
        pub struct $name(pub usize);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<usize> for $name {
            fn from(value: usize) -> Self {
                $name(value)
            }
        }

        impl From<$name> for usize {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

id_type!(NodeId);
id_type!(LinkId);
id_type!(SpeciesId);
id_type!(GenomeId);

/// The unordered-by-structure key used to look up link innovations:
/// `(in_node, out_node)`.
pub type SLink = (NodeId, NodeId);
