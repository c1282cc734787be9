//! Document content model.
//!
//! A [`Document`] owns one [`Page`] whose regions form a tree of
//! [`ContentNode`]s. Each node has a [`ContentKind`], a validated id and an
//! attribute bag instantiated from the document's format model. Reading
//! order, layers and relations refer to regions by id.

mod document;
mod kind;
mod layout;
mod node;
mod page;

pub use document::{Document, Metadata};
pub use kind::ContentKind;
pub use layout::{
    GroupKind, GroupMember, Layer, Layers, ReadingGroup, ReadingOrder, Relation, RelationKind,
    Relations,
};
pub use node::{ContentNode, TextEquiv};
pub use page::Page;
