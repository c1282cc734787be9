//! Page-level structures that refer to regions by id: reading order,
//! layers and relations.

use crate::ident::Id;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// Whether the members of a reading order group have a defined sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupKind {
    /// Members are read in order
    #[default]
    Ordered,
    /// Members have no defined sequence
    Unordered,
}

/// A member of a reading order group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "member", rename_all = "lowercase")]
pub enum GroupMember {
    /// Reference to a region
    Region {
        /// Referenced region id
        region: Id,
    },
    /// Nested group
    Group(ReadingGroup),
}

/// A reading order group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadingGroup {
    /// Group id
    pub id: Id,
    /// Ordered or unordered
    pub kind: GroupKind,
    /// Optional caption
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    /// Region references and nested groups
    #[serde(default)]
    pub members: Vec<GroupMember>,
}

impl ReadingGroup {
    /// Create an empty group.
    pub fn new(id: Id, kind: GroupKind) -> Self {
        Self {
            id,
            kind,
            caption: None,
            members: Vec::new(),
        }
    }

    /// Set the caption.
    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    /// Append a region reference.
    pub fn add_region(&mut self, region: Id) {
        self.members.push(GroupMember::Region { region });
    }

    /// Append a nested group.
    pub fn add_group(&mut self, group: ReadingGroup) {
        self.members.push(GroupMember::Group(group));
    }

    /// Check if the region is referenced in this group or a nested one.
    pub fn contains(&self, region: &Id) -> bool {
        self.members.iter().any(|m| match m {
            GroupMember::Region { region: r } => r == region,
            GroupMember::Group(g) => g.contains(region),
        })
    }

    /// Find a group by id in this group tree.
    pub fn find_group_mut(&mut self, id: &str) -> Option<&mut ReadingGroup> {
        if self.id.as_str() == id {
            return Some(self);
        }
        self.members.iter_mut().find_map(|m| match m {
            GroupMember::Group(g) => g.find_group_mut(id),
            GroupMember::Region { .. } => None,
        })
    }

    /// Referenced regions in reading sequence.
    pub fn region_ids(&self) -> Vec<&Id> {
        let mut out = Vec::new();
        self.collect_regions(&mut out);
        out
    }

    fn collect_regions<'a>(&'a self, out: &mut Vec<&'a Id>) {
        for member in &self.members {
            match member {
                GroupMember::Region { region } => out.push(region),
                GroupMember::Group(g) => g.collect_regions(out),
            }
        }
    }

    /// Ids of this group and all nested groups.
    pub fn group_ids(&self) -> Vec<&Id> {
        let mut out = vec![&self.id];
        for member in &self.members {
            if let GroupMember::Group(g) = member {
                out.extend(g.group_ids());
            }
        }
        out
    }

    fn remove_refs(&mut self, region: &Id) -> usize {
        let before = self.members.len();
        self.members
            .retain(|m| !matches!(m, GroupMember::Region { region: r } if r == region));
        let mut removed = before - self.members.len();
        for member in &mut self.members {
            if let GroupMember::Group(g) = member {
                removed += g.remove_refs(region);
            }
        }
        removed
    }

    fn rename_refs(&mut self, old: &Id, new: &Id) {
        for member in &mut self.members {
            match member {
                GroupMember::Region { region } if region == old => *region = new.clone(),
                GroupMember::Group(g) => g.rename_refs(old, new),
                GroupMember::Region { .. } => {}
            }
        }
    }
}

/// Reading order of a page, rooted in a single group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadingOrder {
    /// Root group
    pub root: ReadingGroup,
}

impl ReadingOrder {
    /// Create with a root group.
    pub fn new(root: ReadingGroup) -> Self {
        Self { root }
    }

    /// Check if a region takes part in the reading order.
    pub fn contains(&self, region: &Id) -> bool {
        self.root.contains(region)
    }

    /// Regions in reading sequence.
    pub fn region_ids(&self) -> Vec<&Id> {
        self.root.region_ids()
    }

    /// Drop every reference to a region; returns the number removed.
    pub fn remove_refs(&mut self, region: &Id) -> usize {
        self.root.remove_refs(region)
    }

    /// Point references at a renamed region.
    pub fn rename_refs(&mut self, old: &Id, new: &Id) {
        self.root.rename_refs(old, new)
    }
}

/// A layer: a set of regions drawn at one z-index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    id: Id,
    z_index: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    caption: Option<String>,
    #[serde(default)]
    regions: IndexSet<Id>,
}

impl Layer {
    /// Create an empty layer.
    pub fn new(id: Id, z_index: i32) -> Self {
        Self {
            id,
            z_index,
            caption: None,
            regions: IndexSet::new(),
        }
    }

    /// Set the caption.
    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    /// Add region references.
    pub fn with_regions<I>(mut self, regions: I) -> Self
    where
        I: IntoIterator<Item = Id>,
    {
        self.regions.extend(regions);
        self
    }

    /// Layer id.
    pub fn id(&self) -> &Id {
        &self.id
    }

    /// Drawing order; higher values are drawn on top.
    pub fn z_index(&self) -> i32 {
        self.z_index
    }

    /// Caption.
    pub fn caption(&self) -> Option<&str> {
        self.caption.as_deref()
    }

    /// Add a region reference. Returns false if already present.
    pub fn add_region(&mut self, region: Id) -> bool {
        self.regions.insert(region)
    }

    /// Remove a region reference.
    pub fn remove_region(&mut self, region: &Id) -> bool {
        self.regions.shift_remove(region)
    }

    /// Check membership of a region.
    pub fn contains(&self, region: &Id) -> bool {
        self.regions.contains(region)
    }

    /// Referenced regions in insertion order.
    pub fn regions(&self) -> impl Iterator<Item = &Id> {
        self.regions.iter()
    }

    /// Number of referenced regions.
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// Check if the layer references no region.
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    fn rename_ref(&mut self, old: &Id, new: &Id) {
        if let Some(index) = self.regions.get_index_of(old) {
            self.regions.shift_remove_index(index);
            self.regions.shift_insert(index, new.clone());
        }
    }
}

/// The layers of a page, kept sorted by z-index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Layers {
    layers: Vec<Layer>,
}

impl Layers {
    /// Create empty.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a layer keeping z-index order; equal z-indices keep insertion order.
    pub fn add(&mut self, layer: Layer) {
        let pos = self
            .layers
            .partition_point(|l| l.z_index <= layer.z_index);
        self.layers.insert(pos, layer);
    }

    /// Get a layer by id.
    pub fn get(&self, id: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id.as_str() == id)
    }

    /// Get a layer by id mutably.
    pub fn get_mut(&mut self, id: &str) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|l| l.id.as_str() == id)
    }

    /// Remove a layer by id.
    pub fn remove(&mut self, id: &str) -> Option<Layer> {
        let pos = self.layers.iter().position(|l| l.id.as_str() == id)?;
        Some(self.layers.remove(pos))
    }

    /// The topmost layer containing the region.
    pub fn layer_of(&self, region: &Id) -> Option<&Layer> {
        self.layers.iter().rev().find(|l| l.contains(region))
    }

    /// Layers from bottom to top.
    pub fn iter(&self) -> std::slice::Iter<'_, Layer> {
        self.layers.iter()
    }

    /// Number of layers.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Check if there are no layers.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Drop a region from all layers; returns the number of layers touched.
    pub fn remove_refs(&mut self, region: &Id) -> usize {
        self.layers
            .iter_mut()
            .filter_map(|l| l.remove_region(region).then_some(()))
            .count()
    }

    /// Point references at a renamed region.
    pub fn rename_refs(&mut self, old: &Id, new: &Id) {
        for layer in &mut self.layers {
            layer.rename_ref(old, new);
        }
    }
}

/// Kind of a relation between two regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationKind {
    /// Logical link, e.g. caption to image
    Link,
    /// Parts of one logical unit split across regions
    Join,
}

/// A directed relation between two regions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relation {
    /// Relation id
    pub id: Id,
    /// Link or join
    pub kind: RelationKind,
    /// Free-form subtype
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom: Option<String>,
    /// Source region
    pub source: Id,
    /// Target region
    pub target: Id,
}

impl Relation {
    /// Check if the relation refers to a region at either end.
    pub fn involves(&self, region: &Id) -> bool {
        &self.source == region || &self.target == region
    }
}

/// Relations of a page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Relations {
    items: Vec<Relation>,
}

impl Relations {
    /// Create empty.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a relation.
    pub fn add(&mut self, relation: Relation) {
        self.items.push(relation);
    }

    /// Relations touching a region.
    pub fn involving<'a>(&'a self, region: &'a Id) -> impl Iterator<Item = &'a Relation> + 'a {
        self.items.iter().filter(move |r| r.involves(region))
    }

    /// Remove a relation by id.
    pub fn remove(&mut self, id: &str) -> Option<Relation> {
        let pos = self.items.iter().position(|r| r.id.as_str() == id)?;
        Some(self.items.remove(pos))
    }

    /// Drop relations touching a region and return them.
    pub fn remove_refs(&mut self, region: &Id) -> Vec<Relation> {
        let (removed, kept) = std::mem::take(&mut self.items)
            .into_iter()
            .partition(|r| r.involves(region));
        self.items = kept;
        removed
    }

    /// Point references at a renamed region.
    pub fn rename_refs(&mut self, old: &Id, new: &Id) {
        for relation in &mut self.items {
            if &relation.source == old {
                relation.source = new.clone();
            }
            if &relation.target == old {
                relation.target = new.clone();
            }
        }
    }

    /// All relations.
    pub fn iter(&self) -> std::slice::Iter<'_, Relation> {
        self.items.iter()
    }

    /// Number of relations.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if there are no relations.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
