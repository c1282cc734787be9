//! Document-level types.

use super::node::remove_from;
use super::{
    ContentKind, ContentNode, GroupKind, Layer, Page, ReadingGroup, ReadingOrder, Relation,
    RelationKind,
};
use crate::error::{Error, Result};
use crate::ident::{Id, IdRegistry};
use crate::iter::{ContentIterator, IterFilter, TextIterator};
use crate::schema::FormatModel;
use crate::value::VariableMap;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Prefix of generated reading order group ids.
const GROUP_PREFIX: &str = "ro";
/// Prefix of generated layer ids.
const LAYER_PREFIX: &str = "lay";
/// Prefix of generated relation ids.
const RELATION_PREFIX: &str = "rel";

/// A page-content document.
///
/// Owns the content tree, the id registry scoping its identifiers and a
/// shared handle on the format model its attribute bags come from. Every
/// structural change goes through the document so that the registry and the
/// id references (reading order, layers, relations) stay consistent.
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    /// Document metadata
    pub metadata: Metadata,

    page: Page,

    #[serde(skip)]
    registry: IdRegistry,

    #[serde(skip)]
    model: Arc<FormatModel>,
}

impl Document {
    /// Create a document with an empty page.
    pub fn new(model: Arc<FormatModel>, image_filename: impl Into<String>, width: u32, height: u32) -> Self {
        let attributes = model
            .instantiate(Page::SCHEMA_TYPE)
            .unwrap_or_else(|| VariableMap::new(Page::SCHEMA_TYPE));
        Self {
            metadata: Metadata::new(),
            page: Page::new(image_filename, width, height, attributes),
            registry: IdRegistry::new(),
            model,
        }
    }

    /// Assemble a document from an existing page, registering every id in it.
    ///
    /// Fails with [`Error::DuplicateId`] if the page reuses an identifier.
    pub fn from_page(model: Arc<FormatModel>, metadata: Metadata, page: Page) -> Result<Self> {
        let mut registry = IdRegistry::new();
        for node in page.iter(IterFilter::new()) {
            registry.register_id(node.id(), None)?;
        }
        if let Some(ref order) = page.reading_order {
            for id in order.root.group_ids() {
                registry.register_id(id, None)?;
            }
        }
        for layer in page.layers.iter() {
            registry.register_id(layer.id(), None)?;
        }
        for relation in page.relations.iter() {
            registry.register_id(&relation.id, None)?;
        }
        log::debug!("Assembled document with {} identifiers", registry.len());

        Ok(Self {
            metadata,
            page,
            registry,
            model,
        })
    }

    /// The page.
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// Page attributes.
    pub fn page_attributes_mut(&mut self) -> &mut VariableMap {
        &mut self.page.attributes
    }

    /// Identifier registry of this document.
    pub fn registry(&self) -> &IdRegistry {
        &self.registry
    }

    /// Format model shared with other documents of the same version.
    pub fn model(&self) -> &Arc<FormatModel> {
        &self.model
    }

    /// Create a node of `kind` with template attributes and a generated id.
    ///
    /// Without `parent` the node becomes a top-level region.
    pub fn create_node(&mut self, kind: ContentKind, parent: Option<&str>) -> Result<Id> {
        self.check_placement(kind, parent)?;
        let node = ContentNode::create(kind, &self.model, &mut self.registry)?;
        let id = node.id().clone();
        self.insert(node, parent)?;
        self.touch();
        Ok(id)
    }

    /// Like [`create_node`](Self::create_node) but prefers `candidate` as id.
    ///
    /// A taken or malformed candidate is replaced by a generated id; the
    /// returned id is the one actually used.
    pub fn create_node_with_id(
        &mut self,
        kind: ContentKind,
        parent: Option<&str>,
        candidate: &str,
    ) -> Result<Id> {
        self.check_placement(kind, parent)?;
        let id = self
            .registry
            .register_or_create_new_id(candidate, Some(kind.id_prefix()))?;
        let node = ContentNode::from_template(id.clone(), kind, &self.model);
        self.insert(node, parent)?;
        self.touch();
        Ok(id)
    }

    /// Attach a detached subtree, registering all of its ids.
    ///
    /// On failure neither the tree nor the registry changes.
    pub fn attach(&mut self, node: ContentNode, parent: Option<&str>) -> Result<()> {
        self.check_placement(node.kind(), parent)?;

        let ids = node.subtree_ids();
        for (i, id) in ids.iter().enumerate() {
            if let Err(e) = self.registry.register_id(id, None) {
                for done in &ids[..i] {
                    self.registry.unregister_id(done);
                }
                return Err(e);
            }
        }

        self.insert(node, parent)?;
        self.touch();
        Ok(())
    }

    /// Detach a node with its subtree.
    ///
    /// The subtree's ids are released, and references to them are dropped
    /// from the reading order, the layers and the relations.
    pub fn remove(&mut self, id: &str) -> Result<ContentNode> {
        let node = remove_from(&mut self.page.regions, id)
            .ok_or_else(|| Error::UnknownId(id.to_string()))?;

        for removed in node.subtree_ids() {
            self.registry.unregister_id(&removed);
            if let Some(ref mut order) = self.page.reading_order {
                order.remove_refs(&removed);
            }
            self.page.layers.remove_refs(&removed);
            for relation in self.page.relations.remove_refs(&removed) {
                self.registry.unregister_id(&relation.id);
            }
        }
        log::debug!("Removed {} '{}'", node.kind(), node.id());
        self.touch();
        Ok(node)
    }

    /// Move a node with its subtree under a new parent.
    pub fn move_node(&mut self, id: &str, new_parent: Option<&str>) -> Result<()> {
        let node = self
            .page
            .find(id)
            .ok_or_else(|| Error::UnknownId(id.to_string()))?;
        if let Some(parent) = new_parent {
            if node.find(parent).is_some() {
                return Err(Error::Other(format!(
                    "cannot move '{}' into its own subtree",
                    id
                )));
            }
        }
        self.check_placement(node.kind(), new_parent)?;

        let node = remove_from(&mut self.page.regions, id)
            .ok_or_else(|| Error::UnknownId(id.to_string()))?;
        self.insert(node, new_parent)?;
        self.touch();
        Ok(())
    }

    /// Give a node a new identifier.
    ///
    /// References to the old id are updated. Fails without changes if the
    /// new id is malformed or already in use.
    pub fn rename(&mut self, old: &str, new: &str) -> Result<()> {
        let new_id = Id::new(new)?;
        let node = self
            .page
            .find_mut(old)
            .ok_or_else(|| Error::UnknownId(old.to_string()))?;
        let old_id = node.id().clone();

        self.registry.register_id(&new_id, Some(&old_id))?;
        node.replace_id(new_id.clone());

        if let Some(ref mut order) = self.page.reading_order {
            order.rename_refs(&old_id, &new_id);
        }
        self.page.layers.rename_refs(&old_id, &new_id);
        self.page.relations.rename_refs(&old_id, &new_id);
        self.touch();
        Ok(())
    }

    /// Find a node by id.
    pub fn find(&self, id: &str) -> Option<&ContentNode> {
        self.page.find(id)
    }

    /// Find a node by id mutably.
    pub fn find_mut(&mut self, id: &str) -> Option<&mut ContentNode> {
        self.page.find_mut(id)
    }

    /// Iterate all nodes in pre-order.
    pub fn iter(&self) -> ContentIterator<'_> {
        self.page.iter(IterFilter::new())
    }

    /// Iterate nodes matching a filter in pre-order.
    pub fn iter_filtered<'a>(&'a self, filter: IterFilter<'a>) -> ContentIterator<'a> {
        self.page.iter(filter)
    }

    /// Iterate the lines, words and glyphs below a node.
    pub fn text_iter<'a>(&'a self, id: &str, filter: IterFilter<'a>) -> Result<TextIterator<'a>> {
        let node = self
            .page
            .find(id)
            .ok_or_else(|| Error::UnknownId(id.to_string()))?;
        Ok(TextIterator::within(node, filter))
    }

    /// Attributes of a node restricted to what the model allows for its kind.
    pub fn filtered_attributes(&self, id: &str) -> Result<VariableMap> {
        let node = self
            .page
            .find(id)
            .ok_or_else(|| Error::UnknownId(id.to_string()))?;
        Ok(self
            .model
            .filter_attributes(node.attributes(), node.kind().schema_type_name()))
    }

    /// Add a reading order group.
    ///
    /// Without `parent` the group becomes the root, or a child of the root
    /// when one exists.
    pub fn add_reading_group(&mut self, kind: GroupKind, parent: Option<&str>) -> Result<Id> {
        if let Some(parent) = parent {
            let exists = self
                .page
                .reading_order
                .as_mut()
                .and_then(|o| o.root.find_group_mut(parent))
                .is_some();
            if !exists {
                return Err(Error::UnknownId(parent.to_string()));
            }
        }

        let id = self.registry.create_id(Some(GROUP_PREFIX))?;
        let group = ReadingGroup::new(id.clone(), kind);
        match (parent, self.page.reading_order.as_mut()) {
            (Some(parent), Some(order)) => {
                if let Some(target) = order.root.find_group_mut(parent) {
                    target.add_group(group);
                }
            }
            (None, Some(order)) => order.root.add_group(group),
            (_, None) => self.page.reading_order = Some(ReadingOrder::new(group)),
        }
        self.touch();
        Ok(id)
    }

    /// Append a region reference to a reading order group.
    pub fn add_to_reading_group(&mut self, group: &str, region: &str) -> Result<()> {
        let region = self.region_id(region)?;
        let target = self
            .page
            .reading_order
            .as_mut()
            .and_then(|o| o.root.find_group_mut(group))
            .ok_or_else(|| Error::UnknownId(group.to_string()))?;
        target.add_region(region);
        self.touch();
        Ok(())
    }

    /// Add a layer over existing regions.
    pub fn add_layer(&mut self, z_index: i32, regions: &[&str]) -> Result<Id> {
        let refs = regions
            .iter()
            .map(|r| self.region_id(r))
            .collect::<Result<Vec<_>>>()?;
        let id = self.registry.create_id(Some(LAYER_PREFIX))?;
        self.page
            .layers
            .add(Layer::new(id.clone(), z_index).with_regions(refs));
        self.touch();
        Ok(id)
    }

    /// Add a relation between two existing nodes.
    pub fn add_relation(&mut self, kind: RelationKind, source: &str, target: &str) -> Result<Id> {
        let source = self.region_id(source)?;
        let target = self.region_id(target)?;
        let id = self.registry.create_id(Some(RELATION_PREFIX))?;
        self.page.relations.add(Relation {
            id: id.clone(),
            kind,
            custom: None,
            source,
            target,
        });
        self.touch();
        Ok(id)
    }

    /// Serialize the document as JSON.
    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        };
        json.map_err(|e| Error::Other(e.to_string()))
    }

    fn region_id(&self, id: &str) -> Result<Id> {
        self.page
            .find(id)
            .map(|n| n.id().clone())
            .ok_or_else(|| Error::UnknownId(id.to_string()))
    }

    fn check_placement(&self, kind: ContentKind, parent: Option<&str>) -> Result<()> {
        match parent {
            None if kind.is_region() => Ok(()),
            None => Err(Error::InvalidChild {
                parent: "Page".to_string(),
                child: kind.to_string(),
            }),
            Some(parent) => {
                let parent = self
                    .page
                    .find(parent)
                    .ok_or_else(|| Error::UnknownId(parent.to_string()))?;
                if parent.kind().accepts_child(kind) {
                    Ok(())
                } else {
                    Err(Error::InvalidChild {
                        parent: parent.kind().to_string(),
                        child: kind.to_string(),
                    })
                }
            }
        }
    }

    fn insert(&mut self, node: ContentNode, parent: Option<&str>) -> Result<()> {
        match parent {
            None => {
                self.page.regions.push(node);
                Ok(())
            }
            Some(parent) => self
                .page
                .find_mut(parent)
                .ok_or_else(|| Error::UnknownId(parent.to_string()))?
                .add_child(node),
        }
    }

    fn touch(&mut self) {
        self.metadata.last_change = Utc::now();
    }
}

/// Document metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metadata {
    /// Creator application
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,

    /// Creation date
    pub created: DateTime<Utc>,

    /// Last modification date
    pub last_change: DateTime<Utc>,

    /// Free-form comments
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
}

impl Metadata {
    /// Metadata stamped with the current time.
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            creator: None,
            created: now,
            last_change: now,
            comments: None,
        }
    }

    /// Set the creator.
    pub fn with_creator(mut self, creator: impl Into<String>) -> Self {
        self.creator = Some(creator.into());
        self
    }
}

impl Default for Metadata {
    fn default() -> Self {
        Self::new()
    }
}
