use crate::error::{Error, Result};
use crate::file_data::{FileData, FileDataResolver};
use crate::note::history::{self, Version};
use crate::note::schema::{self, JcidSpace, PropertyId};
use crate::note::text::{self, TextRun};
use crate::onestore::{FileType, OneStoreFile};
use crate::object_space::ObjectSpace;
use crate::prop::{Property, PropertySet, PropertyValue};
use crate::reader::Reader;
use crate::revision::{root_role, Object, ObjectData, Revision};
use crate::types::{utf16_str, ExGuid, Guid, Jcid};
use indexmap::IndexMap;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::debug;
use uuid::uuid;

/// Context labelling the revision that enumerates a page's version
/// history.
pub const VERSION_HISTORY_CONTEXT: ExGuid = ExGuid {
    guid: Guid::from_uuid(uuid!("7111497F-1B6B-4209-9491-C98B04CF4C5A")),
    n: 1,
};

/// Typed tree builder configuration.
///
/// The verbosity filter applies to content hashing as well as emission,
/// so two revisions differing only in filtered fields share a hash.
#[derive(Clone, Debug)]
pub struct BuildOptions {
    pub verbosity: u8,
    pub include_oids: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            verbosity: 0,
            include_oids: false,
        }
    }
}

/// A materialized property value with object references realized.
#[derive(Clone, Debug)]
pub enum TypedValue {
    None,
    Bool(bool),
    Uint(u64),
    Bytes(Vec<u8>),
    Object(Option<Rc<NodeObject>>),
    Objects(Vec<Option<Rc<NodeObject>>>),
    ObjectSpace(ExGuid),
    ObjectSpaces(Vec<ExGuid>),
    Context(ExGuid),
    Contexts(Vec<ExGuid>),
    /// One nested property set.
    Set(Rc<NodeObject>),
    /// Array of nested property sets.
    Sets(Vec<Rc<NodeObject>>),
}

impl TypedValue {
    /// Child nodes carried by this value, in order.
    pub fn objects(&self) -> Vec<&Rc<NodeObject>> {
        match self {
            Self::Object(Some(node)) => vec![node],
            Self::Objects(nodes) => nodes.iter().flatten().collect(),
            Self::Set(node) => vec![node],
            Self::Sets(nodes) => nodes.iter().collect(),
            _ => vec![],
        }
    }
}

/// One materialized property of a typed object.
#[derive(Clone, Debug)]
pub struct TypedProperty {
    /// Raw property id including the data type bits.
    pub id: u32,
    pub key: Option<PropertyId>,
    pub data_type: u8,
    pub min_verbosity: u8,
    pub value: TypedValue,
}

impl TypedProperty {
    pub fn name(&self) -> String {
        match self.key {
            Some(key) => key.name().to_string(),
            None => format!("Property_{:X}", self.id),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.value {
            TypedValue::Bool(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_uint(&self) -> Option<u64> {
        match self.value {
            TypedValue::Uint(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match &self.value {
            TypedValue::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Length-prefixed byte values holding UTF-16 text.
    pub fn as_str(&self) -> Option<String> {
        self.as_bytes().map(utf16_str)
    }

    /// 16-byte values holding a GUID.
    pub fn as_guid(&self) -> Option<Guid> {
        let bytes = self.as_bytes()?;
        if bytes.len() != 16 {
            return None;
        }
        Guid::read(&mut Reader::new(bytes)).ok()
    }

    pub fn as_object(&self) -> Option<&Rc<NodeObject>> {
        match &self.value {
            TypedValue::Object(node) => node.as_ref(),
            _ => None,
        }
    }

    pub fn as_context(&self) -> Option<ExGuid> {
        match self.value {
            TypedValue::Context(ctxid) => Some(ctxid),
            _ => None,
        }
    }
}

/// A typed object: one JCID-tagged node of the materialized tree.
#[derive(Debug)]
pub struct NodeObject {
    pub jcid: Jcid,
    pub oid: Option<ExGuid>,
    space: JcidSpace,
    pub properties: IndexMap<u32, TypedProperty>,
    /// Minimum verbosity at which emitters show this node.
    pub min_verbosity: u8,
    hash: [u8; 16],
    /// Reconstructed runs of a rich text node.
    pub text_runs: Option<Vec<TextRun>>,
    /// Resolved payload of an embedded file or picture container.
    pub file_data: Option<FileData>,
}

impl NodeObject {
    /// Schema name of this node, or the hex JCID when unknown.
    pub fn name(&self) -> String {
        match schema::jcid_name(self.space, self.jcid) {
            Some(name) => name.to_string(),
            None => format!("Jcid_{:X}", self.jcid.0),
        }
    }

    pub fn is_read_only(&self) -> bool {
        self.jcid.is_read_only() || self.space == JcidSpace::NoteOnlineParagraphStyle
    }

    /// Dictionary this node deduplicates into when emitted, if read-only.
    pub fn read_only_kind(&self) -> Option<&'static str> {
        schema::read_only_kind(self.space, self.jcid)
    }

    pub fn get(&self, key: PropertyId) -> Option<&TypedProperty> {
        self.properties.get(&(key as u32))
    }

    /// Attribute lookup by symbolic name.
    pub fn prop(&self, name: &str) -> Result<&TypedProperty> {
        self.properties
            .values()
            .find(|property| property.name() == name)
            .ok_or_else(|| Error::Argument(format!("{} has no property {name}", self.name())))
    }

    pub fn str_value(&self, key: PropertyId) -> Option<String> {
        self.get(key)?.as_str()
    }

    pub fn uint_value(&self, key: PropertyId) -> Option<u64> {
        self.get(key)?.as_uint()
    }

    /// Content identity under the builder's verbosity filter.
    pub fn content_hash(&self) -> [u8; 16] {
        self.hash
    }

    pub fn hash_hex(&self) -> String {
        self.hash.iter().map(|byte| format!("{byte:02x}")).collect()
    }

    /// All `(path, node)` pairs of the subtree, this node first with an
    /// empty path. Path segments are property names.
    pub fn walk(&self) -> Vec<(Vec<String>, &NodeObject)> {
        let mut out = vec![];
        self.walk_into(&mut vec![], &mut out);
        out
    }

    fn walk_into<'a>(
        &'a self,
        path: &mut Vec<String>,
        out: &mut Vec<(Vec<String>, &'a NodeObject)>,
    ) {
        out.push((path.clone(), self));

        for property in self.properties.values() {
            path.push(property.name());
            for child in property.value.objects() {
                child.walk_into(path, out);
            }
            path.pop();
        }
    }
}

enum Slot {
    Building,
    Done(Rc<NodeObject>),
}

/// Realizes the typed objects of one revision, caching by OID.
struct RevisionBuilder<'a> {
    space: &'a ObjectSpace,
    resolver: &'a FileDataResolver<'a>,
    options: &'a BuildOptions,
    rid: ExGuid,
    cache: RefCell<HashMap<ExGuid, Slot>>,
}

impl RevisionBuilder<'_> {
    fn object(
        &self,
        oid: ExGuid,
        space: JcidSpace,
        referrer: Option<ExGuid>,
    ) -> Result<Rc<NodeObject>> {
        match self.cache.borrow().get(&oid) {
            Some(Slot::Done(node)) => return Ok(node.clone()),
            Some(Slot::Building) => {
                return Err(Error::CircularObjectReference(
                    referrer.unwrap_or(oid),
                    oid,
                ));
            }
            None => {}
        }

        self.cache.borrow_mut().insert(oid, Slot::Building);

        let object = self
            .space
            .object(self.rid, oid)
            .ok_or(Error::ObjectNotFound {
                oid,
                rid: self.rid,
            })?;

        let node = Rc::new(self.build_object(oid, object, space)?);
        self.cache
            .borrow_mut()
            .insert(oid, Slot::Done(node.clone()));

        Ok(node)
    }

    fn build_object(&self, oid: ExGuid, object: &Object, space: JcidSpace) -> Result<NodeObject> {
        match &object.data {
            ObjectData::PropertySet(set) => self.build_node(Some(oid), object.jcid, set, space),
            ObjectData::FileData {
                reference,
                extension,
            } => {
                let file_data = self.resolver.resolve(reference, extension)?;

                let mut hash = md5::Context::new();
                hash.consume(object.jcid.0.to_le_bytes());
                hash.consume(reference.as_bytes());
                hash.consume(extension.as_bytes());

                Ok(NodeObject {
                    jcid: object.jcid,
                    oid: Some(oid),
                    space,
                    properties: IndexMap::new(),
                    min_verbosity: 0,
                    hash: hash.compute().0,
                    text_runs: None,
                    file_data: Some(file_data),
                })
            }
        }
    }

    fn build_node(
        &self,
        oid: Option<ExGuid>,
        jcid: Jcid,
        set: &PropertySet,
        space: JcidSpace,
    ) -> Result<NodeObject> {
        let mut hash = md5::Context::new();
        hash.consume(jcid.0.to_le_bytes());

        let mut properties = IndexMap::with_capacity(set.properties.len());
        for (raw_id, property) in &set.properties {
            let typed = self.build_property(oid, property, space)?;

            if typed.min_verbosity <= self.options.verbosity {
                hash_property(&mut hash, &typed);
            }

            properties.insert(*raw_id, typed);
        }

        let mut min_verbosity = properties
            .values()
            .map(|property| property.min_verbosity)
            .min()
            .unwrap_or(0);

        // Child-bearing nodes inherit their visibility from the child
        // list: a container whose children are all hidden hides too.
        if let Some(child_key) = schema::child_nodes_property(space, jcid) {
            if let Some(children) = properties.get(&(child_key as u32)) {
                let aggregated = children
                    .value
                    .objects()
                    .iter()
                    .map(|child| child.min_verbosity)
                    .min()
                    .unwrap_or(children.min_verbosity);
                min_verbosity = aggregated.max(children.min_verbosity);
            }
        }

        let mut node = NodeObject {
            jcid,
            oid,
            space,
            properties,
            min_verbosity,
            hash: hash.compute().0,
            text_runs: None,
            file_data: None,
        };

        if space == JcidSpace::Notebook && jcid.0 == schema::NotebookJcid::RichTextOENode as u32 {
            self.reconstruct_text(&mut node);
        }

        Ok(node)
    }

    fn reconstruct_text(&self, node: &mut NodeObject) {
        let unicode = node
            .get(PropertyId::RichEditTextUnicode)
            .and_then(TypedProperty::as_bytes)
            .map(<[u8]>::to_vec);
        let ascii = node
            .get(PropertyId::TextExtendedAscii)
            .and_then(TypedProperty::as_bytes)
            .map(<[u8]>::to_vec);

        let indices: Vec<u32> = node
            .get(PropertyId::TextRunIndex)
            .and_then(TypedProperty::as_bytes)
            .map(|bytes| {
                bytes
                    .chunks_exact(4)
                    .map(|chunk| u32::from_le_bytes(chunk.try_into().unwrap()))
                    .collect()
            })
            .unwrap_or_default();

        let formatting = match node.get(PropertyId::TextRunFormatting).map(|p| &p.value) {
            Some(TypedValue::Objects(nodes)) => nodes.clone(),
            _ => vec![],
        };

        let run_data = match node.get(PropertyId::TextRunData).map(|p| &p.value) {
            Some(TypedValue::Sets(nodes)) => nodes.clone(),
            _ => vec![],
        };

        let lcid = node
            .uint_value(PropertyId::RichEditTextLangID)
            .unwrap_or(1033) as u32;

        let runs = text::reconstruct_runs(
            unicode.as_deref(),
            ascii.as_deref(),
            &indices,
            &formatting,
            &run_data,
            lcid,
        );

        // Nodes with nothing to say are hidden by default.
        if runs.iter().all(|run| run.text.is_empty()) {
            node.min_verbosity = node.min_verbosity.max(4);
        }

        node.text_runs = Some(runs);
    }

    fn build_property(
        &self,
        parent_oid: Option<ExGuid>,
        property: &Property,
        space: JcidSpace,
    ) -> Result<TypedProperty> {
        let key = PropertyId::from_raw(property.id);

        let child_space = match key {
            Some(PropertyId::NoteOnlineParagraphStyle) => JcidSpace::NoteOnlineParagraphStyle,
            _ => space.child_space(),
        };

        let value = match &property.value {
            PropertyValue::NoData => TypedValue::None,
            PropertyValue::Bool(value) => TypedValue::Bool(*value),
            PropertyValue::Uint(value) => TypedValue::Uint(*value),
            PropertyValue::Bytes(bytes) => TypedValue::Bytes(bytes.clone()),
            PropertyValue::ObjectId(oid) => TypedValue::Object(match oid {
                Some(oid) => Some(self.object(*oid, child_space, parent_oid)?),
                None => None,
            }),
            PropertyValue::ObjectIds(oids) => {
                let mut nodes = Vec::with_capacity(oids.len());
                for oid in oids {
                    nodes.push(match oid {
                        Some(oid) => Some(self.object(*oid, child_space, parent_oid)?),
                        None => None,
                    });
                }
                TypedValue::Objects(nodes)
            }
            PropertyValue::ObjectSpaceId(osid) => TypedValue::ObjectSpace(*osid),
            PropertyValue::ObjectSpaceIds(osids) => TypedValue::ObjectSpaces(osids.clone()),
            PropertyValue::ContextId(ctxid) => TypedValue::Context(*ctxid),
            PropertyValue::ContextIds(ctxids) => TypedValue::Contexts(ctxids.clone()),
            PropertyValue::PropertySet(set) => TypedValue::Set(Rc::new(self.build_node(
                None,
                set.jcid,
                set,
                child_space,
            )?)),
            PropertyValue::PropertyValues(sets) => {
                let mut nodes = Vec::with_capacity(sets.len());
                for set in sets {
                    nodes.push(Rc::new(self.build_node(None, set.jcid, set, child_space)?));
                }
                TypedValue::Sets(nodes)
            }
        };

        Ok(TypedProperty {
            id: property.id,
            key,
            data_type: property.data_type,
            min_verbosity: key.map(PropertyId::min_verbosity).unwrap_or(0),
            value,
        })
    }
}

/// Feed one property into a node's content hash. Child objects
/// contribute their own digests, so identical subtrees hash alike.
fn hash_property(hash: &mut md5::Context, property: &TypedProperty) {
    hash.consume(property.id.to_le_bytes());

    match &property.value {
        TypedValue::None => {}
        TypedValue::Bool(value) => hash.consume([*value as u8]),
        TypedValue::Uint(value) => {
            let bytes = value.to_le_bytes();
            let width = match property.data_type {
                crate::prop::data_type::ONE_BYTE => 1,
                crate::prop::data_type::TWO_BYTES => 2,
                crate::prop::data_type::FOUR_BYTES => 4,
                _ => 8,
            };
            hash.consume(&bytes[..width]);
        }
        TypedValue::Bytes(bytes) => hash.consume(bytes),
        TypedValue::Object(node) => hash_child(hash, node.as_deref()),
        TypedValue::Objects(nodes) => {
            for node in nodes {
                hash_child(hash, node.as_deref());
            }
        }
        TypedValue::ObjectSpace(id) | TypedValue::Context(id) => hash_ex_guid(hash, id),
        TypedValue::ObjectSpaces(ids) | TypedValue::Contexts(ids) => {
            for id in ids {
                hash_ex_guid(hash, id);
            }
        }
        TypedValue::Set(node) => hash.consume(node.content_hash()),
        TypedValue::Sets(nodes) => {
            for node in nodes {
                hash.consume(node.content_hash());
            }
        }
    }
}

fn hash_child(hash: &mut md5::Context, node: Option<&NodeObject>) {
    match node {
        Some(node) => hash.consume(node.content_hash()),
        None => hash.consume([0u8; 16]),
    }
}

fn hash_ex_guid(hash: &mut md5::Context, id: &ExGuid) {
    hash.consume(id.guid.as_bytes());
    hash.consume(id.n.to_le_bytes());
}

/// The materialized tree of one revision.
#[derive(Debug)]
pub struct RevisionTree {
    pub rid: ExGuid,
    pub gosid: ExGuid,
    pub(crate) os_index: usize,
    pub encrypted: bool,
    /// Root object per role.
    pub roots: IndexMap<u32, Rc<NodeObject>>,
    /// `RevisionMetaData.LastModifiedTimeStamp`, or the most recent
    /// topology creation timestamp in the contents tree.
    pub last_modified: Option<u64>,
    /// The page's persistent GUID, from the page metadata root.
    pub page_guid: Option<String>,
    pub author: Option<String>,
}

impl RevisionTree {
    pub fn root_object(&self, role: u32) -> Option<&Rc<NodeObject>> {
        self.roots.get(&role)
    }

    /// The contents root (page, section or TOC body).
    pub fn contents(&self) -> Option<&Rc<NodeObject>> {
        self.root_object(root_role::CONTENTS)
    }
}

/// The materialized trees of one object space, with its version list.
#[derive(Debug)]
pub struct SpaceTree {
    pub gosid: ExGuid,
    pub(crate) os_index: usize,
    pub revisions: IndexMap<ExGuid, RevisionTree>,
    /// Revision IDs carrying version snapshots, ascending by timestamp.
    pub versions: Vec<ExGuid>,
    pub default_rid: Option<ExGuid>,
}

impl SpaceTree {
    pub fn revision(&self, rid: ExGuid) -> Option<&RevisionTree> {
        self.revisions.get(&rid)
    }

    pub fn default_revision(&self) -> Option<&RevisionTree> {
        self.revision(self.default_rid?)
    }

    pub fn version_timestamps(&self) -> impl Iterator<Item = u64> + '_ {
        self.versions
            .iter()
            .filter_map(|rid| self.revisions.get(rid)?.last_modified)
    }

    /// The most recent version with `last_modified <= timestamp`.
    pub fn version_at(&self, timestamp: u64) -> Option<&RevisionTree> {
        self.versions
            .iter()
            .rev()
            .filter_map(|rid| self.revisions.get(rid))
            .find(|tree| tree.last_modified.unwrap_or(0) <= timestamp)
    }
}

/// The typed object tree of a whole file.
#[derive(Debug)]
pub struct ObjectTree {
    pub root_gosid: ExGuid,
    pub spaces: IndexMap<ExGuid, SpaceTree>,
}

impl ObjectTree {
    pub fn space(&self, gosid: ExGuid) -> Option<&SpaceTree> {
        self.spaces.get(&gosid)
    }

    pub fn root_space(&self) -> Option<&SpaceTree> {
        self.space(self.root_gosid)
    }

    /// Ordered whole-notebook version snapshots.
    pub fn versions(&self) -> Vec<Version> {
        history::versions(self)
    }
}

/// A loaded OneNote file together with its sidecar attachment folder.
pub struct Notebook {
    store: OneStoreFile,
    onefiles_dir: Option<PathBuf>,
}

impl Notebook {
    /// Open `NAME.one` or `NAME.onetoc2`, picking up the sidecar
    /// `NAME_onefiles/` folder when present.
    pub fn open<P>(path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let store = OneStoreFile::open(path)?;

        let onefiles_dir = path.file_stem().map(|stem| {
            let mut name = stem.to_os_string();
            name.push("_onefiles");
            path.with_file_name(name)
        });
        let onefiles_dir = onefiles_dir.filter(|dir| dir.is_dir());

        if let Some(dir) = &onefiles_dir {
            debug!(dir = %dir.display(), "found onefiles folder");
        }

        Ok(Self {
            store,
            onefiles_dir,
        })
    }

    pub fn from_store(store: OneStoreFile, onefiles_dir: Option<PathBuf>) -> Self {
        Self {
            store,
            onefiles_dir,
        }
    }

    pub fn store(&self) -> &OneStoreFile {
        &self.store
    }

    /// Materialize the typed object tree of every object space.
    pub fn build(&self, options: &BuildOptions) -> Result<ObjectTree> {
        let resolver = FileDataResolver::new(&self.store, self.onefiles_dir.clone());

        let jcid_space = match self.store.file_type() {
            FileType::Section => JcidSpace::Notebook,
            FileType::Toc2 => JcidSpace::Toc,
        };

        let mut spaces = IndexMap::new();
        for (os_index, (gosid, space)) in self.store.object_spaces().enumerate() {
            spaces.insert(
                gosid,
                build_space(space, &resolver, options, jcid_space, os_index)?,
            );
        }

        Ok(ObjectTree {
            root_gosid: self.store.root_object_space_id(),
            spaces,
        })
    }
}

fn build_space(
    space: &ObjectSpace,
    resolver: &FileDataResolver,
    options: &BuildOptions,
    jcid_space: JcidSpace,
    os_index: usize,
) -> Result<SpaceTree> {
    let mut built: IndexMap<ExGuid, RevisionTree> = IndexMap::new();
    for revision in space.revisions() {
        built.insert(
            revision.rid,
            build_revision(space, revision, resolver, options, jcid_space, os_index)?,
        );
    }

    let default_rid = space.default_rid();
    let mut ordered = IndexMap::new();
    let mut version_trees = vec![];

    // The current revision typically is not in the history metadata, so
    // pull it out before processing the history revision.
    let root_tree = default_rid.and_then(|rid| built.shift_remove(&rid));

    if let Some(history_rid) = space.context_rid(VERSION_HISTORY_CONTEXT, 1) {
        if let Some(history) = built.shift_remove(&history_rid) {
            for rid in history_version_rids(&history, space) {
                if let Some(tree) = built.shift_remove(&rid) {
                    version_trees.push(tree);
                }
            }

            // The history revision leads the listing.
            ordered.insert(history_rid, history);
        }
    }

    if let Some(root_tree) = root_tree {
        version_trees.push(root_tree);
    }

    // Non-versioned revisions keep their document order.
    ordered.extend(built);

    version_trees.sort_by_key(|tree| tree.last_modified);

    let mut versions = vec![];
    for tree in version_trees {
        versions.push(tree.rid);
        ordered.insert(tree.rid, tree);
    }

    Ok(SpaceTree {
        gosid: space.gosid,
        os_index,
        revisions: ordered,
        versions,
        default_rid,
    })
}

/// Revisions the history revision's version proxies point at, via the
/// version-history graph-space context labels.
fn history_version_rids(history: &RevisionTree, space: &ObjectSpace) -> Vec<ExGuid> {
    let mut rids = vec![];

    // An initial version proxy can be empty, without child nodes.
    let children = history
        .contents()
        .and_then(|root| root.get(PropertyId::ElementChildNodes));

    if let Some(children) = children {
        for proxy in children.value.objects() {
            let ctxid = proxy
                .get(PropertyId::VersionHistoryGraphSpaceContextNodes)
                .and_then(TypedProperty::as_context);

            if let Some(ctxid) = ctxid {
                if let Some(rid) = space.context_rid(ctxid, 1) {
                    rids.push(rid);
                }
            }
        }
    }

    rids
}

fn build_revision(
    space: &ObjectSpace,
    revision: &Revision,
    resolver: &FileDataResolver,
    options: &BuildOptions,
    jcid_space: JcidSpace,
    os_index: usize,
) -> Result<RevisionTree> {
    let builder = RevisionBuilder {
        space,
        resolver,
        options,
        rid: revision.rid,
        cache: RefCell::new(HashMap::new()),
    };

    let mut roots = IndexMap::new();
    if !revision.is_encrypted() {
        for (role, oid) in &revision.root_objects {
            roots.insert(*role, builder.object(*oid, jcid_space, None)?);
        }
    }

    let revision_meta = roots.get(&root_role::REVISION_METADATA);

    let mut last_modified =
        revision_meta.and_then(|meta| meta.uint_value(PropertyId::LastModifiedTimeStamp));

    if last_modified.is_none() {
        // Fall back to the most recent topology creation timestamp in
        // the contents tree.
        last_modified = roots
            .get(&root_role::CONTENTS)
            .and_then(|contents| {
                contents
                    .walk()
                    .iter()
                    .filter_map(|(_, node)| {
                        node.uint_value(PropertyId::TopologyCreationTimeStamp)
                    })
                    .max()
            });
    }

    let author = revision_meta.and_then(|meta| {
        meta.get(PropertyId::AuthorMostRecent)
            .or_else(|| meta.get(PropertyId::AuthorOriginal))
            .and_then(TypedProperty::as_object)
            .and_then(|author| author.str_value(PropertyId::Author))
    });

    let page_guid = roots
        .get(&root_role::PAGE_METADATA)
        .and_then(|meta| meta.get(PropertyId::NotebookManagementEntityGuid))
        .and_then(TypedProperty::as_guid)
        .map(|guid| guid.to_string());

    Ok(RevisionTree {
        rid: revision.rid,
        gosid: space.gosid,
        os_index,
        encrypted: revision.is_encrypted(),
        roots,
        last_modified,
        page_guid,
        author,
    })
}
