//! Fixture builder assembling minimal revision store images in memory.

#![allow(dead_code)]

use onestore::FileNodeId;

/// The `.one` section file type GUID.
pub const SECTION: &str = "{7B5C52E4-D88C-4DA7-AEB1-5378D02996D3}";
/// The `.onetoc2` file type GUID.
pub const TOC2: &str = "{43FF2FA1-EFD9-4C76-9EE2-10EA5722765F}";

pub const FRAGMENT_MAGIC: u64 = 0xA456_7AB1_F5F7_F4C4;
pub const FRAGMENT_FOOTER: u64 = 0x8BC2_15C3_8233_BA4B;

pub const NIL_REF: (u64, u64) = (u64::MAX, 0);

/// Little-endian storage bytes of a curly-brace GUID.
pub fn guid_le(s: &str) -> [u8; 16] {
    let hex = s
        .trim_start_matches('{')
        .trim_end_matches('}')
        .replace('-', "");
    assert_eq!(hex.len(), 32);

    let byte =
        |i: usize| u8::from_str_radix(&hex[2 * i..2 * i + 2], 16).expect("valid GUID hex");

    let mut out = [0u8; 16];
    // Data1..Data3 are little-endian on disk, Data4 is not.
    for (to, from) in [3, 2, 1, 0, 5, 4, 7, 6].into_iter().enumerate() {
        out[to] = byte(from);
    }
    for i in 8..16 {
        out[i] = byte(i);
    }
    out
}

/// ExtendedGUID payload bytes.
pub fn exg(guid: &str, n: u32) -> Vec<u8> {
    let mut out = guid_le(guid).to_vec();
    out.extend(n.to_le_bytes());
    out
}

/// Encode one file node. `reference` uses the 8-byte position / 4-byte
/// size encoding.
pub fn node(id: FileNodeId, base_type: u8, reference: Option<(u64, u64)>, payload: &[u8]) -> Vec<u8> {
    let ref_len = if reference.is_some() { 12 } else { 0 };
    let size = (4 + ref_len + payload.len()) as u32;

    let header = 0x8000_0000 | ((base_type as u32) << 27) | (size << 10) | id as u32;

    let mut out = header.to_le_bytes().to_vec();
    if let Some((stp, cb)) = reference {
        out.extend(stp.to_le_bytes());
        out.extend((cb as u32).to_le_bytes());
    }
    out.extend(payload);
    out
}

/// Assemble one file node list fragment.
pub fn fragment(list_id: u32, sequence: u32, nodes: &[u8], next: (u64, u64)) -> Vec<u8> {
    let mut out = FRAGMENT_MAGIC.to_le_bytes().to_vec();
    out.extend(list_id.to_le_bytes());
    out.extend(sequence.to_le_bytes());
    out.extend(nodes);
    out.extend(next.0.to_le_bytes());
    out.extend((next.1 as u32).to_le_bytes());
    out.extend(FRAGMENT_FOOTER.to_le_bytes());
    out
}

/// A revision store image under construction: the 1024-byte header
/// followed by appended chunks.
pub struct OneFile {
    pub data: Vec<u8>,
}

impl OneFile {
    pub fn new(file_type: &str) -> Self {
        let mut data = vec![0u8; 1024];
        data[..16].copy_from_slice(&guid_le(file_type));
        Self { data }
    }

    /// Append a chunk and return its reference.
    pub fn append(&mut self, bytes: &[u8]) -> (u64, u64) {
        let stp = self.data.len() as u64;
        self.data.extend_from_slice(bytes);
        (stp, bytes.len() as u64)
    }

    /// Append a single-fragment file node list.
    pub fn append_list(&mut self, list_id: u32, nodes: &[u8]) -> (u64, u64) {
        let fragment = fragment(list_id, 0, nodes, NIL_REF);
        self.append(&fragment)
    }

    /// Patch the root file node list reference and return the image.
    pub fn finish(mut self, root: (u64, u64)) -> Vec<u8> {
        self.data[172..180].copy_from_slice(&root.0.to_le_bytes());
        self.data[180..184].copy_from_slice(&(root.1 as u32).to_le_bytes());
        self.data
    }
}

/// Property set blob builder: the three CompactID streams followed by
/// the property set body.
#[derive(Default)]
pub struct PropSet {
    oids: Vec<u32>,
    osids: Vec<u32>,
    ctxids: Vec<u32>,
    headers: Vec<u32>,
    body: Vec<u8>,
}

impl PropSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn no_data(mut self, id: u32) -> Self {
        self.headers.push(id);
        self
    }

    pub fn bool(mut self, id: u32, value: bool) -> Self {
        self.headers.push(id | if value { 0x8000_0000 } else { 0 });
        self
    }

    pub fn u8(mut self, id: u32, value: u8) -> Self {
        self.headers.push(id);
        self.body.push(value);
        self
    }

    pub fn u16(mut self, id: u32, value: u16) -> Self {
        self.headers.push(id);
        self.body.extend(value.to_le_bytes());
        self
    }

    pub fn u32(mut self, id: u32, value: u32) -> Self {
        self.headers.push(id);
        self.body.extend(value.to_le_bytes());
        self
    }

    pub fn u64(mut self, id: u32, value: u64) -> Self {
        self.headers.push(id);
        self.body.extend(value.to_le_bytes());
        self
    }

    pub fn bytes(mut self, id: u32, data: &[u8]) -> Self {
        self.headers.push(id);
        self.body.extend((data.len() as u32).to_le_bytes());
        self.body.extend(data);
        self
    }

    pub fn oid(mut self, id: u32, compact: u32) -> Self {
        self.headers.push(id);
        self.oids.push(compact);
        self
    }

    pub fn oid_array(mut self, id: u32, compacts: &[u32]) -> Self {
        self.headers.push(id);
        self.body.extend((compacts.len() as u32).to_le_bytes());
        self.oids.extend_from_slice(compacts);
        self
    }

    pub fn osid_array(mut self, id: u32, compacts: &[u32]) -> Self {
        self.headers.push(id);
        self.body.extend((compacts.len() as u32).to_le_bytes());
        self.osids.extend_from_slice(compacts);
        self
    }

    pub fn ctxid(mut self, id: u32, compact: u32) -> Self {
        self.headers.push(id);
        self.ctxids.push(compact);
        self
    }

    /// Push extra OID stream entries no property consumes.
    pub fn stray_oid(mut self, compact: u32) -> Self {
        self.oids.push(compact);
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut out = vec![];

        let extended = !self.osids.is_empty() || !self.ctxids.is_empty();

        let mut oids_header = self.oids.len() as u32;
        if extended {
            oids_header |= 0x4000_0000;
        } else {
            oids_header |= 0x8000_0000;
        }
        out.extend(oids_header.to_le_bytes());
        for compact in &self.oids {
            out.extend(compact.to_le_bytes());
        }

        if extended {
            let mut osids_header = self.osids.len() as u32;
            if !self.ctxids.is_empty() {
                osids_header |= 0x4000_0000;
            }
            out.extend(osids_header.to_le_bytes());
            for compact in &self.osids {
                out.extend(compact.to_le_bytes());
            }

            if !self.ctxids.is_empty() {
                out.extend((self.ctxids.len() as u32).to_le_bytes());
                for compact in &self.ctxids {
                    out.extend(compact.to_le_bytes());
                }
            }
        }

        out.extend((self.headers.len() as u16).to_le_bytes());
        for header in &self.headers {
            out.extend(header.to_le_bytes());
        }
        out.extend(self.body);
        out
    }
}

/// One object declaration within a revision's object group.
pub struct Decl {
    pub compact: u32,
    pub jcid: u32,
    pub blob: Vec<u8>,
    pub read_only: bool,
    /// File data declarations carry a reference string and extension
    /// instead of a property set blob.
    pub file: Option<(String, String)>,
}

impl Decl {
    pub fn new(compact: u32, jcid: u32, blob: Vec<u8>) -> Self {
        Self {
            compact,
            jcid,
            blob,
            read_only: false,
            file: None,
        }
    }

    pub fn file(compact: u32, jcid: u32, reference: &str, extension: &str) -> Self {
        Self {
            compact,
            jcid,
            blob: vec![],
            read_only: false,
            file: Some((reference.to_string(), extension.to_string())),
        }
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }
}

/// Length-prefixed UTF-16 string payload.
pub fn prefixed_utf16(s: &str) -> Vec<u8> {
    let units: Vec<u16> = s.encode_utf16().collect();
    let mut out = (units.len() as u32).to_le_bytes().to_vec();
    for unit in units {
        out.extend(unit.to_le_bytes());
    }
    out
}

/// UTF-16LE bytes without a length prefix.
pub fn utf16(s: &str) -> Vec<u8> {
    s.encode_utf16().flat_map(u16::to_le_bytes).collect()
}

/// One revision of a section object space, declaring its objects
/// through a single object group.
pub struct RevisionSpec {
    pub rid: String,
    pub dependent: Option<String>,
    /// Group global ID table: GUID per index, starting at 0.
    pub table: Vec<String>,
    pub decls: Vec<Decl>,
    /// `(root role, CompactID)` pairs resolved through the group table.
    pub roots: Vec<(u32, u32)>,
}

/// A section object space under construction.
pub struct SpaceBuilder {
    pub gosid: String,
    pub revisions: Vec<RevisionSpec>,
    list_id: u32,
}

impl SpaceBuilder {
    pub fn new(gosid: &str, list_id: u32) -> Self {
        Self {
            gosid: gosid.to_string(),
            revisions: vec![],
            list_id,
        }
    }

    pub fn revision(mut self, spec: RevisionSpec) -> Self {
        self.revisions.push(spec);
        self
    }

    /// Emit the space into `file`, returning the object space manifest
    /// list reference.
    pub fn build(self, file: &mut OneFile) -> (u64, u64) {
        let mut manifest_nodes = vec![];
        manifest_nodes.extend(node(
            FileNodeId::RevisionManifestListStart,
            0,
            None,
            &{
                let mut payload = exg(&self.gosid, 1);
                payload.extend(0u32.to_le_bytes());
                payload
            },
        ));

        for (index, revision) in self.revisions.iter().enumerate() {
            // Blobs first, then the group list, then the manifest nodes.
            let mut group_nodes = vec![];
            group_nodes.extend(node(
                FileNodeId::ObjectGroupStart,
                0,
                None,
                &exg(&revision.rid, 2),
            ));
            group_nodes.extend(node(FileNodeId::GlobalIdTableStart2, 0, None, &[]));
            for (i, guid) in revision.table.iter().enumerate() {
                let mut payload = (i as u32).to_le_bytes().to_vec();
                payload.extend(guid_le(guid));
                group_nodes.extend(node(FileNodeId::GlobalIdTableEntry, 0, None, &payload));
            }
            group_nodes.extend(node(FileNodeId::GlobalIdTableEnd, 0, None, &[]));

            for decl in &revision.decls {
                if let Some((reference, extension)) = &decl.file {
                    let mut payload = decl.compact.to_le_bytes().to_vec();
                    payload.extend(decl.jcid.to_le_bytes());
                    payload.push(1); // cRef
                    payload.extend(prefixed_utf16(reference));
                    payload.extend(prefixed_utf16(extension));
                    group_nodes.extend(node(
                        FileNodeId::ObjectDeclarationFileData3RefCount,
                        0,
                        None,
                        &payload,
                    ));
                    continue;
                }

                let blob_ref = file.append(&decl.blob);

                let mut payload = decl.compact.to_le_bytes().to_vec();
                payload.extend(decl.jcid.to_le_bytes());
                payload.push(0); // no reference flags
                payload.push(1); // cRef

                if decl.read_only {
                    payload.extend([0u8; 16]); // declared MD5, unverified
                    group_nodes.extend(node(
                        FileNodeId::ReadOnlyObjectDeclaration2RefCount,
                        1,
                        Some(blob_ref),
                        &payload,
                    ));
                } else {
                    group_nodes.extend(node(
                        FileNodeId::ObjectDeclaration2RefCount,
                        1,
                        Some(blob_ref),
                        &payload,
                    ));
                }
            }

            group_nodes.extend(node(FileNodeId::ObjectGroupEnd, 0, None, &[]));

            let group_ref =
                file.append(&fragment(self.list_id * 100 + index as u32 + 1, 0, &group_nodes, NIL_REF));

            manifest_nodes.extend(node(FileNodeId::RevisionManifestStart6, 0, None, &{
                let mut payload = exg(&revision.rid, 1);
                payload.extend(exg(
                    revision.dependent.as_deref().unwrap_or(NIL_GUID),
                    if revision.dependent.is_some() { 1 } else { 0 },
                ));
                payload.extend(1u32.to_le_bytes()); // revision role
                payload.extend(0u16.to_le_bytes()); // odcsDefault
                payload
            }));

            manifest_nodes.extend(node(FileNodeId::ObjectGroupListReference, 2, Some(group_ref), &exg(&revision.rid, 2)));

            for (role, compact) in &revision.roots {
                let mut payload = compact.to_le_bytes().to_vec();
                payload.extend(role.to_le_bytes());
                manifest_nodes.extend(node(FileNodeId::RootObjectReference2, 0, None, &payload));
            }

            manifest_nodes.extend(node(FileNodeId::RevisionManifestEnd, 0, None, &[]));
        }

        let manifest_ref = file.append(&fragment(self.list_id, 0, &manifest_nodes, NIL_REF));

        let mut space_nodes = node(
            FileNodeId::ObjectSpaceManifestListStart,
            0,
            None,
            &exg(&self.gosid, 1),
        );
        space_nodes.extend(node(
            FileNodeId::RevisionManifestListReference,
            2,
            Some(manifest_ref),
            &[],
        ));

        file.append(&fragment(self.list_id + 1, 0, &space_nodes, NIL_REF))
    }
}

pub const NIL_GUID: &str = "{00000000-0000-0000-0000-000000000000}";

/// Assemble a section file from built object spaces.
///
/// `spaces` pairs each space's GOSID with its manifest list reference;
/// the first space is the root.
pub fn section_file(file: OneFile, spaces: &[(&str, (u64, u64))]) -> Vec<u8> {
    let mut file = file;

    let mut root_nodes = node(
        FileNodeId::ObjectSpaceManifestRoot,
        0,
        None,
        &exg(spaces[0].0, 1),
    );
    for (gosid, list) in spaces {
        root_nodes.extend(node(
            FileNodeId::ObjectSpaceManifestListReference,
            2,
            Some(*list),
            &exg(gosid, 1),
        ));
    }

    let root_ref = file.append(&fragment(9000, 0, &root_nodes, NIL_REF));
    file.finish(root_ref)
}
