use crate::error::Result;
use crate::reader::Reader;
use crate::types::{ChunkRef, Guid};

/// The fixed 1024-byte header at the start of every revision store file.
///
/// Only `guid_file_type` and `fcr_file_node_list_root` drive the reader;
/// the remaining fields are preserved verbatim.
#[derive(Clone, Debug)]
pub struct Header {
    pub guid_file_type: Guid,
    pub guid_file: Guid,
    pub guid_legacy_file_version: Guid,
    pub guid_file_format: Guid,
    pub ffv_last_code_that_wrote_to_this_file: u32,
    pub ffv_oldest_code_that_has_written_to_this_file: u32,
    pub ffv_newest_code_that_has_written_to_this_file: u32,
    pub ffv_oldest_code_that_may_read_this_file: u32,
    pub fcr_legacy_free_chunk_list: ChunkRef,
    pub fcr_legacy_transaction_log: ChunkRef,
    pub c_transactions_in_log: u32,
    pub cb_legacy_expected_file_length: u32,
    pub rgb_placeholder: u64,
    pub fcr_legacy_file_node_list_root: ChunkRef,
    pub cb_legacy_free_space_in_free_chunk_list: u32,
    pub f_needs_defrag: u8,
    pub f_repaired_file: u8,
    pub f_needs_garbage_collect: u8,
    pub f_has_no_embedded_file_objects: u8,
    pub guid_ancestor: Guid,
    pub crc_name: u32,
    pub fcr_hashed_chunk_list: ChunkRef,
    pub fcr_transaction_log: ChunkRef,
    pub fcr_file_node_list_root: ChunkRef,
    pub fcr_free_chunk_list: ChunkRef,
    pub cb_expected_file_length: u64,
    pub cb_free_space_in_free_chunk_list: u64,
    pub guid_file_version: Guid,
    pub n_file_version_generation: u64,
    pub guid_deny_read_file_version: Guid,
    pub grf_debug_log_flags: u32,
    pub fcr_debug_log: ChunkRef,
    pub fcr_alloc_verification_free_chunk_list: ChunkRef,
    pub bn_created: u32,
    pub bn_last_wrote_to_this_file: u32,
    pub bn_oldest_written: u32,
    pub bn_newest_written: u32,
}

impl Header {
    pub const SIZE: usize = 1024;

    pub fn read(r: &mut Reader) -> Result<Self> {
        Ok(Self {
            guid_file_type: Guid::read(r)?,
            guid_file: Guid::read(r)?,
            guid_legacy_file_version: Guid::read(r)?,
            guid_file_format: Guid::read(r)?,
            ffv_last_code_that_wrote_to_this_file: r.u32()?,
            ffv_oldest_code_that_has_written_to_this_file: r.u32()?,
            ffv_newest_code_that_has_written_to_this_file: r.u32()?,
            ffv_oldest_code_that_may_read_this_file: r.u32()?,
            fcr_legacy_free_chunk_list: ChunkRef::read_32(r)?,
            fcr_legacy_transaction_log: ChunkRef::read_32(r)?,
            c_transactions_in_log: r.u32()?,
            cb_legacy_expected_file_length: r.u32()?,
            rgb_placeholder: r.u64()?,
            fcr_legacy_file_node_list_root: ChunkRef::read_32(r)?,
            cb_legacy_free_space_in_free_chunk_list: r.u32()?,
            f_needs_defrag: r.u8()?,
            f_repaired_file: r.u8()?,
            f_needs_garbage_collect: r.u8()?,
            f_has_no_embedded_file_objects: r.u8()?,
            guid_ancestor: Guid::read(r)?,
            crc_name: r.u32()?,
            fcr_hashed_chunk_list: ChunkRef::read_64x32(r)?,
            fcr_transaction_log: ChunkRef::read_64x32(r)?,
            fcr_file_node_list_root: ChunkRef::read_64x32(r)?,
            fcr_free_chunk_list: ChunkRef::read_64x32(r)?,
            cb_expected_file_length: r.u64()?,
            cb_free_space_in_free_chunk_list: r.u64()?,
            guid_file_version: Guid::read(r)?,
            n_file_version_generation: r.u64()?,
            guid_deny_read_file_version: Guid::read(r)?,
            grf_debug_log_flags: r.u32()?,
            fcr_debug_log: ChunkRef::read_64x32(r)?,
            fcr_alloc_verification_free_chunk_list: ChunkRef::read_64x32(r)?,
            bn_created: r.u32()?,
            bn_last_wrote_to_this_file: r.u32()?,
            bn_oldest_written: r.u32()?,
            bn_newest_written: r.u32()?,
        })
    }
}
