use crate::note::object::NodeObject;
use crate::types::utf16_str;
use codepage_strings::Coding;
use std::rc::Rc;

/// One reconstructed text run: a slice of the node's text paired with
/// its formatting object and optional per-run data.
#[derive(Clone, Debug)]
pub struct TextRun {
    pub text: String,
    pub formatting: Option<Rc<NodeObject>>,
    pub data: Option<Rc<NodeObject>>,
}

/// Windows code page for an LCID, defaulting to 1252.
///
/// OneNote stores extended-ASCII text in the code page of the authoring
/// locale; off Windows the mapping has to be carried explicitly.
pub fn lcid_code_page(lcid: u32) -> u16 {
    match lcid {
        // Chinese splits by sublanguage.
        0x0404 | 0x0C04 | 0x1404 => 950,
        0x0804 | 0x1004 => 936,
        _ => match lcid & 0x3FF {
            0x01 | 0x20 | 0x29 => 1256,
            0x02 | 0x19 | 0x22 | 0x23 | 0x2F => 1251,
            0x05 | 0x0E | 0x15 | 0x18 | 0x1A | 0x1B | 0x24 => 1250,
            0x08 => 1253,
            0x0D => 1255,
            0x11 => 932,
            0x12 => 949,
            0x1E => 874,
            0x1F | 0x2C => 1254,
            0x25 | 0x26 | 0x27 => 1257,
            0x2A => 1258,
            _ => 1252,
        },
    }
}

/// Decode multi-byte text using the code page of `lcid`.
pub fn mbcs_str(bytes: &[u8], lcid: u32) -> String {
    let coding = Coding::new(lcid_code_page(lcid))
        .or_else(|_| Coding::new(1252))
        .expect("code page 1252 is always available");

    coding.decode_lossy(bytes).into_owned()
}

/// Split a rich text node's text into runs at the `TextRunIndex`
/// boundaries, pairing each with its formatting and run data.
///
/// Boundaries are character indices into the Unicode text (or byte
/// indices into the extended-ASCII text). The implicit final run covers
/// the remainder; it is dropped when empty. A boundary past the end of
/// the text stops reconstruction.
pub fn reconstruct_runs(
    unicode: Option<&[u8]>,
    ascii: Option<&[u8]>,
    indices: &[u32],
    formatting: &[Option<Rc<NodeObject>>],
    run_data: &[Rc<NodeObject>],
    lcid: u32,
) -> Vec<TextRun> {
    let mut runs = vec![];
    let mut prev = 0usize;

    for (i, boundary) in indices.iter().copied().map(Some).chain([None]).enumerate() {
        let text = if let Some(bytes) = unicode {
            let next = match boundary {
                Some(index) => index as usize * 2,
                None => bytes.len(),
            };

            if next < prev || next > bytes.len() {
                break;
            }

            let text = utf16_str(&bytes[prev..next]);
            prev = next;
            text
        } else if let Some(bytes) = ascii {
            let next = match boundary {
                Some(index) => index as usize,
                None => bytes.len(),
            };

            if next < prev || next > bytes.len() {
                break;
            }

            let text = mbcs_str(&bytes[prev..next], lcid);
            prev = next;
            text
        } else {
            break;
        };

        if boundary.is_none() && text.is_empty() {
            break;
        }

        runs.push(TextRun {
            text,
            formatting: formatting.get(i).cloned().flatten(),
            data: run_data.get(i).cloned(),
        });
    }

    runs
}
