/// One rasterized frame: an already-encoded PNG payload tagged with its
/// edge length in pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterFrame {
    pub size: u32,
    pub data: Vec<u8>,
}

const HEADER_LEN: usize = 6;
const DIR_ENTRY_LEN: usize = 16;

/// Serialize frames into a single ICO blob: 6-byte file header, one 16-byte
/// directory entry per frame, then the payloads concatenated in directory
/// order. Everything little-endian. Payloads are opaque bytes here; the
/// output is byte-identical for identical input lists.
pub fn encode_ico(frames: &[RasterFrame]) -> Vec<u8> {
    let directory_len = HEADER_LEN + DIR_ENTRY_LEN * frames.len();
    let payload_len: usize = frames.iter().map(|f| f.data.len()).sum();
    let mut out = Vec::with_capacity(directory_len + payload_len);

    out.extend_from_slice(&0u16.to_le_bytes()); // reserved
    out.extend_from_slice(&1u16.to_le_bytes()); // resource type: icon
    out.extend_from_slice(&(frames.len() as u16).to_le_bytes());

    let mut offset = directory_len as u32;
    for frame in frames {
        // The width/height bytes store 0 for 256 and larger.
        let edge = if frame.size < 256 { frame.size as u8 } else { 0 };
        out.push(edge);
        out.push(edge);
        out.push(0); // palette color count
        out.push(0); // reserved
        out.extend_from_slice(&1u16.to_le_bytes()); // color planes
        out.extend_from_slice(&32u16.to_le_bytes()); // bits per pixel
        out.extend_from_slice(&(frame.data.len() as u32).to_le_bytes());
        out.extend_from_slice(&offset.to_le_bytes());
        offset += frame.data.len() as u32;
    }

    for frame in frames {
        out.extend_from_slice(&frame.data);
    }
    out
}
