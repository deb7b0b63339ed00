//! Frame check sequence: CRC-CCITT, X.25 variant.
//!
//! Reflected polynomial 0x8408, register preset to 0xFFFF, result
//! complemented. The FCS goes on the wire little-endian after the payload.
//! Running the same computation over a frame *including* its FCS always
//! yields [`GOOD_RESIDUAL`].

/// Register preset.
pub const INIT: u16 = 0xFFFF;

/// Value of [`compute`] over any correctly received frame plus its FCS.
pub const GOOD_RESIDUAL: u16 = 0x0F47;

const POLY: u16 = 0x8408;

static TABLE: [u16; 256] = build_table();

const fn build_table() -> [u16; 256] {
    let mut table = [0u16; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = i as u16;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 1 != 0 { (crc >> 1) ^ POLY } else { crc >> 1 };
            bit += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

/// Feed `bytes` into a raw (uncomplemented) CRC register.
///
/// Resumable: `crc_update(crc_update(INIT, a), b) == crc_update(INIT, a ++ b)`.
pub fn crc_update(mut crc: u16, bytes: &[u8]) -> u16 {
    for &byte in bytes {
        crc = (crc >> 8) ^ TABLE[usize::from((crc ^ u16::from(byte)) as u8)];
    }
    crc
}

/// Compute the FCS of `bytes`.
pub fn compute(bytes: &[u8]) -> u16 {
    !crc_update(INIT, bytes)
}

/// Check a received frame whose last two bytes are its FCS.
pub fn verify(frame_with_fcs: &[u8]) -> bool {
    compute(frame_with_fcs) == GOOD_RESIDUAL
}
