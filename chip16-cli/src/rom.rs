use anyhow::{ensure, Result};
use log::{info, warn};
use static_assertions::const_assert_eq;
use zerocopy::{FromBytes, Immutable, KnownLayout, LittleEndian, U16, U32};

/// Optional header at the start of a `.c16` file
#[derive(FromBytes, KnownLayout, Immutable)]
#[repr(C)]
struct Header {
    magic: [u8; 4],
    _reserved: u8,
    /// Specification version, as `major << 4 | minor`
    version: u8,
    size: U32<LittleEndian>,
    start: U16<LittleEndian>,
    crc: U32<LittleEndian>,
}

const_assert_eq!(std::mem::size_of::<Header>(), 16);

const MAGIC: &[u8; 4] = b"CH16";

/// A program image, stripped of its header
pub struct Rom<'a> {
    pub data: &'a [u8],
    pub start: u16,
}

impl<'a> Rom<'a> {
    /// Splits off the `CH16` header, if present
    ///
    /// Files without a header are treated as raw images starting at 0.
    pub fn parse(bytes: &'a [u8]) -> Result<Self> {
        let header = match Header::ref_from_prefix(bytes) {
            Ok((h, rest)) if &h.magic == MAGIC => Some((h, rest)),
            _ => None,
        };
        let Some((h, rest)) = header else {
            info!("no header found; loading {} raw bytes", bytes.len());
            return Ok(Self {
                data: bytes,
                start: 0,
            });
        };

        let size = h.size.get() as usize;
        ensure!(
            rest.len() >= size,
            "header claims {size} bytes, but only {} follow",
            rest.len()
        );
        let data = &rest[..size];
        let crc = crc32(data);
        if crc != h.crc.get() {
            warn!(
                "checksum mismatch: header has {:#010x}, data has {crc:#010x}",
                h.crc.get()
            );
        }
        info!(
            "loaded v{}.{} image: {size} bytes, start at {:#06x}",
            h.version >> 4,
            h.version & 0xF,
            h.start.get()
        );
        Ok(Self {
            data,
            start: h.start.get(),
        })
    }
}

/// CRC-32 (IEEE, reflected, polynomial `0xEDB88320`)
fn crc32(data: &[u8]) -> u32 {
    let mut crc = !0u32;
    for &b in data {
        crc ^= u32::from(b);
        for _ in 0..8 {
            let mask = (crc & 1).wrapping_neg();
            crc = (crc >> 1) ^ (0xEDB8_8320 & mask);
        }
    }
    !crc
}
