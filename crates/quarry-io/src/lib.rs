//! Region container reading for McRegion (`.mcr`) and Anvil (`.mca`) saves.
#![forbid(unsafe_code)]

pub mod anvil;
pub mod mcregion;
pub mod region;

pub use region::{RegionStore, region_file_name};

/// Aux nibble `i` of a packed nibble array: low nibble first.
#[inline]
pub(crate) fn nibble(data: &[i8], i: usize) -> u8 {
    match data.get(i / 2) {
        Some(&b) => {
            let b = b as u8;
            if i % 2 == 0 { b & 0x0F } else { b >> 4 }
        }
        None => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::nibble;

    #[test]
    fn nibbles_low_first() {
        let data = [0x21u8 as i8, 0xF0u8 as i8];
        assert_eq!(nibble(&data, 0), 1);
        assert_eq!(nibble(&data, 1), 2);
        assert_eq!(nibble(&data, 2), 0);
        assert_eq!(nibble(&data, 3), 15);
        assert_eq!(nibble(&data, 9), 0);
    }
}
