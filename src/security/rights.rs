//! Access-mask to named-rights mapping (spec.md section 4.2, "mapping raw
//! access masks to named rights"; section 6, "ACL entries render as
//! `identity=rights_name_set`").

/// Named rights bits, most to least specific. Ordered so the same mask
/// always renders to the same joined string run after run.
const NAMED_RIGHTS: &[(u32, &str)] = &[
    (0x8000_0000, "GenericRead"),
    (0x4000_0000, "GenericWrite"),
    (0x2000_0000, "GenericExecute"),
    (0x1000_0000, "GenericAll"),
    (0x0010_0000, "Synchronize"),
    (0x0008_0000, "WriteOwner"),
    (0x0004_0000, "WriteDac"),
    (0x0002_0000, "ReadControl"),
    (0x0001_0000, "Delete"),
    (0x0000_0100, "WriteAttributes"),
    (0x0000_0080, "ReadAttributes"),
    (0x0000_0040, "DeleteChild"),
    (0x0000_0020, "Execute"),
    (0x0000_0010, "WriteExtendedAttributes"),
    (0x0000_0008, "ReadExtendedAttributes"),
    (0x0000_0004, "AppendData"),
    (0x0000_0002, "WriteData"),
    (0x0000_0001, "ReadData"),
];

/// `FILE_ALL_ACCESS`: `STANDARD_RIGHTS_REQUIRED | SYNCHRONIZE | 0x1FF`.
const FULL_CONTROL_MASK: u32 = 0x001F_01FF;

/// Renders a raw access mask as a stable, comma-joined set of right names.
/// A mask that covers every `FILE_ALL_ACCESS` bit collapses to `FullControl`
/// rather than spelling out its constituents.
#[must_use]
pub fn mask_to_names(mask: u32) -> String {
    if mask & FULL_CONTROL_MASK == FULL_CONTROL_MASK {
        return "FullControl".to_owned();
    }

    let names: Vec<&str> = NAMED_RIGHTS
        .iter()
        .filter(|(bit, _)| *bit != 0 && mask & bit == *bit)
        .map(|(_, name)| *name)
        .collect();

    if names.is_empty() {
        format!("0x{mask:08X}")
    } else {
        names.join(",")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_control_collapses_to_one_name() {
        assert_eq!(mask_to_names(FULL_CONTROL_MASK), "FullControl");
        assert_eq!(mask_to_names(0xFFFF_FFFF), "FullControl");
    }

    #[test]
    fn partial_mask_joins_names() {
        let mask = 0x0000_0001 | 0x0000_0002;
        assert_eq!(mask_to_names(mask), "WriteData,ReadData");
    }

    #[test]
    fn unrecognized_bits_render_as_hex() {
        assert_eq!(mask_to_names(0), "0x00000000");
    }
}
