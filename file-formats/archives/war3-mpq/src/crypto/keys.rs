//! Static tables shared by the hash function and the cipher

/// The 0x500-entry table behind every MPQ hash and encryption step
pub static ENCRYPTION_TABLE: [u32; 0x500] = generate_encryption_table();

/// Uppercase folding table used by the name hash
pub static ASCII_TO_UPPER: [u8; 256] = generate_ascii_to_upper();

const fn generate_encryption_table() -> [u32; 0x500] {
    let mut table = [0u32; 0x500];
    let mut seed: u32 = 0x0010_0001;

    let mut i = 0;
    while i < 0x100 {
        let mut j = 0;
        while j < 5 {
            seed = (seed * 125 + 3) % 0x002A_AAAB;
            let high = (seed & 0xFFFF) << 0x10;
            seed = (seed * 125 + 3) % 0x002A_AAAB;
            let low = seed & 0xFFFF;

            table[i + j * 0x100] = high | low;
            j += 1;
        }
        i += 1;
    }

    table
}

const fn generate_ascii_to_upper() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut i = 0;
    while i < 256 {
        let ch = i as u8;
        table[i] = ch.to_ascii_uppercase();
        i += 1;
    }
    table
}
