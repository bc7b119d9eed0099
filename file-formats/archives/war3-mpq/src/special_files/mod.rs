//! Special MPQ files: (listfile), (attributes), (signature)

mod listfile;

pub use listfile::{build_listfile, parse_listfile};

/// Name of the file listing every member of the archive
pub const LISTFILE: &str = "(listfile)";

/// Name of the per-file checksum and timestamp file
pub const ATTRIBUTES: &str = "(attributes)";

/// Name of the weak signature file
pub const SIGNATURE: &str = "(signature)";
