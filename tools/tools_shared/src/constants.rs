pub const PFS_MAGIC: [u8; 4] = *b"PFS ";

// CRC of the entry holding the file name directory instead of a file
pub const DIRECTORY_CRC: u32 = 0x61580AC9;

pub const DIRECTORY_ENTRY_SIZE: usize = 12;
pub const CHUNK_HEADER_SIZE: usize = 8;

// Upper bound of the DEFLATE expansion ratio
pub const MAX_INFLATE_RATIO: usize = 1032;

// Debug output some producers leave in the directory
pub const IGNORED_FILE_NAMES: [&str; 1] = ["trace.dbg"];

pub const TEXTURE_EXTENSIONS: [&str; 2] = [".bmp", ".dds"];
pub const WLD_EXTENSION: &str = ".wld";

// Key used to obfuscate WLD string tables and texture file names
pub const HASH_KEY: [u8; 8] = [0x95, 0x3A, 0xC5, 0x2A, 0x95, 0x7A, 0x95, 0x6A];

// Little-endian u32 fields of a BMP header
pub const BMP_WIDTH_OFFSET: usize = 0x12;
pub const BMP_HEIGHT_OFFSET: usize = 0x16;
