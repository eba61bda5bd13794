use log::warn;
use tools_shared::utils::crypto::decrypt;

/// Decoded name table of a WLD file.
///
/// Names are addressed by negated byte offsets: a reference of `-n` points at
/// the NUL terminated string starting `n` bytes into the table.
#[derive(Debug, Clone, Default)]
pub struct StringTable {
    data: Vec<u8>,
}

impl StringTable {
    pub fn decode(encoded: &[u8]) -> Self {
        Self {
            data: decrypt(encoded),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Resolves a name reference. Zero and positive references carry no name.
    pub fn name(&self, reference: i32) -> String {
        if reference >= 0 {
            return String::new();
        }

        let offset = reference.unsigned_abs() as usize;
        let Some(tail) = self.data.get(offset..) else {
            warn!(
                "name reference {} points past the {} bytes string table",
                reference,
                self.data.len()
            );
            return String::new();
        };

        let end = tail.iter().position(|&c| c == 0).unwrap_or(tail.len());
        String::from_utf8_lossy(&tail[..end]).into_owned()
    }
}
