use crate::constants::HASH_KEY;

// XOR with a repeating 8 bytes key, so encoding and decoding are the same operation
pub fn decrypt_in_place(data: &mut [u8]) {
    for (idx, byte) in data.iter_mut().enumerate() {
        *byte ^= HASH_KEY[idx % HASH_KEY.len()];
    }
}

pub fn decrypt(data: &[u8]) -> Vec<u8> {
    let mut decrypted = data.to_vec();
    decrypt_in_place(&mut decrypted);
    decrypted
}
