use rand::RngCore;

/// Generate a secure random hex string from `bytes` random bytes.
pub fn generate_hex(bytes: usize) -> String {
    let mut buf = vec![0u8; bytes];
    rand::thread_rng().fill_bytes(&mut buf);
    hex::encode(buf)
}
