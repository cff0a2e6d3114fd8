use rand::Rng;

/// Alphabet used for generated identifiers: A-Z, a-z, 0-9.
const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Length used for storage object keys.
pub const KEY_ID_LEN: usize = 21;

/// Length used for downloaded file names.
pub const FILE_ID_LEN: usize = 8;

/// Generate a random opaque identifier of the given length.
///
/// Used to name uploaded objects and downloaded files. The ids are not
/// cryptographic — they only need to be collision-unlikely within one
/// storage namespace.
pub fn nano_id(len: usize) -> String {
    let mut rng = rand::rng();
    (0..len)
        .map(|_| {
            let idx = rng.random_range(0..ALPHABET.len());
            ALPHABET[idx] as char
        })
        .collect()
}
