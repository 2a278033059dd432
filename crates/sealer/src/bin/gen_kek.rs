//! Generates a fresh random 256-bit KEK for the local KMS backend.
//!
//! Prints the key in base64 URL-safe unpadded form, ready to paste into the
//! `LOCAL_KEKS` JSON map.

use aes_gcm_siv::{
    aead::{KeyInit, OsRng},
    Aes256GcmSiv,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};

fn main() {
    let key = Aes256GcmSiv::generate_key(OsRng);
    println!("{}", URL_SAFE_NO_PAD.encode(key));
}
