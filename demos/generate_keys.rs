//! Prints a fresh Ed25519 session signing key for `JWT_PRIVATE_KEY`.

use faculty_eval::auth::session::SessionConfig;

fn main() {
    let (private_key, public_key) = SessionConfig::generate_key_pair();

    println!("Session signing key for .env:");
    println!("JWT_PRIVATE_KEY={}", private_key);
    println!();
    println!("Verification key:");
    println!("{}", public_key);
}
