//! Decoder fuzz target: decode arbitrary bytes and render the tree.
//! Decoding must not panic or overflow the stack; it returns a tree or an error.
//! Build with: cargo fuzz run decode_fuzz (requires nightly and cargo fuzz).

#![cfg_attr(fuzzing, no_main)]

#[cfg(fuzzing)]
use libfuzzer_sys::fuzz_target;

#[cfg(fuzzing)]
fuzz_target!(|data: &[u8]| {
    let root = match tlvq::Decoder::default().decode_root(data) {
        Ok(r) => r,
        Err(_) => return,
    };
    let _ = tlvq::render(&root, tlvq::Modifier::Pretty);
    let _ = tlvq::find_tag(&root, 0x04);
});

#[cfg(not(fuzzing))]
fn main() {
    eprintln!("Build with: cargo fuzz run decode_fuzz");
}
