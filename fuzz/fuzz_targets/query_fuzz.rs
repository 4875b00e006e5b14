//! Query fuzz target: the first line of input is the query text, the rest is the data.
//! Parsing and evaluation must not panic; they return output or an error.
//! Build with: cargo fuzz run query_fuzz (requires nightly and cargo fuzz).

#![cfg_attr(fuzzing, no_main)]

#[cfg(fuzzing)]
use libfuzzer_sys::fuzz_target;

#[cfg(fuzzing)]
fuzz_target!(|data: &[u8]| {
    let split = data.iter().position(|&b| b == b'\n').unwrap_or(data.len());
    let query = match std::str::from_utf8(&data[..split]) {
        Ok(x) => x,
        Err(_) => return,
    };
    let input = data.get(split + 1..).unwrap_or(&[]);
    let _ = tlvq::Evaluator::default().evaluate_str(input, query);
});

#[cfg(not(fuzzing))]
fn main() {
    eprintln!("Build with: cargo fuzz run query_fuzz");
}
