#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Arbitrary input may be rejected, but must never panic.
    let mut decoder = ahed::Decoder::new(data);
    while let Ok(Some(_)) = decoder.decode_byte() {}
    if let Err(err) = decoder.tree().validate() {
        panic!("{err}");
    }
});
