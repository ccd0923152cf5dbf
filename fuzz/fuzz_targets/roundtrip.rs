#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let coded = ahed::encode_bytes(data).unwrap();
    let decoded = ahed::decode_bytes(&coded).unwrap();
    assert_eq!(data, &decoded[..]);
});
