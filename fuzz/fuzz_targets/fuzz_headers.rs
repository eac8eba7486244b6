#![no_main]

use libfuzzer_sys::fuzz_target;
use tcptohttp::HeaderMap;

fuzz_target!(|data: &[u8]| {
    let mut headers = HeaderMap::new();
    let mut pos = 0;
    while pos < data.len() {
        match headers.parse(&data[pos..]) {
            Ok((n, done)) => {
                pos += n;
                if done || n == 0 {
                    break;
                }
            }
            Err(_) => return,
        }
    }

    for (name, value) in headers.iter() {
        assert_eq!(name, name.to_ascii_lowercase());
        assert!(!value.starts_with(' '));
        assert_eq!(headers.get(&name.to_ascii_uppercase()), Some(value));
    }
    let _ = headers.content_length();
});
