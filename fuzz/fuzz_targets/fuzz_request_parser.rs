#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use tcptohttp::{ParserLimits, ParserState, RequestParser};

#[derive(Debug, Arbitrary)]
struct Input {
    data: Vec<u8>,
    chunk_size: u8,
    max_line_size: u16,
    max_headers_count: u8,
    max_body_size: u16,
}

fuzz_target!(|input: Input| {
    let limits = ParserLimits {
        max_line_size: usize::from(input.max_line_size),
        max_headers_count: usize::from(input.max_headers_count),
        max_body_size: usize::from(input.max_body_size),
    };

    // 一括で feed
    let mut parser = RequestParser::with_limits(limits.clone());
    let whole = match parser.feed(&input.data) {
        Ok(_) => parser.finish().ok(),
        Err(_) => None,
    };

    // 分割して feed (ストリーミングシナリオ)
    let chunk_size = usize::from(input.chunk_size).max(1);
    let mut parser = RequestParser::with_limits(limits);
    let mut buf = Vec::new();
    for chunk in input.data.chunks(chunk_size) {
        buf.extend_from_slice(chunk);
        let Ok(consumed) = parser.feed(&buf) else {
            return;
        };
        assert!(consumed <= buf.len());
        buf.drain(..consumed);
        // 行単位の状態では未消費分に完全な行が残らない
        if parser.state() != ParserState::ParsingBody {
            assert!(!buf.windows(2).any(|w| w == b"\r\n"));
        }
    }
    let split = parser.finish().ok();

    // 分割位置によって成否や結果が変わらない
    assert_eq!(whole.is_some(), split.is_some());
    if let (Some(whole), Some(split)) = (whole, split) {
        assert_eq!(whole, split);
    }
});
