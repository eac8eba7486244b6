//! PBT テスト共通ユーティリティ

use proptest::prelude::*;

// ========================================
// トークン生成 (RFC 9110 Section 5.6.2)
// ========================================

/// tchar から英数字と一部の記号
pub fn token_char() -> impl Strategy<Value = char> {
    prop_oneof![
        prop::char::range('a', 'z'),
        prop::char::range('A', 'Z'),
        prop::char::range('0', '9'),
        Just('-'),
        Just('_'),
        Just('.'),
        Just('!'),
        Just('~'),
    ]
}

pub fn token_string(max_len: usize) -> impl Strategy<Value = String> {
    proptest::collection::vec(token_char(), 1..=max_len)
        .prop_map(|chars| chars.into_iter().collect())
}

/// HTTP メソッド
pub fn http_method() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("GET".to_string()),
        Just("POST".to_string()),
        Just("PUT".to_string()),
        Just("DELETE".to_string()),
        token_string(10),
    ]
}

/// リクエストターゲット (空白を含まない)
pub fn request_target() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("/".to_string()),
        "/[a-zA-Z0-9/_.?=&-]{1,64}".prop_map(|s| s),
    ]
}

/// ヘッダー値 (前後の空白なし)
pub fn header_value() -> impl Strategy<Value = String> {
    "[!-~]([ -~]{0,30}[!-~])?".prop_map(|s| s)
}

pub fn headers() -> impl Strategy<Value = Vec<(String, String)>> {
    proptest::collection::vec((token_string(24), header_value()), 0..8)
}

pub fn body() -> impl Strategy<Value = Vec<u8>> {
    proptest::collection::vec(any::<u8>(), 0..256)
}

/// リクエストをワイヤー形式に組み立てる
///
/// `with_length` が true なら Content-Length を付ける。
pub fn encode_request(
    method: &str,
    target: &str,
    headers: &[(String, String)],
    body: &[u8],
    with_length: bool,
) -> Vec<u8> {
    let mut buf = format!("{method} {target} HTTP/1.1\r\n").into_bytes();
    for (name, value) in headers {
        buf.extend_from_slice(format!("{name}: {value}\r\n").as_bytes());
    }
    if with_length {
        buf.extend_from_slice(format!("Content-Length: {}\r\n", body.len()).as_bytes());
    }
    buf.extend_from_slice(b"\r\n");
    buf.extend_from_slice(body);
    buf
}
