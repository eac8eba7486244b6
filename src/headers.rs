//! ヘッダーフィールドのパースと格納

use crate::error::Error;
use crate::limits::ParserLimits;

const CRLF: &[u8] = b"\r\n";

/// ヘッダーフィールドの集合
///
/// フィールド名は小文字に正規化して格納する。同名のフィールドが複数回現れた場合は
/// 既存の値に `", "` で連結する (元の行の区切りは失われる)。
/// 反復順は最初に挿入された順。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMap {
    entries: Vec<(String, String)>,
}

impl HeaderMap {
    /// 空のヘッダーを作成
    pub fn new() -> Self {
        Self::default()
    }

    /// バッファ先頭からヘッダー行をパースする
    ///
    /// 完全な行 (CRLF 終端) だけを消費し、末尾の不完全な行はそのまま残す。
    /// 戻り値は `(消費したバイト数, ヘッダーセクションが終わったか)`。
    ///
    /// ```rust
    /// use tcptohttp::HeaderMap;
    ///
    /// let mut headers = HeaderMap::new();
    /// let (n, done) = headers.parse(b"Host: localhost:42069\r\n\r\n").unwrap();
    /// assert_eq!(n, 25);
    /// assert!(done);
    /// assert_eq!(headers.get("host"), Some("localhost:42069"));
    /// ```
    pub fn parse(&mut self, buf: &[u8]) -> Result<(usize, bool), Error> {
        let mut line_count = 0;
        self.parse_limited(buf, &ParserLimits::unlimited(), &mut line_count)
    }

    /// 制限付きでパースする (RequestParser 用)
    ///
    /// `line_count` は呼び出しをまたいで数えたフィールド行数。
    pub(crate) fn parse_limited(
        &mut self,
        buf: &[u8],
        limits: &ParserLimits,
        line_count: &mut usize,
    ) -> Result<(usize, bool), Error> {
        let mut read = 0;
        loop {
            let rest = &buf[read..];
            let Some(pos) = find_line(rest) else {
                let size = pending_line_len(rest);
                if size > limits.max_line_size {
                    return Err(Error::LineTooLong {
                        size,
                        limit: limits.max_line_size,
                    });
                }
                return Ok((read, false));
            };

            if pos == 0 {
                return Ok((read + CRLF.len(), true));
            }
            if pos > limits.max_line_size {
                return Err(Error::LineTooLong {
                    size: pos,
                    limit: limits.max_line_size,
                });
            }
            if *line_count >= limits.max_headers_count {
                return Err(Error::TooManyHeaders {
                    count: *line_count + 1,
                    limit: limits.max_headers_count,
                });
            }

            let (name, value) = parse_field_line(&rest[..pos])?;
            self.add(&name, &value);
            *line_count += 1;
            read += pos + CRLF.len();
        }
    }

    /// ヘッダー値を取得 (大文字小文字を区別しない)
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// ヘッダーが存在するか確認
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// ヘッダー値を設定 (既存の値は置き換える)
    pub fn set(&mut self, name: &str, value: &str) {
        let name = name.to_ascii_lowercase();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, v)) => *v = value.to_string(),
            None => self.entries.push((name, value.to_string())),
        }
    }

    /// ヘッダー値を追加 (既存の値があれば `", "` で連結する)
    pub fn add(&mut self, name: &str, value: &str) {
        let name = name.to_ascii_lowercase();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, v)) => {
                v.push_str(", ");
                v.push_str(value);
            }
            None => self.entries.push((name, value.to_string())),
        }
    }

    /// ヘッダーを削除して値を返す
    pub fn remove(&mut self, name: &str) -> Option<String> {
        let pos = self
            .entries
            .iter()
            .position(|(n, _)| n.eq_ignore_ascii_case(name))?;
        Some(self.entries.remove(pos).1)
    }

    /// ヘッダー数
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// ヘッダーが空か
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(小文字のフィールド名, 値)` を挿入順に返す
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Content-Length ヘッダーの値を取得
    ///
    /// ヘッダーがなければ `Ok(None)`。数字以外を含む場合や、同じ値を畳み込んだ
    /// `"5, 5"` のような値はエラーにする。
    pub fn content_length(&self) -> Result<Option<usize>, Error> {
        let Some(value) = self.get("content-length") else {
            return Ok(None);
        };
        if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidContentLength(value.to_string()));
        }
        value
            .parse::<usize>()
            .map(Some)
            .map_err(|_| Error::InvalidContentLength(value.to_string()))
    }
}

/// CRLF の位置を探す
pub(crate) fn find_line(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|w| w == CRLF)
}

/// CRLF が届いていない行の長さ
///
/// 末尾の `\r` は次の read で `\n` が続く可能性があるため数えない。
pub(crate) fn pending_line_len(buf: &[u8]) -> usize {
    buf.len() - usize::from(buf.ends_with(b"\r"))
}

/// `name: value` 形式の 1 行をパースする (CRLF は含まない)
fn parse_field_line(line: &[u8]) -> Result<(String, String), Error> {
    let colon = line
        .iter()
        .position(|&b| b == b':')
        .ok_or(Error::MalformedFieldLine)?;
    let (name, value) = (&line[..colon], &line[colon + 1..]);

    if name.is_empty() || !name.iter().copied().all(is_token_char) {
        return Err(Error::MalformedFieldName(
            String::from_utf8_lossy(name).into_owned(),
        ));
    }

    let value = std::str::from_utf8(value).map_err(|_| Error::MalformedFieldLine)?;
    let value = value.trim_matches(|c| c == ' ' || c == '\t');

    // トークン文字のみなので ASCII として扱える
    let name = String::from_utf8_lossy(name).to_ascii_lowercase();
    Ok((name, value.to_string()))
}

/// HTTP トークン文字か判定 (RFC 9110 Section 5.6.2)
pub(crate) fn is_token_char(b: u8) -> bool {
    matches!(
        b,
        b'!' | b'#' | b'$' | b'%' | b'&' | b'\'' | b'*' | b'+' | b'-' | b'.' |
        b'0'..=b'9' | b'A'..=b'Z' | b'^' | b'_' | b'`' | b'a'..=b'z' | b'|' | b'~'
    )
}

/// フィールド名を `Content-Length` のような表記に変換する
pub(crate) fn canonical_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = true;
    for c in name.chars() {
        if upper {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c.to_ascii_lowercase());
        }
        upper = c == '-';
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(input: &[u8]) -> (HeaderMap, Result<(usize, bool), Error>) {
        let mut headers = HeaderMap::new();
        let result = headers.parse(input);
        (headers, result)
    }

    #[test]
    fn single_header() {
        let (headers, result) = parsed(b"Host: localhost:42069\r\n\r\n");
        assert_eq!(result.unwrap(), (25, true));
        assert_eq!(headers.get("host"), Some("localhost:42069"));
        assert_eq!(headers.len(), 1);
    }

    #[test]
    fn leading_whitespace_rejected() {
        let (_, result) = parsed(b"  Host: localhost:42069\r\n\r\n");
        assert!(matches!(result, Err(Error::MalformedFieldName(_))));
    }

    #[test]
    fn whitespace_before_colon_rejected() {
        let (_, result) = parsed(b"host : localhost:42069\r\n\r\n");
        assert!(matches!(result, Err(Error::MalformedFieldName(_))));
    }

    #[test]
    fn value_is_trimmed() {
        let (headers, result) = parsed(b"Host:    localhost:42069   \r\n\r\n");
        assert_eq!(result.unwrap(), (31, true));
        assert_eq!(headers.get("Host"), Some("localhost:42069"));
    }

    #[test]
    fn section_not_finished() {
        let (headers, result) = parsed(b"Host:    localhost:42069   \r\n");
        assert_eq!(result.unwrap(), (29, false));
        assert_eq!(headers.get("host"), Some("localhost:42069"));
    }

    #[test]
    fn partial_line_left_untouched() {
        let (headers, result) = parsed(b"Host: a\r\nAccept: */");
        assert_eq!(result.unwrap(), (9, false));
        assert_eq!(headers.len(), 1);
        assert!(!headers.contains("accept"));
    }

    #[test]
    fn non_token_name_rejected() {
        let (_, result) = parsed("H\u{a9}st: localhost:42069\r\n\r\n".as_bytes());
        assert!(matches!(result, Err(Error::MalformedFieldName(_))));
    }

    #[test]
    fn missing_colon_rejected() {
        let (_, result) = parsed(b"Host localhost\r\n\r\n");
        assert!(matches!(result, Err(Error::MalformedFieldLine)));
    }

    #[test]
    fn empty_name_rejected() {
        let (_, result) = parsed(b": value\r\n\r\n");
        assert!(matches!(result, Err(Error::MalformedFieldName(_))));
    }

    #[test]
    fn repeated_names_are_folded() {
        let (headers, result) = parsed(b"Set-person: person1\r\nSet-person: person2\r\n\r\n");
        assert_eq!(result.unwrap(), (44, true));
        assert_eq!(headers.get("set-person"), Some("person1, person2"));
        assert_eq!(headers.len(), 1);
    }

    #[test]
    fn folding_ignores_name_case() {
        let (headers, result) = parsed(b"X-Tag: a\r\nx-tag: b\r\nX-TAG: c\r\n\r\n");
        assert!(result.unwrap().1);
        assert_eq!(headers.get("x-tag"), Some("a, b, c"));
    }

    #[test]
    fn blank_line_only() {
        let (headers, result) = parsed(b"\r\nbody");
        assert_eq!(result.unwrap(), (2, true));
        assert!(headers.is_empty());
    }

    #[test]
    fn empty_value_allowed() {
        let (headers, result) = parsed(b"X-Empty:\r\n\r\n");
        assert!(result.unwrap().1);
        assert_eq!(headers.get("x-empty"), Some(""));
    }

    #[test]
    fn line_limit() {
        let limits = ParserLimits {
            max_line_size: 8,
            ..ParserLimits::default()
        };
        let mut headers = HeaderMap::new();
        let mut count = 0;
        let result = headers.parse_limited(b"X-Long-Name: v", &limits, &mut count);
        assert!(matches!(result, Err(Error::LineTooLong { .. })));
    }

    #[test]
    fn line_at_limit_split_inside_crlf() {
        let limits = ParserLimits {
            max_line_size: 8,
            ..ParserLimits::default()
        };
        let mut headers = HeaderMap::new();
        let mut count = 0;
        // "X-Ab: cd" はちょうど 8 バイト
        let result = headers.parse_limited(b"X-Ab: cd\r", &limits, &mut count);
        assert_eq!(result.unwrap(), (0, false));
        let result = headers.parse_limited(b"X-Ab: cd\r\n\r\n", &limits, &mut count);
        assert_eq!(result.unwrap(), (12, true));
        assert_eq!(headers.get("x-ab"), Some("cd"));

        // \r の後にさらにデータが続く場合は \r も行の一部
        let result = headers.parse_limited(b"X-Ab: c\rd", &limits, &mut count);
        assert!(matches!(result, Err(Error::LineTooLong { size: 9, limit: 8 })));
    }

    #[test]
    fn header_count_limit() {
        let limits = ParserLimits {
            max_headers_count: 2,
            ..ParserLimits::default()
        };
        let mut headers = HeaderMap::new();
        let mut count = 0;
        let result = headers.parse_limited(b"A: 1\r\nB: 2\r\nC: 3\r\n\r\n", &limits, &mut count);
        assert!(matches!(
            result,
            Err(Error::TooManyHeaders { count: 3, limit: 2 })
        ));
    }

    #[test]
    fn set_replaces_and_remove() {
        let mut headers = HeaderMap::new();
        headers.add("Content-Type", "text/html");
        headers.set("content-type", "text/plain");
        assert_eq!(headers.get("CONTENT-TYPE"), Some("text/plain"));
        assert_eq!(headers.remove("Content-Type"), Some("text/plain".to_string()));
        assert!(headers.is_empty());
    }

    #[test]
    fn content_length_values() {
        let mut headers = HeaderMap::new();
        assert_eq!(headers.content_length().unwrap(), None);
        headers.set("Content-Length", "24");
        assert_eq!(headers.content_length().unwrap(), Some(24));
        headers.set("Content-Length", "-1");
        assert!(matches!(
            headers.content_length(),
            Err(Error::InvalidContentLength(_))
        ));
        headers.set("Content-Length", "5, 5");
        assert!(headers.content_length().is_err());
    }

    #[test]
    fn canonical_names() {
        assert_eq!(canonical_name("content-length"), "Content-Length");
        assert_eq!(canonical_name("connection"), "Connection");
        assert_eq!(canonical_name("x-request-id"), "X-Request-Id");
    }
}
