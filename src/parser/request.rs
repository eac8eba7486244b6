//! HTTP リクエストパーサー

use std::io::{ErrorKind, Read};

use crate::error::Error;
use crate::headers::{HeaderMap, find_line, is_token_char, pending_line_len};
use crate::limits::ParserLimits;
use crate::request::{Request, RequestLine};

use super::state::ParserState;

const CRLF_LEN: usize = 2;

/// `request_from_reader` が 1 回の read で読み取るバイト数
const READ_CHUNK_SIZE: usize = 1024;

/// HTTP リクエストパーサー (Sans I/O)
///
/// 受信したバイト列を `feed()` に渡すと、先頭から完全な単位 (行) だけを消費して
/// 消費したバイト数を返す。消費されなかったバイトは呼び出し側が保持し、
/// 次のデータと連結して再度 `feed()` する。
///
/// ボディの終端はパーサーでは判定しない。呼び出し側がストリーム終端などで
/// 完了を判断し、`finish()` を呼ぶ。
///
/// ```rust
/// use tcptohttp::{ParserState, RequestParser};
///
/// let mut parser = RequestParser::new();
/// let data = b"POST /coffee HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello";
/// let consumed = parser.feed(data).unwrap();
/// assert_eq!(consumed, data.len());
/// assert_eq!(parser.state(), ParserState::ParsingBody);
///
/// let request = parser.finish().unwrap();
/// assert_eq!(request.method(), "POST");
/// assert_eq!(request.body, b"hello");
/// ```
#[derive(Debug)]
pub struct RequestParser {
    state: ParserState,
    request_line: Option<RequestLine>,
    headers: HeaderMap,
    /// 畳み込み前のフィールド行数
    header_lines: usize,
    body: Vec<u8>,
    limits: ParserLimits,
}

impl Default for RequestParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestParser {
    /// 新しいパーサーを作成
    pub fn new() -> Self {
        Self::with_limits(ParserLimits::default())
    }

    /// 制限付きでパーサーを作成
    pub fn with_limits(limits: ParserLimits) -> Self {
        Self {
            state: ParserState::Init,
            request_line: None,
            headers: HeaderMap::new(),
            header_lines: 0,
            body: Vec::new(),
            limits,
        }
    }

    /// 制限設定を取得
    pub fn limits(&self) -> &ParserLimits {
        &self.limits
    }

    /// 現在の状態
    pub fn state(&self) -> ParserState {
        self.state
    }

    /// パース済みのリクエストライン
    pub fn request_line(&self) -> Option<&RequestLine> {
        self.request_line.as_ref()
    }

    /// パース済みのヘッダー
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// これまでに蓄積したボディ
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// ヘッダーで宣言された Content-Length
    ///
    /// ヘッダーセクションが終わる前は `Ok(None)` を返す。
    pub fn declared_content_length(&self) -> Result<Option<usize>, Error> {
        if !self.state.is_head_complete() {
            return Ok(None);
        }
        self.headers.content_length()
    }

    /// 宣言された Content-Length 分のボディが揃ったか
    ///
    /// Content-Length がない場合は常に false。終端はストリームの終わりで決まる。
    pub fn has_complete_body(&self) -> bool {
        self.state == ParserState::ParsingBody
            && matches!(self.headers.content_length(), Ok(Some(len)) if self.body.len() >= len)
    }

    /// バイト列をパースする
    ///
    /// 戻り値は先頭から消費したバイト数。データ不足の場合は 0 を返す。
    /// 1 回の呼び出しで進められるところまで状態を進める。
    pub fn feed(&mut self, buf: &[u8]) -> Result<usize, Error> {
        let mut read = 0;
        loop {
            let rest = &buf[read..];
            let n = match self.state {
                ParserState::Init => self.parse_request_line(rest)?,
                ParserState::ParsingHeaders => {
                    let (n, done) =
                        self.headers
                            .parse_limited(rest, &self.limits, &mut self.header_lines)?;
                    if done {
                        self.transition(ParserState::ParsingBody);
                    }
                    n
                }
                ParserState::ParsingBody => self.append_body(rest)?,
                ParserState::Done => 0,
            };
            if n == 0 {
                return Ok(read);
            }
            read += n;
        }
    }

    /// ストリーム終端でリクエストを確定する
    ///
    /// ヘッダーセクションが終わっていなければ `TruncatedRequest`。
    /// Content-Length が宣言されていれば、ボディ長と一致するか検証する。
    pub fn finish(&mut self) -> Result<Request, Error> {
        match self.state {
            ParserState::Init | ParserState::ParsingHeaders => Err(Error::TruncatedRequest),
            ParserState::Done => Err(Error::ParserFinished),
            ParserState::ParsingBody => {
                if let Some(declared) = self.headers.content_length()? {
                    if declared != self.body.len() {
                        return Err(Error::BodyLengthMismatch {
                            declared,
                            actual: self.body.len(),
                        });
                    }
                }
                let request_line = self.request_line.take().ok_or(Error::TruncatedRequest)?;
                self.transition(ParserState::Done);
                Ok(Request {
                    request_line,
                    headers: std::mem::take(&mut self.headers),
                    body: std::mem::take(&mut self.body),
                })
            }
        }
    }

    /// ブロッキングな reader からストリーム終端まで読み取ってリクエストを構築する
    pub fn read_from<R: Read>(&mut self, mut reader: R) -> Result<Request, Error> {
        let mut buf = Vec::with_capacity(READ_CHUNK_SIZE);
        let mut chunk = [0u8; READ_CHUNK_SIZE];
        loop {
            let n = match reader.read(&mut chunk) {
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            let consumed = self.feed(&buf)?;
            buf.drain(..consumed);
        }
        self.finish()
    }

    fn transition(&mut self, next: ParserState) {
        tracing::trace!(from = ?self.state, to = ?next, "request parser state");
        self.state = next;
    }

    /// `METHOD SP TARGET SP HTTP/1.1 CRLF`
    fn parse_request_line(&mut self, buf: &[u8]) -> Result<usize, Error> {
        let Some(pos) = find_line(buf) else {
            let size = pending_line_len(buf);
            if size > self.limits.max_line_size {
                return Err(Error::LineTooLong {
                    size,
                    limit: self.limits.max_line_size,
                });
            }
            return Ok(0);
        };
        if pos > self.limits.max_line_size {
            return Err(Error::LineTooLong {
                size: pos,
                limit: self.limits.max_line_size,
            });
        }

        let raw = &buf[..pos];
        let line = std::str::from_utf8(raw)
            .map_err(|_| Error::MalformedStartLine(String::from_utf8_lossy(raw).into_owned()))?;

        let parts: Vec<&str> = line.split(' ').collect();
        let [method, target, version] = parts[..] else {
            return Err(Error::MalformedStartLine(line.to_string()));
        };
        if method.is_empty() || !method.bytes().all(is_token_char) || target.is_empty() {
            return Err(Error::MalformedStartLine(line.to_string()));
        }

        let Some((protocol, http_version)) = version.split_once('/') else {
            return Err(Error::MalformedHttpFormat(version.to_string()));
        };
        if protocol != "HTTP" || http_version != "1.1" {
            return Err(Error::UnsupportedHttpVersion(version.to_string()));
        }

        self.request_line = Some(RequestLine {
            method: method.to_string(),
            target: target.to_string(),
            http_version: http_version.to_string(),
        });
        self.transition(ParserState::ParsingHeaders);
        Ok(pos + CRLF_LEN)
    }

    fn append_body(&mut self, buf: &[u8]) -> Result<usize, Error> {
        let size = self.body.len() + buf.len();
        if size > self.limits.max_body_size {
            return Err(Error::BodyTooLarge {
                size,
                limit: self.limits.max_body_size,
            });
        }
        self.body.extend_from_slice(buf);
        Ok(buf.len())
    }
}

/// reader からリクエストを 1 つ読み取る
///
/// ストリーム終端までをボディとして扱う。
pub fn request_from_reader<R: Read>(reader: R) -> Result<Request, Error> {
    RequestParser::new().read_from(reader)
}
