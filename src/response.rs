//! HTTP レスポンスの書き出し

use std::fmt;
use std::io::Write;

use crate::error::Error;
use crate::headers::{HeaderMap, canonical_name};

/// サポートするステータスコード
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    /// 200 OK
    Ok,
    /// 400 Bad Request
    BadRequest,
    /// 500 Internal Server Error
    InternalServerError,
}

impl StatusCode {
    /// 数値のステータスコード
    pub fn as_u16(self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::BadRequest => 400,
            StatusCode::InternalServerError => 500,
        }
    }

    /// ステータスフレーズ
    pub fn reason_phrase(self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::InternalServerError => "Internal Server Error",
        }
    }
}

impl TryFrom<u16> for StatusCode {
    type Error = Error;

    fn try_from(code: u16) -> Result<Self, Self::Error> {
        match code {
            200 => Ok(StatusCode::Ok),
            400 => Ok(StatusCode::BadRequest),
            500 => Ok(StatusCode::InternalServerError),
            _ => Err(Error::UnsupportedStatus(code)),
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.as_u16(), self.reason_phrase())
    }
}

/// ステータスラインを書き出す
///
/// `HTTP/1.1 <code> <reason>\r\n`
pub fn write_status_line<W: Write>(w: &mut W, status: StatusCode) -> Result<(), Error> {
    write!(w, "HTTP/1.1 {}\r\n", status)?;
    Ok(())
}

/// ヘッダーと終端の空行を書き出す
///
/// フィールド名は `Content-Length` のような表記で出力する。
pub fn write_headers<W: Write>(w: &mut W, headers: &HeaderMap) -> Result<(), Error> {
    for (name, value) in headers.iter() {
        write!(w, "{}: {}\r\n", canonical_name(name), value)?;
    }
    w.write_all(b"\r\n")?;
    Ok(())
}

/// デフォルトのレスポンスヘッダーを作成
pub fn default_headers(body_len: usize) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.set("Content-Length", &body_len.to_string());
    headers.set("Connection", "close");
    headers.set("Content-Type", "text/plain");
    headers
}

/// ステータスライン、デフォルトヘッダー、ボディをまとめて書き出す
pub fn write_response<W: Write>(w: &mut W, status: StatusCode, body: &[u8]) -> Result<(), Error> {
    write_status_line(w, status)?;
    write_headers(w, &default_headers(body.len()))?;
    w.write_all(body)?;
    Ok(())
}

/// レスポンスをバイト列にエンコード
pub fn encode_response(status: StatusCode, body: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(128 + body.len());
    // Vec への書き込みは失敗しない
    let _ = write_response(&mut buf, status, body);
    buf
}
