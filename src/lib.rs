//! # tcptohttp
//!
//! 生のバイトストリーム上で動く HTTP/1.1 リクエストパーサーとレスポンスライター (Sans I/O)
//!
//! ## 特徴
//!
//! - **Sans I/O**: I/O を完全に分離した設計。トランスポートは呼び出し側が持つ
//! - **再開可能**: 任意の位置で分割されたデータを順に `feed()` できる
//! - **HTTP/1.1 のみ**: keep-alive、パイプライン、chunked 転送は扱わない
//!
//! ## 使い方
//!
//! ```rust
//! use tcptohttp::{RequestParser, StatusCode, encode_response};
//!
//! let mut parser = RequestParser::new();
//! parser
//!     .feed(b"GET /coffee HTTP/1.1\r\nHost: localhost:42069\r\n\r\n")
//!     .unwrap();
//! // ストリーム終端に達したら確定する
//! let request = parser.finish().unwrap();
//! assert_eq!(request.target(), "/coffee");
//!
//! let bytes = encode_response(StatusCode::Ok, b"All good\n");
//! assert!(bytes.starts_with(b"HTTP/1.1 200 OK\r\n"));
//! ```

mod error;
mod headers;
mod limits;
mod parser;
mod request;
mod response;

pub use error::Error;
pub use headers::HeaderMap;
pub use limits::ParserLimits;
pub use parser::{ParserState, RequestParser, request_from_reader};
pub use request::{Request, RequestLine};
pub use response::{
    StatusCode, default_headers, encode_response, write_headers, write_response,
    write_status_line,
};
