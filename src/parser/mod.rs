//! HTTP/1.1 リクエストパーサーモジュール
//!
//! Sans I/O 設計に基づく再開可能なパーサーを提供。
//!
//! ## 使い方
//!
//! ```rust
//! use tcptohttp::{ParserState, RequestParser};
//!
//! let mut parser = RequestParser::new();
//! let mut buf = Vec::new();
//!
//! // 任意の位置で分割されたデータを順に受け取る
//! for chunk in [&b"GET /cof"[..], b"fee HTTP/1.1\r\nHo", b"st: localhost\r\n\r\n"] {
//!     buf.extend_from_slice(chunk);
//!     let consumed = parser.feed(&buf).unwrap();
//!     buf.drain(..consumed);
//! }
//! assert_eq!(parser.state(), ParserState::ParsingBody);
//!
//! // ストリーム終端で確定
//! let request = parser.finish().unwrap();
//! assert_eq!(request.target(), "/coffee");
//! assert_eq!(request.header("Host"), Some("localhost"));
//! ```

mod request;
mod state;

pub use request::{RequestParser, request_from_reader};
pub use state::ParserState;
