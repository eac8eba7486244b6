//! tokio_tcptohttp - Tokio integration for tcptohttp
//!
//! tokio を使用した非同期 HTTP/1.1 サーバー。
//!
//! ## 特徴
//!
//! - **tcptohttp ベース**: Sans I/O パーサーをベースにした設計
//! - **接続ごとのタスク**: 接続ごとに独立したタスクで処理する。プールや上限はない
//! - **1 接続 1 リクエスト**: レスポンス送信後に必ず接続を閉じる (`Connection: close`)
//!
//! ## サーバー
//!
//! ```ignore
//! use tokio_tcptohttp::{HandlerError, Request, Server};
//!
//! fn handler(output: &mut Vec<u8>, request: &Request) -> Result<(), HandlerError> {
//!     match request.target() {
//!         "/myproblem" => Err(HandlerError::internal("Woopsie, my bad!\n")),
//!         _ => {
//!             output.extend_from_slice(b"All good\n");
//!             Ok(())
//!         }
//!     }
//! }
//!
//! let handle = Server::bind("0.0.0.0:42069")
//!     .await?
//!     .read_timeout(std::time::Duration::from_secs(30))
//!     .serve(handler)?;
//! handle.close().await?;
//! ```

pub mod connection;
pub mod error;
pub mod handler;
pub mod server;

pub use connection::ConnectionHandler;
pub use error::{Error, Result};
pub use handler::{Handler, HandlerError};
pub use server::{Server, ServerConfig, ServerHandle, serve};

// tcptohttp の型を re-export
pub use tcptohttp::{HeaderMap, ParserLimits, Request, RequestLine, StatusCode};
