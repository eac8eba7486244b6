//! 1 接続分の処理
//!
//! 受信データをパーサーに渡してリクエストを組み立て、ハンドラーを呼び、
//! レスポンスを書き出して接続を閉じる。keep-alive はしない。

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tcptohttp::{ParserState, Request, RequestParser, StatusCode, encode_response};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::Result;
use crate::handler::Handler;
use crate::server::ServerConfig;

/// 1 つの接続を所有して処理する
pub struct ConnectionHandler<S, H> {
    stream: S,
    config: Arc<ServerConfig>,
    handler: Arc<H>,
}

impl<S, H> ConnectionHandler<S, H>
where
    S: AsyncRead + AsyncWrite + Unpin,
    H: Handler,
{
    pub fn new(stream: S, config: Arc<ServerConfig>, handler: Arc<H>) -> Self {
        Self {
            stream,
            config,
            handler,
        }
    }

    /// リクエストを 1 つ処理して接続を閉じる
    ///
    /// 書き込みの成否に関わらず接続は閉じる。
    pub async fn run(mut self) -> Result<()> {
        let result = match self.read_request().await {
            Ok(request) => self.respond(&request).await,
            Err(e) => {
                if self.config.respond_on_parse_error && e.is_bad_request() {
                    let message = format!("{e}\n");
                    if let Err(write_err) = self
                        .write_response(StatusCode::BadRequest, message.as_bytes())
                        .await
                    {
                        tracing::debug!(error = %write_err, "failed to send 400 response");
                    }
                }
                Err(e)
            }
        };

        if let Err(e) = self.stream.shutdown().await {
            tracing::debug!(error = %e, "shutdown failed");
        }
        result
    }

    /// ストリーム終端、または宣言された Content-Length 分のボディが揃うまで読み取る
    async fn read_request(&mut self) -> Result<Request> {
        let mut parser = RequestParser::with_limits(self.config.limits.clone());
        // 長さ 0 のバッファでは read が常に 0 を返し終端と区別できない
        let read_buffer_size = self.config.read_buffer_size.max(1);
        let mut buf = Vec::with_capacity(read_buffer_size);
        let mut chunk = vec![0u8; read_buffer_size];

        loop {
            let n = with_deadline(self.config.read_timeout, self.stream.read(&mut chunk)).await?;
            if n == 0 {
                if parser.state() != ParserState::ParsingBody {
                    tracing::debug!(state = ?parser.state(), "stream ended before request head");
                }
                break;
            }

            buf.extend_from_slice(&chunk[..n]);
            let consumed = parser.feed(&buf)?;
            buf.drain(..consumed);

            // 不正な Content-Length はストリーム終端を待たずに拒否する
            if parser.state().is_head_complete() {
                parser.declared_content_length()?;
            }
            if parser.has_complete_body() {
                break;
            }
        }

        Ok(parser.finish()?)
    }

    async fn respond(&mut self, request: &Request) -> Result<()> {
        let mut output = Vec::new();
        let (status, body) = match self.handler.handle(&mut output, request) {
            Ok(()) => (StatusCode::Ok, output),
            Err(e) => (e.status, e.message.into_bytes()),
        };
        tracing::info!(
            method = request.method(),
            target = request.target(),
            status = status.as_u16(),
            "request handled"
        );
        self.write_response(status, &body).await
    }

    /// レスポンスを書き出してフラッシュする
    async fn write_response(&mut self, status: StatusCode, body: &[u8]) -> Result<()> {
        let bytes = encode_response(status, body);
        let stream = &mut self.stream;
        with_deadline(self.config.write_timeout, async {
            stream.write_all(&bytes).await?;
            stream.flush().await
        })
        .await
    }
}

/// 期限付きで I/O を待つ
async fn with_deadline<T, F>(deadline: Option<Duration>, fut: F) -> Result<T>
where
    F: Future<Output = std::io::Result<T>>,
{
    match deadline {
        Some(duration) => Ok(tokio::time::timeout(duration, fut).await??),
        None => Ok(fut.await?),
    }
}

#[cfg(test)]
mod tests {
    use tcptohttp::ParserLimits;
    use tokio::io::{AsyncReadExt, AsyncWriteExt, duplex};

    use super::*;
    use crate::error::Error;
    use crate::handler::HandlerError;

    fn echo_target(output: &mut Vec<u8>, request: &Request) -> std::result::Result<(), HandlerError> {
        output.extend_from_slice(request.target().as_bytes());
        Ok(())
    }

    async fn exchange(input: &[u8], config: ServerConfig) -> (Result<()>, String) {
        let (mut client, server) = duplex(1024);
        let connection = ConnectionHandler::new(server, Arc::new(config), Arc::new(echo_target));
        let task = tokio::spawn(connection.run());

        client.write_all(input).await.unwrap();
        client.shutdown().await.unwrap();
        let mut response = String::new();
        client.read_to_string(&mut response).await.unwrap();

        (task.await.unwrap(), response)
    }

    #[tokio::test]
    async fn responds_to_request() {
        let (result, response) =
            exchange(b"GET /coffee HTTP/1.1\r\nHost: x\r\n\r\n", ServerConfig::default()).await;
        result.unwrap();
        assert_eq!(
            response,
            "HTTP/1.1 200 OK\r\nContent-Length: 7\r\nConnection: close\r\nContent-Type: text/plain\r\n\r\n/coffee"
        );
    }

    #[tokio::test]
    async fn truncated_request_gets_400() {
        let (result, response) =
            exchange(b"GET / HTTP/1.1\r\nHost: x\r\n", ServerConfig::default()).await;
        assert!(matches!(
            result,
            Err(Error::Http(tcptohttp::Error::TruncatedRequest))
        ));
        assert!(response.starts_with("HTTP/1.1 400 Bad Request\r\n"));
    }

    #[tokio::test]
    async fn parse_error_without_response() {
        let config = ServerConfig {
            respond_on_parse_error: false,
            ..ServerConfig::default()
        };
        let (result, response) = exchange(b"GET / HTTP/2.0\r\n\r\n", config).await;
        assert!(matches!(
            result,
            Err(Error::Http(tcptohttp::Error::UnsupportedHttpVersion(_)))
        ));
        assert!(response.is_empty());
    }

    #[tokio::test]
    async fn body_limit_gets_400() {
        let config = ServerConfig {
            limits: ParserLimits {
                max_body_size: 2,
                ..ParserLimits::default()
            },
            ..ServerConfig::default()
        };
        let (result, response) =
            exchange(b"POST / HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello", config).await;
        assert!(matches!(
            result,
            Err(Error::Http(tcptohttp::Error::BodyTooLarge { .. }))
        ));
        assert!(response.starts_with("HTTP/1.1 400 Bad Request\r\n"));
    }

    #[tokio::test]
    async fn content_length_completes_without_eof() {
        let (mut client, server) = duplex(1024);
        let connection = ConnectionHandler::new(
            server,
            Arc::new(ServerConfig::default()),
            Arc::new(echo_target),
        );
        let task = tokio::spawn(connection.run());

        // 書き込み側を閉じずにレスポンスを待つ
        client
            .write_all(b"POST /items HTTP/1.1\r\nContent-Length: 2\r\n\r\nhi")
            .await
            .unwrap();
        let mut response = String::new();
        client.read_to_string(&mut response).await.unwrap();

        task.await.unwrap().unwrap();
        assert!(response.ends_with("\r\n\r\n/items"));
    }

    #[tokio::test]
    async fn invalid_content_length_without_eof() {
        let (mut client, server) = duplex(1024);
        let connection = ConnectionHandler::new(
            server,
            Arc::new(ServerConfig::default()),
            Arc::new(echo_target),
        );
        let task = tokio::spawn(connection.run());

        // 書き込み側を閉じずにレスポンスを待つ
        client
            .write_all(b"POST / HTTP/1.1\r\nContent-Length: abc\r\n\r\n")
            .await
            .unwrap();
        let mut response = String::new();
        tokio::time::timeout(Duration::from_secs(2), client.read_to_string(&mut response))
            .await
            .unwrap()
            .unwrap();

        assert!(matches!(
            task.await.unwrap(),
            Err(Error::Http(tcptohttp::Error::InvalidContentLength(_)))
        ));
        assert!(response.starts_with("HTTP/1.1 400 Bad Request\r\n"));
        assert!(response.contains("invalid content-length"));
    }

    #[tokio::test]
    async fn zero_read_buffer_size() {
        let config = ServerConfig {
            read_buffer_size: 0,
            ..ServerConfig::default()
        };
        let (result, response) =
            exchange(b"GET /coffee HTTP/1.1\r\nHost: x\r\n\r\n", config).await;
        result.unwrap();
        assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(response.ends_with("\r\n\r\n/coffee"));
    }

    #[tokio::test]
    async fn read_timeout() {
        let config = ServerConfig {
            read_timeout: Some(Duration::from_millis(50)),
            ..ServerConfig::default()
        };
        let (mut client, server) = duplex(1024);
        let connection = ConnectionHandler::new(server, Arc::new(config), Arc::new(echo_target));
        let task = tokio::spawn(connection.run());

        client.write_all(b"GET / HTTP/1.1\r\n").await.unwrap();
        let result = task.await.unwrap();
        assert!(matches!(result, Err(Error::Timeout)));
    }
}
