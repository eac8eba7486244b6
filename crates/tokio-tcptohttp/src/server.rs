//! HTTP サーバー
//!
//! tokio を使用した非同期 HTTP サーバー。接続ごとにタスクを起動し、
//! リクエストを 1 つ処理したら接続を閉じる。
//!
//! ## 使い方
//!
//! ```ignore
//! use tokio_tcptohttp::{HandlerError, Request, serve};
//!
//! let handle = serve(42069, |output: &mut Vec<u8>, request: &Request| {
//!     if request.target() == "/yourproblem" {
//!         return Err(HandlerError::bad_request("Your bad\n"));
//!     }
//!     output.extend_from_slice(b"All good\n");
//!     Ok(())
//! })
//! .await?;
//!
//! // ...
//! handle.close().await?;
//! ```

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tcptohttp::ParserLimits;
use tokio::net::{TcpListener, ToSocketAddrs};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::Instrument;

use crate::connection::ConnectionHandler;
use crate::error::Result;
use crate::handler::Handler;

/// 接続処理の設定
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// 1 回の read で読み取る最大バイト数 (デフォルト: 8192)
    pub read_buffer_size: usize,
    /// read の期限 (デフォルト: なし)
    pub read_timeout: Option<Duration>,
    /// レスポンス書き込みの期限 (デフォルト: なし)
    pub write_timeout: Option<Duration>,
    /// パースエラー時に 400 Bad Request を返すか (デフォルト: true)
    pub respond_on_parse_error: bool,
    /// パーサーの制限
    pub limits: ParserLimits,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            read_buffer_size: 8192,
            read_timeout: None,
            write_timeout: None,
            respond_on_parse_error: true,
            limits: ParserLimits::default(),
        }
    }
}

/// HTTP サーバー
///
/// `bind()` でリスナーを作成し、設定後に `serve()` で accept ループを開始する。
pub struct Server {
    listener: TcpListener,
    config: ServerConfig,
}

impl Server {
    /// 指定アドレスにバインド
    pub async fn bind<A: ToSocketAddrs>(addr: A) -> Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self {
            listener,
            config: ServerConfig::default(),
        })
    }

    /// 設定をまとめて指定
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// 読み取りバッファサイズを設定
    pub fn read_buffer_size(mut self, size: usize) -> Self {
        self.config.read_buffer_size = size.max(1);
        self
    }

    /// read の期限を設定
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.config.read_timeout = Some(timeout);
        self
    }

    /// 書き込みの期限を設定
    pub fn write_timeout(mut self, timeout: Duration) -> Self {
        self.config.write_timeout = Some(timeout);
        self
    }

    /// パースエラー時に 400 Bad Request を返すかを設定
    pub fn respond_on_parse_error(mut self, respond: bool) -> Self {
        self.config.respond_on_parse_error = respond;
        self
    }

    /// パーサーの制限を設定
    pub fn limits(mut self, limits: ParserLimits) -> Self {
        self.config.limits = limits;
        self
    }

    /// ローカルアドレスを取得
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// accept ループを別タスクで開始する
    ///
    /// 返された `ServerHandle` を `close()` するまで接続を受け付ける。
    /// ハンドルを drop した場合も accept ループは終了する。
    pub fn serve<H: Handler>(self, handler: H) -> Result<ServerHandle> {
        let local_addr = self.listener.local_addr()?;
        let closed = Arc::new(AtomicBool::new(false));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        tracing::info!(address = %local_addr, "server listening");

        let accept_task = tokio::spawn(accept_loop(
            self.listener,
            Arc::new(self.config),
            Arc::new(handler),
            closed.clone(),
            shutdown_rx,
        ));

        Ok(ServerHandle {
            local_addr,
            closed,
            shutdown_tx,
            accept_task,
        })
    }
}

/// 全インターフェースの指定ポートで待ち受けてサーバーを開始する
///
/// ポート 0 を指定すると空いているポートが割り当てられる。
pub async fn serve<H: Handler>(port: u16, handler: H) -> Result<ServerHandle> {
    Server::bind(("0.0.0.0", port)).await?.serve(handler)
}

/// 起動中のサーバー
pub struct ServerHandle {
    local_addr: SocketAddr,
    closed: Arc<AtomicBool>,
    shutdown_tx: watch::Sender<bool>,
    accept_task: JoinHandle<Result<()>>,
}

impl ServerHandle {
    /// 待ち受けアドレス
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// `close()` が呼ばれたか、accept ループが終了しているか
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire) || self.accept_task.is_finished()
    }

    /// サーバーを停止する
    ///
    /// accept ループに停止を通知し、リスナーが閉じられるまで待つ。
    /// 処理中の接続はキャンセルせず、それぞれの完了まで動き続ける。
    /// accept ループがエラーで終了していた場合はそのエラーを返す。
    pub async fn close(self) -> Result<()> {
        self.closed.store(true, Ordering::Release);
        // 受信側が既に終了していても問題ない
        let _ = self.shutdown_tx.send(true);
        let result = self.accept_task.await?;
        tracing::info!(address = %self.local_addr, "server closed");
        result
    }
}

async fn accept_loop<H: Handler>(
    listener: TcpListener,
    config: Arc<ServerConfig>,
    handler: Arc<H>,
    closed: Arc<AtomicBool>,
    mut shutdown_rx: watch::Receiver<bool>,
) -> Result<()> {
    loop {
        let (stream, peer_addr) = tokio::select! {
            biased;
            _ = shutdown_rx.changed() => break,
            accepted = listener.accept() => match accepted {
                Ok(accepted) => accepted,
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                    closed.store(true, Ordering::Release);
                    return Err(e.into());
                }
            },
        };

        // close と accept が同時に完了した場合は受け付けた接続を捨てる
        if closed.load(Ordering::Acquire) {
            drop(stream);
            break;
        }

        tracing::debug!(peer = %peer_addr, "connection accepted");
        let connection = ConnectionHandler::new(stream, config.clone(), handler.clone());
        tokio::spawn(
            async move {
                if let Err(e) = connection.run().await {
                    tracing::warn!(error = %e, "connection error");
                }
            }
            .instrument(tracing::info_span!("connection", peer = %peer_addr)),
        );
    }
    Ok(())
}
