use tokio_tcptohttp::{HandlerError, Request, serve};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const PORT: u16 = 42069;

fn handler(output: &mut Vec<u8>, request: &Request) -> Result<(), HandlerError> {
    match request.target() {
        "/myproblem" => Err(HandlerError::internal("Woopsie, my bad!\n")),
        "/yourproblem" => Err(HandlerError::internal("Your bad\n")),
        _ => {
            output.extend_from_slice(b"All good frfr\n");
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "httpserver=info,tokio_tcptohttp=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let handle = serve(PORT, handler).await?;
    tracing::info!(port = PORT, "server started");

    tokio::signal::ctrl_c().await?;
    handle.close().await?;
    tracing::info!("server gracefully stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use tokio_tcptohttp::{HeaderMap, RequestLine, StatusCode};

    use super::*;

    fn get(target: &str) -> Request {
        Request {
            request_line: RequestLine {
                method: "GET".to_string(),
                target: target.to_string(),
                http_version: "1.1".to_string(),
            },
            headers: HeaderMap::new(),
            body: Vec::new(),
        }
    }

    #[test]
    fn routes() {
        let mut output = Vec::new();
        handler(&mut output, &get("/")).unwrap();
        assert_eq!(output, b"All good frfr\n");

        let err = handler(&mut Vec::new(), &get("/myproblem")).unwrap_err();
        assert_eq!(err.status, StatusCode::InternalServerError);
        assert_eq!(err.message, "Woopsie, my bad!\n");

        let err = handler(&mut Vec::new(), &get("/yourproblem")).unwrap_err();
        assert_eq!(err.status, StatusCode::InternalServerError);
        assert_eq!(err.message, "Your bad\n");
    }
}
