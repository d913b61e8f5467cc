//! One invocation: materialise, preview, send, print.
//!
//! When the request is both dumped and sent, the send runs on its own task
//! while the preview is rendered; the result comes back through a oneshot
//! channel. Each request is sent at most once.

use std::io::Write;

use anyhow::{anyhow, Context};
use tokio::sync::oneshot;

use crate::net::{dump_request, dump_response, Client, Response};
use crate::render::{render, Style};
use crate::request::RequestConfig;

/// Runs `cfg` and writes everything meant for the user to `out`.
pub async fn execute<W: Write>(mut cfg: RequestConfig, client: &Client, style: Style, out: &mut W) -> anyhow::Result<()> {
    let mut req = cfg.to_transport_request().context("building request")?;

    let preview = if cfg.options.dump_request { Some(dump_request(&mut req)?) } else { None };

    let pending = if cfg.options.send_request {
        let (tx, rx) = oneshot::channel();
        let client = client.clone();
        tokio::spawn(async move {
            let _ = tx.send(client.send(req).await);
        });
        Some(rx)
    } else {
        log::info!("send disabled, preview only");
        None
    };

    if let Some(dump) = &preview {
        let drawn = render(dump, style).map_err(anyhow::Error::from).and_then(|text| {
            out.write_all(text.as_bytes())?;
            Ok(())
        });
        if let Err(e) = drawn {
            // the request may already be on the wire; report its outcome before failing
            if let Some(rx) = pending {
                match rx.await {
                    Ok(Ok(resp)) => log::warn!("sent despite preview failure: {} {}", resp.status.as_str(), resp.status_text()),
                    Ok(Err(send_err)) => log::warn!("send failed as well: {send_err}"),
                    Err(_) => log::warn!("send task ended without a result"),
                }
            }
            return Err(e.context("rendering request preview"));
        }
    }

    let Some(rx) = pending else {
        return Ok(());
    };
    let resp = rx.await.map_err(|_| anyhow!("send task ended without a result"))??;

    if preview.is_some() {
        out.write_all(b"\n")?;
    }
    print_response(&resp, cfg.options.dump_response, style, out)?;
    out.flush()?;
    Ok(())
}

fn print_response<W: Write>(resp: &Response, as_tree: bool, style: Style, out: &mut W) -> anyhow::Result<()> {
    if as_tree {
        let dump = dump_response(&mut resp.to_http())?;
        out.write_all(render(&dump, style)?.as_bytes())?;
        return Ok(());
    }

    resp.write_body_to(out)?;
    if !resp.body.ends_with(b"\n") {
        out.write_all(b"\n")?;
    }
    if !resp.is_successful() {
        log::warn!("{} {}", resp.status.as_str(), resp.status_text());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::Body;
    use crate::config::ClientConfig;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    async fn serve_once(response: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 64 * 1024];
            let _ = sock.read(&mut buf).await.unwrap();
            sock.write_all(response.as_bytes()).await.unwrap();
            sock.shutdown().await.unwrap();
        });
        format!("http://{addr}/echo")
    }

    fn client() -> Client {
        Client::new(ClientConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn preview_only_never_connects() {
        let mut cfg = RequestConfig::new("http://127.0.0.1:9/never").unwrap();
        cfg.options.send_request = false;
        cfg.options.dump_request = true;
        cfg.set_body(Body::generic(&b"hi"[..], None));

        let mut out = Vec::new();
        execute(cfg, &client(), Style::Plain, &mut out).await.unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("GET /never HTTP/1.1\n"));
        assert!(text.ends_with("└── Body: 2 B of text/plain; charset=utf-8\n"));
    }

    #[tokio::test]
    async fn preview_then_response_tree() {
        let url = serve_once("HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: 2\r\nConnection: close\r\n\r\nok")
            .await;
        let mut cfg = RequestConfig::new(&url).unwrap();
        cfg.options.dump_request = true;
        cfg.options.dump_response = true;

        let mut out = Vec::new();
        execute(cfg, &client(), Style::Plain, &mut out).await.unwrap();
        let text = String::from_utf8(out).unwrap();

        let (preview, response) = text.split_once("\n\n").unwrap();
        assert!(preview.starts_with("GET /echo HTTP/1.1"));
        assert!(response.starts_with("HTTP/1.1 200 OK\n"));
        assert!(response.ends_with("└── Body: 2 B of text/plain\n"));
    }

    #[tokio::test]
    async fn raw_body_is_newline_terminated() {
        let url = serve_once("HTTP/1.1 404 Not Found\r\nContent-Length: 4\r\nConnection: close\r\n\r\ngone").await;
        let cfg = RequestConfig::new(&url).unwrap();

        let mut out = Vec::new();
        execute(cfg, &client(), Style::Plain, &mut out).await.unwrap();
        assert_eq!(out, b"gone\n");
    }

    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn failed_preview_still_waits_for_the_send() {
        use std::sync::atomic::{AtomicBool, Ordering};
        use std::sync::Arc;

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let served = Arc::new(AtomicBool::new(false));
        let flag = served.clone();
        tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 64 * 1024];
            let _ = sock.read(&mut buf).await.unwrap();
            flag.store(true, Ordering::SeqCst);
            sock.write_all(b"HTTP/1.1 204 No Content\r\nConnection: close\r\n\r\n").await.unwrap();
            sock.shutdown().await.unwrap();
        });

        let mut cfg = RequestConfig::new(&format!("http://{addr}/")).unwrap();
        cfg.options.dump_request = true;

        let err = execute(cfg, &client(), Style::Plain, &mut Broken).await.unwrap_err();
        assert!(err.to_string().contains("rendering request preview"), "{err:#}");
        assert!(served.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn transport_errors_surface() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let cfg = RequestConfig::new(&format!("http://{addr}/")).unwrap();
        let mut out = Vec::new();
        let err = execute(cfg, &client(), Style::Plain, &mut out).await.unwrap_err();
        assert!(matches!(err.downcast_ref::<crate::errors::Error>(), Some(crate::errors::Error::SendFailed(_))));
    }
}
