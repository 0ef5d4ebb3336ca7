use std::io::Cursor;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use super::*;

fn tiny_png() -> Vec<u8> {
    let img = image::RgbaImage::from_raw(2, 2, vec![200u8; 16]).unwrap();
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn fetcher() -> AvatarFetcher {
    AvatarFetcher::new(&AvatarConfig::default()).unwrap()
}

fn temp_dir(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "quotestick_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ))
}

/// Serve exactly one HTTP response on a random local port.
async fn serve_once(status_line: &'static str, body: Vec<u8>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut sock, _) = listener.accept().await.unwrap();
        let mut req = [0u8; 1024];
        let _ = sock.read(&mut req).await;
        let head = format!(
            "HTTP/1.1 {status_line}\r\nContent-Type: image/png\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            body.len()
        );
        sock.write_all(head.as_bytes()).await.unwrap();
        sock.write_all(&body).await.unwrap();
        sock.shutdown().await.unwrap();
    });
    format!("http://{addr}/avatar.png")
}

/// Serve one chunked response without a Content-Length, `chunks` pieces of `chunk` bytes each.
/// Reports how many chunks were written before the client hung up.
async fn serve_chunked(
    chunk: usize,
    chunks: usize,
) -> (String, tokio::task::JoinHandle<usize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let (mut sock, _) = listener.accept().await.unwrap();
        let mut req = [0u8; 1024];
        let _ = sock.read(&mut req).await;
        let head = "HTTP/1.1 200 OK\r\nContent-Type: image/png\r\nTransfer-Encoding: chunked\r\n\r\n";
        if sock.write_all(head.as_bytes()).await.is_err() {
            return 0;
        }
        let piece = format!("{chunk:x}\r\n{}\r\n", "a".repeat(chunk));
        let mut sent = 0;
        for _ in 0..chunks {
            if sock.write_all(piece.as_bytes()).await.is_err() || sock.flush().await.is_err() {
                return sent;
            }
            sent += 1;
            tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        }
        let _ = sock.write_all(b"0\r\n\r\n").await;
        let _ = sock.shutdown().await;
        sent
    });
    (format!("http://{addr}/avatar.png"), handle)
}

#[tokio::test]
async fn data_url_is_decoded() {
    let png = tiny_png();
    let encoded: String = png.iter().map(|b| format!("%{b:02X}")).collect();
    let src = AvatarSource::url(format!("data:image/png,{encoded}"));
    assert_eq!(fetcher().fetch(&src).await.unwrap(), png);
}

#[tokio::test]
async fn file_url_is_read() {
    let dir = temp_dir("fetch_file");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("pic.png");
    std::fs::write(&path, tiny_png()).unwrap();

    let url = Url::from_file_path(&path).unwrap();
    let bytes = fetcher()
        .fetch(&AvatarSource::url(url.as_str()))
        .await
        .unwrap();
    assert_eq!(bytes, tiny_png());
}

#[tokio::test]
async fn http_url_is_downloaded() {
    let url = serve_once("200 OK", tiny_png()).await;
    let bytes = fetcher().fetch(&AvatarSource::url(url)).await.unwrap();
    assert_eq!(bytes, tiny_png());
}

#[tokio::test]
async fn http_error_status_is_an_avatar_error() {
    let url = serve_once("404 Not Found", b"nope".to_vec()).await;
    let err = fetcher().fetch(&AvatarSource::url(url)).await.unwrap_err();
    assert!(matches!(err, QuoteError::AvatarFetch(_)));
}

#[tokio::test]
async fn invalid_and_unsupported_urls_fail_softly() {
    let f = fetcher();
    for raw in ["not a url at all", "ftp://example.com/a.png", "file:///no/such/avatar.png"] {
        let err = f.fetch(&AvatarSource::url(raw)).await.unwrap_err();
        assert!(!err.is_fatal(), "{raw}: {err}");
    }
}

#[tokio::test]
async fn oversized_bytes_are_rejected() {
    let f = AvatarFetcher::new(&AvatarConfig {
        max_bytes: 4,
        ..AvatarConfig::default()
    })
    .unwrap();
    let err = f
        .fetch(&AvatarSource::Bytes(vec![0u8; 5]))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("limit is 4"));
}

#[tokio::test]
async fn chunked_body_within_limit_is_read() {
    let (url, server) = serve_chunked(100, 5).await;
    let bytes = fetcher().fetch(&AvatarSource::url(url)).await.unwrap();
    assert_eq!(bytes.len(), 500);
    assert_eq!(server.await.unwrap(), 5);
}

#[tokio::test]
async fn chunked_body_over_limit_stops_early() {
    let f = AvatarFetcher::new(&AvatarConfig {
        max_bytes: 1024,
        ..AvatarConfig::default()
    })
    .unwrap();
    let (url, server) = serve_chunked(512, 2000).await;
    let err = f.fetch(&AvatarSource::url(url)).await.unwrap_err();
    assert!(err.to_string().contains("limit is 1024"), "{err}");
    assert!(!err.is_fatal());

    let sent = server.await.unwrap();
    assert!(sent < 2000, "server wrote the whole body ({sent} chunks)");
}
