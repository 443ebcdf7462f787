//! Minimal in-process HTTP target for tests: serves the health and decide
//! endpoints on a random loopback port and tracks how many decide requests
//! were in flight at once.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

#[derive(Clone)]
pub struct TargetOptions {
    pub health_status: u16,
    pub decide_status: u16,
    /// Delay applied to a decide request, keyed by the probe index found in
    /// the request body.
    pub decide_delay_ms: Option<fn(usize) -> u64>,
}

impl Default for TargetOptions {
    fn default() -> Self {
        TargetOptions {
            health_status: 200,
            decide_status: 200,
            decide_delay_ms: None,
        }
    }
}

pub struct Target {
    pub base_url: String,
    /// Highest number of decide requests observed in flight simultaneously.
    pub high_water: Arc<AtomicUsize>,
    pub decide_hits: Arc<AtomicUsize>,
}

pub async fn spawn_target(options: TargetOptions) -> Target {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    let high_water = Arc::new(AtomicUsize::new(0));
    let decide_hits = Arc::new(AtomicUsize::new(0));
    let in_flight = Arc::new(AtomicUsize::new(0));

    let accept_high_water = Arc::clone(&high_water);
    let accept_decide_hits = Arc::clone(&decide_hits);
    tokio::spawn(async move {
        loop {
            let Ok((socket, _)) = listener.accept().await else {
                break;
            };
            let options = options.clone();
            let in_flight = Arc::clone(&in_flight);
            let high_water = Arc::clone(&accept_high_water);
            let decide_hits = Arc::clone(&accept_decide_hits);
            tokio::spawn(async move {
                let _ = serve(socket, options, in_flight, high_water, decide_hits).await;
            });
        }
    });

    Target {
        base_url,
        high_water,
        decide_hits,
    }
}

/// A target that accepts connections but never responds, for exercising
/// client-side timeouts.
pub async fn spawn_black_hole() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    tokio::spawn(async move {
        let mut sockets = Vec::new();
        loop {
            let Ok((socket, _)) = listener.accept().await else {
                break;
            };
            // Hold the connection open without ever writing a response.
            sockets.push(socket);
        }
    });

    base_url
}

async fn serve(
    mut socket: TcpStream,
    options: TargetOptions,
    in_flight: Arc<AtomicUsize>,
    high_water: Arc<AtomicUsize>,
    decide_hits: Arc<AtomicUsize>,
) -> std::io::Result<()> {
    let request = read_request(&mut socket).await?;

    let status = if request.starts_with("GET /api/v1/health") {
        options.health_status
    } else if request.starts_with("POST /api/v1/decide") {
        decide_hits.fetch_add(1, Ordering::SeqCst);
        let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        high_water.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = options.decide_delay_ms {
            tokio::time::sleep(Duration::from_millis(delay(probe_index(&request)))).await;
        }

        in_flight.fetch_sub(1, Ordering::SeqCst);
        options.decide_status
    } else {
        404
    };

    let body = "{}";
    let response = format!(
        "HTTP/1.1 {} OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );
    socket.write_all(response.as_bytes()).await?;
    socket.shutdown().await
}

/// Read one request, waiting for the full body announced by content-length.
async fn read_request(socket: &mut TcpStream) -> std::io::Result<String> {
    let mut buf = Vec::with_capacity(4096);
    let mut chunk = [0u8; 2048];

    loop {
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        if let Some(header_end) = find_header_end(&buf) {
            let headers = String::from_utf8_lossy(&buf[..header_end]).into_owned();
            let content_length = headers
                .lines()
                .find_map(|line| {
                    let lower = line.to_ascii_lowercase();
                    lower
                        .strip_prefix("content-length:")
                        .and_then(|value| value.trim().parse::<usize>().ok())
                })
                .unwrap_or(0);
            if buf.len() >= header_end + 4 + content_length {
                break;
            }
        }
    }

    Ok(String::from_utf8_lossy(&buf).into_owned())
}

fn find_header_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|window| window == b"\r\n\r\n")
}

/// Pull the probe index out of the decide payload's `"probe"` field.
fn probe_index(request: &str) -> usize {
    request
        .split("\"probe\":")
        .nth(1)
        .and_then(|rest| {
            let digits: String = rest
                .trim_start()
                .chars()
                .take_while(|c| c.is_ascii_digit())
                .collect();
            digits.parse().ok()
        })
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_index_is_parsed_from_the_body() {
        let request = "POST /api/v1/decide HTTP/1.1\r\n\r\n{\"probe\":17,\"table_key\":\"x\"}";
        assert_eq!(probe_index(request), 17);
    }

    #[test]
    fn missing_probe_field_defaults_to_zero() {
        assert_eq!(probe_index("POST /api/v1/decide HTTP/1.1\r\n\r\n{}"), 0);
    }
}
