//! Newline-delimited JSON-RPC transport.
//!
//! [`StdioTransport`] spawns the tool server as a child process and talks to
//! it over its stdin/stdout. One request is in flight at a time: the pipes
//! are locked for the whole write-then-read round trip, so responses never
//! interleave. The timeout covers only the wait for the response, and a
//! request line cut off by cancellation is terminated before the next one.
//!
//! While waiting for a response the reader skips:
//!
//! - lines that are not JSON objects (banners, stray log output)
//! - notifications from the server
//! - responses to earlier requests that already timed out
//!
//! Requests *from* the server are answered with "method not found".

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::error::{McpError, Result};
use super::protocol::{
    JsonRpcRequest, JsonRpcResponse, MessageKind, RpcError, classify_message,
};

/// Request/notify channel to an MCP peer
#[async_trait]
pub trait McpTransport: Send + Sync {
    /// Send a request and wait for its result.
    async fn request(&self, method: &str, params: Option<Value>) -> Result<Value>;

    /// Send a notification. No response is expected.
    async fn notify(&self, method: &str, params: Option<Value>) -> Result<()>;
}

type BoxReader = Box<dyn AsyncRead + Send + Unpin>;
type BoxWriter = Box<dyn AsyncWrite + Send + Unpin>;

struct Pipes {
    reader: BufReader<BoxReader>,
    writer: BoxWriter,
    /// A send started but never finished; the peer holds a partial line.
    line_open: bool,
}

impl Pipes {
    /// Write one message line. A write cut off by cancellation leaves a
    /// partial line behind, so the next send terminates it first and the
    /// peer discards only that fragment.
    async fn send<T: serde::Serialize>(&mut self, message: &T) -> Result<()> {
        if self.line_open {
            debug!("Terminating a partially written message");
            self.writer.write_all(b"\n").await?;
        }
        self.line_open = true;
        write_message(&mut self.writer, message).await?;
        self.line_open = false;
        Ok(())
    }
}

/// Transport over a child process's stdio, or any pair of byte streams.
pub struct StdioTransport {
    child: Option<Mutex<Child>>,
    pipes: Mutex<Pipes>,
    timeout: Duration,
}

impl StdioTransport {
    /// Spawn `command[0]` with the remaining elements as arguments.
    ///
    /// The child is killed when the transport is dropped. On Linux it also
    /// receives SIGTERM if this process dies without running destructors.
    pub fn spawn(command: &[String], timeout: Duration) -> Result<Self> {
        let (program, args) = command.split_first().ok_or(McpError::EmptyCommand)?;
        debug!("Spawning tool server: {:?}", command);

        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);

        #[cfg(target_os = "linux")]
        unsafe {
            cmd.pre_exec(|| {
                libc::prctl(libc::PR_SET_PDEATHSIG, libc::SIGTERM);
                Ok(())
            });
        }

        let mut child = cmd.spawn()?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| McpError::Io(std::io::Error::other("Failed to capture stdin")))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| McpError::Io(std::io::Error::other("Failed to capture stdout")))?;

        info!("Tool server started: {}", program);

        let mut transport = Self::from_streams(stdout, stdin, timeout);
        transport.child = Some(Mutex::new(child));
        Ok(transport)
    }

    /// Transport over existing streams, with no child process to manage.
    pub fn from_streams<R, W>(reader: R, writer: W, timeout: Duration) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        Self {
            child: None,
            pipes: Mutex::new(Pipes {
                reader: BufReader::new(Box::new(reader)),
                writer: Box::new(writer),
                line_open: false,
            }),
            timeout,
        }
    }

    /// Kill the child process and wait for it to exit.
    pub async fn close(&self) -> Result<()> {
        if let Some(child) = &self.child {
            let mut child = child.lock().await;
            if let Err(e) = child.kill().await {
                warn!("Failed to kill tool server: {}", e);
            }
            child.wait().await?;
            info!("Tool server terminated");
        }
        Ok(())
    }

    async fn read_response(pipes: &mut Pipes, request: &JsonRpcRequest) -> Result<Value> {
        let mut line = String::new();
        loop {
            line.clear();
            if pipes.reader.read_line(&mut line).await? == 0 {
                return Err(McpError::TransportClosed);
            }

            let trimmed = line.trim();
            if !trimmed.starts_with('{') {
                if !trimmed.is_empty() {
                    debug!("Skipping non-JSON line from tool server: {}", trimmed);
                }
                continue;
            }

            let json: Value = match serde_json::from_str(trimmed) {
                Ok(json) => json,
                Err(e) => {
                    warn!("Skipping malformed message from tool server: {}", e);
                    continue;
                }
            };

            match classify_message(&json) {
                MessageKind::Notification => {
                    debug!("Tool server notification: {}", trimmed);
                }
                MessageKind::IncomingRequest => {
                    let method = json.get("method").and_then(Value::as_str).unwrap_or("");
                    let reply = JsonRpcResponse::failure(
                        json.get("id").cloned(),
                        RpcError::method_not_found(method),
                    );
                    pipes.send(&reply).await?;
                }
                MessageKind::Response if json.get("id") != request.id.as_ref() => {
                    debug!("Skipping stale response: {}", trimmed);
                }
                MessageKind::Response => {
                    let response: JsonRpcResponse =
                        serde_json::from_value(json).map_err(|e| McpError::ParseError {
                            error: e.to_string(),
                            raw: trimmed.to_string(),
                        })?;
                    if let Some(error) = response.error {
                        return Err(McpError::RpcError {
                            code: error.code,
                            message: error.message,
                        });
                    }
                    return Ok(response.result.unwrap_or(Value::Null));
                }
            }
        }
    }
}

#[async_trait]
impl McpTransport for StdioTransport {
    async fn request(&self, method: &str, params: Option<Value>) -> Result<Value> {
        let request = JsonRpcRequest::new(method, params);
        let mut pipes = self.pipes.lock().await;
        pipes.send(&request).await?;

        tokio::time::timeout(self.timeout, Self::read_response(&mut pipes, &request))
            .await
            .map_err(|_| McpError::Timeout(method.to_string()))?
    }

    async fn notify(&self, method: &str, params: Option<Value>) -> Result<()> {
        let notification = JsonRpcRequest::notification(method, params);
        let mut pipes = self.pipes.lock().await;
        pipes.send(&notification).await
    }
}

/// Write one message as a single line and flush.
pub(crate) async fn write_message<W, T>(writer: &mut W, message: &T) -> Result<()>
where
    W: AsyncWrite + Unpin + ?Sized,
    T: serde::Serialize,
{
    let mut json = serde_json::to_vec(message)?;
    json.push(b'\n');
    writer.write_all(&json).await?;
    writer.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::io::{AsyncBufReadExt, BufReader};

    /// Peer that answers each request after some noise on the wire.
    async fn noisy_peer(stream: tokio::io::DuplexStream) {
        let (read, mut write) = tokio::io::split(stream);
        let mut lines = BufReader::new(read).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let request: Value = serde_json::from_str(&line).unwrap();
            let Some(id) = request.get("id").cloned() else {
                continue;
            };
            let noise = [
                "starting up...".to_string(),
                json!({"jsonrpc": "2.0", "method": "notifications/progress"}).to_string(),
                json!({"jsonrpc": "2.0", "id": 999_999, "result": "stale"}).to_string(),
                json!({"jsonrpc": "2.0", "id": id, "result": {"echo": request["method"]}})
                    .to_string(),
            ];
            for line in noise {
                write.write_all(format!("{}\n", line).as_bytes()).await.unwrap();
            }
        }
    }

    fn connected(timeout: Duration) -> StdioTransport {
        let (ours, theirs) = tokio::io::duplex(64 * 1024);
        tokio::spawn(noisy_peer(theirs));
        let (read, write) = tokio::io::split(ours);
        StdioTransport::from_streams(read, write, timeout)
    }

    #[tokio::test]
    async fn test_request_skips_noise() {
        let transport = connected(Duration::from_secs(5));
        let result = transport.request("tools/list", None).await.unwrap();
        assert_eq!(result, json!({"echo": "tools/list"}));

        // Still in sync for the next request.
        let result = transport.request("ping", None).await.unwrap();
        assert_eq!(result, json!({"echo": "ping"}));
    }

    #[tokio::test]
    async fn test_cut_off_write_is_terminated_before_next_request() {
        let (ours, theirs) = tokio::io::duplex(64 * 1024);
        let (read, write) = tokio::io::split(ours);
        let transport = StdioTransport::from_streams(read, write, Duration::from_secs(5));

        // A request whose write was dropped halfway through.
        {
            let mut pipes = transport.pipes.lock().await;
            pipes
                .writer
                .write_all(br#"{"jsonrpc":"2.0","id":41,"met"#)
                .await
                .unwrap();
            pipes.line_open = true;
        }

        let peer = tokio::spawn(async move {
            let (read, mut write) = tokio::io::split(theirs);
            let mut lines = BufReader::new(read).lines();
            let mut seen = Vec::new();
            while let Ok(Some(line)) = lines.next_line().await {
                seen.push(line.clone());
                if let Ok(request) = serde_json::from_str::<Value>(&line) {
                    let reply = json!({"jsonrpc": "2.0", "id": request["id"].clone(), "result": "pong"});
                    write
                        .write_all(format!("{}\n", reply).as_bytes())
                        .await
                        .unwrap();
                    break;
                }
            }
            seen
        });

        let result = transport.request("ping", None).await.unwrap();
        assert_eq!(result, json!("pong"));

        let seen = peer.await.unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0], r#"{"jsonrpc":"2.0","id":41,"met"#);
        assert!(seen[1].contains(r#""method":"ping""#));
    }

    #[tokio::test]
    async fn test_closed_peer() {
        let (ours, theirs) = tokio::io::duplex(1024);
        drop(theirs);
        let (read, write) = tokio::io::split(ours);
        let transport = StdioTransport::from_streams(read, write, Duration::from_secs(5));

        let err = transport.request("ping", None).await.unwrap_err();
        assert!(matches!(err, McpError::TransportClosed | McpError::Io(_)));
    }

    #[tokio::test]
    async fn test_silent_peer_times_out() {
        let (ours, _theirs) = tokio::io::duplex(1024);
        let (read, write) = tokio::io::split(ours);
        let transport = StdioTransport::from_streams(read, write, Duration::from_millis(50));

        let err = transport.request("tools/call", None).await.unwrap_err();
        assert!(matches!(err, McpError::Timeout(ref m) if m == "tools/call"));
    }

    #[tokio::test]
    async fn test_spawn_rejects_empty_command() {
        let err = StdioTransport::spawn(&[], Duration::from_secs(1)).err().unwrap();
        assert!(matches!(err, McpError::EmptyCommand));
    }

    #[tokio::test]
    async fn test_spawn_missing_program() {
        let command = vec!["quill-no-such-program-xyz".to_string()];
        let err = StdioTransport::spawn(&command, Duration::from_secs(1)).err().unwrap();
        assert!(matches!(err, McpError::Io(_)));
    }
}
