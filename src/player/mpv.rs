use crate::app::events::{Event, PlayerEvent};
use anyhow::Context;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    net::UnixStream,
    process::{Child, Command},
    sync::mpsc,
};

/// An mpv process driven over its JSON IPC socket.
///
/// mpv's `time-pos` property changes are the only source of the playback
/// position; nothing in the app keeps its own clock.
#[derive(Debug)]
pub struct MpvHandle {
    child: Child,
    socket_path: PathBuf,
    writer: tokio::sync::Mutex<tokio::io::WriteHalf<UnixStream>>,
    request_id: AtomicU64,
}

impl MpvHandle {
    pub async fn spawn(
        event_tx: mpsc::Sender<Event>,
        audio_device: Option<&str>,
        log_file: Option<&Path>,
    ) -> anyhow::Result<Self> {
        let socket_path = std::env::temp_dir().join(format!("dwc-mpv-{}.sock", std::process::id()));
        let _ = std::fs::remove_file(&socket_path);

        let mut cmd = Command::new("mpv");
        cmd.args(["--no-video", "--idle=yes", "--input-terminal=no", "--really-quiet"]);
        if let Some(dev) = audio_device {
            cmd.arg(format!("--audio-device={dev}"));
        }
        if let Some(p) = log_file {
            cmd.arg(format!("--log-file={}", p.display()));
        }
        let child = cmd
            .arg(format!("--input-ipc-server={}", socket_path.display()))
            .stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .spawn()
            .context("spawn mpv")?;

        let stream = connect_with_retry(&socket_path).await?;
        let (reader, writer) = tokio::io::split(stream);
        tokio::spawn(read_events_loop(reader, event_tx));

        let this = Self {
            child,
            socket_path,
            writer: tokio::sync::Mutex::new(writer),
            request_id: AtomicU64::new(1),
        };

        this.command(json!({"command":["request_log_messages", "warn"]})).await?;
        for (id, name) in [(1, "time-pos"), (2, "duration"), (3, "pause"), (4, "eof-reached")] {
            this.command(json!({"command":["observe_property", id, name]})).await?;
        }

        Ok(this)
    }

    /// Load a URL or local path, replacing whatever is playing
    pub async fn load_url(&self, url: &str) -> anyhow::Result<()> {
        tracing::debug!("mpv loadfile {}", url);
        self.command(json!({"command":["loadfile", url, "replace"]})).await?;
        self.command(json!({"command":["set_property", "pause", false]})).await
    }

    pub async fn toggle_pause(&self) -> anyhow::Result<()> {
        self.command(json!({"command":["cycle", "pause"]})).await
    }

    pub async fn seek_relative(&self, seconds: f64) -> anyhow::Result<()> {
        self.command(json!({"command":["seek", seconds, "relative"]})).await
    }

    /// Jump to exactly `seconds`; used when a lyric line is picked
    pub async fn seek_absolute(&self, seconds: f64) -> anyhow::Result<()> {
        self.command(json!({"command":["seek", seconds.max(0.0), "absolute+exact"]})).await
    }

    pub async fn set_volume(&self, volume_0_100: u8) -> anyhow::Result<()> {
        self.command(json!({"command":["set_property", "volume", volume_0_100.min(100)]})).await
    }

    async fn command(&self, mut v: Value) -> anyhow::Result<()> {
        if v.get("request_id").is_none() {
            let id = self.request_id.fetch_add(1, Ordering::Relaxed);
            if let Value::Object(ref mut o) = v {
                o.insert("request_id".to_string(), Value::from(id));
            }
        }
        let mut line = serde_json::to_vec(&v).context("encode mpv json")?;
        line.push(b'\n');
        let mut w = self.writer.lock().await;
        w.write_all(&line).await.context("write mpv ipc")?;
        w.flush().await.context("flush mpv ipc")?;
        Ok(())
    }
}

impl Drop for MpvHandle {
    fn drop(&mut self) {
        let _ = self.child.start_kill();
        let _ = std::fs::remove_file(&self.socket_path);
    }
}

async fn connect_with_retry(path: &Path) -> anyhow::Result<UnixStream> {
    let deadline = tokio::time::Instant::now() + std::time::Duration::from_secs(5);
    loop {
        match UnixStream::connect(path).await {
            Ok(s) => return Ok(s),
            Err(e) if tokio::time::Instant::now() > deadline => {
                return Err(e).with_context(|| format!("connect to mpv ipc {}", path.display()));
            }
            Err(_) => tokio::time::sleep(std::time::Duration::from_millis(50)).await,
        }
    }
}

async fn read_events_loop(reader: tokio::io::ReadHalf<UnixStream>, event_tx: mpsc::Sender<Event>) {
    let mut lines = BufReader::new(reader).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        let Ok(v) = serde_json::from_str::<Value>(&line) else {
            tracing::trace!("ignoring non-json mpv line: {}", line);
            continue;
        };
        if let Some(pe) = map_mpv_message(&v)
            && event_tx.send(Event::Player(pe)).await.is_err()
        {
            break;
        }
    }
    tracing::debug!("mpv event stream closed");
}

/// Translate one IPC message into a player event
fn map_mpv_message(v: &Value) -> Option<PlayerEvent> {
    // Command replies look like {"request_id":..,"error":".."}
    if v.get("request_id").is_some() {
        let err = v.get("error")?.as_str()?;
        return (err != "success").then(|| PlayerEvent::Error(format!("mpv ipc error: {err}")));
    }

    match v.get("event")?.as_str()? {
        "property-change" => {
            let data = v.get("data");
            match v.get("name")?.as_str()? {
                // time-pos is null between files
                "time-pos" => Some(PlayerEvent::Position {
                    seconds: data?.as_f64()?,
                }),
                "duration" => Some(PlayerEvent::Duration {
                    seconds: data?.as_f64()?,
                }),
                "pause" => Some(if data?.as_bool()? {
                    PlayerEvent::Paused
                } else {
                    PlayerEvent::Started
                }),
                "eof-reached" => data?.as_bool()?.then_some(PlayerEvent::Ended),
                _ => None,
            }
        }
        "end-file" => match v.get("reason").and_then(Value::as_str) {
            Some("error") => {
                let err = v.get("error").and_then(Value::as_str).unwrap_or("unknown");
                Some(PlayerEvent::Error(format!("mpv could not play file: {err}")))
            }
            Some("eof") => Some(PlayerEvent::Ended),
            // stop/quit/redirect: a new file replaced this one
            _ => None,
        },
        "log-message" => {
            let level = v.get("level")?.as_str()?;
            let text = v.get("text")?.as_str()?.trim();
            (matches!(level, "warn" | "error") && !text.is_empty())
                .then(|| PlayerEvent::Error(format!("mpv {level}: {text}")))
        }
        _ => None,
    }
}
