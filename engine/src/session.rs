//! One live UCI conversation with an engine process.
//!
//! A background task owns the engine's stdout and feeds complete lines,
//! lossily decoded and right-trimmed, into a bounded channel; the session writes commands directly and awaits the
//! channel for responses. Every method that exchanges lines takes `&mut self`,
//! so requests and responses strictly alternate.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use serde::Serialize;
use tokio::io::{
    AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader,
};
use tokio::process::{Child, ChildStderr, Command};
use tokio::sync::mpsc;

use crate::config::SessionConfig;
use crate::uci::{
    parse_bestmove, parse_info_line, parse_uci_message, EngineOption, OptionValue, UciError,
    UciMessage, UciResult,
};
use crate::{GoParams, SearchFilter, SearchResult};

/// Identity reported by the engine during the handshake.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EngineIdentity {
    pub name: String,
    pub author: String,
}

type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

struct SessionIo {
    writer: BoxedWriter,
    lines: mpsc::Receiver<String>,
    child: Option<Child>,
}

pub struct UciSession {
    /// `None` once closed or torn down.
    io: Option<SessionIo>,
    identity: EngineIdentity,
    options: Vec<EngineOption>,
    config: SessionConfig,
}

impl UciSession {
    /// Spawn the engine at `path` and complete the `uci` handshake.
    pub async fn spawn(path: impl AsRef<Path>, config: SessionConfig) -> UciResult<Self> {
        Self::spawn_with_args(path.as_ref(), &[], config).await
    }

    /// Spawn the engine with extra command-line arguments.
    #[tracing::instrument(level = "info", skip(config))]
    pub async fn spawn_with_args(
        path: &Path,
        args: &[&str],
        config: SessionConfig,
    ) -> UciResult<Self> {
        tracing::debug!("Spawning engine process");
        let mut child = Command::new(path)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| {
                tracing::error!("Failed to spawn engine: {}", source);
                UciError::Spawn {
                    path: path.display().to_string(),
                    source,
                }
            })?;

        let stdin = child.stdin.take().ok_or(UciError::NoStdin)?;
        let stdout = child.stdout.take().ok_or(UciError::NoStdout)?;
        if let Some(stderr) = child.stderr.take() {
            spawn_stderr_logger(stderr);
        }
        tracing::debug!(pid = ?child.id(), "Engine process spawned");

        let mut session = Self::attach(stdout, stdin, Some(child), config);
        session.start().await?;
        Ok(session)
    }

    /// Run a session over an arbitrary stream pair instead of a child process.
    pub async fn from_streams<R, W>(reader: R, writer: W, config: SessionConfig) -> UciResult<Self>
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        let mut session = Self::attach(reader, writer, None, config);
        session.start().await?;
        Ok(session)
    }

    fn attach<R, W>(reader: R, writer: W, child: Option<Child>, config: SessionConfig) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        let lines = spawn_line_reader(reader, config.channel_capacity.max(1));
        Self {
            io: Some(SessionIo {
                writer: Box::new(writer),
                lines,
                child,
            }),
            identity: EngineIdentity::default(),
            options: Vec::new(),
            config,
        }
    }

    async fn start(&mut self) -> UciResult<()> {
        if let Err(e) = self.handshake().await {
            tracing::error!("Engine handshake failed: {}", e);
            self.close().await;
            return Err(e);
        }
        Ok(())
    }

    async fn handshake(&mut self) -> UciResult<()> {
        self.send("uci").await.map_err(into_handshake_error)?;

        let mut identity = EngineIdentity::default();
        let mut options = Vec::new();
        let limit = self.config.handshake_timeout;
        self.read_until("uciok", Some(limit), |line| match parse_uci_message(line) {
            UciMessage::IdName(name) => identity.name = name,
            UciMessage::IdAuthor(author) => identity.author = author,
            UciMessage::Option(option) => options.push(option),
            UciMessage::Unrecognized(_) => tracing::trace!("Ignoring handshake line: {}", line),
        })
        .await
        .map_err(into_handshake_error)?;

        tracing::info!(
            name = %identity.name,
            author = %identity.author,
            options = options.len(),
            "Engine handshake complete"
        );
        self.identity = identity;
        self.options = options;
        Ok(())
    }

    pub fn identity(&self) -> &EngineIdentity {
        &self.identity
    }

    pub fn name(&self) -> &str {
        &self.identity.name
    }

    pub fn author(&self) -> &str {
        &self.identity.author
    }

    /// Options in the order the engine advertised them.
    pub fn options(&self) -> &[EngineOption] {
        &self.options
    }

    /// Look up an option by exact name.
    pub fn option(&self, name: &str) -> Option<&EngineOption> {
        self.options.iter().find(|o| o.name == name)
    }

    pub fn is_open(&self) -> bool {
        self.io.is_some()
    }

    /// Send `setoption` for an advertised option.
    ///
    /// Returns `Ok(false)` without sending anything when the engine never
    /// advertised `name`. The engine does not acknowledge the command.
    pub async fn set_option(
        &mut self,
        name: &str,
        value: impl Into<OptionValue>,
    ) -> UciResult<bool> {
        self.ensure_open()?;
        let value = value.into();
        let Some(option) = self.option(name) else {
            tracing::debug!("Engine has no option named '{}'", name);
            return Ok(false);
        };

        let command = match option.encode_value(&value) {
            Some(encoded) => format!("setoption name {} value {}", option.name, encoded),
            None => format!("setoption name {}", option.name),
        };
        tracing::info!("Setting option: {}", command);
        self.send(&command).await?;
        Ok(true)
    }

    /// Send `position fen <fen>`. The FEN is forwarded as-is.
    pub async fn set_position(&mut self, fen: &str) -> UciResult<()> {
        tracing::debug!("Setting position: FEN={}", fen);
        self.send(&format!("position fen {}", fen)).await
    }

    /// Send `position startpos|fen <fen> [moves ...]`.
    pub async fn set_position_moves<S: AsRef<str>>(
        &mut self,
        fen: Option<&str>,
        moves: &[S],
    ) -> UciResult<()> {
        let mut position_cmd = match fen {
            Some(fen) => format!("position fen {}", fen),
            None => "position startpos".to_string(),
        };
        if !moves.is_empty() {
            position_cmd.push_str(" moves");
            for mv in moves {
                position_cmd.push(' ');
                position_cmd.push_str(mv.as_ref());
            }
        }
        tracing::debug!("Setting position: {} moves", moves.len());
        self.send(&position_cmd).await
    }

    /// Send `ucinewgame`.
    pub async fn new_game(&mut self) -> UciResult<()> {
        self.send("ucinewgame").await
    }

    /// Liveness probe: `isready` and wait for `readyok`.
    ///
    /// Lines the engine prints ahead of `readyok` are consumed; the result is
    /// `true` only when `readyok` was the first line received.
    pub async fn is_ready(&mut self) -> UciResult<bool> {
        self.send("isready").await?;
        let mut first: Option<String> = None;
        let limit = self.config.response_timeout;
        let terminator = self
            .read_until("readyok", limit, |line| {
                if first.is_none() {
                    first = Some(line.to_string());
                }
            })
            .await?;
        if let Some(line) = &first {
            tracing::debug!("Engine printed '{}' before readyok", line);
        }
        Ok(first.is_none() && terminator == "readyok")
    }

    /// Search to a fixed depth.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn search(&mut self, depth: i32, filter: SearchFilter) -> UciResult<SearchResult> {
        let depth = u32::try_from(depth)
            .ok()
            .filter(|d| *d > 0)
            .ok_or_else(|| {
                UciError::InvalidArgument(format!("search depth must be positive, got {}", depth))
            })?;
        self.go(&GoParams::depth(depth), filter).await
    }

    /// Send `go` with arbitrary limits and wait for `bestmove`.
    pub async fn go(&mut self, params: &GoParams, filter: SearchFilter) -> UciResult<SearchResult> {
        self.ensure_open()?;
        if params.depth == Some(0) {
            return Err(UciError::InvalidArgument(
                "search depth must be positive, got 0".to_string(),
            ));
        }
        if !params.is_bounded() {
            return Err(UciError::InvalidArgument(
                "go needs a depth, nodes, mate or time limit".to_string(),
            ));
        }

        let command = params.to_command();
        tracing::info!("Starting engine search: {}", command);
        self.send(&command).await?;

        let collect = filter.collects();
        let mut infos = Vec::new();
        let limit = self.config.response_timeout;
        let line = self
            .read_until("bestmove", limit, |line| {
                if collect {
                    if let Some(info) = parse_info_line(line) {
                        infos.push(info);
                    }
                }
            })
            .await?;

        let (best_move, ponder) = parse_bestmove(&line)?;
        tracing::info!(best_move = %best_move, ponder = ?ponder, "Received bestmove");
        Ok(SearchResult {
            best_move,
            ponder,
            infos: filter.apply(infos),
        })
    }

    /// Send `quit` and release the process. Safe to call repeatedly.
    pub async fn close(&mut self) {
        let Some(SessionIo {
            mut writer,
            lines,
            child,
        }) = self.io.take()
        else {
            tracing::debug!("Engine session already closed");
            return;
        };

        tracing::info!("Closing engine session");
        tracing::trace!("UCI >> quit");
        if let Err(e) = write_line(&mut writer, "quit").await {
            tracing::debug!("Could not send quit: {}", e);
        }
        drop(writer);
        drop(lines);

        if let Some(mut child) = child {
            match tokio::time::timeout(self.config.quit_grace, child.wait()).await {
                Ok(Ok(status)) => tracing::debug!("Engine exited with {}", status),
                Ok(Err(e)) => tracing::warn!("Failed to wait for engine: {}", e),
                Err(_) => {
                    tracing::warn!("Engine ignored quit, killing it");
                    if let Err(e) = child.kill().await {
                        tracing::warn!("Failed to kill engine: {}", e);
                    }
                }
            }
        }
    }

    fn ensure_open(&self) -> UciResult<()> {
        if self.io.is_some() {
            Ok(())
        } else {
            Err(UciError::SessionClosed)
        }
    }

    async fn send(&mut self, line: &str) -> UciResult<()> {
        if line.contains(['\n', '\r']) {
            return Err(UciError::InvalidArgument(format!(
                "command must be a single line: {:?}",
                line
            )));
        }
        let io = self.io.as_mut().ok_or(UciError::SessionClosed)?;

        tracing::trace!("UCI >> {}", line);
        if let Err(e) = write_line(&mut io.writer, line).await {
            let err = if e.kind() == std::io::ErrorKind::BrokenPipe {
                UciError::EngineExited
            } else {
                UciError::Io(e)
            };
            tracing::error!("Failed to write to engine: {}", err);
            self.teardown().await;
            return Err(err);
        }
        Ok(())
    }

    /// Read lines until one starts with `terminator` and return it. Earlier
    /// lines go to `visit`. Timeouts and end of stream tear the session down.
    async fn read_until<F>(
        &mut self,
        terminator: &str,
        limit: Option<Duration>,
        mut visit: F,
    ) -> UciResult<String>
    where
        F: FnMut(&str),
    {
        let io = self.io.as_mut().ok_or(UciError::SessionClosed)?;
        let scan = async {
            while let Some(line) = io.lines.recv().await {
                if line.starts_with(terminator) {
                    return Ok(line);
                }
                visit(&line);
            }
            Err(UciError::EngineExited)
        };

        let outcome = match limit {
            Some(limit) => match tokio::time::timeout(limit, scan).await {
                Ok(result) => result,
                Err(_) => Err(UciError::ResponseTimeout(limit)),
            },
            None => scan.await,
        };

        if let Err(e) = &outcome {
            if e.is_fatal() {
                tracing::warn!("Tearing down engine session: {}", e);
                self.teardown().await;
            }
        }
        outcome
    }

    /// Drop the streams and kill the process without a `quit`.
    async fn teardown(&mut self) {
        let Some(SessionIo { child, .. }) = self.io.take() else {
            return;
        };
        if let Some(mut child) = child {
            if let Err(e) = child.kill().await {
                tracing::warn!("Failed to kill engine: {}", e);
            }
        }
    }
}

impl Drop for UciSession {
    fn drop(&mut self) {
        if self.io.is_some() {
            tracing::debug!("Engine session dropped without close, killing process");
        }
    }
}

fn into_handshake_error(err: UciError) -> UciError {
    match err {
        UciError::EngineExited => {
            UciError::HandshakeFailure("engine closed its output before uciok".to_string())
        }
        UciError::ResponseTimeout(limit) => UciError::HandshakeTimeout(limit),
        other => other,
    }
}

async fn write_line(writer: &mut BoxedWriter, line: &str) -> std::io::Result<()> {
    writer.write_all(format!("{}\n", line).as_bytes()).await?;
    writer.flush().await
}

/// Read one line, decoding invalid UTF-8 lossily and trimming the line
/// ending and trailing whitespace. `None` at end of stream.
async fn read_line_lossy<R>(
    reader: &mut R,
    buf: &mut Vec<u8>,
) -> std::io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    buf.clear();
    if reader.read_until(b'\n', buf).await? == 0 {
        return Ok(None);
    }
    Ok(Some(String::from_utf8_lossy(buf).trim_end().to_string()))
}

fn spawn_line_reader<R>(reader: R, capacity: usize) -> mpsc::Receiver<String>
where
    R: AsyncRead + Send + Unpin + 'static,
{
    let (line_tx, line_rx) = mpsc::channel(capacity);
    tokio::spawn(async move {
        let mut reader = BufReader::new(reader);
        let mut buf = Vec::new();
        loop {
            match read_line_lossy(&mut reader, &mut buf).await {
                Ok(Some(line)) => {
                    tracing::trace!("UCI << {}", line);
                    if line_tx.send(line).await.is_err() {
                        break;
                    }
                }
                Ok(None) => {
                    tracing::debug!("Engine stdout EOF");
                    break;
                }
                Err(e) => {
                    tracing::warn!("Error reading engine stdout: {}", e);
                    break;
                }
            }
        }
    });
    line_rx
}

fn spawn_stderr_logger(stderr: ChildStderr) {
    tokio::spawn(async move {
        let mut reader = BufReader::new(stderr);
        let mut buf = Vec::new();
        while let Ok(Some(line)) = read_line_lossy(&mut reader, &mut buf).await {
            tracing::debug!("engine stderr: {}", line);
        }
    });
}
