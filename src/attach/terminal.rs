//! Local terminal side of a remote shell session

use futures::channel::mpsc::Sender;
use futures::SinkExt;
use kube::api::TerminalSize;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

use crate::error::Result;

/// Keeps the local terminal in raw mode until dropped.
pub struct RawModeGuard;

impl RawModeGuard {
    pub fn enable() -> Result<Self> {
        crossterm::terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if let Err(e) = crossterm::terminal::disable_raw_mode() {
            tracing::warn!("Failed to restore terminal mode: {e}");
        }
    }
}

/// Copy local input to the remote side and remote output to the local side.
///
/// Returns the number of output bytes once the remote output closes. Input
/// copying is abandoned at that point since a blocked read on stdin never
/// finishes by itself.
pub async fn pump<LI, LO, RI, RO>(
    local_in: LI,
    mut local_out: LO,
    remote_in: RI,
    mut remote_out: RO,
) -> std::io::Result<u64>
where
    LI: AsyncRead + Unpin + Send + 'static,
    LO: AsyncWrite + Unpin,
    RI: AsyncWrite + Unpin + Send + 'static,
    RO: AsyncRead + Unpin,
{
    let input = tokio::spawn(async move {
        let mut local_in = local_in;
        let mut remote_in = remote_in;
        let copied = tokio::io::copy(&mut local_in, &mut remote_in).await;
        let _ = remote_in.shutdown().await;
        copied
    });

    let copied = copy_flushing(&mut remote_out, &mut local_out).await;
    input.abort();
    copied
}

/// Like `tokio::io::copy`, but flushes after every chunk so prompts show up
/// without waiting for a newline.
async fn copy_flushing<R, W>(reader: &mut R, writer: &mut W) -> std::io::Result<u64>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    use tokio::io::AsyncReadExt;

    let mut buf = [0u8; 8192];
    let mut total = 0u64;
    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            writer.flush().await?;
            return Ok(total);
        }
        writer.write_all(&buf[..n]).await?;
        writer.flush().await?;
        total += n as u64;
    }
}

/// Send the current terminal size, then again on every window change.
pub async fn forward_terminal_size(mut sizes: Sender<TerminalSize>) {
    if let Some(size) = current_size() {
        if sizes.send(size).await.is_err() {
            return;
        }
    }

    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut window_changes = match signal(SignalKind::window_change()) {
            Ok(stream) => stream,
            Err(e) => {
                tracing::debug!("Not watching terminal size: {e}");
                return;
            }
        };

        while window_changes.recv().await.is_some() {
            let Some(size) = current_size() else {
                continue;
            };
            tracing::trace!("Terminal resized to {}x{}", size.width, size.height);
            if sizes.send(size).await.is_err() {
                break;
            }
        }
    }
}

fn current_size() -> Option<TerminalSize> {
    crossterm::terminal::size()
        .ok()
        .map(|(width, height)| TerminalSize { width, height })
}
