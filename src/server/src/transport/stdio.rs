//! Newline-delimited JSON-RPC over a byte stream (stdin/stdout).
//!
//! Each line is handled in its own task; responses are written as soon as
//! they are ready, so they may arrive out of request order. Clients match
//! them by `id`.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;

use crate::rpc::McpServer;

/// Serve until `reader` reaches EOF and every in-flight request is answered.
pub async fn serve<R, W>(server: Arc<McpServer>, reader: R, writer: W) -> anyhow::Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, mut rx) = mpsc::channel::<String>(64);

    let writer_task = tokio::spawn(async move {
        let mut writer = writer;
        while let Some(line) = rx.recv().await {
            writer.write_all(line.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await?;
        }
        Ok::<_, std::io::Error>(())
    });

    tracing::info!("Serving JSON-RPC on stdio");

    // Raw bytes: a line that is not UTF-8 gets a parse error, not a dead loop
    let mut reader = BufReader::new(reader);
    loop {
        let mut line = Vec::new();
        if reader.read_until(b'\n', &mut line).await? == 0 {
            break;
        }
        if line.iter().all(u8::is_ascii_whitespace) {
            continue;
        }

        let server = server.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            if let Some(response) = server.handle_bytes(&line).await {
                if tx.send(response).await.is_err() {
                    tracing::warn!("Output closed before response was written");
                }
            }
        });
    }

    tracing::info!("Input closed, draining pending responses");
    drop(tx);
    writer_task.await??;
    Ok(())
}
