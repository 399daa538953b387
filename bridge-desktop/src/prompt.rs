//! Console prompt for OAuth authorization codes

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    prompt::AuthCodePrompt,
};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::Mutex;
use tracing::info;

/// Prints the authorization URL and reads one line holding the code
///
/// Generic over reader and writer so the prompt can be driven from memory
/// in tests; [`ConsolePrompt::stdio`] wires it to the terminal.
pub struct ConsolePrompt<R, W> {
    io: Mutex<(R, W)>,
}

impl ConsolePrompt<BufReader<tokio::io::Stdin>, tokio::io::Stderr> {
    /// Prompt on stderr, read the code from stdin
    pub fn stdio() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), tokio::io::stderr())
    }
}

impl<R, W> ConsolePrompt<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            io: Mutex::new((reader, writer)),
        }
    }
}

#[async_trait]
impl<R, W> AuthCodePrompt for ConsolePrompt<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn request_code(&self, account: &str, auth_url: &str) -> Result<String> {
        let mut guard = self.io.lock().await;
        let (reader, writer) = &mut *guard;

        info!(account = account, "Waiting for authorization code");
        let banner = format!(
            "Open the following URL in a browser to authorize {}:\n\n  {}\n\nEnter code: ",
            account, auth_url
        );
        writer.write_all(banner.as_bytes()).await?;
        writer.flush().await?;

        let mut line = String::new();
        let read = reader.read_line(&mut line).await?;
        if read == 0 {
            return Err(BridgeError::Cancelled(
                "input closed before an authorization code was entered".to_string(),
            ));
        }

        let code = line.trim();
        if code.is_empty() {
            return Err(BridgeError::Cancelled(
                "no authorization code entered".to_string(),
            ));
        }

        Ok(code.to_string())
    }
}
