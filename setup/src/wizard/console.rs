use common::{Error, Result};
use tokio::io::{
    AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Stdin, Stdout,
};

/// Line-oriented question/answer channel with the operator.
pub struct Console<R, W> {
    reader: R,
    writer: W,
    open: bool,
}

pub type StdConsole = Console<BufReader<Stdin>, Stdout>;

pub fn stdio() -> StdConsole {
    Console::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
}

impl<R, W> Console<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            open: true,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Writes `prompt` without a newline and reads one answer line.
    pub async fn ask(&mut self, prompt: &str) -> Result<String> {
        if !self.open {
            return Err(Error::InputClosed(prompt.trim().to_string()));
        }

        self.writer.write_all(prompt.as_bytes()).await?;
        self.writer.flush().await?;

        let mut line = String::new();
        if self.reader.read_line(&mut line).await? == 0 {
            self.open = false;
            return Err(Error::InputClosed(prompt.trim().to_string()));
        }

        let answer = line.strip_suffix('\n').unwrap_or(&line);
        Ok(answer.strip_suffix('\r').unwrap_or(answer).to_string())
    }

    pub async fn say(&mut self, message: &str) -> Result<()> {
        self.writer.write_all(message.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// Stops accepting answers; messages can still be written.
    pub async fn close(&mut self) -> Result<()> {
        self.open = false;
        self.writer.flush().await?;
        Ok(())
    }

    pub fn into_writer(self) -> W {
        self.writer
    }
}
