use anyhow::{anyhow, Context, Result};
use std::time::{Duration, Instant};
use tokio::net::TcpStream;
use tokio::process::{Child, Command};

const STARTUP_TIMEOUT: Duration = Duration::from_secs(10);

/// A chromedriver child process listening on localhost.
///
/// The child is killed when this value is dropped.
pub struct ChromedriverProcess {
    child: Child,
    port: u16,
}

impl ChromedriverProcess {
    /// Spawn `path --port=<port>` and wait until the port accepts connections.
    pub async fn spawn(path: &str, port: u16) -> Result<Self> {
        let child = Command::new(path)
            .arg(format!("--port={port}"))
            .arg("--log-level=OFF")
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("failed to spawn chromedriver at {path}"))?;

        let mut process = Self { child, port };
        tracing::info!(target: "browser", path, port, pid = process.child.id(), "browser.chromedriver.spawned");

        let started = Instant::now();
        loop {
            if TcpStream::connect(("127.0.0.1", port)).await.is_ok() {
                return Ok(process);
            }
            if let Some(status) = process.child.try_wait()? {
                return Err(anyhow!("chromedriver exited during startup: {status}"));
            }
            if started.elapsed() > STARTUP_TIMEOUT {
                process.shutdown().await;
                return Err(anyhow!(
                    "chromedriver did not listen on port {port} within {}s",
                    STARTUP_TIMEOUT.as_secs()
                ));
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    }

    /// Kill the child and reap it.
    pub async fn shutdown(&mut self) {
        if let Err(e) = self.child.kill().await {
            tracing::warn!(target: "browser", error = %e, "browser.chromedriver.kill_failed");
        } else {
            tracing::debug!(target: "browser", port = self.port, "browser.chromedriver.stopped");
        }
    }
}
