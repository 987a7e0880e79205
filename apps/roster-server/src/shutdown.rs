use anyhow::Result;

/// Resolves on SIGINT or SIGTERM (Ctrl+C / Ctrl+Break on Windows).
pub async fn wait_for_shutdown() -> Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate())?;
        let mut sigint = signal(SignalKind::interrupt())?;
        tokio::select! {
            _ = sigterm.recv() => tracing::info!("SIGTERM received"),
            _ = sigint.recv() => tracing::info!("SIGINT received"),
        }
        Ok(())
    }

    #[cfg(windows)]
    {
        use tokio::signal::windows::{ctrl_break, ctrl_c};
        let mut c = ctrl_c()?;
        let mut br = ctrl_break()?;
        tokio::select! {
            _ = c.recv() => tracing::info!("Ctrl+C received"),
            _ = br.recv() => tracing::info!("Ctrl+Break received"),
        }
        Ok(())
    }
}
