use jobwatch_core::{Config, PollLoop};

use super::{load_pipeline, runtime, CliResult};

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for ctrl-c: {e}");
        std::future::pending::<()>().await;
    }
}

pub fn run(headless: bool) -> CliResult {
    let config = Config::load()?;
    if headless {
        return run_headless(&config);
    }

    #[cfg(feature = "viewer")]
    {
        run_with_viewer(config)
    }
    #[cfg(not(feature = "viewer"))]
    {
        tracing::warn!("built without the viewer, running headless");
        run_headless(&config)
    }
}

fn run_headless(config: &Config) -> CliResult {
    runtime()?.block_on(async {
        let poll = PollLoop::new(load_pipeline(config).await?, &config.poll);
        poll.run_until(ctrl_c()).await;
        Ok::<_, Box<dyn std::error::Error>>(())
    })
}

/// Poll loop on a background thread, viewer in the foreground. Closing
/// the window stops the loop after its current job.
#[cfg(feature = "viewer")]
fn run_with_viewer(config: Config) -> CliResult {
    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();

    let worker = std::thread::Builder::new()
        .name("jobwatch-poll".into())
        .spawn(move || -> Result<(), String> {
            let rt = runtime().map_err(|e| e.to_string())?;
            rt.block_on(async {
                let pipeline = load_pipeline(&config).await.map_err(|e| e.to_string())?;
                let poll = PollLoop::new(pipeline, &config.poll);
                poll.run_until(async {
                    tokio::select! {
                        _ = stop_rx => {}
                        _ = ctrl_c() => {}
                    }
                })
                .await;
                Ok::<_, String>(())
            })
        })?;

    let viewer_result = crate::viewer::run(super::notification_log()?);
    // The worker may already be gone if loading failed.
    let _ = stop_tx.send(());

    match worker.join() {
        Ok(Ok(())) => {}
        Ok(Err(e)) => return Err(e.into()),
        Err(_) => return Err("poll loop thread panicked".into()),
    }
    viewer_result
}

pub fn view() -> CliResult {
    #[cfg(feature = "viewer")]
    {
        crate::viewer::run(super::notification_log()?)
    }
    #[cfg(not(feature = "viewer"))]
    {
        Err("this build has no viewer; use `jobwatch log show`".into())
    }
}
