use crate::events::AppEvent;
use async_channel::Sender;
use std::thread;
use tokio::runtime::Builder;

/// Runs the socket server and the config watcher on a tokio runtime of their own.
/// Both only forward events into `tx`; the menu itself stays on the caller's thread.
pub fn start_background_services(tx: Sender<AppEvent>) -> std::io::Result<thread::JoinHandle<()>> {
    thread::Builder::new()
        .name("corolla-services".into())
        .spawn(move || {
            let rt = match Builder::new_multi_thread().enable_all().build() {
                Ok(rt) => rt,
                Err(e) => {
                    log::error!("Failed to create Tokio runtime: {}", e);
                    return;
                }
            };

            rt.block_on(async {
                let server = tokio::spawn(crate::sys::server::run_server(tx.clone()));
                let watcher = tokio::spawn(crate::config::run_async_watcher(tx));

                // the server only returns when it could not bind
                if let Err(e) = server.await {
                    log::error!("Socket server task failed: {}", e);
                }
                let _ = watcher.await;
            });
        })
}
