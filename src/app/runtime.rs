use crate::input::{InputAction, InputService};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;

/// Read keys on a plain thread and forward decoded actions to the event loop
///
/// crossterm's `poll`/`read` block, so they stay off the async runtime. The
/// thread checks `shutdown` every `poll_interval` and also exits once the
/// receiving side has gone away.
pub fn spawn_input_thread(
    tx: UnboundedSender<InputAction>,
    shutdown: Arc<AtomicBool>,
    poll_interval: Duration,
) -> JoinHandle<()> {
    std::thread::spawn(move || {
        let mut service = InputService::new();
        while !shutdown.load(Ordering::SeqCst) {
            let action = match service.poll_action(poll_interval) {
                Ok(Some(action)) => action,
                Ok(None) => continue,
                Err(err) => {
                    log::error!("terminal input failed: {err}");
                    return;
                }
            };
            if tx.send(action).is_err() {
                return;
            }
        }
        log::trace!("input thread stopped");
    })
}
