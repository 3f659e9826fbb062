use std::sync::OnceLock;

static HELD: OnceLock<bool> = OnceLock::new();

/// Swallow Ctrl+C in the launcher from now on. The console still delivers it
/// to the child, so the server stops and the launcher carries on to the pause.
/// Returns whether the handler is in place; later calls reuse the first result.
pub fn hold() -> bool {
    *HELD.get_or_init(|| {
        match ctrlc::set_handler(|| tracing::info!("interrupt received, waiting for server")) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!("cannot install interrupt handler: {err}");
                false
            }
        }
    })
}
