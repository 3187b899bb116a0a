// Process-wide handlers for faults nothing else catches

use std::future::Future;
use std::sync::Once;
use tokio::task::JoinHandle;

/// Exit status for bootstrap failures and unhandled faults.
pub const EXIT_FAILURE: i32 = 1;

static INSTALL: Once = Once::new();

/// Install the panic hook. Safe to call more than once.
///
/// A panic anywhere in the process (including inside spawned tasks) is
/// logged with its location and a backtrace, then the process exits with
/// [`EXIT_FAILURE`].
pub fn install() {
    INSTALL.call_once(|| {
        std::panic::set_hook(Box::new(|info| {
            let payload = info
                .payload()
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| info.payload().downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "<non-string panic payload>".to_string());
            let location = info
                .location()
                .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
                .unwrap_or_else(|| "<unknown>".to_string());
            let backtrace = std::backtrace::Backtrace::force_capture();

            tracing::error!(
                location = %location,
                "Uncaught panic: {}\n{}",
                payload,
                backtrace
            );
            std::process::exit(EXIT_FAILURE);
        }));
        tracing::debug!("Fatal handlers installed");
    });
}

/// Spawn a background task whose failure nobody awaits.
///
/// An `Err` is logged with its full cause chain and terminates the process
/// with [`EXIT_FAILURE`]; panics go through the hook from [`install`].
pub fn spawn_observed<F>(name: &'static str, future: F) -> JoinHandle<()>
where
    F: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    tokio::spawn(async move {
        if let Err(e) = future.await {
            tracing::error!(task = name, "Unhandled task failure: {:?}", e);
            std::process::exit(EXIT_FAILURE);
        }
    })
}
