use super::render_loop::{apply_frame, EndpointHealth};
use super::Logger;
use crate::{display::OutputSink, frame::Frame, Error, Result};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Cancellation handle passed into the render loop.
///
/// Cloning shares the same flag. Sleeping through [`ShutdownToken::wait_timeout`]
/// wakes immediately when any clone is cancelled.
#[derive(Debug, Clone, Default)]
pub struct ShutdownToken {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl ShutdownToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        let (flag, signal) = &*self.inner;
        *lock(flag) = true;
        signal.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        *lock(&self.inner.0)
    }

    /// Sleep for `timeout` or until cancelled. Returns `true` when cancelled.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let (flag, signal) = &*self.inner;
        let deadline = Instant::now() + timeout;
        let mut cancelled = lock(flag);
        while !*cancelled {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            cancelled = match signal.wait_timeout(cancelled, deadline - now) {
                Ok((guard, _)) => guard,
                Err(poisoned) => poisoned.into_inner().0,
            };
        }
        true
    }
}

fn lock(flag: &Mutex<bool>) -> MutexGuard<'_, bool> {
    flag.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Route SIGINT/SIGTERM to `token` instead of exiting immediately.
pub fn install_signal_handler(token: &ShutdownToken) -> Result<()> {
    let handle = token.clone();
    ctrlc::set_handler(move || handle.cancel())
        .map_err(|e| Error::Io(std::io::Error::other(e.to_string())))
}

/// The sysfs endpoints are root-owned; refuse to start without euid 0.
pub fn ensure_privileged() -> Result<()> {
    check_privilege(rustix::process::geteuid().is_root())
}

pub(crate) fn check_privilege(is_root: bool) -> Result<()> {
    if is_root {
        Ok(())
    } else {
        Err(Error::Privilege(
            "this program requires root privileges; run it with sudo".into(),
        ))
    }
}

/// Blank the panel and switch every LED off. Written exactly once on exit.
pub(super) fn render_shutdown<S: OutputSink>(
    sink: &mut S,
    health: &mut EndpointHealth,
    logger: &Logger,
) {
    apply_frame(sink, &Frame::blank(), health, logger);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn wait_times_out_when_not_cancelled() {
        let token = ShutdownToken::new();
        let start = Instant::now();
        assert!(!token.wait_timeout(Duration::from_millis(30)));
        assert!(start.elapsed() >= Duration::from_millis(30));
        assert!(!token.is_cancelled());
    }

    #[test]
    fn cancel_wakes_sleeper_early() {
        let token = ShutdownToken::new();
        let remote = token.clone();
        let canceller = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            remote.cancel();
        });
        let start = Instant::now();
        assert!(token.wait_timeout(Duration::from_secs(10)));
        assert!(start.elapsed() < Duration::from_secs(5));
        assert!(token.is_cancelled());
        canceller.join().unwrap();
    }

    #[test]
    fn already_cancelled_returns_immediately() {
        let token = ShutdownToken::new();
        token.cancel();
        assert!(token.wait_timeout(Duration::from_secs(10)));
    }

    #[test]
    fn privilege_check() {
        assert!(check_privilege(true).is_ok());
        let err = check_privilege(false).unwrap_err();
        assert!(matches!(err, Error::Privilege(_)));
        assert!(format!("{err}").contains("root"));
    }
}
