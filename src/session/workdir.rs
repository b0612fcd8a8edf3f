//! Exclusive, scoped use of the process working directory.
//!
//! Providers receive the project root explicitly; this scope only exists
//! for file APIs that resolve paths against the working directory. Holding
//! a [`WorkdirScope`] serializes aggregator runs process-wide, and dropping
//! it restores the previous directory on every exit path: normal return,
//! panic unwinding, or the owning future being cancelled.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use tokio::sync::{Mutex, MutexGuard};

fn lock() -> &'static Mutex<()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
}

pub struct WorkdirScope {
    previous: Option<PathBuf>,
    _guard: MutexGuard<'static, ()>,
}

impl WorkdirScope {
    /// Wait for exclusive use of the working directory, then switch to
    /// `root`.
    pub async fn enter(root: &Path) -> Self {
        let guard = lock().lock().await;

        let previous = match std::env::current_dir() {
            Ok(dir) => Some(dir),
            Err(e) => {
                tracing::warn!(error = %e, "cannot read working directory; running unscoped");
                None
            }
        };

        let previous = previous.filter(|_| match std::env::set_current_dir(root) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(root = %root.display(), error = %e, "cannot enter project root; running unscoped");
                false
            }
        });

        Self {
            previous,
            _guard: guard,
        }
    }

    /// The working directory as seen outside any scope.
    ///
    /// Waits for a running scope to finish, so the answer is never a
    /// project root some aggregator switched into.
    pub async fn current_dir() -> std::io::Result<PathBuf> {
        let _guard = lock().lock().await;
        std::env::current_dir()
    }

    /// Directory that will be restored on drop, if the switch happened.
    pub fn previous(&self) -> Option<&Path> {
        self.previous.as_deref()
    }
}

impl Drop for WorkdirScope {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            if let Err(e) = std::env::set_current_dir(&previous) {
                tracing::error!(dir = %previous.display(), error = %e, "failed to restore working directory");
            }
        }
    }
}
