//! In-process locks keyed by install directory.
//!
//! Two threads installing the same identity into the same root would otherwise
//! both pass the existence check and both extract. Only threads of this
//! process are serialized; other processes sharing the root are not.
//!
//! An entry lives only while some caller holds or waits on it, so the table
//! is bounded by the number of concurrent operations.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

type LockTable = Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>;

fn table() -> MutexGuard<'static, HashMap<PathBuf, Arc<Mutex<()>>>> {
    static LOCKS: OnceLock<LockTable> = OnceLock::new();
    LOCKS
        .get_or_init(Default::default)
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

/// Run `f` while holding the lock for `install_path`.
///
/// Resolvers produce one canonical path per identity, so the path alone is
/// the key.
pub(crate) fn with_install_path_lock<T>(install_path: &Path, f: impl FnOnce() -> T) -> T {
    let entry = Arc::clone(table().entry(install_path.to_path_buf()).or_default());

    let result = {
        let _guard = entry.lock().unwrap_or_else(PoisonError::into_inner);
        f()
    };

    let mut locks = table();
    // One reference in the table plus ours: nobody else is waiting.
    if Arc::strong_count(&entry) == 2 {
        locks.remove(install_path);
    }
    result
}

#[cfg(test)]
fn is_tracked(install_path: &Path) -> bool {
    table().contains_key(install_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_same_path_is_serialized() {
        let path = Path::new("/locks/serialized/foo.1.0.0");
        let active = AtomicUsize::new(0);
        let peak = AtomicUsize::new(0);

        thread::scope(|s| {
            for _ in 0..6 {
                s.spawn(|| {
                    with_install_path_lock(path, || {
                        let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                        peak.fetch_max(now, Ordering::SeqCst);
                        thread::sleep(Duration::from_millis(5));
                        active.fetch_sub(1, Ordering::SeqCst);
                    })
                });
            }
        });

        assert_eq!(peak.load(Ordering::SeqCst), 1);
        assert!(!is_tracked(path));
    }

    #[test]
    fn test_entry_released_after_use() {
        let path = Path::new("/locks/released/foo.1.0.0");
        let value = with_install_path_lock(path, || {
            assert!(is_tracked(path));
            42
        });
        assert_eq!(value, 42);
        assert!(!is_tracked(path));
    }

    #[test]
    fn test_different_paths_do_not_block() {
        let a = Path::new("/locks/nested/foo.1.0.0");
        let b = Path::new("/locks/nested/foo.2.0.0");
        let value = with_install_path_lock(a, || with_install_path_lock(b, || "both held"));
        assert_eq!(value, "both held");
        assert!(!is_tracked(a));
        assert!(!is_tracked(b));
    }
}
