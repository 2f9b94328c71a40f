//! 跨进程文件锁
//!
//! 基于 fs2 的 OS 建议锁（Unix 上是 flock）。锁归属于打开的文件描述，
//! 每次 acquire 都重新打开锁文件，所以同一进程内的不同线程之间同样互斥。
//! 锁文件本身从不写入数据。

use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use thiserror::Error;

/// 锁错误
#[derive(Debug, Error)]
pub enum LockError {
    #[error("Timed out after {0:?} waiting for lock")]
    Timeout(Duration),

    #[error("Lock file error: {0}")]
    Io(#[from] std::io::Error),
}

/// 命名锁文件
#[derive(Debug, Clone)]
pub struct FileLock {
    path: PathBuf,
    timeout: Duration,
    poll_interval: Duration,
}

impl FileLock {
    pub fn new(path: impl Into<PathBuf>, timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            path: path.into(),
            timeout,
            poll_interval,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 阻塞获取排他锁，超过 timeout 返回 [`LockError::Timeout`]
    pub fn acquire(&self) -> Result<FileLockGuard, LockError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.path)?;

        let started = Instant::now();
        loop {
            match FileExt::try_lock_exclusive(&file) {
                Ok(()) => {
                    let waited = started.elapsed();
                    if waited >= self.poll_interval {
                        tracing::debug!(
                            lock = %self.path.display(),
                            waited_ms = waited.as_millis() as u64,
                            "Lock acquired after contention"
                        );
                    }
                    return Ok(FileLockGuard {
                        file,
                        path: self.path.clone(),
                    });
                }
                Err(e) if is_contended(&e) => {
                    let elapsed = started.elapsed();
                    if elapsed >= self.timeout {
                        tracing::warn!(
                            lock = %self.path.display(),
                            timeout_ms = self.timeout.as_millis() as u64,
                            "Lock acquisition timed out"
                        );
                        return Err(LockError::Timeout(self.timeout));
                    }
                    let remaining = self.timeout - elapsed;
                    std::thread::sleep(self.poll_interval.min(remaining));
                }
                Err(e) => return Err(LockError::Io(e)),
            }
        }
    }
}

fn is_contended(err: &std::io::Error) -> bool {
    err.kind() == std::io::ErrorKind::WouldBlock
        || err.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}

/// 持有中的锁，Drop 时释放
#[derive(Debug)]
pub struct FileLockGuard {
    file: File,
    path: PathBuf,
}

impl Drop for FileLockGuard {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            tracing::warn!(lock = %self.path.display(), error = %e, "Failed to release lock");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use tempfile::tempdir;

    fn lock_at(path: &Path, timeout_ms: u64) -> FileLock {
        FileLock::new(
            path,
            Duration::from_millis(timeout_ms),
            Duration::from_millis(10),
        )
    }

    #[test]
    fn test_acquire_and_release() {
        let dir = tempdir().unwrap();
        let lock = lock_at(&dir.path().join("x.lock"), 200);

        let guard = lock.acquire().unwrap();
        drop(guard);
        // 释放后可以再次获取
        let _guard = lock.acquire().unwrap();
        assert!(lock.path().exists());
    }

    #[test]
    fn test_second_holder_times_out() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("x.lock");
        let _held = lock_at(&path, 200).acquire().unwrap();

        let started = Instant::now();
        let err = lock_at(&path, 150).acquire().unwrap_err();
        assert!(matches!(err, LockError::Timeout(_)));
        assert!(started.elapsed() >= Duration::from_millis(150));
    }

    #[test]
    fn test_waiter_blocks_until_release() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("x.lock");
        let (tx, rx) = mpsc::channel();

        let holder_path = path.clone();
        let holder = std::thread::spawn(move || {
            let _guard = lock_at(&holder_path, 1000).acquire().unwrap();
            tx.send(()).unwrap();
            std::thread::sleep(Duration::from_millis(300));
        });

        rx.recv().unwrap();
        let started = Instant::now();
        let _guard = lock_at(&path, 5000).acquire().unwrap();
        assert!(started.elapsed() >= Duration::from_millis(250));

        holder.join().unwrap();
    }
}
