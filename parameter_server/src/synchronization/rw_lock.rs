use parking_lot::{Condvar, Mutex};

#[derive(Debug, Default)]
struct LockState {
    readers: usize,
    writer: bool,
    waiting_writers: usize,
}

/// A reader-writer lock that prefers writers.
///
/// Any amount of readers may hold the lock at once, or a single writer. Once a writer
/// starts waiting no new reader is admitted until every waiting writer went through,
/// so a steady stream of readers can't starve writers. The order in which several
/// waiting writers are woken up is unspecified.
///
/// The lock guards no data of its own, it only orders whoever shares it. Acquiring
/// returns a guard that releases the lock when dropped, including while unwinding.
///
/// There is no acquisition timeout: a guard that is never dropped blocks every
/// following acquisition forever.
#[derive(Debug, Default)]
pub struct RwLock {
    state: Mutex<LockState>,
    readers_cv: Condvar,
    writers_cv: Condvar,
}

/// Shared access to a `RwLock`, released on drop.
#[must_use = "the lock is released as soon as the guard is dropped"]
#[derive(Debug)]
pub struct ReadGuard<'a> {
    lock: &'a RwLock,
}

/// Exclusive access to a `RwLock`, released on drop.
#[must_use = "the lock is released as soon as the guard is dropped"]
#[derive(Debug)]
pub struct WriteGuard<'a> {
    lock: &'a RwLock,
}

impl RwLock {
    /// Creates a new unlocked `RwLock`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Blocks until shared access is granted.
    ///
    /// # Returns
    /// A guard that holds the lock in read mode.
    pub fn read(&self) -> ReadGuard<'_> {
        let mut state = self.state.lock();

        while state.writer || state.waiting_writers > 0 {
            self.readers_cv.wait(&mut state);
        }

        state.readers += 1;
        ReadGuard { lock: self }
    }

    /// Blocks until exclusive access is granted.
    ///
    /// # Returns
    /// A guard that holds the lock in write mode.
    pub fn write(&self) -> WriteGuard<'_> {
        let mut state = self.state.lock();
        state.waiting_writers += 1;

        while state.writer || state.readers > 0 {
            self.writers_cv.wait(&mut state);
        }

        state.waiting_writers -= 1;
        state.writer = true;
        WriteGuard { lock: self }
    }

    /// Attempts to acquire shared access without blocking.
    ///
    /// # Returns
    /// `None` if a writer holds the lock or is waiting for it.
    pub fn try_read(&self) -> Option<ReadGuard<'_>> {
        let mut state = self.state.lock();

        if state.writer || state.waiting_writers > 0 {
            return None;
        }

        state.readers += 1;
        Some(ReadGuard { lock: self })
    }

    /// Attempts to acquire exclusive access without blocking.
    ///
    /// A free lock is taken even if other writers are queued for it, since queued
    /// writers aren't served in any particular order.
    ///
    /// # Returns
    /// `None` if the lock is held in any mode.
    pub fn try_write(&self) -> Option<WriteGuard<'_>> {
        let mut state = self.state.lock();

        if state.writer || state.readers > 0 {
            return None;
        }

        state.writer = true;
        Some(WriteGuard { lock: self })
    }

    /// The amount of readers currently holding the lock.
    pub fn readers(&self) -> usize {
        self.state.lock().readers
    }

    /// The amount of writers blocked waiting for the lock.
    pub fn waiting_writers(&self) -> usize {
        self.state.lock().waiting_writers
    }

    /// Whether a writer currently holds the lock.
    pub fn is_write_locked(&self) -> bool {
        self.state.lock().writer
    }

    fn release_read(&self) {
        let mut state = self.state.lock();
        state.readers -= 1;

        if state.readers == 0 && state.waiting_writers > 0 {
            self.writers_cv.notify_one();
        }
    }

    fn release_write(&self) {
        let mut state = self.state.lock();
        state.writer = false;

        if state.waiting_writers > 0 {
            self.writers_cv.notify_one();
        } else {
            self.readers_cv.notify_all();
        }
    }
}

impl Drop for ReadGuard<'_> {
    fn drop(&mut self) {
        self.lock.release_read();
    }
}

impl Drop for WriteGuard<'_> {
    fn drop(&mut self) {
        self.lock.release_write();
    }
}

#[cfg(test)]
mod tests {
    use std::{
        panic::{self, AssertUnwindSafe},
        sync::{
            Barrier,
            atomic::{AtomicUsize, Ordering},
        },
        thread,
        time::Duration,
    };

    use super::*;

    fn wait_for(cond: impl Fn() -> bool) {
        while !cond() {
            thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn readers_share_the_lock() {
        const READERS: usize = 8;

        let lock = RwLock::new();
        let barrier = Barrier::new(READERS);

        thread::scope(|s| {
            for _ in 0..READERS {
                s.spawn(|| {
                    let _guard = lock.read();
                    // Every reader must be inside at the same time to get past this.
                    barrier.wait();
                });
            }
        });

        assert_eq!(lock.readers(), 0);
    }

    #[test]
    fn writer_excludes_everyone() {
        let lock = RwLock::new();

        let guard = lock.write();
        assert!(lock.is_write_locked());
        assert!(lock.try_read().is_none());
        assert!(lock.try_write().is_none());

        drop(guard);
        assert!(!lock.is_write_locked());
        assert!(lock.try_read().is_some());
    }

    #[test]
    fn reader_excludes_writers() {
        let lock = RwLock::new();

        let guard = lock.read();
        assert!(lock.try_write().is_none());
        assert!(lock.try_read().is_some());

        drop(guard);
        assert!(lock.try_write().is_some());
    }

    #[test]
    fn waiting_writer_blocks_new_readers() {
        let lock = RwLock::new();
        let reader = lock.read();

        thread::scope(|s| {
            let writer = s.spawn(|| {
                let _guard = lock.write();
                assert_eq!(lock.readers(), 0);
            });

            wait_for(|| lock.waiting_writers() == 1);

            // The lock is only held for reading, yet newcomers must queue behind the writer.
            assert!(lock.try_read().is_none());

            drop(reader);
            writer.join().unwrap();
        });

        assert_eq!(lock.waiting_writers(), 0);
        assert!(lock.try_read().is_some());
    }

    #[test]
    fn writers_are_mutually_exclusive() {
        const WRITERS: usize = 8;
        const ROUNDS: usize = 200;

        let lock = RwLock::new();
        let inside = AtomicUsize::new(0);
        let total = AtomicUsize::new(0);

        thread::scope(|s| {
            for _ in 0..WRITERS {
                s.spawn(|| {
                    for _ in 0..ROUNDS {
                        let _guard = lock.write();
                        assert_eq!(inside.fetch_add(1, Ordering::SeqCst), 0);

                        // A non atomic read-modify-write, only safe under exclusion.
                        let seen = total.load(Ordering::SeqCst);
                        thread::yield_now();
                        total.store(seen + 1, Ordering::SeqCst);

                        inside.fetch_sub(1, Ordering::SeqCst);
                    }
                });
            }
        });

        assert_eq!(total.into_inner(), WRITERS * ROUNDS);
    }

    #[test]
    fn readers_never_overlap_a_writer() {
        let lock = RwLock::new();
        let writing = AtomicUsize::new(0);

        thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    for _ in 0..200 {
                        let _guard = lock.read();
                        assert_eq!(writing.load(Ordering::SeqCst), 0);
                    }
                });
            }

            for _ in 0..2 {
                s.spawn(|| {
                    for _ in 0..100 {
                        let _guard = lock.write();
                        writing.store(1, Ordering::SeqCst);
                        thread::yield_now();
                        writing.store(0, Ordering::SeqCst);
                    }
                });
            }
        });
    }

    #[test]
    fn guard_is_released_while_unwinding() {
        let lock = RwLock::new();

        let res = panic::catch_unwind(AssertUnwindSafe(|| {
            let _guard = lock.write();
            panic!("optimizer exploded");
        }));

        assert!(res.is_err());
        assert!(!lock.is_write_locked());
        assert!(lock.try_write().is_some());

        let res = panic::catch_unwind(AssertUnwindSafe(|| {
            let _guard = lock.read();
            panic!("serializer exploded");
        }));

        assert!(res.is_err());
        assert_eq!(lock.readers(), 0);
    }
}
