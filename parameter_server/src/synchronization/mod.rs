mod rw_lock;

pub use rw_lock::{ReadGuard, RwLock, WriteGuard};
