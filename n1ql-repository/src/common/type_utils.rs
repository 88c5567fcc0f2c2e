use std::sync::Arc;

use parking_lot::RwLock;

/// Lock-protected state shared between clones, such as an error's captured backtrace.
pub type Atomic<T> = Arc<RwLock<T>>;

#[inline]
pub fn atomic<T>(t: T) -> Atomic<T> {
    Arc::new(RwLock::new(t))
}

/// Runs a closure under the read lock.
pub trait ReadExecutor<T: ?Sized> {
    fn read_with<R>(&self, f: impl FnOnce(&T) -> R) -> R;
}

impl<T> ReadExecutor<T> for Atomic<T> {
    #[inline]
    fn read_with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let read_guard = self.read();
        f(&*read_guard)
    }
}

pub trait WriteExecutor<T: ?Sized> {
    fn write_with<R>(&self, f: impl FnOnce(&mut T) -> R) -> R;
}

impl<T> WriteExecutor<T> for Atomic<T> {
    #[inline]
    fn write_with<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let mut write_guard = self.write();
        f(&mut *write_guard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Value;

    #[test]
    fn test_read_with_sees_recorded_rows() {
        let rows = atomic(vec![Value::from("r1"), Value::from("r2")]);
        assert_eq!(rows.read_with(|r| r.len()), 2);
    }

    #[test]
    fn test_write_with_is_visible_to_clones() {
        let requests = atomic(Vec::<Value>::new());
        let recorder = requests.clone();
        recorder.write_with(|r| r.push(Value::from("SELECT 1")));
        assert_eq!(
            requests.read_with(|r| r.first().cloned()),
            Some(Value::from("SELECT 1"))
        );
    }
}
