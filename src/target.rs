//! Ownership of the two intermediate blur targets.
//!
//! The controller ping-pongs between two GPU textures across the four
//! passes. Both are owned exclusively here as two named slots; no other
//! component reads or writes them. The pool is generic over the resource
//! type so the reallocate-on-mismatch policy can be tested with a
//! counting fake instead of a device.

use crate::FrameDimensions;

/// Which of the two intermediate targets a pass refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PingPong {
    Ping,
    Pong,
}

/// Two lazily allocated targets tied to a frame resolution.
#[derive(Debug)]
pub struct TargetPool<T> {
    ping: Option<(FrameDimensions, T)>,
    pong: Option<(FrameDimensions, T)>,
}

impl<T> Default for TargetPool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TargetPool<T> {
    pub const fn new() -> Self {
        Self {
            ping: None,
            pong: None,
        }
    }

    /// Makes both targets match `dims`, calling `create` only for a slot
    /// that is missing or sized for a different resolution. A stale
    /// target is dropped through `destroy` before its replacement is
    /// created. Calling this again with unchanged dimensions is a no-op.
    pub fn ensure(
        &mut self,
        dims: FrameDimensions,
        mut create: impl FnMut(FrameDimensions) -> T,
        mut destroy: impl FnMut(T),
    ) -> (&T, &T) {
        Self::ensure_slot(&mut self.ping, dims, &mut create, &mut destroy);
        Self::ensure_slot(&mut self.pong, dims, &mut create, &mut destroy);
        (
            &self.ping.as_ref().expect("ping target just ensured").1,
            &self.pong.as_ref().expect("pong target just ensured").1,
        )
    }

    fn ensure_slot(
        slot: &mut Option<(FrameDimensions, T)>,
        dims: FrameDimensions,
        create: &mut impl FnMut(FrameDimensions) -> T,
        destroy: &mut impl FnMut(T),
    ) {
        if let Some((current, _)) = slot
            && *current == dims
        {
            return;
        }
        if let Some((_, stale)) = slot.take() {
            destroy(stale);
        }
        *slot = Some((dims, create(dims)));
    }

    /// Borrows a target that was realized by a previous
    /// [`ensure`](Self::ensure) call this frame.
    pub fn get(&self, which: PingPong) -> Option<&T> {
        let slot = match which {
            PingPong::Ping => &self.ping,
            PingPong::Pong => &self.pong,
        };
        slot.as_ref().map(|(_, t)| t)
    }

    /// Drops both targets through `destroy`. Idempotent; a never-allocated
    /// or already-released pool is a no-op.
    pub fn release(&mut self, mut destroy: impl FnMut(T)) {
        for slot in [&mut self.ping, &mut self.pong] {
            if let Some((_, target)) = slot.take() {
                destroy(target);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ping.is_none() && self.pong.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dims(w: u32, h: u32) -> FrameDimensions {
        FrameDimensions::new(w, h)
    }

    #[test]
    fn test_ensure_allocates_lazily_once() {
        let mut pool: TargetPool<u32> = TargetPool::new();
        assert!(pool.is_empty());

        let mut created = 0;
        pool.ensure(dims(64, 64), |_| {
            created += 1;
            created
        }, |_| {});
        assert_eq!(created, 2);

        // Unchanged dimensions: second call must be a no-op.
        pool.ensure(dims(64, 64), |_| {
            created += 1;
            created
        }, |_| {});
        assert_eq!(created, 2);
    }

    #[test]
    fn test_resolution_change_reallocates_each_target_once() {
        let mut pool: TargetPool<u32> = TargetPool::new();
        let mut created = 0;
        let mut destroyed = 0;

        pool.ensure(dims(64, 64), |_| {
            created += 1;
            created
        }, |_| destroyed += 1);
        pool.ensure(dims(128, 32), |_| {
            created += 1;
            created
        }, |_| destroyed += 1);

        assert_eq!(created, 4);
        assert_eq!(destroyed, 2);
    }

    #[test]
    fn test_ensure_returns_both_targets() {
        let mut pool: TargetPool<&str> = TargetPool::new();
        let mut names = ["ping", "pong"].into_iter();
        let (a, b) = pool.ensure(dims(8, 8), |_| names.next().unwrap(), |_| {});
        assert_eq!((*a, *b), ("ping", "pong"));
        assert_eq!(pool.get(PingPong::Ping), Some(&"ping"));
        assert_eq!(pool.get(PingPong::Pong), Some(&"pong"));
    }

    #[test]
    fn test_release_is_idempotent() {
        let mut pool: TargetPool<u32> = TargetPool::new();
        let mut destroyed = 0;

        // Release before any allocation: no-op.
        pool.release(|_| destroyed += 1);
        assert_eq!(destroyed, 0);

        pool.ensure(dims(16, 16), |_| 0, |_| {});
        pool.release(|_| destroyed += 1);
        pool.release(|_| destroyed += 1);
        assert_eq!(destroyed, 2);
        assert!(pool.is_empty());
        assert_eq!(pool.get(PingPong::Ping), None);
    }
}
