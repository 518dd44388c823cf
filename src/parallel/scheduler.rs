//! Shared pool of pending source files

use std::path::PathBuf;

use crossbeam::queue::SegQueue;

/// Lock-free pool of source paths, filled once and drained by the workers.
///
/// The only way to take work is [`try_claim`](WorkQueue::try_claim), which
/// removes and returns one path atomically. There is no separate
/// peek-then-pop pair.
#[derive(Debug, Default)]
pub struct WorkQueue {
    pending: SegQueue<PathBuf>,
}

impl WorkQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim one pending path, or `None` once the pool is drained. Never blocks.
    pub fn try_claim(&self) -> Option<PathBuf> {
        self.pending.pop()
    }

    /// Best-effort hint; another worker may claim the last item right after this returns.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Best-effort count of unclaimed paths
    pub fn len(&self) -> usize {
        self.pending.len()
    }
}

impl FromIterator<PathBuf> for WorkQueue {
    fn from_iter<I: IntoIterator<Item = PathBuf>>(iter: I) -> Self {
        let queue = Self::new();
        for path in iter {
            queue.pending.push(path);
        }
        queue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;

    fn paths(count: usize) -> Vec<PathBuf> {
        (0..count).map(|i| PathBuf::from(format!("img{i:04}.jpg"))).collect()
    }

    #[test]
    fn test_claim_until_empty() {
        let queue: WorkQueue = paths(3).into_iter().collect();
        assert_eq!(queue.len(), 3);

        let mut claimed = Vec::new();
        while let Some(path) = queue.try_claim() {
            claimed.push(path);
        }

        claimed.sort();
        assert_eq!(claimed, paths(3));
        assert!(queue.is_empty());
        assert!(queue.try_claim().is_none());
    }

    #[test]
    fn test_empty_queue_does_not_block() {
        let queue = WorkQueue::new();
        assert!(queue.is_empty());
        assert!(queue.try_claim().is_none());
    }

    #[test]
    fn test_concurrent_claims_are_exclusive() {
        let expected = paths(2_000);
        let queue: WorkQueue = expected.iter().cloned().collect();
        let claimed = Mutex::new(Vec::new());

        std::thread::scope(|scope| {
            for _ in 0..16 {
                scope.spawn(|| {
                    let mut mine = Vec::new();
                    while let Some(path) = queue.try_claim() {
                        mine.push(path);
                    }
                    claimed.lock().unwrap().extend(mine);
                });
            }
        });

        let claimed = claimed.into_inner().unwrap();
        assert_eq!(claimed.len(), expected.len());

        let unique: HashSet<_> = claimed.into_iter().collect();
        assert_eq!(unique, expected.into_iter().collect::<HashSet<_>>());
    }
}
