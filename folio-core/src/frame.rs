/// Per-frame coalescing of pending work.
///
/// Holds at most one pending value. Offering a new value while a frame
/// is already scheduled replaces the pending value instead of queueing it,
/// so the frame callback only ever sees the most recent one.
#[derive(Debug)]
pub struct FrameSlot<T> {
    pending: Option<T>,
    scheduled: bool,
}

impl<T> FrameSlot<T> {
    pub fn new() -> Self {
        Self {
            pending: None,
            scheduled: false,
        }
    }

    /// Store `value`, superseding anything pending.
    ///
    /// Returns `true` when no frame is scheduled yet and the caller has to
    /// request one.
    pub fn offer(&mut self, value: T) -> bool {
        self.pending = Some(value);
        if self.scheduled {
            false
        } else {
            self.scheduled = true;
            true
        }
    }

    /// Called from the frame callback
    pub fn take(&mut self) -> Option<T> {
        self.scheduled = false;
        self.pending.take()
    }

    /// Drop pending work. Returns whether anything was discarded.
    pub fn cancel(&mut self) -> bool {
        self.scheduled = false;
        self.pending.take().is_some()
    }

    pub fn is_scheduled(&self) -> bool {
        self.scheduled
    }
}

impl<T> Default for FrameSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_first_offer_requests_frame() {
        let mut slot = FrameSlot::new();
        assert!(slot.offer(1));
        assert!(!slot.offer(2));
        assert!(!slot.offer(3));
        assert!(slot.is_scheduled());

        assert_eq!(slot.take(), Some(3));
        assert_eq!(slot.take(), None);
        assert!(!slot.is_scheduled());

        // Next frame interval starts fresh
        assert!(slot.offer(4));
    }

    #[test]
    fn test_cancel_discards_pending() {
        let mut slot = FrameSlot::new();
        slot.offer("a");
        assert!(slot.cancel());
        assert!(!slot.cancel());
        assert!(!slot.is_scheduled());
        assert_eq!(slot.take(), None);
    }
}
