//! Time source abstraction
//!
//! Bounded polling loops in the driver read elapsed time through this
//! trait, so they can run under any scheduler and against a fake clock in
//! tests.

/// Monotonic millisecond clock
pub trait Clock {
    /// Milliseconds since an arbitrary epoch, wrapping at `u32::MAX`
    fn now_ms(&mut self) -> u32;

    /// Give other work a chance to run while the caller busy-polls
    ///
    /// The default does nothing, which suits bare-metal single-task use.
    fn yield_now(&mut self) {}

    /// Milliseconds elapsed since `start`, tolerant of wraparound
    fn elapsed_since(&mut self, start: u32) -> u32 {
        self.now_ms().wrapping_sub(start)
    }
}

impl<T: Clock + ?Sized> Clock for &mut T {
    fn now_ms(&mut self) -> u32 {
        T::now_ms(self)
    }

    fn yield_now(&mut self) {
        T::yield_now(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(u32);

    impl Clock for Fixed {
        fn now_ms(&mut self) -> u32 {
            self.0
        }
    }

    #[test]
    fn test_elapsed_wraps() {
        let mut clock = Fixed(5);
        assert_eq!(clock.elapsed_since(u32::MAX - 4), 10);

        let mut clock = Fixed(300);
        assert_eq!(clock.elapsed_since(50), 250);
    }
}
