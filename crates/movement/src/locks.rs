use std::cell::RefCell;
use std::rc::Rc;

use bitflags::bitflags;
use glam::Vec2;

bitflags! {
    /// Movement input axes that scripted moves can take away from the player.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct LockAxes: u8 {
        const FORWARD_BACK = 1 << 0;
        const RIGHT_LEFT = 1 << 1;
    }
}

/// Reference-counted input locks, one counter per axis.
///
/// A move that needs the player hands-off locks an axis and unlocks it when
/// done. Locks from different moves stack; the axis is free again once every
/// lock on it has been released.
#[derive(Debug, Clone, Default)]
pub struct InputLocks {
    forward_back: u8,
    right_left: u8,
}

/// Lock registry shared between the movement controller and the input layer.
pub type SharedInputLocks = Rc<RefCell<InputLocks>>;

impl InputLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedInputLocks {
        Rc::new(RefCell::new(Self::new()))
    }

    pub fn lock(&mut self, axes: LockAxes) {
        for axis in axes.iter() {
            let counter = self.counter_mut(axis);
            *counter = counter.saturating_add(1);
        }
    }

    /// Releases one lock per axis. Releasing a free axis is a caller bug;
    /// it is reported and the counter stays at zero.
    pub fn unlock(&mut self, axes: LockAxes) {
        for axis in axes.iter() {
            let counter = self.counter_mut(axis);
            if *counter == 0 {
                log::error!("input lock imbalance: unlock of free axis {:?}", axis);
                continue;
            }
            *counter -= 1;
        }
    }

    pub fn is_forward_back_locked(&self) -> bool {
        self.forward_back > 0
    }

    pub fn is_right_left_locked(&self) -> bool {
        self.right_left > 0
    }

    /// Lock count of a single axis. Passing several axes returns the largest.
    pub fn count(&self, axes: LockAxes) -> u8 {
        let mut count = 0;
        if axes.contains(LockAxes::FORWARD_BACK) {
            count = count.max(self.forward_back);
        }
        if axes.contains(LockAxes::RIGHT_LEFT) {
            count = count.max(self.right_left);
        }
        count
    }

    pub fn locked_axes(&self) -> LockAxes {
        let mut axes = LockAxes::empty();
        axes.set(LockAxes::FORWARD_BACK, self.forward_back > 0);
        axes.set(LockAxes::RIGHT_LEFT, self.right_left > 0);
        axes
    }

    pub fn unlock_all(&mut self) {
        self.forward_back = 0;
        self.right_left = 0;
    }

    /// Zeroes the components of a move input whose axis is locked.
    /// `x` is right/left, `y` is forward/back.
    pub fn filter_move_input(&self, input: Vec2) -> Vec2 {
        Vec2::new(
            if self.is_right_left_locked() { 0.0 } else { input.x },
            if self.is_forward_back_locked() { 0.0 } else { input.y },
        )
    }

    fn counter_mut(&mut self, axis: LockAxes) -> &mut u8 {
        if axis == LockAxes::FORWARD_BACK {
            &mut self.forward_back
        } else {
            &mut self.right_left
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn balanced_locks_release_axis() {
        let mut locks = InputLocks::new();
        for _ in 0..5 {
            locks.lock(LockAxes::FORWARD_BACK);
        }
        assert!(locks.is_forward_back_locked());
        assert!(!locks.is_right_left_locked());

        for _ in 0..5 {
            locks.unlock(LockAxes::FORWARD_BACK);
        }
        assert!(!locks.is_forward_back_locked());
        assert_eq!(locks.count(LockAxes::FORWARD_BACK), 0);
    }

    #[test]
    fn unlock_without_lock_stays_at_zero() {
        let mut locks = InputLocks::new();
        for _ in 0..3 {
            locks.unlock(LockAxes::all());
        }
        assert_eq!(locks.count(LockAxes::FORWARD_BACK), 0);
        assert_eq!(locks.count(LockAxes::RIGHT_LEFT), 0);

        locks.lock(LockAxes::RIGHT_LEFT);
        assert!(locks.is_right_left_locked());
    }

    #[test]
    fn counters_saturate() {
        let mut locks = InputLocks::new();
        for _ in 0..300 {
            locks.lock(LockAxes::RIGHT_LEFT);
        }
        assert_eq!(locks.count(LockAxes::RIGHT_LEFT), u8::MAX);
    }

    #[test]
    fn axes_are_independent() {
        let mut locks = InputLocks::new();
        locks.lock(LockAxes::all());
        locks.unlock(LockAxes::FORWARD_BACK);

        assert_eq!(locks.locked_axes(), LockAxes::RIGHT_LEFT);
        assert_eq!(
            locks.filter_move_input(Vec2::new(0.5, 1.0)),
            Vec2::new(0.0, 1.0)
        );

        locks.unlock_all();
        assert_eq!(locks.locked_axes(), LockAxes::empty());
    }
}
