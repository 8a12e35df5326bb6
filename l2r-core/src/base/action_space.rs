//! Action space.

/// A set of valid actions from which random actions can be drawn.
pub trait ActionSpace<A> {
    /// Draws an action uniformly from the space.
    fn sample(&mut self) -> A;

    /// Returns `true` if the action lies in the space.
    fn contains(&self, act: &A) -> bool;
}
