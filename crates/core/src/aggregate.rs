//! Aggregate execution semantics (pure, deterministic).

/// Decision/evolution split for the market's state machines.
///
/// - **Decision logic**: `handle(&self, cmd)` returns events.
/// - **State mutation**: `apply(&mut self, event)` evolves state.
///
/// `handle` must not mutate state or perform IO; it only returns events
/// describing what happened. This is what gives every operation its
/// no-partial-mutation guarantee: a command that fails validation has, by
/// construction, changed nothing.
pub trait Aggregate {
    type Command: Clone + core::fmt::Debug;
    type Event: Clone + core::fmt::Debug;
    type Error: core::fmt::Debug;

    /// Decide which events to emit given the current state and a command.
    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error>;

    /// Evolve in-memory state from a single event.
    ///
    /// Implementations must be deterministic and infallible; anything that
    /// can fail belongs in `handle`.
    fn apply(&mut self, event: &Self::Event);

    /// Number of events applied so far (monotonically increasing).
    fn version(&self) -> u64;
}

/// Handle `command` and immediately apply the resulting events.
///
/// The canonical decide-then-evolve lifecycle for callers that do not need
/// to inspect or stage events between the two steps.
pub fn execute<A>(aggregate: &mut A, command: &A::Command) -> Result<Vec<A::Event>, A::Error>
where
    A: Aggregate,
{
    let events = A::handle(aggregate, command)?;
    for event in &events {
        A::apply(aggregate, event);
    }
    Ok(events)
}
