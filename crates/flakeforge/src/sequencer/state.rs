/// Mutable clock/increment state owned by one generator.
///
/// Used to restore a generator at an explicit point (see
/// [`crate::BasicSequencer::from_components`] and
/// [`crate::LockSequencer::from_components`]) and to inspect a sequential
/// generator between calls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct GeneratorState {
    /// Last observed timestamp, in milliseconds since 1970-01-01 UTC.
    pub last_timestamp: u64,
    /// The increment most recently handed out.
    pub increment: u64,
}
