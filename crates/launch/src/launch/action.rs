/// Control actions an observer can request during a launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Stop the launch and return the solution so far.
    StopEarly,
}
