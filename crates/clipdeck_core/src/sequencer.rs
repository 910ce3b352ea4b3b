use crate::{ActiveStage, Stage};

/// Returns the stage an item moves to after a tick.
///
/// Without an overflow the item stays where it is. On overflow it moves to
/// the next active stage, or to `Complete` after the last one.
pub fn next_stage(current: ActiveStage, overflowed: bool) -> Stage {
    if !overflowed {
        return current.into();
    }
    match current.successor() {
        Some(next) => next.into(),
        None => Stage::Complete,
    }
}
