//! Status source abstraction.

use retaliation_models::BuildEvent;

use crate::error::Result;

/// Something that knows whether a build is currently failing.
///
/// Implementations return `Ok(None)` when there is no failure to act on or
/// when the failure does not name a responsible user.
pub trait StatusSource {
    /// Fetches the current failed build, if any.
    fn failed_build(&mut self) -> Result<Option<BuildEvent>>;
}

impl<S: StatusSource + ?Sized> StatusSource for Box<S> {
    fn failed_build(&mut self) -> Result<Option<BuildEvent>> {
        (**self).failed_build()
    }
}
