use std::fmt::Display;

/// Turns a failed `Result` into a logged `None`.
///
/// Used wherever a failure must be recorded but must not stop the surrounding work.
pub trait ResultOkLogExt<T, E> {
    fn ok_log(self, context: impl Display) -> Option<T>;
}

impl<T, E> ResultOkLogExt<T, E> for std::result::Result<T, E>
where
    E: std::error::Error,
{
    fn ok_log(self, context: impl Display) -> Option<T> {
        match self {
            Ok(ok) => Some(ok),
            Err(err) => {
                log::error!("{context}: {err}");
                None
            }
        }
    }
}
