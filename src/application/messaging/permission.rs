//! Permission gate

use crate::domain::entities::{Level, User};

/// True iff the caller's effective level reaches `required`.
pub fn authorize(required: Level, caller: &User) -> bool {
    caller.level() >= required
}
