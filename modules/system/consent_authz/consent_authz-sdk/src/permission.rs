//! Transport operation to action mapping.

use crate::models::Action;

/// Map an HTTP-style operation to its action.
///
/// | operation | action |
/// |-----------|--------|
/// | `GET`     | read   |
/// | `POST`    | write  |
/// | `PUT`     | write  |
/// | `DELETE`  | delete |
///
/// Anything else (including lower-case spellings) is unrecognized.
#[must_use]
pub fn map_operation_to_action(operation: &str) -> Option<Action> {
    match operation {
        "GET" => Some(Action::Read),
        "POST" | "PUT" => Some(Action::Write),
        "DELETE" => Some(Action::Delete),
        _ => None,
    }
}
