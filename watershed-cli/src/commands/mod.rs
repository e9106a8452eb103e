pub mod locate;
pub mod lookup;
pub mod stats;
pub mod validate;

/// Several address arguments are treated as the lines of a postal address.
pub(crate) fn join_address(parts: &[String]) -> String {
    parts.join("\n")
}
