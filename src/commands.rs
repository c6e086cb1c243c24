//! Parsing of the `resin [n]` command and its aliases.

/// A parsed resin command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResinCommand {
    /// `resin` with no argument — report the projected count.
    Query,
    /// `resin <n>` — record a fresh count. Bounds are checked by the handler.
    Update(i64),
}

/// Try to read `content` as a resin command under the given names.
///
/// Accepts bare (`resin 10`), slash (`/resin 10`), and group-addressed
/// (`/resin@somebot 10`) forms. Anything else — including a malformed or
/// extra argument — is not a command and returns None.
pub fn parse(content: &str, names: &[&str]) -> Option<ResinCommand> {
    let mut words = content.split_whitespace();
    let head = words.next()?;
    let head = head.strip_prefix('/').unwrap_or(head);
    let head = head.split('@').next().unwrap_or(head);
    if !names.iter().any(|name| head.eq_ignore_ascii_case(name)) {
        return None;
    }

    match words.next() {
        None => Some(ResinCommand::Query),
        Some(arg) => {
            if words.next().is_some() {
                return None;
            }
            arg.parse::<i64>().ok().map(ResinCommand::Update)
        }
    }
}
