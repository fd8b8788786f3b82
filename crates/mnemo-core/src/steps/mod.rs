//! Learning/relearning step list parsing.
//!
//! Step lists are space-separated duration tokens such as `"1m 10m 1d"`.
//! Suffixes: `m` minutes, `h` hours, `d` days; a bare number is minutes.
//! Parsing is lenient: malformed or non-positive tokens are dropped
//! rather than rejected, so a half-edited settings string still yields a
//! usable step list.

/// Fallback step list (in minutes) when a step string parses to nothing.
const FALLBACK_STEPS: [u32; 3] = [0, 1, 10];

/// Parse a step string into minute durations.
///
/// Tokens that are not a positive duration are silently skipped.
///
/// ```
/// use mnemo_core::steps::parse_steps;
///
/// assert_eq!(parse_steps("1m 10m 1d"), vec![1, 10, 1440]);
/// assert_eq!(parse_steps("2h junk -5m 15"), vec![120, 15]);
/// ```
pub fn parse_steps(steps: &str) -> Vec<u32> {
    steps.split_whitespace().filter_map(parse_token).collect()
}

fn parse_token(token: &str) -> Option<u32> {
    let (number, multiplier) = match token.as_bytes().last()? {
        b'm' => (&token[..token.len() - 1], 1u32),
        b'h' => (&token[..token.len() - 1], 60),
        b'd' => (&token[..token.len() - 1], 1440),
        _ => (token, 1),
    };

    let minutes: i64 = number.parse().ok()?;
    if minutes <= 0 {
        return None;
    }

    u32::try_from(minutes).ok()?.checked_mul(multiplier)
}

/// Resolve a step string into the effective step list for a session.
///
/// An implicit zero-minute step is prepended for immediate re-show on a
/// reset. An empty parse falls back to `[0, 1, 10]`.
pub fn resolve_steps(steps: &str) -> Vec<u32> {
    let parsed = parse_steps(steps);
    if parsed.is_empty() {
        return FALLBACK_STEPS.to_vec();
    }

    let mut resolved = Vec::with_capacity(parsed.len() + 1);
    resolved.push(0);
    resolved.extend(parsed);
    resolved
}
