//! Symbol & Vector Codec: stable content-addressed names for patterns and
//! vectors.
//!
//! Pure, deterministic, and free of I/O — a caller contract violation
//! (non-UTF-8 input) is the only failure mode, and Rust's `String`/`&str`
//! already rule that out at the type level.

use sha1::{Digest, Sha1};

/// Prefix for a quantized-vector symbol.
pub const VECTOR_PREFIX: &str = "VCTR|";

/// Prefix for a learned-pattern symbol.
pub const PATTERN_PREFIX: &str = "PTRN|";

/// Sort an event's symbols lexicographically, the canonicalisation step
/// every event goes through before it is hashed or stored.
pub fn canonicalize_event(event: &mut [String]) {
    event.sort();
}

/// Build the textual list-of-lists representation used as the hash input
/// for a pattern, e.g. `[['a', 'b'], ['c']]`. Each inner event must already
/// be sorted by the caller (the STM / Pattern constructor does this).
fn pattern_repr(events: &[Vec<String>]) -> String {
    let mut out = String::from("[");
    for (i, event) in events.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push('[');
        for (j, sym) in event.iter().enumerate() {
            if j > 0 {
                out.push_str(", ");
            }
            out.push('\'');
            out.push_str(sym);
            out.push('\'');
        }
        out.push(']');
    }
    out.push(']');
    out
}

/// Build the textual representation used as the hash input for a vector,
/// e.g. `[1.0, 2.0, 3.0]`.
fn vector_repr(v: &[f64]) -> String {
    let mut out = String::from("[");
    for (i, x) in v.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push_str(&format!("{x}"));
    }
    out.push(']');
    out
}

fn sha1_hex(s: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(s.as_bytes());
    hex::encode(hasher.finalize())
}

/// `"PTRN|" + SHA1_hex(repr(events))`. Each event must already be sorted;
/// this function does not sort for the caller, since sorting is a
/// canonicalisation concern owned by whoever assembles the pattern (the STM
/// manager), not the codec.
pub fn pattern_name(events: &[Vec<String>]) -> String {
    format!("{PATTERN_PREFIX}{}", sha1_hex(&pattern_repr(events)))
}

/// `"VCTR|" + SHA1_hex(repr(v))`.
pub fn vector_name(v: &[f64]) -> String {
    format!("{VECTOR_PREFIX}{}", sha1_hex(&vector_repr(v)))
}

/// Whether a symbol is a reserved quantized-vector symbol.
pub fn is_vector_symbol(symbol: &str) -> bool {
    symbol.starts_with(VECTOR_PREFIX)
}

/// Whether a symbol is a reserved learned-pattern symbol.
pub fn is_pattern_symbol(symbol: &str) -> bool {
    symbol.starts_with(PATTERN_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_name_is_deterministic() {
        let events = vec![vec!["a".to_string(), "b".to_string()], vec!["c".to_string()]];
        let n1 = pattern_name(&events);
        let n2 = pattern_name(&events);
        assert_eq!(n1, n2);
        assert!(n1.starts_with(PATTERN_PREFIX));
        assert_eq!(n1.len(), PATTERN_PREFIX.len() + 40);
    }

    #[test]
    fn pattern_name_depends_on_event_order() {
        let a = vec![vec!["a".to_string()], vec!["b".to_string()]];
        let b = vec![vec!["b".to_string()], vec!["a".to_string()]];
        assert_ne!(pattern_name(&a), pattern_name(&b));
    }

    #[test]
    fn pattern_name_depends_on_inner_sort() {
        let sorted = vec![vec!["a".to_string(), "b".to_string()]];
        let unsorted = vec![vec!["b".to_string(), "a".to_string()]];
        assert_ne!(pattern_name(&sorted), pattern_name(&unsorted));
    }

    #[test]
    fn vector_name_is_deterministic_and_prefixed() {
        let v = vec![1.0, 2.0, 3.5];
        let n = vector_name(&v);
        assert!(n.starts_with(VECTOR_PREFIX));
        assert_eq!(n, vector_name(&v));
    }

    #[test]
    fn symbol_kind_detection() {
        assert!(is_pattern_symbol("PTRN|abc"));
        assert!(is_vector_symbol("VCTR|abc"));
        assert!(!is_pattern_symbol("hello"));
    }
}
