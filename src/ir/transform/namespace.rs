//! Invertible flattening of `(identifier, namespace)` pairs.
//!
//! A sub-component symbol `v` of sub-component `cell` becomes `v__cell`.
//! Double underscores delimit the namespace, so every run of two or more
//! underscores inside the namespace gets one extra underscore before it is
//! appended. Splitting cuts at the last run of exactly two underscores and
//! undoes the escaping. Identifiers may themselves contain delimiters
//! (nested namespaces), which is why the cut is at the last one.

/// Delimiter between an identifier and its namespace.
pub const DELIMITER: &str = "__";

/// Suffix of the default exposure name of a reduce port.
pub const REDUCE_SUFFIX: &str = "__reduce";

/// Suffix of composite regime names.
pub const REGIME_SUFFIX: &str = "_regime";

/// Add one underscore to every run of two or more underscores.
pub fn escape(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 2);
    let mut run = 0;
    for c in name.chars() {
        if c == '_' {
            run += 1;
        } else {
            flush_escaped(&mut out, run);
            run = 0;
            out.push(c);
        }
    }
    flush_escaped(&mut out, run);
    out
}

/// Remove one underscore from every run of three or more underscores.
fn unescape(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut run = 0;
    for c in name.chars() {
        if c == '_' {
            run += 1;
        } else {
            flush_unescaped(&mut out, run);
            run = 0;
            out.push(c);
        }
    }
    flush_unescaped(&mut out, run);
    out
}

fn flush_escaped(out: &mut String, run: usize) {
    let len = if run >= 2 { run + 1 } else { run };
    out.extend(std::iter::repeat('_').take(len));
}

fn flush_unescaped(out: &mut String, run: usize) {
    let len = if run >= 3 { run - 1 } else { run };
    out.extend(std::iter::repeat('_').take(len));
}

/// Flatten `identifier` into `namespace`.
pub fn append_namespace(identifier: &str, namespace: &str) -> String {
    format!("{identifier}{DELIMITER}{}", escape(namespace))
}

/// Inverse of [`append_namespace`]. Returns `None` when `flat` contains no
/// delimiter.
pub fn split_namespace(flat: &str) -> Option<(String, String)> {
    let bytes = flat.as_bytes();
    let mut cut = None;
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'_' {
            let start = i;
            while i < bytes.len() && bytes[i] == b'_' {
                i += 1;
            }
            if i - start == 2 {
                cut = Some(start);
            }
        } else {
            i += 1;
        }
    }
    let cut = cut?;
    let identifier = &flat[..cut];
    let namespace = &flat[cut + DELIMITER.len()..];
    Some((identifier.to_string(), unescape(namespace)))
}

/// Name of the composite regime made of `regimes`, given in sub-component
/// order.
pub fn make_regime_name<'a>(regimes: impl IntoIterator<Item = &'a str>) -> String {
    let parts: Vec<String> = regimes.into_iter().map(escape).collect();
    format!("{}{REGIME_SUFFIX}", parts.join(DELIMITER))
}
