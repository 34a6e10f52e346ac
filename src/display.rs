//! Type-name display formatter.
//!
//! Purely a display aid: formatted names are cached per raw name but must
//! never be used as an identity key anywhere in aggregation or
//! comparison — only the raw type name (from the graph store) is.

use hashbrown::HashMap;
use std::sync::Mutex;

const RESERVED: &[(&str, &str)] = &[
    ("[.NET Roots]", "[GC Root]"),
    ("[static vars]", "[Static Fields]"),
    ("[pinned handles]", "[Pinned]"),
    ("[finalizer handles]", "[Finalizer Queue]"),
    ("[strong handles]", "[Strong Handles]"),
    ("[weak handles]", "[Weak References]"),
    ("[other roots]", "[Other Roots]"),
];

/// Formats raw type names for display, resolving namespace ambiguity
/// against the full set of names observed in a snapshot. Constructed once
/// per snapshot from every distinct raw type name.
pub struct TypeNameFormatter {
    final_segment_counts: HashMap<String, usize>,
    cache: Mutex<HashMap<String, String>>,
}

impl std::fmt::Debug for TypeNameFormatter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeNameFormatter")
            .field("final_segment_counts", &self.final_segment_counts)
            .finish_non_exhaustive()
    }
}

impl TypeNameFormatter {
    pub fn new<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        let mut final_segment_counts: HashMap<String, usize> = HashMap::new();
        for name in names {
            let seg = final_segment(strip_generic_suffix(name));
            *final_segment_counts.entry(seg.to_string()).or_insert(0) += 1;
        }
        TypeNameFormatter {
            final_segment_counts,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the display name for `raw`, computing and caching it on
    /// first use.
    pub fn format(&self, raw: &str) -> String {
        if let Some(hit) = self.cache.lock().unwrap().get(raw) {
            return hit.clone();
        }
        let formatted = self.format_uncached(raw);
        self.cache
            .lock()
            .unwrap()
            .insert(raw.to_string(), formatted.clone());
        formatted
    }

    fn format_uncached(&self, raw: &str) -> String {
        if let Some((_, mapped)) = RESERVED.iter().find(|(k, _)| *k == raw) {
            return (*mapped).to_string();
        }

        if let Some(inner) = raw.strip_prefix("[static var ").and_then(|s| s.strip_suffix(']')) {
            return format_static_var(inner);
        }

        self.format_type(raw)
    }

    fn format_type(&self, raw: &str) -> String {
        match split_generic(raw) {
            Some((base, args)) => {
                let formatted_args: Vec<String> =
                    args.iter().map(|a| self.format_type(a)).collect();
                format!("{}<{}>", self.format_namespace(base), formatted_args.join(", "))
            }
            None => self.format_namespace(raw),
        }
    }

    fn format_namespace(&self, name: &str) -> String {
        let seg = final_segment(name);
        if self.final_segment_counts.get(seg).copied().unwrap_or(0) <= 1 {
            return seg.to_string();
        }
        if name.starts_with("System.") {
            return name.to_string();
        }
        last_two_segments(name)
    }
}

fn format_static_var(inner: &str) -> String {
    format!("{} (static)", last_two_segments(inner))
}

fn final_segment(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

fn last_two_segments(name: &str) -> String {
    let segments: Vec<&str> = name.split('.').collect();
    if segments.len() <= 2 {
        name.to_string()
    } else {
        segments[segments.len() - 2..].join(".")
    }
}

/// Splits `Base<Arg1, Arg2>` into `("Base", ["Arg1", "Arg2"])`, respecting
/// nested angle brackets when splitting the argument list on commas.
/// Returns `None` if `name` has no top-level generic parameter list.
fn split_generic(name: &str) -> Option<(&str, Vec<&str>)> {
    let open = name.find('<')?;
    let mut depth = 0usize;
    let mut close = None;
    for (i, c) in name.char_indices().skip(open) {
        match c {
            '<' => depth += 1,
            '>' => {
                depth -= 1;
                if depth == 0 {
                    close = Some(i);
                    break;
                }
            }
            _ => {}
        }
    }
    let close = close?;
    let base = &name[..open];
    let inner = &name[open + 1..close];
    Some((base, split_top_level_commas(inner)))
}

fn split_top_level_commas(inner: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for (i, c) in inner.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(inner[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(inner[start..].trim());
    parts
}

/// Strips a trailing `<...>` generic parameter list, used only to compute
/// the ambiguity-resolution final-segment count (generics don't affect a
/// type's own namespace segment).
fn strip_generic_suffix(name: &str) -> &str {
    match name.find('<') {
        Some(idx) => &name[..idx],
        None => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_names_map_to_fixed_strings() {
        let fmt = TypeNameFormatter::new(["[.NET Roots]"]);
        assert_eq!(fmt.format("[.NET Roots]"), "[GC Root]");
    }

    #[test]
    fn static_var_renders_last_two_segments() {
        let fmt = TypeNameFormatter::new(["[static var MyApp.Config.Flag]"]);
        assert_eq!(fmt.format("[static var MyApp.Config.Flag]"), "Config.Flag (static)");
    }

    #[test]
    fn unique_final_segment_strips_namespace() {
        let fmt = TypeNameFormatter::new(["MyApp.Widgets.Gadget", "MyApp.Other.Thing"]);
        assert_eq!(fmt.format("MyApp.Widgets.Gadget"), "Gadget");
    }

    #[test]
    fn ambiguous_final_segment_keeps_two_segments() {
        let fmt = TypeNameFormatter::new(["MyApp.Widgets.Item", "MyApp.Other.Item"]);
        assert_eq!(fmt.format("MyApp.Widgets.Item"), "Widgets.Item");
        assert_eq!(fmt.format("MyApp.Other.Item"), "Other.Item");
    }

    #[test]
    fn system_namespace_kept_in_full_when_ambiguous() {
        let fmt = TypeNameFormatter::new(["System.Collections.Item", "MyApp.Other.Item"]);
        assert_eq!(fmt.format("System.Collections.Item"), "System.Collections.Item");
    }

    #[test]
    fn generic_parameters_formatted_recursively() {
        let fmt = TypeNameFormatter::new([
            "MyApp.Widgets.List",
            "MyApp.Widgets.Item",
            "MyApp.Other.Item",
        ]);
        assert_eq!(fmt.format("MyApp.Widgets.List<MyApp.Other.Item>"), "List<Other.Item>");
    }

    #[test]
    fn format_is_cached() {
        let fmt = TypeNameFormatter::new(["MyApp.Widgets.Gadget"]);
        let first = fmt.format("MyApp.Widgets.Gadget");
        let second = fmt.format("MyApp.Widgets.Gadget");
        assert_eq!(first, second);
    }
}
