//! Language accumulation and proportional shares

use std::collections::BTreeMap;

/// Accumulated data for one language
#[derive(Debug, Clone, Default)]
pub struct LanguageEntry {
    /// Cumulative size in bytes across all contributing repositories
    pub size: u64,
    /// Number of repositories contributing to this language
    pub occurrences: u64,
    /// Display color, from the first repository that carried one
    pub color: Option<String>,
    /// Share of the total size, 0-100; zero until [`LanguageTable::finalize`]
    pub proportion: f64,
}

/// Mutable accumulator mapping language name to size/occurrence/color.
///
/// Sizes and occurrence counts grow monotonically during collection;
/// proportional shares are computed once, after collection completes.
#[derive(Debug, Default)]
pub struct LanguageTable {
    entries: BTreeMap<String, LanguageEntry>,
    finalized: bool,
}

impl LanguageTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a language observation. Callers must have applied the language
    /// policy already; everything recorded here counts.
    pub fn record(&mut self, name: &str, size: u64, color: Option<&str>) {
        debug_assert!(!self.finalized, "record called after finalize");

        if let Some(entry) = self.entries.get_mut(name) {
            entry.size += size;
            entry.occurrences += 1;
            if entry.color.is_none() {
                entry.color = color.map(str::to_string);
            }
        } else {
            let _ = self.entries.insert(
                name.to_string(),
                LanguageEntry {
                    size,
                    occurrences: 1,
                    color: color.map(str::to_string),
                    proportion: 0.0,
                },
            );
        }
    }

    /// Compute each entry's share of the total size. Call exactly once, after
    /// all collection completes. With a zero total the table stays at zero
    /// proportions.
    #[expect(clippy::cast_precision_loss, reason = "language sizes fit comfortably in f64")]
    pub fn finalize(&mut self) {
        debug_assert!(!self.finalized, "finalize called twice");
        self.finalized = true;

        let total: u64 = self.entries.values().map(|e| e.size).sum();
        if total == 0 {
            return;
        }

        for entry in self.entries.values_mut() {
            entry.proportion = 100.0 * entry.size as f64 / total as f64;
        }
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries in name order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &LanguageEntry)> {
        self.entries.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    /// All entries, largest first.
    #[must_use]
    pub fn by_size_desc(&self) -> Vec<(&str, &LanguageEntry)> {
        let mut sorted: Vec<_> = self.entries().collect();
        sorted.sort_by(|a, b| b.1.size.cmp(&a.1.size).then_with(|| a.0.cmp(b.0)));
        sorted
    }
}

/// Display color for languages ingested through the REST path, which carries
/// no color information.
#[must_use]
pub fn default_color(name: &str) -> Option<&'static str> {
    const COLORS: &[(&str, &str)] = &[
        ("Assembly", "#6E4C13"),
        ("C", "#555555"),
        ("C#", "#178600"),
        ("C++", "#f34b7d"),
        ("CSS", "#563d7c"),
        ("Clojure", "#db5855"),
        ("CoffeeScript", "#244776"),
        ("Dart", "#00B4AB"),
        ("Dockerfile", "#384d54"),
        ("Elixir", "#6e4a7e"),
        ("Emacs Lisp", "#c065db"),
        ("Erlang", "#B83998"),
        ("Go", "#00ADD8"),
        ("HCL", "#844FBA"),
        ("HTML", "#e34c26"),
        ("Haskell", "#5e5086"),
        ("Java", "#b07219"),
        ("JavaScript", "#f1e05a"),
        ("Julia", "#a270ba"),
        ("Jupyter Notebook", "#DA5B0B"),
        ("Kotlin", "#A97BFF"),
        ("Lua", "#000080"),
        ("MATLAB", "#e16737"),
        ("Makefile", "#427819"),
        ("Nix", "#7e7eff"),
        ("OCaml", "#ef7a08"),
        ("Objective-C", "#438eff"),
        ("PHP", "#4F5D95"),
        ("Perl", "#0298c3"),
        ("PowerShell", "#012456"),
        ("Python", "#3572A5"),
        ("R", "#198CE7"),
        ("Ruby", "#701516"),
        ("Rust", "#dea584"),
        ("SCSS", "#c6538c"),
        ("Scala", "#c22d40"),
        ("Shell", "#89e051"),
        ("Swift", "#F05138"),
        ("TeX", "#3D6117"),
        ("TypeScript", "#3178c6"),
        ("Vim Script", "#199f4b"),
        ("Vue", "#41b883"),
        ("Zig", "#ec915c"),
    ];

    COLORS.iter().find(|(n, _)| *n == name).map(|(_, c)| *c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_new_language() {
        let mut table = LanguageTable::new();
        table.record("Rust", 100, Some("#dea584"));

        let (name, entry) = table.entries().next().unwrap();
        assert_eq!(name, "Rust");
        assert_eq!(entry.size, 100);
        assert_eq!(entry.occurrences, 1);
        assert_eq!(entry.color.as_deref(), Some("#dea584"));
    }

    #[test]
    fn test_record_accumulates() {
        let mut table = LanguageTable::new();
        table.record("Rust", 100, Some("#dea584"));
        table.record("Rust", 50, None);

        let (_, entry) = table.entries().next().unwrap();
        assert_eq!(entry.size, 150);
        assert_eq!(entry.occurrences, 2);
        assert_eq!(entry.color.as_deref(), Some("#dea584"));
    }

    #[test]
    fn test_record_backfills_missing_color() {
        let mut table = LanguageTable::new();
        table.record("Rust", 100, None);
        table.record("Rust", 50, Some("#dea584"));

        let (_, entry) = table.entries().next().unwrap();
        assert_eq!(entry.color.as_deref(), Some("#dea584"));
    }

    #[test]
    fn test_proportions_sum_to_100() {
        let mut table = LanguageTable::new();
        table.record("Rust", 700, None);
        table.record("Python", 200, None);
        table.record("Shell", 100, None);
        table.finalize();

        let total: f64 = table.entries().map(|(_, e)| e.proportion).sum();
        assert!((total - 100.0).abs() < 1e-9);

        let (_, python) = table.entries().next().unwrap();
        assert!((python.proportion - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_finalize_with_zero_total() {
        let mut table = LanguageTable::new();
        table.record("Rust", 0, None);
        table.finalize();

        let (_, entry) = table.entries().next().unwrap();
        assert!(entry.proportion.abs() < f64::EPSILON);
    }

    #[test]
    fn test_finalize_empty_table() {
        let mut table = LanguageTable::new();
        table.finalize();
        assert!(table.is_empty());
    }

    #[test]
    fn test_by_size_desc_ordering() {
        let mut table = LanguageTable::new();
        table.record("Python", 200, None);
        table.record("Rust", 700, None);
        table.record("Shell", 100, None);

        let names: Vec<_> = table.by_size_desc().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["Rust", "Python", "Shell"]);
    }

    #[test]
    fn test_default_color_known_and_unknown() {
        assert_eq!(default_color("Rust"), Some("#dea584"));
        assert!(default_color("Brainfuck").is_none());
    }
}
