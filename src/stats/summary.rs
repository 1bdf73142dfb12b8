//! The finalized statistics summary

use super::languages::LanguageTable;
use chrono::NaiveDate;
use core::fmt::{Display, Formatter};

/// Everything one aggregation pass produces, ready for rendering.
#[derive(Debug)]
pub struct Summary {
    pub name: String,
    pub stargazers: u64,
    pub forks: u64,
    pub total_contributions: u64,
    pub repo_count: usize,
    /// Repositories worked on with at least one other person
    pub collab_repo_count: usize,
    pub lines_added: u64,
    pub lines_deleted: u64,
    /// Formatted percentage, possibly "N/A"
    pub avg_contribution_percent: String,
    /// Formatted percentage, possibly "N/A"
    pub avg_contribution_percent_weighted: String,
    pub views: u64,
    pub views_from_date: NaiveDate,
    pub collaborators: u64,
    pub contributors: u64,
    /// Distinct pull requests the user is involved in; persisted, not shown
    /// on the overview card
    pub pull_requests: u64,
    /// Distinct issues the user is involved in; persisted, not shown on the
    /// overview card
    pub issues: u64,
    pub languages: LanguageTable,
    /// Languages kept out of the table by policy
    pub excluded_language_count: usize,
}

impl Display for Summary {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        writeln!(f, "GitHub Repository Statistics:")?;
        writeln!(f, "  Name: {}", self.name)?;
        writeln!(f, "  Stargazers: {}", group_digits(self.stargazers))?;
        writeln!(f, "  Forks: {}", group_digits(self.forks))?;
        writeln!(f, "  All-time contributions: {}", group_digits(self.total_contributions))?;
        writeln!(f, "  Repositories with contributions: {}", group_digits(self.repo_count as u64))?;
        writeln!(
            f,
            "  Repositories in collaboration with at least one other user: {}",
            group_digits(self.collab_repo_count as u64)
        )?;
        writeln!(f, "  Lines of code added: {}", group_digits(self.lines_added))?;
        writeln!(f, "  Lines of code deleted: {}", group_digits(self.lines_deleted))?;
        writeln!(f, "  Total lines of code changed: {}", group_digits(self.lines_added + self.lines_deleted))?;
        writeln!(f, "  Avg. % of contributions (per collab repo): {}", self.avg_contribution_percent)?;
        writeln!(
            f,
            "  Avg. % of contributions (per collab repo) weighted by number of contributors (max 100): {}",
            self.avg_contribution_percent_weighted
        )?;
        writeln!(f, "  Project page views: {}", group_digits(self.views))?;
        writeln!(f, "  Project page views from date: {}", self.views_from_date)?;
        writeln!(f, "  Project repository collaborators: {}", group_digits(self.collaborators))?;
        writeln!(f, "  Project repository contributors: {}", group_digits(self.contributors))?;
        writeln!(
            f,
            "  Total number of languages: {} (+{})",
            self.languages.len(),
            group_digits(self.excluded_language_count as u64)
        )?;
        writeln!(f, "  Languages:")?;

        for (name, entry) in self.languages.by_size_desc() {
            writeln!(f, "    - {name}: {:0.4}%", entry.proportion)?;
        }

        Ok(())
    }
}

/// Format a count with thousands separators: 1234567 becomes `1,234,567`.
#[must_use]
pub fn group_digits(n: u64) -> String {
    let digits = n.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    grouped
}
