//! SVG card rendering
//!
//! Fills the two embedded card templates from a finalized [`Summary`] and
//! writes them to the output directory. Substitution is plain token
//! replacement on `{{ name }}`-style markers.

mod format;

pub use format::{add_unit, format_name};

use crate::Result;
use crate::stats::{Summary, group_digits};
use format::{TXT_SPACER_MAX_LEN, trim_percent};
use ohno::IntoAppError;
use std::fs;
use std::path::Path;

const LOG_TARGET: &str = "    render";

const OVERVIEW_TEMPLATE: &str = include_str!("templates/overview.svg");
const LANGUAGES_TEMPLATE: &str = include_str!("templates/languages.svg");

const OVERVIEW_FILE_NAME: &str = "overview.svg";
const LANGUAGES_FILE_NAME: &str = "languages.svg";

/// Milliseconds between successive language list items fading in
const DELAY_BETWEEN_MS: usize = 150;

/// Fallback swatch for languages without an upstream color
const DEFAULT_LANGUAGE_COLOR: &str = "#000000";

/// Render the overview card into `output_dir`.
pub fn generate_overview(summary: &Summary, user_name: &str, output_dir: &Path) -> Result<()> {
    let name = format_name(&summary.name, user_name);

    let forks = fit_count(summary.forks);
    let stars = fit_count(summary.stargazers);
    let spacer = " ".repeat((TXT_SPACER_MAX_LEN + 1).saturating_sub(forks.len()).max(1));
    let forks_and_stars = format!("{forks}{spacer}|   {stars}");

    let avg_percent = format!("{} [{}]", summary.avg_contribution_percent, summary.avg_contribution_percent_weighted);

    let repos = fit_count(summary.repo_count as u64);
    #[expect(clippy::cast_precision_loss, reason = "repository counts fit comfortably in f64")]
    let collab_share = if summary.repo_count == 0 {
        0.0
    } else {
        summary.collab_repo_count as f64 / summary.repo_count as f64 * 100.0
    };
    let repos_str = format!("{repos} [{}]", trim_percent(collab_share));

    let output = OVERVIEW_TEMPLATE
        .replace("{{ name }}", &name)
        .replace("{{ views }}", &group_digits(summary.views))
        .replace("{{ views_from_date }}", &format!("Repo views (as of {})", summary.views_from_date))
        .replace("{{ forks_and_stars }}", &forks_and_stars)
        .replace("{{ contributions }}", &group_digits(summary.total_contributions))
        .replace("{{ lines_changed }}", &group_digits(summary.lines_added + summary.lines_deleted))
        .replace("{{ avg_contribution_percent }}", &avg_percent)
        .replace("{{ repos_str }}", &repos_str)
        .replace("{{ collaborators_and_contributors }}", &group_digits(summary.collaborators));

    write_card(output_dir, OVERVIEW_FILE_NAME, &output)
}

/// Render the language breakdown card into `output_dir`.
pub fn generate_languages(summary: &Summary, output_dir: &Path) -> Result<()> {
    let sorted = summary.languages.by_size_desc();

    let mut lang_count = sorted.len().to_string();
    if summary.excluded_language_count > 0 {
        lang_count.push_str(&format!(" [+{}]", summary.excluded_language_count));
    }

    let mut progress = String::new();
    let mut lang_list = String::new();

    for (i, (lang, entry)) in sorted.iter().enumerate() {
        let color = entry.color.as_deref().unwrap_or(DEFAULT_LANGUAGE_COLOR);

        progress.push_str(&format!(
            r#"<span style="background-color: {color};width: {:0.5}%;" class="progress-item"></span>"#,
            entry.proportion
        ));

        lang_list.push_str(&format!(
            r#"
            <li style="animation-delay: {delay}ms;">
                <svg xmlns="http://www.w3.org/2000/svg" class="octicon" style="fill:{color};" viewBox="0 0 16 16" version="1.1" width="16" height="16">
                    <path fill-rule="evenodd" d="M8 4a4 4 0 100 8 4 4 0 000-8z"></path>
                </svg>
                <span class="lang">{lang}</span>
                <span class="percent">{:0.2}%</span>
            </li>"#,
            entry.proportion,
            delay = i * DELAY_BETWEEN_MS,
        ));
    }

    let output = LANGUAGES_TEMPLATE
        .replace("{{ lang_count }}", &lang_count)
        .replace("{{ progress }}", &progress)
        .replace("{{ lang_list }}", &lang_list);

    write_card(output_dir, LANGUAGES_FILE_NAME, &output)
}

/// Format a count for a fixed-width card column, shortening when needed.
fn fit_count(n: u64) -> String {
    let grouped = group_digits(n);
    if grouped.len() < TXT_SPACER_MAX_LEN { grouped } else { add_unit(n) }
}

fn write_card(output_dir: &Path, file_name: &str, contents: &str) -> Result<()> {
    fs::create_dir_all(output_dir).into_app_err_with(|| format!("creating output directory '{}'", output_dir.display()))?;

    let path = output_dir.join(file_name);
    fs::write(&path, contents).into_app_err_with(|| format!("writing card '{}'", path.display()))?;
    log::info!(target: LOG_TARGET, "Wrote {}", path.display());

    Ok(())
}
