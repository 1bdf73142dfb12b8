//! Text fitting helpers for the SVG cards

/// Maximum length the name line of the overview card can hold
pub const MAX_NAME_LEN: usize = 18;

/// Column width reserved for a number before it gets a metric suffix
pub const TXT_SPACER_MAX_LEN: usize = 7;

/// Shorten a large count with a metric suffix: 12,456 becomes `12.45K`.
/// Numbers below 10,000 are left alone.
#[expect(clippy::cast_precision_loss, reason = "display-only rounding")]
#[must_use]
pub fn add_unit(num: u64) -> String {
    const METRIC_UNITS: [&str; 4] = ["K", "M", "B", "T"];

    if num < 10_000 {
        return num.to_string();
    }

    let mut value = num as f64;
    let mut unit_index = 0;
    while value >= 1000.0 {
        value /= 1000.0;
        unit_index += 1;
    }

    let mut digits = format!("{value:.6}");
    digits.truncate(TXT_SPACER_MAX_LEN - 2);
    if digits.ends_with('.') {
        let _ = digits.pop();
    }

    format!("{digits}{}", METRIC_UNITS[unit_index - 1])
}

/// Append a possessive suffix: `Linus` becomes `Linus'`, `Ada` becomes `Ada's`.
fn possessive(name: &str) -> String {
    let suffix = if name.chars().last().is_some_and(|c| c.eq_ignore_ascii_case(&'s')) {
        "'"
    } else {
        "'s"
    };
    format!("{name}{suffix}")
}

/// Fit a display name onto the overview card.
///
/// Preference order: the full name, forename initials with the full surname,
/// the login, and finally an initial-heavy abbreviation, whichever first fits
/// the card width.
#[must_use]
pub fn format_name(name: &str, user_name: &str) -> String {
    let name = if name.is_empty() { user_name } else { name };
    if name.is_empty() {
        return "GitHub".to_string();
    }

    let full = possessive(name);
    if full.len() <= MAX_NAME_LEN {
        return full;
    }

    let words: Vec<&str> = name.split(' ').filter(|w| !w.is_empty()).collect();
    let initials_form = words.first().zip(words.last()).map(|(first, last)| {
        let initial = first.chars().next().unwrap_or_default();
        possessive(&format!("{initial}. {last}"))
    });

    if let Some(form) = &initials_form
        && words.len() > 1
        && form.len() <= MAX_NAME_LEN
    {
        return form.clone();
    }

    let login = possessive(user_name);
    if login.len() <= MAX_NAME_LEN {
        return login;
    }

    if words.len() <= 1 {
        // A single over-long word: keep as much of it as fits
        let stem: String = name.chars().take(MAX_NAME_LEN - 4).collect();
        return format!("{stem}..'s");
    }

    // Reduce everything to initials, keeping only as many forenames as fit
    let mut abbreviated = String::new();
    for (i, word) in words[..words.len() - 1].iter().enumerate() {
        if i * 3 > MAX_NAME_LEN - 4 {
            break;
        }
        if let Some(initial) = word.chars().next() {
            abbreviated.push(initial);
            abbreviated.push_str(". ");
        }
    }
    if let Some(initial) = words[words.len() - 1].chars().next() {
        abbreviated.push(initial);
        abbreviated.push_str(".'s");
    }

    abbreviated
}

/// Format a percentage the shortest way: 25.00 becomes `25%`, 33.33 stays.
#[must_use]
pub fn trim_percent(value: f64) -> String {
    let formatted = format!("{value:.2}");
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed}%")
}
