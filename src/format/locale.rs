use crate::error::FormatError;

const NBSP: char = '\u{a0}';
const NNBSP: char = '\u{202f}';

/// How a locale attaches the percent sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PercentPattern {
    /// `25%`
    Attached,
    /// `25 %` with the given separator.
    Spaced(char),
}

/// Where a locale places the currency symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurrencyPattern {
    /// `-$1,234`
    Prefix,
    /// `€ -1.234`
    PrefixSpaced,
    /// `-1.234 €`
    Suffix,
}

/// Separators and patterns for one locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberLocale {
    pub id: &'static str,
    pub decimal_separator: char,
    pub group_separator: char,
    /// Integer digits required before grouping kicks in is this plus 3.
    pub min_grouping_digits: usize,
    pub percent: PercentPattern,
    pub currency: CurrencyPattern,
    /// Compact notation tiers as (power of ten, suffix), ascending.
    pub compact: &'static [(i32, &'static str)],
}

const EN_COMPACT: &[(i32, &str)] = &[(3, "K"), (6, "M"), (9, "B"), (12, "T")];
const DE_COMPACT: &[(i32, &str)] = &[(6, "\u{a0}Mio."), (9, "\u{a0}Mrd."), (12, "\u{a0}Bio.")];
const FR_COMPACT: &[(i32, &str)] = &[
    (3, "\u{a0}k"),
    (6, "\u{a0}M"),
    (9, "\u{a0}Md"),
    (12, "\u{a0}Bn"),
];
const ES_COMPACT: &[(i32, &str)] = &[
    (3, "\u{a0}mil"),
    (6, "\u{a0}M"),
    (9, "\u{a0}mil\u{a0}M"),
    (12, "\u{a0}B"),
];
const IT_COMPACT: &[(i32, &str)] = &[(6, "\u{a0}Mln"), (9, "\u{a0}Mrd"), (12, "\u{a0}Bln")];
const NL_COMPACT: &[(i32, &str)] = &[
    (3, "K"),
    (6, "\u{a0}mln."),
    (9, "\u{a0}mld."),
    (12, "\u{a0}bln."),
];
const PT_COMPACT: &[(i32, &str)] = &[
    (3, "\u{a0}mil"),
    (6, "\u{a0}mi"),
    (9, "\u{a0}bi"),
    (12, "\u{a0}tri"),
];
const RU_COMPACT: &[(i32, &str)] = &[
    (3, "\u{a0}тыс."),
    (6, "\u{a0}млн"),
    (9, "\u{a0}млрд"),
    (12, "\u{a0}трлн"),
];

pub static EN_US: NumberLocale = NumberLocale {
    id: "en-US",
    decimal_separator: '.',
    group_separator: ',',
    min_grouping_digits: 1,
    percent: PercentPattern::Attached,
    currency: CurrencyPattern::Prefix,
    compact: EN_COMPACT,
};

/// British English uses the same separators as `en-US`.
pub static EN_GB: NumberLocale = NumberLocale {
    id: "en-GB",
    decimal_separator: '.',
    group_separator: ',',
    min_grouping_digits: 1,
    percent: PercentPattern::Attached,
    currency: CurrencyPattern::Prefix,
    compact: EN_COMPACT,
};

pub static DE_DE: NumberLocale = NumberLocale {
    id: "de-DE",
    decimal_separator: ',',
    group_separator: '.',
    min_grouping_digits: 1,
    percent: PercentPattern::Spaced(NBSP),
    currency: CurrencyPattern::Suffix,
    compact: DE_COMPACT,
};

/// Swiss German (`'` style grouping, `.` decimal).
pub static DE_CH: NumberLocale = NumberLocale {
    id: "de-CH",
    decimal_separator: '.',
    group_separator: '\u{2019}',
    min_grouping_digits: 1,
    percent: PercentPattern::Attached,
    currency: CurrencyPattern::PrefixSpaced,
    compact: DE_COMPACT,
};

/// French (France). Grouping and percent spacing use U+202F NARROW NO-BREAK SPACE.
pub static FR_FR: NumberLocale = NumberLocale {
    id: "fr-FR",
    decimal_separator: ',',
    group_separator: NNBSP,
    min_grouping_digits: 1,
    percent: PercentPattern::Spaced(NNBSP),
    currency: CurrencyPattern::Suffix,
    compact: FR_COMPACT,
};

/// Spanish (Spain) only groups from five integer digits: `1234` but `12.345`.
pub static ES_ES: NumberLocale = NumberLocale {
    id: "es-ES",
    decimal_separator: ',',
    group_separator: '.',
    min_grouping_digits: 2,
    percent: PercentPattern::Spaced(NBSP),
    currency: CurrencyPattern::Suffix,
    compact: ES_COMPACT,
};

/// Spanish (Mexico) commonly uses `.` for decimals and `,` for thousands grouping.
pub static ES_MX: NumberLocale = NumberLocale {
    id: "es-MX",
    decimal_separator: '.',
    group_separator: ',',
    min_grouping_digits: 1,
    percent: PercentPattern::Spaced(NBSP),
    currency: CurrencyPattern::Prefix,
    compact: ES_COMPACT,
};

pub static IT_IT: NumberLocale = NumberLocale {
    id: "it-IT",
    decimal_separator: ',',
    group_separator: '.',
    min_grouping_digits: 1,
    percent: PercentPattern::Attached,
    currency: CurrencyPattern::Suffix,
    compact: IT_COMPACT,
};

pub static NL_NL: NumberLocale = NumberLocale {
    id: "nl-NL",
    decimal_separator: ',',
    group_separator: '.',
    min_grouping_digits: 1,
    percent: PercentPattern::Attached,
    currency: CurrencyPattern::PrefixSpaced,
    compact: NL_COMPACT,
};

pub static PT_BR: NumberLocale = NumberLocale {
    id: "pt-BR",
    decimal_separator: ',',
    group_separator: '.',
    min_grouping_digits: 1,
    percent: PercentPattern::Attached,
    currency: CurrencyPattern::PrefixSpaced,
    compact: PT_COMPACT,
};

pub static RU_RU: NumberLocale = NumberLocale {
    id: "ru-RU",
    decimal_separator: ',',
    group_separator: NBSP,
    min_grouping_digits: 1,
    percent: PercentPattern::Spaced(NBSP),
    currency: CurrencyPattern::Suffix,
    compact: RU_COMPACT,
};

fn normalize_locale_id(id: &str) -> Option<&'static str> {
    let mut key = id.trim().replace('_', "-").to_ascii_lowercase();

    // POSIX tags like `en_US.UTF-8` or `de_DE@euro`.
    if let Some(idx) = key.find('.') {
        key.truncate(idx);
    }
    if let Some(idx) = key.find('@') {
        key.truncate(idx);
    }
    // BCP-47 extensions (`en-US-u-nu-latn`, `fr-FR-x-private`).
    if let Some(idx) = key.find("-u-") {
        key.truncate(idx);
    }
    if let Some(idx) = key.find("-x-") {
        key.truncate(idx);
    }

    match key.as_str() {
        "en-us" | "en" => Some("en-US"),
        "en-gb" | "en-uk" => Some("en-GB"),
        "de-de" | "de" => Some("de-DE"),
        "de-ch" => Some("de-CH"),
        "fr-fr" | "fr" => Some("fr-FR"),
        "es-es" | "es" => Some("es-ES"),
        "es-mx" => Some("es-MX"),
        "it-it" | "it" => Some("it-IT"),
        "nl-nl" | "nl" => Some("nl-NL"),
        "pt-br" | "pt" => Some("pt-BR"),
        "ru-ru" | "ru" => Some("ru-RU"),
        // POSIX "C" locale.
        "c" | "posix" => Some("en-US"),
        _ => {
            // Region variants we don't list (`fr-CA`, `de-AT`, `en-AU`, ...).
            match key.split('-').next().unwrap_or("") {
                "en" => Some("en-US"),
                "de" => Some("de-DE"),
                "fr" => Some("fr-FR"),
                "es" => Some("es-ES"),
                "it" => Some("it-IT"),
                "nl" => Some("nl-NL"),
                "pt" => Some("pt-BR"),
                "ru" => Some("ru-RU"),
                _ => None,
            }
        }
    }
}

pub fn get_locale(id: &str) -> Option<&'static NumberLocale> {
    match normalize_locale_id(id)? {
        "en-US" => Some(&EN_US),
        "en-GB" => Some(&EN_GB),
        "de-DE" => Some(&DE_DE),
        "de-CH" => Some(&DE_CH),
        "fr-FR" => Some(&FR_FR),
        "es-ES" => Some(&ES_ES),
        "es-MX" => Some(&ES_MX),
        "it-IT" => Some(&IT_IT),
        "nl-NL" => Some(&NL_NL),
        "pt-BR" => Some(&PT_BR),
        "ru-RU" => Some(&RU_RU),
        _ => None,
    }
}

/// Whether `tag` looks like a locale identifier at all.
fn is_well_formed(tag: &str) -> bool {
    let tag = tag.trim();
    !tag.is_empty()
        && tag.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '@'))
        && tag.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
}

/// Resolve a locale tag for formatting.
///
/// Malformed tags are an error. Well-formed tags outside the registry fall
/// back to `en-US`.
pub fn resolve_locale(tag: &str) -> Result<&'static NumberLocale, FormatError> {
    if !is_well_formed(tag) {
        return Err(FormatError::InvalidLocale(tag.to_string()));
    }
    Ok(get_locale(tag).unwrap_or_else(|| {
        log::warn!("locale '{tag}' is not supported, formatting with en-US");
        &EN_US
    }))
}

/// Lower-cased primary language subtag (`"fr-CA"` → `"fr"`).
pub fn language(tag: &str) -> String {
    tag.trim()
        .split(['-', '_'])
        .next()
        .unwrap_or("")
        .to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_locale_ids() {
        assert_eq!(normalize_locale_id("en-us"), Some("en-US"));
        assert_eq!(normalize_locale_id("en_US.UTF-8"), Some("en-US"));
        assert_eq!(normalize_locale_id("en_uk"), Some("en-GB"));
        assert_eq!(normalize_locale_id("en-AU"), Some("en-US"));
        assert_eq!(normalize_locale_id("de_DE@euro"), Some("de-DE"));
        assert_eq!(normalize_locale_id("de-AT"), Some("de-DE"));
        assert_eq!(normalize_locale_id("fr-CA"), Some("fr-FR"));
        assert_eq!(normalize_locale_id("fr-FR-u-nu-latn"), Some("fr-FR"));
        assert_eq!(normalize_locale_id("pt"), Some("pt-BR"));
        assert_eq!(normalize_locale_id("C"), Some("en-US"));
        assert_eq!(normalize_locale_id("ja-JP"), None);
        assert_eq!(normalize_locale_id(""), None);
    }

    #[test]
    fn unsupported_but_valid_tags_fall_back_to_english() {
        assert_eq!(resolve_locale("ja-JP").unwrap().id, "en-US");
        assert_eq!(resolve_locale("fr").unwrap().id, "fr-FR");
    }

    #[test]
    fn malformed_tags_are_rejected() {
        assert_eq!(
            resolve_locale("not a locale"),
            Err(FormatError::InvalidLocale("not a locale".into()))
        );
        assert!(resolve_locale("").is_err());
        assert!(resolve_locale("42").is_err());
    }

    #[test]
    fn language_subtag() {
        assert_eq!(language("fr-CA"), "fr");
        assert_eq!(language("EN_us"), "en");
        assert_eq!(language("de"), "de");
    }
}
