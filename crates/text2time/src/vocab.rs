//! The fixed English vocabulary shared by the phrase classifier and the
//! recurrence compiler.
//!
//! Each table lists its entries in ordinal order. The first name of an entry
//! is the full name; the rest are abbreviation aliases. The recurrence
//! compiler relies on table order (not phrase order) when more than one
//! entry matches.

use chrono::Weekday;

/// One vocabulary entry: an ordinal value and the words that name it.
#[derive(Debug, Clone, Copy)]
pub struct Term<T> {
    pub value: T,
    pub names: &'static [&'static str],
}

impl<T> Term<T> {
    /// The full (unabbreviated) name.
    pub fn name(&self) -> &'static str {
        self.names[0]
    }

    fn matches(&self, word: &str) -> bool {
        self.names.contains(&word)
    }
}

/// Weekdays, Sunday first (recurrence ordinal 0..=6).
pub const WEEKDAYS: [Term<Weekday>; 7] = [
    Term { value: Weekday::Sun, names: &["sunday", "sun"] },
    Term { value: Weekday::Mon, names: &["monday", "mon"] },
    Term { value: Weekday::Tue, names: &["tuesday", "tue", "tues"] },
    Term { value: Weekday::Wed, names: &["wednesday", "wed"] },
    Term { value: Weekday::Thu, names: &["thursday", "thu", "thurs"] },
    Term { value: Weekday::Fri, names: &["friday", "fri"] },
    Term { value: Weekday::Sat, names: &["saturday", "sat"] },
];

/// Months, January first (ordinal 1..=12).
pub const MONTHS: [Term<u32>; 12] = [
    Term { value: 1, names: &["january", "jan"] },
    Term { value: 2, names: &["february", "feb"] },
    Term { value: 3, names: &["march", "mar"] },
    Term { value: 4, names: &["april", "apr"] },
    Term { value: 5, names: &["may"] },
    Term { value: 6, names: &["june", "jun"] },
    Term { value: 7, names: &["july", "jul"] },
    Term { value: 8, names: &["august", "aug"] },
    Term { value: 9, names: &["september", "sep", "sept"] },
    Term { value: 10, names: &["october", "oct"] },
    Term { value: 11, names: &["november", "nov"] },
    Term { value: 12, names: &["december", "dec"] },
];

/// Week-of-month ordinals (1..=4).
pub const WEEK_ORDINALS: [Term<u32>; 4] = [
    Term { value: 1, names: &["first", "1st"] },
    Term { value: 2, names: &["second", "2nd"] },
    Term { value: 3, names: &["third", "3rd"] },
    Term { value: 4, names: &["fourth", "4th"] },
];

fn lookup<T: Copy>(table: &[Term<T>], word: &str) -> Option<T> {
    table.iter().find(|term| term.matches(word)).map(|term| term.value)
}

/// Look up a lower-case weekday name or alias.
pub fn weekday(word: &str) -> Option<Weekday> {
    lookup(&WEEKDAYS, word)
}

/// Look up a lower-case month name or alias.
pub fn month(word: &str) -> Option<u32> {
    lookup(&MONTHS, word)
}

/// Look up a lower-case week ordinal ("first", "2nd", ...).
pub fn week_ordinal(word: &str) -> Option<u32> {
    lookup(&WEEK_ORDINALS, word)
}

/// Recurrence-field ordinal of a weekday (Sunday = 0).
pub fn weekday_ordinal(weekday: Weekday) -> u32 {
    weekday.num_days_from_sunday()
}

/// Split free text into lower-case alphabetic words.
pub(crate) fn words(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !c.is_ascii_alphabetic())
        .filter(|word| !word.is_empty())
}

/// Whether `word` names `term`, tolerating a plural "s" ("mondays").
pub(crate) fn names_term<T>(term: &Term<T>, word: &str) -> bool {
    term.matches(word) || word.strip_suffix('s').is_some_and(|stem| term.matches(stem))
}
