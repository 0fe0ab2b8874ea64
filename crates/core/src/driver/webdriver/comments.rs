//! Short generic comments for the comment step.
//!
//! Output stays within the Basic Multilingual Plane; some drivers reject
//! anything wider when typing.

use rand::seq::SliceRandom;
use rand::Rng;

const POSITIVE_WORDS: [&str; 16] = [
    "Amazing",
    "Great",
    "Awesome",
    "Fantastic",
    "Wonderful",
    "Brilliant",
    "Perfect",
    "Excellent",
    "Beautiful",
    "Incredible",
    "Outstanding",
    "Lovely",
    "Superb",
    "Magnificent",
    "Impressive",
    "Remarkable",
];

const SUBJECTS: [&str; 12] = [
    "post",
    "content",
    "share",
    "photo",
    "update",
    "message",
    "story",
    "moment",
    "picture",
    "thought",
    "idea",
    "perspective",
];

const ENDINGS: [&str; 12] = [
    "!",
    "!!",
    "!!!",
    ".",
    "..",
    "...",
    ":)",
    ":D",
    ";)",
    " - love it!",
    " - so good!",
    " - thanks for sharing!",
];

fn pick<R: Rng + ?Sized>(rng: &mut R, items: &[&'static str]) -> &'static str {
    items.choose(rng).copied().unwrap_or_default()
}

/// Build a random comment such as "Lovely photo :)".
pub(crate) fn random_comment<R: Rng + ?Sized>(rng: &mut R) -> String {
    let word = pick(rng, &POSITIVE_WORDS);
    let subject = pick(rng, &SUBJECTS);
    let ending = pick(rng, &ENDINGS);

    match rng.gen_range(0..9) {
        0 => format!("{} {}{}", word, subject, ending),
        1 => format!("{}{}", word, ending),
        2 => format!("Love this{}", ending),
        3 => format!("Thanks for sharing{}", ending),
        4 => format!("This is {}{}", word.to_lowercase(), ending),
        5 => format!("So {}{}", word.to_lowercase(), ending),
        6 => format!("{} stuff{}", word, ending),
        7 => format!("Really {}!", word.to_lowercase()),
        _ => format!("What a {} {}!", word.to_lowercase(), subject),
    }
}
