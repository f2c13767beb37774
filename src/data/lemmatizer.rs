// ============================================================
// Layer 4 - Noun Lemmatizer
// ============================================================
// Reduces plural nouns to their dictionary form, the way a
// WordNet lemmatizer does when called without a part-of-speech
// tag (which means "treat it as a noun"). Verbs and adjectives
// pass through unchanged: "loved" stays "loved".
//
// There is no dictionary to validate candidates against, so the
// WordNet detachment rules are applied in a fixed order and the
// cases where a rule would produce a non-word are listed:
//
//   1. irregular plurals    children -> child, knives -> knife
//   2. invariant words      news, series, always, ...
//   3. words that cannot be plural here: three chars or fewer,
//      no trailing 's', or ending in ss / us / is
//   4. suffix rules, longest first
//        sses -> ss    glasses   -> glass
//        zzes -> zz    buzzes    -> buzz
//        shes -> sh    dishes    -> dish
//        eaches/oaches -> drop es   beaches -> beach
//        aches -> ache headaches -> headache
//        ches -> ch    watches   -> watch
//        xes  -> x     boxes     -> box
//        ies  -> y     batteries -> battery
//        s    -> ""    products  -> product
//
// Reference: Miller (1995) WordNet, morphy() noun rules
//            Porter (1980) suffix stripping

use std::collections::{HashMap, HashSet};

const IRREGULAR_NOUNS: &[(&str, &str)] = &[
    ("children", "child"),
    ("men", "man"),
    ("women", "woman"),
    ("feet", "foot"),
    ("teeth", "tooth"),
    ("geese", "goose"),
    ("mice", "mouse"),
    ("oxen", "ox"),
    ("knives", "knife"),
    ("wives", "wife"),
    ("lives", "life"),
    ("leaves", "leaf"),
    ("halves", "half"),
    ("shelves", "shelf"),
    ("wolves", "wolf"),
    ("thieves", "thief"),
    ("selves", "self"),
    ("loaves", "loaf"),
    ("calves", "calf"),
    ("tomatoes", "tomato"),
    ("potatoes", "potato"),
    ("heroes", "hero"),
    ("echoes", "echo"),
    ("movies", "movie"),
    ("cookies", "cookie"),
    ("calories", "calorie"),
    ("hoodies", "hoodie"),
    ("selfies", "selfie"),
    ("brownies", "brownie"),
    ("smoothies", "smoothie"),
    ("goodies", "goodie"),
    ("freebies", "freebie"),
    ("rookies", "rookie"),
    ("zombies", "zombie"),
    ("quizzes", "quiz"),
];

const INVARIANT: &[&str] = &[
    "news", "series", "species", "yes", "lens", "gas", "bias", "alias", "canvas",
    "atlas", "always", "sometimes", "perhaps", "besides", "towards", "afterwards",
    "nowadays", "whereas", "anyways", "headquarters", "thanks", "pants", "jeans",
    "scissors", "electronics", "physics", "mathematics", "economics",
];

/// (suffix, replacement, minimum length of what remains before the suffix)
const SUFFIX_RULES: &[(&str, &str, usize)] = &[
    ("sses", "ss", 1),
    ("zzes", "zz", 1),
    ("shes", "sh", 1),
    ("eaches", "each", 1),
    ("oaches", "oach", 1),
    ("aches", "ache", 1),
    ("ches", "ch", 2),
    ("xes", "x", 1),
    ("ies", "y", 2),
    ("s", "", 2),
];

pub struct Lemmatizer {
    irregular: HashMap<&'static str, &'static str>,
    invariant: HashSet<&'static str>,
}

impl Lemmatizer {
    pub fn new() -> Self {
        Self {
            irregular: IRREGULAR_NOUNS.iter().copied().collect(),
            invariant: INVARIANT.iter().copied().collect(),
        }
    }

    /// Return the base noun form of a lowercase token.
    pub fn lemmatize(&self, word: &str) -> String {
        if let Some(base) = self.irregular.get(word) {
            return (*base).to_string();
        }

        if self.invariant.contains(word)
            || word.len() <= 3
            || !word.ends_with('s')
            || word.ends_with("ss")
            || word.ends_with("us")
            || word.ends_with("is")
        {
            return word.to_string();
        }

        for (suffix, replacement, min_stem) in SUFFIX_RULES {
            if let Some(stem) = word.strip_suffix(suffix) {
                if stem.len() >= *min_stem {
                    return format!("{stem}{replacement}");
                }
            }
        }

        word.to_string()
    }
}

impl Default for Lemmatizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lemma(w: &str) -> String {
        Lemmatizer::new().lemmatize(w)
    }

    #[test]
    fn test_regular_plurals() {
        assert_eq!(lemma("products"), "product");
        assert_eq!(lemma("batteries"), "battery");
        assert_eq!(lemma("boxes"), "box");
        assert_eq!(lemma("watches"), "watch");
        assert_eq!(lemma("dishes"), "dish");
        assert_eq!(lemma("glasses"), "glass");
        assert_eq!(lemma("cases"), "case");
        assert_eq!(lemma("sizes"), "size");
    }

    #[test]
    fn test_ache_and_each_endings() {
        assert_eq!(lemma("headaches"), "headache");
        assert_eq!(lemma("beaches"), "beach");
        assert_eq!(lemma("coaches"), "coach");
    }

    #[test]
    fn test_short_ies_stems_drop_only_s() {
        assert_eq!(lemma("ties"), "tie");
        assert_eq!(lemma("pies"), "pie");
        assert_eq!(lemma("flies"), "fly");
    }

    #[test]
    fn test_irregular_plurals() {
        assert_eq!(lemma("children"), "child");
        assert_eq!(lemma("knives"), "knife");
        assert_eq!(lemma("movies"), "movie");
    }

    #[test]
    fn test_words_left_alone() {
        for w in ["news", "always", "glass", "status", "analysis", "bus", "loved", "great", "123", "90s"] {
            assert_eq!(lemma(w), w, "{w} should be unchanged");
        }
    }
}
