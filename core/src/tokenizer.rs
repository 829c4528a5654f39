use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use unicode_normalization::UnicodeNormalization;
use std::collections::HashSet;

/// Tokens must be longer than this many characters to be indexed.
pub const MAX_DROPPED_LEN: usize = 2;

lazy_static! {
    static ref RE: Regex = Regex::new(r"[а-яёa-z]+").expect("valid regex");
    static ref STEMMER: Stemmer = Stemmer::create(Algorithm::Russian);
    static ref STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "и","в","во","не","что","он","на","я","с","со","как","а","то","все","она","так","его","но","да","ты",
            "к","у","же","вы","за","бы","по","только","ее","мне","было","вот","от","меня","еще","нет","о","из",
            "ему","теперь","когда","даже","ну","вдруг","ли","если","уже","или","ни","быть","был","него","до",
            "вас","нибудь","опять","уж","вам","ведь","там","потом","себя","ничего","ей","может","они","тут",
            "где","есть","надо","ней","для","мы","тебя","их","чем","была","сам","чтоб","без","будто","чего",
            "раз","тоже","себе","под","будет","ж","тогда","кто","этот","того","потому","этого","какой","совсем",
            "ним","здесь","этом","один","почти","мой","тем","чтобы","нее","сейчас","были","куда","зачем","всех",
            "никогда","можно","при","наконец","два","об","другой","хоть","после","над","больше","тот","через",
            "эти","нас","про","всего","них","какая","много","разве","три","эту","моя","впрочем","хорошо","свою",
            "этой","перед","иногда","лучше","чуть","том","нельзя","такой","им","более","всегда","конечно","всю",
            "между"
        ];
        words.iter().copied().collect()
    };
}

fn is_stopword(token: &str) -> bool { STOPWORDS.contains(token) }

fn normalize(text: &str) -> String {
    text.nfkc().collect::<String>().to_lowercase()
}

/// Canonical index term for a single word.
pub fn stem(word: &str) -> String {
    STEMMER.stem(&normalize(word)).into_owned()
}

/// Lower-cased letter runs that survive the length and stop-word filters, before stemming.
pub fn kept_tokens(text: &str) -> Vec<String> {
    let normalized = normalize(text);
    RE.find_iter(&normalized)
        .map(|m| m.as_str())
        .filter(|t| t.chars().count() > MAX_DROPPED_LEN && !is_stopword(t))
        .map(str::to_string)
        .collect()
}

/// Tokenize text into stemmed terms, in document order and with repeats.
pub fn tokenize(text: &str) -> Vec<String> {
    kept_tokens(text).iter().map(|t| STEMMER.stem(t).into_owned()).collect()
}
