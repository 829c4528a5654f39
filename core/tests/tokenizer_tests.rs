use reviewdex_core::tokenizer::{kept_tokens, stem, tokenize};

#[test]
fn it_lowercases_and_stems() {
    let words = tokenize("СЮЖЕТ сюжета Сюжеты");
    assert_eq!(words.len(), 3);
    assert!(words.iter().all(|w| w == &words[0]));
    // query terms go through the same canonicalization
    assert_eq!(stem("Сюжеты"), words[0]);
}

#[test]
fn it_filters_stopwords_and_short_tokens() {
    let kept = kept_tokens("Только он и кот смотрели аниме");
    assert!(!kept.contains(&"только".to_string()));
    assert!(!kept.contains(&"он".to_string()));
    assert!(kept.contains(&"кот".to_string()));
    assert!(kept.contains(&"аниме".to_string()));
}

#[test]
fn it_keeps_latin_and_drops_punctuation() {
    let kept = kept_tokens("Studio Ghibli's film, 1997 (remastered)!");
    assert_eq!(kept, vec!["studio", "ghibli", "film", "remastered"]);
}
