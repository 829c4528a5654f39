use crate::document::Document;
use crate::tokenizer::{kept_tokens, stem, tokenize};
use std::collections::HashMap;
use std::io::{self, Write};
use std::time::{Duration, Instant};

/// Sizes of the stored corpus, in bytes of UTF-8.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CorpusStats {
    pub documents: usize,
    pub raw_bytes: usize,
    pub clean_bytes: usize,
}

impl CorpusStats {
    pub fn collect(docs: &[Document]) -> Self {
        docs.iter().fold(Self::default(), |acc, d| Self {
            documents: acc.documents + 1,
            raw_bytes: acc.raw_bytes + d.raw_html.len(),
            clean_bytes: acc.clean_bytes + d.clean_text.len(),
        })
    }

    pub fn avg_raw_bytes(&self) -> f64 {
        if self.documents == 0 { 0.0 } else { self.raw_bytes as f64 / self.documents as f64 }
    }

    pub fn avg_clean_bytes(&self) -> f64 {
        if self.documents == 0 { 0.0 } else { self.clean_bytes as f64 / self.documents as f64 }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokenReport {
    /// Tokens kept after the length and stop-word filters.
    pub tokens: u64,
    pub token_chars: u64,
    pub clean_bytes: u64,
    pub elapsed: Duration,
}

impl TokenReport {
    pub fn avg_token_len(&self) -> f64 {
        if self.tokens == 0 { 0.0 } else { self.token_chars as f64 / self.tokens as f64 }
    }

    /// Throughput over the clean text, `None` when nothing measurable was processed.
    pub fn kb_per_sec(&self) -> Option<f64> {
        let secs = self.elapsed.as_secs_f64();
        if self.clean_bytes == 0 || secs == 0.0 {
            return None;
        }
        Some(self.clean_bytes as f64 / 1024.0 / secs)
    }
}

/// Time a full tokenize-and-stem pass over the snapshot.
pub fn token_report(docs: &[Document]) -> TokenReport {
    let start = Instant::now();
    let mut report = TokenReport::default();
    for doc in docs {
        let tokens = kept_tokens(&doc.clean_text);
        let stems: Vec<String> = tokens.iter().map(|t| stem(t)).collect();
        report.tokens += stems.len() as u64;
        report.token_chars += tokens.iter().map(|t| t.chars().count() as u64).sum::<u64>();
        report.clean_bytes += doc.clean_text.len() as u64;
    }
    report.elapsed = start.elapsed();
    report
}

/// Stemmed term frequencies over the whole corpus, most frequent first
/// (ties broken alphabetically).
pub fn term_frequencies(docs: &[Document]) -> Vec<(String, u64)> {
    let mut counts: HashMap<String, u64> = HashMap::new();
    for doc in docs {
        for term in tokenize(&doc.clean_text) {
            *counts.entry(term).or_insert(0) += 1;
        }
    }
    let mut sorted: Vec<(String, u64)> = counts.into_iter().collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    sorted
}

/// Rank/frequency table for Zipf plots: `rank\tterm\tfrequency`, rank from 1.
pub fn write_frequency_tsv<W: Write>(freqs: &[(String, u64)], mut out: W) -> io::Result<()> {
    writeln!(out, "rank\tterm\tfrequency")?;
    for (rank, (term, freq)) in freqs.iter().enumerate() {
        writeln!(out, "{}\t{}\t{}", rank + 1, term, freq)?;
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(raw: &str, text: &str) -> Document {
        Document {
            url: raw.into(),
            source: "test".into(),
            raw_html: raw.into(),
            clean_text: text.into(),
            title: String::new(),
            timestamp: 0.0,
            date_str: String::new(),
        }
    }

    #[test]
    fn corpus_sizes_count_utf8_bytes() {
        let stats = CorpusStats::collect(&[doc("<p>ab</p>", "ab"), doc("<p>я</p>", "я")]);
        assert_eq!(stats.documents, 2);
        assert_eq!(stats.raw_bytes, 9 + 9);
        assert_eq!(stats.clean_bytes, 2 + 2);
        assert_eq!(stats.avg_clean_bytes(), 2.0);
        assert_eq!(CorpusStats::default().avg_raw_bytes(), 0.0);
    }

    #[test]
    fn token_report_counts_kept_tokens() {
        let report = token_report(&[doc("", "кот и собака 12 он")]);
        assert_eq!(report.tokens, 2);
        assert_eq!(report.avg_token_len(), 4.5);
    }

    #[test]
    fn frequencies_are_ranked() {
        let freqs = term_frequencies(&[doc("", "музыка графика музыка"), doc("", "музыка звук")]);
        assert_eq!(freqs[0], (stem("музыка"), 3));
        assert_eq!(freqs.len(), 3);
        assert_eq!(freqs[1].1, 1);
        assert!(freqs[1].0 < freqs[2].0);

        let mut out = Vec::new();
        write_frequency_tsv(&freqs, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "rank\tterm\tfrequency");
        assert_eq!(lines[1], format!("1\t{}\t3", stem("музыка")));
        assert_eq!(lines.len(), 4);
    }
}
