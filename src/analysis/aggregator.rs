//! Chat aggregation and statistics.
//!
//! This module walks a chat export once per statistic and computes the
//! question index, the top repliers ranking and the filtered word stream
//! used by the word cloud.

use super::text::{flatten_text, has_question, is_numeric_token, tokenize, Normalizer};
use crate::models::{ChatExport, ChatSummary, QuestionIndex, TopRepliers, UserTally, WordFrequency};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Default size of the top repliers ranking.
pub const DEFAULT_TOP_N: usize = 10;

/// Options for building the word frequency table.
#[derive(Debug, Clone)]
pub struct WordOptions {
    /// Maximum number of words returned.
    pub max_words: usize,
    /// Tokens shorter than this (in characters) are ignored.
    pub min_word_length: usize,
    /// Count a trailing-`s` plural under its singular when both occur.
    pub normalize_plurals: bool,
}

impl Default for WordOptions {
    fn default() -> Self {
        Self {
            max_words: 200,
            min_word_length: 2,
            normalize_plurals: true,
        }
    }
}

impl From<&crate::config::WordCloudConfig> for WordOptions {
    fn from(config: &crate::config::WordCloudConfig) -> Self {
        Self {
            max_words: config.max_words,
            min_word_length: config.min_word_length,
            normalize_plurals: config.normalize_plurals,
        }
    }
}

/// Computes statistics over a loaded chat export.
pub struct ChatAggregator<'a> {
    export: &'a ChatExport,
    normalizer: Normalizer,
    stopwords: HashSet<String>,
}

impl<'a> ChatAggregator<'a> {
    /// Create an aggregator. Stopwords are normalized and lowercased so
    /// they match the normalized text regardless of case.
    pub fn new(export: &'a ChatExport, stopwords: &[String], normalizer: Normalizer) -> Self {
        let stopwords = stopwords
            .iter()
            .map(|word| normalizer.normalize(word).to_lowercase())
            .filter(|word| !word.is_empty())
            .collect();

        Self {
            export,
            normalizer,
            stopwords,
        }
    }

    /// Flag every message with non-empty text as question or not.
    pub fn question_index(&self) -> QuestionIndex {
        let mut index = QuestionIndex::default();

        for msg in &self.export.messages {
            if msg.text.is_empty() {
                continue;
            }
            index.insert(msg.id, has_question(&flatten_text(&msg.text)));
        }

        debug!(
            "Indexed {} messages, {} questions",
            index.len(),
            index.question_count()
        );
        index
    }

    /// Rank the users who replied to questions most often.
    #[allow(dead_code)] // One-shot variant of top_repliers_with_index
    pub fn top_repliers(&self, top_n: usize) -> TopRepliers {
        let index = self.question_index();
        self.top_repliers_with_index(&index, top_n)
    }

    /// Rank repliers against a precomputed question index.
    ///
    /// Ties keep the order in which users first replied to a question.
    pub fn top_repliers_with_index(&self, index: &QuestionIndex, top_n: usize) -> TopRepliers {
        let mut entries = tally_in_order(question_replies(self.export, index));

        entries.sort_by_key(|tally| std::cmp::Reverse(tally.replies));
        entries.truncate(top_n);

        TopRepliers { entries }
    }

    /// Summary counts for reports.
    pub fn summary(&self, index: &QuestionIndex) -> ChatSummary {
        ChatSummary {
            messages: self.export.messages.len(),
            text_messages: index.len(),
            questions: index.question_count(),
            replies_to_questions: question_replies(self.export, index).count(),
        }
    }

    /// All message text flattened and concatenated in order.
    pub fn raw_text(&self) -> String {
        self.export
            .messages
            .iter()
            .map(|msg| flatten_text(&msg.text))
            .collect()
    }

    /// Normalized tokens with stopwords removed.
    pub fn filtered_tokens(&self) -> Vec<String> {
        let normalized = self.normalizer.normalize(&self.raw_text());

        tokenize(&normalized)
            .filter(|token| !self.stopwords.contains(&token.to_lowercase()))
            .map(String::from)
            .collect()
    }

    /// The filtered token stream as one space-separated blob.
    #[allow(dead_code)] // The renderer consumes word_frequencies instead
    pub fn word_text(&self) -> String {
        self.filtered_tokens().join(" ")
    }

    /// Count filtered words case-insensitively.
    ///
    /// Each word is reported in its most common spelling. With
    /// `normalize_plurals`, "cats" is counted as "cat" if "cat" also
    /// occurs ("glass" and "bus" stay as they are). The result is sorted by
    /// count (descending), then by first occurrence.
    pub fn word_frequencies(&self, options: &WordOptions) -> Vec<WordFrequency> {
        let tokens = self
            .filtered_tokens()
            .into_iter()
            .filter(|token| token.chars().count() >= options.min_word_length)
            .filter(|token| !is_numeric_token(token));

        let mut order: Vec<String> = Vec::new();
        let mut forms: HashMap<String, Vec<(String, usize)>> = HashMap::new();

        for token in tokens {
            let key = token.to_lowercase();
            let variants = forms.entry(key.clone()).or_insert_with(|| {
                order.push(key);
                Vec::new()
            });

            match variants.iter_mut().find(|(form, _)| *form == token) {
                Some((_, count)) => *count += 1,
                None => variants.push((token, 1)),
            }
        }

        if options.normalize_plurals {
            merge_plurals(&order, &mut forms);
        }

        let mut frequencies: Vec<WordFrequency> = order
            .iter()
            .filter_map(|key| forms.get(key))
            .filter_map(|variants| {
                let total = variants.iter().map(|(_, count)| count).sum();
                // max_by_key returns the last maximum, so reverse to keep the first.
                let (word, _) = variants.iter().rev().max_by_key(|(_, count)| *count)?;
                Some(WordFrequency {
                    word: word.clone(),
                    count: total,
                })
            })
            .collect();

        frequencies.sort_by_key(|freq| std::cmp::Reverse(freq.count));
        frequencies.truncate(options.max_words);

        debug!("Counted {} distinct words", frequencies.len());
        frequencies
    }
}

/// Authors of replies whose target is a question, in message order.
fn question_replies<'e>(
    export: &'e ChatExport,
    index: &'e QuestionIndex,
) -> impl Iterator<Item = &'e str> + 'e {
    export.messages.iter().filter_map(move |msg| {
        let target = msg.reply_to_message_id?;
        if !index.is_question(target) {
            return None;
        }
        msg.from.as_deref()
    })
}

/// Fold the spellings of every plural key into its singular key.
fn merge_plurals(order: &[String], forms: &mut HashMap<String, Vec<(String, usize)>>) {
    for key in order {
        let Some(singular) = plural_stem(key) else {
            continue;
        };
        if !forms.contains_key(singular) {
            continue;
        }
        let Some(plural_forms) = forms.remove(key) else {
            continue;
        };

        let target = forms.entry(singular.to_string()).or_default();
        for (form, count) in plural_forms {
            let form = match form.char_indices().last() {
                Some((idx, _)) => form[..idx].to_string(),
                None => form,
            };
            match target.iter_mut().find(|(existing, _)| *existing == form) {
                Some((_, total)) => *total += count,
                None => target.push((form, count)),
            }
        }
    }
}

/// `cats` -> `cat`; words ending in `ss` are not plurals.
fn plural_stem(word: &str) -> Option<&str> {
    word.strip_suffix('s')
        .filter(|stem| !stem.is_empty() && !stem.ends_with('s'))
}

/// Count occurrences, keeping first-seen order.
fn tally_in_order<'s>(users: impl Iterator<Item = &'s str>) -> Vec<UserTally> {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut entries: Vec<UserTally> = Vec::new();

    for user in users {
        match positions.get(user) {
            Some(&pos) => entries[pos].replies += 1,
            None => {
                positions.insert(user, entries.len());
                entries.push(UserTally {
                    user: user.to_string(),
                    replies: 1,
                });
            }
        }
    }

    entries
}
