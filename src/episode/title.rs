// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use deunicode::deunicode_with_tofu;
use pinyin::ToPinyin;

/// Character substituted for each run of whitespace
const SEPARATOR: char = '_';

/// Turn a raw filename stem into a feed-safe display title
///
/// Han characters are romanized one token per character; every other run of
/// text forms a single token. Each token is transliterated to ASCII, stripped
/// of diacritics and capitalized, then all tokens are joined without a
/// separator. `"歌曲"` becomes `"GeQu"`, `"Café del Mar"` becomes `"Cafe_del_mar"`.
pub fn normalize_title(stem: &str) -> String {
    let collapsed = collapse_whitespace(stem);

    tokenize(&collapsed)
        .iter()
        .map(|token| capitalize(deunicode_with_tofu(token, "").trim()))
        .collect()
}

/// Replace every run of whitespace with a single separator
fn collapse_whitespace(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut last_was_whitespace = false;

    for c in s.chars() {
        if c.is_whitespace() {
            if !last_was_whitespace {
                result.push(SEPARATOR);
                last_was_whitespace = true;
            }
        } else {
            result.push(c);
            last_was_whitespace = false;
        }
    }

    result
}

/// Split into romanizable tokens: one per Han character (as tone-marked
/// pinyin), one per maximal run of anything else
fn tokenize(s: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut run = String::new();

    for c in s.chars() {
        match c.to_pinyin() {
            Some(pinyin) => {
                if !run.is_empty() {
                    tokens.push(std::mem::take(&mut run));
                }
                tokens.push(pinyin.with_tone().to_string());
            }
            None => run.push(c),
        }
    }

    if !run.is_empty() {
        tokens.push(run);
    }

    tokens
}

/// Upper-case the first character and lower-case the rest
fn capitalize(token: &str) -> String {
    let lower = token.to_lowercase();
    let mut chars = lower.chars();

    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
