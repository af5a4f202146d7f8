// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Deterministic auto-naming for registry keys.
//!
//! Both the event bus and the plugin hub hand out unique keys of the form
//! `base<delimiter>N`. The next key always uses a suffix strictly greater
//! than the highest one currently in use, so removing and re-adding entries
//! never recycles a name.

/// Returns the next free name for `base` among `existing` keys.
///
/// If `base` already carries a `<delimiter><number>` suffix, that suffix is
/// stripped before scanning, so repeatedly auto-naming an auto-named key does
/// not compound suffixes (`anon-2` becomes `anon-3`, not `anon-2-0`).
pub fn next_name<'a, I>(existing: I, base: &str, delimiter: char) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let stem = strip_numeric_suffix(base, delimiter);
    let prefix = format!("{stem}{delimiter}");

    let mut max: i64 = -1;
    for key in existing {
        if let Some(rest) = key.strip_prefix(prefix.as_str()) {
            if !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit()) {
                if let Ok(n) = rest.parse::<i64>() {
                    max = max.max(n);
                }
            }
        }
    }

    format!("{prefix}{}", max + 1)
}

/// Strips a trailing `<delimiter><digits>` suffix from `base`, if present.
fn strip_numeric_suffix(base: &str, delimiter: char) -> &str {
    if let Some(pos) = base.rfind(delimiter) {
        let tail = &base[pos + delimiter.len_utf8()..];
        if !tail.is_empty() && tail.chars().all(|c| c.is_ascii_digit()) {
            return &base[..pos];
        }
    }
    base
}
