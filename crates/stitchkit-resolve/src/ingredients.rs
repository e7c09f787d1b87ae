//! Ingredient-list parsing
//!
//! Product ingredient fields come in several shapes:
//!
//! - `ATAZANAVIR SULFATE; RITONAVIR` or `A|B`: plain lists
//! - `ATAZANAVIR SULFATE;RITONAVIR;LAMIVUDINE`: bare semicolons
//! - `TRIPLE SULFA (SULFABENZAMIDE;SULFACETAMIDE;SULFATHIAZOLE)`: a mixture
//!   name followed by its components, which replace it
//!
//! Separators inside parentheses never split a name at the outer level.

use std::collections::{BTreeMap, VecDeque};
use std::io::Write;

use crate::error::ResolveError;
use crate::gsrs::NameLookup;
use crate::resolver::Resolver;
use crate::unii::UniiTable;

/// Unresolved ingredient -> contexts (application number, row id) it came from.
#[derive(Debug, Default)]
pub struct MissingReport {
    entries: BTreeMap<String, Vec<String>>,
    occurrences: usize,
}

impl MissingReport {
    /// Record a miss. Logged the first time a name is seen.
    pub fn record(&mut self, name: &str, context: &str) {
        let contexts = self.entries.entry(name.to_string()).or_insert_with(|| {
            log::warn!("Ingredient does not map to UNII: {name}\t{context}");
            Vec::new()
        });
        contexts.push(context.to_string());
        self.occurrences += 1;
    }

    /// Misses recorded so far, counting repeats.
    pub fn occurrences(&self) -> usize {
        self.occurrences
    }

    pub fn contexts(&self, name: &str) -> Option<&[String]> {
        self.entries.get(name).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// `name<TAB>occurrences<TAB>ctx,ctx,...`, sorted by name.
    pub fn write<W: Write>(&self, mut w: W) -> std::io::Result<()> {
        writeln!(w, "ingredient\tcount\tcontexts")?;
        for (name, contexts) in &self.entries {
            writeln!(w, "{name}\t{}\t{}", contexts.len(), contexts.join(","))?;
        }
        Ok(())
    }
}

/// Resolve every ingredient in `text` to a UNII.
///
/// Misses go to `missing` under `context`. Conflicting lookups and unbalanced
/// parentheses in a delimited list are errors.
pub fn parse_ingredients<L: NameLookup>(
    text: &str,
    context: &str,
    table: &UniiTable,
    resolver: &mut Resolver<L>,
    missing: &mut MissingReport,
) -> Result<Vec<String>, ResolveError> {
    let text = text.trim().to_uppercase();
    if text.is_empty() {
        return Ok(Vec::new());
    }
    if let Some(unii) = table.preferred.get(&text) {
        return Ok(vec![unii.clone()]);
    }

    let mut queue: VecDeque<String> = split_top(&text, false)?
        .into_iter()
        .map(str::to_string)
        .collect();
    let mut uniis = Vec::new();

    while let Some(segment) = queue.pop_front() {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }
        if let Some(unii) = table
            .preferred
            .get(segment)
            .or_else(|| table.all.get(segment))
        {
            uniis.push(unii.clone());
            continue;
        }

        let parts = split_top(segment, true)?;
        if parts.len() > 1 {
            push_front_all(&mut queue, parts);
            continue;
        }
        if let Some(inner) = trailing_group(segment).filter(|g| g.contains(';')) {
            push_front_all(&mut queue, split_top(inner, true)?);
            continue;
        }

        if let Some(codes) = resolver.overrides().get(segment) {
            uniis.extend(codes.iter().cloned());
            continue;
        }
        match resolver.resolve(segment)? {
            Some(unii) => uniis.push(unii),
            None => missing.record(segment, context),
        }
    }
    Ok(uniis)
}

fn push_front_all(queue: &mut VecDeque<String>, parts: Vec<&str>) {
    for part in parts.into_iter().rev() {
        queue.push_front(part.to_string());
    }
}

/// Split on `|` and `; ` (any `;` when `bare`) outside parentheses.
///
/// Text without separators is returned whole even if its parentheses don't
/// balance; a delimited list with unbalanced parentheses is an error.
fn split_top(text: &str, bare: bool) -> Result<Vec<&str>, ResolveError> {
    let bytes = text.as_bytes();
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut balanced = true;
    let mut delimited = false;
    let mut start = 0;

    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth < 0 {
                    balanced = false;
                    depth = 0;
                }
            }
            b'|' | b';' => {
                delimited = true;
                let splits = b == b'|' || bare || bytes.get(i + 1) == Some(&b' ');
                if depth == 0 && splits {
                    parts.push(&text[start..i]);
                    start = i + 1;
                }
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);

    if !balanced || depth != 0 {
        if delimited {
            return Err(ResolveError::UnbalancedParens {
                text: text.to_string(),
            });
        }
        return Ok(vec![text]);
    }
    Ok(parts)
}

/// Contents of a parenthesized group that closes the text, if any.
fn trailing_group(text: &str) -> Option<&str> {
    let body = text.strip_suffix(')')?;
    let mut depth = 0i32;
    for (i, b) in body.bytes().enumerate().rev() {
        match b {
            b')' => depth += 1,
            b'(' if depth == 0 => return Some(&body[i + 1..]),
            b'(' => depth -= 1,
            _ => {}
        }
    }
    None
}
