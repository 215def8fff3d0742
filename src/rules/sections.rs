use anyhow::{Context, Result};
use regex::Regex;
use tracing::debug;

use super::QuestionReport;
use super::distance::edit_distance;
use crate::model::{Question, Snippet};
use crate::store::ReferenceTexts;

pub const FIRST_FULLTEXT_SECTION: &str = "sections.0";
pub const ABSTRACT_SECTION: &str = "abstract";

/// Snippets labelled `sections.0` whose offsets actually point into the
/// abstract are relabelled `abstract`.
pub fn fix_section_label(
    question: &mut Question,
    pubmed_uri: &Regex,
    store: &dyn ReferenceTexts,
    match_ratio: f64,
    report: &mut QuestionReport,
) -> Result<()> {
    let Some(snippets) = question.snippets.as_mut() else {
        return Ok(());
    };

    for snippet in snippets.iter_mut() {
        if snippet.begin_section != FIRST_FULLTEXT_SECTION {
            continue;
        }

        let pmid = extract_pmid(&snippet.document, pubmed_uri)?;
        let Some(abstract_text) = store.abstract_text(pmid)? else {
            report.missing_pmids.push(pmid);
            continue;
        };

        if offsets_match_abstract(&abstract_text, snippet, match_ratio) {
            snippet.begin_section = ABSTRACT_SECTION.to_string();
            snippet.end_section = Some(ABSTRACT_SECTION.to_string());
            report.relabeled_snippets += 1;
            debug!(pmid, "relabeled snippet as abstract");
        }
    }
    Ok(())
}

pub fn extract_pmid(document: &str, pubmed_uri: &Regex) -> Result<i64> {
    let captures = pubmed_uri
        .captures(document)
        .with_context(|| format!("snippet document is not a PubMed URI: {document}"))?;

    captures
        .get(1)
        .map(|m| m.as_str())
        .context("missing pmid capture")?
        .parse::<i64>()
        .with_context(|| format!("invalid pmid in document URI: {document}"))
}

fn offsets_match_abstract(abstract_text: &str, snippet: &Snippet, match_ratio: f64) -> bool {
    let abstract_chars: Vec<char> = abstract_text.chars().collect();
    let begin = snippet.offset_in_begin_section;
    let end = snippet.offset_in_end_section;
    if abstract_chars.len() < end {
        return false;
    }

    let span = if begin < end {
        &abstract_chars[begin..end]
    } else {
        &abstract_chars[..0]
    };
    let text: Vec<char> = snippet.text.chars().collect();
    let distance = edit_distance(span, &text);

    (distance as f64) < text.len() as f64 * match_ratio
}
