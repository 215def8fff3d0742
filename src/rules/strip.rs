use regex::Regex;

use crate::model::{Question, QuestionType};

pub fn remove_fulltext_snippets(question: &mut Question) {
    let snippets = question.snippets.take().unwrap_or_default();
    question.snippets = Some(
        snippets
            .into_iter()
            .filter(|snippet| !snippet.begin_section.starts_with("sections."))
            .collect(),
    );
}

pub fn remove_concept_triple_ideal(question: &mut Question) {
    question.concepts = None;
    question.ideal_answer = None;
    question.extra.shift_remove("triples");
}

pub fn replace_doc_uri_with_id(question: &mut Question, pubmed_uri: &Regex) {
    if let Some(documents) = question.documents.as_mut() {
        for document in documents.iter_mut() {
            replace_with_pmid(document, pubmed_uri);
        }
    }
    if let Some(snippets) = question.snippets.as_mut() {
        for snippet in snippets.iter_mut() {
            replace_with_pmid(&mut snippet.document, pubmed_uri);
        }
    }
}

fn replace_with_pmid(document: &mut String, pubmed_uri: &Regex) {
    if pubmed_uri.is_match(document) {
        *document = pubmed_uri.replace(document, "${1}").into_owned();
    }
}

pub fn is_yesno_summary(question: &Question) -> bool {
    matches!(
        question.question_type,
        QuestionType::Yesno | QuestionType::Summary
    )
}
