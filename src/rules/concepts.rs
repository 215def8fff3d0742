use regex::Regex;

use crate::model::Question;

pub fn update_year(question: &mut Question, pattern: &Regex, replacement: &str) {
    rewrite_concepts(question, pattern, replacement);
}

pub fn fix_go_url(question: &mut Question, pattern: &Regex) {
    rewrite_concepts(
        question,
        pattern,
        "http://amigo.geneontology.org/cgi-bin/amigo/term_details?term=GO:${1}",
    );
}

fn rewrite_concepts(question: &mut Question, pattern: &Regex, replacement: &str) {
    let Some(concepts) = question.concepts.as_mut() else {
        return;
    };

    for concept in concepts.iter_mut() {
        if pattern.is_match(concept) {
            *concept = pattern.replace_all(concept, replacement).into_owned();
        }
    }
}
