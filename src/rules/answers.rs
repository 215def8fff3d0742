use anyhow::{Result, bail};
use regex::Regex;

use crate::model::{AnswerEntry, ExactAnswer, IdealAnswer, Question, QuestionType};

pub fn normalize_yesno_answer(question: &mut Question) -> Result<()> {
    if question.question_type != QuestionType::Yesno {
        return Ok(());
    }

    let canonical = match question.exact_answer.as_ref() {
        Some(ExactAnswer::Text(answer)) => {
            if answer.to_lowercase().starts_with("yes") {
                "yes"
            } else {
                "no"
            }
        }
        Some(ExactAnswer::List(_) | ExactAnswer::Other(_)) => {
            bail!("yesno exact_answer must be a string")
        }
        None => bail!("yesno question has no exact_answer"),
    };

    question.exact_answer = Some(ExactAnswer::Text(canonical.to_string()));
    Ok(())
}

pub fn listify_ideal_answer(question: &mut Question) {
    if let Some(IdealAnswer::Text(text)) = question.ideal_answer.as_mut() {
        let text = std::mem::take(text);
        question.ideal_answer = Some(IdealAnswer::List(vec![text]));
    }
}

pub fn listify_exact_answer(question: &mut Question) {
    let Some(ExactAnswer::List(entries)) = question.exact_answer.as_mut() else {
        return;
    };

    match question.question_type {
        // Only string and list entries survive; stray scalars are dropped.
        QuestionType::List => {
            entries.retain(|entry| !matches!(entry, AnswerEntry::Other(_)));
            for entry in entries.iter_mut() {
                if let AnswerEntry::Text(text) = entry {
                    let text = std::mem::take(text);
                    *entry = AnswerEntry::Group(vec![text]);
                }
            }
        }
        // Legacy rows wrap the whole answer once more: [["A", "B"]]. Only the
        // first outer element is kept; any siblings are dropped.
        QuestionType::Factoid => {
            if let Some(AnswerEntry::Group(first)) = entries.first_mut() {
                let forms = std::mem::take(first);
                *entries = forms.into_iter().map(AnswerEntry::Text).collect();
            }
        }
        QuestionType::Yesno | QuestionType::Summary => {}
    }
}

pub fn split_parenthesis_answer(question: &mut Question, pattern: &Regex) -> Result<()> {
    let question_type = question.question_type;
    if !matches!(question_type, QuestionType::Factoid | QuestionType::List) {
        return Ok(());
    }

    let entries = match question.exact_answer.as_mut() {
        Some(ExactAnswer::List(entries)) => entries,
        Some(ExactAnswer::Text(_) | ExactAnswer::Other(_)) => {
            bail!("{} exact_answer must be a list", question_type.as_str())
        }
        None => bail!("{} question has no exact_answer", question_type.as_str()),
    };

    if question_type == QuestionType::Factoid {
        let mut extra = Vec::new();
        for entry in entries.iter() {
            match entry {
                AnswerEntry::Text(text) => {
                    if let Some(alternatives) = parenthetical_alternatives(text, pattern) {
                        extra.extend(alternatives.map(AnswerEntry::Text));
                    }
                }
                AnswerEntry::Group(_) | AnswerEntry::Other(_) => {
                    bail!("factoid exact_answer entries must be strings after listification")
                }
            }
        }
        entries.extend(extra);
        return Ok(());
    }

    for entry in entries.iter_mut() {
        let AnswerEntry::Group(forms) = entry else {
            bail!("list exact_answer entries must be lists of strings after listification");
        };
        let extra: Vec<String> = forms
            .iter()
            .filter_map(|form| parenthetical_alternatives(form, pattern))
            .flatten()
            .collect();
        forms.extend(extra);
    }
    Ok(())
}

/// "aspirin (acetylsalicylic acid)" -> ["aspirin", "acetylsalicylic acid"].
pub fn parenthetical_alternatives(text: &str, pattern: &Regex) -> Option<[String; 2]> {
    let captures = pattern.captures(text)?;
    let outer = captures.get(1)?.as_str().to_string();
    let inner = captures.get(2)?.as_str().to_string();
    Some([outer, inner])
}
