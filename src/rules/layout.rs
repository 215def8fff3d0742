use anyhow::{Context, Result};
use serde_json::{Map, Value};

/// Key naming of the written dataset. `Compact` renames snippet offsets to
/// `section`/`begin`/`end` and `exact_answer` to `answer`; it works on the
/// serialized tree because no repair rule understands those names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyLayout {
    #[default]
    Original,
    Compact,
}

impl KeyLayout {
    pub fn apply(self, document: &mut Value) -> Result<()> {
        if self == Self::Original {
            return Ok(());
        }

        let questions = document
            .get_mut("questions")
            .and_then(Value::as_array_mut)
            .context("dataset has no questions array")?;

        for (index, question) in questions.iter_mut().enumerate() {
            let question = question
                .as_object_mut()
                .with_context(|| format!("question {index} is not an object"))?;
            rename_keys(question)
                .with_context(|| format!("failed to rename keys of question {index}"))?;
        }
        Ok(())
    }
}

pub fn rename_keys(question: &mut Map<String, Value>) -> Result<()> {
    if let Some(snippets) = question.get_mut("snippets").and_then(Value::as_array_mut) {
        for snippet in snippets.iter_mut().filter_map(Value::as_object_mut) {
            let section = take_key(snippet, "beginSection")?;
            snippet.insert("section".to_string(), section);
            snippet.shift_remove("endSection");
            let begin = take_key(snippet, "offsetInBeginSection")?;
            snippet.insert("begin".to_string(), begin);
            let end = take_key(snippet, "offsetInEndSection")?;
            snippet.insert("end".to_string(), end);
        }
    }

    if let Some(answer) = question.shift_remove("exact_answer") {
        question.insert("answer".to_string(), answer);
    }
    Ok(())
}

fn take_key(object: &mut Map<String, Value>, key: &str) -> Result<Value> {
    object
        .shift_remove(key)
        .with_context(|| format!("snippet has no {key} field"))
}
