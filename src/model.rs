use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    pub questions: Vec<Question>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    Yesno,
    Factoid,
    List,
    Summary,
}

impl QuestionType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Yesno => "yesno",
            Self::Factoid => "factoid",
            Self::List => "list",
            Self::Summary => "summary",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exact_answer: Option<ExactAnswer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ideal_answer: Option<IdealAnswer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concepts: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documents: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippets: Option<Vec<Snippet>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `exact_answer` as found in the wild: a bare string (yesno, some factoid
/// rows) or a list whose entries are surface forms or synonym groups.
/// Anything else is carried through untouched until a rule needs its shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExactAnswer {
    Text(String),
    List(Vec<AnswerEntry>),
    Other(Value),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerEntry {
    Text(String),
    Group(Vec<String>),
    Other(Value),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IdealAnswer {
    Text(String),
    List(Vec<String>),
}

/// Offsets count characters into the declared section, not into the abstract.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snippet {
    pub document: String,
    pub text: String,
    pub begin_section: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_section: Option<String>,
    pub offset_in_begin_section: usize,
    pub offset_in_end_section: usize,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
