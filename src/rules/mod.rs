use anyhow::{Context, Result, bail};
use regex::Regex;
use serde_json::Value;

use crate::model::{Dataset, Question};
use crate::store::ReferenceTexts;

mod answers;
mod concepts;
mod distance;
mod layout;
mod sections;
mod strip;

pub use layout::KeyLayout;

pub const DEFAULT_MESH_YEAR: &str = "2016";
pub const DEFAULT_ABSTRACT_MATCH_RATIO: f64 = 0.1;

/// Per-record repair steps. Declaration order is the only order in which
/// they may run: later steps rely on the field shapes earlier ones leave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Rule {
    UpdateYear,
    FixGoUrl,
    NormalizeYesno,
    ListifyIdealAnswer,
    ListifyExactAnswer,
    SplitParenthesisAnswer,
    FixSectionLabel,
    // Opt-in: push onto `PipelineConfig::rules` after FixSectionLabel.
    #[allow(dead_code)]
    RemoveFulltextSnippets,
    RemoveConceptTripleIdeal,
    ReplaceDocUriWithId,
}

impl Rule {
    pub fn name(self) -> &'static str {
        match self {
            Self::UpdateYear => "update_year",
            Self::FixGoUrl => "fix_go_url",
            Self::NormalizeYesno => "normalize_yesno_answer",
            Self::ListifyIdealAnswer => "listify_ideal_answer",
            Self::ListifyExactAnswer => "listify_exact_answer",
            Self::SplitParenthesisAnswer => "split_parenthesis_answer",
            Self::FixSectionLabel => "fix_section_label",
            Self::RemoveFulltextSnippets => "remove_fulltext_snippets",
            Self::RemoveConceptTripleIdeal => "remove_concept_triple_ideal",
            Self::ReplaceDocUriWithId => "replace_doc_uri_with_id",
        }
    }
}

pub const DEFAULT_RULES: [Rule; 7] = [
    Rule::UpdateYear,
    Rule::FixGoUrl,
    Rule::NormalizeYesno,
    Rule::ListifyIdealAnswer,
    Rule::ListifyExactAnswer,
    Rule::SplitParenthesisAnswer,
    Rule::FixSectionLabel,
];

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub rules: Vec<Rule>,
    pub mesh_year: String,
    pub abstract_match_ratio: f64,
    pub key_layout: KeyLayout,
    pub drop_yesno_summary: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            rules: DEFAULT_RULES.to_vec(),
            mesh_year: DEFAULT_MESH_YEAR.to_string(),
            abstract_match_ratio: DEFAULT_ABSTRACT_MATCH_RATIO,
            key_layout: KeyLayout::Original,
            drop_yesno_summary: false,
        }
    }
}

impl PipelineConfig {
    /// Release variant for teaching use: factoid and list questions only,
    /// bare PubMed ids, compact snippet keys, no concepts or ideal answers.
    /// Enabled by passing it to `Pipeline::new` in `commands::fix::run` in
    /// place of `PipelineConfig::default()`.
    #[allow(dead_code)]
    pub fn course_release() -> Self {
        let mut rules = DEFAULT_RULES.to_vec();
        rules.extend([Rule::RemoveConceptTripleIdeal, Rule::ReplaceDocUriWithId]);
        Self {
            rules,
            key_layout: KeyLayout::Compact,
            drop_yesno_summary: true,
            ..Self::default()
        }
    }
}

struct RulePatterns {
    mesh_year: Regex,
    go_term: Regex,
    parenthesis_end: Regex,
    pubmed_uri: Regex,
}

impl RulePatterns {
    fn new() -> Result<Self> {
        Ok(Self {
            mesh_year: Regex::new(r"http://www\.nlm\.nih\.gov/cgi/mesh/\d+/(.*)")
                .context("failed to compile MeSH year regex")?,
            go_term: Regex::new(
                r"http://amigo\.geneontology\.org/cgi-bin/amigo/term_details\?term=(\d+)",
            )
            .context("failed to compile GO term regex")?,
            parenthesis_end: Regex::new(r"^([^/()]*)[ \t\n\r\x0B\x0C]+\((.*)\)")
                .context("failed to compile parenthetical answer regex")?,
            pubmed_uri: Regex::new(r"^http://www\.ncbi\.nlm\.nih\.gov/pubmed/(\d+)")
                .context("failed to compile PubMed URI regex")?,
        })
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct QuestionReport {
    pub relabeled_snippets: usize,
    pub missing_pmids: Vec<i64>,
}

#[derive(Debug)]
pub struct FinishedDataset {
    pub document: Value,
    pub written: usize,
    pub dropped: usize,
}

pub struct Pipeline {
    config: PipelineConfig,
    patterns: RulePatterns,
    mesh_replacement: String,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Result<Self> {
        validate_rule_order(&config.rules)?;

        if !config.abstract_match_ratio.is_finite() || config.abstract_match_ratio < 0.0 {
            bail!(
                "abstract match ratio must be a non-negative number, got {}",
                config.abstract_match_ratio
            );
        }
        if config.mesh_year.is_empty() || !config.mesh_year.bytes().all(|b| b.is_ascii_digit()) {
            bail!("MeSH year must be numeric, got '{}'", config.mesh_year);
        }

        let mesh_replacement = format!(
            "http://www.nlm.nih.gov/cgi/mesh/{}/${{1}}",
            config.mesh_year
        );

        Ok(Self {
            config,
            patterns: RulePatterns::new()?,
            mesh_replacement,
        })
    }

    pub fn rules(&self) -> &[Rule] {
        &self.config.rules
    }

    pub fn apply(
        &self,
        question: &mut Question,
        store: &dyn ReferenceTexts,
    ) -> Result<QuestionReport> {
        let mut report = QuestionReport::default();
        for &rule in &self.config.rules {
            self.apply_rule(rule, question, store, &mut report)
                .with_context(|| format!("rule {} failed", rule.name()))?;
        }
        Ok(report)
    }

    fn apply_rule(
        &self,
        rule: Rule,
        question: &mut Question,
        store: &dyn ReferenceTexts,
        report: &mut QuestionReport,
    ) -> Result<()> {
        match rule {
            Rule::UpdateYear => {
                concepts::update_year(question, &self.patterns.mesh_year, &self.mesh_replacement);
            }
            Rule::FixGoUrl => concepts::fix_go_url(question, &self.patterns.go_term),
            Rule::NormalizeYesno => answers::normalize_yesno_answer(question)?,
            Rule::ListifyIdealAnswer => answers::listify_ideal_answer(question),
            Rule::ListifyExactAnswer => answers::listify_exact_answer(question),
            Rule::SplitParenthesisAnswer => {
                answers::split_parenthesis_answer(question, &self.patterns.parenthesis_end)?;
            }
            Rule::FixSectionLabel => sections::fix_section_label(
                question,
                &self.patterns.pubmed_uri,
                store,
                self.config.abstract_match_ratio,
                report,
            )?,
            Rule::RemoveFulltextSnippets => strip::remove_fulltext_snippets(question),
            Rule::RemoveConceptTripleIdeal => strip::remove_concept_triple_ideal(question),
            Rule::ReplaceDocUriWithId => {
                strip::replace_doc_uri_with_id(question, &self.patterns.pubmed_uri);
            }
        }
        Ok(())
    }

    /// Corpus-level passes that run once every record has been repaired.
    pub fn finish(&self, mut dataset: Dataset) -> Result<FinishedDataset> {
        let before = dataset.questions.len();
        if self.config.drop_yesno_summary {
            dataset.questions.retain(|question| !strip::is_yesno_summary(question));
        }
        let written = dataset.questions.len();

        let mut document =
            serde_json::to_value(&dataset).context("failed to serialize normalized dataset")?;
        self.config.key_layout.apply(&mut document)?;

        Ok(FinishedDataset {
            document,
            written,
            dropped: before - written,
        })
    }
}

fn validate_rule_order(rules: &[Rule]) -> Result<()> {
    for pair in rules.windows(2) {
        if pair[0] >= pair[1] {
            bail!(
                "rule {} cannot run after {}",
                pair[1].name(),
                pair[0].name()
            );
        }
    }
    Ok(())
}
