use std::io::{self, Write};

use anyhow::{Context, Result};
use tracing::info;

use crate::cli::Cli;
use crate::model::Dataset;
use crate::rules::{FinishedDataset, Pipeline, PipelineConfig};
use crate::store::{ReferenceTexts, SqliteAbstractStore};
use crate::util::{read_json, write_json_pretty};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub processed: usize,
    pub relabeled_snippets: usize,
    pub missing_pmids: usize,
}

pub fn run(args: Cli) -> Result<()> {
    info!(
        input = %args.input.display(),
        abstracts_db = %args.abstracts_db.display(),
        output = %args.output.display(),
        "starting fix"
    );

    let pipeline = Pipeline::new(PipelineConfig::default())?;
    let rule_names: Vec<&str> = pipeline.rules().iter().map(|rule| rule.name()).collect();
    info!(rules = %rule_names.join(","), "pipeline ready");

    let store = SqliteAbstractStore::open(&args.abstracts_db)?;
    let dataset: Dataset = read_json(&args.input)?;
    info!(questions = dataset.questions.len(), "loaded dataset");

    let stdout = io::stdout();
    let mut progress = stdout.lock();
    let (finished, summary) = normalize_dataset(&pipeline, dataset, &store, &mut progress)?;
    drop(progress);
    store.close()?;

    write_json_pretty(&args.output, &finished.document)?;
    info!(
        processed = summary.processed,
        written = finished.written,
        dropped = finished.dropped,
        relabeled_snippets = summary.relabeled_snippets,
        missing_pmids = summary.missing_pmids,
        path = %args.output.display(),
        "wrote normalized dataset"
    );

    Ok(())
}

/// Runs every record through the pipeline, writing `i/total` progress lines
/// and the pmid of every reference-store miss to `progress`. Nothing is
/// returned unless all records succeed.
pub fn normalize_dataset<W: Write>(
    pipeline: &Pipeline,
    mut dataset: Dataset,
    store: &dyn ReferenceTexts,
    progress: &mut W,
) -> Result<(FinishedDataset, RunSummary)> {
    let total = dataset.questions.len();
    let mut summary = RunSummary::default();

    for (index, question) in dataset.questions.iter_mut().enumerate() {
        writeln!(progress, "{index}/{total}").context("failed to write progress")?;

        let report = pipeline
            .apply(question, store)
            .with_context(|| format!("failed to normalize question {index}"))?;

        for pmid in &report.missing_pmids {
            writeln!(progress, "{pmid}").context("failed to report missing pmid")?;
        }
        summary.processed += 1;
        summary.relabeled_snippets += report.relabeled_snippets;
        summary.missing_pmids += report.missing_pmids.len();
    }

    let finished = pipeline.finish(dataset)?;
    Ok((finished, summary))
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::{Path, PathBuf};

    use rusqlite::{Connection, params};
    use serde_json::{Value, json};

    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "bioasq-fixer-{name}-{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).expect("scratch dir should be created");
        dir
    }

    fn seed_abstracts(path: &Path, rows: &[(i64, &str)]) {
        let connection = Connection::open(path).expect("sqlite file should open");
        connection
            .execute_batch(
                "CREATE TABLE pmid2abstract (pmid INTEGER PRIMARY KEY, abstract TEXT NOT NULL);",
            )
            .expect("schema should apply");
        for (pmid, text) in rows {
            connection
                .execute(
                    "INSERT INTO pmid2abstract (pmid, abstract) VALUES (?1, ?2)",
                    params![pmid, text],
                )
                .expect("row should insert");
        }
    }

    fn sample_dataset() -> Value {
        json!({
            "questions": [
                {
                    "id": "q1",
                    "type": "yesno",
                    "body": "Does aspirin inhibit COX-1?",
                    "exact_answer": "Yes, it does",
                    "ideal_answer": "Aspirin irreversibly inhibits COX-1.",
                    "concepts": [
                        "http://www.nlm.nih.gov/cgi/mesh/2014/MB_cgi?field=uid&exact=true&term=D001241",
                        "http://amigo.geneontology.org/cgi-bin/amigo/term_details?term=0004666"
                    ],
                    "documents": ["http://www.ncbi.nlm.nih.gov/pubmed/111"],
                    "snippets": [
                        {
                            "document": "http://www.ncbi.nlm.nih.gov/pubmed/111",
                            "text": "inhibits COX-1",
                            "beginSection": "sections.0",
                            "endSection": "sections.0",
                            "offsetInBeginSection": 8,
                            "offsetInEndSection": 22
                        },
                        {
                            "document": "http://www.ncbi.nlm.nih.gov/pubmed/999",
                            "text": "unrelated",
                            "beginSection": "sections.0",
                            "endSection": "sections.0",
                            "offsetInBeginSection": 0,
                            "offsetInEndSection": 9
                        }
                    ]
                },
                {
                    "id": "q2",
                    "type": "factoid",
                    "body": "Which drug is acetylated salicylic acid?",
                    "exact_answer": [["aspirin (acetylsalicylic acid)"]],
                    "ideal_answer": ["Aspirin."]
                }
            ]
        })
    }

    #[test]
    fn run_writes_normalized_dataset() {
        let dir = scratch_dir("run-ok");
        let input = dir.join("input.json");
        let db = dir.join("abstracts.sqlite");
        let output = dir.join("out").join("fixed.json");
        write_json_pretty(&input, &sample_dataset()).expect("input should be written");
        seed_abstracts(&db, &[(111, "Aspirin inhibits COX-1 irreversibly.")]);

        run(Cli {
            input,
            abstracts_db: db,
            output: output.clone(),
        })
        .expect("run should succeed");

        let written: Value = read_json(&output).expect("output should parse");
        let q1 = &written["questions"][0];
        assert_eq!(q1["id"], "q1");
        assert_eq!(q1["exact_answer"], "yes");
        assert_eq!(q1["ideal_answer"], json!(["Aspirin irreversibly inhibits COX-1."]));
        assert_eq!(
            q1["concepts"][0],
            "http://www.nlm.nih.gov/cgi/mesh/2016/MB_cgi?field=uid&exact=true&term=D001241"
        );
        assert_eq!(
            q1["concepts"][1],
            "http://amigo.geneontology.org/cgi-bin/amigo/term_details?term=GO:0004666"
        );
        assert_eq!(q1["snippets"][0]["beginSection"], "abstract");
        assert_eq!(q1["snippets"][0]["endSection"], "abstract");
        assert_eq!(q1["snippets"][1]["beginSection"], "sections.0");

        let q2 = &written["questions"][1];
        assert_eq!(
            q2["exact_answer"],
            json!(["aspirin (acetylsalicylic acid)", "aspirin", "acetylsalicylic acid"])
        );

        fs::remove_dir_all(&dir).expect("scratch dir should be removed");
    }

    #[test]
    fn run_writes_nothing_when_a_record_fails() {
        let dir = scratch_dir("run-fail");
        let input = dir.join("input.json");
        let db = dir.join("abstracts.sqlite");
        let output = dir.join("fixed.json");
        let mut dataset = sample_dataset();
        dataset["questions"][0]["snippets"][0]["document"] = json!("doi:10.1000/xyz");
        write_json_pretty(&input, &dataset).expect("input should be written");
        seed_abstracts(&db, &[]);

        let err = run(Cli {
            input,
            abstracts_db: db,
            output: output.clone(),
        })
        .expect_err("malformed document URI should abort the run");

        assert!(format!("{err:#}").contains("question 0"));
        assert!(!output.exists());

        fs::remove_dir_all(&dir).expect("scratch dir should be removed");
    }

    #[test]
    fn normalize_dataset_reports_progress_and_misses() {
        let pipeline = Pipeline::new(PipelineConfig::default()).expect("pipeline should build");
        let dataset: Dataset =
            serde_json::from_value(sample_dataset()).expect("dataset should deserialize");
        let store = std::collections::HashMap::from([(
            111_i64,
            "Aspirin inhibits COX-1 irreversibly.".to_string(),
        )]);
        let mut progress = Vec::new();

        let (finished, summary) = normalize_dataset(&pipeline, dataset, &store, &mut progress)
            .expect("normalization should succeed");

        let lines = String::from_utf8(progress).expect("progress should be utf-8");
        assert_eq!(lines, "0/2\n999\n1/2\n");
        assert_eq!(
            summary,
            RunSummary {
                processed: 2,
                relabeled_snippets: 1,
                missing_pmids: 1,
            }
        );
        assert_eq!(finished.written, 2);
        assert_eq!(finished.dropped, 0);
    }
}
