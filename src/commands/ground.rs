use std::collections::HashSet;
use std::fs;
use std::io::{self, Write};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::cli::GroundArgs;

pub const INSUFFICIENT_EVIDENCE: &str = "The provided text does not contain enough information.";

/// Generator output as handed to the filter; missing fields read as empty.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ModelAnswer {
    pub answer: String,
    pub citations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroundedAnswer {
    pub answer: String,
    pub citations: Vec<String>,
    pub rejected_citations: Vec<String>,
    pub grounded: bool,
}

pub fn run(args: GroundArgs) -> Result<()> {
    let raw = fs::read(&args.answer_path)
        .with_context(|| format!("failed to read {}", args.answer_path.display()))?;
    let model_answer: ModelAnswer = serde_json::from_slice(&raw)
        .with_context(|| format!("failed to parse {}", args.answer_path.display()))?;

    let grounded = apply_grounding(
        &model_answer.answer,
        &model_answer.citations,
        &args.retrieved,
    );

    if grounded.grounded {
        info!(citations = grounded.citations.len(), "answer grounded");
    } else {
        warn!(
            rejected = grounded.rejected_citations.len(),
            retrieved = args.retrieved.len(),
            "answer suppressed for lack of grounded citations"
        );
    }

    let mut output = io::BufWriter::new(io::stdout().lock());
    serde_json::to_writer_pretty(&mut output, &grounded)
        .context("failed to serialize grounded answer")?;
    writeln!(output)?;
    output.flush()?;
    Ok(())
}

/// Keeps an answer only when every citation names a retrieved chunk and at least one does.
///
/// Citations are compared as exact identifier strings.
pub fn apply_grounding(answer: &str, citations: &[String], retrieved: &[String]) -> GroundedAnswer {
    let retrieved = retrieved.iter().map(String::as_str).collect::<HashSet<&str>>();

    let (valid, rejected): (Vec<String>, Vec<String>) = citations
        .iter()
        .cloned()
        .partition(|citation| retrieved.contains(citation.as_str()));

    let answer = answer.trim();
    if retrieved.is_empty() || !rejected.is_empty() || valid.is_empty() || answer.is_empty() {
        return GroundedAnswer {
            answer: INSUFFICIENT_EVIDENCE.to_string(),
            citations: Vec::new(),
            rejected_citations: rejected,
            grounded: false,
        };
    }

    GroundedAnswer {
        answer: answer.to_string(),
        citations: valid,
        rejected_citations: Vec::new(),
        grounded: true,
    }
}
