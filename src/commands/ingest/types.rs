use super::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DocumentStatus {
    Succeeded,
    /// No section anchors were found; the document flows through with zero chunks.
    Skipped {
        reason: String,
    },
    Failed {
        reason: String,
    },
    Cancelled,
}

impl DocumentStatus {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Succeeded => "succeeded",
            DocumentStatus::Skipped { .. } => "skipped",
            DocumentStatus::Failed { .. } => "failed",
            DocumentStatus::Cancelled => "cancelled",
        }
    }

    pub(crate) fn reason(&self) -> Option<String> {
        match self {
            DocumentStatus::Skipped { reason } | DocumentStatus::Failed { reason } => {
                Some(reason.clone())
            }
            DocumentStatus::Succeeded | DocumentStatus::Cancelled => None,
        }
    }

    /// Whether the document's output replaces whatever a previous run stored for it.
    pub(crate) fn is_final(&self) -> bool {
        matches!(
            self,
            DocumentStatus::Succeeded | DocumentStatus::Skipped { .. }
        )
    }
}

#[derive(Debug, Clone)]
pub(crate) struct DocumentResult {
    pub(crate) deal_name: String,
    pub(crate) document_id: String,
    pub(crate) source_path: String,
    pub(crate) status: DocumentStatus,
    pub(crate) parsed: Option<ParsedDocument>,
    pub(crate) chunks: Vec<ChunkRecord>,
}

impl DocumentResult {
    pub(crate) fn from_parsed(deal_name: &str, parsed: ParsedDocument) -> Self {
        match build_chunks(deal_name, &parsed) {
            Ok(chunks) => {
                let status = if parsed.sections.is_empty() {
                    warn!(
                        deal = %deal_name,
                        document = %parsed.document_id,
                        "no section headers detected"
                    );
                    DocumentStatus::Skipped {
                        reason: "no section headers detected".to_string(),
                    }
                } else {
                    DocumentStatus::Succeeded
                };

                Self {
                    deal_name: deal_name.to_string(),
                    document_id: parsed.document_id.clone(),
                    source_path: parsed.source_path.clone(),
                    status,
                    parsed: Some(parsed),
                    chunks,
                }
            }
            Err(err) => Self::failed(
                deal_name,
                &parsed.document_id,
                &parsed.source_path,
                &err.context("chunk assembly failed"),
            ),
        }
    }

    pub(crate) fn failed(
        deal_name: &str,
        document_id: &str,
        source_path: &str,
        err: &anyhow::Error,
    ) -> Self {
        let reason = format!("{err:#}");
        warn!(
            deal = %deal_name,
            document = %document_id,
            reason = %reason,
            "document failed"
        );

        Self {
            deal_name: deal_name.to_string(),
            document_id: document_id.to_string(),
            source_path: source_path.to_string(),
            status: DocumentStatus::Failed { reason },
            parsed: None,
            chunks: Vec::new(),
        }
    }

    pub(crate) fn cancelled(deal_name: &str, document_id: &str, source_path: &str) -> Self {
        Self {
            deal_name: deal_name.to_string(),
            document_id: document_id.to_string(),
            source_path: source_path.to_string(),
            status: DocumentStatus::Cancelled,
            parsed: None,
            chunks: Vec::new(),
        }
    }

    pub(crate) fn report(&self) -> DocumentReport {
        DocumentReport {
            deal_name: self.deal_name.clone(),
            document_id: self.document_id.clone(),
            source_path: self.source_path.clone(),
            status: self.status.as_str().to_string(),
            reason: self.status.reason(),
            section_count: self
                .parsed
                .as_ref()
                .map(|parsed| parsed.sections.len())
                .unwrap_or(0),
            chunk_count: self.chunks.len(),
        }
    }
}
