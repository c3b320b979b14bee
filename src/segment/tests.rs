use super::clean::clean_block;
use super::ids::{
    clause_chunk_id, document_display_name, normalize_section, sanitize_token, section_chunk_id,
};
use super::*;
use crate::model::{ChunkLevel, ParsedDocument, Section};

fn patterns() -> SegmentPatterns {
    SegmentPatterns::new().expect("segment patterns compile")
}

fn parsed(text: &str) -> ParsedDocument {
    ParsedDocument {
        document_id: "contract".to_string(),
        source_path: "data/deals/Acme_I/raw/contract.txt".to_string(),
        source_format: "txt".to_string(),
        file_hash: "9f2c".to_string(),
        sections: segment_text(&patterns(), &normalize_text(text)),
    }
}

const MULTI_SECTION: &str = "MASTER AGREEMENT\nPreamble text.\nSECTION 1 - Definitions\nTerms are defined here.\nSECTION 2 - Fees\n2.1 Setup\nPay.\n2.2 Renewal\nRenew yearly.\nSECTION 3\nMisc provisions.";

#[test]
fn fees_section_yields_two_clause_chunks_and_no_section_chunk() {
    let text = "SECTION 1 - Fees\n1.1 Setup\nPay $100.\n1.2 Late Fee\nPay $50 if late.\n";
    let document = parsed(text);

    assert_eq!(document.sections.len(), 1);
    let section = &document.sections[0];
    assert_eq!(section.section_id, "SECTION 1");
    assert_eq!(section.title.as_deref(), Some("Fees"));

    assert_eq!(section.clauses.len(), 2);
    assert_eq!(section.clauses[0].clause_id, "1.1");
    assert_eq!(section.clauses[0].title.as_deref(), Some("Setup"));
    assert_eq!(section.clauses[0].body, "Pay $100.");
    assert_eq!(section.clauses[1].clause_id, "1.2");
    assert_eq!(section.clauses[1].title.as_deref(), Some("Late Fee"));
    assert_eq!(section.clauses[1].body, "Pay $50 if late.");

    let chunks = build_chunks("Acme_I", &document).expect("chunks should assemble");
    assert_eq!(chunks.len(), 2);
    assert!(chunks.iter().all(|chunk| chunk.level == ChunkLevel::Clause));
    assert_eq!(
        chunks
            .iter()
            .filter(|chunk| chunk.level == ChunkLevel::Section)
            .count(),
        0
    );
    assert_eq!(chunks[0].chunk_id, "DC_Acme_I_contract_SECTION_001_CLAUSE_1.1");
    assert_eq!(chunks[1].chunk_id, "DC_Acme_I_contract_SECTION_001_CLAUSE_1.2");
    assert!(
        chunks
            .iter()
            .all(|chunk| chunk.metadata.parent_section == "SECTION_001")
    );
    assert_eq!(chunks[0].metadata.length_chars, "Pay $100.".chars().count());
}

#[test]
fn text_without_headings_yields_no_sections_and_no_chunks() {
    let text = "This agreement has no headings.\nSection 4 of the Act applies to it.\n1 paragraph only";
    let document = parsed(text);

    assert!(document.sections.is_empty());
    let chunks = build_chunks("Acme_I", &document).expect("empty document is not an error");
    assert!(chunks.is_empty());
}

#[test]
fn separator_before_first_clause_does_not_break_clause_detection() {
    let text = "SECTION 2 - Payments\nGeneral terms apply.\n----------\n2.1 Timing\nPayment is due monthly.\n==========\n2.2 Method\nWire transfer only.";
    let document = parsed(text);

    let section = &document.sections[0];
    assert_eq!(section.clauses.len(), 2);
    assert_eq!(section.clauses[0].clause_id, "2.1");
    assert_eq!(section.clauses[0].body, "Payment is due monthly.");
    assert_eq!(section.clauses[1].body, "Wire transfer only.");
    assert_eq!(section.summary, "General terms apply.");

    let chunks = build_chunks("Acme_I", &document).expect("chunks should assemble");
    assert!(chunks.iter().all(|chunk| !chunk.content.contains("-----")));
    assert!(chunks.iter().all(|chunk| !chunk.content.contains("=====")));
}

#[test]
fn segmentation_is_idempotent_byte_for_byte() {
    let first = build_chunks("Acme_I", &parsed(MULTI_SECTION)).expect("first run");
    let second = build_chunks("Acme_I", &parsed(MULTI_SECTION)).expect("second run");

    let render = |chunks: &[crate::model::ChunkRecord]| {
        chunks
            .iter()
            .map(|chunk| serde_json::to_string(chunk).expect("chunk serializes"))
            .collect::<Vec<String>>()
            .join("\n")
    };

    assert_eq!(first, second);
    assert_eq!(render(&first), render(&second));
}

#[test]
fn section_spans_tile_the_text_after_the_first_heading() {
    let normalized = normalize_text(MULTI_SECTION);
    let spans = extract_sections(&patterns(), &normalized);

    assert_eq!(spans.len(), 3);
    assert_eq!(
        Some(spans[0].heading_start),
        normalized.find("SECTION 1")
    );
    for pair in spans.windows(2) {
        assert!(pair[0].heading_start < pair[0].start);
        assert!(pair[0].start <= pair[0].end);
        assert_eq!(pair[0].end, pair[1].heading_start);
    }
    let last = spans.last().expect("last span");
    assert_eq!(last.end, normalized.len());
    assert_eq!(last.title, None);
    assert_eq!(spans[1].raw(&normalized), "\n2.1 Setup\nPay.\n2.2 Renewal\nRenew yearly.\n");
}

#[test]
fn clause_spans_tile_the_section_after_the_first_clause() {
    let document = parsed(MULTI_SECTION);
    let section = &document.sections[1];

    let first = section.clauses.first().expect("first clause");
    assert_eq!(&section.raw_text[..first.heading_start], "\n");
    for pair in section.clauses.windows(2) {
        assert!(pair[0].heading_start < pair[0].start);
        assert_eq!(pair[0].end, pair[1].heading_start);
    }
    assert_eq!(
        section.clauses.last().map(|clause| clause.end),
        Some(section.raw_text.len())
    );
}

#[test]
fn chunk_count_matches_leaf_units_exactly() {
    let document = parsed(MULTI_SECTION);
    let chunks = build_chunks("Acme_I", &document).expect("chunks should assemble");

    assert_eq!(chunks.len(), 4);
    let levels = chunks.iter().map(|chunk| chunk.level).collect::<Vec<_>>();
    assert_eq!(
        levels,
        vec![
            ChunkLevel::Section,
            ChunkLevel::Clause,
            ChunkLevel::Clause,
            ChunkLevel::Section
        ]
    );
    assert!(
        !chunks
            .iter()
            .any(|chunk| chunk.chunk_id == "DC_Acme_I_contract_SECTION_002")
    );
    assert_eq!(chunks[0].content, "Terms are defined here.");
    assert_eq!(chunks[3].content, "Misc provisions.");
    assert_eq!(chunks[3].metadata.parent_section, "SECTION_003");
    assert_eq!(chunks[3].metadata.origin, "section_no_clauses");
}

#[test]
fn clause_content_never_starts_with_its_heading_or_title() {
    let text = "SECTION 4 - Covenants\n4.1 Reporting\nReporting\nThe borrower shall report quarterly.\n4.2 Insurance\n";
    let document = parsed(text);
    let clauses = &document.sections[0].clauses;

    assert_eq!(clauses[0].body, "The borrower shall report quarterly.");
    assert!(!clauses[0].body.starts_with(&clauses[0].heading_line));
    assert!(!clauses[0].body.starts_with("Reporting"));

    // Nothing follows 4.2, so its title stands in as the body.
    assert_eq!(clauses[1].body, "Insurance");
}

#[test]
fn lettered_clause_suffixes_are_kept_in_the_clause_id() {
    let text = "Section 5 – Events of Default\n5.1(a) Payment default\nFailure to pay.\n5.1(b) Covenant default\nBreach.";
    let document = parsed(text);
    let section = &document.sections[0];

    assert_eq!(section.section_id, "Section 5");
    assert_eq!(section.title.as_deref(), Some("Events of Default"));
    let ids = section
        .clauses
        .iter()
        .map(|clause| clause.clause_id.as_str())
        .collect::<Vec<_>>();
    assert_eq!(ids, vec!["5.1(a)", "5.1(b)"]);

    let chunks = build_chunks("Acme_I", &document).expect("chunks should assemble");
    assert_eq!(
        chunks[0].chunk_id,
        "DC_Acme_I_contract_SECTION_005_CLAUSE_5.1(a)"
    );
}

#[test]
fn clause_identifiers_are_stable_and_do_not_collide_on_concatenation() {
    let section = normalize_section("SECTION 3");
    let first = clause_chunk_id("Acme_I", "contract", &section, "2.10");
    let second = clause_chunk_id("Acme_I", "contract", &section, "2.10");

    assert_eq!(first, "DC_Acme_I_contract_SECTION_003_CLAUSE_2.10");
    assert_eq!(first, second);
    assert_ne!(first, clause_chunk_id("Acme_I", "contract", &section, "2.1"));
    assert_ne!(
        first,
        clause_chunk_id("Acme_I", "contract", &section, "2.1(0)")
    );

    assert_ne!(normalize_section("SECTION 2.10"), normalize_section("SECTION 2.1"));
    assert_ne!(normalize_section("SECTION 2.10"), normalize_section("SECTION 21.0"));
}

#[test]
fn normalize_section_pads_numeric_components() {
    assert_eq!(normalize_section("SECTION 3"), "SECTION_003");
    assert_eq!(normalize_section("section 12"), "SECTION_012");
    assert_eq!(normalize_section("Section 4.2(a)"), "SECTION_004_002_a");
    assert_eq!(normalize_section("SECTION 1000"), "SECTION_1000");
    assert_eq!(normalize_section("SECTION  7 "), "SECTION_007");
}

#[test]
fn sanitize_token_replaces_whitespace_and_dash_variants() {
    assert_eq!(sanitize_token(" Acme Capital – V "), "Acme_Capital___V");
    assert_eq!(sanitize_token("North—South"), "North_South");
    assert_eq!(sanitize_token("term-loan"), "term_loan");
    assert_eq!(sanitize_token("2.10(a)"), "2.10(a)");
}

#[test]
fn inputs_with_identical_canonical_tokens_share_an_identifier() {
    let section = normalize_section("SECTION 1");

    assert_eq!(
        section_chunk_id("Acme I", "credit agreement", &section),
        section_chunk_id("Acme_I", "credit-agreement", &section)
    );
    assert_eq!(normalize_section("SECTION 1"), normalize_section("section 001"));
}

#[test]
fn clean_block_removes_separators_and_collapses_blank_runs() {
    let patterns = patterns();
    let text = "Intro line\n\n\n\nBody - with a dash and -- pair\n  _______  \nTail\n\n \n\nEnd";
    let cleaned = clean_block(&patterns, text);

    assert_eq!(
        cleaned,
        "Intro line\n\nBody - with a dash and -- pair\nTail\n\nEnd"
    );
    assert_eq!(clean_block(&patterns, &cleaned), cleaned);
}

#[test]
fn clean_block_keeps_short_dash_runs() {
    let patterns = patterns();
    assert_eq!(clean_block(&patterns, "----\nkeep"), "----\nkeep");
    assert_eq!(clean_block(&patterns, "=====\n"), "");
}

#[test]
fn decode_document_falls_back_to_windows_1252() {
    let (text, encoding) = decode_document(b"Fee \x96 \x80100").expect("cp1252 decodes");
    assert_eq!(text, "Fee \u{2013} \u{20ac}100");
    assert_eq!(encoding, SourceEncoding::Windows1252);

    let (text, encoding) = decode_document("\u{feff}SECTION 1".as_bytes()).expect("utf-8 decodes");
    assert_eq!(text, "SECTION 1");
    assert_eq!(encoding, SourceEncoding::Utf8);
}

#[test]
fn normalize_text_unifies_line_endings_and_trims() {
    assert_eq!(normalize_text("  a\r\nb\rc\n\n"), "a\nb\nc");
}

#[test]
fn crlf_input_segments_like_lf_input() {
    let lf = parsed("SECTION 1 - Fees\n1.1 Setup\nPay $100.");
    let crlf = parsed("SECTION 1 - Fees\r\n1.1 Setup\r\nPay $100.\r\n");
    assert_eq!(lf.sections, crlf.sections);
}

#[test]
fn section_without_body_falls_back_to_its_title() {
    let document = parsed("SECTION 9 - Reserved\nSECTION 10 - Notices\nSend notices in writing.");
    let chunks = build_chunks("Acme_I", &document).expect("chunks should assemble");

    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[0].content, "Reserved");
    assert_eq!(chunks[1].chunk_id, "DC_Acme_I_contract_SECTION_010");
}

#[test]
fn empty_chunk_content_is_rejected() {
    let document = ParsedDocument {
        sections: vec![Section {
            section_id: "SECTION 1".to_string(),
            title: None,
            position: 0,
            heading_start: 0,
            start: 9,
            end: 9,
            raw_text: String::new(),
            summary: String::new(),
            clauses: Vec::new(),
        }],
        ..parsed("")
    };

    let err = build_chunks("Acme_I", &document).expect_err("empty content must fail");
    assert!(err.to_string().contains("empty content"));
}

#[test]
fn chunk_records_serialize_the_consumer_field_set() {
    let document = parsed(MULTI_SECTION);
    let chunks = build_chunks("Acme_I", &document).expect("chunks should assemble");

    let clause = serde_json::to_value(&chunks[1]).expect("clause chunk serializes");
    for key in [
        "chunk_id",
        "level",
        "deal_name",
        "document_id",
        "section_id",
        "normalized_section",
        "clause_id",
        "content",
    ] {
        assert!(clause.get(key).is_some(), "missing {key}");
    }
    assert_eq!(clause["level"], "clause");
    for key in [
        "parent_section",
        "source_format",
        "file_hash",
        "source_path",
        "length_chars",
    ] {
        assert!(clause["metadata"].get(key).is_some(), "missing metadata.{key}");
    }

    let section = serde_json::to_value(&chunks[0]).expect("section chunk serializes");
    assert_eq!(section["level"], "section");
    assert!(section.get("clause_id").is_none());
    assert_eq!(section["metadata"]["parent_section"], "SECTION_001");
}

#[test]
fn document_display_name_title_cases_words() {
    assert_eq!(document_display_name("credit_agreement"), "Credit Agreement");
    assert_eq!(document_display_name("FEE_letter"), "Fee Letter");
    assert_eq!(document_display_name("o'neil_side_letter"), "O'Neil Side Letter");
    assert_eq!(document_display_name("amendment_2b"), "Amendment 2B");
}

#[test]
fn title_is_not_stripped_from_inside_the_first_body_word() {
    let document = parsed(
        "SECTION 1 - Fees\n1.1 Pay\nPayment is due monthly.\n1.2 Late\nLate\nA 5% fee applies.\n",
    );
    let clauses = &document.sections[0].clauses;

    assert_eq!(clauses[0].body, "Payment is due monthly.");
    assert_eq!(clauses[1].body, "A 5% fee applies.");
}

#[test]
fn bare_numeric_lines_stay_in_the_enclosing_clause() {
    let text = "SECTION 1 - Rates\n1.1 Base\nRates by tier:\n2.5\n3.5\nSECTION 2 - Term\nOne year.\n";
    let document = parsed(text);

    let clauses = &document.sections[0].clauses;
    assert_eq!(clauses.len(), 1);
    assert_eq!(clauses[0].body, "Rates by tier:\n2.5\n3.5");

    let chunks =
        build_chunks("Acme_I", &document).expect("rate table should not fail the document");
    let ids = chunks
        .iter()
        .map(|chunk| chunk.chunk_id.as_str())
        .collect::<Vec<_>>();
    assert_eq!(
        ids,
        vec![
            "DC_Acme_I_contract_SECTION_001_CLAUSE_1.1",
            "DC_Acme_I_contract_SECTION_002",
        ]
    );
    assert_eq!(chunks[1].content, "One year.");
}

#[test]
fn bare_numeric_lines_alone_leave_a_section_chunk() {
    let document = parsed("SECTION 3 - Schedule\nTiers:\n1.5\n2.5\n");
    let section = &document.sections[0];

    assert!(section.clauses.is_empty());
    assert_eq!(section.summary, "Tiers:\n1.5\n2.5");

    let chunks = build_chunks("Acme_I", &document).expect("chunks should assemble");
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].chunk_id, "DC_Acme_I_contract_SECTION_003");
}
