use super::SegmentPatterns;

/// Location of one section inside the normalized text, before any cleaning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionSpan {
    pub section_id: String,
    pub title: Option<String>,
    pub position: usize,
    /// Start of the heading line.
    pub heading_start: usize,
    /// End of the heading line; the body starts here.
    pub start: usize,
    /// Start of the next heading, or end of text.
    pub end: usize,
}

impl SectionSpan {
    pub fn raw<'a>(&self, text: &'a str) -> &'a str {
        &text[self.start..self.end]
    }
}

/// An empty result means the text has no detectable structure; that is not an error.
pub fn extract_sections(patterns: &SegmentPatterns, text: &str) -> Vec<SectionSpan> {
    let anchors = patterns
        .section_heading
        .captures_iter(text)
        .filter_map(|captures| {
            let heading = captures.get(0)?;
            let section_id = captures.get(1)?.as_str().trim().to_string();
            let title = captures
                .get(2)
                .map(|m| m.as_str().trim())
                .filter(|value| !value.is_empty())
                .map(ToOwned::to_owned);

            Some((heading.start(), heading.end(), section_id, title))
        })
        .collect::<Vec<_>>();

    let mut spans = Vec::with_capacity(anchors.len());
    for (index, (heading_start, heading_end, section_id, title)) in anchors.iter().enumerate() {
        let end = anchors
            .get(index + 1)
            .map(|(next_start, ..)| *next_start)
            .unwrap_or(text.len());

        spans.push(SectionSpan {
            section_id: section_id.clone(),
            title: title.clone(),
            position: index,
            heading_start: *heading_start,
            start: *heading_end,
            end,
        });
    }

    spans
}
