//! Division extraction from annotation sources.
//!
//! ```text
//! <doc file="lit_er_ambrus_l.s1.clean">
//!   <div type="article">
//!     <head><s>
//! Cím	cím	FN
//!     </s></head>
//!     <p><s>
//! Jó	jó	MN
//! napot	nap	FN
//! <g/>
//! !	!	PUNCT
//!     </s></p>
//!   </div>
//! </doc>
//! ```
//!
//! Each `s` contributes its non-blank text lines; a `<g/>` inside a sentence
//! becomes a no-space marker line. Consecutive sentences of a division sharing
//! the same `p` (or `head`) ancestor form one paragraph.

use log::debug;
use roxmltree::{Document, Node, NodeId, ParsingOptions};

use crate::annotation::parser::{DivisionLines, ParagraphLines, SentenceLines};
use crate::error::Result;
use crate::source::{DivisionMap, local_name_eq};

/// Elements that group sentences into paragraphs.
const PARAGRAPH_TAGS: [&str; 2] = ["p", "head"];

pub(crate) fn parsing_options() -> ParsingOptions {
    ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    }
}

/// The divisions of one annotation-source document.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AnnotationSource {
    /// `file` attribute of the root element, when present.
    pub file_attribute: Option<String>,

    /// One entry per division element, in document order, including empty ones.
    pub divisions: Vec<DivisionLines>,
}

impl AnnotationSource {
    /// Parse a decoded annotation-source document.
    pub fn parse(text: &str, no_space_marker: &str) -> Result<Self> {
        let doc = Document::parse_with_options(text, parsing_options())?;
        let root = doc.root_element();
        let map = DivisionMap::build(root);

        let mut divisions = vec![DivisionLines::default(); map.len()];
        let mut last_paragraph: Vec<Option<NodeId>> = vec![None; map.len()];

        for sentence in root.descendants().filter(|n| local_name_eq(n, "s")) {
            let Some(idx) = map.owner(sentence) else {
                debug!("Sentence outside any division skipped");
                continue;
            };
            let paragraph = enclosing_paragraph(sentence);
            let lines = sentence_lines(sentence, no_space_marker);

            let target = &mut divisions[idx];
            if target.paragraphs.is_empty() || last_paragraph[idx] != paragraph {
                target.paragraphs.push(ParagraphLines::default());
                last_paragraph[idx] = paragraph;
            }
            if let Some(current) = target.paragraphs.last_mut() {
                current.sentences.push(lines);
            }
        }

        Ok(AnnotationSource {
            file_attribute: root.attribute("file").map(str::to_string),
            divisions,
        })
    }
}

fn enclosing_paragraph(sentence: Node<'_, '_>) -> Option<NodeId> {
    sentence
        .ancestors()
        .skip(1)
        .find(|n| PARAGRAPH_TAGS.iter().any(|tag| local_name_eq(n, tag)))
        .map(|n| n.id())
}

fn sentence_lines(sentence: Node<'_, '_>, no_space_marker: &str) -> SentenceLines {
    let mut lines = Vec::new();
    for node in sentence.descendants().skip(1) {
        if node.is_text() {
            let text = node.text().unwrap_or_default();
            lines.extend(
                text.split('\n')
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .map(str::to_string),
            );
        } else if local_name_eq(&node, "g") {
            lines.push(no_space_marker.to_string());
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::parser::{DEFAULT_NO_SPACE_MARKER, TokenStreamParser};
    use crate::error::StandoffError;

    const SAMPLE: &str = "<doc file=\"lit.s1.clean\" style=\"lit\">\n\
        <div type=\"article\">\n\
        <head><s>\nCím\tcím\tFN\n</s></head>\n\
        <p><s>\nJó\tjó\tMN\nnapot\tnap\tFN\n<g/>\n!\t!\tPUNCT\n</s>\n<s>\nSzia\tszia\tISZ\n</s></p>\n\
        <p><s>\nVége\tvég\tFN\n</s></p>\n\
        </div>\n\
        <div type=\"empty\">\n</div>\n\
        <div><s>\negy\tegy\tSZN\n</s><s>\nkettő\tkettő\tSZN\n</s></div>\n\
        </doc>";

    #[test]
    fn test_divisions_and_paragraphs() {
        let source = AnnotationSource::parse(SAMPLE, DEFAULT_NO_SPACE_MARKER).unwrap();

        assert_eq!(source.file_attribute.as_deref(), Some("lit.s1.clean"));
        assert_eq!(source.divisions.len(), 3);

        let first = &source.divisions[0];
        assert_eq!(first.paragraphs.len(), 3);
        assert_eq!(first.paragraphs[0].sentences, vec![vec!["Cím\tcím\tFN".to_string()]]);
        assert_eq!(first.paragraphs[1].sentences.len(), 2);
        assert_eq!(
            first.paragraphs[1].sentences[0],
            vec!["Jó\tjó\tMN", "napot\tnap\tFN", DEFAULT_NO_SPACE_MARKER, "!\t!\tPUNCT"]
        );

        assert!(source.divisions[1].paragraphs.is_empty());

        // no paragraph markup: one paragraph holding every sentence
        assert_eq!(source.divisions[2].paragraphs.len(), 1);
        assert_eq!(source.divisions[2].paragraphs[0].sentences.len(), 2);
    }

    #[test]
    fn test_raw_text_from_source() {
        let source = AnnotationSource::parse(SAMPLE, DEFAULT_NO_SPACE_MARKER).unwrap();
        let stream = TokenStreamParser::default().parse(&source.divisions[0]);
        assert_eq!(stream.raw_text(), "Cím Jó napot! Szia Vége");
    }

    #[test]
    fn test_poem_splits_division_in_document_order() {
        let text = "<doc><div><s>\na\n</s><poem><s>\nb\n</s></poem><s>\nc\n</s></div>\
            <div><s>\nd\n</s></div></doc>";
        let source = AnnotationSource::parse(text, DEFAULT_NO_SPACE_MARKER).unwrap();

        let words: Vec<Vec<String>> = source
            .divisions
            .iter()
            .map(|d| d.paragraphs.iter().flat_map(|p| p.sentences.concat()).collect())
            .collect();
        // text after the poem stays with the poem; the next div starts afresh
        assert_eq!(words, vec![vec!["a"], vec!["b", "c"], vec!["d"]]);
    }

    #[test]
    fn test_malformed_xml_is_file_local() {
        let err = AnnotationSource::parse("<doc><div>", DEFAULT_NO_SPACE_MARKER).unwrap_err();
        assert!(matches!(err, StandoffError::Xml(_)));
        assert!(err.is_file_local());
    }
}
