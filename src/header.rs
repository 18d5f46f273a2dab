//! Metadata artifacts.
//!
//! - [`text_header`] builds the per-child `header.xml` (IDS text header with
//!   sigle, title, author and creation date).
//! - [`corpus_header`] turns a metadata source's `cesHeader` block into the
//!   per-parent `header.xml`, renaming it to `idsHeader`.

use crate::layer::encoder::{Artifact, HEADER_ARTIFACT};
use crate::source::metadata::DivisionMetadata;
use crate::xml::{XML_DECLARATION, XmlDocument, XmlElement};

pub const HEADER_SCHEMA_PI: &str = r#"<?xml-model href="header.rng" type="application/xml" schematypens="http://relaxng.org/ns/structure/1.0"?>"#;
pub const IDS_DOCTYPE: &str = r#"<!DOCTYPE idsCorpus PUBLIC "-//IDS//DTD IDS-XCES 1.0//EN" "http://corpora.ids-mannheim.de/idsxces1/DTD/ids.xcesdoc.dtd">"#;

fn optional_text(name: &str, value: Option<&str>) -> XmlElement {
    let element = XmlElement::new(name);
    match value {
        Some(text) => element.text(text),
        None => element,
    }
}

/// Build the text header of one child document.
pub fn text_header(docid: &str, metadata: &DivisionMetadata) -> Artifact {
    let title_stmt = XmlElement::new("titleStmt")
        .child(XmlElement::new("textSigle").text(docid))
        .child(optional_text("t.title", metadata.title.as_deref()));

    let source_desc = XmlElement::new("sourceDesc").child(
        XmlElement::new("biblStruct").child(
            XmlElement::new("analytic")
                .child(optional_text("h.author", metadata.author.as_deref())),
        ),
    );

    let file_desc = XmlElement::new("fileDesc")
        .child(title_stmt)
        .child(XmlElement::new("publicationStmt"))
        .child(source_desc);

    let profile_desc = XmlElement::new("profileDesc").child(
        XmlElement::new("creation")
            .child(optional_text("creatDate", metadata.date.as_deref())),
    );

    let root = XmlElement::new("idsHeader")
        .attr("type", "text")
        .child(file_desc)
        .child(XmlElement::new("encodingDesc"))
        .child(profile_desc);

    Artifact {
        group: "",
        name: HEADER_ARTIFACT,
        document: XmlDocument::new(root)
            .with_prolog(HEADER_SCHEMA_PI)
            .with_prolog(IDS_DOCTYPE),
    }
}

/// Render the parent-level header from a verbatim `cesHeader` block.
///
/// The block is copied as-is apart from the element rename, so it is written
/// as text rather than rebuilt as a tree.
pub fn corpus_header(ces_header: &str) -> String {
    let body = ces_header
        .replacen("<cesHeader", "<idsHeader", 1)
        .replace("</cesHeader>", "</idsHeader>");
    format!("{XML_DECLARATION}\n{HEADER_SCHEMA_PI}\n{IDS_DOCTYPE}\n{body}\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_header_fields() {
        let metadata = DivisionMetadata {
            title: Some("Első fejezet".to_string()),
            author: Some("Ambrus Lajos".to_string()),
            date: Some("2013-03-02T14:36:02Z".to_string()),
        };
        let artifact = text_header("DOC000001.000001", &metadata);
        assert_eq!(artifact.relative_path(), "header.xml");

        let xml = artifact.document.to_pretty_string();
        assert!(xml.contains("<textSigle>DOC000001.000001</textSigle>"));
        assert!(xml.contains("<t.title>Első fejezet</t.title>"));
        assert!(xml.contains("<h.author>Ambrus Lajos</h.author>"));
        assert!(xml.contains("<creatDate>2013-03-02T14:36:02Z</creatDate>"));
        assert!(xml.contains(IDS_DOCTYPE));
    }

    #[test]
    fn test_text_header_with_missing_fields() {
        let artifact = text_header("DOC000002.000007", &DivisionMetadata::default());
        let xml = artifact.document.to_pretty_string();
        assert!(xml.contains("<t.title/>"));
        assert!(xml.contains("<h.author/>"));
        assert!(xml.contains("<creatDate/>"));
    }

    #[test]
    fn test_corpus_header_rename() {
        let rendered = corpus_header("<cesHeader type=\"text\"><x/></cesHeader>");
        assert!(rendered.starts_with(XML_DECLARATION));
        assert!(rendered.ends_with("<idsHeader type=\"text\"><x/></idsHeader>\n"));
        assert!(!rendered.contains("cesHeader"));
    }
}
