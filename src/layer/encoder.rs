//! Layer encoder.
//!
//! Renders tracked spans as KorAP standoff documents. Structural layers list
//! bare boundary spans; content layers list one span per token with an `id`
//! and, when the layer declares fields, a nested TEI feature structure:
//!
//! ```text
//! <span id="s0" from="0" to="5">
//!   <fs type="lex" xmlns="http://www.tei-c.org/ns/1.0">
//!     <f name="lex">
//!       <fs>
//!         <f name="lemma">house</f>
//!       </fs>
//!     </f>
//!   </fs>
//! </span>
//! ```

use crate::layer::kind::Layer;
use crate::layer::tracker::{TokenSpan, TrackedDivision};
use crate::xml::{XmlDocument, XmlElement};

pub const KORAP_NAMESPACE: &str = "http://ids-mannheim.de/ns/KorAP";
pub const TEI_NAMESPACE: &str = "http://www.tei-c.org/ns/1.0";
pub const LAYER_VERSION: &str = "KorAP-0.4";
pub const SPAN_SCHEMA_PI: &str = r#"<?xml-model href="span.rng" type="application/xml" schematypens="http://relaxng.org/ns/structure/1.0"?>"#;

/// Artifact stem of the raw text document.
pub const RAW_TEXT_ARTIFACT: &str = "data";

/// Artifact stem of the per-division metadata document.
pub const HEADER_ARTIFACT: &str = "header";

/// One output document of a child, placed under `group/name.xml`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Artifact {
    /// Grouping folder; empty for artifacts placed directly in the child.
    pub group: &'static str,
    pub name: &'static str,
    pub document: XmlDocument,
}

impl Artifact {
    /// Path of the artifact relative to its child directory.
    pub fn relative_path(&self) -> String {
        if self.group.is_empty() {
            format!("{}.xml", self.name)
        } else {
            format!("{}/{}.xml", self.group, self.name)
        }
    }
}

/// Encodes the artifacts of one division.
#[derive(Clone, Debug)]
pub struct LayerEncoder {
    docid: String,
}

impl LayerEncoder {
    /// Create an encoder writing `docid` into every document.
    pub fn new<S: Into<String>>(docid: S) -> Self {
        LayerEncoder {
            docid: docid.into(),
        }
    }

    /// Encode a single layer.
    pub fn encode(&self, layer: Layer, tracked: &TrackedDivision<'_>) -> XmlDocument {
        let mut span_list = XmlElement::new("spanList");

        if layer.is_structural() {
            for span in tracked.boundaries(layer) {
                span_list.push(
                    XmlElement::new("span")
                        .attr("from", span.from.to_string())
                        .attr("to", span.to.to_string()),
                );
            }
        } else {
            for token in &tracked.tokens {
                span_list.push(Self::token_span(layer, token));
            }
        }

        let root = XmlElement::new("layer")
            .attr("docid", self.docid.as_str())
            .attr("xmlns", KORAP_NAMESPACE)
            .attr("version", LAYER_VERSION)
            .child(span_list);

        XmlDocument::new(root).with_prolog(SPAN_SCHEMA_PI)
    }

    /// Encode every layer in output order.
    pub fn encode_layers(&self, tracked: &TrackedDivision<'_>) -> Vec<Artifact> {
        Layer::ALL
            .into_iter()
            .map(|layer| Artifact {
                group: layer.group(),
                name: layer.artifact_name(),
                document: self.encode(layer, tracked),
            })
            .collect()
    }

    /// Encode the raw text document.
    pub fn encode_raw_text(&self, text: &str) -> Artifact {
        let root = XmlElement::new("raw_text")
            .attr("docid", self.docid.as_str())
            .attr("xmlns", KORAP_NAMESPACE)
            .child(XmlElement::new("metadata").attr("file", "metadata.xml"))
            .child(XmlElement::new("text").text(text));

        Artifact {
            group: "",
            name: RAW_TEXT_ARTIFACT,
            document: XmlDocument::new(root).with_prolog(SPAN_SCHEMA_PI),
        }
    }

    fn token_span(layer: Layer, token: &TokenSpan<'_>) -> XmlElement {
        let span = XmlElement::new("span")
            .attr("id", format!("s{}", token.id))
            .attr("from", token.span.from.to_string())
            .attr("to", token.span.to.to_string());

        let fields = layer.fields();
        if fields.is_empty() {
            return span;
        }

        let mut features = XmlElement::new("fs");
        for field in fields {
            features.push(
                XmlElement::new("f")
                    .attr("name", field.name())
                    .text(token.record.get(*field)),
            );
        }

        span.child(
            XmlElement::new("fs")
                .attr("type", "lex")
                .attr("xmlns", TEI_NAMESPACE)
                .child(XmlElement::new("f").attr("name", "lex").child(features)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::field::{NOT_AVAILABLE, TokenRecord};
    use crate::annotation::stream::{BoundaryMarker, TokenStream};
    use crate::layer::tracker::OffsetTracker;
    use crate::xml::XmlNode;

    fn stream() -> TokenStream {
        let mut stream = TokenStream::new();
        stream.push_token(TokenRecord::from_columns(
            "house\thouse\tNN\tN\tana1\tCVC\t1\tCVC\t1\thaus\thaus".split('\t'),
        ));
        stream.push_token(TokenRecord::from_columns(["&", "&", "CONJ"]));
        stream.push_token(TokenRecord::from_columns([".", "."]).with_attachment(true));
        stream.push_boundary(BoundaryMarker::SentenceEnd);
        stream.push_boundary(BoundaryMarker::ParagraphEnd);
        stream
    }

    fn spans(doc: &XmlDocument) -> Vec<&XmlElement> {
        let span_list = doc.root().elements().next().unwrap();
        assert_eq!(span_list.name(), "spanList");
        span_list.elements().collect()
    }

    fn feature_values(span: &XmlElement) -> Vec<(String, String)> {
        let fs = span.elements().next().unwrap();
        let lex = fs.elements().next().unwrap();
        let inner = lex.elements().next().unwrap();
        inner
            .elements()
            .map(|f| (f.attribute("name").unwrap().to_string(), f.text_content()))
            .collect()
    }

    #[test]
    fn test_tokens_layer_has_ids_and_no_features() {
        let stream = stream();
        let tracked = OffsetTracker::new().track(&stream);
        let doc = LayerEncoder::new("DOC000001.000001").encode(Layer::Tokens, &tracked);

        assert_eq!(doc.root().attribute("docid"), Some("DOC000001.000001"));
        assert_eq!(doc.root().attribute("version"), Some("KorAP-0.4"));

        let spans = spans(&doc);
        assert_eq!(spans.len(), 3);
        assert_eq!(spans[2].attribute("id"), Some("s2"));
        assert_eq!(spans[2].attribute("from"), Some("7"));
        assert_eq!(spans[2].attribute("to"), Some("8"));
        assert!(spans.iter().all(|s| s.children().is_empty()));
    }

    #[test]
    fn test_content_layer_features_keep_sentinels() {
        let stream = stream();
        let tracked = OffsetTracker::new().track(&stream);
        let doc = LayerEncoder::new("d").encode(Layer::Morpho, &tracked);
        let spans = spans(&doc);

        assert_eq!(
            feature_values(spans[0]),
            vec![
                ("lemma".to_string(), "house".to_string()),
                ("pos".to_string(), "NN".to_string()),
                ("ana".to_string(), "ana1".to_string()),
            ]
        );
        assert_eq!(feature_values(spans[2])[1].1, NOT_AVAILABLE);
        assert!(doc.to_pretty_string().contains("<f name=\"lemma\">&amp;</f>"));
    }

    #[test]
    fn test_offsets_identical_across_content_layers() {
        let stream = stream();
        let tracked = OffsetTracker::new().track(&stream);
        let encoder = LayerEncoder::new("d");

        let offsets = |layer: Layer| -> Vec<(String, String)> {
            spans(&encoder.encode(layer, &tracked))
                .iter()
                .map(|s| {
                    (
                        s.attribute("from").unwrap().to_string(),
                        s.attribute("to").unwrap().to_string(),
                    )
                })
                .collect()
        };

        let expected = offsets(Layer::Tokens);
        for layer in Layer::ALL.into_iter().filter(|l| !l.is_structural()) {
            assert_eq!(offsets(layer), expected, "{layer}");
        }
    }

    #[test]
    fn test_structural_layer() {
        let stream = stream();
        let tracked = OffsetTracker::new().track(&stream);
        let doc = LayerEncoder::new("d").encode(Layer::Sentences, &tracked);
        let spans = spans(&doc);

        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].attribute("from"), Some("0"));
        assert_eq!(spans[0].attribute("to"), Some("8"));
        assert_eq!(spans[0].attribute("id"), None);
    }

    #[test]
    fn test_raw_text_artifact() {
        let stream = stream();
        let artifact = LayerEncoder::new("DOC000001.000002").encode_raw_text(&stream.raw_text());

        assert_eq!(artifact.relative_path(), "data.xml");
        let root = artifact.document.root();
        assert_eq!(root.name(), "raw_text");
        let text = root.elements().nth(1).unwrap();
        assert_eq!(text.children(), &[XmlNode::Text("house &.".to_string())]);
    }

    #[test]
    fn test_encode_layers_covers_every_layer() {
        let stream = stream();
        let tracked = OffsetTracker::new().track(&stream);
        let artifacts = LayerEncoder::new("d").encode_layers(&tracked);

        let paths: Vec<_> = artifacts.iter().map(|a| a.relative_path()).collect();
        assert_eq!(paths.len(), 12);
        assert_eq!(paths[0], "base/sentences.xml");
        assert!(paths.contains(&"noske/part-of-speech.xml".to_string()));
    }
}
