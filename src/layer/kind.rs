//! Layer kinds and their descriptors.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::annotation::field::AnnotationField;

/// Grouping folder of the structural layers.
pub const BASE_GROUP: &str = "base";

/// Grouping folder of the content layers.
pub const CONTENT_GROUP: &str = "noske";

/// A standoff span layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layer {
    Sentences,
    Paragraphs,
    Tokens,
    Lemmas,
    PartOfSpeech,
    Morpho,
    WordCv,
    WordSyll,
    LemmaCv,
    LemmaSyll,
    WordPhon,
    LemmaPhon,
}

impl Layer {
    /// All layers in output order.
    pub const ALL: [Layer; 12] = [
        Layer::Sentences,
        Layer::Paragraphs,
        Layer::Tokens,
        Layer::Lemmas,
        Layer::PartOfSpeech,
        Layer::Morpho,
        Layer::WordCv,
        Layer::WordSyll,
        Layer::LemmaCv,
        Layer::LemmaSyll,
        Layer::WordPhon,
        Layer::LemmaPhon,
    ];

    /// Fields nested as feature values under each token span, in order.
    ///
    /// Empty for the structural layers and for the bare token layer.
    pub fn fields(self) -> &'static [AnnotationField] {
        use AnnotationField::*;
        match self {
            Layer::Sentences | Layer::Paragraphs | Layer::Tokens => &[],
            Layer::Lemmas => &[Lemma],
            Layer::PartOfSpeech => &[Word, Lemma, Pos],
            Layer::Morpho => &[Lemma, Pos, Ana],
            Layer::WordCv => &[Word, AnnotationField::WordCv],
            Layer::WordSyll => &[Word, AnnotationField::WordSyll],
            Layer::LemmaCv => &[Lemma, AnnotationField::LemmaCv],
            Layer::LemmaSyll => &[Lemma, AnnotationField::LemmaSyll],
            Layer::WordPhon => &[Word, AnnotationField::WordPhon],
            Layer::LemmaPhon => &[Lemma, AnnotationField::LemmaPhon],
        }
    }

    /// Artifact file stem.
    pub fn artifact_name(self) -> &'static str {
        match self {
            Layer::Sentences => "sentences",
            Layer::Paragraphs => "paragraphs",
            Layer::Tokens => "tokens",
            Layer::Lemmas => "lemmas",
            Layer::PartOfSpeech => "part-of-speech",
            Layer::Morpho => "morpho",
            Layer::WordCv => "word_cv",
            Layer::WordSyll => "word_syll",
            Layer::LemmaCv => "lemma_cv",
            Layer::LemmaSyll => "lemma_syll",
            Layer::WordPhon => "word_phon",
            Layer::LemmaPhon => "lemma_phon",
        }
    }

    /// Folder grouping the artifact within a child document.
    pub fn group(self) -> &'static str {
        if self.is_structural() {
            BASE_GROUP
        } else {
            CONTENT_GROUP
        }
    }

    /// Whether the layer carries boundary spans instead of token spans.
    pub fn is_structural(self) -> bool {
        matches!(self, Layer::Sentences | Layer::Paragraphs)
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.artifact_name())
    }
}
