//! Annotation fields and token records.
//!
//! # Core Types
//!
//! - [`AnnotationField`] - One of the eleven ordered annotation columns
//! - [`TokenRecord`] - All eleven values of one surface token
//!
//! # Examples
//!
//! ```
//! use standoff::annotation::field::{AnnotationField, TokenRecord, NOT_AVAILABLE};
//!
//! let record = TokenRecord::from_columns(["house", "house", "NN"]);
//! assert_eq!(record.get(AnnotationField::Word), "house");
//! assert_eq!(record.get(AnnotationField::Ctag), NOT_AVAILABLE);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Sentinel stored for every column missing from a source line.
pub const NOT_AVAILABLE: &str = "__NA__";

/// Number of annotation columns in a complete source line.
pub const FIELD_COUNT: usize = 11;

/// The annotation columns of a source line, in column order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationField {
    /// Surface form
    Word,
    /// Lemma
    Lemma,
    /// Morphosyntactic description
    Pos,
    /// Corpus tag (never exposed by any layer)
    Ctag,
    /// Full morphological analysis
    Ana,
    /// CV skeleton of the surface form
    WordCv,
    /// Syllable count of the surface form
    WordSyll,
    /// CV skeleton of the lemma
    LemmaCv,
    /// Syllable count of the lemma
    LemmaSyll,
    /// Phonetic representation of the surface form
    WordPhon,
    /// Phonetic representation of the lemma
    LemmaPhon,
}

impl AnnotationField {
    /// All fields in source column order.
    pub const ALL: [AnnotationField; FIELD_COUNT] = [
        AnnotationField::Word,
        AnnotationField::Lemma,
        AnnotationField::Pos,
        AnnotationField::Ctag,
        AnnotationField::Ana,
        AnnotationField::WordCv,
        AnnotationField::WordSyll,
        AnnotationField::LemmaCv,
        AnnotationField::LemmaSyll,
        AnnotationField::WordPhon,
        AnnotationField::LemmaPhon,
    ];

    /// Zero-based column index.
    pub fn index(self) -> usize {
        self as usize
    }

    /// The feature name written into layer documents.
    pub fn name(self) -> &'static str {
        match self {
            AnnotationField::Word => "word",
            AnnotationField::Lemma => "lemma",
            AnnotationField::Pos => "pos",
            AnnotationField::Ctag => "ctag",
            AnnotationField::Ana => "ana",
            AnnotationField::WordCv => "word_cv",
            AnnotationField::WordSyll => "word_syll",
            AnnotationField::LemmaCv => "lemma_cv",
            AnnotationField::LemmaSyll => "lemma_syll",
            AnnotationField::WordPhon => "word_phon",
            AnnotationField::LemmaPhon => "lemma_phon",
        }
    }
}

impl fmt::Display for AnnotationField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One surface token with all of its annotation values.
///
/// Every record holds exactly [`FIELD_COUNT`] values; columns absent from the
/// source line hold [`NOT_AVAILABLE`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRecord {
    values: Vec<String>,

    /// Do not insert a separating space before this token in the raw text.
    pub attaches_without_space: bool,
}

impl TokenRecord {
    /// Build a record from the columns of one source line.
    ///
    /// Columns are assigned to fields in order. When the line has `n + 1`
    /// columns with `n < 10`, fields from `11 - (10 - n)` onwards are filled
    /// with the sentinel; columns past the eleventh are dropped.
    pub fn from_columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut values: Vec<String> = columns
            .into_iter()
            .take(FIELD_COUNT)
            .map(Into::into)
            .collect();

        // last column index actually present
        let last = values.len().saturating_sub(1);
        if last < FIELD_COUNT - 1 {
            let start = FIELD_COUNT - (FIELD_COUNT - 1 - last);
            values.truncate(start);
            values.resize(FIELD_COUNT, NOT_AVAILABLE.to_string());
        }

        TokenRecord {
            values,
            attaches_without_space: false,
        }
    }

    /// Mark whether this token joins the previous one without a space.
    pub fn with_attachment(mut self, attaches_without_space: bool) -> Self {
        self.attaches_without_space = attaches_without_space;
        self
    }

    /// Value of one field.
    pub fn get(&self, field: AnnotationField) -> &str {
        &self.values[field.index()]
    }

    /// The surface form.
    pub fn word(&self) -> &str {
        self.get(AnnotationField::Word)
    }

    /// Length of the surface form in characters, as used for offsets.
    pub fn char_len(&self) -> usize {
        self.word().chars().count()
    }

    /// Fields whose value is the sentinel.
    pub fn missing_fields(&self) -> impl Iterator<Item = AnnotationField> + '_ {
        AnnotationField::ALL
            .into_iter()
            .filter(|field| self.get(*field) == NOT_AVAILABLE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns(line: &str) -> Vec<&str> {
        line.split('\t').collect()
    }

    #[test]
    fn test_full_line_has_no_sentinels() {
        let record = TokenRecord::from_columns(columns(
            "house\thouse\tNN\tN\tana1\tCVC\t1\tCVC\t1\thaus\thaus",
        ));

        assert_eq!(record.missing_fields().count(), 0);
        assert_eq!(record.get(AnnotationField::Ana), "ana1");
        assert_eq!(record.get(AnnotationField::LemmaPhon), "haus");
    }

    #[test]
    fn test_three_columns_pad_from_ctag() {
        let record = TokenRecord::from_columns(columns("house\thouse\tNN"));

        assert_eq!(record.get(AnnotationField::Word), "house");
        assert_eq!(record.get(AnnotationField::Lemma), "house");
        assert_eq!(record.get(AnnotationField::Pos), "NN");
        for field in &AnnotationField::ALL[3..] {
            assert_eq!(record.get(*field), NOT_AVAILABLE, "{field}");
        }
    }

    #[test]
    fn test_padding_rule_boundaries() {
        // five columns present: fields 5..=10 are padded
        let record = TokenRecord::from_columns(columns("a\tb\tc\td\te"));
        let missing: Vec<_> = record.missing_fields().map(|f| f.index()).collect();
        assert_eq!(missing, (5..11).collect::<Vec<_>>());

        // ten columns present: only the last field is padded
        let record = TokenRecord::from_columns(columns("a\tb\tc\td\te\tf\tg\th\ti\tj"));
        let missing: Vec<_> = record.missing_fields().collect();
        assert_eq!(missing, vec![AnnotationField::LemmaPhon]);
        assert_eq!(record.get(AnnotationField::WordPhon), "j");
    }

    #[test]
    fn test_extra_columns_are_dropped() {
        let record = TokenRecord::from_columns(columns("a\tb\tc\td\te\tf\tg\th\ti\tj\tk\tl"));
        assert_eq!(record.get(AnnotationField::LemmaPhon), "k");
        assert_eq!(record.missing_fields().count(), 0);
    }

    #[test]
    fn test_char_len_counts_characters() {
        let record = TokenRecord::from_columns(["szóalak"]);
        assert_eq!(record.char_len(), 7);
        assert!(record.word().len() > 7);
    }

    #[test]
    fn test_field_names_follow_column_order() {
        let names: Vec<_> = AnnotationField::ALL.iter().map(|f| f.name()).collect();
        assert_eq!(
            names,
            vec![
                "word", "lemma", "pos", "ctag", "ana", "word_cv", "word_syll", "lemma_cv",
                "lemma_syll", "word_phon", "lemma_phon"
            ]
        );
        assert_eq!(AnnotationField::LemmaCv.index(), 7);
    }
}
