//! Annotation records and the token stream of one division.
//!
//! Source lines carry eleven tab-separated annotation columns per surface
//! token. This module turns the sentence/paragraph grouped lines of a division
//! into a [`stream::TokenStream`] of [`field::TokenRecord`]s interleaved with
//! boundary markers, which is what the offset tracker walks.

pub mod field;
pub mod parser;
pub mod stream;
