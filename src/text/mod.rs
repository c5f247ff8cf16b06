//! Text processing for content similarity.
//!
//! Business metadata arrives as free text. This module normalizes it
//! ([`tokenize`]), strips common English filler ([`StopWords`]), and
//! weights what remains ([`TfidfVectorizer`]) so the content index can
//! compare businesses by cosine similarity.

pub mod stopwords;
pub mod tfidf;
pub mod tokenize;

pub use stopwords::{StopWords, ENGLISH_STOP_WORDS};
pub use tfidf::{sparse_dot, SparseVector, TfidfVectorizer};
pub use tokenize::tokenize;
