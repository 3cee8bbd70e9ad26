//! Catalog read models
//!
//! Every view of the catalog is built from one joined query whose rows repeat
//! the root entity once per child combination. [`aggregate`] folds those rows
//! back into nested entities; the per-resource modules define the shapes.

pub mod aggregate;
pub mod book;
pub mod bookstub;
pub mod corpus;
pub mod genre;
pub mod names;
pub mod pagination;
pub mod person;
pub mod series;
pub mod version;

pub use aggregate::{Aggregate, Keyed, MalformedRow, aggregate, aggregate_keyed, aggregate_one};
pub use book::{Book, BookWithoutSeries};
pub use bookstub::{BookStub, NamingPolicy};
pub use corpus::{Corpus, CorpusBookGenre, CorpusBookStub, CorpusBookTag, CorpusContext, aggregate_corpora};
pub use genre::{Genre, Tag};
pub use pagination::{Page, aggregate_page};
pub use person::Person;
pub use series::{Series, SeriesStub, SeriesWithoutBooks};
pub use version::Version;
