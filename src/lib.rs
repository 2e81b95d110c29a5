//! `pbove` is a crate for evaluating read-to-read overlap detection against a
//! reference-mapped ground truth.
//!
//! The crate is organized around a handful of points of entry:
//!
//! - Reading alignment records (and the scored records derived from them).
//! - Building a [`GroundTruth`](crate::ground_truth::GroundTruth) from
//!   alignments of reads to a reference and mapping reads onto that reference.
//! - Classifying every query/target pair of reads and tallying predicted
//!   overlaps into score-bucketed [tables](crate::table).
//!
//! ## Reading alignment records
//!
//! Alignment records are read line by line with the [`Reader`] facility. Each
//! [`AlignmentRecord`](crate::record::AlignmentRecord) decodes the read names
//! it refers to and normalizes its coordinates: the target span is flipped
//! onto the positive strand, and both spans are shifted into the coordinates
//! of the full-length reads they come from.
//!
//! ```
//! use pbove::record::AlignmentRecord;
//!
//! let data = b"# ground truth\n\
//!              m1/1/0_500 chr1 -100 90.0 + 0 500 500 - 100 600 10000 254\n";
//! let mut reader = pbove::Reader::new(&data[..]);
//!
//! for result in reader.records::<AlignmentRecord>() {
//!     let record = result?;
//!     println!("{} -> {}", record.query_read(), record.absolute_target());
//! }
//!
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Mapping reads onto the reference
//!
//! A [`GroundTruth`](crate::ground_truth::GroundTruth) cannot be instantiated
//! directly. Instead, use [`ground_truth::Builder`] and the associated
//! [`ground_truth::Builder::try_build_from()`] method.
//!
//! ```
//! use pbove::core::Interval;
//!
//! let data = b"m1/1/0_500 chr1 -100 90.0 + 0 500 500 + 100 600 10000 254\n";
//! let reader = pbove::Reader::new(&data[..]);
//! let ground_truth = pbove::ground_truth::Builder::default().try_build_from(reader)?;
//!
//! let name = "m1/1/0_500/100_200".parse::<pbove::read::Name>()?;
//! let location = ground_truth.map_read(&name, false)?.unwrap();
//!
//! assert_eq!(location.reference(), "chr1");
//! assert_eq!(location.interval(), Interval::try_new(200, 300)?);
//!
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Evaluating predictions
//!
//! The [`evaluate::Evaluation`] facility runs the whole pipeline: mapping the
//! query and target reads, classifying every pair, annotating the predicted
//! overlaps and building the delta and cumulative tables.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![warn(rust_2021_compatibility)]
#![warn(missing_debug_implementations)]
#![warn(clippy::missing_docs_in_private_items)]
#![warn(rustdoc::broken_intra_doc_links)]

pub mod classify;
pub mod compare;
pub mod core;
pub mod evaluate;
pub mod ground_truth;
pub mod line;
pub mod prediction;
pub mod read;
pub mod reader;
pub mod record;
pub mod table;

pub use line::Line;

pub use self::reader::Reader;
