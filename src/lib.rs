//! dsRNA construct design over target k-mer pools (edition 2024).
//!
//! Pipeline:
//! - index the forward strand of every target into a presence table ([`KmerPool`])
//! - subtract k-mers shared with off-target sequences ([`OffTargetFilter`]): exact,
//!   substring, or a streamed binary file of canonical 2-bit codes
//! - run many randomized greedy consensus walks in parallel, score every
//!   construct-length window of each consensus, keep the best ([`search`])
//!
//! Binary off-target files: `u64` k-mer length, then `u64` canonical codes until
//! EOF, all little-endian (see [`io`]).

mod builder;
mod config;
pub mod encode;
mod error;
mod filter;
mod index;
pub mod io;
mod pipeline;
pub mod report;
mod score;
mod search;
mod seq;

pub use builder::ConsensusBuilder;
pub use config::{DEFAULT_CHUNK_SIZE, DesignConfig};
pub use encode::{canonical, decode_kmer, encode_kmer, reverse_complement};
pub use error::{DesignError, Result};
pub use filter::{OffTargetFilter, off_target_kmers, remove_containing, shared_kmers};
pub use index::{Abundance, KmerPool, build_index};
pub use io::{StreamOptions, filter_binary};
pub use pipeline::{DesignOutcome, design_construct, stream_options};
pub use score::{Construct, ScoreAggregate, geometric_mean, median, select_best_window};
pub use search::{SearchParams, run_trial, search};
pub use seq::{SequenceRecord, apply_bias, load_many, load_sequences};
