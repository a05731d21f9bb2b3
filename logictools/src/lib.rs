//! Logictools: compilers and drivers for the programmable logic co-processor of the PYNQ-Z1 board.
//!
//! - [`boolean`] compiles boolean expressions into 5-input LUT lane configurations.
//! - [`fsm`] compiles Moore machines into block-memory microcode and configuration registers.
//! - [`trace`] decodes captured samples into per-pin waveforms.
//! - [`generator`] drives the compiled configurations through a [`Transport`].

// # Tries to deny all lints (`rustc -W help`).
#![deny(absolute_paths_not_starting_with_crate)]
#![deny(anonymous_parameters)]
#![deny(explicit_outlives_requirements)]
#![deny(keyword_idents)]
#![deny(macro_use_extern_crate)]
#![deny(missing_debug_implementations)]
#![deny(non_ascii_idents)]
#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![deny(unused_extern_crates)]
#![deny(unused_import_braces)]
//
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::missing_crate_level_docs)]
#![deny(rustdoc::invalid_codeblock_attributes)]
#![deny(rustdoc::invalid_html_tags)]
#![deny(rustdoc::bare_urls)]
#![deny(unreachable_pub)]
//
#![allow(clippy::needless_lifetimes)]
#![allow(elided_lifetimes_in_paths)]

pub mod boolean;
pub mod constants;
pub mod fsm;
pub mod generator;
pub mod intf;
pub mod trace;
pub mod utils;

pub use boolean::{compile_boolean, BoolExpr, BooleanError, LutConfig, LutImage};
pub use fsm::{compile_fsm, CompiledFsm, FsmError, FsmSpec};
pub use generator::{AnalyzerConfig, BooleanGenerator, FsmConfig, FsmGenerator, GeneratorError, TraceAnalyzer};
pub use intf::{IntfSpec, MemoryTransport, Transport, TransportError};
pub use trace::{decode, TraceError, TraceSpec, Wave, WaveLane};
