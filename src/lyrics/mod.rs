//! Lyrics module for fetching and displaying synchronized lyrics
//!
//! This module provides:
//! - LRC format parser for synchronized lyrics
//! - Lyrics providers (LRCLIB, Kugou proxy, local LRC file) behind one trait
//! - An ordered provider chain and a per-session resolution cache

pub mod cache;
pub mod kugou;
pub mod local;
pub mod lrclib;
pub mod parser;
pub mod provider;

pub use cache::LyricsResolver;
pub use parser::{LyricsDocument, TimedLine};
pub use provider::{LyricsQuery, ProviderChain, ResolvedLyrics};

pub(crate) const USER_AGENT: &str = concat!("dwc/", env!("CARGO_PKG_VERSION"));
