// src/extractors/mod.rs
//! Text-side extraction: normalization, segmentation, page addressing, fields
//! and tables, composed by [`docket::DocketParser`].
pub mod docket;
pub mod fields;
pub mod grammar;
pub mod normalize;
pub mod pages;
pub mod section;
pub mod tabular;
