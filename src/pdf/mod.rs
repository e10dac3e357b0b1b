// src/pdf/mod.rs
//! PDF access: page text (text layer or OCR) and positioned layout.
pub mod layout;
pub mod source;
