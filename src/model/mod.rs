//! Editable document vocabulary.

pub(crate) mod action;
pub(crate) mod display;
pub(crate) mod document;
