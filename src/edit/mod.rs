//! Document editing: the command set, the editor that owns the live document, and the narrow
//! interfaces to the outside world it depends on.

pub(crate) mod command;
pub(crate) mod engine;
pub(crate) mod services;
