//! Device configuration format: encoder, decoder and image-body slicing helpers.

pub(crate) mod decode;
pub(crate) mod encode;
pub(crate) mod layout;
pub(crate) mod page;
