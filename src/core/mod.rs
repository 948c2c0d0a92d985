// Decoding core: element model, factory, content aggregates, strict and best-effort decoders.
pub mod content;
pub mod decode;
pub mod element;
pub mod error;
pub mod mapping;
pub mod payload;
