//! Upload routing and local input buffers

pub mod selector;

pub use selector::{
    InputBuffer, InputContent, PASTE_LINE_LIMIT_COMBO, PASTE_LINE_LIMIT_PROXY, Route,
    TransportSelector, UploadSource, line_count,
};
