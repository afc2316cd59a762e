mod bindings;
pub(crate) use bindings::*;
