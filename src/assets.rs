pub(crate) mod decode;
pub(crate) mod manifest;
pub(crate) mod store;
pub(crate) mod upload;
