pub(crate) mod ident;
pub(crate) mod pipeline;
pub(crate) mod storage;
