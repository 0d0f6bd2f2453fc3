pub(crate) mod sizer;
