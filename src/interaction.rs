pub(crate) mod hit;
pub(crate) mod machine;
