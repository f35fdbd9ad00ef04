pub(crate) mod cache;
pub(crate) mod convert;
pub(crate) mod profile;
