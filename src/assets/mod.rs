pub(crate) mod logo;
pub(crate) mod source;
pub(crate) mod store;
