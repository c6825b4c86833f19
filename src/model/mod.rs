pub(crate) mod campaign;
pub(crate) mod catalog;
pub(crate) mod format;
