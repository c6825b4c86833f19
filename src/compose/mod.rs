pub(crate) mod composer;
pub(crate) mod template;
pub(crate) mod text;
