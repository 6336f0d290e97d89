pub(crate) mod commit;
pub(crate) mod opts;
pub(crate) mod resolve;
